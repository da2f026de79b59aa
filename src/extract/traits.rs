//! Extractor trait and link types

use crate::storage::ArticleRecord;

/// An article link discovered on a listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredLink {
    /// Absolute canonical URL of the article
    pub url: String,
    /// Link text, used as a fallback title if the article page has none
    pub title: String,
}

/// Capability interface for site-specific content extraction
///
/// Implementations turn raw page content into structured data. Both
/// operations are infallible by contract: extraction trouble yields `None`
/// or an empty list, never an error the pipeline has to interpret.
pub trait Extractor {
    /// Extracts a structured record from an article page
    ///
    /// `fallback_title` is the link text from the listing page, used when
    /// the article page itself yields no title. Returns `None` when no
    /// usable record can be built; the caller treats that as a skip.
    fn extract_record(
        &self,
        url: &str,
        html: &str,
        fallback_title: Option<&str>,
    ) -> Option<ArticleRecord>;

    /// Extracts candidate article links from a listing page
    ///
    /// Returned links are absolute URLs in document order. Relative hrefs
    /// are resolved against `base_url`.
    fn extract_links(&self, html: &str, base_url: &str) -> Vec<DiscoveredLink>;
}
