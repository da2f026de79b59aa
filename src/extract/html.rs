//! Default HTML extractor
//!
//! Selector-driven extraction for the target news site. Selectors are
//! layered from most to least specific because the site ships several page
//! templates; the last resorts scan for article-shaped hrefs anywhere in
//! the document.

use crate::extract::traits::{DiscoveredLink, Extractor};
use crate::storage::ArticleRecord;
use chrono::Utc;
use scraper::{ElementRef, Html, Selector};
use url::Url;

const TITLE_SELECTORS: &str =
    "h1.article-title, h1.headline, div.article-header h1, h1.story-headline";

const DATE_SELECTORS: &str = "time, span.date, div.timestamp-latnw-nf, \
     span.timestamp, div.article-info time, div.publish-date";

const CONTENT_SELECTORS: &str = "div.col-lg-9, div.col-md-9, div.col-8 p a";

const KEYWORD_SELECTORS: &str = "meta[name=\"keywords\"], a.tag, span.tag, div.tags a";

const CARD_SELECTORS: &str = "article.story-card, div.story-card, div.search-result-card, \
     div.card, article.listing-normal-teasers, article.card-article-list-item, \
     article.list-card-block";

const CARD_TITLE_SELECTORS: &str = "h2 a, h3 a, .headline a, .title a";

const CONTENT_AREA_SELECTORS: &str = "div.main-content, div.search-results, div.content-area";

const ARTICLE_HREF_SELECTORS: &str =
    "a[href*=\"/article/\"], a[href*=\"/news/\"], a[href*=\"/technology/\"]";

/// Scraper-backed extractor for the target news site
pub struct HtmlExtractor {
    source_label: String,
}

impl HtmlExtractor {
    /// Creates an extractor stamping records with the given source label
    pub fn new(source_label: impl Into<String>) -> Self {
        Self {
            source_label: source_label.into(),
        }
    }

    fn first_match<'a>(document: &'a Html, selectors: &str) -> Option<ElementRef<'a>> {
        let selector = Selector::parse(selectors).ok()?;
        document.select(&selector).next()
    }

    fn element_text(element: ElementRef<'_>) -> String {
        element.text().collect::<String>().trim().to_string()
    }

    fn extract_title(document: &Html, fallback: Option<&str>) -> String {
        Self::first_match(document, TITLE_SELECTORS)
            .map(Self::element_text)
            .filter(|t| !t.is_empty())
            .or_else(|| fallback.map(|t| t.to_string()))
            .unwrap_or_else(|| "No title found".to_string())
    }

    fn extract_date(document: &Html) -> String {
        if let Some(element) = Self::first_match(document, DATE_SELECTORS) {
            if let Some(datetime) = element.value().attr("datetime") {
                if !datetime.is_empty() {
                    return datetime.to_string();
                }
            }
            let text = Self::element_text(element);
            if !text.is_empty() {
                return text;
            }
        }

        // No date on the page; stamp with today so later range filters work
        Utc::now().format("%Y-%m-%d").to_string()
    }

    fn extract_content(document: &Html, url: &str) -> String {
        if let Some(element) = Self::first_match(document, CONTENT_SELECTORS) {
            let text = Self::element_text(element);
            if !text.is_empty() {
                return text;
            }
        }

        // Fall back to the text of a link pointing back at the article
        if let Ok(selector) = Selector::parse("a[href]") {
            for element in document.select(&selector) {
                if element.value().attr("href") == Some(url) {
                    return Self::element_text(element);
                }
            }
        }

        String::new()
    }

    fn extract_tags(document: &Html) -> Vec<String> {
        let mut tags = Vec::new();

        if let Ok(selector) = Selector::parse(KEYWORD_SELECTORS) {
            for element in document.select(&selector) {
                if element.value().name() == "meta" {
                    let content = element.value().attr("content").unwrap_or("");
                    tags.extend(
                        content
                            .split(',')
                            .map(|k| k.trim().to_string())
                            .filter(|k| !k.is_empty()),
                    );
                } else {
                    let text = Self::element_text(element);
                    if !text.is_empty() {
                        tags.push(text);
                    }
                }
            }
        }

        tags
    }

    /// Resolves a possibly-relative href against the listing base URL
    fn resolve_href(href: &str, base_url: &str) -> Option<String> {
        if href.starts_with("http://") || href.starts_with("https://") {
            return Some(href.to_string());
        }
        let base = Url::parse(base_url).ok()?;
        base.join(href).ok().map(|u| u.to_string())
    }

    fn link_from_card(card: ElementRef<'_>, base_url: &str) -> Option<DiscoveredLink> {
        let selector = Selector::parse(CARD_TITLE_SELECTORS).ok()?;
        let anchor = card.select(&selector).next()?;
        let href = anchor.value().attr("href")?;
        let title = Self::element_text(anchor);
        let url = Self::resolve_href(href, base_url)?;
        Some(DiscoveredLink { url, title })
    }

    fn link_from_anchor(anchor: ElementRef<'_>, base_url: &str) -> Option<DiscoveredLink> {
        let href = anchor.value().attr("href")?;
        let url = Self::resolve_href(href, base_url)?;
        Some(DiscoveredLink {
            url,
            title: Self::element_text(anchor),
        })
    }
}

impl Extractor for HtmlExtractor {
    fn extract_record(
        &self,
        url: &str,
        html: &str,
        fallback_title: Option<&str>,
    ) -> Option<ArticleRecord> {
        let document = Html::parse_document(html);

        let title = Self::extract_title(&document, fallback_title);
        let published_date = Self::extract_date(&document);
        let content = Self::extract_content(&document, url);
        let tags = Self::extract_tags(&document);

        Some(ArticleRecord {
            id: None,
            title,
            content,
            url: url.to_string(),
            published_date,
            source: self.source_label.clone(),
            fetched_at: Utc::now().to_rfc3339(),
            tags,
        })
    }

    fn extract_links(&self, html: &str, base_url: &str) -> Vec<DiscoveredLink> {
        let document = Html::parse_document(html);
        let mut links = Vec::new();

        // Most specific first: article cards
        if let Ok(selector) = Selector::parse(CARD_SELECTORS) {
            for card in document.select(&selector) {
                if let Some(link) = Self::link_from_card(card, base_url) {
                    links.push(link);
                }
            }
        }

        // Next: article-shaped links within the main content area
        if links.is_empty() {
            if let (Ok(area_selector), Ok(href_selector)) = (
                Selector::parse(CONTENT_AREA_SELECTORS),
                Selector::parse("a[href*=\"/article/\"], a[href*=\"/news/\"]"),
            ) {
                if let Some(area) = document.select(&area_selector).next() {
                    for anchor in area.select(&href_selector) {
                        if let Some(link) = Self::link_from_anchor(anchor, base_url) {
                            links.push(link);
                        }
                    }
                }
            }
        }

        // Last resort: article-shaped links anywhere
        if links.is_empty() {
            if let Ok(selector) = Selector::parse(ARTICLE_HREF_SELECTORS) {
                for anchor in document.select(&selector) {
                    if let Some(link) = Self::link_from_anchor(anchor, base_url) {
                        links.push(link);
                    }
                }
            }
        }

        links
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://www.khaleejtimes.com";

    fn extractor() -> HtmlExtractor {
        HtmlExtractor::new("Khaleej Times")
    }

    #[test]
    fn test_extract_record_full_page() {
        let html = r#"<html><body>
            <h1 class="article-title">AI reshapes newsrooms</h1>
            <time datetime="2024-03-15">March 15, 2024</time>
            <div class="col-lg-9">Full article body text.</div>
            <div class="tags"><a>ai</a><a>media</a></div>
        </body></html>"#;

        let record = extractor()
            .extract_record("https://www.khaleejtimes.com/article/1", html, None)
            .unwrap();

        assert_eq!(record.title, "AI reshapes newsrooms");
        assert_eq!(record.published_date, "2024-03-15");
        assert_eq!(record.content, "Full article body text.");
        assert_eq!(record.tags, vec!["ai", "media"]);
        assert_eq!(record.source, "Khaleej Times");
        assert!(record.id.is_none());
    }

    #[test]
    fn test_fallback_title_used_when_page_has_none() {
        let html = "<html><body><p>no headline markup</p></body></html>";
        let record = extractor()
            .extract_record(
                "https://www.khaleejtimes.com/article/2",
                html,
                Some("Listing title"),
            )
            .unwrap();
        assert_eq!(record.title, "Listing title");
    }

    #[test]
    fn test_missing_title_and_fallback() {
        let html = "<html><body></body></html>";
        let record = extractor()
            .extract_record("https://www.khaleejtimes.com/article/3", html, None)
            .unwrap();
        assert_eq!(record.title, "No title found");
    }

    #[test]
    fn test_date_falls_back_to_today() {
        let html = "<html><body><h1 class=\"headline\">T</h1></body></html>";
        let record = extractor()
            .extract_record("https://www.khaleejtimes.com/article/4", html, None)
            .unwrap();
        assert_eq!(
            record.published_date,
            Utc::now().format("%Y-%m-%d").to_string()
        );
    }

    #[test]
    fn test_keywords_from_meta_tag() {
        let html = r#"<html><head>
            <meta name="keywords" content="ai, robotics , , chips">
        </head><body></body></html>"#;
        let record = extractor()
            .extract_record("https://www.khaleejtimes.com/article/5", html, None)
            .unwrap();
        assert_eq!(record.tags, vec!["ai", "robotics", "chips"]);
    }

    #[test]
    fn test_extract_links_from_cards() {
        let html = r#"<html><body>
            <article class="story-card"><h2><a href="/article/one">First story</a></h2></article>
            <article class="story-card"><h2><a href="/article/two">Second story</a></h2></article>
        </body></html>"#;

        let links = extractor().extract_links(html, BASE);
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].url, "https://www.khaleejtimes.com/article/one");
        assert_eq!(links[0].title, "First story");
        assert_eq!(links[1].url, "https://www.khaleejtimes.com/article/two");
    }

    #[test]
    fn test_extract_links_fallback_to_bare_anchors() {
        let html = r#"<html><body>
            <a href="https://www.khaleejtimes.com/news/item">News item</a>
            <a href="/about">About us</a>
        </body></html>"#;

        let links = extractor().extract_links(html, BASE);
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].url, "https://www.khaleejtimes.com/news/item");
    }

    #[test]
    fn test_extract_links_empty_page() {
        let links = extractor().extract_links("<html><body></body></html>", BASE);
        assert!(links.is_empty());
    }

    #[test]
    fn test_relative_links_resolved() {
        let html = r#"<html><body>
            <article class="story-card"><h3><a href="/article/rel">Relative</a></h3></article>
        </body></html>"#;
        let links = extractor().extract_links(html, BASE);
        assert_eq!(links[0].url, "https://www.khaleejtimes.com/article/rel");
    }
}
