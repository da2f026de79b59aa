//! Content extraction
//!
//! All site-specific selector logic lives behind the `Extractor` trait so
//! the harvest pipeline has zero knowledge of content structure. The
//! default `HtmlExtractor` targets the news-site markup the harvester was
//! built for; swapping sites means swapping the extractor, nothing else.

mod html;
mod traits;

pub use html::HtmlExtractor;
pub use traits::{DiscoveredLink, Extractor};
