//! Article extraction strategies.
//!
//! Both strategies produce the same output: an ordered list of at most
//! [`MAX_ARTICLES`] [`FeedItem`]s whose titles are non-empty and whose links
//! are absolute.
//!
//! | Strategy | Module | Input | Notes |
//! |----------|--------|-------|-------|
//! | Structural | [`markup`] | Listing page HTML | CSS selector, pinned per source |
//! | Generative | [`generative`] | Source URL | Gemini prompt, adds descriptions |
//!
//! Callers hold an [`Extractor`] and never care which strategy is behind it.

pub mod generative;
pub mod markup;

use crate::errors::ExtractError;
use crate::fetcher::Fetcher;
use crate::models::{Article, FeedItem};
use url::Url;

pub use generative::GenerativeExtractor;
pub use markup::{MarkupExtractor, SelectorStrategy};

/// Top-N cap applied to every extraction, in page order.
pub const MAX_ARTICLES: usize = 20;

/// A way of turning a source into feed items.
pub trait ExtractStrategy {
    /// Collect the current items for `source`.
    async fn extract_items(
        &self,
        fetcher: &Fetcher,
        source: &Url,
    ) -> Result<Vec<FeedItem>, ExtractError>;
}

/// The configured strategy.
#[derive(Debug)]
pub enum Extractor {
    Markup(MarkupExtractor),
    Generative(GenerativeExtractor),
}

impl ExtractStrategy for Extractor {
    async fn extract_items(
        &self,
        fetcher: &Fetcher,
        source: &Url,
    ) -> Result<Vec<FeedItem>, ExtractError> {
        match self {
            Extractor::Markup(inner) => inner.extract_items(fetcher, source).await,
            Extractor::Generative(inner) => inner.extract_items(fetcher, source).await,
        }
    }
}

/// Resolve `href` into an absolute link.
///
/// Hrefs that already carry a scheme are kept verbatim so that link
/// comparisons see exactly what the page published. Anything else is
/// joined onto `base`. Empty or unresolvable hrefs yield `None`.
pub fn resolve_link(href: &str, base: &Url) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    if Url::parse(href).is_ok() {
        return Some(href.to_string());
    }
    base.join(href).ok().map(String::from)
}

/// Build an [`Article`] from raw title text and href, or drop the candidate.
pub fn normalize_candidate(title: &str, href: Option<&str>, base: &Url) -> Option<Article> {
    let title = title.trim();
    if title.is_empty() {
        return None;
    }
    let link = resolve_link(href?, base)?;
    Some(Article::new(title, link))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://www.pronews.gr/").unwrap()
    }

    #[test]
    fn test_resolve_relative_link() {
        assert_eq!(
            resolve_link("/politics/123/story", &base()).as_deref(),
            Some("https://www.pronews.gr/politics/123/story")
        );
        assert_eq!(
            resolve_link("story.html", &base()).as_deref(),
            Some("https://www.pronews.gr/story.html")
        );
    }

    #[test]
    fn test_resolve_protocol_relative_link() {
        assert_eq!(
            resolve_link("//cdn.pronews.gr/a", &base()).as_deref(),
            Some("https://cdn.pronews.gr/a")
        );
    }

    #[test]
    fn test_absolute_link_kept_verbatim() {
        assert_eq!(
            resolve_link("HTTP://Example.com/A?b=1", &base()).as_deref(),
            Some("HTTP://Example.com/A?b=1")
        );
    }

    #[test]
    fn test_empty_href_dropped() {
        assert_eq!(resolve_link("", &base()), None);
        assert_eq!(resolve_link("   ", &base()), None);
    }

    #[test]
    fn test_normalize_candidate() {
        assert_eq!(
            normalize_candidate("  Headline \n", Some("/a"), &base()),
            Some(Article::new("Headline", "https://www.pronews.gr/a"))
        );
        assert_eq!(normalize_candidate(" \t\n ", Some("/a"), &base()), None);
        assert_eq!(normalize_candidate("Headline", None, &base()), None);
    }
}
