//! Structural extraction from listing-page markup.
//!
//! The algorithm is fixed: parse the document, select the headline anchors,
//! normalize each into an [`Article`], keep the first [`MAX_ARTICLES`].
//! Only the selector varies per source.
//!
//! # Pinned markup contract
//!
//! Pronews.gr renders every headline on its front page as
//! `<a class="card__title" href="/...">Title</a>`. [`DEFAULT_SELECTOR`]
//! targets exactly that. When the site changes its markup the feed silently
//! becomes empty; override the selector through configuration rather than
//! code.

use super::{ExtractStrategy, MAX_ARTICLES, normalize_candidate};
use crate::errors::{ConfigError, ExtractError};
use crate::fetcher::Fetcher;
use crate::models::{Article, FeedItem};
use scraper::{Html, Selector};
use tracing::{debug, info, instrument};
use url::Url;

/// Headline anchors on the Pronews.gr listing page.
pub const DEFAULT_SELECTOR: &str = "a.card__title";

/// A parsed CSS selector identifying headline anchors.
#[derive(Debug, Clone)]
pub struct SelectorStrategy {
    raw: String,
    selector: Selector,
}

impl SelectorStrategy {
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let selector =
            Selector::parse(raw).map_err(|_| ConfigError::InvalidSelector(raw.to_string()))?;
        Ok(Self {
            raw: raw.to_string(),
            selector,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl Default for SelectorStrategy {
    fn default() -> Self {
        Self {
            raw: DEFAULT_SELECTOR.to_string(),
            selector: Selector::parse(DEFAULT_SELECTOR).expect("default selector is valid CSS"),
        }
    }
}

/// Selector-driven extractor.
#[derive(Debug, Clone, Default)]
pub struct MarkupExtractor {
    strategy: SelectorStrategy,
}

impl MarkupExtractor {
    pub fn new(strategy: SelectorStrategy) -> Self {
        Self { strategy }
    }

    /// Extract headline articles from `html`, resolving relative links
    /// against `base`.
    ///
    /// Never fails: malformed markup just yields fewer (possibly zero)
    /// matches.
    pub fn extract(&self, html: &str, base: &Url) -> Vec<Article> {
        let document = Html::parse_document(html);

        let mut matched = 0usize;
        let articles: Vec<Article> = document
            .select(&self.strategy.selector)
            .inspect(|_| matched += 1)
            .filter_map(|element| {
                let title = element.text().collect::<String>();
                normalize_candidate(&title, element.value().attr("href"), base)
            })
            .take(MAX_ARTICLES)
            .collect();

        debug!(
            selector = self.strategy.as_str(),
            matched,
            kept = articles.len(),
            "Applied headline selector"
        );
        articles
    }
}

impl ExtractStrategy for MarkupExtractor {
    #[instrument(level = "info", skip_all, fields(source = %source))]
    async fn extract_items(
        &self,
        fetcher: &Fetcher,
        source: &Url,
    ) -> Result<Vec<FeedItem>, ExtractError> {
        let html = fetcher.fetch(source).await?;
        let articles = self.extract(&html, source);
        info!(count = articles.len(), "Extracted articles from markup");
        Ok(articles.into_iter().map(FeedItem::from).collect())
    }
}
