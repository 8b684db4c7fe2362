//! Data models shared by the scrape, diff and publish stages.
//!
//! - [`Article`]: a scraped headline and its absolute link
//! - [`FeedItem`]: an [`Article`] enriched with optional description and date
//! - [`FeedMetadata`]: channel-level data supplied by the caller
//! - [`UpdateReport`]: the JSON body returned by the update check
//!
//! The JSON field names follow the shapes webhook receivers and HTTP
//! clients already consume (`newArticles`, `pubDate`), hence the serde
//! renames.

use serde::{Deserialize, Serialize};

/// A single headline scraped from the listing page.
///
/// `link` is always absolute and `title` is never empty once an `Article`
/// has been constructed by the extractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Headline text, trimmed.
    pub title: String,
    /// Absolute URL of the article.
    pub link: String,
}

impl Article {
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
        }
    }
}

/// Serializer input: an [`Article`] plus the optional fields RSS items carry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedItem {
    #[serde(flatten)]
    pub article: Article,
    /// Short summary; only the generative strategy produces one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Publication instant as RFC 3339 or RFC 2822 text.
    #[serde(default, rename = "pubDate", skip_serializing_if = "Option::is_none")]
    pub pub_date: Option<String>,
}

impl From<Article> for FeedItem {
    fn from(article: Article) -> Self {
        Self {
            article,
            description: None,
            pub_date: None,
        }
    }
}

/// Channel-level metadata, static per feed instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedMetadata {
    pub title: String,
    /// Channel description. RSS requires one, so the title stands in when absent.
    pub description: Option<String>,
    pub site_url: String,
    /// Self-referencing URL announced through `atom:link`.
    pub feed_url: String,
    pub language: Option<String>,
    /// Suggested refresh interval in minutes.
    pub ttl: Option<u32>,
}

/// Result of one check-for-updates run.
///
/// The first run after a cold start carries a `message` and no
/// `newArticles`; every later run lists the newly seen articles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReport {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub updated: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_articles: Option<Vec<Article>>,
    pub total: usize,
}

impl UpdateReport {
    /// Report for the priming run that establishes the baseline snapshot.
    pub fn baseline(total: usize) -> Self {
        Self {
            message: Some("Initialized link history. No new articles to report.".to_string()),
            updated: 0,
            new_articles: None,
            total,
        }
    }

    /// Report listing the articles absent from the previous snapshot.
    pub fn with_new(new_articles: Vec<Article>, total: usize) -> Self {
        Self {
            message: None,
            updated: new_articles.len(),
            new_articles: Some(new_articles),
            total,
        }
    }
}
