//! The two entry points of the service.
//!
//! - **produce feed**: extract → serialize
//! - **check for updates**: extract → diff against the snapshot → notify
//!
//! Each call runs sequentially; the only concurrency is the webhook batch.
//! Any extraction, snapshot or serialization failure fails the whole call.

use crate::config::{ChannelSettings, Settings, Strategy};
use crate::errors::{ConfigError, PipelineError};
use crate::extract::{ExtractStrategy, Extractor, GenerativeExtractor, MarkupExtractor};
use crate::fetcher::Fetcher;
use crate::models::{Article, FeedItem, FeedMetadata, UpdateReport};
use crate::notifier::Notifier;
use crate::novelty::{FileStore, MemoryStore, Novelty, NoveltyTracker, SnapshotBackend};
use crate::outputs::rss::{self, FeedStyle};
use std::time::Instant;
use tracing::{info, instrument};
use url::Url;

/// Self link for a named feed served under `origin`.
pub fn self_feed_url(origin: &str, name: &str) -> String {
    format!(
        "{}/feed?name={}",
        origin.trim_end_matches('/'),
        urlencoding::encode(name)
    )
}

/// Everything one scrape-diff-publish run needs.
#[derive(Debug)]
pub struct Pipeline {
    fetcher: Fetcher,
    extractor: Extractor,
    source: Url,
    tracker: NoveltyTracker<SnapshotBackend>,
    notifier: Notifier,
    channel: ChannelSettings,
    style: FeedStyle,
}

impl Pipeline {
    pub fn new(
        fetcher: Fetcher,
        extractor: Extractor,
        source: Url,
        snapshots: SnapshotBackend,
        channel: ChannelSettings,
        style: FeedStyle,
    ) -> Self {
        let notifier = Notifier::new(fetcher.client().clone());
        Self {
            fetcher,
            extractor,
            source,
            tracker: NoveltyTracker::new(snapshots),
            notifier,
            channel,
            style,
        }
    }

    /// Build the pipeline described by `settings`.
    ///
    /// Fails fast when the generative strategy is selected without an API key.
    pub fn from_settings(settings: Settings) -> Result<Self, ConfigError> {
        let fetcher = Fetcher::new(settings.fetch_timeout)?;

        let extractor = match settings.strategy {
            Strategy::Structural => Extractor::Markup(MarkupExtractor::new(settings.selector)),
            Strategy::Generative => Extractor::Generative(GenerativeExtractor::new(
                settings.gemini.api_key,
                settings.gemini.model,
                settings.gemini.endpoint,
                settings.gemini.timeout,
            )?),
        };

        let snapshots = match settings.snapshot_file {
            Some(path) => SnapshotBackend::File(FileStore::new(path)),
            None => SnapshotBackend::Memory(MemoryStore::default()),
        };

        Ok(Self::new(
            fetcher,
            extractor,
            settings.source_url,
            snapshots,
            settings.channel,
            settings.style,
        ))
    }

    pub fn source(&self) -> &Url {
        &self.source
    }

    /// Current items, capped and normalized by the configured strategy.
    pub async fn current_items(&self) -> Result<Vec<FeedItem>, PipelineError> {
        Ok(self.extractor.extract_items(&self.fetcher, &self.source).await?)
    }

    /// Produce the RSS document for the current scrape.
    #[instrument(level = "info", skip_all, fields(source = %self.source))]
    pub async fn produce_feed(&self, feed_url: &str) -> Result<String, PipelineError> {
        let t0 = Instant::now();
        let items = self.current_items().await?;

        let meta = FeedMetadata {
            title: self.channel.title.clone(),
            description: self.channel.description.clone(),
            site_url: self.channel.site_url.clone(),
            feed_url: feed_url.to_string(),
            language: self.channel.language.clone(),
            ttl: self.channel.ttl,
        };
        let xml = rss::serialize(self.style, &meta, &items)?;

        info!(
            items = items.len(),
            bytes = xml.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Produced feed"
        );
        Ok(xml)
    }

    /// Diff the current scrape against the previous one and notify `webhook`
    /// about every new article.
    #[instrument(level = "info", skip_all, fields(source = %self.source, webhook = webhook.is_some()))]
    pub async fn check_for_updates(
        &self,
        webhook: Option<&str>,
    ) -> Result<UpdateReport, PipelineError> {
        let articles: Vec<Article> = self
            .current_items()
            .await?
            .into_iter()
            .map(|item| item.article)
            .collect();
        let total = articles.len();

        let fresh = match self.tracker.check(&articles).await? {
            Novelty::Baseline => return Ok(UpdateReport::baseline(total)),
            Novelty::Fresh(fresh) => fresh,
        };

        if let Some(webhook) = webhook.map(str::trim).filter(|w| !w.is_empty()) {
            if !fresh.is_empty() {
                self.notifier.notify_all(webhook, &fresh).await;
            }
        }

        info!(updated = fresh.len(), total, "Update check complete");
        Ok(UpdateReport::with_new(fresh, total))
    }
}
