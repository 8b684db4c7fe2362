//! Novelty tracking between successive scrapes.
//!
//! The tracker is a two-state machine:
//!
//! - **Uninitialized** (store holds nothing, or an empty snapshot): the check
//!   stores the current links as the baseline and reports nothing new, even
//!   when the site objectively has articles. A scrape that matched nothing
//!   therefore re-primes instead of turning the next full page into news.
//! - **Tracking**: a check reports the current articles whose link is not in
//!   the stored snapshot, then replaces the snapshot with the current links.
//!
//! The snapshot is replaced right after a successful extraction, before any
//! notification is attempted. Links are compared byte-for-byte; no URL
//! normalization happens (trailing slashes and query order matter).

pub mod store;

use crate::errors::SnapshotError;
use crate::models::Article;
use std::collections::HashSet;
use tokio::sync::Mutex;
use tracing::{info, instrument};

pub use store::{FileStore, MemoryStore, SnapshotBackend, SnapshotStore};

/// Outcome of one [`NoveltyTracker::check`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Novelty {
    /// First check: the baseline was stored, nothing is reported.
    Baseline,
    /// Articles absent from the previous snapshot, in page order.
    Fresh(Vec<Article>),
}

impl Novelty {
    #[cfg(test)]
    pub fn new_articles(&self) -> &[Article] {
        match self {
            Novelty::Baseline => &[],
            Novelty::Fresh(articles) => articles,
        }
    }
}

/// Classifies fresh extractions against the previous snapshot.
#[derive(Debug)]
pub struct NoveltyTracker<S> {
    store: S,
    // Serializes read-diff-replace so overlapping checks in one process
    // cannot both report the same articles.
    guard: Mutex<()>,
}

impl<S: SnapshotStore> NoveltyTracker<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            guard: Mutex::new(()),
        }
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Diff `current` against the stored snapshot and replace the snapshot.
    #[instrument(level = "info", skip_all, fields(current = current.len()))]
    pub async fn check(&self, current: &[Article]) -> Result<Novelty, SnapshotError> {
        let _held = self.guard.lock().await;

        let previous = self.store.load().await?;
        let links: Vec<String> = current.iter().map(|a| a.link.clone()).collect();
        self.store.replace(links).await?;

        let Some(previous) = previous.filter(|links| !links.is_empty()) else {
            info!(baseline = current.len(), "Primed novelty baseline");
            return Ok(Novelty::Baseline);
        };

        let seen: HashSet<&str> = previous.iter().map(String::as_str).collect();
        let fresh: Vec<Article> = current
            .iter()
            .filter(|a| !seen.contains(a.link.as_str()))
            .cloned()
            .collect();

        info!(
            previous = previous.len(),
            fresh = fresh.len(),
            "Compared against previous snapshot"
        );
        Ok(Novelty::Fresh(fresh))
    }
}
