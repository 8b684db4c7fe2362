//! Request handlers.

use super::error::ApiError;
use crate::models::UpdateReport;
use crate::pipeline::{Pipeline, self_feed_url};
use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, header},
    response::IntoResponse,
};
use serde::Deserialize;
use std::sync::Arc;
use url::Url;

pub const RSS_CONTENT_TYPE: &str = "application/xml; charset=utf-8";
pub const FEED_CACHE_CONTROL: &str = "s-maxage=3600, stale-while-revalidate";

const DEFAULT_FEED_NAME: &str = "rss";
const FALLBACK_ORIGIN: &str = "http://localhost";

/// Shared application state.
#[derive(Debug)]
pub struct AppState {
    pub pipeline: Pipeline,
    /// Fixed origin for self links; the `Host` header is used when unset.
    pub public_url: Option<Url>,
}

impl AppState {
    pub fn new(pipeline: Pipeline, public_url: Option<Url>) -> Self {
        Self {
            pipeline,
            public_url,
        }
    }

    /// Origin the client reached us on.
    fn origin(&self, headers: &HeaderMap) -> String {
        if let Some(url) = &self.public_url {
            return url.as_str().trim_end_matches('/').to_string();
        }

        let Some(host) = headers
            .get(header::HOST)
            .and_then(|value| value.to_str().ok())
        else {
            return FALLBACK_ORIGIN.to_string();
        };
        let scheme = headers
            .get("x-forwarded-proto")
            .and_then(|value| value.to_str().ok())
            .unwrap_or("http");
        format!("{scheme}://{host}")
    }
}

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    #[serde(default = "default_feed_name")]
    pub name: String,
}

fn default_feed_name() -> String {
    DEFAULT_FEED_NAME.to_string()
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateQuery {
    pub webhook: Option<String>,
}

/// GET /feed - RSS document for the current scrape.
pub async fn feed(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<FeedQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let feed_url = self_feed_url(&state.origin(&headers), &query.name);
    let xml = state
        .pipeline
        .produce_feed(&feed_url)
        .await
        .map_err(ApiError::Feed)?;

    Ok((
        [
            (header::CONTENT_TYPE, RSS_CONTENT_TYPE),
            (header::CACHE_CONTROL, FEED_CACHE_CONTROL),
        ],
        xml,
    ))
}

/// GET /update - check for new articles and notify the webhook.
pub async fn update(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UpdateQuery>,
) -> Result<Json<UpdateReport>, ApiError> {
    let report = state
        .pipeline
        .check_for_updates(query.webhook.as_deref())
        .await
        .map_err(ApiError::Update)?;
    Ok(Json(report))
}

/// GET /health
pub async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChannelSettings;
    use crate::extract::{Extractor, MarkupExtractor};
    use crate::fetcher::Fetcher;
    use crate::novelty::{MemoryStore, SnapshotBackend};
    use crate::outputs::rss::FeedStyle;
    use axum::http::HeaderValue;
    use std::time::Duration;

    fn state(public_url: Option<&str>) -> AppState {
        let pipeline = Pipeline::new(
            Fetcher::new(Duration::from_secs(1)).unwrap(),
            Extractor::Markup(MarkupExtractor::default()),
            Url::parse("http://127.0.0.1:9/").unwrap(),
            SnapshotBackend::Memory(MemoryStore::default()),
            ChannelSettings {
                title: "T".to_string(),
                description: None,
                site_url: "http://x/".to_string(),
                language: None,
                ttl: None,
            },
            FeedStyle::Compact,
        );
        AppState::new(pipeline, public_url.map(|u| Url::parse(u).unwrap()))
    }

    #[test]
    fn test_origin_prefers_public_url() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("internal:3000"));
        let state = state(Some("https://feeds.example.com/"));
        assert_eq!(state.origin(&headers), "https://feeds.example.com");
    }

    #[test]
    fn test_origin_from_host_and_forwarded_proto() {
        let state = state(None);
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("feeds.example.com"));
        assert_eq!(state.origin(&headers), "http://feeds.example.com");

        headers.insert("x-forwarded-proto", HeaderValue::from_static("https"));
        assert_eq!(state.origin(&headers), "https://feeds.example.com");
    }

    #[test]
    fn test_origin_fallback() {
        assert_eq!(state(None).origin(&HeaderMap::new()), "http://localhost");
    }
}
