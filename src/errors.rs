//! Error taxonomy for the scrape-diff-publish pipeline.
//!
//! Only [`FetchError`], [`ExtractError`], [`SnapshotError`] and [`FeedError`]
//! can fail an entry point. Notification failures are logged and swallowed
//! by the notifier, and malformed markup never produces an error at all.

use thiserror::Error;

/// Failure reaching the source page. Never retried.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, timeout).
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// Response with a non-2xx status code.
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
}

/// Failure of the generative extraction strategy.
#[derive(Debug, Error)]
pub enum GenerativeError {
    #[error("GEMINI_API_KEY is not set; the generative strategy needs an API key")]
    MissingApiKey,
    #[error("Invalid generation endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),
    #[error("Generation request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Generation API returned status {0}")]
    HttpStatus(u16),
    #[error("Generation API returned no text")]
    EmptyResponse,
    #[error("Model output is not the expected JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// Failure of an extraction strategy as a whole.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Generative(#[from] GenerativeError),
}

/// Failure reading or replacing the novelty snapshot.
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("Snapshot file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// Failure writing the RSS document.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("XML write failed: {0}")]
    Write(#[from] std::io::Error),
    #[error("XML output is not UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Webhook delivery failure. Logged by the notifier, never propagated.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Invalid webhook URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Unsupported webhook scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    #[error("Webhook delivery failed: {0}")]
    Delivery(#[from] reqwest::Error),
    #[error("Webhook responded with status {0}")]
    HttpStatus(u16),
}

/// Failure of a whole entry-point run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error(transparent)]
    Feed(#[from] FeedError),
}

/// Invalid startup configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Cannot parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid URL {value}: {source}")]
    InvalidUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Invalid CSS selector {0}")]
    InvalidSelector(String),
    #[error(transparent)]
    Generative(#[from] GenerativeError),
    #[error("Cannot build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}
