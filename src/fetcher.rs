//! Source page retrieval.
//!
//! One GET per pipeline run, no retries and no caching. A failed fetch aborts
//! the run and surfaces to the caller as a [`FetchError`].

use crate::errors::FetchError;
use std::time::Duration;
use tracing::{debug, info, instrument};
use url::Url;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Thin wrapper around a pooled [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
}

impl Fetcher {
    /// Build a fetcher whose requests give up after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    /// Shared client, also used for webhook calls.
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Download the HTML of `source`.
    ///
    /// # Errors
    ///
    /// [`FetchError::Network`] on connection/timeout failures and
    /// [`FetchError::HttpStatus`] for any non-2xx response.
    #[instrument(level = "info", skip_all, fields(source = %source))]
    pub async fn fetch(&self, source: &Url) -> Result<String, FetchError> {
        let response = self.client.get(source.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let html = response.text().await?;
        info!(bytes = html.len(), "Fetched source page");
        debug!(preview = %crate::utils::truncate_for_log(&html, 200), "Source page preview");
        Ok(html)
    }
}
