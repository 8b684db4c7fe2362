//! Generative extraction through the Gemini `generateContent` REST API.
//!
//! Instead of structural selectors the model is asked, in plain language, to
//! list the main articles of a page as JSON. Its answer goes through the same
//! normalization as the markup strategy, so the rest of the pipeline cannot
//! tell the two apart. Items additionally carry a short description.
//!
//! The API key is mandatory: constructing a [`GenerativeExtractor`] without
//! one fails immediately with [`GenerativeError::MissingApiKey`].

use super::{ExtractStrategy, MAX_ARTICLES, normalize_candidate};
use crate::errors::{ExtractError, GenerativeError};
use crate::fetcher::Fetcher;
use crate::models::FeedItem;
use crate::utils::{looks_truncated, truncate_for_log};
use once_cell::sync::Lazy;
use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{error, info, instrument, warn};
use url::Url;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";
/// Generation is far slower than a page fetch.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

static CODE_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^\s*```(?:json)?\s*(.*?)\s*```\s*$").expect("valid regex"));

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: [RequestPart<'a>; 1],
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: &'static str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// The JSON document the prompt asks the model to return.
#[derive(Debug, Deserialize)]
struct GeneratedItems {
    items: Vec<GeneratedItem>,
}

#[derive(Debug, Deserialize)]
struct GeneratedItem {
    #[serde(default)]
    title: String,
    link: Option<String>,
    description: Option<String>,
}

/// Gemini-backed extractor.
#[derive(Debug)]
pub struct GenerativeExtractor {
    client: reqwest::Client,
    api_key: SecretString,
    model: String,
    endpoint: Url,
}

impl GenerativeExtractor {
    /// Create an extractor whose API calls give up after `timeout`, failing
    /// fast when no API key was configured.
    pub fn new(
        api_key: Option<SecretString>,
        model: impl Into<String>,
        endpoint: Url,
        timeout: Duration,
    ) -> Result<Self, GenerativeError> {
        let api_key = api_key
            .filter(|key| !key.expose_secret().trim().is_empty())
            .ok_or(GenerativeError::MissingApiKey)?;
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key,
            model: model.into(),
            endpoint,
        })
    }

    fn generate_url(&self) -> Result<Url, GenerativeError> {
        let path = format!("v1beta/models/{}:generateContent", self.model);
        Ok(self.endpoint.join(&path)?)
    }

    /// Send `prompt` and return the text of the first candidate.
    #[instrument(level = "info", skip_all, fields(model = %self.model))]
    async fn generate(&self, prompt: &str) -> Result<String, GenerativeError> {
        let t0 = Instant::now();
        let body = GenerateRequest {
            contents: [Content {
                parts: [RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
            },
        };

        let response = self
            .client
            .post(self.generate_url()?)
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            error!(
                status = status.as_u16(),
                elapsed_ms = t0.elapsed().as_millis() as u64,
                "Generation API call failed"
            );
            return Err(GenerativeError::HttpStatus(status.as_u16()));
        }

        let parsed: GenerateResponse = response.json().await?;
        let text = parsed
            .candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .find_map(|p| p.text)
            .ok_or(GenerativeError::EmptyResponse)?;

        info!(
            elapsed_ms = t0.elapsed().as_millis() as u64,
            bytes = text.len(),
            "Generation API call succeeded"
        );
        Ok(text)
    }
}

/// Natural-language instructions for the model.
fn build_prompt(source: &Url) -> String {
    format!(
        "Act as a web scraper for the page at \"{source}\". Identify the main news \
         articles listed on that page, most recent first. For every article give its \
         title, an absolute link to the article and a one or two sentence description.\n\n\
         Answer with one JSON object and nothing else: no markdown, no code fences, no \
         commentary. The object has a single key \"items\" holding an array of objects \
         with the string fields \"title\", \"link\" and \"description\", for example:\n\
         {{\"items\": [{{\"title\": \"Example headline\", \"link\": \"https://example.com/story\", \
         \"description\": \"What the story is about.\"}}]}}"
    )
}

/// Turn raw model output into normalized feed items.
fn parse_items(text: &str, source: &Url) -> Result<Vec<FeedItem>, GenerativeError> {
    let json = CODE_FENCE
        .captures(text)
        .and_then(|c| c.get(1))
        .map_or(text, |m| m.as_str());

    let generated: GeneratedItems = serde_json::from_str(json).map_err(|e| {
        if looks_truncated(&e) {
            warn!(error = %e, "Model output ends early; response was likely truncated");
        }
        warn!(
            error = %e,
            response_preview = %truncate_for_log(json, 300),
            "Model returned non-conforming JSON"
        );
        GenerativeError::InvalidJson(e)
    })?;

    let items: Vec<FeedItem> = generated
        .items
        .into_iter()
        .filter_map(|item| {
            let article = normalize_candidate(&item.title, item.link.as_deref(), source)?;
            let description = item
                .description
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty());
            Some(FeedItem {
                article,
                description,
                pub_date: None,
            })
        })
        .take(MAX_ARTICLES)
        .collect();
    Ok(items)
}

impl ExtractStrategy for GenerativeExtractor {
    #[instrument(level = "info", skip_all, fields(source = %source))]
    async fn extract_items(
        &self,
        _fetcher: &Fetcher,
        source: &Url,
    ) -> Result<Vec<FeedItem>, ExtractError> {
        let prompt = build_prompt(source);
        let text = self.generate(&prompt).await?;
        let items = parse_items(&text, source)?;
        info!(count = items.len(), "Extracted articles through generation");
        Ok(items)
    }
}
