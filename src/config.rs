//! Settings resolution.
//!
//! Precedence, highest first: command-line/environment, YAML file, built-in
//! defaults. Everything that can be wrong (URLs, the CSS selector) is
//! validated here so that a bad configuration stops the process at startup
//! instead of failing every request.
//!
//! ```yaml
//! source_url: https://www.pronews.gr/
//! selector: a.card__title
//! strategy: structural
//! title: Pronews.gr RSS Feed
//! description: Latest news from Pronews.gr
//! language: el
//! ttl: 60
//! snapshot_file: /var/lib/pronews/snapshot.json
//! generative:
//!   model: gemini-2.5-flash
//!   timeout_secs: 120
//! ```

use crate::cli::Cli;
use crate::errors::ConfigError;
use crate::extract::SelectorStrategy;
use crate::extract::generative::{DEFAULT_ENDPOINT, DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS};
use crate::extract::markup::DEFAULT_SELECTOR;
use crate::outputs::rss::FeedStyle;
use secrecy::SecretString;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, instrument};
use url::Url;

pub const DEFAULT_SOURCE_URL: &str = "https://www.pronews.gr/";
pub const DEFAULT_TITLE: &str = "Pronews.gr RSS Feed";
pub const DEFAULT_DESCRIPTION: &str = "Latest news from Pronews.gr";
pub const DEFAULT_LANGUAGE: &str = "el";
pub const DEFAULT_TTL_MINUTES: u32 = 60;
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_PUBLIC_URL: &str = "http://localhost:3000";

/// How articles are extracted from the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// CSS selector over the listing page markup
    #[default]
    Structural,
    /// Natural-language prompt to the Gemini API
    Generative,
}

/// YAML file shape. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub source_url: Option<String>,
    pub selector: Option<String>,
    pub strategy: Option<Strategy>,
    pub style: Option<FeedStyle>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub site_url: Option<String>,
    pub language: Option<String>,
    pub ttl: Option<u32>,
    pub snapshot_file: Option<PathBuf>,
    pub fetch_timeout_secs: Option<u64>,
    pub public_url: Option<String>,
    #[serde(default)]
    pub generative: GenerativeFileConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenerativeFileConfig {
    pub model: Option<String>,
    pub endpoint: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl FileConfig {
    pub fn from_yaml(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_yaml(&raw)
    }
}

/// Channel-level feed settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelSettings {
    pub title: String,
    pub description: Option<String>,
    pub site_url: String,
    pub language: Option<String>,
    pub ttl: Option<u32>,
}

/// Settings for the generative strategy.
#[derive(Debug)]
pub struct GeminiSettings {
    pub api_key: Option<SecretString>,
    pub model: String,
    pub endpoint: Url,
    /// Request timeout for generation calls, separate from the page fetch.
    pub timeout: Duration,
}

/// Fully resolved, validated settings.
#[derive(Debug)]
pub struct Settings {
    pub source_url: Url,
    pub selector: SelectorStrategy,
    pub strategy: Strategy,
    pub style: FeedStyle,
    pub channel: ChannelSettings,
    pub snapshot_file: Option<PathBuf>,
    pub fetch_timeout: Duration,
    /// Origin announced in self links. Derived per request when absent.
    pub public_url: Option<Url>,
    pub gemini: GeminiSettings,
}

fn parse_url(value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|source| ConfigError::InvalidUrl {
        value: value.to_string(),
        source,
    })
}

impl Settings {
    /// Resolve settings from the CLI, reading the YAML file it names.
    #[instrument(level = "info", skip_all)]
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let file = match &cli.config {
            Some(path) => {
                info!(path = %path.display(), "Loading config file");
                FileConfig::load(path)?
            }
            None => FileConfig::default(),
        };
        Self::resolve(cli, file)
    }

    /// Merge CLI values over `file` values over defaults.
    pub fn resolve(cli: &Cli, file: FileConfig) -> Result<Self, ConfigError> {
        let source_raw = cli
            .source_url
            .clone()
            .or(file.source_url)
            .unwrap_or_else(|| DEFAULT_SOURCE_URL.to_string());
        let source_url = parse_url(&source_raw)?;

        let selector_raw = cli
            .selector
            .clone()
            .or(file.selector)
            .unwrap_or_else(|| DEFAULT_SELECTOR.to_string());
        let selector = SelectorStrategy::parse(&selector_raw)?;

        let strategy = cli.strategy.or(file.strategy).unwrap_or_default();
        let style = cli.style.or(file.style).unwrap_or(match strategy {
            Strategy::Structural => FeedStyle::Compact,
            Strategy::Generative => FeedStyle::Full,
        });

        let site_url = file.site_url.unwrap_or_else(|| source_url.to_string());
        parse_url(&site_url)?;

        let public_url = cli
            .public_url
            .clone()
            .or(file.public_url)
            .map(|raw| parse_url(&raw))
            .transpose()?;

        let endpoint_raw = file
            .generative
            .endpoint
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        let settings = Self {
            source_url,
            selector,
            strategy,
            style,
            channel: ChannelSettings {
                title: file.title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
                description: Some(
                    file.description
                        .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
                ),
                site_url,
                language: Some(file.language.unwrap_or_else(|| DEFAULT_LANGUAGE.to_string())),
                ttl: Some(file.ttl.unwrap_or(DEFAULT_TTL_MINUTES)),
            },
            snapshot_file: cli.snapshot_file.clone().or(file.snapshot_file),
            fetch_timeout: Duration::from_secs(
                cli.fetch_timeout_secs
                    .or(file.fetch_timeout_secs)
                    .unwrap_or(DEFAULT_FETCH_TIMEOUT_SECS),
            ),
            public_url,
            gemini: GeminiSettings {
                api_key: cli.gemini_api_key.clone().map(SecretString::from),
                model: cli
                    .gemini_model
                    .clone()
                    .or(file.generative.model)
                    .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                endpoint: parse_url(&endpoint_raw)?,
                timeout: Duration::from_secs(
                    file.generative
                        .timeout_secs
                        .unwrap_or(DEFAULT_TIMEOUT_SECS),
                ),
            },
        };

        info!(
            source = %settings.source_url,
            selector = settings.selector.as_str(),
            strategy = ?settings.strategy,
            style = ?settings.style,
            durable_snapshot = settings.snapshot_file.is_some(),
            "Resolved settings"
        );
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use pretty_assertions::assert_eq;

    fn cli(args: &[&str]) -> Cli {
        let mut full = vec!["pronews_rss"];
        full.extend_from_slice(args);
        full.push("check");
        Cli::parse_from(full)
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::resolve(&cli(&[]), FileConfig::default()).unwrap();
        assert_eq!(settings.source_url.as_str(), DEFAULT_SOURCE_URL);
        assert_eq!(settings.selector.as_str(), DEFAULT_SELECTOR);
        assert_eq!(settings.strategy, Strategy::Structural);
        assert_eq!(settings.style, FeedStyle::Compact);
        assert_eq!(settings.fetch_timeout, Duration::from_secs(30));
        assert_eq!(
            settings.channel,
            ChannelSettings {
                title: DEFAULT_TITLE.to_string(),
                description: Some(DEFAULT_DESCRIPTION.to_string()),
                site_url: DEFAULT_SOURCE_URL.to_string(),
                language: Some("el".to_string()),
                ttl: Some(60),
            }
        );
        assert_eq!(settings.gemini.model, DEFAULT_MODEL);
        assert_eq!(settings.gemini.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn test_yaml_values_apply() {
        let file = FileConfig::from_yaml(
            r#"
source_url: https://news.example.com/
selector: "h2.headline a"
strategy: generative
title: Example News
ttl: 15
fetch_timeout_secs: 10
generative:
  model: gemini-2.0-flash
  timeout_secs: 240
"#,
        )
        .unwrap();
        let settings = Settings::resolve(&cli(&[]), file).unwrap();

        assert_eq!(settings.source_url.as_str(), "https://news.example.com/");
        assert_eq!(settings.selector.as_str(), "h2.headline a");
        assert_eq!(settings.strategy, Strategy::Generative);
        assert_eq!(settings.style, FeedStyle::Full);
        assert_eq!(settings.channel.title, "Example News");
        assert_eq!(settings.channel.site_url, "https://news.example.com/");
        assert_eq!(settings.channel.ttl, Some(15));
        assert_eq!(settings.gemini.model, "gemini-2.0-flash");
        assert_eq!(settings.fetch_timeout, Duration::from_secs(10));
        assert_eq!(settings.gemini.timeout, Duration::from_secs(240));
    }

    #[test]
    fn test_cli_overrides_yaml() {
        let file = FileConfig::from_yaml("selector: a.one\nstrategy: generative\n").unwrap();
        let settings = Settings::resolve(
            &cli(&["--selector", "a.two", "--strategy", "structural", "--style", "full"]),
            file,
        )
        .unwrap();

        assert_eq!(settings.selector.as_str(), "a.two");
        assert_eq!(settings.strategy, Strategy::Structural);
        assert_eq!(settings.style, FeedStyle::Full);
    }

    #[test]
    fn test_unknown_yaml_key_rejected() {
        assert!(matches!(
            FileConfig::from_yaml("colour: blue\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            Settings::resolve(&cli(&["--source-url", "not a url"]), FileConfig::default()),
            Err(ConfigError::InvalidUrl { .. })
        ));
        assert!(matches!(
            Settings::resolve(&cli(&["--selector", "a[[["]), FileConfig::default()),
            Err(ConfigError::InvalidSelector(_))
        ));
    }

    #[test]
    fn test_missing_config_file() {
        assert!(matches!(
            FileConfig::load(Path::new("/definitely/not/here.yaml")),
            Err(ConfigError::Read { .. })
        ));
    }
}
