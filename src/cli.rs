//! Command-line interface definitions.
//!
//! Global options describe the source and the pipeline; the subcommand picks
//! the entry point. Every option can also come from the environment, and
//! most from the YAML file given with `--config`.

use crate::config::Strategy;
use crate::outputs::rss::FeedStyle;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// # Serve /feed and /update on port 3000
/// pronews_rss serve --bind 0.0.0.0:3000
///
/// # Print the current feed once
/// pronews_rss feed --name pronews
///
/// # Cron-friendly update check with a durable snapshot
/// pronews_rss --snapshot-file /var/lib/pronews/snapshot.json check --webhook https://hooks.example.com/in
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML config file
    #[arg(short, long, global = true, env = "PRONEWS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Listing page to scrape
    #[arg(long, global = true, env = "SOURCE_URL")]
    pub source_url: Option<String>,

    /// CSS selector matching the headline anchors on the listing page
    #[arg(long, global = true)]
    pub selector: Option<String>,

    /// Extraction strategy
    #[arg(long, global = true, value_enum)]
    pub strategy: Option<Strategy>,

    /// RSS layout (defaults to compact for structural, full for generative)
    #[arg(long, global = true, value_enum)]
    pub style: Option<FeedStyle>,

    /// Keep the novelty snapshot in this JSON file instead of memory
    #[arg(long, global = true, env = "SNAPSHOT_FILE")]
    pub snapshot_file: Option<PathBuf>,

    /// Request timeout for the source page, in seconds
    #[arg(long, global = true)]
    pub fetch_timeout_secs: Option<u64>,

    /// Public origin used in the feed's self link, e.g. https://feeds.example.com
    #[arg(long, global = true, env = "PUBLIC_URL")]
    pub public_url: Option<String>,

    /// Gemini API key (generative strategy only)
    #[arg(long, global = true, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: Option<String>,

    /// Gemini model name (generative strategy only)
    #[arg(long, global = true)]
    pub gemini_model: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the HTTP service
    Serve {
        /// Address to listen on
        #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0:3000")]
        bind: String,
    },
    /// Print the current RSS feed to stdout
    Feed {
        /// Feed name used in the self link
        #[arg(long, default_value = "rss")]
        name: String,
    },
    /// Check for new articles once and print the JSON report
    Check {
        /// Webhook notified with one POST per new article
        #[arg(long)]
        webhook: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_serve_defaults() {
        let cli = Cli::parse_from(["pronews_rss", "serve"]);
        assert_eq!(
            cli.command,
            Command::Serve {
                bind: "0.0.0.0:3000".to_string()
            }
        );
    }

    #[test]
    fn test_cli_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "pronews_rss",
            "check",
            "--webhook",
            "https://hooks.example.com/in",
            "--strategy",
            "generative",
            "--selector",
            "h2 > a",
        ]);

        assert_eq!(
            cli.command,
            Command::Check {
                webhook: Some("https://hooks.example.com/in".to_string())
            }
        );
        assert_eq!(cli.strategy, Some(Strategy::Generative));
        assert_eq!(cli.selector.as_deref(), Some("h2 > a"));
    }

    #[test]
    fn test_cli_feed_name_and_style() {
        let cli = Cli::parse_from([
            "pronews_rss",
            "-c",
            "/etc/pronews.yaml",
            "--style",
            "full",
            "feed",
            "--name",
            "pronews",
        ]);

        assert_eq!(cli.config, Some(PathBuf::from("/etc/pronews.yaml")));
        assert_eq!(cli.style, Some(FeedStyle::Full));
        assert_eq!(
            cli.command,
            Command::Feed {
                name: "pronews".to_string()
            }
        );
    }

    #[test]
    fn test_cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["pronews_rss"]).is_err());
    }
}
