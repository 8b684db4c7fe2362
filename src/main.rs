//! # Pronews RSS
//!
//! Turns a news site's listing page into an RSS 2.0 feed and tells webhook
//! subscribers when new articles appear.
//!
//! ## Features
//!
//! - Structural extraction with a pinned CSS selector (`a.card__title` by
//!   default), or generative extraction through the Gemini API
//! - Compact or full RSS 2.0 documents with an `atom:link` self reference
//! - Link-based novelty tracking against the previous scrape, in memory or
//!   in a JSON snapshot file
//! - Concurrent webhook notification, one POST per new article
//!
//! ## Usage
//!
//! ```sh
//! pronews_rss serve --bind 0.0.0.0:3000
//! pronews_rss feed --name pronews > feed.xml
//! pronews_rss --snapshot-file ./snapshot.json check --webhook https://hooks.example.com/in
//! ```
//!
//! ## Architecture
//!
//! 1. **Fetching**: download the listing page (single attempt, timeout bound)
//! 2. **Extraction**: turn it into at most 20 titled, absolute-link items
//! 3. **Output**: serialize to RSS, or diff against the snapshot and notify

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod errors;
mod extract;
mod fetcher;
mod models;
mod notifier;
mod novelty;
mod outputs;
mod pipeline;
mod server;
mod utils;

use cli::{Cli, Command};
use config::{DEFAULT_PUBLIC_URL, Settings};
use pipeline::{Pipeline, self_feed_url};
use server::AppState;
use utils::ensure_writable_parent;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!(version = env!("CARGO_PKG_VERSION"), "pronews_rss starting up");

    let args = Cli::parse();
    debug!(command = ?args.command, "Parsed CLI arguments");

    let settings = Settings::load(&args)?;

    // Early check: a durable snapshot must be writable before the first run
    if let Some(path) = &settings.snapshot_file {
        if let Err(e) = ensure_writable_parent(path).await {
            error!(
                path = %path.display(),
                error = %e,
                "Snapshot directory is not writable (fix perms or choose a different path)"
            );
            return Err(e);
        }
    }

    let public_url = settings.public_url.clone();
    let pipeline = Pipeline::from_settings(settings)?;
    info!(source = %pipeline.source(), "Pipeline ready");

    match args.command {
        Command::Serve { bind } => {
            server::serve(&bind, AppState::new(pipeline, public_url)).await?;
        }
        Command::Feed { name } => {
            let origin = public_url
                .as_ref()
                .map(|url| url.as_str().to_string())
                .unwrap_or_else(|| DEFAULT_PUBLIC_URL.to_string());
            let xml = pipeline.produce_feed(&self_feed_url(&origin, &name)).await?;
            println!("{xml}");
        }
        Command::Check { webhook } => {
            let report = pipeline.check_for_updates(webhook.as_deref()).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
