//! # pressfeed
//!
//! Scrapes a company's press-release listing page and republishes the
//! headlines as an RSS feed file. Listing pages on financial portals expose
//! no feed of their own and reshuffle their markup frequently, so headline
//! links are located with an ordered set of selector alternatives plus a
//! text-length fallback scan.
//!
//! ## Usage
//!
//! ```sh
//! pressfeed                          # built-in Yahoo Finance profile
//! pressfeed --config acme.yaml       # custom source profile
//! pressfeed -n 10 -o feeds/press.xml # per-run overrides
//! ```
//!
//! ## Pipeline
//!
//! 1. **Fetch**: one bounded HTTP GET of the listing page
//! 2. **Extract**: per-item two-stage headline probe, capped at `max_items`
//! 3. **Assemble**: RSS channel, every entry stamped with the capture time
//! 4. **Output**: feed document written to the configured file
//!
//! Each run is independent; no state is carried between invocations.

use chrono::Utc;
use clap::Parser;
use scraper::Html;
use std::error::Error;
use tracing::{debug, info, instrument, warn};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

mod cli;
mod config;
mod extract;
mod feed;
mod models;
mod page;

use cli::Cli;
use config::SourceProfile;
use extract::ExtractRules;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("pressfeed starting up");

    // Parse CLI and resolve the source profile
    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let mut profile = match &args.config {
        Some(path) => config::load_profile(path).await?,
        None => SourceProfile::default(),
    };
    profile.apply_overrides(&args);
    profile.validate()?;

    let rules = ExtractRules::compile(&profile)?;
    let origin = profile.origin()?;
    info!(url = %profile.url, max_items = profile.max_items, "Source profile resolved");

    // ---- Fetch the listing page ----
    let body = page::fetch_listing(&profile).await?;
    let document = Html::parse_document(&body);

    let mut items = page::select_items(&document, &rules.item);
    if items.is_empty() {
        warn!(
            selector = %profile.item_selector,
            "No listing items found; the page layout may have shifted. Leaving any previous feed untouched"
        );
        return Ok(());
    }
    info!(count = items.len(), "Found listing items");

    // Reverse so the newest-appearing page items survive truncation; the
    // assembler's prepend puts them back on top of the feed.
    if profile.newest_first {
        items.reverse();
    }

    // ---- Extract headline candidates ----
    let candidates = extract::extract(&items, &rules, profile.max_items, &origin);
    info!(count = candidates.len(), "Extracted headline candidates");

    // ---- Assemble and write the feed ----
    let capture_time = Utc::now();
    let channel = feed::assemble(&profile.feed, &candidates, capture_time, profile.newest_first);
    feed::write_feed(&channel, &profile.output_file).await?;

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        path = %profile.output_file,
        items = channel.items().len(),
        "Execution complete"
    );

    Ok(())
}
