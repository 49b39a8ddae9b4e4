//! Command-line interface definitions for pressfeed.
//!
//! This module defines the CLI arguments and options using the `clap` crate.
//! Every scrape parameter lives in a [`SourceProfile`](crate::config::SourceProfile);
//! the flags here either point at a profile file or override individual fields
//! of the loaded (or default) profile.

use clap::Parser;

/// Command-line arguments for the pressfeed scraper.
///
/// With no arguments the built-in profile is used (Yahoo Finance press
/// releases, 20 items, `rss.xml`). A YAML profile file can replace it
/// wholesale, and individual flags override whichever profile is active.
///
/// # Examples
///
/// ```sh
/// # Built-in profile
/// pressfeed
///
/// # Custom source profile
/// pressfeed --config profiles/acme.yaml
///
/// # One-off override of the item cap and output path
/// pressfeed -n 10 -o /var/www/feeds/press.xml
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to a YAML source profile
    #[arg(short, long)]
    pub config: Option<String>,

    /// Listing page URL (overrides the profile)
    #[arg(short, long)]
    pub url: Option<String>,

    /// Output path for the RSS file (overrides the profile)
    #[arg(short, long)]
    pub output_file: Option<String>,

    /// Maximum number of feed entries (overrides the profile)
    #[arg(short = 'n', long)]
    pub max_items: Option<usize>,

    /// HTTP request timeout in seconds (overrides the profile)
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Emit entries in page order instead of newest-first
    #[arg(long)]
    pub page_order: bool,
}
