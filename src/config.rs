//! Source profiles: everything that varies between scrape targets.
//!
//! The six hand-maintained revisions of this scraper disagreed only on
//! constants: item cap (10/15/20), selectors, thresholds, timeouts. A
//! [`SourceProfile`] captures all of those as data, with the most recent
//! Yahoo Finance revision as the built-in default and YAML files for
//! anything else.
//!
//! A profile is loaded once at startup, merged with CLI overrides, then
//! validated (selectors must parse, feed metadata must be populated) so
//! that bad configuration fails before any network traffic.

use crate::cli::Cli;
use scraper::Selector;
use serde::{Deserialize, Serialize};
use std::error::Error;
use tracing::{info, instrument};
use url::Url;

fn default_max_items() -> usize {
    20
}

fn default_primary_min_chars() -> usize {
    5
}

fn default_fallback_min_chars() -> usize {
    10
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_newest_first() -> bool {
    true
}

fn default_language() -> String {
    "en".to_string()
}

/// Channel-level metadata stamped onto the generated feed.
///
/// All fields end up in the output document, so validation rejects empty
/// values. An omitted `id` is normalized to the channel link.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FeedMeta {
    /// Feed identifier, emitted as the `atom:link rel="self"` href.
    #[serde(default)]
    pub id: String,
    /// Channel title.
    pub title: String,
    /// Channel link (the page being scraped, relation "alternate").
    pub link: String,
    /// Channel description.
    pub description: String,
    /// Channel language code.
    #[serde(default = "default_language")]
    pub language: String,
}

/// One scrape target: where to fetch, how to pick items, and what the
/// resulting feed should say about itself.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceProfile {
    /// URL of the press-release listing page.
    pub url: String,
    /// Path the RSS document is written to.
    pub output_file: String,
    /// Cap on the number of feed entries.
    #[serde(default = "default_max_items")]
    pub max_items: usize,
    /// CSS selector matching one listing entry.
    pub item_selector: String,
    /// Ordered headline selector alternatives, tried first to last per item.
    pub headline_selectors: Vec<String>,
    /// Primary headline text shorter than this triggers the fallback scan.
    #[serde(default = "default_primary_min_chars")]
    pub primary_min_chars: usize,
    /// A fallback link qualifies only with text strictly longer than this.
    #[serde(default = "default_fallback_min_chars")]
    pub fallback_min_chars: usize,
    /// Bound on the page fetch, in seconds. One attempt, no retry.
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Cookie header attached to the request to pre-dismiss consent
    /// interstitials. Best-effort; an unusable value is skipped.
    #[serde(default)]
    pub consent_cookie: Option<String>,
    /// Reverse the item list and prepend during assembly so the
    /// newest-appearing page item ends up first in the feed.
    #[serde(default = "default_newest_first")]
    pub newest_first: bool,
    /// Channel metadata for the generated feed.
    pub feed: FeedMeta,
}

impl Default for SourceProfile {
    fn default() -> Self {
        let url = "https://finance.yahoo.com/quote/UWMC/press-releases/".to_string();
        SourceProfile {
            url: url.clone(),
            output_file: "rss.xml".to_string(),
            max_items: default_max_items(),
            item_selector: "li.story-item".to_string(),
            headline_selectors: vec![
                "h3 a".to_string(),
                "a.subtle-link".to_string(),
                "a.link".to_string(),
            ],
            primary_min_chars: default_primary_min_chars(),
            fallback_min_chars: default_fallback_min_chars(),
            request_timeout_secs: default_timeout_secs(),
            consent_cookie: None,
            newest_first: default_newest_first(),
            feed: FeedMeta {
                id: url.clone(),
                title: "UWMC Press Releases (Yahoo Finance)".to_string(),
                link: url,
                description: "Latest UWMC press releases from Yahoo Finance".to_string(),
                language: default_language(),
            },
        }
    }
}

impl SourceProfile {
    /// Apply CLI flag overrides on top of the loaded profile.
    ///
    /// Overriding the source URL cascades into feed id/link when those
    /// mirrored the old URL, so a bare `--url` run still produces a
    /// self-consistent channel.
    pub fn apply_overrides(&mut self, args: &Cli) {
        if let Some(url) = &args.url {
            if self.feed.link == self.url {
                self.feed.link = url.clone();
            }
            if self.feed.id == self.url {
                self.feed.id = url.clone();
            }
            self.url = url.clone();
        }
        if let Some(output_file) = &args.output_file {
            self.output_file = output_file.clone();
        }
        if let Some(max_items) = args.max_items {
            self.max_items = max_items;
        }
        if let Some(timeout_secs) = args.timeout_secs {
            self.request_timeout_secs = timeout_secs;
        }
        if args.page_order {
            self.newest_first = false;
        }
    }

    /// Fill derivable fields left empty by a partial YAML profile.
    pub fn normalize(&mut self) {
        if self.feed.id.is_empty() {
            self.feed.id = self.feed.link.clone();
        }
        if self.feed.language.is_empty() {
            self.feed.language = default_language();
        }
    }

    /// Check the profile before any network traffic happens.
    ///
    /// Selector syntax errors and empty feed metadata are configuration
    /// mistakes, surfaced here rather than mid-scrape.
    pub fn validate(&self) -> Result<(), Box<dyn Error>> {
        if self.max_items == 0 {
            return Err("max_items must be at least 1".into());
        }
        if self.headline_selectors.is_empty() {
            return Err("headline_selectors must list at least one selector".into());
        }
        Selector::parse(&self.item_selector)
            .map_err(|e| format!("invalid item_selector {:?}: {e}", self.item_selector))?;
        for sel in &self.headline_selectors {
            Selector::parse(sel).map_err(|e| format!("invalid headline selector {sel:?}: {e}"))?;
        }
        Url::parse(&self.url).map_err(|e| format!("invalid source url {:?}: {e}", self.url))?;
        for (field, value) in [
            ("feed.id", &self.feed.id),
            ("feed.title", &self.feed.title),
            ("feed.link", &self.feed.link),
            ("feed.description", &self.feed.description),
            ("feed.language", &self.feed.language),
        ] {
            if value.trim().is_empty() {
                return Err(format!("{field} must not be empty").into());
            }
        }
        Ok(())
    }

    /// Scheme + host (+ port) of the source URL, used to resolve
    /// root-relative hrefs.
    pub fn origin(&self) -> Result<String, Box<dyn Error>> {
        let parsed = Url::parse(&self.url)?;
        let host = parsed.host_str().ok_or("source url has no host")?;
        Ok(match parsed.port() {
            Some(port) => format!("{}://{host}:{port}", parsed.scheme()),
            None => format!("{}://{host}", parsed.scheme()),
        })
    }
}

/// Load a [`SourceProfile`] from a YAML file, normalized but not yet
/// validated (validation happens after CLI overrides are merged in).
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn load_profile(path: &str) -> Result<SourceProfile, Box<dyn Error>> {
    let raw = tokio::fs::read_to_string(path).await?;
    let mut profile: SourceProfile = serde_yaml::from_str(&raw)?;
    profile.normalize();
    info!(url = %profile.url, "Loaded source profile");
    Ok(profile)
}
