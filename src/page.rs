//! Listing-page retrieval.
//!
//! One bounded HTTP GET per run, no retries: if the page does not arrive
//! within the profile's timeout the run aborts before any feed file is
//! touched. A consent cookie can be attached to pre-dismiss cookie
//! interstitials on portals that gate content behind them; like the
//! consent-dialog click it replaces, it is best-effort and never fatal.

use crate::config::SourceProfile;
use reqwest::header::{HeaderValue, COOKIE};
use scraper::{ElementRef, Html, Selector};
use std::error::Error;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Desktop browser User-Agent; several financial portals serve a stripped
/// or blocked page to unknown clients.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Fetch the raw HTML of the listing page.
#[instrument(level = "info", skip_all, fields(url = %profile.url))]
pub async fn fetch_listing(profile: &SourceProfile) -> Result<String, Box<dyn Error>> {
    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(profile.request_timeout_secs))
        .build()?;

    let mut request = client.get(&profile.url);
    if let Some(cookie) = &profile.consent_cookie {
        match HeaderValue::from_str(cookie) {
            Ok(value) => {
                debug!("Attaching consent cookie");
                request = request.header(COOKIE, value);
            }
            Err(e) => warn!(error = %e, "Ignoring unusable consent cookie"),
        }
    }

    let response = request.send().await?.error_for_status()?;
    let body = response.text().await?;
    info!(bytes = body.len(), "Fetched listing page");
    Ok(body)
}

/// Collect the listing items the extractor will walk, in document order.
pub fn select_items<'a>(document: &'a Html, item_selector: &Selector) -> Vec<ElementRef<'a>> {
    document.select(item_selector).collect()
}
