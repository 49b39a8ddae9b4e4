//! RSS feed assembly and output.
//!
//! Builds an `rss::Channel` from the extracted headline candidates. The
//! source pages expose no reliable per-item timestamp, so every entry is
//! stamped with the capture time of the run. Each entry's guid is its
//! resolved URL (permalink).

use crate::config::FeedMeta;
use crate::models::HeadlineCandidate;
use chrono::{DateTime, Utc};
use rss::extension::atom::{AtomExtension, Link};
use rss::{Channel, ChannelBuilder, GuidBuilder, Item, ItemBuilder};
use std::error::Error;
use tracing::{info, instrument};

/// Assemble a complete RSS channel from headline candidates.
///
/// With `prepend` each successive candidate is inserted at the front, so
/// the last-processed candidate serializes first; combined with a
/// pre-reversed item list this keeps the newest-appearing page item at the
/// top of the feed. Without it, output order equals input order.
///
/// Output is deterministic: identical candidates, metadata, and
/// `capture_time` produce a byte-identical document.
pub fn assemble(
    meta: &FeedMeta,
    candidates: &[HeadlineCandidate],
    capture_time: DateTime<Utc>,
    prepend: bool,
) -> Channel {
    let pub_date = capture_time.to_rfc2822();
    let mut items: Vec<Item> = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        let item = ItemBuilder::default()
            .title(Some(candidate.title.clone()))
            .link(Some(candidate.url.clone()))
            .guid(Some(
                GuidBuilder::default()
                    .value(candidate.url.clone())
                    .permalink(true)
                    .build(),
            ))
            .pub_date(Some(pub_date.clone()))
            .build();
        if prepend {
            items.insert(0, item);
        } else {
            items.push(item);
        }
    }

    let self_link = Link {
        href: meta.id.clone(),
        rel: "self".to_string(),
        ..Link::default()
    };

    ChannelBuilder::default()
        .title(meta.title.clone())
        .link(meta.link.clone())
        .description(meta.description.clone())
        .language(Some(meta.language.clone()))
        .atom_ext(Some(AtomExtension {
            links: vec![self_link],
        }))
        .items(items)
        .build()
}

/// Serialize a channel with an XML declaration.
pub fn to_xml(channel: &Channel) -> String {
    format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{channel}")
}

/// Write the feed document to disk.
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn write_feed(channel: &Channel, path: &str) -> Result<(), Box<dyn Error>> {
    let xml = to_xml(channel);
    tokio::fs::write(path, xml).await?;
    info!(items = channel.items().len(), "Wrote RSS feed file");
    Ok(())
}
