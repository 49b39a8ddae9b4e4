//! Headline extraction from a rendered listing page.
//!
//! Financial portals reshuffle their markup often, so locating the headline
//! link inside one listing item is a two-stage probe rather than a single
//! selector:
//!
//! 1. **Primary**: try an ordered list of selector alternatives (e.g.
//!    "link inside a heading", "link with a marker class", "any link") and
//!    take the first match of the first alternative that matches at all.
//! 2. **Fallback**: if the primary is missing or its visible text is too
//!    short to be a headline, scan every descendant link in document order
//!    and take the first with substantial text.
//!
//! The probe result is a tagged [`ProbeOutcome`] so each stage can be
//! exercised on its own. Nothing an individual item does can fail the whole
//! pass; unusable items are skipped with a `debug!` line.

use crate::config::SourceProfile;
use crate::models::HeadlineCandidate;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Selector};
use std::error::Error;
use tracing::debug;

/// Fallback scan considers every descendant anchor.
static ANY_LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a").unwrap());

/// Compiled selector set and text thresholds for one source.
#[derive(Debug)]
pub struct ExtractRules {
    /// Matches one listing entry in the page.
    pub item: Selector,
    /// Headline selector alternatives, in precedence order.
    pub headline_alternatives: Vec<Selector>,
    /// Primary text shorter than this (chars) triggers the fallback scan.
    pub primary_min_chars: usize,
    /// Fallback links qualify with text strictly longer than this (chars).
    pub fallback_min_chars: usize,
}

impl ExtractRules {
    /// Compile the selector strings of a validated profile.
    pub fn compile(profile: &SourceProfile) -> Result<Self, Box<dyn Error>> {
        let item = Selector::parse(&profile.item_selector)
            .map_err(|e| format!("invalid item_selector {:?}: {e}", profile.item_selector))?;
        let mut headline_alternatives = Vec::with_capacity(profile.headline_selectors.len());
        for sel in &profile.headline_selectors {
            headline_alternatives.push(
                Selector::parse(sel)
                    .map_err(|e| format!("invalid headline selector {sel:?}: {e}"))?,
            );
        }
        Ok(ExtractRules {
            item,
            headline_alternatives,
            primary_min_chars: profile.primary_min_chars,
            fallback_min_chars: profile.fallback_min_chars,
        })
    }
}

/// Result of probing one listing item for its headline link.
#[derive(Debug)]
pub enum ProbeOutcome<'a> {
    /// A selector alternative matched and its text passed the threshold,
    /// or no fallback improved on a short-but-present primary.
    Primary(ElementRef<'a>),
    /// The primary was missing or too short; a descendant link with
    /// substantial text was used instead.
    Fallback(ElementRef<'a>),
    /// No link worth keeping anywhere in the item.
    None,
}

/// Visible text of an element with runs of whitespace collapsed to single
/// spaces and surrounding whitespace trimmed.
pub fn normalized_text(el: &ElementRef<'_>) -> String {
    el.text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Locate the headline link inside one listing item.
///
/// The primary stage walks `headline_alternatives` in order and takes the
/// first match of the first alternative that matches. If that element's
/// text is shorter than `primary_min_chars`, the fallback stage scans all
/// descendant links in document order for one with text strictly longer
/// than `fallback_min_chars`. A short primary is only discarded when the
/// fallback actually finds something better.
pub fn probe_headline<'a>(item: ElementRef<'a>, rules: &ExtractRules) -> ProbeOutcome<'a> {
    let primary = rules
        .headline_alternatives
        .iter()
        .find_map(|sel| item.select(sel).next());

    if let Some(el) = primary {
        if normalized_text(&el).chars().count() >= rules.primary_min_chars {
            return ProbeOutcome::Primary(el);
        }
    }

    for link in item.select(&ANY_LINK) {
        if normalized_text(&link).chars().count() > rules.fallback_min_chars {
            return ProbeOutcome::Fallback(link);
        }
    }

    match primary {
        Some(el) => ProbeOutcome::Primary(el),
        None => ProbeOutcome::None,
    }
}

/// Resolve an href against the source origin.
///
/// Root-relative hrefs get the origin prepended; everything else passes
/// through untouched, malformed or not.
pub fn resolve_href(href: &str, origin: &str) -> String {
    if href.starts_with('/') {
        format!("{origin}{href}")
    } else {
        href.to_string()
    }
}

/// Extract up to `max_count` headline candidates from listing items, in
/// input order.
///
/// Callers wanting the newest-appearing page items kept when the cap
/// truncates should reverse `items` first. An item is skipped (never a
/// fault) when no link is found, its text is empty, its href is absent or
/// empty, or the href is a same-page fragment. Duplicates are kept as-is.
pub fn extract(
    items: &[ElementRef<'_>],
    rules: &ExtractRules,
    max_count: usize,
    origin: &str,
) -> Vec<HeadlineCandidate> {
    let mut candidates = Vec::new();

    for (index, item) in items.iter().enumerate() {
        if candidates.len() >= max_count {
            break;
        }

        let link = match probe_headline(*item, rules) {
            ProbeOutcome::Primary(el) => el,
            ProbeOutcome::Fallback(el) => {
                debug!(index, "Primary headline selector unusable; using fallback link");
                el
            }
            ProbeOutcome::None => {
                debug!(index, "No headline link in item; skipping");
                continue;
            }
        };

        let title = normalized_text(&link);
        if title.is_empty() {
            debug!(index, "Headline text empty; skipping");
            continue;
        }

        let href = match link.value().attr("href") {
            Some(h) if !h.is_empty() => h,
            _ => {
                debug!(index, %title, "Headline link has no href; skipping");
                continue;
            }
        };
        if href.starts_with('#') {
            debug!(index, %title, href, "Fragment-only href; skipping");
            continue;
        }

        candidates.push(HeadlineCandidate {
            title,
            url: resolve_href(href, origin),
        });
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    const ORIGIN: &str = "https://example.com";

    fn rules() -> ExtractRules {
        ExtractRules {
            item: Selector::parse("li.story-item").unwrap(),
            headline_alternatives: vec![
                Selector::parse("h3 a").unwrap(),
                Selector::parse("a.subtle-link").unwrap(),
            ],
            primary_min_chars: 5,
            fallback_min_chars: 10,
        }
    }

    fn extract_from(html: &str, max_count: usize) -> Vec<HeadlineCandidate> {
        let document = Html::parse_document(html);
        let rules = rules();
        let items: Vec<_> = document.select(&rules.item).collect();
        extract(&items, &rules, max_count, ORIGIN)
    }

    fn probe_first(html: &str) -> String {
        let document = Html::parse_document(html);
        let rules = rules();
        let item = document.select(&rules.item).next().unwrap();
        match probe_headline(item, &rules) {
            ProbeOutcome::Primary(el) => format!("primary:{}", normalized_text(&el)),
            ProbeOutcome::Fallback(el) => format!("fallback:{}", normalized_text(&el)),
            ProbeOutcome::None => "none".to_string(),
        }
    }

    #[test]
    fn test_primary_selector_wins() {
        let html = r#"<ul>
            <li class="story-item">
                <h3><a href="/news/1">Company Posts Record Revenue</a></h3>
                <a href="/news/other">Some Other Much Longer Link Text</a>
            </li>
        </ul>"#;
        assert_eq!(probe_first(html), "primary:Company Posts Record Revenue");
    }

    #[test]
    fn test_selector_alternatives_tried_in_order() {
        let html = r#"<ul>
            <li class="story-item">
                <a class="subtle-link" href="/news/2">Dividend Declared For Q3</a>
            </li>
        </ul>"#;
        assert_eq!(probe_first(html), "primary:Dividend Declared For Q3");
    }

    #[test]
    fn test_whitespace_primary_falls_back() {
        let html = r#"<ul>
            <li class="story-item">
                <h3><a href="/news/img">  </a></h3>
                <a href="/news/3">Full Company Update</a>
            </li>
        </ul>"#;
        assert_eq!(probe_first(html), "fallback:Full Company Update");

        let candidates = extract_from(html, 10);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].title, "Full Company Update");
        assert_eq!(candidates[0].url, "https://example.com/news/3");
    }

    #[test]
    fn test_short_primary_kept_when_no_fallback_qualifies() {
        // "Memo" is under the primary threshold, but no other link has
        // enough text to replace it, so it is retained.
        let html = r#"<ul>
            <li class="story-item">
                <h3><a href="/news/4">Memo</a></h3>
                <a href="/tag">tag</a>
            </li>
        </ul>"#;
        assert_eq!(probe_first(html), "primary:Memo");

        let candidates = extract_from(html, 10);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].title, "Memo");
    }

    #[test]
    fn test_fallback_takes_first_qualifying_link_in_document_order() {
        let html = r#"<ul>
            <li class="story-item">
                <a href="/a">short one</a>
                <a href="/b">First Sufficiently Long Headline</a>
                <a href="/c">Second Sufficiently Long Headline</a>
            </li>
        </ul>"#;
        assert_eq!(
            probe_first(html),
            "fallback:First Sufficiently Long Headline"
        );
    }

    #[test]
    fn test_item_without_links_is_skipped() {
        let html = r#"<ul>
            <li class="story-item"><p>Sponsored content, no link</p></li>
            <li class="story-item">
                <h3><a href="/news/5">Board Approves Buyback Program</a></h3>
            </li>
        </ul>"#;
        let candidates = extract_from(html, 10);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].url, "https://example.com/news/5");
    }

    #[test]
    fn test_fragment_href_rejected() {
        let html = r##"<ul>
            <li class="story-item">
                <h3><a href="#section">Jump To Earnings Section</a></h3>
            </li>
        </ul>"##;
        assert!(extract_from(html, 10).is_empty());
    }

    #[test]
    fn test_missing_and_empty_href_rejected() {
        let html = r#"<ul>
            <li class="story-item"><h3><a>Headline Without A Target</a></h3></li>
            <li class="story-item"><h3><a href="">Headline With Empty Target</a></h3></li>
        </ul>"#;
        assert!(extract_from(html, 10).is_empty());
    }

    #[test]
    fn test_root_relative_href_resolved_against_origin() {
        let html = r#"<ul>
            <li class="story-item"><h3><a href="/news/123">Numbered Press Release</a></h3></li>
        </ul>"#;
        let candidates = extract_from(html, 10);
        assert_eq!(candidates[0].url, "https://example.com/news/123");
    }

    #[test]
    fn test_absolute_href_passes_through() {
        assert_eq!(
            resolve_href("https://other.com/x", ORIGIN),
            "https://other.com/x"
        );
    }

    #[test]
    fn test_bare_slash_resolves_to_site_root() {
        assert_eq!(resolve_href("/", ORIGIN), "https://example.com/");
    }

    #[test]
    fn test_max_count_truncates() {
        let html = r#"<ul>
            <li class="story-item"><h3><a href="/1">First Press Release</a></h3></li>
            <li class="story-item"><h3><a href="/2">Second Press Release</a></h3></li>
            <li class="story-item"><h3><a href="/3">Third Press Release</a></h3></li>
        </ul>"#;
        let candidates = extract_from(html, 2);
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].url, "https://example.com/1");
        assert_eq!(candidates[1].url, "https://example.com/2");
    }

    #[test]
    fn test_reversed_input_biases_truncation() {
        let html = r#"<ul>
            <li class="story-item"><h3><a href="/1">First Press Release</a></h3></li>
            <li class="story-item"><h3><a href="/2">Second Press Release</a></h3></li>
            <li class="story-item"><h3><a href="/3">Third Press Release</a></h3></li>
        </ul>"#;
        let document = Html::parse_document(html);
        let rules = rules();
        let mut items: Vec<_> = document.select(&rules.item).collect();
        items.reverse();

        let candidates = extract(&items, &rules, 2, ORIGIN);
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].url, "https://example.com/3");
        assert_eq!(candidates[1].url, "https://example.com/2");
    }

    #[test]
    fn test_duplicates_are_kept() {
        let html = r#"<ul>
            <li class="story-item"><h3><a href="/same">Repeated Press Release</a></h3></li>
            <li class="story-item"><h3><a href="/same">Repeated Press Release</a></h3></li>
        </ul>"#;
        let candidates = extract_from(html, 10);
        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0], candidates[1]);
    }

    #[test]
    fn test_candidates_never_empty_or_fragment() {
        let html = r##"<ul>
            <li class="story-item"><h3><a href="#top">Fragment Only Headline</a></h3></li>
            <li class="story-item"><h3><a href="/ok">Acceptable Press Release</a></h3></li>
            <li class="story-item"><h3><a href="https://other.com/x">External Press Release</a></h3></li>
        </ul>"##;
        let candidates = extract_from(html, 10);
        assert_eq!(candidates.len(), 2);
        for candidate in &candidates {
            assert!(!candidate.url.is_empty());
            assert!(!candidate.url.starts_with('#'));
        }
    }

    #[test]
    fn test_multiline_headline_text_normalized() {
        let html = "<ul><li class=\"story-item\"><h3><a href=\"/n\">Spread\n   Across   Lines</a></h3></li></ul>";
        let candidates = extract_from(html, 10);
        assert_eq!(candidates[0].title, "Spread Across Lines");
    }

    #[test]
    fn test_compile_rejects_bad_selector() {
        let profile = SourceProfile {
            headline_selectors: vec!["h3 a".to_string(), ")".to_string()],
            ..SourceProfile::default()
        };
        assert!(ExtractRules::compile(&profile).is_err());
    }

    #[test]
    fn test_compile_default_profile() {
        let rules = ExtractRules::compile(&SourceProfile::default()).unwrap();
        assert_eq!(rules.headline_alternatives.len(), 3);
        assert_eq!(rules.primary_min_chars, 5);
        assert_eq!(rules.fallback_min_chars, 10);
    }
}
