//! Core data types shared across the extraction and feed-assembly stages.

/// An extracted (title, URL) pair before it becomes a feed entry.
///
/// Candidates carry an already-resolved absolute URL; relative hrefs are
/// resolved against the source origin during extraction. The URL later
/// doubles as the feed entry's guid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadlineCandidate {
    /// Visible headline text, whitespace-normalized.
    pub title: String,
    /// Absolute URL of the story.
    pub url: String,
}
