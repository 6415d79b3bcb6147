//! Playlist ingestion
//!
//! Raw source text is classified into one of two dialects and turned into a
//! lazy sequence of [`PlaylistItem`]s:
//!
//! - **Extended** (`#EXTINF` metadata lines followed by a URL line), handled by
//!   [`m3u_parser`]
//! - **Delimited** (`<category>,#genre#` markers followed by `<name>,<url>`
//!   rows), handled by [`txt_parser`]
//!
//! Both parsers skip malformed lines with a diagnostic instead of failing the
//! whole source. [`aggregator`] runs fetch + parse over every source.

use serde::Serialize;
use tracing::warn;

use crate::models::{ChannelPool, ChannelRecord};

pub mod aggregator;
pub mod m3u_parser;
pub mod txt_parser;

pub use aggregator::{AggregationResult, Aggregator, SourceOutcome, SourceReport};
pub use m3u_parser::M3uEntries;
pub use txt_parser::TxtEntries;

/// Marker token of an extended metadata line
pub const EXTINF_MARKER: &str = "#EXTINF";

/// Number of leading non-empty lines inspected by [`detect_dialect`]
pub const DETECTION_WINDOW: usize = 5;

/// The two tolerated playlist text formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaylistDialect {
    /// Metadata-annotated entries (`#EXTINF:...` + URL)
    Extended,
    /// Category markers plus comma-delimited rows
    Delimited,
}

/// Classify raw source text. Extended if any of the first few non-empty lines
/// carries the metadata marker, delimited otherwise.
pub fn detect_dialect(content: &str) -> PlaylistDialect {
    let is_extended = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(DETECTION_WINDOW)
        .any(|line| line.contains(EXTINF_MARKER));

    if is_extended {
        PlaylistDialect::Extended
    } else {
        PlaylistDialect::Delimited
    }
}

/// One unit produced while scanning a source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaylistItem {
    /// A category marker; collected records for this category restart here
    Category(String),
    Channel(ChannelRecord),
}

/// Lazy item sequence over one source body, whichever dialect it is in.
///
/// Restart by calling [`PlaylistItems::new`] on the same text again.
#[derive(Debug, Clone)]
pub enum PlaylistItems<'a> {
    Extended(M3uEntries<'a>),
    Delimited(TxtEntries<'a>),
}

impl<'a> PlaylistItems<'a> {
    pub fn new(content: &'a str) -> Self {
        Self::with_dialect(content, detect_dialect(content))
    }

    pub fn with_dialect(content: &'a str, dialect: PlaylistDialect) -> Self {
        match dialect {
            PlaylistDialect::Extended => PlaylistItems::Extended(M3uEntries::new(content)),
            PlaylistDialect::Delimited => PlaylistItems::Delimited(TxtEntries::new(content)),
        }
    }

    pub fn dialect(&self) -> PlaylistDialect {
        match self {
            PlaylistItems::Extended(_) => PlaylistDialect::Extended,
            PlaylistItems::Delimited(_) => PlaylistDialect::Delimited,
        }
    }

    /// Lines skipped as malformed so far
    pub fn malformed(&self) -> usize {
        match self {
            PlaylistItems::Extended(entries) => entries.malformed(),
            PlaylistItems::Delimited(entries) => entries.malformed(),
        }
    }
}

impl Iterator for PlaylistItems<'_> {
    type Item = PlaylistItem;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            PlaylistItems::Extended(entries) => entries.next().map(PlaylistItem::Channel),
            PlaylistItems::Delimited(entries) => entries.next(),
        }
    }
}

/// Counters for one parsed source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ParseStats {
    pub dialect: PlaylistDialect,
    pub records: usize,
    pub malformed: usize,
}

/// Parse a whole source body into its per-category records
pub fn parse_playlist(content: &str) -> (ChannelPool, ParseStats) {
    let mut items = PlaylistItems::new(content);
    let mut pool = ChannelPool::new();

    for item in items.by_ref() {
        match item {
            PlaylistItem::Category(name) => pool.reset_category(&name),
            PlaylistItem::Channel(record) => pool.push(record),
        }
    }

    let stats = ParseStats {
        dialect: items.dialect(),
        records: pool.len(),
        malformed: items.malformed(),
    };
    (pool, stats)
}

/// [`parse_playlist`] with a per-source diagnostic when lines were skipped
pub fn parse_source(source: &str, content: &str) -> (ChannelPool, ParseStats) {
    let (pool, stats) = parse_playlist(content);
    if stats.malformed > 0 {
        warn!(
            "Skipped {} malformed line(s) in {:?} source {}",
            stats.malformed, stats.dialect, source
        );
    }
    (pool, stats)
}
