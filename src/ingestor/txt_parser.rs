//! Delimited (TXT) playlist parsing
//!
//! ```text
//! 央视频道,#genre#
//! CCTV1,http://example.com/cctv1.m3u8
//! CCTV2,http://example.com/cctv2.m3u8
//! ```
//!
//! Rows split on the first comma only, so URLs may contain commas. There is no
//! metadata in this dialect: logos are always absent and the canonical name is
//! the display name.

use std::str::Lines;
use tracing::debug;

use super::PlaylistItem;
use crate::models::{ChannelRecord, CATEGORY_MARKER};

/// Lazy sequence of category markers and channel rows
#[derive(Debug, Clone)]
pub struct TxtEntries<'a> {
    lines: Lines<'a>,
    line_num: usize,
    current_category: Option<String>,
    malformed: usize,
}

impl<'a> TxtEntries<'a> {
    pub fn new(content: &'a str) -> Self {
        Self {
            lines: content.lines(),
            line_num: 0,
            current_category: None,
            malformed: 0,
        }
    }

    pub fn malformed(&self) -> usize {
        self.malformed
    }

    fn skip(&mut self, reason: &str, line: &str) {
        self.malformed += 1;
        debug!("Line {}: {}: {}", self.line_num, reason, line);
    }
}

impl Iterator for TxtEntries<'_> {
    type Item = PlaylistItem;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(line) = self.lines.next() {
            self.line_num += 1;
            let line = line.trim();

            if line.is_empty() {
                continue;
            }

            if line.contains(CATEGORY_MARKER) {
                let name = line.split(',').next().unwrap_or_default().trim();
                if name.is_empty() {
                    self.current_category = None;
                    self.skip("category marker without a name", line);
                    continue;
                }
                self.current_category = Some(name.to_string());
                return Some(PlaylistItem::Category(name.to_string()));
            }

            if line.starts_with('#') {
                continue;
            }

            let Some(category) = self.current_category.clone() else {
                self.skip("row outside any category", line);
                continue;
            };

            let Some((name, url)) = line.split_once(',') else {
                self.skip("row without a comma", line);
                continue;
            };

            let (name, url) = (name.trim(), url.trim());
            if name.is_empty() || url.is_empty() {
                self.skip("row with an empty name or URL", line);
                continue;
            }

            return Some(PlaylistItem::Channel(ChannelRecord {
                url: url.to_string(),
                display_name: name.to_string(),
                canonical_name: name.to_string(),
                logo_url: None,
                source_category: category,
            }));
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channels(items: &[PlaylistItem]) -> Vec<&ChannelRecord> {
        items
            .iter()
            .filter_map(|item| match item {
                PlaylistItem::Channel(record) => Some(record),
                PlaylistItem::Category(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_basic_rows() {
        let items: Vec<_> = TxtEntries::new(
            "央视频道,#genre#\nCCTV1 , http://a/1 \nCCTV2,http://a/2?x=1,2\n",
        )
        .collect();

        assert_eq!(items[0], PlaylistItem::Category("央视频道".to_string()));
        let records = channels(&items);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].display_name, "CCTV1");
        assert_eq!(records[0].canonical_name, "CCTV1");
        assert_eq!(records[0].url, "http://a/1");
        assert!(records[0].logo_url.is_none());
        assert_eq!(records[0].source_category, "央视频道");
        // Split happens on the first comma only
        assert_eq!(records[1].url, "http://a/2?x=1,2");
    }

    #[test]
    fn test_malformed_rows_are_skipped() {
        let mut entries = TxtEntries::new(
            "Before,http://orphan\nNews,#genre#\nno comma here\n,http://a/empty-name\nEmptyUrl,\nCNN,http://a/1\n",
        );
        let items: Vec<_> = entries.by_ref().collect();

        let records = channels(&items);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].display_name, "CNN");
        assert_eq!(entries.malformed(), 4);
    }

    #[test]
    fn test_comments_and_blank_lines() {
        let items: Vec<_> =
            TxtEntries::new("\n# updated daily\nMovies,#genre#\n\n#HBO,http://x\nHBO,http://a/1\n").collect();
        assert_eq!(channels(&items).len(), 1);
    }

    #[test]
    fn test_nameless_marker_stops_rows() {
        let mut entries = TxtEntries::new("News,#genre#\nCNN,http://a/1\n,#genre#\nBBC,http://a/2\n");
        let items: Vec<_> = entries.by_ref().collect();
        assert_eq!(channels(&items).len(), 1);
        assert_eq!(entries.malformed(), 2);
    }
}
