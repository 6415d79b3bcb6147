//! Extended M3U parsing
//!
//! Each entry is a metadata line followed by its playback URL:
//!
//! ```text
//! #EXTINF:-1 tvg-name="CCTV1" tvg-logo="http://logo/1.png" group-title="央视",CCTV-1 综合
//! http://example.com/cctv1.m3u8
//! ```
//!
//! The category falls back to the last category seen in the same source when
//! `group-title` is missing, and to [`DEFAULT_CATEGORY`] before any was seen.

use regex::Regex;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::str::Lines;
use std::sync::OnceLock;
use tracing::debug;

use super::EXTINF_MARKER;
use crate::models::{ChannelRecord, DEFAULT_CATEGORY};

const EXTGRP_PREFIX: &str = "#EXTGRP:";

fn attribute_regex() -> &'static Regex {
    static ATTRIBUTES: OnceLock<Regex> = OnceLock::new();
    ATTRIBUTES.get_or_init(|| {
        Regex::new(r#"([A-Za-z0-9_-]+)\s*=\s*"([^"]*)""#).expect("static attribute pattern is valid")
    })
}

/// Metadata parsed from one `#EXTINF` line, waiting for its URL
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtinfMetadata {
    /// Free text after the last unquoted comma
    pub label: Option<String>,
    /// `tvg-name`
    pub alternate_name: Option<String>,
    /// `tvg-logo`
    pub logo: Option<String>,
    /// `group-title`
    pub group: Option<String>,
    /// Stand-in name derived from the raw line
    pub placeholder: String,
}

impl ExtinfMetadata {
    /// Parse the attributes and trailing label of a metadata line
    pub fn parse(line: &str) -> Self {
        let (attributes_part, label) = split_label(line);

        let mut attributes: HashMap<String, String> = HashMap::new();
        for caps in attribute_regex().captures_iter(attributes_part) {
            let value = caps[2].trim();
            if !value.is_empty() {
                // First occurrence wins
                attributes
                    .entry(caps[1].to_ascii_lowercase())
                    .or_insert_with(|| value.to_string());
            }
        }

        Self {
            label: label.map(str::to_string),
            alternate_name: attributes.remove("tvg-name"),
            logo: attributes.remove("tvg-logo"),
            group: attributes.remove("group-title"),
            placeholder: placeholder_name(line),
        }
    }

    /// Alternate name, then label, then placeholder
    pub fn canonical_name(&self) -> String {
        self.alternate_name
            .as_deref()
            .or(self.label.as_deref())
            .unwrap_or(&self.placeholder)
            .to_string()
    }

    /// Label, then alternate name, then placeholder
    pub fn display_name(&self) -> String {
        self.label
            .as_deref()
            .or(self.alternate_name.as_deref())
            .unwrap_or(&self.placeholder)
            .to_string()
    }
}

/// Split a metadata line into its attribute section and its trailing label.
/// Commas inside quoted attribute values do not count as the separator.
fn split_label(line: &str) -> (&str, Option<&str>) {
    let mut in_quotes = false;
    let mut separator = None;

    for (index, ch) in line.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => separator = Some(index),
            _ => {}
        }
    }

    match separator {
        Some(index) => {
            let label = line[index + 1..].trim();
            (&line[..index], (!label.is_empty()).then_some(label))
        }
        None => (line, None),
    }
}

/// Deterministic name for an entry that carries no usable name at all
fn placeholder_name(line: &str) -> String {
    let digest = format!("{:x}", Sha256::digest(line.as_bytes()));
    format!("Unnamed-{}", &digest[..12])
}

/// Carried state while scanning one source
#[derive(Debug, Clone, Default)]
struct ScanState {
    current_category: Option<String>,
    pending: Option<PendingEntry>,
    malformed: usize,
}

#[derive(Debug, Clone)]
struct PendingEntry {
    metadata: ExtinfMetadata,
    category: Option<String>,
    line_num: usize,
}

impl ScanState {
    fn open_entry(&mut self, line: &str, line_num: usize) {
        if let Some(previous) = self.pending.take() {
            self.malformed += 1;
            debug!(
                "Line {}: metadata entry without a stream URL dropped",
                previous.line_num
            );
        }

        let metadata = ExtinfMetadata::parse(line);
        if let Some(group) = &metadata.group {
            self.current_category = Some(group.clone());
        }
        let category = metadata
            .group
            .clone()
            .or_else(|| self.current_category.clone());

        self.pending = Some(PendingEntry {
            metadata,
            category,
            line_num,
        });
    }

    fn apply_group_directive(&mut self, group: &str) {
        let group = group.trim();
        if group.is_empty() {
            return;
        }
        if let Some(pending) = self.pending.as_mut() {
            if pending.metadata.group.is_none() {
                pending.category = Some(group.to_string());
                self.current_category = Some(group.to_string());
            }
        }
    }

    fn close_entry(&mut self, url: &str, line_num: usize) -> Option<ChannelRecord> {
        let Some(entry) = self.pending.take() else {
            self.malformed += 1;
            debug!("Line {}: stream URL without metadata dropped", line_num);
            return None;
        };

        let source_category = entry
            .category
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());

        Some(ChannelRecord {
            url: url.to_string(),
            display_name: entry.metadata.display_name(),
            canonical_name: entry.metadata.canonical_name(),
            logo_url: entry.metadata.logo,
            source_category,
        })
    }
}

/// Lazy sequence of channel records from extended M3U text
#[derive(Debug, Clone)]
pub struct M3uEntries<'a> {
    lines: Lines<'a>,
    line_num: usize,
    state: ScanState,
}

impl<'a> M3uEntries<'a> {
    pub fn new(content: &'a str) -> Self {
        Self {
            lines: content.lines(),
            line_num: 0,
            state: ScanState::default(),
        }
    }

    /// Lines skipped as malformed so far. An entry still waiting for its URL
    /// when the input ends is counted once the sequence is exhausted.
    pub fn malformed(&self) -> usize {
        self.state.malformed
    }
}

impl Iterator for M3uEntries<'_> {
    type Item = ChannelRecord;

    fn next(&mut self) -> Option<Self::Item> {
        for line in self.lines.by_ref() {
            self.line_num += 1;
            let line = line.trim();

            if line.is_empty() {
                continue;
            }

            if line.starts_with(EXTINF_MARKER) {
                self.state.open_entry(line, self.line_num);
            } else if let Some(group) = line.strip_prefix(EXTGRP_PREFIX) {
                self.state.apply_group_directive(group);
            } else if line.starts_with('#') {
                continue;
            } else if let Some(record) = self.state.close_entry(line, self.line_num) {
                return Some(record);
            }
        }

        if let Some(entry) = self.state.pending.take() {
            self.state.malformed += 1;
            debug!(
                "Line {}: metadata entry at end of input without a stream URL",
                entry.line_num
            );
        }
        None
    }
}
