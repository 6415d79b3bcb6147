//! Alias matching of pooled channel records against the taxonomy
//!
//! A variant matches a name when they are equal or when either one contains
//! the other, so `CCTV1`, `CCTV1 HD` and `CCTV1综合` all land in one group.
//! Short aliases also pull in longer unrelated names (`CCTV1` matches `CCTV13`).
//!
//! Every alias group scans the whole pool, across all source categories. A
//! record may end up in several groups here; the generator's global URL dedup
//! keeps it only in the first one in taxonomy order.

use std::borrow::Cow;
use tracing::{debug, warn};

use crate::models::{
    AliasGroup, ChannelPool, ChannelRecord, MatchTable, MatchedCategory, MatchedGroup, Taxonomy,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchOptions {
    pub case_insensitive: bool,
}

/// Symmetric containment test between one alias variant and one record name.
/// Empty strings never match.
pub fn alias_matches(variant: &str, name: &str) -> bool {
    if variant.is_empty() || name.is_empty() {
        return false;
    }
    variant == name || name.contains(variant) || variant.contains(name)
}

/// Record names prepared once for the configured case handling
struct PreparedRecord<'a> {
    record: &'a ChannelRecord,
    names: [Cow<'a, str>; 2],
}

pub struct ChannelMatcher {
    options: MatchOptions,
}

impl ChannelMatcher {
    pub fn new(options: MatchOptions) -> Self {
        Self { options }
    }

    fn normalize<'s>(&self, value: &'s str) -> Cow<'s, str> {
        if self.options.case_insensitive {
            Cow::Owned(value.to_lowercase())
        } else {
            Cow::Borrowed(value)
        }
    }

    /// Whether `record` belongs to `group` under the alias rule
    pub fn matches_group(&self, group: &AliasGroup, record: &ChannelRecord) -> bool {
        let names = record.names().map(|name| self.normalize(name));
        group.variants().iter().any(|variant| {
            let variant = self.normalize(variant);
            names.iter().any(|name| alias_matches(&variant, name))
        })
    }

    /// Build the match table: one entry per alias group, in taxonomy order,
    /// each holding its records in pool order.
    pub fn match_all<'a>(&self, taxonomy: &'a Taxonomy, pool: &'a ChannelPool) -> MatchTable<'a> {
        let prepared: Vec<PreparedRecord<'a>> = pool
            .records()
            .map(|record| PreparedRecord {
                record,
                names: record.names().map(|name| self.normalize(name)),
            })
            .collect();

        let categories = taxonomy
            .categories()
            .iter()
            .map(|category| {
                let groups = category
                    .groups
                    .iter()
                    .map(|group| {
                        let variants: Vec<Cow<'_, str>> =
                            group.variants().iter().map(|v| self.normalize(v)).collect();

                        let records: Vec<&'a ChannelRecord> = prepared
                            .iter()
                            .filter(|candidate| {
                                variants.iter().any(|variant| {
                                    candidate
                                        .names
                                        .iter()
                                        .any(|name| alias_matches(variant, name))
                                })
                            })
                            .map(|candidate| candidate.record)
                            .collect();

                        if records.is_empty() {
                            warn!(
                                "No match in category '{}' for channel '{}'",
                                category.name,
                                group.primary_name()
                            );
                        } else {
                            debug!(
                                "Matched {} records for '{}' in category '{}'",
                                records.len(),
                                group.primary_name(),
                                category.name
                            );
                        }

                        MatchedGroup { group, records }
                    })
                    .collect();

                MatchedCategory {
                    name: category.name.as_str(),
                    groups,
                }
            })
            .collect();

        MatchTable { categories }
    }
}

impl Default for ChannelMatcher {
    fn default() -> Self {
        Self::new(MatchOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::template::parse_taxonomy;

    fn record(display: &str, canonical: &str, url: &str, category: &str) -> ChannelRecord {
        ChannelRecord {
            url: url.to_string(),
            display_name: display.to_string(),
            canonical_name: canonical.to_string(),
            logo_url: None,
            source_category: category.to_string(),
        }
    }

    #[test]
    fn test_alias_rule() {
        assert!(alias_matches("CNN", "CNN"));
        assert!(alias_matches("CNN", "CNN HD"));
        assert!(alias_matches("CCTV1 综合频道", "CCTV1"));
        assert!(!alias_matches("CNN", "BBC"));
        assert!(!alias_matches("cnn", "CNN HD"));
        assert!(!alias_matches("", "CNN"));
        assert!(!alias_matches("CNN", ""));
    }

    #[test]
    fn test_matches_canonical_or_display_name() {
        let matcher = ChannelMatcher::default();
        let group = AliasGroup::parse("CCTV1|CCTV-1").unwrap();

        assert!(matcher.matches_group(&group, &record("中央一台", "CCTV-1", "http://a", "X")));
        assert!(matcher.matches_group(&group, &record("CCTV1 HD", "Unnamed", "http://b", "X")));
        assert!(!matcher.matches_group(&group, &record("CCTV2", "CCTV-2", "http://c", "X")));
    }

    #[test]
    fn test_case_insensitive_option() {
        let group = AliasGroup::parse("cnn").unwrap();
        let candidate = record("CNN HD", "CNN HD", "http://a", "News");

        assert!(!ChannelMatcher::default().matches_group(&group, &candidate));
        assert!(ChannelMatcher::new(MatchOptions { case_insensitive: true })
            .matches_group(&group, &candidate));
    }

    #[test]
    fn test_match_all_scans_every_source_category() {
        let taxonomy = parse_taxonomy("News,#genre#\nCNN|CNN HD\nNHK\n");
        let mut pool = ChannelPool::new();
        pool.push(record("CNN HD", "CNN HD", "http://a", "Imported"));
        pool.push(record("ESPN", "ESPN", "http://b", "Sports"));
        pool.push(record("CNN International", "CNN International", "http://c", "World"));

        let table = ChannelMatcher::default().match_all(&taxonomy, &pool);

        let cnn = table.get("News", "CNN").unwrap();
        let urls: Vec<_> = cnn.records.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, vec!["http://a", "http://c"]);

        // Unmatched groups still have an (empty) entry
        let nhk = table.get("News", "NHK").unwrap();
        assert!(nhk.records.is_empty());
        assert_eq!(table.unmatched().collect::<Vec<_>>(), vec![("News", "NHK")]);
    }

    #[test]
    fn test_record_may_match_several_groups() {
        let taxonomy = parse_taxonomy("A,#genre#\nCCTV\nB,#genre#\nCCTV1\n");
        let mut pool = ChannelPool::new();
        pool.push(record("CCTV1", "CCTV1", "http://a", "X"));

        let table = ChannelMatcher::default().match_all(&taxonomy, &pool);
        assert_eq!(table.get("A", "CCTV").unwrap().records.len(), 1);
        assert_eq!(table.get("B", "CCTV1").unwrap().records.len(), 1);
    }
}
