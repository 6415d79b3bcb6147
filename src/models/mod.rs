use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Category used when a playlist never declares one
pub const DEFAULT_CATEGORY: &str = "Default";

/// Token marking a category line in templates and delimited playlists
pub const CATEGORY_MARKER: &str = "#genre#";

/// A single playable channel extracted from a source playlist.
///
/// Records are immutable once parsed. After aggregation they are only ever
/// borrowed by the matcher and the generator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRecord {
    pub url: String,
    pub display_name: String,
    pub canonical_name: String,
    pub logo_url: Option<String>,
    pub source_category: String,
}

impl ChannelRecord {
    /// Display and canonical name, in that order
    pub fn names(&self) -> [&str; 2] {
        [self.display_name.as_str(), self.canonical_name.as_str()]
    }
}

/// Ordered name variants of one logical channel. The first variant is the
/// primary name used for every output label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct AliasGroup {
    variants: Vec<String>,
}

impl TryFrom<Vec<String>> for AliasGroup {
    type Error = String;

    fn try_from(variants: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(variants).ok_or_else(|| "alias group needs at least one non-blank name".to_string())
    }
}

impl From<AliasGroup> for Vec<String> {
    fn from(group: AliasGroup) -> Self {
        group.variants
    }
}

impl AliasGroup {
    /// Build a group from raw variants, dropping blanks. Returns `None` when
    /// nothing usable is left.
    pub fn new<I, S>(variants: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let variants: Vec<String> = variants
            .into_iter()
            .map(|v| v.as_ref().trim().to_string())
            .filter(|v| !v.is_empty())
            .collect();

        if variants.is_empty() {
            None
        } else {
            Some(Self { variants })
        }
    }

    /// Parse a `primary|alt1|alt2` template line
    pub fn parse(line: &str) -> Option<Self> {
        Self::new(line.split('|'))
    }

    pub fn primary_name(&self) -> &str {
        &self.variants[0]
    }

    pub fn variants(&self) -> &[String] {
        &self.variants
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyCategory {
    pub name: String,
    pub groups: Vec<AliasGroup>,
}

/// Canonical category → alias group layout. Its order is the output order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Taxonomy {
    categories: Vec<TaxonomyCategory>,
}

impl Taxonomy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or restart) a category and return its index. A repeated category
    /// keeps its original position but loses the groups collected so far.
    pub fn begin_category(&mut self, name: &str) -> usize {
        if let Some(index) = self.categories.iter().position(|c| c.name == name) {
            self.categories[index].groups.clear();
            index
        } else {
            self.categories.push(TaxonomyCategory {
                name: name.to_string(),
                groups: Vec::new(),
            });
            self.categories.len() - 1
        }
    }

    pub fn push_group(&mut self, category: usize, group: AliasGroup) {
        if let Some(category) = self.categories.get_mut(category) {
            category.groups.push(group);
        }
    }

    pub fn categories(&self) -> &[TaxonomyCategory] {
        &self.categories
    }

    pub fn category(&self, name: &str) -> Option<&TaxonomyCategory> {
        self.categories.iter().find(|c| c.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn group_count(&self) -> usize {
        self.categories.iter().map(|c| c.groups.len()).sum()
    }
}

/// Channel records keyed by the category the source itself declared.
///
/// Used both for the records of one source and for the merged pool of all
/// sources. Categories keep first-insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelPool {
    categories: Vec<(String, Vec<ChannelRecord>)>,
    index: HashMap<String, usize>,
}

impl ChannelPool {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&mut self, category: &str) -> &mut Vec<ChannelRecord> {
        let index = match self.index.get(category).copied() {
            Some(index) => index,
            None => {
                self.categories.push((category.to_string(), Vec::new()));
                let index = self.categories.len() - 1;
                self.index.insert(category.to_string(), index);
                index
            }
        };
        &mut self.categories[index].1
    }

    /// Create the category if needed and drop anything collected for it so far
    pub fn reset_category(&mut self, category: &str) {
        self.slot(category).clear();
    }

    pub fn push(&mut self, record: ChannelRecord) {
        let category = record.source_category.clone();
        self.slot(&category).push(record);
    }

    /// Append every category of `other`, never overwriting existing records
    pub fn merge(&mut self, other: ChannelPool) {
        for (category, records) in other.categories {
            self.slot(&category).extend(records);
        }
    }

    pub fn categories(&self) -> impl Iterator<Item = (&str, &[ChannelRecord])> {
        self.categories
            .iter()
            .map(|(name, records)| (name.as_str(), records.as_slice()))
    }

    pub fn get(&self, category: &str) -> Option<&[ChannelRecord]> {
        self.index
            .get(category)
            .map(|index| self.categories[*index].1.as_slice())
    }

    /// All records across all categories, category by category
    pub fn records(&self) -> impl Iterator<Item = &ChannelRecord> {
        self.categories.iter().flat_map(|(_, records)| records.iter())
    }

    pub fn len(&self) -> usize {
        self.categories.iter().map(|(_, records)| records.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }
}

/// Records matched to one alias group, in first-matched order
#[derive(Debug, Clone)]
pub struct MatchedGroup<'a> {
    pub group: &'a AliasGroup,
    pub records: Vec<&'a ChannelRecord>,
}

impl<'a> MatchedGroup<'a> {
    pub fn primary_name(&self) -> &'a str {
        self.group.primary_name()
    }
}

#[derive(Debug, Clone)]
pub struct MatchedCategory<'a> {
    pub name: &'a str,
    pub groups: Vec<MatchedGroup<'a>>,
}

/// Result of matching the pool against the taxonomy. Mirrors taxonomy order
/// and holds an entry for every alias group, matched or not.
#[derive(Debug, Clone, Default)]
pub struct MatchTable<'a> {
    pub categories: Vec<MatchedCategory<'a>>,
}

impl<'a> MatchTable<'a> {
    pub fn get(&self, category: &str, primary_name: &str) -> Option<&MatchedGroup<'a>> {
        self.categories
            .iter()
            .find(|c| c.name == category)
            .and_then(|c| c.groups.iter().find(|g| g.primary_name() == primary_name))
    }

    /// `(category, primary name)` of every group without a single match
    pub fn unmatched(&self) -> impl Iterator<Item = (&'a str, &'a str)> + '_ {
        self.categories.iter().flat_map(|c| {
            c.groups
                .iter()
                .filter(|g| g.records.is_empty())
                .map(move |g| (c.name, g.primary_name()))
        })
    }
}
