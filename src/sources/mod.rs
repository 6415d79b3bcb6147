//! Playlist sources
//!
//! The registry is the ordered list of playlist locations for one run. Fetching
//! goes through [`PlaylistFetcher`] so the aggregation pipeline can be driven
//! by something other than HTTP in tests.

pub mod http;
pub mod traits;

pub use http::HttpPlaylistFetcher;
pub use traits::{FetchOutcome, PlaylistFetcher};

/// Ordered, static list of source locations
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceRegistry {
    urls: Vec<String>,
}

impl SourceRegistry {
    pub fn new<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            urls: urls.into_iter().map(Into::into).collect(),
        }
    }

    /// Locations to fetch, in registry order. Blank entries are skipped.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.urls
            .iter()
            .map(|url| url.trim())
            .filter(|url| !url.is_empty())
    }

    /// Number of non-blank locations
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_entries_are_skipped() {
        let registry = SourceRegistry::new(vec![
            "http://a.example/1.m3u",
            "",
            "   ",
            " http://b.example/2.txt ",
        ]);

        let urls: Vec<_> = registry.iter().collect();
        assert_eq!(urls, vec!["http://a.example/1.m3u", "http://b.example/2.txt"]);
        assert_eq!(registry.len(), 2);
        assert!(!registry.is_empty());
        assert!(SourceRegistry::new(vec![""]).is_empty());
    }
}
