//! Deduplication and playlist generation
//!
//! Walks the match table in taxonomy order and renders both outputs from the
//! same loop, so the M3U and TXT playlists always carry the same channels in
//! the same order with the same published URLs.
//!
//! A URL is published at most once per run. When a record matched several
//! alias groups it stays with the first group in taxonomy order and is dropped
//! from the later ones.

use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, info};

use crate::config::OutputConfig;
use crate::models::{ChannelRecord, MatchTable};
use crate::utils::url::UrlUtils;

/// Separator between the stream URL and its line-quality suffix
pub const LINE_SUFFIX_PREFIX: &str = "$LR•";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorOptions {
    /// Word inside the `『<label><n>』` ordinal suffix
    pub line_label: String,
    /// `x-tvg-url` header value
    pub epg_url: String,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            line_label: crate::config::defaults::DEFAULT_LINE_LABEL.to_string(),
            epg_url: String::new(),
        }
    }
}

impl From<&OutputConfig> for GeneratorOptions {
    fn from(config: &OutputConfig) -> Self {
        Self {
            line_label: config.line_label.clone(),
            epg_url: config.epg_url.clone(),
        }
    }
}

/// Reference to one alias group in the taxonomy
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupRef {
    pub category: String,
    pub channel: String,
}

impl GroupRef {
    fn new(category: &str, channel: &str) -> Self {
        Self {
            category: category.to_string(),
            channel: channel.to_string(),
        }
    }
}

impl fmt::Display for GroupRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.category, self.channel)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySummary {
    pub name: String,
    pub channels: usize,
}

/// Counts and gaps of one generation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GenerationSummary {
    /// Entries written to each playlist
    pub total_channels: usize,
    pub categories: Vec<CategorySummary>,
    /// Alias groups without a single matching record
    pub unmatched: Vec<GroupRef>,
    /// Alias groups whose matches were all dropped as duplicate URLs
    pub deduplicated: Vec<GroupRef>,
}

impl GenerationSummary {
    /// Unmatched alias groups as `category/channel`, comma separated
    pub fn unmatched_list(&self) -> String {
        self.unmatched
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// One published channel line, shared by both renderings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmittedChannel<'a> {
    pub category: &'a str,
    pub primary_name: &'a str,
    pub logo_url: Option<&'a str>,
    pub published_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedPlaylists {
    pub m3u: String,
    pub txt: String,
    pub summary: GenerationSummary,
}

/// Published form of a stream URL: address family tag, plus `•N『<label>i』`
/// when the group has more than one surviving line.
///
/// ```rust
/// use m3u_aggregator::proxy::generator::published_url;
///
/// assert_eq!(published_url("http://a/1", 1, 1, "line"), "http://a/1$LR•IPV4");
/// assert_eq!(published_url("http://[::1]/1", 2, 3, "line"), "http://[::1]/1$LR•IPV6•3『line2』");
/// ```
pub fn published_url(url: &str, index: usize, total: usize, line_label: &str) -> String {
    let mut published = format!(
        "{url}{LINE_SUFFIX_PREFIX}{}",
        UrlUtils::address_family(url).tag()
    );
    if total > 1 {
        published.push_str(&format!("•{total}『{line_label}{index}』"));
    }
    published
}

pub struct PlaylistGenerator {
    options: GeneratorOptions,
}

impl PlaylistGenerator {
    pub fn new(options: GeneratorOptions) -> Self {
        Self { options }
    }

    /// Deduplicate the match table and render both playlists
    pub fn generate(&self, table: &MatchTable<'_>) -> GeneratedPlaylists {
        let channels = self.emit(table);
        let summary = Self::summarize(table, &channels);

        let playlists = GeneratedPlaylists {
            m3u: self.render_m3u(&channels),
            txt: Self::render_txt(table, &channels),
            summary,
        };

        info!(
            "Channel processing complete: {} channels in {} categories",
            playlists.summary.total_channels,
            playlists.summary.categories.len()
        );
        playlists
    }

    /// Dedup pass in taxonomy order
    pub fn emit<'a>(&self, table: &MatchTable<'a>) -> Vec<EmittedChannel<'a>> {
        let mut written: HashSet<&'a str> = HashSet::new();
        let mut channels = Vec::new();

        for category in &table.categories {
            for group in &category.groups {
                if group.records.is_empty() {
                    continue;
                }

                let mut seen: HashSet<&'a str> = HashSet::new();
                let survivors: Vec<&'a ChannelRecord> = group
                    .records
                    .iter()
                    .copied()
                    .filter(|record| {
                        !record.url.is_empty()
                            && !written.contains(record.url.as_str())
                            && seen.insert(record.url.as_str())
                    })
                    .collect();

                if survivors.is_empty() {
                    debug!(
                        "All {} matches for '{}' in '{}' were already published",
                        group.records.len(),
                        group.primary_name(),
                        category.name
                    );
                    continue;
                }

                let total = survivors.len();
                for (position, record) in survivors.into_iter().enumerate() {
                    written.insert(record.url.as_str());
                    channels.push(EmittedChannel {
                        category: category.name,
                        primary_name: group.primary_name(),
                        logo_url: record.logo_url.as_deref().filter(|logo| !logo.is_empty()),
                        published_url: published_url(
                            &record.url,
                            position + 1,
                            total,
                            &self.options.line_label,
                        ),
                    });
                }
            }
        }

        channels
    }

    fn summarize(table: &MatchTable<'_>, channels: &[EmittedChannel<'_>]) -> GenerationSummary {
        let mut summary = GenerationSummary {
            total_channels: channels.len(),
            ..Default::default()
        };

        for category in &table.categories {
            let count = channels.iter().filter(|c| c.category == category.name).count();
            if count > 0 {
                summary.categories.push(CategorySummary {
                    name: category.name.to_string(),
                    channels: count,
                });
            }

            for group in &category.groups {
                if group.records.is_empty() {
                    summary
                        .unmatched
                        .push(GroupRef::new(category.name, group.primary_name()));
                } else if !channels
                    .iter()
                    .any(|c| c.category == category.name && c.primary_name == group.primary_name())
                {
                    summary
                        .deduplicated
                        .push(GroupRef::new(category.name, group.primary_name()));
                }
            }
        }

        summary
    }

    fn render_m3u(&self, channels: &[EmittedChannel<'_>]) -> String {
        let mut m3u = format!("#EXTM3U x-tvg-url=\"{}\"\n", self.options.epg_url);

        for channel in channels {
            let logo = channel
                .logo_url
                .map(|logo| format!(" tvg-logo=\"{logo}\""))
                .unwrap_or_default();
            m3u.push_str(&format!(
                "#EXTINF:-1 tvg-id=\"{name}\" tvg-name=\"{name}\"{logo} group-title=\"{category}\",{name}\n",
                name = channel.primary_name,
                category = channel.category,
            ));
            m3u.push_str(&channel.published_url);
            m3u.push('\n');
        }

        m3u
    }

    /// Every taxonomy category gets its marker line, even when nothing
    /// survived for it
    fn render_txt(table: &MatchTable<'_>, channels: &[EmittedChannel<'_>]) -> String {
        let mut txt = String::new();
        let mut remaining = channels.iter().peekable();

        for (position, category) in table.categories.iter().enumerate() {
            if position > 0 {
                txt.push('\n');
            }
            txt.push_str(&format!("{},#genre#\n", category.name));

            while let Some(channel) = remaining.next_if(|c| c.category == category.name) {
                txt.push_str(&format!("{},{}\n", channel.primary_name, channel.published_url));
            }
        }

        txt
    }
}

impl Default for PlaylistGenerator {
    fn default() -> Self {
        Self::new(GeneratorOptions::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::template::parse_taxonomy;
    use crate::models::ChannelPool;
    use crate::proxy::matcher::ChannelMatcher;

    fn record(name: &str, url: &str) -> ChannelRecord {
        ChannelRecord {
            url: url.to_string(),
            display_name: name.to_string(),
            canonical_name: name.to_string(),
            logo_url: None,
            source_category: "Source".to_string(),
        }
    }

    fn generate(template: &str, records: Vec<ChannelRecord>) -> GeneratedPlaylists {
        let taxonomy = parse_taxonomy(template);
        let mut pool = ChannelPool::new();
        for record in records {
            pool.push(record);
        }
        let table = ChannelMatcher::default().match_all(&taxonomy, &pool);
        PlaylistGenerator::default().generate(&table)
    }

    #[test]
    fn test_published_url_suffix() {
        assert_eq!(published_url("http://a/1", 1, 1, "line"), "http://a/1$LR•IPV4");
        assert_eq!(published_url("http://a/1", 1, 2, "line"), "http://a/1$LR•IPV4•2『line1』");
        assert_eq!(published_url("http://a/1", 2, 2, "线路"), "http://a/1$LR•IPV4•2『线路2』");
        assert_eq!(
            published_url("http://[2409:8087::1]:8080/a", 1, 1, "line"),
            "http://[2409:8087::1]:8080/a$LR•IPV6"
        );
    }

    #[test]
    fn test_mirrors_get_ordinals() {
        let playlists = generate(
            "News,#genre#\nCNN|CNN HD\n",
            vec![record("CNN HD", "http://a"), record("CNN HD", "http://b")],
        );

        assert_eq!(
            playlists.txt,
            "News,#genre#\nCNN,http://a$LR•IPV4•2『line1』\nCNN,http://b$LR•IPV4•2『line2』\n"
        );
        assert_eq!(playlists.summary.total_channels, 2);
    }

    #[test]
    fn test_m3u_rendering() {
        let mut with_logo = record("BBC", "http://bbc");
        with_logo.logo_url = Some("http://logo/bbc.png".to_string());
        let playlists = generate("News,#genre#\nBBC\nCNN\n", vec![with_logo, record("CNN", "http://cnn")]);

        assert_eq!(
            playlists.m3u,
            "#EXTM3U x-tvg-url=\"\"\n\
             #EXTINF:-1 tvg-id=\"BBC\" tvg-name=\"BBC\" tvg-logo=\"http://logo/bbc.png\" group-title=\"News\",BBC\n\
             http://bbc$LR•IPV4\n\
             #EXTINF:-1 tvg-id=\"CNN\" tvg-name=\"CNN\" group-title=\"News\",CNN\n\
             http://cnn$LR•IPV4\n"
        );
    }

    #[test]
    fn test_within_group_duplicates_collapse() {
        let playlists = generate(
            "News,#genre#\nCNN\n",
            vec![record("CNN", "http://same"), record("CNN HD", "http://same")],
        );
        // One survivor means no ordinal suffix
        assert_eq!(playlists.txt, "News,#genre#\nCNN,http://same$LR•IPV4\n");
    }

    #[test]
    fn test_global_dedup_first_group_wins() {
        let playlists = generate(
            "A,#genre#\nCCTV\nB,#genre#\nCCTV1\nCCTV2\n",
            vec![record("CCTV1", "http://one"), record("CCTV2", "http://two")],
        );

        // Both records match "CCTV" first; "CCTV1" and "CCTV2" only see duplicates
        assert_eq!(
            playlists.txt,
            "A,#genre#\nCCTV,http://one$LR•IPV4•2『line1』\nCCTV,http://two$LR•IPV4•2『line2』\n\nB,#genre#\n"
        );
        assert_eq!(
            playlists.summary.deduplicated,
            vec![GroupRef::new("B", "CCTV1"), GroupRef::new("B", "CCTV2")]
        );
        assert!(playlists.summary.unmatched.is_empty());
    }

    #[test]
    fn test_unmatched_groups_are_reported_and_skipped() {
        let playlists = generate(
            "News,#genre#\nNHK\nCNN\nMovies,#genre#\nHBO\n",
            vec![record("CNN", "http://cnn")],
        );

        assert_eq!(
            playlists.txt,
            "News,#genre#\nCNN,http://cnn$LR•IPV4\n\nMovies,#genre#\n"
        );
        assert_eq!(
            playlists.summary.unmatched,
            vec![GroupRef::new("News", "NHK"), GroupRef::new("Movies", "HBO")]
        );
        assert_eq!(
            playlists.summary.categories,
            vec![CategorySummary { name: "News".to_string(), channels: 1 }]
        );
        assert_eq!(playlists.summary.unmatched_list(), "News/NHK, Movies/HBO");
    }

    #[test]
    fn test_empty_categories_keep_their_marker() {
        let playlists = generate(
            "News,#genre#\nCNN\nMovies,#genre#\nHBO\nSports,#genre#\nESPN\n",
            vec![record("CNN", "http://cnn"), record("ESPN", "http://espn")],
        );

        assert_eq!(
            playlists.txt,
            "News,#genre#\nCNN,http://cnn$LR•IPV4\n\nMovies,#genre#\n\nSports,#genre#\nESPN,http://espn$LR•IPV4\n"
        );
        // The metadata playlist has no category lines, only entries
        assert_eq!(playlists.m3u.lines().count(), 5);
    }

    #[test]
    fn test_category_blocks_are_separated() {
        let playlists = generate(
            "News,#genre#\nCNN\nSports,#genre#\nESPN\n",
            vec![record("ESPN", "http://espn"), record("CNN", "http://cnn")],
        );
        assert_eq!(
            playlists.txt,
            "News,#genre#\nCNN,http://cnn$LR•IPV4\n\nSports,#genre#\nESPN,http://espn$LR•IPV4\n"
        );
    }

    #[test]
    fn test_outputs_stay_in_sync() {
        let playlists = generate(
            "News,#genre#\nCNN|CNN HD\nBBC\n",
            vec![
                record("CNN HD", "http://a"),
                record("BBC World", "http://b"),
                record("CNN", "http://c"),
            ],
        );

        let m3u_urls: Vec<_> = playlists
            .m3u
            .lines()
            .filter(|line| !line.starts_with('#'))
            .collect();
        let txt_urls: Vec<_> = playlists
            .txt
            .lines()
            .filter(|line| !line.ends_with("#genre#") && !line.is_empty())
            .filter_map(|line| line.split_once(',').map(|(_, url)| url))
            .collect();
        assert_eq!(m3u_urls, txt_urls);
        assert_eq!(m3u_urls.len(), 3);
    }
}
