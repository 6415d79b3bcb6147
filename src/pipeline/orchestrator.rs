use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::config::template::load_taxonomy;
use crate::config::Config;
use crate::errors::AppResult;
use crate::ingestor::{Aggregator, SourceReport};
use crate::proxy::{
    write_outputs, ChannelMatcher, GeneratedPlaylists, GenerationSummary, GeneratorOptions,
    MatchOptions, OutputFile, PlaylistGenerator,
};
use crate::sources::{HttpPlaylistFetcher, PlaylistFetcher, SourceRegistry};

/// Outcome of one generation, kept in memory until written
#[derive(Debug)]
pub struct PipelineOutput {
    pub playlists: GeneratedPlaylists,
    pub sources: Vec<SourceReport>,
}

/// Summary of a completed run, also written as the optional JSON report
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub generated_at: DateTime<Utc>,
    pub elapsed_ms: u128,
    pub sources: Vec<SourceReport>,
    #[serde(flatten)]
    pub summary: GenerationSummary,
}

pub struct AggregationPipeline {
    config: Config,
    fetcher: Arc<dyn PlaylistFetcher>,
}

impl AggregationPipeline {
    /// Pipeline fetching over HTTP with the configured timeouts
    pub fn new(config: Config) -> AppResult<Self> {
        let fetcher = HttpPlaylistFetcher::new(&config.fetch)?;
        Ok(Self::with_fetcher(config, Arc::new(fetcher)))
    }

    pub fn with_fetcher(config: Config, fetcher: Arc<dyn PlaylistFetcher>) -> Self {
        Self { config, fetcher }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Load, aggregate, match and emit without touching the outputs
    pub async fn generate(&self) -> AppResult<PipelineOutput> {
        let taxonomy = load_taxonomy(&self.config.template).await?;

        let registry = SourceRegistry::new(self.config.sources.iter().cloned());
        let aggregation = Aggregator::new(Arc::clone(&self.fetcher), self.config.fetch.max_concurrent)
            .aggregate(&registry)
            .await;

        let matcher = ChannelMatcher::new(MatchOptions {
            case_insensitive: self.config.matching.case_insensitive,
        });
        let table = matcher.match_all(&taxonomy, &aggregation.pool);

        let generator = PlaylistGenerator::new(GeneratorOptions::from(&self.config.output));
        let playlists = generator.generate(&table);

        Ok(PipelineOutput {
            playlists,
            sources: aggregation.sources,
        })
    }

    /// Full run: generate, then replace both playlists (and the report when
    /// configured). Nothing is written if any earlier step fails.
    pub async fn run(&self) -> AppResult<RunReport> {
        let started = Instant::now();
        let output = self.generate().await?;
        let PipelineOutput { playlists, sources } = output;

        if playlists.summary.total_channels == 0 {
            warn!("No channels matched the taxonomy; writing empty playlists");
        }

        let report = RunReport {
            generated_at: Utc::now(),
            elapsed_ms: started.elapsed().as_millis(),
            sources,
            summary: playlists.summary.clone(),
        };

        let output_config = &self.config.output;
        let report_json = match &output_config.report_path {
            Some(_) => Some(serde_json::to_string_pretty(&report)?),
            None => None,
        };

        let mut files = vec![
            OutputFile::new(&output_config.m3u_path, &playlists.m3u),
            OutputFile::new(&output_config.txt_path, &playlists.txt),
        ];
        if let (Some(path), Some(json)) = (&output_config.report_path, &report_json) {
            files.push(OutputFile::new(path, json));
        }
        write_outputs(&files).await?;

        info!(
            "Run complete in {}ms: {} channels, {} unmatched groups, {} groups emptied by dedup",
            report.elapsed_ms,
            report.summary.total_channels,
            report.summary.unmatched.len(),
            report.summary.deduplicated.len()
        );
        Ok(report)
    }
}
