//! Concurrent fetch + parse over every registered source
//!
//! Sources are fetched and parsed with at most `max_concurrent` in flight.
//! Each body is parsed on the blocking pool, so large sources parse in
//! parallel. Per-source results are collected in completion order and merged
//! afterwards, so no worker ever touches the shared pool.
//!
//! Completion order is not deterministic. It only affects the order of records
//! inside one source category of the merged pool; output order is decided by
//! the taxonomy later on.

use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

use super::{parse_source, ParseStats};
use crate::models::ChannelPool;
use crate::sources::{FetchOutcome, PlaylistFetcher, SourceRegistry};
use crate::utils::url::UrlUtils;

/// What happened to one source during a run
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SourceOutcome {
    Parsed(ParseStats),
    Unavailable { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceReport {
    /// Location with credentials obfuscated
    pub url: String,
    #[serde(flatten)]
    pub outcome: SourceOutcome,
    pub elapsed_ms: u128,
}

impl SourceReport {
    /// Records contributed to the pool
    pub fn records(&self) -> usize {
        match &self.outcome {
            SourceOutcome::Parsed(stats) => stats.records,
            SourceOutcome::Unavailable { .. } => 0,
        }
    }
}

/// Merged pool plus per-source reports, both in completion order
#[derive(Debug, Default)]
pub struct AggregationResult {
    pub pool: ChannelPool,
    pub sources: Vec<SourceReport>,
}

impl AggregationResult {
    pub fn unavailable(&self) -> impl Iterator<Item = &SourceReport> {
        self.sources
            .iter()
            .filter(|s| matches!(s.outcome, SourceOutcome::Unavailable { .. }))
    }
}

pub struct Aggregator {
    fetcher: Arc<dyn PlaylistFetcher>,
    max_concurrent: usize,
}

impl Aggregator {
    pub fn new(fetcher: Arc<dyn PlaylistFetcher>, max_concurrent: usize) -> Self {
        Self {
            fetcher,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Fetch and parse every source. Never fails: unavailable or empty sources
    /// simply contribute nothing.
    pub async fn aggregate(&self, registry: &SourceRegistry) -> AggregationResult {
        let started = Instant::now();
        info!(
            "Aggregating {} sources (max {} concurrent)",
            registry.len(),
            self.max_concurrent
        );

        let tasks = registry.iter().map(|url| {
            let fetcher = Arc::clone(&self.fetcher);
            let url = url.to_string();
            async move { Self::ingest_one(fetcher, url).await }
        });

        let completed: Vec<(ChannelPool, SourceReport)> = stream::iter(tasks)
            .buffer_unordered(self.max_concurrent)
            .collect()
            .await;

        let mut result = AggregationResult::default();
        for (pool, report) in completed {
            result.pool.merge(pool);
            result.sources.push(report);
        }

        info!(
            "Aggregation finished in {}ms: {} records in {} source categories, {} of {} sources unavailable",
            started.elapsed().as_millis(),
            result.pool.len(),
            result.pool.category_count(),
            result.unavailable().count(),
            result.sources.len()
        );
        result
    }

    async fn ingest_one(fetcher: Arc<dyn PlaylistFetcher>, url: String) -> (ChannelPool, SourceReport) {
        let started = Instant::now();
        let safe_url = UrlUtils::obfuscate_credentials(&url);

        let (pool, outcome) = match fetcher.fetch(&url).await {
            FetchOutcome::Fetched(body) => {
                // Parsing is CPU-bound; keep it off the async workers
                let source = safe_url.clone();
                let parsed = tokio::task::spawn_blocking(move || parse_source(&source, &body)).await;

                match parsed {
                    Ok((pool, stats)) => {
                        debug!(
                            "Parsed {} records ({:?}) from {}",
                            stats.records, stats.dialect, safe_url
                        );
                        (pool, SourceOutcome::Parsed(stats))
                    }
                    Err(e) => {
                        error!("Parse task for {} failed: {}", safe_url, e);
                        (
                            ChannelPool::new(),
                            SourceOutcome::Unavailable {
                                reason: format!("parse task failed: {e}"),
                            },
                        )
                    }
                }
            }
            FetchOutcome::Unavailable(e) => (
                ChannelPool::new(),
                SourceOutcome::Unavailable {
                    reason: e.to_string(),
                },
            ),
        };

        let report = SourceReport {
            url: safe_url,
            outcome,
            elapsed_ms: started.elapsed().as_millis(),
        };
        (pool, report)
    }
}
