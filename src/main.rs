use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use m3u_aggregator::{config::Config, pipeline::AggregationPipeline};

#[derive(Parser)]
#[command(name = "m3u-aggregator")]
#[command(version)]
#[command(about = "Builds a curated M3U/TXT playlist pair from many public playlists")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = m3u_aggregator::config::defaults::DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Taxonomy template file (overrides config file)
    #[arg(short, long, value_name = "FILE")]
    template: Option<PathBuf>,

    /// Metadata playlist output path
    #[arg(long, value_name = "FILE")]
    m3u_output: Option<PathBuf>,

    /// Flat playlist output path
    #[arg(long, value_name = "FILE")]
    txt_output: Option<PathBuf>,

    /// Maximum number of sources fetched at once
    #[arg(short = 'j', long, value_name = "N")]
    concurrency: Option<usize>,

    /// Compare alias names ignoring case
    #[arg(long)]
    case_insensitive: bool,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_filter = format!("m3u_aggregator={}", cli.log_level);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting M3U Aggregator v{}", env!("CARGO_PKG_VERSION"));

    let mut config = Config::load_from_file(&cli.config)?;
    info!("Configuration loaded from: {}", cli.config.display());

    // Override config with CLI arguments
    if let Some(template) = cli.template {
        config.template = template;
    }
    if let Some(m3u_output) = cli.m3u_output {
        config.output.m3u_path = m3u_output;
    }
    if let Some(txt_output) = cli.txt_output {
        config.output.txt_path = txt_output;
    }
    if let Some(concurrency) = cli.concurrency {
        config.fetch.max_concurrent = concurrency;
    }
    if cli.case_insensitive {
        config.matching.case_insensitive = true;
    }
    config.validate()?;

    let pipeline = AggregationPipeline::new(config)?;
    let report = pipeline.run().await?;

    info!(
        "Total: {} channels in {} categories",
        report.summary.total_channels,
        report.summary.categories.len()
    );
    for category in &report.summary.categories {
        info!("  {}: {} channels", category.name, category.channels);
    }
    if !report.summary.unmatched.is_empty() {
        warn!(
            "{} alias groups without a match: {}",
            report.summary.unmatched.len(),
            report.summary.unmatched_list()
        );
    }
    info!(
        "Wrote {} and {}",
        pipeline.config().output.m3u_path.display(),
        pipeline.config().output.txt_path.display()
    );

    Ok(())
}
