use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ai_digest::config::Config;
use ai_digest::pipeline::Pipeline;

#[derive(Parser)]
#[command(name = "ai-digest")]
#[command(version, about = "Fetch AI news feeds and update the twice-daily snapshot")]
struct Cli {
    /// Path to the feeds configuration
    #[arg(short, long, default_value = "feeds.toml")]
    config: PathBuf,

    /// Write the snapshot here instead of the configured path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Compute the snapshot but leave the file untouched
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ai_digest=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    // Load configuration
    let mut config = Config::load(&cli.config)?;
    if let Some(output) = cli.output {
        config.output = output;
    }
    info!("Loaded {} feeds from configuration", config.feeds.len());

    let pipeline = Pipeline::new(&config)?;
    let now = Utc::now();

    let report = if cli.dry_run {
        let report = pipeline.build(now).await;
        info!(
            "Dry run: {} items for {}, snapshot not written",
            report.written, report.slot
        );
        report
    } else {
        pipeline
            .run(now)
            .await
            .with_context(|| format!("run at {} failed", now.to_rfc3339()))?
    };

    if !report.failures.is_empty() {
        warn!("{} of {} feeds skipped", report.failures.len(), config.feeds.len());
    }
    info!(
        "{} candidates, {} after dedup, {} written to {}",
        report.candidates, report.deduplicated, report.written, report.slot
    );

    Ok(())
}
