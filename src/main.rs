//! Binary entry point: arguments, logging, config, pipeline lifecycle.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use axislog::{Config, Pipeline};

#[derive(Debug, Parser)]
#[command(name = "axislog", version, about = "Logs per-axis robot telemetry to a TSV file")]
struct Args {
    /// Path to the JSON configuration file.
    #[arg(short, long, default_value = "Config.json")]
    config: PathBuf,

    /// Output file; created (or truncated) at startup.
    #[arg(short, long, default_value = "Output.txt")]
    output: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let config = Config::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    let endpoint = config.endpoint();
    let selection = config.axis_selection().context("validating axis selection")?;

    let sink = tokio::fs::File::create(&args.output)
        .await
        .with_context(|| format!("creating {}", args.output.display()))?;

    info!("Logging {} axes from {} to {}", selection.len(), endpoint, args.output.display());

    let pipeline = Pipeline::spawn(endpoint, selection, sink);
    let stopped = pipeline.cancellation_token();

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result.context("waiting for interrupt")?;
            info!("Interrupt received, shutting down");
        }
        _ = stopped.cancelled() => {
            warn!("Pipeline stopped before an interrupt was received");
        }
    }

    pipeline.shutdown().await.context("pipeline shutdown")?;
    info!("Shutdown complete");
    Ok(())
}
