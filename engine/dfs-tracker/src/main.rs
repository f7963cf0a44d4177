use anyhow::{Context, Result};
use clap::Parser;
use dfs_tracker::cli::{Cli, CliHandler};
use dfs_tracker::{initialize_logging, JsonFileSource, TrackerConfig, TrackerScheduler};
use std::sync::Arc;
use tracing::{info, warn};
use valuation_engine::MemoryStore;
use valuation_store::PgStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = TrackerConfig::load(cli.config.as_deref())?;

    // Initialize logging; the guard flushes the log file on exit
    let _log_guard = initialize_logging(&config.logging)?;
    info!("🚀 Starting DFS tracker");

    let source = Arc::new(JsonFileSource::new(&config.data.dir));

    let scheduler = if cli.memory {
        warn!("Using in-memory store, nothing will be persisted");
        TrackerScheduler::new(Arc::new(MemoryStore::new()), source, &config)?
    } else {
        let store = PgStore::connect(&config.database)
            .await
            .context("Failed to connect to PostgreSQL")?;
        store.migrate().await.context("Failed to run database migrations")?;
        info!("✅ Connected to PostgreSQL");
        TrackerScheduler::new(Arc::new(store), source, &config)?
    };

    // Handle command
    let handler = CliHandler::new(scheduler, config.schedule.backfill_weeks);
    handler.handle_command(cli.command).await?;

    Ok(())
}
