//! Tracker configuration management
//!
//! Layering, lowest to highest precedence: built-in defaults (with
//! `DATABASE_URL` applied), an optional TOML file, then `DFS_TRACKER__*`
//! environment variables using `__` between nested keys, e.g.
//! `DFS_TRACKER__LOGGING__LEVEL=debug` or
//! `DFS_TRACKER__VALUATION__SCORING__SYSTEM=half_ppr`.

use crate::calendar::ScheduleSlot;
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use valuation_engine::ValuationConfig;
use valuation_store::DatabaseConfig;

/// Main tracker configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// PostgreSQL connection
    pub database: DatabaseConfig,

    /// Scoring and classification constants
    pub valuation: ValuationConfig,

    /// Source data files
    pub data: DataConfig,

    /// Report output
    pub reports: ReportsConfig,

    /// Weekly run slots
    pub schedule: ScheduleConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Directory holding `week_<w>_<s>_stats.json` and `week_<w>_<s>_salaries.json`
    pub dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self { dir: PathBuf::from("./data") }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportsConfig {
    /// Directory receiving `week_<w>_<s>_report.json`
    pub dir: PathBuf,
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self { dir: PathBuf::from("./reports") }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Weekly update runs (UTC)
    pub slots: Vec<RunSlot>,

    /// Weeks loaded by `backfill` when none are given
    pub backfill_weeks: u32,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            slots: vec![
                // Stats settle after Monday night
                RunSlot { weekday: "Tue".to_string(), time: "10:00".to_string() },
                // Second pass once salaries are posted
                RunSlot { weekday: "Wed".to_string(), time: "12:00".to_string() },
            ],
            backfill_weeks: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSlot {
    /// Day of week
    pub weekday: String,

    /// Time of day (HH:MM format)
    pub time: String,
}

impl ScheduleConfig {
    pub fn parsed_slots(&self) -> Result<Vec<ScheduleSlot>> {
        self.slots
            .iter()
            .map(|slot| ScheduleSlot::parse(&slot.weekday, &slot.time))
            .collect()
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (json, pretty)
    pub format: String,

    /// Log file path (if None, logs to stdout only)
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), format: "pretty".to_string(), file: None }
    }
}

impl TrackerConfig {
    /// Load defaults, then `path` if given, then environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let database = DatabaseConfig::from_env()?;

        let mut builder = Config::builder()
            .set_default("database.url", database.url)?
            .set_default("database.max_connections", i64::from(database.max_connections))?;

        if let Some(path) = path {
            tracing::debug!("Loading configuration from file: {:?}", path);
            builder = builder.add_source(File::from(path).required(true));
        }

        let cfg = builder
            .add_source(Environment::with_prefix("DFS_TRACKER").separator("__").try_parsing(true))
            .build()
            .context("building config")?;

        let config: TrackerConfig = cfg.try_deserialize().context("deserializing config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => return Err(anyhow::anyhow!("Invalid log level: {}", self.logging.level)),
        }

        match self.logging.format.as_str() {
            "json" | "pretty" => {}
            _ => return Err(anyhow::anyhow!("Invalid log format: {}", self.logging.format)),
        }

        anyhow::ensure!(self.database.max_connections > 0, "database.max_connections must be > 0");
        anyhow::ensure!(!self.schedule.slots.is_empty(), "schedule.slots must not be empty");
        self.schedule.parsed_slots().context("invalid schedule slot")?;
        self.valuation.validate()?;
        Ok(())
    }
}
