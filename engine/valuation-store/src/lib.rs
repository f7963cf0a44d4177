//! PostgreSQL persistence for the weekly valuation engine
//!
//! [`PgStore`] implements both [`AnalysisStore`](valuation_engine::AnalysisStore)
//! and [`IngestStore`](valuation_engine::IngestStore) over three tables keyed on
//! `(player_id, week, season)`: `player_stats`, `dfs_salaries` and
//! `weekly_analysis`. Schema lives in `migrations/`.

pub mod config;
pub mod error;
pub mod postgres;

pub use config::DatabaseConfig;
pub use error::{Result, StoreError};
pub use postgres::PgStore;
