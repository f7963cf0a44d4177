//! Collaborator contracts
//!
//! The engine reads stat/salary joins and writes valuations through
//! [`AnalysisStore`]. Ingestion goes through [`IngestStore`], fed by a
//! [`StatsSource`] and a [`SalarySource`]. Every method fails with
//! [`ValuationError::UpstreamUnavailable`](crate::ValuationError) when the
//! collaborator cannot answer; an empty result is a valid answer.

use crate::error::Result;
use crate::models::{PlayerWeek, SalaryAggregate, SalaryRecord, StatRecord, ValuationRecord};

/// Store interface consumed by the analysis engine
#[async_trait::async_trait]
pub trait AnalysisStore: Send + Sync {
    /// Every stat line for the week, each joined with the same week's salary snapshot
    async fn fetch_stats_and_salaries(&self, week: i32, season: i32) -> Result<Vec<PlayerWeek>>;

    /// Insert or replace the valuation keyed on `(player_id, week, season)`
    async fn upsert_valuation(&self, valuation: &ValuationRecord) -> Result<()>;

    /// The player's most recent `limit_weeks` stat lines, most recent first
    async fn fetch_player_history(&self, player_id: &str, limit_weeks: u32) -> Result<Vec<PlayerWeek>>;

    /// Like [`fetch_player_history`](Self::fetch_player_history), but only lines
    /// at or before `(week, season)`, so later weeks never leak into the result
    async fn fetch_player_history_through(
        &self,
        player_id: &str,
        week: i32,
        season: i32,
        limit_weeks: u32,
    ) -> Result<Vec<PlayerWeek>>;

    /// Per-player salary change aggregates over rows with
    /// `week >= max(week) - lookback_weeks`, no minimum applied
    async fn fetch_salary_history(&self, lookback_weeks: u32) -> Result<Vec<SalaryAggregate>>;

    /// Valuations already computed for the week
    async fn fetch_valuations(&self, week: i32, season: i32) -> Result<Vec<ValuationRecord>>;
}

/// Store interface used when loading source data
#[async_trait::async_trait]
pub trait IngestStore: Send + Sync {
    /// Insert or replace the stat line keyed on `(player_id, week, season)`
    async fn save_stat_record(&self, stats: &StatRecord) -> Result<()>;

    /// Insert or replace the salary snapshot keyed on `(player_id, week, season)`
    async fn save_salary_record(&self, salary: &SalaryRecord) -> Result<()>;

    /// Most recent `(week, season)` with stat data
    async fn latest_week(&self) -> Result<Option<(i32, i32)>>;
}

/// Supplier of raw weekly stat lines
#[async_trait::async_trait]
pub trait StatsSource: Send + Sync {
    async fn fetch_weekly_stats(&self, week: i32, season: i32) -> Result<Vec<StatRecord>>;
}

/// Supplier of weekly DFS salary snapshots
#[async_trait::async_trait]
pub trait SalarySource: Send + Sync {
    async fn fetch_weekly_salaries(&self, week: i32, season: i32) -> Result<Vec<SalaryRecord>>;
}
