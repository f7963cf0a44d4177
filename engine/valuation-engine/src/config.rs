//! # Configuration
//!
//! Every tunable constant of the scoring and classification formulas lives here
//! so callers can recalibrate per scoring system or per season.

use crate::error::ValuationError;
use crate::models::ScoringSystem;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for the valuation engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ValuationConfig {
    /// Fantasy point scoring
    pub scoring: ScoringConfig,
    /// Usage score weights and caps
    pub usage: UsageConfig,
    /// Market value classification
    pub market_value: MarketValueConfig,
    /// Salary trend buckets
    pub trend: TrendConfig,
    /// Salary/performance correlation
    pub correlation: CorrelationConfig,
    /// Weekly report assembly
    pub report: ReportConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Reception value: ppr, half_ppr or standard
    pub system: ScoringSystem,
    /// Points per receiving or rushing yard
    pub points_per_yard: f64,
    /// Points per receiving or rushing touchdown
    pub points_per_touchdown: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self { system: ScoringSystem::Ppr, points_per_yard: 0.1, points_per_touchdown: 6.0 }
    }
}

/// Usage score weights. They sum to 1.0 so a fully tracked player can reach 100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UsageConfig {
    pub target_share_weight: f64,
    pub targets_weight: f64,
    pub carries_weight: f64,
    pub snap_weight: f64,
    /// Targets at which the targets term saturates
    pub targets_cap: f64,
    /// Carries at which the carries term saturates
    pub carries_cap: f64,
}

impl Default for UsageConfig {
    fn default() -> Self {
        Self {
            target_share_weight: 0.4,
            targets_weight: 0.3,
            carries_weight: 0.2,
            snap_weight: 0.1,
            targets_cap: 15.0,
            carries_cap: 25.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketValueConfig {
    pub fantasy_points_weight: f64,
    pub usage_weight: f64,
    pub efficiency_weight: f64,
    /// Performance composite above which a player can be undervalued
    pub undervalued_min_performance: f64,
    /// Performance composite below which a player can be overvalued
    pub overvalued_max_performance: f64,
    /// Average salary change (dollars) separating the two labels
    pub salary_change_pivot: f64,
}

impl Default for MarketValueConfig {
    fn default() -> Self {
        Self {
            fantasy_points_weight: 0.5,
            usage_weight: 0.3,
            efficiency_weight: 0.2,
            undervalued_min_performance: 15.0,
            overvalued_max_performance: 8.0,
            salary_change_pivot: 200.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendConfig {
    pub rising_fast_above: f64,
    pub rising_above: f64,
    pub falling_below: f64,
    pub falling_fast_below: f64,
    /// Players tracked for fewer weeks are left out of trend output
    pub min_weeks_tracked: u32,
    /// Trailing window used by the weekly report
    pub lookback_weeks: u32,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            rising_fast_above: 300.0,
            rising_above: 100.0,
            falling_below: -100.0,
            falling_fast_below: -300.0,
            min_weeks_tracked: 3,
            lookback_weeks: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrelationConfig {
    /// Fewer observations than this yield an unknown correlation
    pub min_observations: usize,
    /// Weeks of history pulled when attaching correlations to valuations
    pub lookback_weeks: u32,
    /// Fill `salary_performance_correlation` during weekly analysis
    pub attach_to_valuations: bool,
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self { min_observations: 3, lookback_weeks: 8, attach_to_valuations: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Only valuations strictly above this many points are top performers
    pub top_performer_min_points: f64,
    /// Default cap on the top performer list
    pub top_performer_limit: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self { top_performer_min_points: 10.0, top_performer_limit: 20 }
    }
}

impl ValuationConfig {
    /// Load configuration from environment variables on top of the defaults
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Ok(system) = std::env::var("DFS_SCORING_SYSTEM") {
            config.scoring.system = system.parse().map_err(anyhow::Error::msg)?;
        }

        if let Ok(lookback) = std::env::var("DFS_TREND_LOOKBACK") {
            config.trend.lookback_weeks = lookback.parse().unwrap_or(4);
        }

        if let Ok(lookback) = std::env::var("DFS_CORRELATION_LOOKBACK") {
            config.correlation.lookback_weeks = lookback.parse().unwrap_or(8);
        }

        if let Ok(limit) = std::env::var("DFS_REPORT_LIMIT") {
            config.report.top_performer_limit = limit.parse().unwrap_or(20);
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load_from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: ValuationConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject threshold sets that would make a cascade branch unreachable or ambiguous
    pub fn validate(&self) -> Result<(), ValuationError> {
        let trend = &self.trend;
        if !(trend.rising_fast_above >= trend.rising_above
            && trend.rising_above >= trend.falling_below
            && trend.falling_below >= trend.falling_fast_below)
        {
            return Err(ValuationError::invalid_config(format!(
                "trend bounds must be ordered: rising_fast_above ({}) >= rising_above ({}) >= falling_below ({}) >= falling_fast_below ({})",
                trend.rising_fast_above, trend.rising_above, trend.falling_below, trend.falling_fast_below
            )));
        }

        if self.market_value.overvalued_max_performance > self.market_value.undervalued_min_performance {
            return Err(ValuationError::invalid_config(
                "overvalued_max_performance must not exceed undervalued_min_performance",
            ));
        }

        if self.usage.targets_cap <= 0.0 || self.usage.carries_cap <= 0.0 {
            return Err(ValuationError::invalid_config("usage caps must be > 0"));
        }

        if self.correlation.min_observations < 2 {
            return Err(ValuationError::invalid_config(
                "correlation needs at least 2 observations",
            ));
        }

        if self.report.top_performer_limit == 0 {
            return Err(ValuationError::invalid_config("top_performer_limit must be > 0"));
        }

        Ok(())
    }
}
