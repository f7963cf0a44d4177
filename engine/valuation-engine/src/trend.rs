use crate::config::TrendConfig;
use crate::models::{SalaryAggregate, SalaryTrend, TrendRecord};

/// Buckets multi-week average salary movement into a trend
#[derive(Debug, Clone, Default)]
pub struct TrendClassifier {
    config: TrendConfig,
}

impl TrendClassifier {
    pub fn new(config: TrendConfig) -> Self {
        Self { config }
    }

    /// Threshold cascade, first match wins
    pub fn classify_trend(&self, avg_salary_change: f64) -> SalaryTrend {
        let cfg = &self.config;

        if avg_salary_change > cfg.rising_fast_above {
            SalaryTrend::RisingFast
        } else if avg_salary_change > cfg.rising_above {
            SalaryTrend::Rising
        } else if avg_salary_change < cfg.falling_fast_below {
            SalaryTrend::FallingFast
        } else if avg_salary_change < cfg.falling_below {
            SalaryTrend::Falling
        } else {
            SalaryTrend::Stable
        }
    }

    /// Build trend records from store aggregates.
    ///
    /// Players tracked for fewer than `min_weeks_tracked` weeks are dropped.
    /// Output keeps the input order.
    pub fn classify_aggregates(&self, aggregates: &[SalaryAggregate]) -> Vec<TrendRecord> {
        aggregates
            .iter()
            .filter(|agg| agg.weeks_tracked >= self.config.min_weeks_tracked)
            .map(|agg| {
                let avg_change = agg.combined_avg_change();
                TrendRecord {
                    player_id: agg.player_id.clone(),
                    player_name: agg.player_name.clone(),
                    avg_salary_change: avg_change.round(),
                    trend: self.classify_trend(avg_change),
                    weeks_tracked: agg.weeks_tracked,
                }
            })
            .collect()
    }
}
