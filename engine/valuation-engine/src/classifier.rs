use crate::config::MarketValueConfig;
use crate::models::{average_change, MarketValue};

/// Labels a player-week undervalued, overvalued or fair
#[derive(Debug, Clone, Default)]
pub struct ValueClassifier {
    config: MarketValueConfig,
}

impl ValueClassifier {
    pub fn new(config: MarketValueConfig) -> Self {
        Self { config }
    }

    /// Weighted composite of the three per-week metrics
    pub fn performance_score(&self, fantasy_points: f64, usage_score: f64, efficiency_score: f64) -> f64 {
        fantasy_points * self.config.fantasy_points_weight
            + usage_score * self.config.usage_weight
            + efficiency_score * self.config.efficiency_weight
    }

    /// Classify from the raw metrics and the two platforms' salary changes
    pub fn assess_market_value(
        &self,
        fantasy_points: f64,
        usage_score: f64,
        efficiency_score: f64,
        salary_change_a: Option<i32>,
        salary_change_b: Option<i32>,
    ) -> MarketValue {
        let performance = self.performance_score(fantasy_points, usage_score, efficiency_score);
        let avg_salary_change = average_change(salary_change_a, salary_change_b);
        self.classify(performance, avg_salary_change)
    }

    /// Threshold cascade, first match wins
    pub fn classify(&self, performance_score: f64, avg_salary_change: f64) -> MarketValue {
        let cfg = &self.config;

        if performance_score > cfg.undervalued_min_performance && avg_salary_change < cfg.salary_change_pivot {
            MarketValue::Undervalued
        } else if performance_score < cfg.overvalued_max_performance
            && avg_salary_change > cfg.salary_change_pivot
        {
            MarketValue::Overvalued
        } else {
            MarketValue::Fair
        }
    }
}
