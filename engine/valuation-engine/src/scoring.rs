use crate::config::{ScoringConfig, UsageConfig};
use crate::models::{ScoringSystem, StatRecord};

/// Round half away from zero to `places` decimals
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

fn count(value: Option<i32>) -> f64 {
    value.map(f64::from).unwrap_or(0.0)
}

/// Per-week scoring of a single stat line: fantasy points, usage and efficiency
#[derive(Debug, Clone, Default)]
pub struct ScoringFunctions {
    scoring: ScoringConfig,
    usage: UsageConfig,
}

impl ScoringFunctions {
    pub fn new(scoring: ScoringConfig, usage: UsageConfig) -> Self {
        Self { scoring, usage }
    }

    /// Scoring system used when none is given explicitly
    pub fn default_system(&self) -> ScoringSystem {
        self.scoring.system
    }

    /// Fantasy points under `system`, rounded to 2 decimals.
    ///
    /// `receptions * ppr + (rec_yds + rush_yds) * per_yard + (rec_td + rush_td) * per_td`,
    /// with absent fields contributing nothing.
    pub fn fantasy_points(&self, stats: &StatRecord, system: ScoringSystem) -> f64 {
        let per_yard = self.scoring.points_per_yard;
        let per_td = self.scoring.points_per_touchdown;

        let mut points = 0.0;
        points += count(stats.receptions) * system.reception_points();
        points += count(stats.receiving_yards) * per_yard;
        points += count(stats.receiving_tds) * per_td;
        points += count(stats.rushing_yards) * per_yard;
        points += count(stats.rushing_tds) * per_td;

        round_to(points, 2)
    }

    /// Usage composite on a 0-100 scale, rounded to 2 decimals.
    ///
    /// Absent inputs drop their weight instead of being imputed, so a record
    /// missing e.g. snap share can never reach 100.
    pub fn usage_score(&self, stats: &StatRecord) -> f64 {
        let weights = &self.usage;
        let mut usage = 0.0;

        if let Some(share) = stats.target_share {
            usage += share * weights.target_share_weight;
        }
        if let Some(targets) = stats.targets {
            usage += (f64::from(targets) / weights.targets_cap).min(1.0) * weights.targets_weight;
        }
        if let Some(carries) = stats.carries {
            usage += (f64::from(carries) / weights.carries_cap).min(1.0) * weights.carries_weight;
        }
        if let Some(snap_pct) = stats.snap_percentage {
            usage += snap_pct / 100.0 * weights.snap_weight;
        }

        round_to(usage * 100.0, 2)
    }

    /// Total yards per target-or-carry, rounded to 2 decimals; 0.0 without opportunities
    pub fn efficiency_score(&self, stats: &StatRecord) -> f64 {
        let opportunities = count(stats.targets) + count(stats.carries);
        if opportunities == 0.0 {
            return 0.0;
        }

        let yards = count(stats.receiving_yards) + count(stats.rushing_yards);
        round_to(yards / opportunities, 2)
    }
}
