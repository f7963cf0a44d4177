use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One player's box-score line for one week, as supplied by the stats source.
///
/// Every numeric field is optional: `None` means the feed did not report the
/// value. Scoring treats an absent field as a zero contribution, but the record
/// itself never stores a fabricated zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatRecord {
    pub player_id: String,
    #[serde(default)]
    pub player_name: String,
    #[serde(default)]
    pub team: String,
    #[serde(default)]
    pub position: String,
    pub week: i32,
    pub season: i32,
    #[serde(default = "Utc::now")]
    pub collected_at: DateTime<Utc>,

    // Core stats
    pub snaps: Option<i32>,
    pub snap_percentage: Option<f64>,
    pub targets: Option<i32>,
    pub receptions: Option<i32>,
    pub receiving_yards: Option<i32>,
    pub receiving_tds: Option<i32>,
    pub carries: Option<i32>,
    pub rushing_yards: Option<i32>,
    pub rushing_tds: Option<i32>,

    // Advanced metrics
    pub air_yards: Option<i32>,
    pub yards_after_catch: Option<i32>,
    pub red_zone_targets: Option<i32>,
    pub target_share: Option<f64>,
}

impl StatRecord {
    /// Create an empty stat line with every metric unknown
    pub fn new(player_id: impl Into<String>, week: i32, season: i32) -> Self {
        Self {
            player_id: player_id.into(),
            player_name: String::new(),
            team: String::new(),
            position: String::new(),
            week,
            season,
            collected_at: Utc::now(),
            snaps: None,
            snap_percentage: None,
            targets: None,
            receptions: None,
            receiving_yards: None,
            receiving_tds: None,
            carries: None,
            rushing_yards: None,
            rushing_tds: None,
            air_yards: None,
            yards_after_catch: None,
            red_zone_targets: None,
            target_share: None,
        }
    }

    /// True when the player saw at least one target or carry
    pub fn has_opportunity(&self) -> bool {
        self.targets.unwrap_or(0) > 0 || self.carries.unwrap_or(0) > 0
    }
}

/// DFS salary snapshot for one player and week across both platforms.
///
/// Platform A is DraftKings, platform B is FanDuel. A platform without a
/// listing that week leaves its fields `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryRecord {
    pub player_id: String,
    #[serde(default)]
    pub player_name: String,
    pub week: i32,
    pub season: i32,
    #[serde(default = "Utc::now")]
    pub collected_at: DateTime<Utc>,

    pub draftkings_salary: Option<i32>,
    pub fanduel_salary: Option<i32>,

    // Week-over-week changes
    pub dk_salary_change: Option<i32>,
    pub fd_salary_change: Option<i32>,
    pub dk_percent_change: Option<f64>,
    pub fd_percent_change: Option<f64>,
}

impl SalaryRecord {
    /// Create a salary snapshot with no listing on either platform
    pub fn new(player_id: impl Into<String>, week: i32, season: i32) -> Self {
        Self {
            player_id: player_id.into(),
            player_name: String::new(),
            week,
            season,
            collected_at: Utc::now(),
            draftkings_salary: None,
            fanduel_salary: None,
            dk_salary_change: None,
            fd_salary_change: None,
            dk_percent_change: None,
            fd_percent_change: None,
        }
    }

    /// Mean of the two platforms' absolute changes, an unlisted platform counting as 0
    pub fn avg_salary_change(&self) -> f64 {
        average_change(self.dk_salary_change, self.fd_salary_change)
    }
}

/// Average two optional platform salary changes, absent values counting as zero
pub fn average_change(change_a: Option<i32>, change_b: Option<i32>) -> f64 {
    (f64::from(change_a.unwrap_or(0)) + f64::from(change_b.unwrap_or(0))) / 2.0
}

/// A stat line joined with the same week's salary snapshot, if there is one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerWeek {
    pub stats: StatRecord,
    pub salary: Option<SalaryRecord>,
}

impl PlayerWeek {
    pub fn new(stats: StatRecord, salary: Option<SalaryRecord>) -> Self {
        Self { stats, salary }
    }

    /// Platform A (DraftKings) salary change, if listed
    pub fn salary_change_a(&self) -> Option<i32> {
        self.salary.as_ref().and_then(|s| s.dk_salary_change)
    }

    /// Platform B (FanDuel) salary change, if listed
    pub fn salary_change_b(&self) -> Option<i32> {
        self.salary.as_ref().and_then(|s| s.fd_salary_change)
    }

    pub fn avg_salary_change(&self) -> f64 {
        average_change(self.salary_change_a(), self.salary_change_b())
    }
}

/// Points awarded per reception
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringSystem {
    #[default]
    Ppr,
    HalfPpr,
    Standard,
}

impl ScoringSystem {
    pub fn reception_points(self) -> f64 {
        match self {
            ScoringSystem::Ppr => 1.0,
            ScoringSystem::HalfPpr => 0.5,
            ScoringSystem::Standard => 0.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ScoringSystem::Ppr => "ppr",
            ScoringSystem::HalfPpr => "half_ppr",
            ScoringSystem::Standard => "standard",
        }
    }
}

impl FromStr for ScoringSystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ppr" => Ok(ScoringSystem::Ppr),
            "half_ppr" | "half-ppr" => Ok(ScoringSystem::HalfPpr),
            "standard" => Ok(ScoringSystem::Standard),
            other => Err(format!("unknown scoring system: {other}")),
        }
    }
}

/// Market-value label comparing performance against salary movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketValue {
    Undervalued,
    Overvalued,
    Fair,
}

impl MarketValue {
    pub fn as_str(self) -> &'static str {
        match self {
            MarketValue::Undervalued => "undervalued",
            MarketValue::Overvalued => "overvalued",
            MarketValue::Fair => "fair",
        }
    }
}

impl fmt::Display for MarketValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MarketValue {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "undervalued" => Ok(MarketValue::Undervalued),
            "overvalued" => Ok(MarketValue::Overvalued),
            "fair" => Ok(MarketValue::Fair),
            other => Err(format!("unknown market value label: {other}")),
        }
    }
}

/// Computed valuation for one (player, week, season) key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationRecord {
    pub player_id: String,
    pub week: i32,
    pub season: i32,
    pub fantasy_points: f64,
    /// 0-100 composite
    pub usage_score: f64,
    /// Yards per opportunity
    pub efficiency_score: f64,
    pub market_value: MarketValue,
    /// `None` when history is too short or the correlation is undefined
    pub salary_performance_correlation: Option<f64>,
}

impl ValuationRecord {
    /// Storage key; at most one record exists per key
    pub fn key(&self) -> (String, i32, i32) {
        (self.player_id.clone(), self.week, self.season)
    }
}

/// Salary trend bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SalaryTrend {
    RisingFast,
    Rising,
    Stable,
    Falling,
    FallingFast,
}

impl SalaryTrend {
    pub fn as_str(self) -> &'static str {
        match self {
            SalaryTrend::RisingFast => "rising_fast",
            SalaryTrend::Rising => "rising",
            SalaryTrend::Stable => "stable",
            SalaryTrend::Falling => "falling",
            SalaryTrend::FallingFast => "falling_fast",
        }
    }
}

impl fmt::Display for SalaryTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-player salary change aggregate over a lookback window, as returned by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalaryAggregate {
    pub player_id: String,
    pub player_name: String,
    /// Mean platform A change over the listed weeks, `None` if never listed
    pub avg_change_a: Option<f64>,
    /// Mean platform B change over the listed weeks, `None` if never listed
    pub avg_change_b: Option<f64>,
    pub weeks_tracked: u32,
}

impl SalaryAggregate {
    /// Cross-platform average, an unlisted platform counting as 0
    pub fn combined_avg_change(&self) -> f64 {
        (self.avg_change_a.unwrap_or(0.0) + self.avg_change_b.unwrap_or(0.0)) / 2.0
    }
}

/// A player's multi-week salary trend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendRecord {
    pub player_id: String,
    pub player_name: String,
    pub avg_salary_change: f64,
    pub trend: SalaryTrend,
    pub weeks_tracked: u32,
}

/// One player's recent stat and salary lines with their correlation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerAnalysis {
    pub player_id: String,
    /// Weeks of history requested
    pub weeks: u32,
    /// Most recent first
    pub history: Vec<PlayerWeek>,
    pub salary_performance_correlation: Option<f64>,
}

/// Aggregate statistics over one week's valuations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub total_players: usize,
    pub avg_fantasy_points: f64,
    pub avg_usage_score: f64,
    pub undervalued_count: usize,
    pub overvalued_count: usize,
}

/// Weekly report snapshot; recomputed on every request, never persisted by the engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyReport {
    pub week: i32,
    pub season: i32,
    pub generated_at: DateTime<Utc>,
    pub top_performers: Vec<ValuationRecord>,
    pub salary_trends: Vec<TrendRecord>,
    pub summary_stats: SummaryStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_change_treats_missing_as_zero() {
        assert_eq!(average_change(Some(200), Some(150)), 175.0);
        assert_eq!(average_change(Some(300), None), 150.0);
        assert_eq!(average_change(None, None), 0.0);
    }

    #[test]
    fn test_player_week_without_salary() {
        let week = PlayerWeek::new(StatRecord::new("p1", 3, 2024), None);
        assert_eq!(week.salary_change_a(), None);
        assert_eq!(week.avg_salary_change(), 0.0);
    }

    #[test]
    fn test_market_value_round_trips_through_text() {
        for label in [MarketValue::Undervalued, MarketValue::Overvalued, MarketValue::Fair] {
            assert_eq!(label.as_str().parse::<MarketValue>().unwrap(), label);
        }
        assert!("cheap".parse::<MarketValue>().is_err());
    }

    #[test]
    fn test_scoring_system_parsing() {
        assert_eq!("PPR".parse::<ScoringSystem>().unwrap(), ScoringSystem::Ppr);
        assert_eq!("half-ppr".parse::<ScoringSystem>().unwrap(), ScoringSystem::HalfPpr);
        assert_eq!("standard".parse::<ScoringSystem>().unwrap().reception_points(), 0.0);
    }

    #[test]
    fn test_stat_record_deserializes_missing_fields_as_unknown() {
        let json = r#"{"player_id":"cooper_kupp","week":1,"season":2024,"targets":12}"#;
        let record: StatRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.targets, Some(12));
        assert_eq!(record.receptions, None);
        assert_eq!(record.target_share, None);
        assert!(record.player_name.is_empty());
    }

    #[test]
    fn test_has_opportunity() {
        let mut record = StatRecord::new("p1", 1, 2024);
        assert!(!record.has_opportunity());
        record.carries = Some(0);
        assert!(!record.has_opportunity());
        record.targets = Some(1);
        assert!(record.has_opportunity());
    }

    #[test]
    fn test_labels_serialize_snake_case() {
        assert_eq!(serde_json::to_string(&SalaryTrend::RisingFast).unwrap(), "\"rising_fast\"");
        assert_eq!(serde_json::to_string(&MarketValue::Fair).unwrap(), "\"fair\"");
    }
}
