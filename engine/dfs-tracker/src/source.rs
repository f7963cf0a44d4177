//! File-backed stats and salary source
//!
//! Reads one JSON array per week and feed from the data directory:
//! `week_<w>_<s>_stats.json` holds [`StatRecord`]s and
//! `week_<w>_<s>_salaries.json` holds [`SalaryRecord`]s.

use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use valuation_engine::{SalaryRecord, SalarySource, StatRecord, StatsSource, ValuationError};

pub struct JsonFileSource {
    data_dir: PathBuf,
}

impl JsonFileSource {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self { data_dir: data_dir.into() }
    }

    pub fn stats_path(&self, week: i32, season: i32) -> PathBuf {
        self.data_dir.join(format!("week_{}_{}_stats.json", week, season))
    }

    pub fn salaries_path(&self, week: i32, season: i32) -> PathBuf {
        self.data_dir.join(format!("week_{}_{}_salaries.json", week, season))
    }
}

async fn read_records<T: DeserializeOwned>(collaborator: &str, path: &Path) -> valuation_engine::Result<Vec<T>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| ValuationError::upstream(collaborator, format!("{}: {}", path.display(), e)))?;
    Ok(serde_json::from_str(&content)?)
}

/// Percentage move from last week's salary; `None` unless both values are
/// known, the change is non-zero and last week's salary was positive
pub fn percent_change(salary: Option<i32>, change: Option<i32>) -> Option<f64> {
    let (salary, change) = (salary?, change?);
    if salary <= 0 || change == 0 {
        return None;
    }

    // Feed values can sit at the i32 bounds
    let previous = i64::from(salary) - i64::from(change);
    (previous > 0).then(|| f64::from(change) * 100.0 / previous as f64)
}

#[async_trait::async_trait]
impl StatsSource for JsonFileSource {
    /// Rows without a target or a carry are dropped
    async fn fetch_weekly_stats(&self, week: i32, season: i32) -> valuation_engine::Result<Vec<StatRecord>> {
        let path = self.stats_path(week, season);
        let rows: Vec<StatRecord> = read_records("stats-file", &path).await?;
        let total = rows.len();

        let stats: Vec<StatRecord> = rows
            .into_iter()
            .filter(StatRecord::has_opportunity)
            .map(|mut record| {
                record.week = week;
                record.season = season;
                record
            })
            .collect();

        info!(week, season, kept = stats.len(), dropped = total - stats.len(), "Loaded weekly stats");
        Ok(stats)
    }
}

#[async_trait::async_trait]
impl SalarySource for JsonFileSource {
    async fn fetch_weekly_salaries(&self, week: i32, season: i32) -> valuation_engine::Result<Vec<SalaryRecord>> {
        let path = self.salaries_path(week, season);
        let rows: Vec<SalaryRecord> = read_records("salary-file", &path).await?;

        let salaries: Vec<SalaryRecord> = rows
            .into_iter()
            .map(|mut record| {
                record.week = week;
                record.season = season;
                if record.dk_percent_change.is_none() {
                    record.dk_percent_change = percent_change(record.draftkings_salary, record.dk_salary_change);
                }
                if record.fd_percent_change.is_none() {
                    record.fd_percent_change = percent_change(record.fanduel_salary, record.fd_salary_change);
                }
                record
            })
            .collect();

        debug!(week, season, count = salaries.len(), "Loaded weekly salaries");
        Ok(salaries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, body: &str) {
        std::fs::write(dir.join(name), body).unwrap();
    }

    #[test]
    fn test_percent_change() {
        assert_eq!(percent_change(Some(8200), Some(200)), Some(2.5));
        assert_eq!(percent_change(Some(7800), Some(-200)), Some(-2.5));
        assert_eq!(percent_change(Some(8200), None), None);
        assert_eq!(percent_change(None, Some(200)), None);
        assert_eq!(percent_change(Some(8200), Some(0)), None);
        assert_eq!(percent_change(Some(200), Some(200)), None);
    }

    #[test]
    fn test_percent_change_extreme_values() {
        assert_eq!(percent_change(Some(2_000_000_000), Some(-2_000_000_000)), Some(-50.0));
        assert_eq!(percent_change(Some(1), Some(i32::MIN)), Some(f64::from(i32::MIN) * 100.0 / 2_147_483_649.0));
        assert_eq!(percent_change(Some(i32::MAX), Some(i32::MAX)), None);
    }

    #[tokio::test]
    async fn test_stats_without_opportunity_are_dropped() {
        let temp_dir = TempDir::new().unwrap();
        write(
            temp_dir.path(),
            "week_5_2024_stats.json",
            r#"[
                {"player_id": "josh_allen", "week": 5, "season": 2024, "targets": 0, "carries": 8, "rushing_yards": 54},
                {"player_id": "backup_qb", "week": 5, "season": 2024, "targets": 0, "carries": 0},
                {"player_id": "kicker", "week": 5, "season": 2024},
                {"player_id": "cooper_kupp", "week": 4, "season": 2024, "targets": 12}
            ]"#,
        );

        let source = JsonFileSource::new(temp_dir.path());
        let stats = source.fetch_weekly_stats(5, 2024).await.unwrap();

        let ids: Vec<&str> = stats.iter().map(|s| s.player_id.as_str()).collect();
        assert_eq!(ids, vec!["josh_allen", "cooper_kupp"]);
        // The file name decides the week
        assert!(stats.iter().all(|s| s.week == 5 && s.season == 2024));
        assert_eq!(stats[0].receptions, None);
    }

    #[tokio::test]
    async fn test_salaries_fill_missing_percent_change() {
        let temp_dir = TempDir::new().unwrap();
        write(
            temp_dir.path(),
            "week_5_2024_salaries.json",
            r#"[
                {"player_id": "josh_allen", "week": 5, "season": 2024,
                 "draftkings_salary": 8200, "dk_salary_change": 200,
                 "fanduel_salary": 9000, "fd_salary_change": 150, "fd_percent_change": 1.9}
            ]"#,
        );

        let source = JsonFileSource::new(temp_dir.path());
        let salaries = source.fetch_weekly_salaries(5, 2024).await.unwrap();
        assert_eq!(salaries.len(), 1);
        assert_eq!(salaries[0].dk_percent_change, Some(2.5));
        assert_eq!(salaries[0].fd_percent_change, Some(1.9));
    }

    #[tokio::test]
    async fn test_missing_file_is_upstream_unavailable() {
        let temp_dir = TempDir::new().unwrap();
        let source = JsonFileSource::new(temp_dir.path());

        assert!(source.fetch_weekly_stats(1, 2024).await.unwrap_err().is_upstream());
        assert!(source.fetch_weekly_salaries(1, 2024).await.unwrap_err().is_upstream());
    }

    #[tokio::test]
    async fn test_malformed_file_is_a_serialization_error() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "week_1_2024_stats.json", "{not json");

        let source = JsonFileSource::new(temp_dir.path());
        let err = source.fetch_weekly_stats(1, 2024).await.unwrap_err();
        assert!(matches!(err, ValuationError::Serialization(_)));
    }

    #[tokio::test]
    async fn test_empty_week_is_valid() {
        let temp_dir = TempDir::new().unwrap();
        write(temp_dir.path(), "week_1_2024_stats.json", "[]");

        let source = JsonFileSource::new(temp_dir.path());
        assert!(source.fetch_weekly_stats(1, 2024).await.unwrap().is_empty());
    }
}
