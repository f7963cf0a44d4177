//! In-memory store
//!
//! Keeps stat lines, salary snapshots and valuations in ordered maps keyed on
//! `(player_id, week, season)`. Used by tests and by runs that do not need a
//! database.

use crate::error::{Result, ValuationError};
use crate::models::{PlayerWeek, SalaryAggregate, SalaryRecord, StatRecord, ValuationRecord};
use crate::store::{AnalysisStore, IngestStore};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

type RecordKey = (String, i32, i32);

fn key(player_id: &str, week: i32, season: i32) -> RecordKey {
    (player_id.to_string(), week, season)
}

/// Store backed by process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    stats: RwLock<BTreeMap<RecordKey, StatRecord>>,
    salaries: RwLock<BTreeMap<RecordKey, SalaryRecord>>,
    valuations: RwLock<BTreeMap<RecordKey, ValuationRecord>>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call fail as if the backing service were down
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(ValuationError::upstream("memory-store", "store marked unavailable"));
        }
        Ok(())
    }

    /// Number of stored valuations across all weeks
    pub async fn valuation_count(&self) -> usize {
        self.valuations.read().await.len()
    }

    /// Stored valuation for a key, if any
    pub async fn get_valuation(&self, player_id: &str, week: i32, season: i32) -> Option<ValuationRecord> {
        self.valuations.read().await.get(&key(player_id, week, season)).cloned()
    }

    /// Most recent first, optionally bounded above by `(season, week)`
    async fn history(&self, player_id: &str, through: Option<(i32, i32)>, limit_weeks: u32) -> Vec<PlayerWeek> {
        let mut rows: Vec<StatRecord> = self
            .stats
            .read()
            .await
            .values()
            .filter(|s| s.player_id == player_id)
            .filter(|s| through.map_or(true, |bound| (s.season, s.week) <= bound))
            .cloned()
            .collect();
        rows.sort_by(|a, b| (b.season, b.week).cmp(&(a.season, a.week)));
        rows.truncate(limit_weeks as usize);

        let mut joined = Vec::with_capacity(rows.len());
        for stats in rows {
            joined.push(self.join_salary(stats).await);
        }
        joined
    }

    async fn join_salary(&self, stats: StatRecord) -> PlayerWeek {
        let salary = self
            .salaries
            .read()
            .await
            .get(&key(&stats.player_id, stats.week, stats.season))
            .cloned();
        PlayerWeek::new(stats, salary)
    }
}

fn mean(values: &[i32]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().map(|&v| f64::from(v)).sum::<f64>() / values.len() as f64)
}

#[async_trait::async_trait]
impl AnalysisStore for MemoryStore {
    async fn fetch_stats_and_salaries(&self, week: i32, season: i32) -> Result<Vec<PlayerWeek>> {
        self.check_available()?;

        let rows: Vec<StatRecord> = self
            .stats
            .read()
            .await
            .values()
            .filter(|s| s.week == week && s.season == season)
            .cloned()
            .collect();

        let mut joined = Vec::with_capacity(rows.len());
        for stats in rows {
            joined.push(self.join_salary(stats).await);
        }
        Ok(joined)
    }

    async fn upsert_valuation(&self, valuation: &ValuationRecord) -> Result<()> {
        self.check_available()?;
        self.valuations.write().await.insert(valuation.key(), valuation.clone());
        Ok(())
    }

    async fn fetch_player_history(&self, player_id: &str, limit_weeks: u32) -> Result<Vec<PlayerWeek>> {
        self.check_available()?;
        Ok(self.history(player_id, None, limit_weeks).await)
    }

    async fn fetch_player_history_through(
        &self,
        player_id: &str,
        week: i32,
        season: i32,
        limit_weeks: u32,
    ) -> Result<Vec<PlayerWeek>> {
        self.check_available()?;
        Ok(self.history(player_id, Some((season, week)), limit_weeks).await)
    }

    async fn fetch_salary_history(&self, lookback_weeks: u32) -> Result<Vec<SalaryAggregate>> {
        self.check_available()?;

        let salaries = self.salaries.read().await;
        let Some(max_week) = salaries.values().map(|s| s.week).max() else {
            return Ok(Vec::new());
        };
        let lookback = i32::try_from(lookback_weeks).unwrap_or(i32::MAX);
        let window_start = max_week.saturating_sub(lookback);

        // player_id -> (name, dk changes, fd changes, rows)
        let mut grouped: BTreeMap<&str, (&str, Vec<i32>, Vec<i32>, u32)> = BTreeMap::new();
        for salary in salaries.values().filter(|s| s.week >= window_start) {
            let entry = grouped
                .entry(salary.player_id.as_str())
                .or_insert_with(|| (salary.player_name.as_str(), Vec::new(), Vec::new(), 0));
            if entry.0.is_empty() {
                entry.0 = salary.player_name.as_str();
            }
            entry.1.extend(salary.dk_salary_change);
            entry.2.extend(salary.fd_salary_change);
            entry.3 += 1;
        }

        Ok(grouped
            .into_iter()
            .map(|(player_id, (player_name, dk, fd, rows))| SalaryAggregate {
                player_id: player_id.to_string(),
                player_name: player_name.to_string(),
                avg_change_a: mean(&dk),
                avg_change_b: mean(&fd),
                weeks_tracked: rows,
            })
            .collect())
    }

    async fn fetch_valuations(&self, week: i32, season: i32) -> Result<Vec<ValuationRecord>> {
        self.check_available()?;

        Ok(self
            .valuations
            .read()
            .await
            .values()
            .filter(|v| v.week == week && v.season == season)
            .cloned()
            .collect())
    }
}

#[async_trait::async_trait]
impl IngestStore for MemoryStore {
    async fn save_stat_record(&self, stats: &StatRecord) -> Result<()> {
        self.check_available()?;
        self.stats
            .write()
            .await
            .insert(key(&stats.player_id, stats.week, stats.season), stats.clone());
        Ok(())
    }

    async fn save_salary_record(&self, salary: &SalaryRecord) -> Result<()> {
        self.check_available()?;
        self.salaries
            .write()
            .await
            .insert(key(&salary.player_id, salary.week, salary.season), salary.clone());
        Ok(())
    }

    async fn latest_week(&self) -> Result<Option<(i32, i32)>> {
        self.check_available()?;
        Ok(self
            .stats
            .read()
            .await
            .values()
            .map(|s| (s.season, s.week))
            .max()
            .map(|(season, week)| (week, season)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MarketValue;

    fn salary(player_id: &str, week: i32, dk: Option<i32>, fd: Option<i32>) -> SalaryRecord {
        SalaryRecord {
            player_name: player_id.to_uppercase(),
            dk_salary_change: dk,
            fd_salary_change: fd,
            ..SalaryRecord::new(player_id, week, 2024)
        }
    }

    fn valuation(player_id: &str, week: i32, points: f64) -> ValuationRecord {
        ValuationRecord {
            player_id: player_id.to_string(),
            week,
            season: 2024,
            fantasy_points: points,
            usage_score: 0.0,
            efficiency_score: 0.0,
            market_value: MarketValue::Fair,
            salary_performance_correlation: None,
        }
    }

    #[tokio::test]
    async fn test_join_leaves_missing_salary_empty() {
        let store = MemoryStore::new();
        store.save_stat_record(&StatRecord::new("a", 1, 2024)).await.unwrap();
        store.save_stat_record(&StatRecord::new("b", 1, 2024)).await.unwrap();
        store.save_stat_record(&StatRecord::new("a", 2, 2024)).await.unwrap();
        store.save_salary_record(&salary("a", 1, Some(100), None)).await.unwrap();

        let rows = store.fetch_stats_and_salaries(1, 2024).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].stats.player_id, "a");
        assert_eq!(rows[0].salary_change_a(), Some(100));
        assert!(rows[1].salary.is_none());
    }

    #[tokio::test]
    async fn test_upsert_valuation_replaces_same_key() {
        let store = MemoryStore::new();
        store.upsert_valuation(&valuation("a", 1, 10.0)).await.unwrap();
        store.upsert_valuation(&valuation("a", 1, 12.5)).await.unwrap();
        store.upsert_valuation(&valuation("a", 2, 3.0)).await.unwrap();

        assert_eq!(store.valuation_count().await, 2);
        assert_eq!(store.get_valuation("a", 1, 2024).await.unwrap().fantasy_points, 12.5);
        assert_eq!(store.fetch_valuations(1, 2024).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_history_most_recent_first_across_seasons() {
        let store = MemoryStore::new();
        for (week, season) in [(17, 2023), (18, 2023), (1, 2024), (2, 2024)] {
            store.save_stat_record(&StatRecord::new("a", week, season)).await.unwrap();
        }

        let history = store.fetch_player_history("a", 3).await.unwrap();
        let order: Vec<(i32, i32)> = history.iter().map(|w| (w.stats.week, w.stats.season)).collect();
        assert_eq!(order, vec![(2, 2024), (1, 2024), (18, 2023)]);
        assert!(store.fetch_player_history("missing", 8).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_history_through_excludes_later_weeks() {
        let store = MemoryStore::new();
        for (week, season) in [(18, 2023), (1, 2024), (2, 2024), (3, 2024)] {
            store.save_stat_record(&StatRecord::new("a", week, season)).await.unwrap();
        }

        let history = store.fetch_player_history_through("a", 1, 2024, 8).await.unwrap();
        let order: Vec<(i32, i32)> = history.iter().map(|w| (w.stats.week, w.stats.season)).collect();
        assert_eq!(order, vec![(1, 2024), (18, 2023)]);

        let history = store.fetch_player_history_through("a", 3, 2024, 2).await.unwrap();
        let order: Vec<(i32, i32)> = history.iter().map(|w| (w.stats.week, w.stats.season)).collect();
        assert_eq!(order, vec![(3, 2024), (2, 2024)]);
    }

    #[tokio::test]
    async fn test_salary_window_ignores_season() {
        let store = MemoryStore::new();
        store.save_salary_record(&SalaryRecord { season: 2023, ..salary("a", 18, Some(100), None) }).await.unwrap();
        for week in 1..=3 {
            store.save_salary_record(&salary("b", week, Some(300), None)).await.unwrap();
        }
        store.save_salary_record(&salary("c", 15, Some(50), None)).await.unwrap();

        // Last season's week 18 sets the window to weeks >= 14 of any season
        let aggregates = store.fetch_salary_history(4).await.unwrap();
        let ids: Vec<&str> = aggregates.iter().map(|a| a.player_id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[tokio::test]
    async fn test_salary_history_window_and_averages() {
        let store = MemoryStore::new();
        for week in 1..=6 {
            store.save_salary_record(&salary("a", week, Some(week * 100), None)).await.unwrap();
        }
        store.save_salary_record(&salary("b", 6, Some(50), Some(150))).await.unwrap();

        // max week 6, lookback 2 -> weeks 4, 5, 6
        let aggregates = store.fetch_salary_history(2).await.unwrap();
        assert_eq!(aggregates.len(), 2);

        let a = &aggregates[0];
        assert_eq!(a.player_id, "a");
        assert_eq!(a.weeks_tracked, 3);
        assert_eq!(a.avg_change_a, Some(500.0));
        assert_eq!(a.avg_change_b, None);
        assert_eq!(a.player_name, "A");

        let b = &aggregates[1];
        assert_eq!(b.weeks_tracked, 1);
        assert_eq!(b.combined_avg_change(), 100.0);
    }

    #[tokio::test]
    async fn test_empty_store_answers_neutrally() {
        let store = MemoryStore::new();
        assert!(store.fetch_stats_and_salaries(1, 2024).await.unwrap().is_empty());
        assert!(store.fetch_salary_history(4).await.unwrap().is_empty());
        assert!(store.fetch_valuations(1, 2024).await.unwrap().is_empty());
        assert_eq!(store.latest_week().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_latest_week_orders_by_season_then_week() {
        let store = MemoryStore::new();
        store.save_stat_record(&StatRecord::new("a", 18, 2023)).await.unwrap();
        store.save_stat_record(&StatRecord::new("a", 2, 2024)).await.unwrap();
        assert_eq!(store.latest_week().await.unwrap(), Some((2, 2024)));
    }

    #[tokio::test]
    async fn test_unavailable_store_fails_every_call() {
        let store = MemoryStore::new();
        store.set_unavailable(true);

        let err = store.fetch_stats_and_salaries(1, 2024).await.unwrap_err();
        assert!(err.is_upstream());
        assert!(store.save_stat_record(&StatRecord::new("a", 1, 2024)).await.is_err());
        assert!(store.fetch_salary_history(4).await.is_err());

        store.set_unavailable(false);
        assert!(store.fetch_salary_history(4).await.is_ok());
    }
}
