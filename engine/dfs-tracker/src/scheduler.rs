use crate::calendar::{backfill_weeks, current_week, next_run, target_week, ScheduleSlot};
use crate::config::TrackerConfig;
use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{error, info, warn};
use valuation_engine::{
    AnalysisStore, IngestStore, SalarySource, StatsSource, ValuationRecord, WeeklyAnalysisEngine, WeeklyReport,
};

/// Counts from loading one week of source data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    pub stats: usize,
    pub salaries: usize,
}

/// Result of one weekly update
#[derive(Debug, Clone, Serialize)]
pub struct UpdateOutcome {
    pub week: i32,
    pub season: i32,
    pub ingested: IngestSummary,
    pub valuations: usize,
    pub report_path: PathBuf,
}

/// Weeks processed and skipped by a backfill
#[derive(Debug, Clone, Default, Serialize)]
pub struct BackfillSummary {
    pub processed: Vec<(i32, i32)>,
    pub skipped: Vec<(i32, i32)>,
}

/// Weekly ingest, analysis and report job
pub struct TrackerScheduler {
    stats_source: Arc<dyn StatsSource>,
    salary_source: Arc<dyn SalarySource>,
    ingest: Arc<dyn IngestStore>,
    engine: WeeklyAnalysisEngine,
    reports_dir: PathBuf,
    slots: Vec<ScheduleSlot>,
}

impl TrackerScheduler {
    pub fn new<S, F>(store: Arc<S>, source: Arc<F>, config: &TrackerConfig) -> Result<Self>
    where
        S: AnalysisStore + IngestStore + 'static,
        F: StatsSource + SalarySource + 'static,
    {
        let engine = WeeklyAnalysisEngine::new(store.clone(), config.valuation.clone())
            .context("Invalid valuation configuration")?;

        Ok(Self {
            stats_source: source.clone(),
            salary_source: source,
            ingest: store,
            engine,
            reports_dir: config.reports.dir.clone(),
            slots: config.schedule.parsed_slots()?,
        })
    }

    pub fn engine(&self) -> &WeeklyAnalysisEngine {
        &self.engine
    }

    /// Most recent week with stored stats
    pub async fn latest_week(&self) -> Result<Option<(i32, i32)>> {
        Ok(self.ingest.latest_week().await?)
    }

    /// Load one week of stats and salaries into the store.
    ///
    /// Missing stats fail the week. Missing salaries only log a warning: the
    /// analysis then treats every player as unlisted.
    pub async fn ingest_week(&self, week: i32, season: i32) -> Result<IngestSummary> {
        let stats = self
            .stats_source
            .fetch_weekly_stats(week, season)
            .await
            .with_context(|| format!("Failed to collect stats for week {} {}", week, season))?;
        for record in &stats {
            self.ingest.save_stat_record(record).await?;
        }

        let salaries = match self.salary_source.fetch_weekly_salaries(week, season).await {
            Ok(salaries) => salaries,
            Err(e) => {
                warn!(week, season, "Salary collection failed, continuing without salaries: {}", e);
                Vec::new()
            }
        };
        for record in &salaries {
            self.ingest.save_salary_record(record).await?;
        }

        info!(week, season, stats = stats.len(), salaries = salaries.len(), "📥 Ingested week");
        Ok(IngestSummary { stats: stats.len(), salaries: salaries.len() })
    }

    /// Ingest then analyze one week
    pub async fn process_week(&self, week: i32, season: i32) -> Result<(IngestSummary, Vec<ValuationRecord>)> {
        let ingested = self.ingest_week(week, season).await?;
        let valuations = self
            .engine
            .analyze_weekly_performance(week, season)
            .await
            .with_context(|| format!("Failed to analyze week {} {}", week, season))?;
        Ok((ingested, valuations))
    }

    /// Weekly update for the week that finished before today
    pub async fn run_update(&self) -> Result<UpdateOutcome> {
        self.run_update_for(Utc::now().date_naive()).await
    }

    pub async fn run_update_for(&self, today: NaiveDate) -> Result<UpdateOutcome> {
        let (current, season) = current_week(today);
        let (week, season) = target_week(current, season);
        info!(week, season, "🚀 Starting weekly update");

        let (ingested, valuations) = self.process_week(week, season).await?;
        let report = self.engine.generate_weekly_report(week, season).await?;
        let report_path = self.write_report(&report).await?;

        info!(week, season, valuations = valuations.len(), path = ?report_path, "✅ Weekly update complete");
        Ok(UpdateOutcome { week, season, ingested, valuations: valuations.len(), report_path })
    }

    /// Write `week_<w>_<s>_report.json` into the reports directory
    pub async fn write_report(&self, report: &WeeklyReport) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.reports_dir)
            .await
            .with_context(|| format!("Failed to create reports directory: {:?}", self.reports_dir))?;

        let path = self.reports_dir.join(format!("week_{}_{}_report.json", report.week, report.season));
        let body = serde_json::to_string_pretty(report)?;
        tokio::fs::write(&path, body)
            .await
            .with_context(|| format!("Failed to write report: {:?}", path))?;
        Ok(path)
    }

    /// Load and analyze the `weeks_back` weeks before the current one
    pub async fn backfill(&self, weeks_back: u32) -> BackfillSummary {
        self.backfill_from(Utc::now().date_naive(), weeks_back).await
    }

    /// A failing week is logged and skipped
    pub async fn backfill_from(&self, today: NaiveDate, weeks_back: u32) -> BackfillSummary {
        let (current, season) = current_week(today);
        let mut summary = BackfillSummary::default();

        for (week, season) in backfill_weeks(current, season, weeks_back) {
            match self.process_week(week, season).await {
                Ok((_, valuations)) => {
                    info!(week, season, valuations = valuations.len(), "Backfilled week");
                    summary.processed.push((week, season));
                }
                Err(e) => {
                    warn!(week, season, "Skipping week during backfill: {:#}", e);
                    summary.skipped.push((week, season));
                }
            }
        }

        summary
    }

    /// Run the weekly update at every configured slot (runs indefinitely)
    pub async fn run_schedule(&self) -> Result<()> {
        info!(slots = self.slots.len(), "Starting weekly update schedule");

        loop {
            let now = Utc::now();
            let next = next_run(now, &self.slots).ok_or_else(|| anyhow::anyhow!("No schedule slots configured"))?;
            let wait = (next - now).to_std().unwrap_or(Duration::from_secs(60));

            info!("Next weekly update scheduled for: {}", next);
            sleep(wait).await;

            match self.run_update().await {
                Ok(outcome) => info!("Weekly update completed: {:?}", outcome),
                Err(e) => error!("Weekly update failed: {:#}", e),
            }
        }
    }
}
