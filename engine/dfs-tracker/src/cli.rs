//! # Command Line Interface
//!
//! Runs the weekly job once, as a backfill or on its schedule, and queries the
//! stored valuations.

use crate::scheduler::TrackerScheduler;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

/// DFS tracker CLI
#[derive(Parser)]
#[command(name = "dfs-tracker")]
#[command(about = "Weekly fantasy football stat, salary and valuation tracker")]
pub struct Cli {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Keep everything in memory instead of PostgreSQL (nothing survives the run)
    #[arg(long)]
    pub memory: bool,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Ingest, analyze and report the most recently completed week
    Update,
    /// Ingest and analyze the weeks before the current one
    Backfill {
        /// Weeks to load (defaults to schedule.backfill_weeks)
        #[arg(long)]
        weeks: Option<u32>,
    },
    /// Run the weekly update on the configured schedule
    Schedule,
    /// Ingest and analyze a single week
    Analyze {
        #[arg(long)]
        week: i32,
        #[arg(long)]
        season: i32,
    },
    /// Print the weekly report (defaults to the latest stored week)
    Report {
        #[arg(long, requires = "season")]
        week: Option<i32>,
        #[arg(long, requires = "week")]
        season: Option<i32>,
        /// Maximum number of top performers
        #[arg(long)]
        limit: Option<usize>,
        /// Also write the report to the reports directory
        #[arg(long)]
        save: bool,
    },
    /// Salary/performance correlation for one player
    Correlation {
        player_id: String,
        /// Weeks of history to use (defaults to valuation.correlation.lookback_weeks)
        #[arg(long)]
        weeks: Option<u32>,
    },
    /// Stat and salary history for one player, with its correlation
    Player {
        player_id: String,
        /// Weeks of history to use (defaults to valuation.correlation.lookback_weeks)
        #[arg(long)]
        weeks: Option<u32>,
    },
    /// Salary trends over the trailing window
    Trends {
        /// Weeks to look back (defaults to valuation.trend.lookback_weeks)
        #[arg(long)]
        weeks: Option<u32>,
    },
}

/// CLI handler
pub struct CliHandler {
    scheduler: TrackerScheduler,
    backfill_weeks: u32,
}

impl CliHandler {
    pub fn new(scheduler: TrackerScheduler, backfill_weeks: u32) -> Self {
        Self { scheduler, backfill_weeks }
    }

    /// Handle CLI commands
    pub async fn handle_command(&self, command: Commands) -> Result<()> {
        match command {
            Commands::Update => self.update().await,
            Commands::Backfill { weeks } => self.backfill(weeks.unwrap_or(self.backfill_weeks)).await,
            Commands::Schedule => self.scheduler.run_schedule().await,
            Commands::Analyze { week, season } => self.analyze(week, season).await,
            Commands::Report { week, season, limit, save } => {
                let target = match week.zip(season) {
                    Some(target) => target,
                    None => self
                        .scheduler
                        .latest_week()
                        .await?
                        .context("No stats stored yet; pass --week and --season")?,
                };
                self.report(target, limit, save).await
            }
            Commands::Correlation { player_id, weeks } => {
                self.correlation(&player_id, self.correlation_weeks(weeks)).await
            }
            Commands::Player { player_id, weeks } => self.player(&player_id, self.correlation_weeks(weeks)).await,
            Commands::Trends { weeks } => self.trends(self.trend_weeks(weeks)).await,
        }
    }

    fn correlation_weeks(&self, weeks: Option<u32>) -> u32 {
        weeks.unwrap_or(self.scheduler.engine().config().correlation.lookback_weeks)
    }

    fn trend_weeks(&self, weeks: Option<u32>) -> u32 {
        weeks.unwrap_or(self.scheduler.engine().config().trend.lookback_weeks)
    }

    async fn update(&self) -> Result<()> {
        println!("🚀 Weekly Update");
        println!("{}", "=".repeat(50));

        let outcome = self.scheduler.run_update().await?;
        println!("Week:        {} ({})", outcome.week, outcome.season);
        println!("Stats:       {}", outcome.ingested.stats);
        println!("Salaries:    {}", outcome.ingested.salaries);
        println!("Valuations:  {}", outcome.valuations);
        println!("Report:      {}", outcome.report_path.display());
        Ok(())
    }

    async fn backfill(&self, weeks: u32) -> Result<()> {
        println!("⏪ Backfill (Last {} weeks)", weeks);
        println!("{}", "=".repeat(50));

        let summary = self.scheduler.backfill(weeks).await;
        for (week, season) in &summary.processed {
            println!("✅ Week {} ({})", week, season);
        }
        for (week, season) in &summary.skipped {
            println!("⚠️  Week {} ({}) skipped", week, season);
        }
        Ok(())
    }

    async fn analyze(&self, week: i32, season: i32) -> Result<()> {
        println!("🔍 Weekly Analysis (Week {} {})", week, season);
        println!("{}", "=".repeat(50));

        let (_, valuations) = self.scheduler.process_week(week, season).await?;
        print_json(&valuations)
    }

    async fn report(&self, (week, season): (i32, i32), limit: Option<usize>, save: bool) -> Result<()> {
        println!("📊 Weekly Report (Week {} {})", week, season);
        println!("{}", "=".repeat(50));

        let engine = self.scheduler.engine();
        let limit = limit.unwrap_or(engine.config().report.top_performer_limit);
        let report = engine.generate_weekly_report_with_limit(week, season, limit).await?;
        print_json(&report)?;

        if save {
            let path = self.scheduler.write_report(&report).await?;
            println!("Saved to {}", path.display());
        }
        Ok(())
    }

    async fn correlation(&self, player_id: &str, weeks: u32) -> Result<()> {
        println!("🔗 Salary/Performance Correlation: {} (Last {} weeks)", player_id, weeks);
        println!("{}", "=".repeat(50));

        match self.scheduler.engine().compute_correlation(player_id, weeks).await? {
            Some(correlation) => println!("{:.3}", correlation),
            None => println!("Not enough history"),
        }
        Ok(())
    }

    async fn player(&self, player_id: &str, weeks: u32) -> Result<()> {
        println!("👤 Player Analysis: {} (Last {} weeks)", player_id, weeks);
        println!("{}", "=".repeat(50));

        let analysis = self.scheduler.engine().player_analysis(player_id, weeks).await?;
        print_json(&analysis)
    }

    async fn trends(&self, weeks: u32) -> Result<()> {
        println!("📈 Salary Trends (Last {} weeks)", weeks);
        println!("{}", "=".repeat(50));

        let trends = self.scheduler.engine().identify_salary_trends(weeks).await?;
        if trends.is_empty() {
            println!("No players tracked long enough");
            return Ok(());
        }
        for trend in &trends {
            println!(
                "{:<24} {:>8} {:>4} weeks  {}",
                trend.player_name, trend.avg_salary_change, trend.weeks_tracked, trend.trend
            );
        }
        Ok(())
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
