use crate::classifier::ValueClassifier;
use crate::config::ValuationConfig;
use crate::correlation::CorrelationAnalyzer;
use crate::error::Result;
use crate::models::{PlayerAnalysis, PlayerWeek, SalaryAggregate, TrendRecord, ValuationRecord, WeeklyReport};
use crate::report::{summary_stats, top_performers};
use crate::scoring::ScoringFunctions;
use crate::store::AnalysisStore;
use crate::trend::TrendClassifier;
use chrono::Utc;
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{debug, info};

/// Weekly analysis orchestrator
///
/// Holds no state between calls beyond the injected store, so several engines
/// (different seasons, different configs) can share one store.
pub struct WeeklyAnalysisEngine {
    store: Arc<dyn AnalysisStore>,
    config: ValuationConfig,
    scoring: ScoringFunctions,
    classifier: ValueClassifier,
    correlation: CorrelationAnalyzer,
    trends: TrendClassifier,
}

impl WeeklyAnalysisEngine {
    pub fn new(store: Arc<dyn AnalysisStore>, config: ValuationConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            scoring: ScoringFunctions::new(config.scoring.clone(), config.usage.clone()),
            classifier: ValueClassifier::new(config.market_value.clone()),
            correlation: CorrelationAnalyzer::new(config.correlation.min_observations),
            trends: TrendClassifier::new(config.trend.clone()),
            store,
            config,
        })
    }

    pub fn config(&self) -> &ValuationConfig {
        &self.config
    }

    /// Score, classify and upsert one valuation per player with stats for the week.
    ///
    /// Players without a stat line get no record. A missing salary snapshot is
    /// a null input, not a failure. Output order follows the store.
    pub async fn analyze_weekly_performance(&self, week: i32, season: i32) -> Result<Vec<ValuationRecord>> {
        info!(week, season, "🔄 Analyzing weekly performance");

        let rows = self.store.fetch_stats_and_salaries(week, season).await?;
        let mut valuations = Vec::with_capacity(rows.len());

        for row in &rows {
            let mut valuation = self.value_player_week(row);

            if self.config.correlation.attach_to_valuations {
                valuation.salary_performance_correlation = self
                    .compute_correlation_through(
                        &valuation.player_id,
                        week,
                        season,
                        self.config.correlation.lookback_weeks,
                    )
                    .await?;
            }

            self.store.upsert_valuation(&valuation).await?;
            debug!(
                player_id = %valuation.player_id,
                fantasy_points = valuation.fantasy_points,
                market_value = %valuation.market_value,
                "Stored valuation"
            );
            valuations.push(valuation);
        }

        info!(week, season, players = valuations.len(), "✅ Weekly analysis complete");
        Ok(valuations)
    }

    fn value_player_week(&self, row: &PlayerWeek) -> ValuationRecord {
        let stats = &row.stats;
        let fantasy_points = self.scoring.fantasy_points(stats, self.scoring.default_system());
        let usage_score = self.scoring.usage_score(stats);
        let efficiency_score = self.scoring.efficiency_score(stats);

        let market_value = self.classifier.assess_market_value(
            fantasy_points,
            usage_score,
            efficiency_score,
            row.salary_change_a(),
            row.salary_change_b(),
        );

        ValuationRecord {
            player_id: stats.player_id.clone(),
            week: stats.week,
            season: stats.season,
            fantasy_points,
            usage_score,
            efficiency_score,
            market_value,
            salary_performance_correlation: None,
        }
    }

    /// Correlation between weekly fantasy points and average salary change over
    /// the player's most recent `lookback_weeks` weeks. `None` when history is
    /// too short or the series is flat.
    pub async fn compute_correlation(&self, player_id: &str, lookback_weeks: u32) -> Result<Option<f64>> {
        let history = self.store.fetch_player_history(player_id, lookback_weeks).await?;
        Ok(self.correlate_history(player_id, &history))
    }

    /// Same as [`compute_correlation`](Self::compute_correlation) but anchored
    /// at `(week, season)`: later weeks are ignored.
    pub async fn compute_correlation_through(
        &self,
        player_id: &str,
        week: i32,
        season: i32,
        lookback_weeks: u32,
    ) -> Result<Option<f64>> {
        let history = self
            .store
            .fetch_player_history_through(player_id, week, season, lookback_weeks)
            .await?;
        Ok(self.correlate_history(player_id, &history))
    }

    /// The player's recent weeks, most recent first, with their correlation
    pub async fn player_analysis(&self, player_id: &str, lookback_weeks: u32) -> Result<PlayerAnalysis> {
        let history = self.store.fetch_player_history(player_id, lookback_weeks).await?;
        let salary_performance_correlation = self.correlate_history(player_id, &history);

        Ok(PlayerAnalysis {
            player_id: player_id.to_string(),
            weeks: lookback_weeks,
            history,
            salary_performance_correlation,
        })
    }

    fn correlate_history(&self, player_id: &str, history: &[PlayerWeek]) -> Option<f64> {
        let pairs: Vec<(f64, f64)> = history
            .iter()
            .map(|week| {
                (
                    self.scoring.fantasy_points(&week.stats, self.scoring.default_system()),
                    week.avg_salary_change(),
                )
            })
            .collect();

        let correlation = self.correlation.correlate(&pairs);
        debug!(player_id, weeks = pairs.len(), ?correlation, "Computed salary/performance correlation");
        correlation
    }

    /// Salary trends over the trailing window, highest platform A average first.
    ///
    /// Players tracked for fewer than `trend.min_weeks_tracked` weeks are left out.
    pub async fn identify_salary_trends(&self, lookback_weeks: u32) -> Result<Vec<TrendRecord>> {
        let mut aggregates = self.store.fetch_salary_history(lookback_weeks).await?;
        aggregates.sort_by(compare_platform_a_desc);

        let trends = self.trends.classify_aggregates(&aggregates);
        info!(lookback_weeks, players = trends.len(), "📈 Identified salary trends");
        Ok(trends)
    }

    /// Weekly report with the configured top performer limit
    pub async fn generate_weekly_report(&self, week: i32, season: i32) -> Result<WeeklyReport> {
        self.generate_weekly_report_with_limit(week, season, self.config.report.top_performer_limit)
            .await
    }

    /// Weekly report over the valuations already stored for the week.
    ///
    /// Valuations are not recomputed; trends are.
    pub async fn generate_weekly_report_with_limit(
        &self,
        week: i32,
        season: i32,
        limit: usize,
    ) -> Result<WeeklyReport> {
        let valuations = self.store.fetch_valuations(week, season).await?;
        let salary_trends = self.identify_salary_trends(self.config.trend.lookback_weeks).await?;

        let report = WeeklyReport {
            week,
            season,
            generated_at: Utc::now(),
            top_performers: top_performers(&valuations, self.config.report.top_performer_min_points, limit),
            salary_trends,
            summary_stats: summary_stats(&valuations),
        };

        info!(
            week,
            season,
            top_performers = report.top_performers.len(),
            trends = report.salary_trends.len(),
            total_players = report.summary_stats.total_players,
            "📊 Generated weekly report"
        );
        Ok(report)
    }
}

// Unlisted platform A sorts last
fn compare_platform_a_desc(a: &SalaryAggregate, b: &SalaryAggregate) -> Ordering {
    match (a.avg_change_a, b.avg_change_a) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
    .then_with(|| a.player_id.cmp(&b.player_id))
}
