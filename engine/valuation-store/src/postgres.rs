use crate::config::DatabaseConfig;
use crate::error::{Result, StoreError};
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use tracing::{debug, info};
use valuation_engine::{
    AnalysisStore, IngestStore, MarketValue, PlayerWeek, SalaryAggregate, SalaryRecord, StatRecord,
    ValuationRecord,
};

const JOINED_COLUMNS: &str = r#"
    s.player_id, s.player_name, s.team, s.position, s.week, s.season, s.collected_at,
    s.snaps, s.snap_percentage, s.targets, s.receptions, s.receiving_yards, s.receiving_tds,
    s.carries, s.rushing_yards, s.rushing_tds, s.air_yards, s.yards_after_catch,
    s.red_zone_targets, s.target_share,
    d.player_id AS sal_player_id, d.player_name AS sal_player_name, d.collected_at AS sal_collected_at,
    d.draftkings_salary, d.fanduel_salary, d.dk_salary_change, d.fd_salary_change,
    d.dk_percent_change, d.fd_percent_change
"#;

const JOIN: &str = r#"
    FROM player_stats s
    LEFT JOIN dfs_salaries d
        ON d.player_id = s.player_id AND d.week = s.week AND d.season = s.season
"#;

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Connect a pool sized from the configuration
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.url)
            .await?;

        info!(max_connections = config.max_connections, "Connected to PostgreSQL");
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply embedded schema migrations
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    async fn load_week(&self, week: i32, season: i32) -> Result<Vec<PlayerWeek>> {
        let sql = format!("SELECT {JOINED_COLUMNS} {JOIN} WHERE s.week = $1 AND s.season = $2 ORDER BY s.player_id");
        let rows = sqlx::query(&sql).bind(week).bind(season).fetch_all(&self.pool).await?;
        rows.iter().map(player_week_from_row).collect()
    }

    async fn load_history(&self, player_id: &str, limit_weeks: u32) -> Result<Vec<PlayerWeek>> {
        let rows = sqlx::query(&history_sql(false))
            .bind(player_id)
            .bind(i64::from(limit_weeks))
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(player_week_from_row).collect()
    }

    async fn load_history_through(
        &self,
        player_id: &str,
        week: i32,
        season: i32,
        limit_weeks: u32,
    ) -> Result<Vec<PlayerWeek>> {
        let rows = sqlx::query(&history_sql(true))
            .bind(player_id)
            .bind(i64::from(limit_weeks))
            .bind(season)
            .bind(week)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(player_week_from_row).collect()
    }

    async fn load_salary_aggregates(&self, lookback_weeks: u32) -> Result<Vec<SalaryAggregate>> {
        let rows = sqlx::query(
            r#"
            SELECT player_id,
                   MAX(player_name) AS player_name,
                   AVG(dk_salary_change)::DOUBLE PRECISION AS avg_dk_change,
                   AVG(fd_salary_change)::DOUBLE PRECISION AS avg_fd_change,
                   COUNT(*) AS weeks_tracked
            FROM dfs_salaries
            WHERE week >= (SELECT MAX(week) FROM dfs_salaries)::BIGINT - $1
            GROUP BY player_id
            ORDER BY avg_dk_change DESC NULLS LAST, player_id
            "#,
        )
        .bind(i64::from(lookback_weeks))
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<SalaryAggregate> {
                Ok(SalaryAggregate {
                    player_id: row.try_get("player_id")?,
                    player_name: row.try_get::<Option<String>, _>("player_name")?.unwrap_or_default(),
                    avg_change_a: row.try_get("avg_dk_change")?,
                    avg_change_b: row.try_get("avg_fd_change")?,
                    weeks_tracked: weeks_tracked(row.try_get("weeks_tracked")?),
                })
            })
            .collect()
    }

    async fn write_valuation(&self, valuation: &ValuationRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO weekly_analysis (
                player_id, week, season, fantasy_points, usage_score, efficiency_score,
                market_value, salary_performance_correlation, analyzed_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW())
            ON CONFLICT (player_id, week, season) DO UPDATE SET
                fantasy_points = EXCLUDED.fantasy_points,
                usage_score = EXCLUDED.usage_score,
                efficiency_score = EXCLUDED.efficiency_score,
                market_value = EXCLUDED.market_value,
                salary_performance_correlation = EXCLUDED.salary_performance_correlation,
                analyzed_at = EXCLUDED.analyzed_at
            "#,
        )
        .bind(&valuation.player_id)
        .bind(valuation.week)
        .bind(valuation.season)
        .bind(valuation.fantasy_points)
        .bind(valuation.usage_score)
        .bind(valuation.efficiency_score)
        .bind(valuation.market_value.as_str())
        .bind(valuation.salary_performance_correlation)
        .execute(&self.pool)
        .await?;

        debug!(player_id = %valuation.player_id, week = valuation.week, season = valuation.season, "Upserted valuation");
        Ok(())
    }

    async fn load_valuations(&self, week: i32, season: i32) -> Result<Vec<ValuationRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT player_id, week, season, fantasy_points, usage_score, efficiency_score,
                   market_value, salary_performance_correlation
            FROM weekly_analysis
            WHERE week = $1 AND season = $2
            ORDER BY player_id
            "#,
        )
        .bind(week)
        .bind(season)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<ValuationRecord> {
                let label: String = row.try_get("market_value")?;
                Ok(ValuationRecord {
                    player_id: row.try_get("player_id")?,
                    week: row.try_get("week")?,
                    season: row.try_get("season")?,
                    fantasy_points: row.try_get("fantasy_points")?,
                    usage_score: row.try_get("usage_score")?,
                    efficiency_score: row.try_get("efficiency_score")?,
                    market_value: parse_market_value(&label)?,
                    salary_performance_correlation: row.try_get("salary_performance_correlation")?,
                })
            })
            .collect()
    }

    async fn write_stat_record(&self, stats: &StatRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO player_stats (
                player_id, player_name, team, position, week, season, collected_at,
                snaps, snap_percentage, targets, receptions, receiving_yards, receiving_tds,
                carries, rushing_yards, rushing_tds, air_yards, yards_after_catch,
                red_zone_targets, target_share
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20)
            ON CONFLICT (player_id, week, season) DO UPDATE SET
                player_name = EXCLUDED.player_name,
                team = EXCLUDED.team,
                position = EXCLUDED.position,
                collected_at = EXCLUDED.collected_at,
                snaps = EXCLUDED.snaps,
                snap_percentage = EXCLUDED.snap_percentage,
                targets = EXCLUDED.targets,
                receptions = EXCLUDED.receptions,
                receiving_yards = EXCLUDED.receiving_yards,
                receiving_tds = EXCLUDED.receiving_tds,
                carries = EXCLUDED.carries,
                rushing_yards = EXCLUDED.rushing_yards,
                rushing_tds = EXCLUDED.rushing_tds,
                air_yards = EXCLUDED.air_yards,
                yards_after_catch = EXCLUDED.yards_after_catch,
                red_zone_targets = EXCLUDED.red_zone_targets,
                target_share = EXCLUDED.target_share
            "#,
        )
        .bind(&stats.player_id)
        .bind(&stats.player_name)
        .bind(&stats.team)
        .bind(&stats.position)
        .bind(stats.week)
        .bind(stats.season)
        .bind(stats.collected_at)
        .bind(stats.snaps)
        .bind(stats.snap_percentage)
        .bind(stats.targets)
        .bind(stats.receptions)
        .bind(stats.receiving_yards)
        .bind(stats.receiving_tds)
        .bind(stats.carries)
        .bind(stats.rushing_yards)
        .bind(stats.rushing_tds)
        .bind(stats.air_yards)
        .bind(stats.yards_after_catch)
        .bind(stats.red_zone_targets)
        .bind(stats.target_share)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn write_salary_record(&self, salary: &SalaryRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO dfs_salaries (
                player_id, player_name, week, season, collected_at,
                draftkings_salary, fanduel_salary, dk_salary_change, fd_salary_change,
                dk_percent_change, fd_percent_change
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (player_id, week, season) DO UPDATE SET
                player_name = EXCLUDED.player_name,
                collected_at = EXCLUDED.collected_at,
                draftkings_salary = EXCLUDED.draftkings_salary,
                fanduel_salary = EXCLUDED.fanduel_salary,
                dk_salary_change = EXCLUDED.dk_salary_change,
                fd_salary_change = EXCLUDED.fd_salary_change,
                dk_percent_change = EXCLUDED.dk_percent_change,
                fd_percent_change = EXCLUDED.fd_percent_change
            "#,
        )
        .bind(&salary.player_id)
        .bind(&salary.player_name)
        .bind(salary.week)
        .bind(salary.season)
        .bind(salary.collected_at)
        .bind(salary.draftkings_salary)
        .bind(salary.fanduel_salary)
        .bind(salary.dk_salary_change)
        .bind(salary.fd_salary_change)
        .bind(salary.dk_percent_change)
        .bind(salary.fd_percent_change)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn load_latest_week(&self) -> Result<Option<(i32, i32)>> {
        let row = sqlx::query("SELECT week, season FROM player_stats ORDER BY season DESC, week DESC LIMIT 1")
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(Some((row.try_get("week")?, row.try_get("season")?))),
            None => Ok(None),
        }
    }
}

/// Player history, most recent first; `$1` player, `$2` limit, and when
/// bounded `$3`/`$4` the last (season, week) to include
fn history_sql(bounded: bool) -> String {
    let bound = if bounded { " AND (s.season, s.week) <= ($3, $4)" } else { "" };
    format!(
        "SELECT {JOINED_COLUMNS} {JOIN} WHERE s.player_id = $1{bound} ORDER BY s.season DESC, s.week DESC LIMIT $2"
    )
}

fn player_week_from_row(row: &PgRow) -> Result<PlayerWeek> {
    let stats = StatRecord {
        player_id: row.try_get("player_id")?,
        player_name: row.try_get("player_name")?,
        team: row.try_get("team")?,
        position: row.try_get("position")?,
        week: row.try_get("week")?,
        season: row.try_get("season")?,
        collected_at: row.try_get("collected_at")?,
        snaps: row.try_get("snaps")?,
        snap_percentage: row.try_get("snap_percentage")?,
        targets: row.try_get("targets")?,
        receptions: row.try_get("receptions")?,
        receiving_yards: row.try_get("receiving_yards")?,
        receiving_tds: row.try_get("receiving_tds")?,
        carries: row.try_get("carries")?,
        rushing_yards: row.try_get("rushing_yards")?,
        rushing_tds: row.try_get("rushing_tds")?,
        air_yards: row.try_get("air_yards")?,
        yards_after_catch: row.try_get("yards_after_catch")?,
        red_zone_targets: row.try_get("red_zone_targets")?,
        target_share: row.try_get("target_share")?,
    };

    // LEFT JOIN: a null salary key means no snapshot that week
    let salary = match row.try_get::<Option<String>, _>("sal_player_id")? {
        Some(player_id) => Some(SalaryRecord {
            player_id,
            player_name: row.try_get::<Option<String>, _>("sal_player_name")?.unwrap_or_default(),
            week: stats.week,
            season: stats.season,
            collected_at: row
                .try_get::<Option<DateTime<Utc>>, _>("sal_collected_at")?
                .unwrap_or(stats.collected_at),
            draftkings_salary: row.try_get("draftkings_salary")?,
            fanduel_salary: row.try_get("fanduel_salary")?,
            dk_salary_change: row.try_get("dk_salary_change")?,
            fd_salary_change: row.try_get("fd_salary_change")?,
            dk_percent_change: row.try_get("dk_percent_change")?,
            fd_percent_change: row.try_get("fd_percent_change")?,
        }),
        None => None,
    };

    Ok(PlayerWeek::new(stats, salary))
}

fn parse_market_value(label: &str) -> Result<MarketValue> {
    label.parse().map_err(StoreError::decode)
}

// COUNT(*) comes back as BIGINT
fn weeks_tracked(count: i64) -> u32 {
    u32::try_from(count.max(0)).unwrap_or(u32::MAX)
}

#[async_trait::async_trait]
impl AnalysisStore for PgStore {
    async fn fetch_stats_and_salaries(&self, week: i32, season: i32) -> valuation_engine::Result<Vec<PlayerWeek>> {
        Ok(self.load_week(week, season).await?)
    }

    async fn upsert_valuation(&self, valuation: &ValuationRecord) -> valuation_engine::Result<()> {
        Ok(self.write_valuation(valuation).await?)
    }

    async fn fetch_player_history(
        &self,
        player_id: &str,
        limit_weeks: u32,
    ) -> valuation_engine::Result<Vec<PlayerWeek>> {
        Ok(self.load_history(player_id, limit_weeks).await?)
    }

    async fn fetch_player_history_through(
        &self,
        player_id: &str,
        week: i32,
        season: i32,
        limit_weeks: u32,
    ) -> valuation_engine::Result<Vec<PlayerWeek>> {
        Ok(self.load_history_through(player_id, week, season, limit_weeks).await?)
    }

    async fn fetch_salary_history(&self, lookback_weeks: u32) -> valuation_engine::Result<Vec<SalaryAggregate>> {
        Ok(self.load_salary_aggregates(lookback_weeks).await?)
    }

    async fn fetch_valuations(&self, week: i32, season: i32) -> valuation_engine::Result<Vec<ValuationRecord>> {
        Ok(self.load_valuations(week, season).await?)
    }
}

#[async_trait::async_trait]
impl IngestStore for PgStore {
    async fn save_stat_record(&self, stats: &StatRecord) -> valuation_engine::Result<()> {
        Ok(self.write_stat_record(stats).await?)
    }

    async fn save_salary_record(&self, salary: &SalaryRecord) -> valuation_engine::Result<()> {
        Ok(self.write_salary_record(salary).await?)
    }

    async fn latest_week(&self) -> valuation_engine::Result<Option<(i32, i32)>> {
        Ok(self.load_latest_week().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_market_value_labels_parse() {
        assert_eq!(parse_market_value("undervalued").unwrap(), MarketValue::Undervalued);
        assert_eq!(parse_market_value("fair").unwrap(), MarketValue::Fair);
        assert!(matches!(parse_market_value("Fair"), Err(StoreError::Decode(_))));
    }

    #[test]
    fn test_labels_match_schema_check() {
        let migration = include_str!("../migrations/0001_create_dfs_tables.sql");
        for label in [MarketValue::Undervalued, MarketValue::Overvalued, MarketValue::Fair] {
            assert!(migration.contains(&format!("'{}'", label.as_str())));
        }
    }

    #[test]
    fn test_bounded_history_stops_at_the_analyzed_week() {
        let bounded = history_sql(true);
        assert!(bounded.contains("(s.season, s.week) <= ($3, $4)"));
        assert!(bounded.ends_with("LIMIT $2"));
        assert!(!history_sql(false).contains("$3"));
    }

    #[test]
    fn test_weeks_tracked_narrowing() {
        assert_eq!(weeks_tracked(3), 3);
        assert_eq!(weeks_tracked(-1), 0);
        assert_eq!(weeks_tracked(i64::MAX), u32::MAX);
    }
}
