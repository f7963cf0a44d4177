//! NFL regular-season calendar arithmetic and weekly run slots

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc, Weekday};

/// Regular-season weeks per season
pub const SEASON_WEEKS: i32 = 18;

/// Season and week containing `today`.
///
/// Seasons start on September 1st; dates before September belong to the
/// previous year's season. The week is clamped to 1..=18.
pub fn current_week(today: NaiveDate) -> (i32, i32) {
    let season = if today.month() >= 9 { today.year() } else { today.year() - 1 };
    let Some(season_start) = NaiveDate::from_ymd_opt(season, 9, 1) else {
        return (1, season);
    };

    let days_since_start = (today - season_start).num_days();
    let week = (days_since_start / 7).clamp(1, i64::from(SEASON_WEEKS));
    (week as i32, season)
}

/// The most recently completed week: the one before `(week, season)`
pub fn target_week(week: i32, season: i32) -> (i32, i32) {
    if week <= 1 {
        (SEASON_WEEKS, season - 1)
    } else {
        (week - 1, season)
    }
}

/// The `weeks_back` weeks before `(week, season)`, most recent first.
///
/// Weeks before week 1 wrap into the end of the previous season; anything
/// further back than that season is dropped.
pub fn backfill_weeks(week: i32, season: i32, weeks_back: u32) -> Vec<(i32, i32)> {
    let weeks_back = i32::try_from(weeks_back).unwrap_or(i32::MAX);
    (1..=weeks_back)
        .map(|offset| week.saturating_sub(offset))
        .map(|target| if target < 1 { (SEASON_WEEKS + target, season - 1) } else { (target, season) })
        .take_while(|(week, _)| *week >= 1)
        .collect()
}

/// A weekly run time, in UTC
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleSlot {
    pub weekday: Weekday,
    pub time: NaiveTime,
}

impl ScheduleSlot {
    /// Parse a weekday name ("Tue", "tuesday") and an HH:MM time
    pub fn parse(weekday: &str, time: &str) -> anyhow::Result<Self> {
        let weekday = weekday
            .parse::<Weekday>()
            .map_err(|_| anyhow::anyhow!("Invalid weekday: {}", weekday))?;
        let time = NaiveTime::parse_from_str(time, "%H:%M")
            .map_err(|e| anyhow::anyhow!("Invalid time '{}': {}", time, e))?;
        Ok(Self { weekday, time })
    }

    /// First occurrence of this slot strictly after `now`
    pub fn next_after(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let days_ahead = (7 + self.weekday.num_days_from_monday() as i64
            - now.weekday().num_days_from_monday() as i64)
            % 7;
        let candidate = (now.date_naive() + Duration::days(days_ahead)).and_time(self.time).and_utc();

        if candidate > now {
            candidate
        } else {
            candidate + Duration::days(7)
        }
    }
}

/// Earliest upcoming run across all slots, `None` without slots
pub fn next_run(now: DateTime<Utc>, slots: &[ScheduleSlot]) -> Option<DateTime<Utc>> {
    slots.iter().map(|slot| slot.next_after(now)).min()
}
