//! # Report Assembly
//!
//! Pure aggregation over already-computed valuations. Nothing here touches the
//! store.

use crate::models::{MarketValue, SummaryStats, ValuationRecord};
use crate::scoring::round_to;
use std::cmp::Ordering;

/// Valuations strictly above `min_points`, highest scoring first, capped at `limit`.
///
/// Equal scores are ordered by player id so the list is stable across runs.
pub fn top_performers(valuations: &[ValuationRecord], min_points: f64, limit: usize) -> Vec<ValuationRecord> {
    let mut performers: Vec<ValuationRecord> = valuations
        .iter()
        .filter(|v| v.fantasy_points > min_points)
        .cloned()
        .collect();

    performers.sort_by(|a, b| {
        b.fantasy_points
            .partial_cmp(&a.fantasy_points)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.player_id.cmp(&b.player_id))
    });
    performers.truncate(limit);
    performers
}

/// Player count, mean points and usage (2 decimals) and label counts for one week
pub fn summary_stats(valuations: &[ValuationRecord]) -> SummaryStats {
    if valuations.is_empty() {
        return SummaryStats::default();
    }

    let total = valuations.len();
    let points: f64 = valuations.iter().map(|v| v.fantasy_points).sum();
    let usage: f64 = valuations.iter().map(|v| v.usage_score).sum();
    let count_label = |label: MarketValue| valuations.iter().filter(|v| v.market_value == label).count();

    SummaryStats {
        total_players: total,
        avg_fantasy_points: round_to(points / total as f64, 2),
        avg_usage_score: round_to(usage / total as f64, 2),
        undervalued_count: count_label(MarketValue::Undervalued),
        overvalued_count: count_label(MarketValue::Overvalued),
    }
}
