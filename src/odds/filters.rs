//! Coarse event filters applied before pairing.

use rust_decimal::Decimal;

use super::types::EventOdds;

/// Keep events from the given league keys (e.g., "soccer_epl").
pub fn filter_by_league(events: &[EventOdds], allowed_keys: &[String]) -> Vec<EventOdds> {
    events
        .iter()
        .filter(|e| allowed_keys.iter().any(|k| k == &e.league_key))
        .cloned()
        .collect()
}

/// Keep events where at least one source prices at least one outcome
/// inside `[min_odds, max_odds]`.
pub fn filter_by_odds_range(
    events: &[EventOdds],
    min_odds: Decimal,
    max_odds: Decimal,
) -> Vec<EventOdds> {
    events
        .iter()
        .filter(|e| {
            e.quotes
                .iter()
                .flat_map(|q| q.prices())
                .any(|(_, price)| price >= min_odds && price <= max_odds)
        })
        .cloned()
        .collect()
}
