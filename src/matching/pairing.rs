//! Back/lay pairing across bookmakers and the exchange.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use time::OffsetDateTime;
use tracing::{debug, instrument};

use crate::calculator::spread_percent;
use crate::error::ValidationError;
use crate::odds::{EventOdds, OddsQuote, Outcome};

/// Which sources are exchanges, and which exchange takes the lay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExchangeKeys {
    /// Source key of the exchange used for lay prices.
    pub lay_exchange: String,
    /// Every source key that is an exchange (never used as a back source).
    pub exchanges: Vec<String>,
}

impl Default for ExchangeKeys {
    fn default() -> Self {
        Self {
            lay_exchange: "betfair_ex_uk".to_string(),
            exchanges: vec!["betfair_ex_uk".to_string(), "smarkets".to_string()],
        }
    }
}

impl ExchangeKeys {
    /// Whether a source is an exchange.
    pub fn is_exchange(&self, source_key: &str) -> bool {
        source_key == self.lay_exchange || self.exchanges.iter().any(|k| k == source_key)
    }
}

/// Bounds applied while pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairingFilter {
    /// Minimum acceptable back odds (inclusive).
    pub min_odds: Decimal,
    /// Maximum acceptable back odds (inclusive).
    pub max_odds: Decimal,
    /// Maximum acceptable spread percentage (inclusive).
    pub max_spread: Decimal,
    /// When set, events kicking off at or before this instant are skipped.
    pub as_of: Option<OffsetDateTime>,
}

impl Default for PairingFilter {
    fn default() -> Self {
        Self {
            min_odds: dec!(1.5),
            max_odds: dec!(5.0),
            max_spread: dec!(5.0),
            as_of: None,
        }
    }
}

impl PairingFilter {
    /// Reject inverted ranges, sub-evens bounds and negative spreads.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.min_odds <= Decimal::ONE || self.max_odds < self.min_odds {
            return Err(ValidationError::InvalidOddsRange {
                min: self.min_odds,
                max: self.max_odds,
            });
        }
        if self.max_spread < Decimal::ZERO {
            return Err(ValidationError::InvalidSpread(self.max_spread));
        }
        Ok(())
    }

    fn in_range(&self, odds: Decimal) -> bool {
        odds >= self.min_odds && odds <= self.max_odds
    }
}

/// Candidate back/lay opportunity on one event outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pairing {
    /// Event identifier.
    pub event_id: String,
    /// Home team name.
    pub home_team: String,
    /// Away team name.
    pub away_team: String,
    /// League display name.
    pub league: String,
    /// Scheduled kickoff.
    pub kickoff: OffsetDateTime,
    /// Outcome being backed.
    pub outcome: Outcome,
    /// Team name, or "Draw".
    pub outcome_name: String,
    /// Source key of the bookmaker taking the back bet.
    pub back_source: String,
    /// Display name of the bookmaker taking the back bet.
    pub back_bookmaker: String,
    /// Best in-range back price.
    pub back_odds: Decimal,
    /// Display name of the exchange taking the lay.
    pub lay_exchange: String,
    /// Exchange price for the same outcome.
    pub lay_odds: Decimal,
    /// Spread between back and lay odds.
    pub spread_percent: Decimal,
}

impl Pairing {
    /// "Home vs Away".
    pub fn display_name(&self) -> String {
        format!("{} vs {}", self.home_team, self.away_team)
    }
}

/// Highest in-range back price among non-exchange sources.
/// Equal prices keep the first source seen.
pub fn best_back_price<'a>(
    event: &'a EventOdds,
    outcome: Outcome,
    filter: &PairingFilter,
    exchanges: &ExchangeKeys,
) -> Option<(&'a OddsQuote, Decimal)> {
    let mut best: Option<(&OddsQuote, Decimal)> = None;

    for quote in event.quotes.iter().filter(|q| !exchanges.is_exchange(&q.source_key)) {
        let Some(price) = quote.price(outcome) else {
            continue;
        };
        if !filter.in_range(price) {
            continue;
        }
        if best.map_or(true, |(_, best_price)| price > best_price) {
            best = Some((quote, price));
        }
    }

    best
}

/// Lay exchange's quote and price for an outcome.
pub fn lay_price<'a>(
    event: &'a EventOdds,
    outcome: Outcome,
    exchanges: &ExchangeKeys,
) -> Option<(&'a OddsQuote, Decimal)> {
    let quote = event.quote(&exchanges.lay_exchange)?;
    quote.price(outcome).map(|price| (quote, price))
}

/// Enumerate back/lay pairings, tightest spread first.
///
/// Outcomes without an in-range back price or without an exchange price are
/// skipped, as are pairings wider than `filter.max_spread`.
#[instrument(skip_all, fields(events = events.len(), max_spread = %filter.max_spread))]
pub fn find_pairings(
    events: &[EventOdds],
    filter: &PairingFilter,
    exchanges: &ExchangeKeys,
) -> Vec<Pairing> {
    let mut pairings = Vec::new();

    for event in events {
        if let Some(as_of) = filter.as_of {
            if !event.is_actionable(as_of) {
                debug!(event = %event.event_id, "Skipping event past kickoff");
                continue;
            }
        }

        for outcome in Outcome::ALL {
            let Some((back_quote, back_odds)) = best_back_price(event, outcome, filter, exchanges)
            else {
                continue;
            };

            let Some((lay_quote, lay_odds)) = lay_price(event, outcome, exchanges) else {
                debug!(event = %event.event_id, %outcome, "No exchange price");
                continue;
            };

            let Some(spread) = spread_percent(back_odds, lay_odds) else {
                debug!(event = %event.event_id, %outcome, "Spread undefined");
                continue;
            };

            if spread > filter.max_spread {
                debug!(
                    event = %event.event_id,
                    %outcome,
                    spread = %spread,
                    "Spread too wide"
                );
                continue;
            }

            pairings.push(Pairing {
                event_id: event.event_id.clone(),
                home_team: event.home_team.clone(),
                away_team: event.away_team.clone(),
                league: event.league.clone(),
                kickoff: event.kickoff,
                outcome,
                outcome_name: event.outcome_name(outcome).to_string(),
                back_source: back_quote.source_key.clone(),
                back_bookmaker: back_quote.source_title.clone(),
                back_odds,
                lay_exchange: lay_quote.source_title.clone(),
                lay_odds,
                spread_percent: spread,
            });
        }
    }

    pairings.sort_by_key(|p| p.spread_percent);
    debug!(found = pairings.len(), "Pairings found");

    pairings
}
