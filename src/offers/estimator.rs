//! Deterministic expected-profit estimate for catalog offers.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sha2::{Digest, Sha256};
use tracing::debug;

use super::types::OfferRecord;
use crate::calculator::{calculate, round_money, BetType, StakeRequest};

/// Fallback estimator used when no terms-aware estimate is available.
///
/// Assumes a realistically achievable market: back at the offer's minimum
/// odds (floored at `min_back_odds`) or `default_back_odds`, lay
/// `assumed_spread` above the back price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OfferProfitEstimator {
    /// Exchange commission assumed for both legs.
    pub commission: Decimal,
    /// Lay price minus back price.
    pub assumed_spread: Decimal,
    /// Floor applied to an offer's minimum odds.
    pub min_back_odds: Decimal,
    /// Back odds used when the offer has no minimum.
    pub default_back_odds: Decimal,
}

impl Default for OfferProfitEstimator {
    fn default() -> Self {
        Self {
            commission: dec!(0.02),
            assumed_spread: dec!(0.02),
            min_back_odds: dec!(1.5),
            default_back_odds: dec!(2.0),
        }
    }
}

impl OfferProfitEstimator {
    /// Create an estimator with a custom commission.
    pub fn with_commission(commission: Decimal) -> Self {
        Self {
            commission,
            ..Self::default()
        }
    }

    /// Back odds assumed for an offer.
    pub fn back_odds_for(&self, offer: &OfferRecord) -> Decimal {
        offer
            .min_odds
            .map(|min| min.max(self.min_back_odds))
            .unwrap_or(self.default_back_odds)
    }

    /// Free bet profit minus qualifying loss, rounded to 2 decimal places.
    ///
    /// Returns `None` when the offer has no positive free bet value or no
    /// positive qualifying stake: such an offer is unknown, not worthless.
    pub fn estimate(&self, offer: &OfferRecord) -> Option<Decimal> {
        let value = offer.offer_value.filter(|v| *v > Decimal::ZERO)?;
        let stake = offer.required_stake.filter(|s| *s > Decimal::ZERO)?;

        let back_odds = self.back_odds_for(offer);
        let lay_odds = back_odds + self.assumed_spread;
        let free_bet_type = if offer.is_stake_returned {
            BetType::FreeBetSr
        } else {
            BetType::FreeBetSnr
        };

        let qualifying = StakeRequest::new(back_odds, lay_odds, stake, BetType::Qualifying, self.commission);
        let free_bet = StakeRequest::new(back_odds, lay_odds, value, free_bet_type, self.commission);

        let (qualifying, free_bet) = match (calculate(&qualifying), calculate(&free_bet)) {
            (Ok(q), Ok(f)) => (q, f),
            (Err(e), _) | (_, Err(e)) => {
                debug!(bookmaker = %offer.bookmaker, error = %e, "Offer estimate unavailable");
                return None;
            }
        };

        let profit = free_bet.guaranteed_profit - qualifying.guaranteed_profit.abs();
        Some(round_money(profit))
    }
}

/// Lowercase hex SHA-256 of an offer's terms summary.
/// Offers without a summary have no fingerprint.
pub fn terms_fingerprint(terms_summary: Option<&str>) -> Option<String> {
    let summary = terms_summary.filter(|s| !s.is_empty())?;
    Some(hex::encode(Sha256::digest(summary.as_bytes())))
}

/// Pick the profit figure to store for an offer.
///
/// A stored profit whose terms fingerprint is unchanged is kept. Otherwise an
/// external estimate wins, and the deterministic fallback only fills a gap:
/// it never replaces a stored figure.
pub fn resolve_expected_profit(
    offer: &OfferRecord,
    external_estimate: Option<Decimal>,
    estimator: &OfferProfitEstimator,
) -> Option<Decimal> {
    let current = terms_fingerprint(offer.terms_summary.as_deref());
    let terms_unchanged = current.is_some() && current == offer.terms_hash;

    if terms_unchanged && offer.expected_profit.is_some() {
        debug!(bookmaker = %offer.bookmaker, "Terms unchanged, keeping stored profit");
        return offer.expected_profit;
    }

    if external_estimate.is_some() {
        return external_estimate;
    }

    match offer.expected_profit {
        Some(stored) => Some(stored),
        None => estimator.estimate(offer),
    }
}
