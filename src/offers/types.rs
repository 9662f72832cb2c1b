//! Offer catalog record types.

use rust_decimal::{Decimal, RoundingStrategy};
use strum::{Display, EnumString};

/// How hard an offer is to complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Difficulty {
    /// Simple single qualifying bet.
    Easy,
    /// Extra steps or restrictions.
    Medium,
    /// Wagering requirements or tight terms.
    Hard,
}

impl Difficulty {
    /// Sort rank: easy first, unknown alongside medium.
    pub fn rank(difficulty: Option<Difficulty>) -> u8 {
        match difficulty {
            Some(Difficulty::Easy) => 0,
            Some(Difficulty::Medium) | None => 1,
            Some(Difficulty::Hard) => 2,
        }
    }
}

/// Catalog offer, consumed read-only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OfferRecord {
    /// Bookmaker name as listed.
    pub bookmaker: String,
    /// Offer title.
    pub offer_name: String,
    /// Free bet value.
    pub offer_value: Option<Decimal>,
    /// Qualifying stake.
    pub required_stake: Option<Decimal>,
    /// Minimum odds for the qualifying bet.
    pub min_odds: Option<Decimal>,
    /// Whether the free bet returns its stake (SR) or not (SNR).
    pub is_stake_returned: bool,
    /// Wagering multiplier.
    pub wagering_requirement: Option<Decimal>,
    /// Parsed terms summary.
    pub terms_summary: Option<String>,
    /// Fingerprint of the terms the stored profit was computed from.
    pub terms_hash: Option<String>,
    /// Stored expected profit.
    pub expected_profit: Option<Decimal>,
    /// Manual priority (lower = higher priority).
    pub priority_rank: Option<u32>,
    /// Completion difficulty.
    pub difficulty: Option<Difficulty>,
}

impl OfferRecord {
    /// Free bet value per unit of qualifying stake, to 4 dp.
    ///
    /// Zero when either amount is missing or the stake is zero.
    pub fn value_index(&self) -> Decimal {
        let (Some(value), Some(stake)) = (self.offer_value, self.required_stake) else {
            return Decimal::ZERO;
        };
        value
            .checked_div(stake)
            .map(|index| index.round_dp_with_strategy(4, RoundingStrategy::MidpointAwayFromZero))
            .unwrap_or(Decimal::ZERO)
    }
}
