//! Match-quality scoring and recommendation ranking.

use std::time::Instant;

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use tracing::{info, instrument, warn};

use super::pairing::Pairing;
use crate::calculator::{
    calculate, round_money, validate_commission, BetType, StakeRequest, StakeResult,
};
use crate::error::ValidationError;

// === Score weights ===
// No derivation is recorded for these values; they are kept tunable.

/// Weight of the spread component.
pub const SPREAD_WEIGHT: Decimal = dec!(0.4);
/// Weight of the odds component.
pub const ODDS_WEIGHT: Decimal = dec!(0.3);
/// Weight of the league component.
pub const LEAGUE_WEIGHT: Decimal = dec!(0.3);
/// Points lost per percentage point of spread (0 at a 5% spread).
pub const SPREAD_DECAY: Decimal = dec!(2);
/// Points lost per unit of distance from the target odds.
pub const TARGET_ODDS_DECAY: Decimal = dec!(2);
/// Component ceiling.
pub const MAX_COMPONENT_SCORE: Decimal = dec!(10);

/// Weights and bands used to score a pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankingWeights {
    /// Weight of the spread component.
    pub spread: Decimal,
    /// Weight of the odds component.
    pub odds: Decimal,
    /// Weight of the league component.
    pub league: Decimal,
    /// Spread decay per percentage point.
    pub spread_decay: Decimal,
    /// Odds decay per unit away from the target.
    pub target_decay: Decimal,
    /// Inclusive odds band scoring `sweet_score`.
    pub sweet_band: (Decimal, Decimal),
    /// Score inside the sweet band.
    pub sweet_score: Decimal,
    /// Outer bounds of the shoulder band (sweet band excluded).
    pub shoulder_band: (Decimal, Decimal),
    /// Score inside the shoulder band.
    pub shoulder_score: Decimal,
    /// Score for any other odds.
    pub fallback_score: Decimal,
}

impl Default for RankingWeights {
    fn default() -> Self {
        Self {
            spread: SPREAD_WEIGHT,
            odds: ODDS_WEIGHT,
            league: LEAGUE_WEIGHT,
            spread_decay: SPREAD_DECAY,
            target_decay: TARGET_ODDS_DECAY,
            sweet_band: (dec!(2.0), dec!(3.5)),
            sweet_score: dec!(10),
            shoulder_band: (dec!(1.5), dec!(5.0)),
            shoulder_score: dec!(7),
            fallback_score: dec!(4),
        }
    }
}

impl RankingWeights {
    /// `max(0, 10 - spread * decay)`.
    pub fn spread_score(&self, spread_percent: Decimal) -> Decimal {
        MAX_COMPONENT_SCORE
            .saturating_sub(spread_percent.saturating_mul(self.spread_decay))
            .max(Decimal::ZERO)
    }

    /// Proximity to `target_odds` when given, otherwise the band score.
    pub fn odds_score(&self, back_odds: Decimal, target_odds: Option<Decimal>) -> Decimal {
        if let Some(target) = target_odds {
            let distance = back_odds.saturating_sub(target).abs();
            return MAX_COMPONENT_SCORE
                .saturating_sub(distance.saturating_mul(self.target_decay))
                .max(Decimal::ZERO);
        }

        let (sweet_low, sweet_high) = self.sweet_band;
        let (shoulder_low, shoulder_high) = self.shoulder_band;
        if back_odds >= sweet_low && back_odds <= sweet_high {
            self.sweet_score
        } else if back_odds >= shoulder_low && back_odds <= shoulder_high {
            self.shoulder_score
        } else {
            self.fallback_score
        }
    }
}

/// Ordered league-name to quality-weight table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeagueTable {
    entries: Vec<(String, Decimal)>,
    default_weight: Decimal,
}

impl Default for LeagueTable {
    fn default() -> Self {
        Self::new(
            [
                ("English Premier League", dec!(10)),
                ("EPL", dec!(10)),
                ("Premier League", dec!(10)),
                ("Champions League", dec!(10)),
                ("UEFA Champions League", dec!(10)),
                ("La Liga", dec!(9)),
                ("Bundesliga", dec!(9)),
                ("Serie A", dec!(9)),
                ("Ligue 1", dec!(8)),
            ]
            .into_iter()
            .map(|(name, weight)| (name.to_string(), weight))
            .collect(),
            dec!(6),
        )
    }
}

impl LeagueTable {
    /// Create a table. Unlisted leagues score `default_weight`.
    pub fn new(entries: Vec<(String, Decimal)>, default_weight: Decimal) -> Self {
        Self {
            entries,
            default_weight,
        }
    }

    /// Weight of a league; the first matching entry wins.
    pub fn weight(&self, league: &str) -> Decimal {
        self.entries
            .iter()
            .find(|(name, _)| name == league)
            .map(|(_, weight)| *weight)
            .unwrap_or(self.default_weight)
    }
}

/// Everything the ranker needs besides the pairings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankingPolicy {
    /// Component weights and odds bands.
    pub weights: RankingWeights,
    /// League quality table.
    pub leagues: LeagueTable,
}

/// Caller-supplied ranking parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankRequest {
    /// Qualifying back stake.
    pub stake: Decimal,
    /// Free bet value; defaults to `stake`.
    pub free_bet_value: Option<Decimal>,
    /// Offer minimum odds to aim for.
    pub target_odds: Option<Decimal>,
    /// Maximum recommendations returned.
    pub limit: usize,
    /// Exchange commission.
    pub commission: Decimal,
}

impl RankRequest {
    /// Reject non-positive amounts, a zero limit and bad commission.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.stake <= Decimal::ZERO {
            return Err(ValidationError::InvalidStake(self.stake));
        }
        if let Some(value) = self.free_bet_value {
            if value <= Decimal::ZERO {
                return Err(ValidationError::InvalidStake(value));
            }
        }
        if self.limit == 0 {
            return Err(ValidationError::InvalidLimit);
        }
        validate_commission(self.commission)
    }

    /// Free bet value used for the free-bet leg.
    pub fn effective_free_bet_value(&self) -> Decimal {
        self.free_bet_value.unwrap_or(self.stake)
    }
}

/// A pairing with its score and both legs of the offer economics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recommendation {
    /// The underlying pairing.
    pub pairing: Pairing,
    /// Match quality, 0 to 10, one decimal place.
    pub score: Decimal,
    /// Qualifying stake used.
    pub stake: Decimal,
    /// Free bet value used.
    pub free_bet_value: Decimal,
    /// Qualifying bet at `stake`.
    pub qualifying: StakeResult,
    /// Stake-not-returned free bet at `free_bet_value`.
    pub free_bet: StakeResult,
}

impl Recommendation {
    /// Lay stake of the qualifying bet.
    pub fn lay_stake(&self) -> Decimal {
        self.qualifying.lay_stake
    }

    /// Liability of the qualifying bet.
    pub fn liability(&self) -> Decimal {
        self.qualifying.liability
    }

    /// Cost of the qualifying bet (positive = loss).
    pub fn qualifying_loss(&self) -> Decimal {
        -self.qualifying.guaranteed_profit
    }

    /// Guaranteed profit of the free bet.
    pub fn free_bet_profit(&self) -> Decimal {
        self.free_bet.guaranteed_profit
    }
}

/// Weighted 0-10 match-quality score, rounded half away from zero to one
/// decimal place.
///
/// The spread component uses the spread at its displayed 2 dp precision.
pub fn score_pairing(
    pairing: &Pairing,
    target_odds: Option<Decimal>,
    policy: &RankingPolicy,
) -> Decimal {
    let weights = &policy.weights;
    let spread_score = weights.spread_score(round_money(pairing.spread_percent));
    let odds_score = weights.odds_score(pairing.back_odds, target_odds);
    let league_score = policy.leagues.weight(&pairing.league);

    (spread_score * weights.spread + odds_score * weights.odds + league_score * weights.league)
        .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
}

/// Score every pairing, attach qualifying and free-bet figures, and return
/// the best `limit`, highest score first.
///
/// Pairings whose calculation is undefined are dropped with a warning.
#[instrument(skip_all, fields(pairings = pairings.len(), limit = request.limit))]
pub fn rank(
    pairings: &[Pairing],
    request: &RankRequest,
    policy: &RankingPolicy,
) -> Result<Vec<Recommendation>, ValidationError> {
    if pairings.is_empty() {
        return Err(ValidationError::EmptyPairings);
    }
    request.validate()?;

    let start = Instant::now();
    let free_bet_value = request.effective_free_bet_value();
    let mut recommendations = Vec::with_capacity(pairings.len());

    for pairing in pairings {
        let qualifying = StakeRequest::new(
            pairing.back_odds,
            pairing.lay_odds,
            request.stake,
            BetType::Qualifying,
            request.commission,
        );
        let free_bet = StakeRequest {
            stake: free_bet_value,
            bet_type: BetType::FreeBetSnr,
            ..qualifying
        };

        let (qualifying, free_bet) = match (calculate(&qualifying), calculate(&free_bet)) {
            (Ok(q), Ok(f)) => (q, f),
            (Err(e), _) | (_, Err(e)) => {
                warn!(
                    event = %pairing.event_id,
                    outcome = %pairing.outcome,
                    error = %e,
                    "Dropping unusable pairing"
                );
                continue;
            }
        };

        recommendations.push(Recommendation {
            score: score_pairing(pairing, request.target_odds, policy),
            pairing: pairing.clone(),
            stake: request.stake,
            free_bet_value,
            qualifying,
            free_bet,
        });
    }

    recommendations.sort_by(|a, b| b.score.cmp(&a.score));
    recommendations.truncate(request.limit);

    info!(
        returned = recommendations.len(),
        top_score = %recommendations.first().map(|r| r.score).unwrap_or_default(),
        elapsed_us = start.elapsed().as_micros() as u64,
        "Recommendations ranked"
    );

    Ok(recommendations)
}
