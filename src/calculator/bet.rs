//! Outcome breakdowns for qualifying and free bets.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use strum::{Display, EnumString};

use super::round_money;
use super::spread::{lay_stake_for_free_bet, lay_stake_for_qualifying, liability, spread_percent};
use crate::error::{CalculationError, EngineError, ValidationError};

/// Maximum number of calculations accepted in one batch.
pub const MAX_BATCH_SIZE: usize = 20;

/// Promotional semantics of the back bet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Default)]
pub enum BetType {
    /// Real-money bet placed to unlock a promotion.
    #[default]
    #[strum(to_string = "qualifying", serialize = "QUALIFYING")]
    Qualifying,
    /// Free bet, stake not returned with winnings.
    #[strum(to_string = "free_bet_snr", serialize = "snr", serialize = "SNR")]
    FreeBetSnr,
    /// Free bet, stake returned with winnings.
    #[strum(to_string = "free_bet_sr", serialize = "sr", serialize = "SR")]
    FreeBetSr,
}

impl BetType {
    /// Whether the back stake is house money.
    pub fn is_free_bet(&self) -> bool {
        !matches!(self, BetType::Qualifying)
    }
}

/// Qualitative efficiency of a spread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString)]
pub enum Rating {
    /// Tightest band.
    Excellent,
    /// Second band.
    Good,
    /// Third band.
    Fair,
    /// Everything wider.
    Poor,
}

impl Rating {
    /// Step function of the spread percentage.
    ///
    /// Free bets tolerate wider spreads because their baseline profit is
    /// already positive.
    pub fn for_spread(spread: Decimal, bet_type: BetType) -> Self {
        let (excellent, good, fair) = if bet_type.is_free_bet() {
            (dec!(2.0), dec!(4.0), dec!(6.0))
        } else {
            (dec!(1.0), dec!(2.0), dec!(3.5))
        };

        if spread <= excellent {
            Rating::Excellent
        } else if spread <= good {
            Rating::Good
        } else if spread <= fair {
            Rating::Fair
        } else {
            Rating::Poor
        }
    }

    /// Rating of a free-bet retention percentage.
    pub fn for_retention(percent: Decimal) -> Self {
        if percent >= dec!(75) {
            Rating::Excellent
        } else if percent >= dec!(70) {
            Rating::Good
        } else if percent >= dec!(60) {
            Rating::Fair
        } else {
            Rating::Poor
        }
    }
}

/// Input to [`calculate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StakeRequest {
    /// Back odds at the bookmaker.
    pub back_odds: Decimal,
    /// Lay odds at the exchange.
    pub lay_odds: Decimal,
    /// Back stake (or free bet value).
    pub stake: Decimal,
    /// Promotional semantics.
    pub bet_type: BetType,
    /// Exchange commission (0.05 = 5%).
    pub commission: Decimal,
}

impl StakeRequest {
    /// Create a request. Call [`StakeRequest::validate`] before calculating.
    pub fn new(
        back_odds: Decimal,
        lay_odds: Decimal,
        stake: Decimal,
        bet_type: BetType,
        commission: Decimal,
    ) -> Self {
        Self {
            back_odds,
            lay_odds,
            stake,
            bet_type,
            commission,
        }
    }

    /// Reject structurally invalid input.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.back_odds <= Decimal::ONE {
            return Err(ValidationError::InvalidOdds {
                field: "back_odds",
                value: self.back_odds,
            });
        }
        if self.lay_odds <= Decimal::ONE {
            return Err(ValidationError::InvalidOdds {
                field: "lay_odds",
                value: self.lay_odds,
            });
        }
        if self.stake <= Decimal::ZERO {
            return Err(ValidationError::InvalidStake(self.stake));
        }
        validate_commission(self.commission)
    }
}

/// Commission must lie in [0, 1).
pub fn validate_commission(commission: Decimal) -> Result<(), ValidationError> {
    if commission < Decimal::ZERO || commission >= Decimal::ONE {
        return Err(ValidationError::InvalidCommission(commission));
    }
    Ok(())
}

/// Which side of the matched bet settles in the user's favour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Scenario {
    /// The backed outcome occurs: bookmaker pays, exchange liability is lost.
    #[strum(to_string = "back_wins")]
    BackWins,
    /// The backed outcome does not occur: the lay stake is kept net of commission.
    #[strum(to_string = "lay_wins")]
    LayWins,
}

/// Profit (negative = loss) in one scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutcomeProfit {
    /// The scenario.
    pub scenario: Scenario,
    /// Net profit across both legs.
    pub profit: Decimal,
}

/// Full breakdown of a matched bet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StakeResult {
    /// Policy that produced this result.
    pub bet_type: BetType,
    /// Amount to lay at the exchange.
    pub lay_stake: Decimal,
    /// Exchange balance at risk if the back bet wins.
    pub liability: Decimal,
    /// Back-wins then lay-wins.
    pub outcomes: [OutcomeProfit; 2],
    /// Minimum of the two outcomes.
    pub guaranteed_profit: Decimal,
    /// Mean of the two outcomes.
    pub expected_value: Decimal,
    /// Step rating of the spread.
    pub rating: Rating,
    /// Spread between back and lay odds.
    pub spread_percent: Decimal,
}

impl StakeResult {
    /// Profit if the backed outcome occurs.
    pub fn back_wins_profit(&self) -> Decimal {
        self.outcomes[0].profit
    }

    /// Profit if the backed outcome does not occur.
    pub fn lay_wins_profit(&self) -> Decimal {
        self.outcomes[1].profit
    }

    /// Guaranteed profit as a percentage of `stake`.
    pub fn retention_percent(&self, stake: Decimal) -> Option<Decimal> {
        self.guaranteed_profit
            .checked_div(stake)?
            .checked_mul(Decimal::ONE_HUNDRED)
    }

    /// Copy with money and spread rounded to 2 decimal places.
    pub fn rounded(&self) -> Self {
        Self {
            bet_type: self.bet_type,
            lay_stake: round_money(self.lay_stake),
            liability: round_money(self.liability),
            outcomes: self.outcomes.map(|o| OutcomeProfit {
                scenario: o.scenario,
                profit: round_money(o.profit),
            }),
            guaranteed_profit: round_money(self.guaranteed_profit),
            expected_value: round_money(self.expected_value),
            rating: self.rating,
            spread_percent: round_money(self.spread_percent),
        }
    }
}

/// Calculate lay stake, liability and outcome profits for a validated request.
///
/// | Policy     | Back wins                     | Lay wins                       |
/// |------------|-------------------------------|--------------------------------|
/// | Qualifying | `stake*(back-1) - liability`  | `lay_stake*(1-c) - stake`      |
/// | FreeBetSnr | `stake*(back-1) - liability`  | `lay_stake*(1-c)`              |
/// | FreeBetSr  | `stake*back - liability`      | `lay_stake*(1-c)`              |
///
/// Expected value weights both outcomes equally.
pub fn calculate(request: &StakeRequest) -> Result<StakeResult, CalculationError> {
    let StakeRequest {
        back_odds,
        lay_odds,
        stake,
        bet_type,
        commission,
    } = *request;

    let spread = spread_percent(back_odds, lay_odds)
        .ok_or(CalculationError::UndefinedSpread { back_odds })?;

    let lay_stake = match bet_type {
        BetType::Qualifying => lay_stake_for_qualifying(stake, back_odds, lay_odds, commission)?,
        BetType::FreeBetSnr => lay_stake_for_free_bet(stake, back_odds, lay_odds, commission, false)?,
        BetType::FreeBetSr => lay_stake_for_free_bet(stake, back_odds, lay_odds, commission, true)?,
    };
    let liability = liability(lay_stake, lay_odds)?;
    let (back_wins, lay_wins) =
        outcome_profits(bet_type, stake, back_odds, lay_stake, liability, commission)
            .ok_or(CalculationError::Overflow("outcome profit"))?;
    let expected_value = back_wins
        .checked_add(lay_wins)
        .ok_or(CalculationError::Overflow("expected value"))?
        / Decimal::TWO;

    Ok(StakeResult {
        bet_type,
        lay_stake,
        liability,
        outcomes: [
            OutcomeProfit {
                scenario: Scenario::BackWins,
                profit: back_wins,
            },
            OutcomeProfit {
                scenario: Scenario::LayWins,
                profit: lay_wins,
            },
        ],
        guaranteed_profit: back_wins.min(lay_wins),
        expected_value,
        rating: Rating::for_spread(spread, bet_type),
        spread_percent: spread,
    })
}

/// `(back wins, lay wins)` profits, `None` on overflow.
fn outcome_profits(
    bet_type: BetType,
    stake: Decimal,
    back_odds: Decimal,
    lay_stake: Decimal,
    liability: Decimal,
    commission: Decimal,
) -> Option<(Decimal, Decimal)> {
    let kept_from_exchange = lay_stake.checked_mul(Decimal::ONE.checked_sub(commission)?)?;
    let back_payout = match bet_type {
        BetType::FreeBetSr => stake.checked_mul(back_odds)?,
        BetType::Qualifying | BetType::FreeBetSnr => {
            stake.checked_mul(back_odds.checked_sub(Decimal::ONE)?)?
        }
    };
    let back_wins = back_payout.checked_sub(liability)?;
    let lay_wins = match bet_type {
        BetType::Qualifying => kept_from_exchange.checked_sub(stake)?,
        BetType::FreeBetSnr | BetType::FreeBetSr => kept_from_exchange,
    };
    Some((back_wins, lay_wins))
}

/// Results of several calculations compared side by side.
#[derive(Debug, Clone)]
pub struct BatchResult {
    /// One result per request, in request order.
    pub results: Vec<StakeResult>,
    /// Sum of guaranteed profits.
    pub total_guaranteed_profit: Decimal,
    /// Highest-profit free bet, or the cheapest qualifying bet when the
    /// batch holds no free bets.
    pub best: Option<StakeResult>,
}

/// Validate and calculate every request in a batch.
pub fn calculate_batch(requests: &[StakeRequest]) -> Result<BatchResult, EngineError> {
    if requests.is_empty() || requests.len() > MAX_BATCH_SIZE {
        return Err(ValidationError::BatchSize {
            len: requests.len(),
            max: MAX_BATCH_SIZE,
        }
        .into());
    }

    let results = requests
        .iter()
        .map(|request| -> Result<StakeResult, EngineError> {
            request.validate()?;
            Ok(calculate(request)?)
        })
        .collect::<Result<Vec<_>, _>>()?;

    let total_guaranteed_profit = results
        .iter()
        .try_fold(Decimal::ZERO, |total, r| total.checked_add(r.guaranteed_profit))
        .ok_or(CalculationError::Overflow("batch total"))?;

    let best = first_highest_profit(results.iter().filter(|r| r.bet_type.is_free_bet()))
        .or_else(|| first_highest_profit(results.iter()))
        .cloned();

    Ok(BatchResult {
        results,
        total_guaranteed_profit,
        best,
    })
}

/// Highest guaranteed profit; the earliest result wins a tie.
fn first_highest_profit<'a>(
    results: impl Iterator<Item = &'a StakeResult>,
) -> Option<&'a StakeResult> {
    results.fold(None, |best, r| match best {
        Some(b) if b.guaranteed_profit >= r.guaranteed_profit => Some(b),
        _ => Some(r),
    })
}

/// Share of a stake-not-returned free bet's face value that can be locked in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Retention {
    /// Guaranteed profit as a percentage of the free bet value.
    pub percent: Decimal,
    /// Guaranteed profit.
    pub guaranteed_profit: Decimal,
    /// Retention band.
    pub rating: Rating,
}

/// Retention of a stake-not-returned free bet.
pub fn retention_rate(
    free_bet_value: Decimal,
    back_odds: Decimal,
    lay_odds: Decimal,
    commission: Decimal,
) -> Result<Retention, EngineError> {
    let request = StakeRequest::new(
        back_odds,
        lay_odds,
        free_bet_value,
        BetType::FreeBetSnr,
        commission,
    );
    request.validate()?;
    let result = calculate(&request)?;
    let percent = result
        .retention_percent(free_bet_value)
        .ok_or(CalculationError::Overflow("retention"))?;

    Ok(Retention {
        percent,
        guaranteed_profit: result.guaranteed_profit,
        rating: Rating::for_retention(percent),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn request(back: Decimal, lay: Decimal, stake: Decimal, bet_type: BetType, c: Decimal) -> StakeRequest {
        StakeRequest::new(back, lay, stake, bet_type, c)
    }

    #[test]
    fn qualifying_bet_breakdown() {
        let result = calculate(&request(dec!(2.10), dec!(2.12), dec!(10), BetType::Qualifying, dec!(0.05)))
            .unwrap()
            .rounded();

        assert_eq!(result.lay_stake, dec!(10.14));
        assert_eq!(result.liability, dec!(11.36));
        assert_eq!(result.back_wins_profit(), dec!(-0.36));
        assert_eq!(result.lay_wins_profit(), dec!(-0.36));
        assert_eq!(result.guaranteed_profit, dec!(-0.36));
        assert_eq!(result.rating, Rating::Excellent);
        assert_eq!(result.spread_percent, dec!(0.95));
    }

    #[test]
    fn qualifying_is_balanced_with_equal_odds_and_no_commission() {
        for odds in [dec!(1.5), dec!(2.0), dec!(3.3), dec!(7.25)] {
            let result =
                calculate(&request(odds, odds, dec!(25), BetType::Qualifying, Decimal::ZERO)).unwrap();
            assert_eq!(result.back_wins_profit(), result.lay_wins_profit());
            assert_eq!(result.guaranteed_profit, Decimal::ZERO);
        }
    }

    #[test]
    fn qualifying_never_profits_when_lay_is_not_shorter() {
        let cases = [
            (dec!(2.0), dec!(2.0), dec!(0.05)),
            (dec!(2.0), dec!(2.02), dec!(0.02)),
            (dec!(4.5), dec!(4.8), dec!(0.05)),
            (dec!(1.3), dec!(1.31), Decimal::ZERO),
        ];
        for (back, lay, c) in cases {
            let result = calculate(&request(back, lay, dec!(10), BetType::Qualifying, c)).unwrap();
            assert!(result.guaranteed_profit <= Decimal::ZERO);
        }

        let tight = calculate(&request(dec!(2.0), dec!(2.01), dec!(10), BetType::Qualifying, dec!(0.02)))
            .unwrap();
        let wide = calculate(&request(dec!(2.0), dec!(2.2), dec!(10), BetType::Qualifying, dec!(0.02)))
            .unwrap();
        assert!(tight.guaranteed_profit > wide.guaranteed_profit);
    }

    #[test]
    fn free_bet_snr_retention_in_typical_band() {
        let result =
            calculate(&request(dec!(3.00), dec!(3.05), dec!(20), BetType::FreeBetSnr, dec!(0.05))).unwrap();

        assert!(result.guaranteed_profit > Decimal::ZERO);
        let retention = result.retention_percent(dec!(20)).unwrap();
        assert!(retention > dec!(50) && retention < dec!(85));
        assert_eq!(result.rounded().guaranteed_profit, dec!(12.67));
    }

    #[test]
    fn free_bet_snr_always_profits() {
        let cases = [
            (dec!(1.01), dec!(1.01), dec!(0.05)),
            (dec!(1.5), dec!(3.0), dec!(0.05)),
            (dec!(10.0), dec!(11.0), dec!(0.02)),
            (dec!(2.0), dec!(1.8), Decimal::ZERO),
            (dec!(2.0), dec!(2.0), dec!(0.99)),
        ];
        for (back, lay, c) in cases {
            let result = calculate(&request(back, lay, dec!(5), BetType::FreeBetSnr, c)).unwrap();
            assert!(
                result.guaranteed_profit > Decimal::ZERO,
                "back={back} lay={lay} c={c} profit={}",
                result.guaranteed_profit
            );
        }
    }

    #[test]
    fn free_bet_sr_covers_full_payout() {
        let result =
            calculate(&request(dec!(3.0), dec!(3.05), dec!(20), BetType::FreeBetSr, dec!(0.05))).unwrap();

        assert_eq!(result.lay_stake, dec!(20));
        assert_eq!(result.liability, dec!(41));
        assert_eq!(result.back_wins_profit(), dec!(19));
        assert_eq!(result.lay_wins_profit(), dec!(19));
        assert_eq!(result.expected_value, dec!(19));
    }

    #[test]
    fn rating_bands_differ_by_bet_type() {
        assert_eq!(Rating::for_spread(dec!(1.0), BetType::Qualifying), Rating::Excellent);
        assert_eq!(Rating::for_spread(dec!(1.5), BetType::Qualifying), Rating::Good);
        assert_eq!(Rating::for_spread(dec!(3.5), BetType::Qualifying), Rating::Fair);
        assert_eq!(Rating::for_spread(dec!(3.6), BetType::Qualifying), Rating::Poor);

        assert_eq!(Rating::for_spread(dec!(1.5), BetType::FreeBetSnr), Rating::Excellent);
        assert_eq!(Rating::for_spread(dec!(4.0), BetType::FreeBetSr), Rating::Good);
        assert_eq!(Rating::for_spread(dec!(6.0), BetType::FreeBetSnr), Rating::Fair);
        assert_eq!(Rating::for_spread(dec!(6.01), BetType::FreeBetSnr), Rating::Poor);
    }

    #[test]
    fn validate_rejects_bad_input() {
        let ok = request(dec!(2.0), dec!(2.1), dec!(10), BetType::Qualifying, dec!(0.05));
        assert!(ok.validate().is_ok());

        let bad_back = StakeRequest { back_odds: dec!(1.0), ..ok };
        assert_eq!(
            bad_back.validate(),
            Err(ValidationError::InvalidOdds {
                field: "back_odds",
                value: dec!(1.0)
            })
        );
        assert!(StakeRequest { lay_odds: dec!(0.9), ..ok }.validate().is_err());
        assert_eq!(
            StakeRequest { stake: Decimal::ZERO, ..ok }.validate(),
            Err(ValidationError::InvalidStake(Decimal::ZERO))
        );
        assert_eq!(
            StakeRequest { commission: Decimal::ONE, ..ok }.validate(),
            Err(ValidationError::InvalidCommission(Decimal::ONE))
        );
        assert!(StakeRequest { commission: dec!(-0.01), ..ok }.validate().is_err());
    }

    #[test]
    fn bet_type_parses_from_wire_names() {
        use std::str::FromStr;
        assert_eq!(BetType::from_str("qualifying").unwrap(), BetType::Qualifying);
        assert_eq!(BetType::from_str("free_bet_snr").unwrap(), BetType::FreeBetSnr);
        assert_eq!(BetType::from_str("sr").unwrap(), BetType::FreeBetSr);
        assert_eq!(BetType::FreeBetSr.to_string(), "free_bet_sr");
    }

    #[test]
    fn batch_prefers_best_free_bet() {
        let batch = calculate_batch(&[
            request(dec!(2.10), dec!(2.12), dec!(10), BetType::Qualifying, dec!(0.05)),
            request(dec!(2.10), dec!(2.12), dec!(10), BetType::FreeBetSnr, dec!(0.05)),
            request(dec!(4.00), dec!(4.10), dec!(10), BetType::FreeBetSnr, dec!(0.05)),
        ])
        .unwrap();

        assert_eq!(batch.results.len(), 3);
        let best = batch.best.unwrap();
        assert_eq!(best.bet_type, BetType::FreeBetSnr);
        assert_eq!(best.guaranteed_profit, batch.results[2].guaranteed_profit);

        let sum: Decimal = batch.results.iter().map(|r| r.guaranteed_profit).sum();
        assert_eq!(batch.total_guaranteed_profit, sum);
    }

    #[test]
    fn batch_of_qualifying_bets_picks_smallest_loss() {
        let batch = calculate_batch(&[
            request(dec!(2.0), dec!(2.2), dec!(10), BetType::Qualifying, dec!(0.05)),
            request(dec!(2.0), dec!(2.02), dec!(10), BetType::Qualifying, dec!(0.05)),
        ])
        .unwrap();

        assert_eq!(batch.best.unwrap(), batch.results[1]);
    }

    #[test]
    fn batch_size_is_bounded() {
        let one = request(dec!(2.0), dec!(2.02), dec!(10), BetType::Qualifying, dec!(0.05));
        assert!(matches!(
            calculate_batch(&[]),
            Err(EngineError::Validation(ValidationError::BatchSize { len: 0, .. }))
        ));
        assert!(calculate_batch(&vec![one; MAX_BATCH_SIZE + 1]).is_err());
        assert!(calculate_batch(&vec![one; MAX_BATCH_SIZE]).is_ok());
    }

    #[test]
    fn retention_rate_and_band() {
        let retention = retention_rate(dec!(50), dec!(3.0), dec!(3.05), dec!(0.05)).unwrap();

        assert_eq!(round_money(retention.percent), dec!(63.33));
        assert_eq!(retention.rating, Rating::Fair);
        assert!(retention_rate(Decimal::ZERO, dec!(3.0), dec!(3.05), dec!(0.05)).is_err());
    }

    #[test]
    fn batch_tie_keeps_first_free_bet() {
        // Both lock in exactly 19.
        let batch = calculate_batch(&[
            request(dec!(3.0), dec!(3.05), dec!(20), BetType::FreeBetSr, dec!(0.05)),
            request(dec!(2.0), dec!(2.0), dec!(38), BetType::FreeBetSnr, Decimal::ZERO),
        ])
        .unwrap();

        assert_eq!(batch.results[0].guaranteed_profit, batch.results[1].guaranteed_profit);
        assert_eq!(batch.best.unwrap().bet_type, BetType::FreeBetSr);
    }

    #[test]
    fn batch_tie_keeps_first_qualifying_bet() {
        let tight = request(dec!(2.0), dec!(2.02), dec!(10), BetType::Qualifying, dec!(0.05));
        let wide = StakeRequest { lay_odds: dec!(2.5), ..tight };
        let batch = calculate_batch(&[wide, tight, tight]).unwrap();

        assert!(std::ptr::eq(
            first_highest_profit(batch.results.iter()).unwrap(),
            &batch.results[1]
        ));
    }

    #[test]
    fn oversized_stake_is_an_overflow_error() {
        let stake = Decimal::from_i128_with_scale(10_i128.pow(28), 0);
        let huge = request(dec!(9.5), dec!(9.6), stake, BetType::Qualifying, dec!(0.05));
        assert!(huge.validate().is_ok());

        assert!(matches!(calculate(&huge), Err(CalculationError::Overflow(_))));
        assert!(matches!(
            calculate_batch(&[huge]),
            Err(EngineError::Calculation(CalculationError::Overflow(_)))
        ));
        assert!(matches!(
            retention_rate(stake, dec!(9.5), dec!(9.6), dec!(0.05)),
            Err(EngineError::Calculation(CalculationError::Overflow(_)))
        ));
    }

    #[test]
    fn batch_total_overflow_is_an_error() {
        // Each result fits; their sum does not.
        let stake = Decimal::MAX / dec!(4);
        let sr = request(dec!(2.0), dec!(2.0), stake, BetType::FreeBetSr, Decimal::ZERO);
        assert!(calculate(&sr).is_ok());

        assert!(matches!(
            calculate_batch(&[sr; 5]),
            Err(EngineError::Calculation(CalculationError::Overflow(_)))
        ));
    }
}
