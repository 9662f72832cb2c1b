//! Numeric primitives for a single back/lay pair.
//!
//! Every product and quotient is checked: odds and stakes that pass
//! validation can still be large enough to leave the `Decimal` range.

use rust_decimal::Decimal;

use crate::error::CalculationError;

/// Spread between back and lay odds as a percentage of the back odds.
///
/// Returns `None` when `back_odds` is not positive or the ratio overflows;
/// an undefined spread must never be treated as a usable number.
pub fn spread_percent(back_odds: Decimal, lay_odds: Decimal) -> Option<Decimal> {
    if back_odds <= Decimal::ZERO {
        return None;
    }
    let diff = lay_odds.checked_sub(back_odds)?.abs();
    diff.checked_div(back_odds)?
        .checked_mul(Decimal::ONE_HUNDRED)
}

/// `lay_odds - commission`, rejected when zero or negative.
fn lay_denominator(lay_odds: Decimal, commission: Decimal) -> Result<Decimal, CalculationError> {
    let denominator = lay_odds
        .checked_sub(commission)
        .ok_or(CalculationError::Overflow("lay denominator"))?;
    if denominator <= Decimal::ZERO {
        return Err(CalculationError::NonPositiveDenominator {
            lay_odds,
            commission,
        });
    }
    Ok(denominator)
}

/// Lay stake that balances a real-money back bet:
/// `(back_stake * back_odds) / (lay_odds - commission)`.
pub fn lay_stake_for_qualifying(
    back_stake: Decimal,
    back_odds: Decimal,
    lay_odds: Decimal,
    commission: Decimal,
) -> Result<Decimal, CalculationError> {
    let denominator = lay_denominator(lay_odds, commission)?;
    back_stake
        .checked_mul(back_odds)
        .and_then(|payout| payout.checked_div(denominator))
        .ok_or(CalculationError::Overflow("lay stake"))
}

/// Lay stake for a free bet.
///
/// Stake not returned: only the winnings `value * (back_odds - 1)` are
/// covered. Stake returned: the full payout `value * back_odds` is covered.
pub fn lay_stake_for_free_bet(
    free_bet_value: Decimal,
    back_odds: Decimal,
    lay_odds: Decimal,
    commission: Decimal,
    stake_returned: bool,
) -> Result<Decimal, CalculationError> {
    let denominator = lay_denominator(lay_odds, commission)?;
    let covered = if stake_returned {
        free_bet_value.checked_mul(back_odds)
    } else {
        back_odds
            .checked_sub(Decimal::ONE)
            .and_then(|winnings| free_bet_value.checked_mul(winnings))
    };
    covered
        .and_then(|covered| covered.checked_div(denominator))
        .ok_or(CalculationError::Overflow("lay stake"))
}

/// Exchange balance needed to place the lay: `lay_stake * (lay_odds - 1)`.
pub fn liability(lay_stake: Decimal, lay_odds: Decimal) -> Result<Decimal, CalculationError> {
    lay_odds
        .checked_sub(Decimal::ONE)
        .and_then(|net| lay_stake.checked_mul(net))
        .ok_or(CalculationError::Overflow("liability"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calculator::round_money;
    use rust_decimal_macros::dec;

    #[test]
    fn spread_is_zero_for_equal_odds() {
        for odds in [dec!(1.01), dec!(2.0), dec!(3.55), dec!(100)] {
            assert_eq!(spread_percent(odds, odds), Some(Decimal::ZERO));
        }
    }

    #[test]
    fn spread_is_symmetric_in_direction() {
        assert_eq!(spread_percent(dec!(2.0), dec!(2.1)), Some(dec!(5)));
        assert_eq!(spread_percent(dec!(2.0), dec!(1.9)), Some(dec!(5)));
    }

    #[test]
    fn spread_undefined_for_non_positive_back_odds() {
        assert_eq!(spread_percent(Decimal::ZERO, dec!(2.0)), None);
        assert_eq!(spread_percent(dec!(-1), dec!(2.0)), None);
    }

    #[test]
    fn qualifying_lay_stake_formula() {
        // (10 * 2.10) / (2.12 - 0.05) = 21 / 2.07
        let lay = lay_stake_for_qualifying(dec!(10), dec!(2.10), dec!(2.12), dec!(0.05)).unwrap();
        assert_eq!(round_money(lay), dec!(10.14));
    }

    #[test]
    fn free_bet_lay_stake_depends_on_stake_return() {
        let snr = lay_stake_for_free_bet(dec!(20), dec!(3.0), dec!(3.05), dec!(0.05), false).unwrap();
        let sr = lay_stake_for_free_bet(dec!(20), dec!(3.0), dec!(3.05), dec!(0.05), true).unwrap();

        // 40 / 3.0 and 60 / 3.0
        assert_eq!(round_money(snr), dec!(13.33));
        assert_eq!(sr, dec!(20));
    }

    #[test]
    fn lay_stake_rejects_non_positive_denominator() {
        let err = lay_stake_for_qualifying(dec!(10), dec!(2.0), dec!(0.05), dec!(0.05)).unwrap_err();
        assert_eq!(
            err,
            CalculationError::NonPositiveDenominator {
                lay_odds: dec!(0.05),
                commission: dec!(0.05),
            }
        );
        assert!(lay_stake_for_free_bet(dec!(10), dec!(2.0), dec!(0.01), dec!(0.05), false).is_err());
    }

    #[test]
    fn liability_increases_with_lay_stake() {
        let lay_odds = dec!(2.5);
        let mut previous = liability(Decimal::ZERO, lay_odds).unwrap();
        for stake in [dec!(0.01), dec!(1), dec!(10), dec!(250.5)] {
            let current = liability(stake, lay_odds).unwrap();
            assert!(current > previous);
            previous = current;
        }
    }

    #[test]
    fn extreme_prices_overflow_instead_of_panicking() {
        assert_eq!(spread_percent(dec!(1.5), Decimal::MAX), None);
        assert_eq!(spread_percent(dec!(0.5), Decimal::MAX), None);

        let huge_stake = Decimal::MAX / dec!(8);
        assert_eq!(
            lay_stake_for_qualifying(huge_stake, dec!(9.5), dec!(9.6), dec!(0.05)),
            Err(CalculationError::Overflow("lay stake"))
        );
        assert_eq!(
            lay_stake_for_free_bet(huge_stake, dec!(9.5), dec!(9.6), dec!(0.05), true),
            Err(CalculationError::Overflow("lay stake"))
        );
        assert_eq!(
            liability(huge_stake, dec!(9.6)),
            Err(CalculationError::Overflow("liability"))
        );
    }
}
