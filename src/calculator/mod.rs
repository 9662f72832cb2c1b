//! Stake and profit calculations for matched bets.
//!
//! This module handles:
//! - Spread, lay stake and liability primitives
//! - Outcome breakdowns under qualifying and free-bet policies
//! - Batch comparison and free-bet retention
//! - Placement instructions for a bet or a whole offer

pub mod bet;
pub mod instructions;
pub mod spread;

use rust_decimal::{Decimal, RoundingStrategy};

pub use bet::{
    calculate, calculate_batch, retention_rate, validate_commission, BatchResult, BetType,
    OutcomeProfit, Rating, Retention, Scenario, StakeRequest, StakeResult, MAX_BATCH_SIZE,
};
pub use instructions::{
    free_bet_instructions, instructions_for, offer_instructions, qualifying_instructions,
    BetSelection, InstructionStep, Instructions, OfferInstructions, Platform, StepAction,
    SPREAD_WARNING_PERCENT,
};
pub use spread::{lay_stake_for_free_bet, lay_stake_for_qualifying, liability, spread_percent};

/// Round a money amount (or percentage) to 2 decimal places.
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}
