//! Step-by-step placement instructions for a matched bet or a whole offer.
//!
//! Instructions are derived from [`calculate`] results only; nothing here
//! places bets or talks to a bookmaker.

use std::fmt;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use strum::Display;

use super::bet::{calculate, BetType, StakeRequest, StakeResult};
use super::round_money;
use crate::error::{CalculationError, EngineError};
use crate::odds::Outcome;

/// Qualifying spreads above this percentage draw a warning.
pub const SPREAD_WARNING_PERCENT: Decimal = dec!(3);

const BANNER: &str = "============================================================";

/// The market and venues an instruction set refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BetSelection {
    /// Home team name.
    pub home_team: String,
    /// Away team name.
    pub away_team: String,
    /// Outcome being backed.
    pub outcome: Outcome,
    /// Bookmaker taking the back bet.
    pub bookmaker: String,
    /// Exchange taking the lay bet.
    pub exchange: String,
    /// Back odds at the bookmaker.
    pub back_odds: Decimal,
    /// Lay odds at the exchange.
    pub lay_odds: Decimal,
    /// Exchange commission.
    pub commission: Decimal,
    /// Offer title, when the bet belongs to a promotion.
    pub offer_name: Option<String>,
    /// Minimum back odds the offer terms demand.
    pub min_odds_required: Option<Decimal>,
}

impl BetSelection {
    /// "Home vs Away".
    pub fn match_name(&self) -> String {
        format!("{} vs {}", self.home_team, self.away_team)
    }

    /// Team name for a win, "Draw" otherwise.
    pub fn outcome_name(&self) -> &str {
        match self.outcome {
            Outcome::Home => &self.home_team,
            Outcome::Draw => "Draw",
            Outcome::Away => &self.away_team,
        }
    }

    fn below_min_odds(&self) -> Option<Decimal> {
        self.min_odds_required.filter(|min| self.back_odds < *min)
    }

    fn stake_request(&self, stake: Decimal, bet_type: BetType) -> StakeRequest {
        StakeRequest::new(self.back_odds, self.lay_odds, stake, bet_type, self.commission)
    }
}

/// What a step asks the user to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum StepAction {
    /// Real-money back bet.
    #[strum(to_string = "Place BACK bet")]
    PlaceBack,
    /// Back bet paid with the free bet token.
    #[strum(to_string = "Use FREE BET")]
    UseFreeBet,
    /// Lay bet at the exchange.
    #[strum(to_string = "Place LAY bet")]
    PlaceLay,
    /// Check both legs are matched.
    #[strum(to_string = "Confirm both bets are matched")]
    ConfirmMatched,
    /// Nothing left to do.
    #[strum(to_string = "Wait for result")]
    AwaitResult,
}

/// Where a step is carried out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Platform {
    /// A named bookmaker.
    Bookmaker(String),
    /// A named exchange.
    Exchange(String),
    /// Bookmaker and exchange.
    Both,
    /// No platform involved.
    Neither,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Platform::Bookmaker(name) | Platform::Exchange(name) => f.write_str(name),
            Platform::Both => f.write_str("Both"),
            Platform::Neither => f.write_str("N/A"),
        }
    }
}

/// One numbered step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionStep {
    /// 1-based position.
    pub number: u8,
    /// What to do.
    pub action: StepAction,
    /// Where to do it.
    pub platform: Platform,
    /// Human-readable detail with the amounts involved.
    pub details: String,
    /// Caveat attached to this step.
    pub warning: Option<String>,
}

/// Instructions for one matched bet. Amounts are rounded to 2 dp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instructions {
    /// Short heading.
    pub title: String,
    /// One-line summary of both legs.
    pub summary: String,
    /// Policy the figures were computed under.
    pub bet_type: BetType,
    /// Match the bet is placed on.
    pub match_name: String,
    /// Offer title, if any.
    pub offer_name: Option<String>,
    /// Ordered steps.
    pub steps: Vec<InstructionStep>,
    /// Back stake or free bet value.
    pub stake: Decimal,
    /// Lay stake.
    pub lay_stake: Decimal,
    /// Exchange liability.
    pub liability: Decimal,
    /// Guaranteed profit (negative = qualifying loss).
    pub expected_result: Decimal,
    /// `expected_result` in words.
    pub result_description: String,
    /// Problems the user should fix or accept before placing.
    pub warnings: Vec<String>,
    /// General advice.
    pub tips: Vec<String>,
}

/// Instructions for a qualifying bet followed by its free bet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfferInstructions {
    /// Offer title.
    pub offer_name: String,
    /// Selection both bets are placed on.
    pub selection: BetSelection,
    /// Part 1.
    pub qualifying: Instructions,
    /// Part 2.
    pub free_bet: Instructions,
    /// Qualifying bet result (normally negative).
    pub total_qualifying_loss: Decimal,
    /// Free bet result.
    pub total_free_bet_profit: Decimal,
    /// Sum of both parts.
    pub total_profit: Decimal,
    /// Largest single liability; each is released once its bet settles.
    pub exchange_funds_needed: Decimal,
    /// `total_profit` in words.
    pub profit_summary: String,
}

fn money(value: Decimal) -> String {
    format!("{:.2}", round_money(value))
}

fn signed_money(value: Decimal) -> String {
    let rounded = round_money(value);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("{rounded:.2}")
    } else {
        format!("+{:.2}", rounded.abs())
    }
}

fn min_odds_warning(selection: &BetSelection) -> Option<String> {
    selection.below_min_odds().map(|min| {
        format!(
            "Back odds {} are below the minimum required {}",
            selection.back_odds, min
        )
    })
}

fn lay_step(selection: &BetSelection, result: &StakeResult) -> InstructionStep {
    InstructionStep {
        number: 2,
        action: StepAction::PlaceLay,
        platform: Platform::Exchange(selection.exchange.clone()),
        details: format!(
            "Lay {} for {} @ {}",
            selection.outcome_name(),
            money(result.lay_stake),
            selection.lay_odds
        ),
        warning: Some(format!("Your liability will be {}", money(result.liability))),
    }
}

fn confirm_step() -> InstructionStep {
    InstructionStep {
        number: 3,
        action: StepAction::ConfirmMatched,
        platform: Platform::Both,
        details: "Check that both bets show as matched or placed".to_string(),
        warning: None,
    }
}

/// Instructions for a real-money qualifying bet of `stake`.
///
/// Warns when the back odds miss the offer minimum or the spread exceeds
/// [`SPREAD_WARNING_PERCENT`].
pub fn qualifying_instructions(
    selection: &BetSelection,
    stake: Decimal,
) -> Result<Instructions, EngineError> {
    let request = selection.stake_request(stake, BetType::Qualifying);
    request.validate()?;
    let result = calculate(&request)?.rounded();
    let outcome = selection.outcome_name();

    let steps = vec![
        InstructionStep {
            number: 1,
            action: StepAction::PlaceBack,
            platform: Platform::Bookmaker(selection.bookmaker.clone()),
            details: format!("Bet {} on {} to win @ {}", money(stake), outcome, selection.back_odds),
            warning: selection
                .min_odds_required
                .map(|min| format!("Make sure odds are at least {min}")),
        },
        lay_step(selection, &result),
        confirm_step(),
    ];

    let mut warnings: Vec<String> = min_odds_warning(selection).into_iter().collect();
    if result.spread_percent > SPREAD_WARNING_PERCENT {
        warnings.push(format!(
            "Spread is {}%, consider finding tighter odds",
            result.spread_percent
        ));
    }

    let result_description = if result.guaranteed_profit < Decimal::ZERO {
        format!("Qualifying loss of {}", money(result.guaranteed_profit.abs()))
    } else {
        format!("Profit of {}", money(result.guaranteed_profit))
    };

    Ok(Instructions {
        title: format!("Qualifying Bet: {}", selection.match_name()),
        summary: format!(
            "Back {} @ {}, Lay @ {}",
            outcome, selection.bookmaker, selection.exchange
        ),
        bet_type: BetType::Qualifying,
        match_name: selection.match_name(),
        offer_name: selection.offer_name.clone(),
        steps,
        stake,
        lay_stake: result.lay_stake,
        liability: result.liability,
        expected_result: result.guaranteed_profit,
        result_description,
        warnings,
        tips: vec![
            "Place the back bet first, then immediately place the lay bet".to_string(),
            "If odds move significantly, recalculate before placing the lay bet".to_string(),
            format!(
                "You need {} available in your {} account",
                money(result.liability),
                selection.exchange
            ),
        ],
    })
}

/// Instructions for a free bet of `value`.
///
/// `bet_type` picks the stake-returned or stake-not-returned policy; a
/// qualifying type is treated as stake not returned.
pub fn free_bet_instructions(
    selection: &BetSelection,
    value: Decimal,
    bet_type: BetType,
) -> Result<Instructions, EngineError> {
    let bet_type = match bet_type {
        BetType::FreeBetSr => BetType::FreeBetSr,
        BetType::Qualifying | BetType::FreeBetSnr => BetType::FreeBetSnr,
    };
    let request = selection.stake_request(value, bet_type);
    request.validate()?;
    let result = calculate(&request)?.rounded();
    let outcome = selection.outcome_name();

    let steps = vec![
        InstructionStep {
            number: 1,
            action: StepAction::UseFreeBet,
            platform: Platform::Bookmaker(selection.bookmaker.clone()),
            details: format!(
                "Place your {} FREE BET on {} @ {}",
                money(value),
                outcome,
                selection.back_odds
            ),
            warning: Some("Select 'Use Free Bet', do NOT use real money".to_string()),
        },
        lay_step(selection, &result),
        confirm_step(),
        InstructionStep {
            number: 4,
            action: StepAction::AwaitResult,
            platform: Platform::Neither,
            details: format!(
                "You profit {} whichever outcome wins",
                money(result.guaranteed_profit)
            ),
            warning: None,
        },
    ];

    let mut warnings = vec!["Make sure you select FREE BET, not real money".to_string()];
    warnings.push(match bet_type {
        BetType::FreeBetSr => "This free bet returns its stake (SR); check the terms agree".to_string(),
        _ => "Free bets are usually Stake Not Returned (SNR)".to_string(),
    });
    warnings.extend(min_odds_warning(selection));

    Ok(Instructions {
        title: format!("Free Bet: {}", selection.match_name()),
        summary: format!(
            "Use {} free bet on {} @ {}, Lay @ {}",
            money(value),
            outcome,
            selection.bookmaker,
            selection.exchange
        ),
        bet_type,
        match_name: selection.match_name(),
        offer_name: selection.offer_name.clone(),
        steps,
        stake: value,
        lay_stake: result.lay_stake,
        liability: result.liability,
        expected_result: result.guaranteed_profit,
        result_description: format!("Guaranteed profit of {}", money(result.guaranteed_profit)),
        warnings,
        tips: vec![
            "Free bets often have expiry dates, use it before it expires".to_string(),
            format!(
                "You need {} available in your {} account",
                money(result.liability),
                selection.exchange
            ),
            "The lay stake is lower than for a qualifying bet because only the winnings are covered"
                .to_string(),
        ],
    })
}

/// Dispatch on `bet_type`.
pub fn instructions_for(
    selection: &BetSelection,
    stake: Decimal,
    bet_type: BetType,
) -> Result<Instructions, EngineError> {
    if bet_type.is_free_bet() {
        free_bet_instructions(selection, stake, bet_type)
    } else {
        qualifying_instructions(selection, stake)
    }
}

/// Qualifying bet at `qualifying_stake` then a stake-not-returned free bet
/// of `free_bet_value`, on the same selection.
pub fn offer_instructions(
    selection: &BetSelection,
    qualifying_stake: Decimal,
    free_bet_value: Decimal,
) -> Result<OfferInstructions, EngineError> {
    let qualifying = qualifying_instructions(selection, qualifying_stake)?;
    let free_bet = free_bet_instructions(selection, free_bet_value, BetType::FreeBetSnr)?;

    let total_qualifying_loss = qualifying.expected_result;
    let total_free_bet_profit = free_bet.expected_result;
    let total_profit = total_qualifying_loss
        .checked_add(total_free_bet_profit)
        .ok_or(CalculationError::Overflow("offer total"))?;
    let profit_summary = if total_profit > Decimal::ZERO {
        format!("Total profit from this offer: {}", money(total_profit))
    } else {
        format!("Total loss from this offer: {}", money(total_profit.abs()))
    };

    Ok(OfferInstructions {
        offer_name: selection.offer_name.clone().unwrap_or_default(),
        selection: selection.clone(),
        exchange_funds_needed: qualifying.liability.max(free_bet.liability),
        qualifying,
        free_bet,
        total_qualifying_loss,
        total_free_bet_profit,
        total_profit,
        profit_summary,
    })
}

impl fmt::Display for Instructions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let heading = match self.bet_type {
            BetType::Qualifying => "QUALIFYING BET INSTRUCTIONS",
            BetType::FreeBetSnr | BetType::FreeBetSr => "FREE BET INSTRUCTIONS",
        };
        writeln!(f, "{heading}")?;
        writeln!(f, "{}", "=".repeat(heading.len()))?;
        writeln!(f, "Match: {}", self.match_name)?;
        if self.bet_type.is_free_bet() {
            writeln!(f, "Free Bet Value: {}", money(self.stake))?;
        } else {
            writeln!(f, "Offer: {}", self.offer_name.as_deref().unwrap_or("N/A"))?;
        }

        for step in &self.steps {
            writeln!(f)?;
            match &step.platform {
                Platform::Bookmaker(name) | Platform::Exchange(name) => {
                    writeln!(f, "STEP {}: Go to {}", step.number, name)?;
                    writeln!(f, "   -> {}", step.details)?;
                }
                Platform::Both | Platform::Neither => {
                    writeln!(f, "STEP {}: {}", step.number, step.action)?;
                }
            }
            if let Some(warning) = &step.warning {
                writeln!(f, "   -> {warning}")?;
            }
        }

        writeln!(f)?;
        write!(f, "EXPECTED RESULT: {}", self.result_description)?;
        for warning in &self.warnings {
            write!(f, "\nWARNING: {warning}")?;
        }
        Ok(())
    }
}

impl fmt::Display for OfferInstructions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{BANNER}")?;
        writeln!(f, "COMPLETE OFFER INSTRUCTIONS: {}", self.offer_name)?;
        writeln!(f, "{BANNER}")?;
        writeln!(f)?;
        writeln!(f, "Match: {}", self.selection.match_name())?;
        writeln!(f, "Betting on: {}", self.selection.outcome_name())?;
        writeln!(f, "Bookmaker: {}", self.selection.bookmaker)?;
        writeln!(f, "Exchange: {}", self.selection.exchange)?;

        writeln!(f, "\n{BANNER}\nPART 1: QUALIFYING BET\n{BANNER}\n")?;
        writeln!(f, "{}", self.qualifying)?;
        writeln!(f, "\n>>> After the qualifying bet settles, you'll receive your free bet <<<")?;
        writeln!(f, "\n{BANNER}\nPART 2: FREE BET\n{BANNER}\n")?;
        writeln!(f, "{}", self.free_bet)?;
        writeln!(f, "\n{BANNER}\nPROFIT SUMMARY\n{BANNER}\n")?;
        writeln!(f, "Qualifying bet loss:  {}", signed_money(self.total_qualifying_loss))?;
        writeln!(f, "Free bet profit:      {}", signed_money(self.total_free_bet_profit))?;
        writeln!(f, "--------------------------")?;
        writeln!(f, "TOTAL PROFIT:         {}", signed_money(self.total_profit))?;
        writeln!(f)?;
        writeln!(f, "Total exchange funds needed: {}", money(self.exchange_funds_needed))?;
        write!(f, "(Liability is released after each bet settles)")
    }
}
