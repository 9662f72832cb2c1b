//! JSON request and response bodies.
//!
//! Engine types carry no serde derives; everything crossing the wire is
//! mapped here. Money and odds are serialized as decimal strings.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::calculator::{
    round_money, BatchResult, BetSelection, BetType, InstructionStep, Instructions,
    OfferInstructions, Retention, StakeRequest, StakeResult,
};
use crate::matching::Recommendation;
use crate::odds::{EventOdds, OddsQuote, Outcome};
use crate::offers::{Difficulty, OfferRecord};

// === Calculator ===

/// Wire name of a bet type.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BetTypeDto {
    /// Qualifying bet.
    #[default]
    Qualifying,
    /// Free bet, stake not returned.
    #[serde(alias = "snr")]
    FreeBetSnr,
    /// Free bet, stake returned.
    #[serde(alias = "sr")]
    FreeBetSr,
}

impl From<BetTypeDto> for BetType {
    fn from(dto: BetTypeDto) -> Self {
        match dto {
            BetTypeDto::Qualifying => BetType::Qualifying,
            BetTypeDto::FreeBetSnr => BetType::FreeBetSnr,
            BetTypeDto::FreeBetSr => BetType::FreeBetSr,
        }
    }
}

/// Body of `POST /api/v1/calculate`.
#[derive(Debug, Clone, Deserialize)]
pub struct CalculateRequest {
    /// Back odds.
    pub back_odds: Decimal,
    /// Lay odds.
    pub lay_odds: Decimal,
    /// Back stake or free bet value.
    pub stake: Decimal,
    /// Bet type, qualifying when omitted.
    #[serde(default)]
    pub bet_type: BetTypeDto,
    /// Exchange commission, configured default when omitted.
    pub commission: Option<Decimal>,
}

impl CalculateRequest {
    /// Engine request, filling in the default commission.
    pub fn into_stake_request(self, default_commission: Decimal) -> StakeRequest {
        StakeRequest::new(
            self.back_odds,
            self.lay_odds,
            self.stake,
            self.bet_type.into(),
            self.commission.unwrap_or(default_commission),
        )
    }
}

/// Calculation result, rounded for display.
#[derive(Debug, Clone, Serialize)]
pub struct CalculationResponse {
    /// Wire name of the bet type.
    pub bet_type: String,
    /// Stake to lay at the exchange.
    pub lay_stake: Decimal,
    /// Exchange balance the lay ties up.
    pub liability: Decimal,
    /// Profit if the backed outcome occurs.
    pub back_wins_profit: Decimal,
    /// Profit if it does not.
    pub lay_wins_profit: Decimal,
    /// The smaller of the two outcome profits.
    pub guaranteed_profit: Decimal,
    /// Mean of the two outcome profits.
    pub expected_value: Decimal,
    /// Spread rating band.
    pub rating: String,
    /// Spread as a percentage of the back odds.
    pub spread_percent: Decimal,
}

impl From<&StakeResult> for CalculationResponse {
    fn from(result: &StakeResult) -> Self {
        let r = result.rounded();
        Self {
            bet_type: r.bet_type.to_string(),
            lay_stake: r.lay_stake,
            liability: r.liability,
            back_wins_profit: r.back_wins_profit(),
            lay_wins_profit: r.lay_wins_profit(),
            guaranteed_profit: r.guaranteed_profit,
            expected_value: r.expected_value,
            rating: r.rating.to_string(),
            spread_percent: r.spread_percent,
        }
    }
}

/// Body of `POST /api/v1/calculate/batch`.
#[derive(Debug, Clone, Deserialize)]
pub struct BatchRequest {
    /// One to twenty calculations.
    pub calculations: Vec<CalculateRequest>,
}

/// Batch results with the best one highlighted.
#[derive(Debug, Clone, Serialize)]
pub struct BatchResponse {
    /// Results in request order.
    pub results: Vec<CalculationResponse>,
    /// Sum of guaranteed profits.
    pub total_guaranteed_profit: Decimal,
    /// Best free bet, or the cheapest qualifying bet when there is none.
    pub best: Option<CalculationResponse>,
}

impl From<&BatchResult> for BatchResponse {
    fn from(batch: &BatchResult) -> Self {
        Self {
            results: batch.results.iter().map(CalculationResponse::from).collect(),
            total_guaranteed_profit: round_money(batch.total_guaranteed_profit),
            best: batch.best.as_ref().map(CalculationResponse::from),
        }
    }
}

/// Query of `GET /api/v1/calculate/retention`.
#[derive(Debug, Clone, Deserialize)]
pub struct RetentionQuery {
    /// Face value of the stake-not-returned free bet.
    pub free_bet_value: Decimal,
    /// Back odds.
    pub back_odds: Decimal,
    /// Lay odds.
    pub lay_odds: Decimal,
    /// Exchange commission, configured default when omitted.
    pub commission: Option<Decimal>,
}

/// Free bet retention.
#[derive(Debug, Clone, Serialize)]
pub struct RetentionResponse {
    /// Guaranteed profit as a percentage of the free bet value.
    pub retention_percent: Decimal,
    /// Guaranteed profit.
    pub guaranteed_profit: Decimal,
    /// Retention band.
    pub rating: String,
}

impl From<Retention> for RetentionResponse {
    fn from(retention: Retention) -> Self {
        Self {
            retention_percent: round_money(retention.percent),
            guaranteed_profit: round_money(retention.guaranteed_profit),
            rating: retention.rating.to_string(),
        }
    }
}

// === Odds and recommendations ===

/// One source's 1X2 prices.
#[derive(Debug, Clone, Deserialize)]
pub struct QuoteDto {
    /// Source key, e.g. "bet365" or "betfair_ex_uk".
    pub source_key: String,
    /// Display name; the key is used when omitted.
    #[serde(default)]
    pub source_title: Option<String>,
    /// Home win price.
    pub home: Option<Decimal>,
    /// Draw price.
    pub draw: Option<Decimal>,
    /// Away win price.
    pub away: Option<Decimal>,
    /// RFC 3339 time of the source's last update.
    #[serde(with = "time::serde::rfc3339")]
    pub last_update: OffsetDateTime,
}

impl From<QuoteDto> for OddsQuote {
    fn from(dto: QuoteDto) -> Self {
        Self {
            source_title: dto.source_title.unwrap_or_else(|| dto.source_key.clone()),
            source_key: dto.source_key,
            home: dto.home,
            draw: dto.draw,
            away: dto.away,
            last_update: dto.last_update,
        }
    }
}

/// One event with all quotes.
#[derive(Debug, Clone, Deserialize)]
pub struct EventDto {
    /// Feed identifier.
    pub event_id: String,
    /// League key used by league filters.
    #[serde(default)]
    pub league_key: String,
    /// League display name, used for the league score.
    pub league: String,
    /// Home team name.
    pub home_team: String,
    /// Away team name.
    pub away_team: String,
    /// RFC 3339 kickoff.
    #[serde(with = "time::serde::rfc3339")]
    pub kickoff: OffsetDateTime,
    /// Bookmaker and exchange quotes.
    #[serde(default)]
    pub quotes: Vec<QuoteDto>,
}

impl From<EventDto> for EventOdds {
    fn from(dto: EventDto) -> Self {
        Self {
            event_id: dto.event_id,
            league_key: dto.league_key,
            league: dto.league,
            home_team: dto.home_team,
            away_team: dto.away_team,
            kickoff: dto.kickoff,
            quotes: dto.quotes.into_iter().map(OddsQuote::from).collect(),
        }
    }
}

/// Body of `POST /api/v1/recommendations`. Omitted fields take configured
/// defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationsRequest {
    /// Odds snapshot.
    pub events: Vec<EventDto>,
    /// Qualifying stake.
    pub stake: Option<Decimal>,
    /// Free bet value; the stake when omitted.
    pub free_bet_value: Option<Decimal>,
    /// Odds to aim for instead of the default odds bands.
    pub target_odds: Option<Decimal>,
    /// Maximum recommendations returned.
    pub limit: Option<usize>,
    /// Exchange commission.
    pub commission: Option<Decimal>,
    /// Lowest back price considered.
    pub min_odds: Option<Decimal>,
    /// Highest back price considered.
    pub max_odds: Option<Decimal>,
    /// Widest spread kept, in percent.
    pub max_spread: Option<Decimal>,
    /// Only keep events from these league keys.
    #[serde(default)]
    pub league_keys: Option<Vec<String>>,
    /// Skip events kicking off at or before this instant.
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub as_of: Option<OffsetDateTime>,
}

/// One ranked recommendation, rounded for display.
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationDto {
    /// Feed identifier of the event.
    pub event_id: String,
    /// "Home vs Away".
    pub event: String,
    /// League display name.
    pub league: String,
    /// RFC 3339 kickoff.
    #[serde(with = "time::serde::rfc3339")]
    pub kickoff: OffsetDateTime,
    /// "home", "draw" or "away".
    pub outcome: String,
    /// Team name, or "Draw".
    pub outcome_name: String,
    /// Bookmaker to back at.
    pub back_bookmaker: String,
    /// Best in-range back price.
    pub back_odds: Decimal,
    /// Exchange to lay at.
    pub lay_exchange: String,
    /// Exchange price.
    pub lay_odds: Decimal,
    /// Spread in percent.
    pub spread_percent: Decimal,
    /// Match quality, 0 to 10.
    pub score: Decimal,
    /// Qualifying stake used.
    pub stake: Decimal,
    /// Qualifying lay stake.
    pub lay_stake: Decimal,
    /// Qualifying liability.
    pub liability: Decimal,
    /// Cost of the qualifying bet (positive = loss).
    pub qualifying_loss: Decimal,
    /// Free bet value used.
    pub free_bet_value: Decimal,
    /// Guaranteed profit of the free bet.
    pub free_bet_profit: Decimal,
    /// Spread rating of the qualifying bet.
    pub rating: String,
}

impl From<&Recommendation> for RecommendationDto {
    fn from(rec: &Recommendation) -> Self {
        let p = &rec.pairing;
        Self {
            event_id: p.event_id.clone(),
            event: p.display_name(),
            league: p.league.clone(),
            kickoff: p.kickoff,
            outcome: p.outcome.to_string(),
            outcome_name: p.outcome_name.clone(),
            back_bookmaker: p.back_bookmaker.clone(),
            back_odds: p.back_odds,
            lay_exchange: p.lay_exchange.clone(),
            lay_odds: p.lay_odds,
            spread_percent: round_money(p.spread_percent),
            score: rec.score,
            stake: rec.stake,
            lay_stake: round_money(rec.lay_stake()),
            liability: round_money(rec.liability()),
            qualifying_loss: round_money(rec.qualifying_loss()),
            free_bet_value: rec.free_bet_value,
            free_bet_profit: round_money(rec.free_bet_profit()),
            rating: rec.qualifying.rating.to_string(),
        }
    }
}

/// Ranked recommendations and snapshot counts.
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationsResponse {
    /// Events in the request.
    pub events_received: usize,
    /// Events (after league filtering) quoted by the lay exchange.
    pub events_with_exchange: usize,
    /// Pairings before ranking and truncation.
    pub pairings_found: usize,
    /// Best recommendations, highest score first.
    pub recommendations: Vec<RecommendationDto>,
}

// === Offers ===

/// Wire name of an offer difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DifficultyDto {
    /// "easy".
    Easy,
    /// "medium".
    Medium,
    /// "hard".
    Hard,
}

impl From<DifficultyDto> for Difficulty {
    fn from(dto: DifficultyDto) -> Self {
        match dto {
            DifficultyDto::Easy => Difficulty::Easy,
            DifficultyDto::Medium => Difficulty::Medium,
            DifficultyDto::Hard => Difficulty::Hard,
        }
    }
}

impl From<Difficulty> for DifficultyDto {
    fn from(difficulty: Difficulty) -> Self {
        match difficulty {
            Difficulty::Easy => DifficultyDto::Easy,
            Difficulty::Medium => DifficultyDto::Medium,
            Difficulty::Hard => DifficultyDto::Hard,
        }
    }
}

/// Catalog offer on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferDto {
    /// Bookmaker name as listed.
    pub bookmaker: String,
    /// Offer title.
    #[serde(default)]
    pub offer_name: String,
    /// Free bet value.
    pub offer_value: Option<Decimal>,
    /// Qualifying stake.
    pub required_stake: Option<Decimal>,
    /// Minimum qualifying odds.
    pub min_odds: Option<Decimal>,
    /// Stake returned (SR) rather than not returned (SNR).
    #[serde(default)]
    pub is_stake_returned: bool,
    /// Wagering multiplier.
    pub wagering_requirement: Option<Decimal>,
    /// Terms summary.
    pub terms_summary: Option<String>,
    /// Fingerprint of the terms behind `expected_profit`.
    pub terms_hash: Option<String>,
    /// Stored expected profit.
    pub expected_profit: Option<Decimal>,
    /// Manual priority, lower first.
    pub priority_rank: Option<u32>,
    /// Completion difficulty.
    pub difficulty: Option<DifficultyDto>,
}

impl From<OfferDto> for OfferRecord {
    fn from(dto: OfferDto) -> Self {
        Self {
            bookmaker: dto.bookmaker,
            offer_name: dto.offer_name,
            offer_value: dto.offer_value,
            required_stake: dto.required_stake,
            min_odds: dto.min_odds,
            is_stake_returned: dto.is_stake_returned,
            wagering_requirement: dto.wagering_requirement,
            terms_summary: dto.terms_summary,
            terms_hash: dto.terms_hash,
            expected_profit: dto.expected_profit,
            priority_rank: dto.priority_rank,
            difficulty: dto.difficulty.map(Difficulty::from),
        }
    }
}

impl From<OfferRecord> for OfferDto {
    fn from(record: OfferRecord) -> Self {
        Self {
            bookmaker: record.bookmaker,
            offer_name: record.offer_name,
            offer_value: record.offer_value,
            required_stake: record.required_stake,
            min_odds: record.min_odds,
            is_stake_returned: record.is_stake_returned,
            wagering_requirement: record.wagering_requirement,
            terms_summary: record.terms_summary,
            terms_hash: record.terms_hash,
            expected_profit: record.expected_profit,
            priority_rank: record.priority_rank,
            difficulty: record.difficulty.map(DifficultyDto::from),
        }
    }
}

/// One offer to estimate, with an optional terms-aware estimate.
#[derive(Debug, Clone, Deserialize)]
pub struct EstimateItem {
    /// Offer as stored.
    pub offer: OfferDto,
    /// Estimate from a terms-aware source, preferred over the fallback.
    pub external_estimate: Option<Decimal>,
}

/// Body of `POST /api/v1/offers/estimate`.
#[derive(Debug, Clone, Deserialize)]
pub struct EstimateRequest {
    /// Offers to estimate.
    pub offers: Vec<EstimateItem>,
}

/// Resolved profit figure for one offer.
#[derive(Debug, Clone, Serialize)]
pub struct OfferEstimateDto {
    /// Bookmaker name as listed.
    pub bookmaker: String,
    /// Offer title.
    pub offer_name: String,
    /// Free bet value per unit of qualifying stake.
    pub value_index: Decimal,
    /// Deterministic estimate alone.
    pub fallback_estimate: Option<Decimal>,
    /// Figure to store after resolution.
    pub expected_profit: Option<Decimal>,
    /// Fingerprint of the current terms.
    pub terms_hash: Option<String>,
}

/// Estimates in request order.
#[derive(Debug, Clone, Serialize)]
pub struct EstimateResponse {
    /// One entry per requested offer.
    pub estimates: Vec<OfferEstimateDto>,
}

/// Body of `POST /api/v1/offers/sort`.
#[derive(Debug, Clone, Deserialize)]
pub struct SortRequest {
    /// Catalog to order.
    pub offers: Vec<OfferDto>,
    /// Replaces the default mainstream list when given.
    pub mainstream_bookmakers: Option<Vec<String>>,
}

/// Offers in catalog order.
#[derive(Debug, Clone, Serialize)]
pub struct SortResponse {
    /// Catalog order.
    pub offers: Vec<OfferDto>,
}

// === Instructions ===

/// Wire name of a 1X2 outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeDto {
    /// "home".
    Home,
    /// "draw".
    Draw,
    /// "away".
    Away,
}

impl From<OutcomeDto> for Outcome {
    fn from(dto: OutcomeDto) -> Self {
        match dto {
            OutcomeDto::Home => Outcome::Home,
            OutcomeDto::Draw => Outcome::Draw,
            OutcomeDto::Away => Outcome::Away,
        }
    }
}

/// Market and venues shared by both instruction requests.
#[derive(Debug, Clone, Deserialize)]
pub struct SelectionDto {
    /// Home team name.
    pub home_team: String,
    /// Away team name.
    pub away_team: String,
    /// Outcome to back.
    pub outcome: OutcomeDto,
    /// Bookmaker taking the back bet.
    pub bookmaker: String,
    /// Exchange taking the lay bet.
    pub exchange: String,
    /// Back odds.
    pub back_odds: Decimal,
    /// Lay odds.
    pub lay_odds: Decimal,
    /// Exchange commission, configured default when omitted.
    pub commission: Option<Decimal>,
    /// Offer title.
    pub offer_name: Option<String>,
    /// Minimum back odds the offer demands.
    pub min_odds_required: Option<Decimal>,
}

impl SelectionDto {
    /// Engine selection, filling in the default commission.
    pub fn into_selection(self, default_commission: Decimal) -> BetSelection {
        BetSelection {
            home_team: self.home_team,
            away_team: self.away_team,
            outcome: self.outcome.into(),
            bookmaker: self.bookmaker,
            exchange: self.exchange,
            back_odds: self.back_odds,
            lay_odds: self.lay_odds,
            commission: self.commission.unwrap_or(default_commission),
            offer_name: self.offer_name,
            min_odds_required: self.min_odds_required,
        }
    }
}

/// Body of `POST /api/v1/instructions`.
#[derive(Debug, Clone, Deserialize)]
pub struct InstructionRequest {
    /// Where and at what prices.
    #[serde(flatten)]
    pub selection: SelectionDto,
    /// Back stake or free bet value.
    pub stake: Decimal,
    /// Bet type, qualifying when omitted.
    #[serde(default)]
    pub bet_type: BetTypeDto,
}

/// Body of `POST /api/v1/instructions/offer`.
#[derive(Debug, Clone, Deserialize)]
pub struct OfferInstructionRequest {
    /// Where and at what prices.
    #[serde(flatten)]
    pub selection: SelectionDto,
    /// Real-money qualifying stake.
    pub qualifying_stake: Decimal,
    /// Stake-not-returned free bet value.
    pub free_bet_value: Decimal,
}

/// One numbered step.
#[derive(Debug, Clone, Serialize)]
pub struct InstructionStepDto {
    /// 1-based position.
    pub step_number: u8,
    /// What to do.
    pub action: String,
    /// Bookmaker, exchange, "Both" or "N/A".
    pub platform: String,
    /// Detail with amounts.
    pub details: String,
    /// Caveat for this step.
    pub warning: Option<String>,
}

impl From<&InstructionStep> for InstructionStepDto {
    fn from(step: &InstructionStep) -> Self {
        Self {
            step_number: step.number,
            action: step.action.to_string(),
            platform: step.platform.to_string(),
            details: step.details.clone(),
            warning: step.warning.clone(),
        }
    }
}

/// Instructions for one bet.
#[derive(Debug, Clone, Serialize)]
pub struct InstructionsDto {
    /// Short heading.
    pub title: String,
    /// One-line summary.
    pub summary: String,
    /// Wire name of the bet type used.
    pub bet_type: String,
    /// Ordered steps.
    pub steps: Vec<InstructionStepDto>,
    /// Lay stake.
    pub lay_stake: Decimal,
    /// Exchange liability.
    pub liability: Decimal,
    /// Guaranteed profit (negative = qualifying loss).
    pub expected_result: Decimal,
    /// `expected_result` in words.
    pub result_description: String,
    /// Problems to review before placing.
    pub warnings: Vec<String>,
    /// General advice.
    pub tips: Vec<String>,
    /// Printable rendering.
    pub plain_text: String,
}

impl From<&Instructions> for InstructionsDto {
    fn from(ins: &Instructions) -> Self {
        Self {
            title: ins.title.clone(),
            summary: ins.summary.clone(),
            bet_type: ins.bet_type.to_string(),
            steps: ins.steps.iter().map(InstructionStepDto::from).collect(),
            lay_stake: ins.lay_stake,
            liability: ins.liability,
            expected_result: ins.expected_result,
            result_description: ins.result_description.clone(),
            warnings: ins.warnings.clone(),
            tips: ins.tips.clone(),
            plain_text: ins.to_string(),
        }
    }
}

/// Instructions for a whole offer.
#[derive(Debug, Clone, Serialize)]
pub struct OfferInstructionsDto {
    /// Offer title.
    pub offer_name: String,
    /// Part 1.
    pub qualifying_instructions: InstructionsDto,
    /// Part 2.
    pub free_bet_instructions: InstructionsDto,
    /// Qualifying bet result.
    pub total_qualifying_loss: Decimal,
    /// Free bet result.
    pub total_free_bet_profit: Decimal,
    /// Sum of both parts.
    pub total_profit: Decimal,
    /// Largest single liability.
    pub exchange_funds_needed: Decimal,
    /// `total_profit` in words.
    pub profit_summary: String,
    /// Printable rendering of both parts.
    pub full_plain_text: String,
}

impl From<&OfferInstructions> for OfferInstructionsDto {
    fn from(ins: &OfferInstructions) -> Self {
        Self {
            offer_name: ins.offer_name.clone(),
            qualifying_instructions: InstructionsDto::from(&ins.qualifying),
            free_bet_instructions: InstructionsDto::from(&ins.free_bet),
            total_qualifying_loss: ins.total_qualifying_loss,
            total_free_bet_profit: ins.total_free_bet_profit,
            total_profit: ins.total_profit,
            exchange_funds_needed: ins.exchange_funds_needed,
            profit_summary: ins.profit_summary.clone(),
            full_plain_text: ins.to_string(),
        }
    }
}
