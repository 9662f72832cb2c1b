//! HTTP API handlers.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::dto::{
    BatchRequest, BatchResponse, CalculateRequest, CalculationResponse, EstimateRequest,
    EstimateResponse, InstructionRequest, InstructionsDto, OfferDto, OfferEstimateDto,
    OfferInstructionRequest, OfferInstructionsDto, RecommendationDto, RecommendationsRequest,
    RecommendationsResponse, RetentionQuery, RetentionResponse, SortRequest, SortResponse,
};
use crate::calculator::{
    calculate, calculate_batch, instructions_for, offer_instructions, retention_rate,
    StakeRequest,
};
use crate::config::Config;
use crate::error::{CalculationError, EngineError, ValidationError};
use crate::matching::{find_pairings, rank, ExchangeKeys, PairingFilter, RankRequest, RankingPolicy};
use crate::metrics;
use crate::odds::{filter_by_league, EventOdds};
use crate::offers::{
    resolve_expected_profit, sort_offers, terms_fingerprint, MainstreamBookmakers, OfferRecord,
};

/// Read-only state shared with handlers. Nothing computed is cached here.
#[derive(Clone)]
pub struct AppState {
    /// Loaded configuration.
    pub config: Arc<Config>,
    /// Ranking weights and league table.
    pub ranking: Arc<RankingPolicy>,
    /// Brands preferred by the catalog sort.
    pub mainstream: Arc<MainstreamBookmakers>,
    /// Exchange source keys.
    pub exchanges: Arc<ExchangeKeys>,
    /// Prometheus renderer, when a recorder is installed.
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Create state with default policy tables.
    pub fn new(config: Config) -> Self {
        Self {
            exchanges: Arc::new(config.exchange_keys()),
            config: Arc::new(config),
            ranking: Arc::new(RankingPolicy::default()),
            mainstream: Arc::new(MainstreamBookmakers::default()),
            metrics: None,
        }
    }

    /// Attach a Prometheus handle for `/metrics`.
    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("exchanges", &self.exchanges)
            .field("metrics", &self.metrics.is_some())
            .finish_non_exhaustive()
    }
}

/// Handler error with its HTTP status.
#[derive(Debug)]
pub struct ApiError(EngineError);

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self.0 {
            EngineError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            EngineError::Calculation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<EngineError> for ApiError {
    fn from(err: EngineError) -> Self {
        Self(err)
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self(err.into())
    }
}

impl From<CalculationError> for ApiError {
    fn from(err: CalculationError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let reason = match self.0 {
            EngineError::Validation(_) => "validation",
            EngineError::Calculation(_) => "calculation",
            _ => "internal",
        };
        metrics::inc_calculations_rejected(reason);
        warn!(%status, error = %self.0, "Request rejected");

        (status, Json(ErrorBody { error: self.0.to_string() })).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status: "ok".
    pub status: &'static str,
}

/// Health check handler - always returns 200.
pub async fn health() -> impl IntoResponse {
    Json(HealthResponse { status: "ok" })
}

/// Prometheus text exposition, 503 when no recorder is installed.
pub async fn metrics_text(State(state): State<AppState>) -> impl IntoResponse {
    match &state.metrics {
        Some(handle) => (StatusCode::OK, handle.render()),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            "metrics recorder not installed".to_string(),
        ),
    }
}

/// Single stake calculation.
pub async fn calculate_stake(
    State(state): State<AppState>,
    Json(body): Json<CalculateRequest>,
) -> ApiResult<CalculationResponse> {
    let request = body.into_stake_request(state.config.exchange_commission);
    request.validate()?;
    let result = calculate(&request)?;
    metrics::inc_calculations(1);

    Ok(Json(CalculationResponse::from(&result)))
}

/// Up to twenty calculations, with the best one picked out.
pub async fn calculate_many(
    State(state): State<AppState>,
    Json(body): Json<BatchRequest>,
) -> ApiResult<BatchResponse> {
    let commission = state.config.exchange_commission;
    let requests: Vec<StakeRequest> = body
        .calculations
        .into_iter()
        .map(|c| c.into_stake_request(commission))
        .collect();

    let batch = calculate_batch(&requests)?;
    metrics::inc_calculations(batch.results.len() as u64);

    Ok(Json(BatchResponse::from(&batch)))
}

/// Free bet retention for a back/lay pair.
pub async fn retention(
    State(state): State<AppState>,
    Query(query): Query<RetentionQuery>,
) -> ApiResult<RetentionResponse> {
    let commission = query.commission.unwrap_or(state.config.exchange_commission);
    let retention = retention_rate(query.free_bet_value, query.back_odds, query.lay_odds, commission)?;
    metrics::inc_calculations(1);

    Ok(Json(RetentionResponse::from(retention)))
}

/// Pair and rank a fresh odds snapshot.
pub async fn recommendations(
    State(state): State<AppState>,
    Json(body): Json<RecommendationsRequest>,
) -> ApiResult<RecommendationsResponse> {
    let start = Instant::now();
    let config = &state.config;

    let filter = PairingFilter {
        min_odds: body.min_odds.unwrap_or(config.min_odds),
        max_odds: body.max_odds.unwrap_or(config.max_odds),
        max_spread: body.max_spread.unwrap_or(config.max_spread_percent),
        as_of: body.as_of,
    };
    filter.validate()?;

    let defaults = config.rank_request();
    let request = RankRequest {
        stake: body.stake.unwrap_or(defaults.stake),
        free_bet_value: body.free_bet_value,
        target_odds: body.target_odds,
        limit: body.limit.unwrap_or(defaults.limit),
        commission: body.commission.unwrap_or(defaults.commission),
    };
    request.validate()?;

    let events: Vec<EventOdds> = body.events.into_iter().map(EventOdds::from).collect();
    let events_received = events.len();
    let events = match &body.league_keys {
        Some(keys) => filter_by_league(&events, keys),
        None => events,
    };
    let events_with_exchange = events
        .iter()
        .filter(|e| e.quote(&state.exchanges.lay_exchange).is_some())
        .count();

    let pairings = find_pairings(&events, &filter, &state.exchanges);
    metrics::inc_pairings_found(pairings.len());

    let ranked = if pairings.is_empty() {
        debug!("No pairings in snapshot");
        Vec::new()
    } else {
        rank(&pairings, &request, &state.ranking)?
    };
    metrics::inc_recommendations_served(ranked.len());
    metrics::record_ranking_latency(start);

    info!(
        events = events_received,
        pairings = pairings.len(),
        returned = ranked.len(),
        "Recommendations served"
    );

    Ok(Json(RecommendationsResponse {
        events_received,
        events_with_exchange,
        pairings_found: pairings.len(),
        recommendations: ranked.iter().map(RecommendationDto::from).collect(),
    }))
}

/// Resolve the profit figure for each offer.
pub async fn estimate_offers(
    State(state): State<AppState>,
    Json(body): Json<EstimateRequest>,
) -> ApiResult<EstimateResponse> {
    let estimator = state.config.offer_estimator();

    let estimates: Vec<OfferEstimateDto> = body
        .offers
        .into_iter()
        .map(|item| {
            let offer = OfferRecord::from(item.offer);
            OfferEstimateDto {
                value_index: offer.value_index(),
                fallback_estimate: estimator.estimate(&offer),
                expected_profit: resolve_expected_profit(&offer, item.external_estimate, &estimator),
                terms_hash: terms_fingerprint(offer.terms_summary.as_deref()),
                bookmaker: offer.bookmaker,
                offer_name: offer.offer_name,
            }
        })
        .collect();
    metrics::inc_offer_estimates(estimates.len());

    Ok(Json(EstimateResponse { estimates }))
}

/// Placement steps for one bet.
pub async fn bet_instructions(
    State(state): State<AppState>,
    Json(body): Json<InstructionRequest>,
) -> ApiResult<InstructionsDto> {
    let selection = body.selection.into_selection(state.config.exchange_commission);
    let instructions = instructions_for(&selection, body.stake, body.bet_type.into())?;
    metrics::inc_calculations(1);

    debug!(
        bet_type = %instructions.bet_type,
        warnings = instructions.warnings.len(),
        "Instructions generated"
    );
    Ok(Json(InstructionsDto::from(&instructions)))
}

/// Placement steps for a qualifying bet and its free bet.
pub async fn full_offer_instructions(
    State(state): State<AppState>,
    Json(body): Json<OfferInstructionRequest>,
) -> ApiResult<OfferInstructionsDto> {
    let selection = body.selection.into_selection(state.config.exchange_commission);
    let instructions = offer_instructions(&selection, body.qualifying_stake, body.free_bet_value)?;
    metrics::inc_calculations(2);

    Ok(Json(OfferInstructionsDto::from(&instructions)))
}

/// Order offers for the catalog view.
pub async fn sort_catalog(
    State(state): State<AppState>,
    Json(body): Json<SortRequest>,
) -> ApiResult<SortResponse> {
    let offers: Vec<OfferRecord> = body.offers.into_iter().map(OfferRecord::from).collect();

    let sorted = match body.mainstream_bookmakers {
        Some(names) => sort_offers(&offers, &MainstreamBookmakers::new(names)),
        None => sort_offers(&offers, &state.mainstream),
    };

    Ok(Json(SortResponse {
        offers: sorted.into_iter().map(OfferDto::from).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn validation_errors_are_unprocessable() {
        let err = ApiError::from(ValidationError::InvalidLimit);
        assert_eq!(err.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn calculation_errors_are_bad_requests() {
        let err = ApiError::from(CalculationError::NonPositiveDenominator {
            lay_odds: dec!(1.01),
            commission: dec!(0.05),
        });
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::from(CalculationError::Overflow("lay stake")).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn state_takes_exchanges_from_config() {
        let state = AppState::new(Config {
            lay_exchange_key: "smarkets".to_string(),
            ..Config::default()
        });

        assert_eq!(state.exchanges.lay_exchange, "smarkets");
        assert!(state.exchanges.is_exchange("betfair_ex_uk"));
        assert!(state.metrics.is_none());
    }
}
