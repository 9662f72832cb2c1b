//! HTTP API route definitions.

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers::{
    bet_instructions, calculate_many, calculate_stake, estimate_offers, full_offer_instructions,
    health, metrics_text, recommendations, retention, sort_catalog, AppState,
};

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health and metrics
        .route("/health", get(health))
        .route("/metrics", get(metrics_text))
        // Calculator
        .route("/api/v1/calculate", post(calculate_stake))
        .route("/api/v1/calculate/batch", post(calculate_many))
        .route("/api/v1/calculate/retention", get(retention))
        // Pairing and ranking
        .route("/api/v1/recommendations", post(recommendations))
        // Instructions
        .route("/api/v1/instructions", post(bet_instructions))
        .route("/api/v1/instructions/offer", post(full_offer_instructions))
        // Offer catalog
        .route("/api/v1/offers/estimate", post(estimate_offers))
        .route("/api/v1/offers/sort", post(sort_catalog))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
