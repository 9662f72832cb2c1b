//! Prometheus metrics for calculation and ranking traffic.
//!
//! Recorded at the edges (HTTP handlers and CLI); the engine itself stays
//! free of side effects.

use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::debug;

// === Metric Name Constants ===

/// Stake calculations performed.
pub const METRIC_CALCULATIONS: &str = "calculations_total";
/// Requests rejected by validation or an undefined calculation.
pub const METRIC_CALCULATIONS_REJECTED: &str = "calculations_rejected_total";
/// Pairings produced by the pairing engine.
pub const METRIC_PAIRINGS_FOUND: &str = "pairings_found_total";
/// Recommendations returned to callers.
pub const METRIC_RECOMMENDATIONS_SERVED: &str = "recommendations_served_total";
/// Offer profit estimates produced.
pub const METRIC_OFFER_ESTIMATES: &str = "offer_estimates_total";
/// Pairing plus ranking latency.
pub const METRIC_RANKING_LATENCY: &str = "ranking_latency_ms";

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    describe_histogram!(
        METRIC_RANKING_LATENCY,
        "Time to pair and rank one odds snapshot in milliseconds"
    );

    describe_counter!(METRIC_CALCULATIONS, "Total number of stake calculations");
    describe_counter!(
        METRIC_CALCULATIONS_REJECTED,
        "Total number of rejected calculation requests"
    );
    describe_counter!(METRIC_PAIRINGS_FOUND, "Total number of pairings found");
    describe_counter!(
        METRIC_RECOMMENDATIONS_SERVED,
        "Total number of recommendations returned"
    );
    describe_counter!(
        METRIC_OFFER_ESTIMATES,
        "Total number of offer profit estimates produced"
    );

    debug!("Metrics initialized");
}

/// Install the Prometheus recorder and return a handle for rendering.
pub fn install_recorder() -> Result<PrometheusHandle, metrics_exporter_prometheus::BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    init_metrics();
    Ok(handle)
}

/// Count stake calculations.
pub fn inc_calculations(count: u64) {
    counter!(METRIC_CALCULATIONS).increment(count);
}

/// Count a rejected request, labelled by reason.
pub fn inc_calculations_rejected(reason: &'static str) {
    counter!(METRIC_CALCULATIONS_REJECTED, "reason" => reason).increment(1);
}

/// Count pairings found.
pub fn inc_pairings_found(count: usize) {
    counter!(METRIC_PAIRINGS_FOUND).increment(count as u64);
}

/// Count recommendations served.
pub fn inc_recommendations_served(count: usize) {
    counter!(METRIC_RECOMMENDATIONS_SERVED).increment(count as u64);
}

/// Count offer estimates produced.
pub fn inc_offer_estimates(count: usize) {
    counter!(METRIC_OFFER_ESTIMATES).increment(count as u64);
}

/// Record pairing plus ranking latency.
pub fn record_ranking_latency(start: Instant) {
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    histogram!(METRIC_RANKING_LATENCY).record(latency_ms);
}
