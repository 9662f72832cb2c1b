//! Offer catalog scoring.
//!
//! This module handles:
//! - The read-only offer record supplied by the catalog
//! - Deterministic expected-profit estimation and estimate resolution
//! - Catalog ordering by brand, profit, difficulty and priority

pub mod estimator;
pub mod prioritizer;
pub mod types;

pub use estimator::{resolve_expected_profit, terms_fingerprint, OfferProfitEstimator};
pub use prioritizer::{sort_offers, MainstreamBookmakers};
pub use types::{Difficulty, OfferRecord};
