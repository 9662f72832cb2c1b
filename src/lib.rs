//! Matched betting engine.
//!
//! Finds back/lay pairings across bookmakers and an exchange, computes lay
//! stakes and per-outcome profit for qualifying and free bets, ranks the
//! pairings for a given offer, writes step-by-step placement instructions,
//! and scores and orders an offer catalog.
//!
//! # Qualifying bet
//!
//! Backing at the bookmaker and laying the same outcome at the exchange
//! balances the outcomes to a small, near-equal loss:
//!
//! ```text
//! Back:     £10.00 @ 2.10
//! Lay:      £10.14 @ 2.12 (5% commission)
//! ─────────────────────────────────────
//! Back wins: -£0.36
//! Lay wins:  -£0.36
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`odds`]: Event odds snapshots and coarse filters
//! - [`calculator`]: Spread, lay stake, outcome profit and placement instructions
//! - [`matching`]: Pairing engine and recommendation ranking
//! - [`offers`]: Offer profit estimation and catalog ordering
//! - [`api`]: HTTP adapter over the engine
//! - [`metrics`]: Prometheus counters and latency histograms
//! - [`utils`]: Utility functions

pub mod api;
pub mod calculator;
pub mod config;
pub mod error;
pub mod matching;
pub mod metrics;
pub mod odds;
pub mod offers;
pub mod utils;

pub use config::Config;
pub use error::{EngineError, Result};
