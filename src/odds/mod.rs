//! Odds snapshot types supplied by the odds feed.
//!
//! This module handles:
//! - Per-source decimal prices for one event
//! - Event identity and kickoff actionability
//! - Coarse event filters applied before pairing

pub mod filters;
pub mod types;

pub use filters::{filter_by_league, filter_by_odds_range};
pub use types::{EventOdds, OddsQuote, Outcome};
