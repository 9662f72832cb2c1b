//! Back/lay pairing and recommendation ranking.
//!
//! This module handles:
//! - Pairing the best bookmaker back price with the exchange lay price
//! - Scoring pairings and attaching qualifying and free-bet figures
//! - Policy tables for league quality and score weights

pub mod pairing;
pub mod ranking;

pub use pairing::{find_pairings, ExchangeKeys, Pairing, PairingFilter};
pub use ranking::{
    rank, score_pairing, LeagueTable, RankRequest, RankingPolicy, RankingWeights, Recommendation,
};
