//! Unified error types for the matched betting engine.

use rust_decimal::Decimal;
use thiserror::Error;

/// Unified error type for the matched betting engine.
#[derive(Error, Debug)]
pub enum EngineError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Input rejected before any computation.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Calculation produced no usable numeric result.
    #[error("calculation error: {0}")]
    Calculation(#[from] CalculationError),
}

/// Structural input errors, raised before the calculator runs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Decimal odds must be strictly greater than 1.0.
    #[error("{field} must be greater than 1.0, got {value}")]
    InvalidOdds {
        /// Which odds field was rejected.
        field: &'static str,
        /// The rejected value.
        value: Decimal,
    },

    /// Stake (or free bet value) must be positive.
    #[error("stake must be positive, got {0}")]
    InvalidStake(Decimal),

    /// Commission must lie in [0, 1).
    #[error("commission must be in [0, 1), got {0}")]
    InvalidCommission(Decimal),

    /// Ranking needs at least one pairing.
    #[error("no pairings supplied for ranking")]
    EmptyPairings,

    /// Result limit must be at least one.
    #[error("limit must be at least 1")]
    InvalidLimit,

    /// Odds bounds are inverted or below evens.
    #[error("invalid odds range: min={min}, max={max}")]
    InvalidOddsRange {
        /// Lower bound.
        min: Decimal,
        /// Upper bound.
        max: Decimal,
    },

    /// Maximum spread cannot be negative.
    #[error("max spread must not be negative, got {0}")]
    InvalidSpread(Decimal),

    /// Batch requests are bounded.
    #[error("batch must contain between 1 and {max} calculations, got {len}")]
    BatchSize {
        /// Number of calculations supplied.
        len: usize,
        /// Maximum accepted.
        max: usize,
    },
}

/// Numeric results that cannot be represented as a usable figure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalculationError {
    /// `lay_odds - commission` is zero or negative.
    #[error("lay odds {lay_odds} do not exceed commission {commission}")]
    NonPositiveDenominator {
        /// Lay odds used.
        lay_odds: Decimal,
        /// Commission used.
        commission: Decimal,
    },

    /// Spread is undefined for non-positive back odds.
    #[error("spread undefined for back odds {back_odds}")]
    UndefinedSpread {
        /// Back odds used.
        back_odds: Decimal,
    },

    /// An intermediate product left the representable decimal range.
    #[error("arithmetic overflow in {0}")]
    Overflow(&'static str),
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, EngineError>;
