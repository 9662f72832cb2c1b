//! Application configuration loaded from environment variables.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::calculator::validate_commission;
use crate::error::ValidationError;
use crate::matching::{ExchangeKeys, PairingFilter, RankRequest};
use crate::offers::OfferProfitEstimator;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Calculation Defaults ===
    /// Exchange commission for calculations and ranking (0.05 = 5%).
    #[serde(default = "default_exchange_commission")]
    pub exchange_commission: Decimal,

    /// Commission assumed by the offer profit estimator.
    #[serde(default = "default_estimator_commission")]
    pub estimator_commission: Decimal,

    /// Qualifying stake used when a request omits one.
    #[serde(default = "default_stake")]
    pub default_stake: Decimal,

    // === Pairing Bounds ===
    /// Minimum back odds (inclusive).
    #[serde(default = "default_min_odds")]
    pub min_odds: Decimal,

    /// Maximum back odds (inclusive).
    #[serde(default = "default_max_odds")]
    pub max_odds: Decimal,

    /// Maximum spread percentage (inclusive).
    #[serde(default = "default_max_spread")]
    pub max_spread_percent: Decimal,

    /// Recommendations returned when a request omits a limit.
    #[serde(default = "default_limit")]
    pub recommendation_limit: usize,

    // === Exchanges ===
    /// Source key of the exchange used for lay prices.
    #[serde(default = "default_lay_exchange")]
    pub lay_exchange_key: String,

    /// Comma separated source keys that are exchanges.
    #[serde(default = "default_exchange_keys")]
    pub exchange_keys: String,

    // === Server Configuration ===
    /// HTTP server port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,

    /// Enable verbose logging.
    #[serde(default)]
    pub verbose: bool,
}

fn default_exchange_commission() -> Decimal {
    Decimal::new(5, 2) // 0.05
}

fn default_estimator_commission() -> Decimal {
    Decimal::new(2, 2) // 0.02
}

fn default_stake() -> Decimal {
    Decimal::new(10, 0)
}

fn default_min_odds() -> Decimal {
    Decimal::new(15, 1) // 1.5
}

fn default_max_odds() -> Decimal {
    Decimal::new(50, 1) // 5.0
}

fn default_max_spread() -> Decimal {
    Decimal::new(50, 1) // 5.0%
}

fn default_limit() -> usize {
    10
}

fn default_lay_exchange() -> String {
    "betfair_ex_uk".to_string()
}

fn default_exchange_keys() -> String {
    "betfair_ex_uk,smarkets".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            exchange_commission: default_exchange_commission(),
            estimator_commission: default_estimator_commission(),
            default_stake: default_stake(),
            min_odds: default_min_odds(),
            max_odds: default_max_odds(),
            max_spread_percent: default_max_spread(),
            recommendation_limit: default_limit(),
            lay_exchange_key: default_lay_exchange(),
            exchange_keys: default_exchange_keys(),
            port: default_port(),
            rust_log: default_log_level(),
            verbose: false,
        }
    }
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_commission(self.exchange_commission)?;
        validate_commission(self.estimator_commission)?;

        if self.default_stake <= Decimal::ZERO {
            return Err(ValidationError::InvalidStake(self.default_stake));
        }

        if self.recommendation_limit == 0 {
            return Err(ValidationError::InvalidLimit);
        }

        self.pairing_filter().validate()
    }

    /// Pairing bounds from configuration, with no kickoff cutoff.
    pub fn pairing_filter(&self) -> PairingFilter {
        PairingFilter {
            min_odds: self.min_odds,
            max_odds: self.max_odds,
            max_spread: self.max_spread_percent,
            as_of: None,
        }
    }

    /// Exchange source keys. The lay exchange is always included.
    pub fn exchange_keys(&self) -> ExchangeKeys {
        let mut exchanges: Vec<String> = self
            .exchange_keys
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .collect();

        if !exchanges.contains(&self.lay_exchange_key) {
            exchanges.push(self.lay_exchange_key.clone());
        }

        ExchangeKeys {
            lay_exchange: self.lay_exchange_key.clone(),
            exchanges,
        }
    }

    /// Ranking request filled with configured defaults.
    pub fn rank_request(&self) -> RankRequest {
        RankRequest {
            stake: self.default_stake,
            free_bet_value: None,
            target_odds: None,
            limit: self.recommendation_limit,
            commission: self.exchange_commission,
        }
    }

    /// Offer estimator using the configured commission.
    pub fn offer_estimator(&self) -> OfferProfitEstimator {
        OfferProfitEstimator::with_commission(self.estimator_commission)
    }
}
