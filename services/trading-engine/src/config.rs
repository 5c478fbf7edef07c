//! Trading engine configuration

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use types::ids::Symbol;

/// What happens to the part of a market order the book cannot fill
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketOrderPolicy {
    /// Fill the remainder at the feed's latest price
    #[default]
    ReferenceFill,
    /// Reject the whole order with `InsufficientLiquidity` before matching
    RejectUnfilled,
}

/// Trading engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Tradable symbols; one order book each
    pub symbols: Vec<Symbol>,
    /// Starting cash of the portfolio
    pub initial_capital: Decimal,
    pub market_order_policy: MarketOrderPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            symbols: ["AAPL", "MSFT", "GOOGL", "AMZN", "TSLA"]
                .into_iter()
                .map(Symbol::new)
                .collect(),
            initial_capital: Decimal::from(100_000),
            market_order_policy: MarketOrderPolicy::ReferenceFill,
        }
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("at least one symbol must be configured")]
    NoSymbols,

    #[error("initial capital must not be negative: {0}")]
    NegativeCapital(Decimal),

    #[error("symbol {0} configured more than once")]
    DuplicateSymbol(Symbol),

    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

impl EngineConfig {
    /// Parse and validate a JSON document; missing fields take defaults
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.symbols.is_empty() {
            return Err(ConfigError::NoSymbols);
        }
        if self.initial_capital < Decimal::ZERO {
            return Err(ConfigError::NegativeCapital(self.initial_capital));
        }
        for (i, symbol) in self.symbols.iter().enumerate() {
            if self.symbols[..i].contains(symbol) {
                return Err(ConfigError::DuplicateSymbol(symbol.clone()));
            }
        }
        Ok(())
    }
}
