//! Simulation errors

use std::path::PathBuf;

use thiserror::Error;
use trading_engine::ConfigError;
use types::errors::{DataError, TradingError};
use types::ids::Symbol;

#[derive(Error, Debug)]
pub enum SimulationError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid simulation config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    Engine(#[from] ConfigError),

    #[error("strategy for {symbol}: {reason}")]
    InvalidStrategy { symbol: Symbol, reason: String },

    #[error("market data: {0}")]
    Feed(#[from] DataError),

    #[error(transparent)]
    Trading(#[from] TradingError),
}
