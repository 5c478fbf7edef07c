//! Simulation configuration

use std::fs;
use std::path::Path;

use market_data::FeedConfig;
use serde::{Deserialize, Serialize};
use trading_engine::EngineConfig;
use types::ids::Symbol;

use crate::error::SimulationError;
use crate::strategy::MomentumConfig;

/// Everything needed to run one simulation
///
/// Every field has a default, so a JSON file only needs the parts it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub engine: EngineConfig,
    pub feed: FeedConfig,
    /// Feed ticks to run
    pub ticks: usize,
    pub strategies: Vec<MomentumConfig>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            feed: FeedConfig::default(),
            ticks: 100,
            strategies: ["AAPL", "TSLA"]
                .into_iter()
                .map(|s| MomentumConfig::new(Symbol::new(s)))
                .collect(),
        }
    }
}

impl SimulationConfig {
    pub fn from_json(json: &str) -> Result<Self, SimulationError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SimulationError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| SimulationError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Engine settings are valid and every strategy trades a tracked symbol
    pub fn validate(&self) -> Result<(), SimulationError> {
        self.engine.validate()?;
        for strategy in &self.strategies {
            strategy.validate()?;
            if !self.engine.symbols.contains(&strategy.symbol) {
                return Err(SimulationError::InvalidStrategy {
                    symbol: strategy.symbol.clone(),
                    reason: "symbol is not traded by the engine".to_string(),
                });
            }
        }
        Ok(())
    }
}
