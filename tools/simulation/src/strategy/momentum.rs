//! Momentum strategy
//!
//! momentum = (latest close − close `window` periods earlier) / earlier close.
//! Above `threshold` is a buy signal, below `−threshold` a sell, anything
//! else (or too little history) a hold. A signal submits one market order
//! of `position_size`, capped so the position never goes beyond
//! `max_position` shares in the signal's direction.

use market_data::MarketDataFeed;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use trading_engine::{OrderRequest, TradingEngine};
use types::errors::TradingError;
use types::ids::{OrderId, Symbol};
use types::numeric::Price;
use types::order::{Order, Side};

use crate::error::SimulationError;

/// Trading signal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    Buy,
    Sell,
    #[default]
    Hold,
}

impl Signal {
    /// Order side to trade on, `None` for hold
    pub fn side(&self) -> Option<Side> {
        match self {
            Signal::Buy => Some(Side::BUY),
            Signal::Sell => Some(Side::SELL),
            Signal::Hold => None,
        }
    }

    /// Classify a momentum value; no value means hold
    pub fn from_momentum(momentum: Option<Decimal>, threshold: Decimal) -> Self {
        match momentum {
            Some(m) if m > threshold => Signal::Buy,
            Some(m) if m < -threshold => Signal::Sell,
            _ => Signal::Hold,
        }
    }
}

/// Momentum strategy parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MomentumConfig {
    pub symbol: Symbol,
    /// Lookback N in bars
    #[serde(default = "default_window")]
    pub window: usize,
    #[serde(default = "default_threshold")]
    pub threshold: Decimal,
    /// Shares per order
    #[serde(default = "default_position_size")]
    pub position_size: u64,
    /// Largest absolute position per direction; defaults to `position_size`
    #[serde(default)]
    pub max_position: Option<u64>,
}

fn default_window() -> usize {
    5
}

fn default_threshold() -> Decimal {
    Decimal::new(2, 2)
}

fn default_position_size() -> u64 {
    100
}

impl MomentumConfig {
    pub fn new(symbol: Symbol) -> Self {
        Self {
            symbol,
            window: default_window(),
            threshold: default_threshold(),
            position_size: default_position_size(),
            max_position: None,
        }
    }

    pub fn max_position(&self) -> u64 {
        self.max_position.unwrap_or(self.position_size)
    }

    pub fn validate(&self) -> Result<(), SimulationError> {
        let invalid = |reason: &str| SimulationError::InvalidStrategy {
            symbol: self.symbol.clone(),
            reason: reason.to_string(),
        };
        if self.window == 0 {
            return Err(invalid("window must be at least 1"));
        }
        if self.threshold < Decimal::ZERO {
            return Err(invalid("threshold must not be negative"));
        }
        if self.position_size == 0 {
            return Err(invalid("position size must be positive"));
        }
        if self.max_position() == 0 {
            return Err(invalid("max position must be positive"));
        }
        Ok(())
    }
}

/// Momentum over `window` periods; `None` with fewer than `window + 1` prices
pub fn momentum(prices: &[Price], window: usize) -> Option<Decimal> {
    if window == 0 || prices.len() <= window {
        return None;
    }
    let latest = prices[prices.len() - 1].as_decimal();
    let earlier = prices[prices.len() - 1 - window].as_decimal();
    Some((latest - earlier) / earlier)
}

/// Shares to trade for a signal given the current signed position
fn order_quantity(side: Side, position: i64, position_size: u64, max_position: u64) -> u64 {
    let max = i64::try_from(max_position).unwrap_or(i64::MAX);
    let headroom = match side {
        Side::BUY => max.saturating_sub(position),
        Side::SELL => max.saturating_add(position),
    };
    if headroom <= 0 {
        0
    } else {
        position_size.min(headroom as u64)
    }
}

/// Reporting view of a strategy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyStatus {
    pub symbol: Symbol,
    pub window: usize,
    pub threshold: Decimal,
    pub position_size: u64,
    pub max_position: u64,
    pub last_signal: Signal,
    pub last_momentum: Option<Decimal>,
    pub evaluations: u64,
    pub orders_submitted: usize,
    /// Signals ignored because the position was already at its limit
    pub skipped_at_limit: u64,
    /// Orders the engine refused
    pub rejected: u64,
    pub order_ids: Vec<OrderId>,
}

/// Stateless signal generation plus a log of what was submitted
#[derive(Debug, Clone)]
pub struct MomentumStrategy {
    config: MomentumConfig,
    last_signal: Signal,
    last_momentum: Option<Decimal>,
    evaluations: u64,
    skipped_at_limit: u64,
    rejected: u64,
    submitted: Vec<OrderId>,
}

impl MomentumStrategy {
    pub fn new(config: MomentumConfig) -> Result<Self, SimulationError> {
        config.validate()?;
        Ok(Self {
            config,
            last_signal: Signal::Hold,
            last_momentum: None,
            evaluations: 0,
            skipped_at_limit: 0,
            rejected: 0,
            submitted: Vec::new(),
        })
    }

    pub fn config(&self) -> &MomentumConfig {
        &self.config
    }

    pub fn symbol(&self) -> &Symbol {
        &self.config.symbol
    }

    /// Signal for a price history, oldest first
    pub fn signal(&self, prices: &[Price]) -> Signal {
        Signal::from_momentum(momentum(prices, self.config.window), self.config.threshold)
    }

    /// Read the feed, compute the signal and trade on it
    ///
    /// Returns the submitted order, or `None` on hold or when the position
    /// limit leaves no room. Feed and engine failures are returned as is.
    pub fn evaluate(
        &mut self,
        feed: &dyn MarketDataFeed,
        engine: &TradingEngine,
    ) -> Result<Option<Order>, TradingError> {
        let symbol = self.config.symbol.clone();
        let prices = feed.closes(&symbol, self.config.window + 1)?;

        let momentum = momentum(&prices, self.config.window);
        let signal = Signal::from_momentum(momentum, self.config.threshold);
        self.evaluations += 1;
        self.last_momentum = momentum;
        self.last_signal = signal;

        let Some(side) = signal.side() else {
            return Ok(None);
        };

        let position = engine.position(&symbol).quantity;
        let quantity = order_quantity(side, position, self.config.position_size, self.config.max_position());
        if quantity == 0 {
            self.skipped_at_limit += 1;
            debug!(symbol = %symbol, side = %side, position, "position limit reached");
            return Ok(None);
        }

        match engine.submit_order(OrderRequest::market(symbol.as_str(), side, quantity)) {
            Ok(order) => {
                info!(
                    symbol = %symbol,
                    side = %side,
                    quantity,
                    momentum = ?momentum,
                    order_id = %order.order_id,
                    "momentum order submitted"
                );
                self.submitted.push(order.order_id);
                Ok(Some(order))
            }
            Err(err) => {
                self.rejected += 1;
                warn!(symbol = %symbol, side = %side, error = %err, "momentum order rejected");
                Err(err)
            }
        }
    }

    /// Ids of every order this strategy submitted, oldest first
    pub fn submitted_orders(&self) -> &[OrderId] {
        &self.submitted
    }

    pub fn status(&self) -> StrategyStatus {
        StrategyStatus {
            symbol: self.config.symbol.clone(),
            window: self.config.window,
            threshold: self.config.threshold,
            position_size: self.config.position_size,
            max_position: self.config.max_position(),
            last_signal: self.last_signal,
            last_momentum: self.last_momentum,
            evaluations: self.evaluations,
            orders_submitted: self.submitted.len(),
            skipped_at_limit: self.skipped_at_limit,
            rejected: self.rejected,
            order_ids: self.submitted.clone(),
        }
    }
}
