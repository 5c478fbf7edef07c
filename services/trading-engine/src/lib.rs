//! Trading Engine Service
//!
//! Single point of order intake for one portfolio:
//! - Validation of symbol, quantity and funds before an order exists
//! - Routing to the per-symbol order book (limit and market orders)
//! - Cancellation and amendment of resting limit orders
//! - Settlement of every execution through the Position Manager
//! - Order registry queries and presentation snapshots
//!
//! All matching and settlement happens inline within `submit_order` and
//! `amend_order`.
//! Locks are taken in the order book → registry → portfolio.

pub mod config;
pub mod engine;
pub mod positions;
pub mod snapshot;
pub mod validator;

pub use config::{ConfigError, EngineConfig, MarketOrderPolicy};
pub use engine::{OrderRequest, TradingEngine};
pub use positions::{PositionManager, PriceMap};
pub use snapshot::{PortfolioSummary, PositionSummary};
