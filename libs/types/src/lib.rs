//! Types library for the order book simulator
//!
//! Core type definitions shared by the matching engine, the trading engine,
//! the market-data feeds and the simulation tooling.
//!
//! # Modules
//! - `ids`: Unique identifiers (OrderId, TradeId) and validated symbols
//! - `numeric`: Fixed-point price and integer quantity types
//! - `order`: Order lifecycle types
//! - `trade`: Trade execution types
//! - `position`: Per-symbol position tracking
//! - `portfolio`: Cash, reservations, positions and trade history
//! - `clock`: Wall-clock timestamps in Unix nanos
//! - `errors`: Error taxonomy

pub mod ids;
pub mod numeric;
pub mod order;
pub mod trade;
pub mod position;
pub mod portfolio;
pub mod clock;
pub mod errors;

// Library version constant
pub const LIB_VERSION: &str = "1.0.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::ids::*;
    pub use crate::numeric::*;
    pub use crate::order::*;
    pub use crate::trade::*;
    pub use crate::position::*;
    pub use crate::portfolio::*;
    pub use crate::errors::*;
}
