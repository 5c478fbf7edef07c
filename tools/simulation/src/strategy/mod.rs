//! Trading strategies

pub mod momentum;

pub use momentum::{momentum, MomentumConfig, MomentumStrategy, Signal, StrategyStatus};
