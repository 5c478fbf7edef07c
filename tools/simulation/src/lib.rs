//! Strategy Simulation
//!
//! Drives the trading engine with a seeded synthetic feed and one or more
//! momentum strategies, then reports what the portfolio ended up with.
//!
//! # Modules
//! - `config`: Simulation configuration loaded from JSON
//! - `error`: Simulation error type
//! - `strategy`: Momentum signal generation and order submission
//! - `runner`: Tick loop over the feed, engine and strategies
//! - `report`: End-of-run summary, as text or JSON

pub mod config;
pub mod error;
pub mod report;
pub mod runner;
pub mod strategy;

pub use config::SimulationConfig;
pub use error::SimulationError;
pub use report::SimulationReport;
pub use runner::Simulation;
pub use strategy::{MomentumConfig, MomentumStrategy, Signal, StrategyStatus};

/// Crate version constant
pub const VERSION: &str = "0.1.0";
