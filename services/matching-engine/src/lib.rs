//! Matching Engine Service
//!
//! Per-symbol limit order book implementing price-time priority matching.
//!
//! **Key Invariants:**
//! - Better prices match first; equal prices match oldest-first
//! - Executions are priced at the resting order's limit price
//! - No crossed book persists after a call returns
//! - A price level exists only while at least one order rests on it
//! - Deterministic matching (same inputs → same outputs)

pub mod book;
pub mod matching;
pub mod order_book;
pub mod snapshot;

pub use order_book::{BookError, OrderBook};
pub use snapshot::{BookSnapshot, FillEstimate, LastTrade, LevelSnapshot};
