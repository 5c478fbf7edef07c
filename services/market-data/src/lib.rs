//! Market Data Feed
//!
//! The contract the trading core consumes for reference prices and price
//! history, plus two collaborators that implement it:
//! - `InMemoryFeed`: scripted prices, for tests and embedding
//! - `SyntheticFeed`: seeded random walk with market scenarios
//!
//! Feeds never retry; failures surface as `DataError` to the caller.

pub mod feed;
pub mod in_memory;
pub mod synthetic;

pub use feed::{Bar, MarketDataFeed};
pub use in_memory::InMemoryFeed;
pub use synthetic::{FeedConfig, Scenario, SyntheticFeed};

// Library version
pub const SERVICE_VERSION: &str = "0.1.0";
