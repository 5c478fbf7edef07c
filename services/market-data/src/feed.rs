//! Market data feed contract

use serde::{Deserialize, Serialize};
use types::errors::DataError;
use types::ids::Symbol;
use types::numeric::Price;

/// One historical observation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bar {
    pub close: Price,
    /// Traded volume, when the source reports it
    pub volume: Option<u64>,
    /// Unix nanos
    pub timestamp: i64,
}

/// Source of current and historical prices per symbol
///
/// Implementations must be shareable across threads; the trading engine
/// holds one behind an `Arc`.
pub trait MarketDataFeed: Send + Sync {
    /// Latest trade price for `symbol`
    fn latest_price(&self, symbol: &Symbol) -> Result<Price, DataError>;

    /// Up to `lookback` most recent bars, oldest first
    ///
    /// Returns fewer bars when less history exists. An unknown symbol is
    /// `DataError::NoPrice`.
    fn history(&self, symbol: &Symbol, lookback: usize) -> Result<Vec<Bar>, DataError>;

    /// Closing prices of `history`, oldest first
    fn closes(&self, symbol: &Symbol, lookback: usize) -> Result<Vec<Price>, DataError> {
        Ok(self.history(symbol, lookback)?.into_iter().map(|bar| bar.close).collect())
    }
}

/// Take the last `lookback` entries of a series, oldest first
pub(crate) fn tail<T: Copy>(series: &[T], lookback: usize) -> Vec<T> {
    series[series.len().saturating_sub(lookback)..].to_vec()
}
