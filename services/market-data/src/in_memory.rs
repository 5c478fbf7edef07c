//! Scripted in-memory feed

use std::collections::HashMap;

use parking_lot::RwLock;
use types::clock::now_nanos;
use types::errors::DataError;
use types::ids::Symbol;
use types::numeric::Price;

use crate::feed::{tail, Bar, MarketDataFeed};

/// Feed backed by explicitly pushed prices
///
/// Prices can be appended while the feed is shared, so tests can move the
/// market between engine calls.
#[derive(Debug, Default)]
pub struct InMemoryFeed {
    series: RwLock<HashMap<Symbol, Vec<Bar>>>,
}

impl InMemoryFeed {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a feed with one closing-price series per symbol
    pub fn with_closes<I>(series: I) -> Self
    where
        I: IntoIterator<Item = (Symbol, Vec<Price>)>,
    {
        let feed = Self::new();
        for (symbol, closes) in series {
            for close in closes {
                feed.push(&symbol, close);
            }
        }
        feed
    }

    /// Append a close with no volume
    pub fn push(&self, symbol: &Symbol, close: Price) {
        self.push_bar(
            symbol,
            Bar {
                close,
                volume: None,
                timestamp: now_nanos(),
            },
        );
    }

    pub fn push_bar(&self, symbol: &Symbol, bar: Bar) {
        self.series.write().entry(symbol.clone()).or_default().push(bar);
    }

    /// Append a raw external value; missing or unusable values are rejected
    pub fn push_external(&self, symbol: &Symbol, close: Option<f64>) -> Result<Price, DataError> {
        let price = Price::from_external(close).ok_or_else(|| DataError::InvalidField {
            symbol: symbol.to_string(),
            field: "close".to_string(),
        })?;
        self.push(symbol, price);
        Ok(price)
    }

    /// Forget everything known about a symbol
    pub fn clear(&self, symbol: &Symbol) {
        self.series.write().remove(symbol);
    }
}

impl MarketDataFeed for InMemoryFeed {
    fn latest_price(&self, symbol: &Symbol) -> Result<Price, DataError> {
        self.series
            .read()
            .get(symbol)
            .and_then(|bars| bars.last())
            .map(|bar| bar.close)
            .ok_or_else(|| DataError::NoPrice {
                symbol: symbol.to_string(),
            })
    }

    fn history(&self, symbol: &Symbol, lookback: usize) -> Result<Vec<Bar>, DataError> {
        let series = self.series.read();
        match series.get(symbol) {
            Some(bars) if !bars.is_empty() => Ok(tail(bars, lookback)),
            _ => Err(DataError::NoPrice {
                symbol: symbol.to_string(),
            }),
        }
    }
}
