//! Read-only views of an order book
//!
//! Snapshots are plain serialisable values handed to presentation code;
//! they never alias book state.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use types::ids::Symbol;
use types::numeric::{Price, Quantity};

/// Aggregated view of one price level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelSnapshot {
    pub price: Price,
    /// Total resting quantity at this price
    pub size: Quantity,
    pub order_count: usize,
}

/// Price and size of the most recent execution
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LastTrade {
    pub price: Price,
    pub size: Quantity,
    pub executed_at: i64,
}

/// Depth snapshot of a single symbol's book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookSnapshot {
    pub symbol: Symbol,
    /// Best bid first
    pub bids: Vec<LevelSnapshot>,
    /// Best ask first
    pub asks: Vec<LevelSnapshot>,
    pub best_bid: Option<Price>,
    pub best_ask: Option<Price>,
    pub spread: Option<Decimal>,
    pub mid_price: Option<Decimal>,
    pub last_trade: Option<LastTrade>,
}

impl BookSnapshot {
    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }
}

/// Projected outcome of sweeping one side of the book with a market order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillEstimate {
    /// Quantity the book can absorb
    pub filled: Quantity,
    /// Notional of the filled quantity at resting prices
    pub cost: Decimal,
    /// Quantity left over once the opposite side is exhausted
    pub unfilled: Quantity,
}

impl FillEstimate {
    pub fn is_complete(&self) -> bool {
        self.unfilled.is_zero()
    }

    /// Total cost if the unfilled remainder is priced at `reference`
    pub fn cost_with_reference(&self, reference: Price) -> Decimal {
        self.cost + reference.notional(self.unfilled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_estimate_with_reference() {
        let estimate = FillEstimate {
            filled: Quantity::new(5),
            cost: Decimal::from(500),
            unfilled: Quantity::new(5),
        };

        assert!(!estimate.is_complete());
        assert_eq!(estimate.cost_with_reference(Price::from_u64(110)), Decimal::from(1050));
    }

    #[test]
    fn test_snapshot_serializes_prices_as_strings() {
        let snapshot = BookSnapshot {
            symbol: Symbol::new("AAPL"),
            bids: vec![LevelSnapshot {
                price: Price::from_u64(185),
                size: Quantity::new(100),
                order_count: 2,
            }],
            asks: Vec::new(),
            best_bid: Some(Price::from_u64(185)),
            best_ask: None,
            spread: None,
            mid_price: None,
            last_trade: None,
        };

        let json = serde_json::to_string(&snapshot).unwrap();
        assert!(json.contains("\"AAPL\""));
        assert!(json.contains("\"order_count\":2"));
        assert!(!snapshot.is_empty());
    }
}
