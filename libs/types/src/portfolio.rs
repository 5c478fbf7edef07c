//! Portfolio state: cash, reservations, positions and trade history
//!
//! Invariant: cash = available + reserved, with reserved covering the
//! notional of resting BUY limit orders. Engine-approved buys never take
//! cash below zero.

use crate::errors::TradingError;
use crate::ids::{OrderId, Symbol, TradeId};
use crate::numeric::Price;
use crate::position::Position;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Record of a settled fill
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub trade_id: TradeId,
    pub order_id: OrderId,
    pub symbol: Symbol,
    /// Positive for buys, negative for sells
    pub quantity: i64,
    pub price: Price,
    pub realized_pnl: Decimal,
    pub executed_at: i64,
}

impl TradeRecord {
    /// Absolute trade value
    pub fn value(&self) -> Decimal {
        (self.price.as_decimal() * Decimal::from(self.quantity)).abs()
    }
}

/// Portfolio owned by a trading engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    pub initial_capital: Decimal,
    pub cash: Decimal,
    /// Cash committed to resting BUY limit orders
    pub reserved: Decimal,
    /// Positions keyed by symbol (sorted)
    pub positions: BTreeMap<Symbol, Position>,
    pub trade_history: Vec<TradeRecord>,
}

impl Portfolio {
    /// Create a portfolio with a flat position for every tracked symbol
    pub fn new(initial_capital: Decimal, symbols: impl IntoIterator<Item = Symbol>) -> Self {
        let positions = symbols
            .into_iter()
            .map(|symbol| (symbol.clone(), Position::new(symbol)))
            .collect();
        Self {
            initial_capital,
            cash: initial_capital,
            reserved: Decimal::ZERO,
            positions,
            trade_history: Vec::new(),
        }
    }

    /// Cash not committed to resting orders
    pub fn available_cash(&self) -> Decimal {
        self.cash - self.reserved
    }

    /// Check portfolio invariant: 0 <= reserved <= cash
    pub fn check_invariant(&self) -> bool {
        self.reserved >= Decimal::ZERO && self.reserved <= self.cash
    }

    /// Commit part of the available cash
    pub fn reserve(&mut self, amount: Decimal) -> Result<(), TradingError> {
        if amount < Decimal::ZERO {
            return Err(TradingError::internal(format!("negative reservation {}", amount)));
        }
        if amount > self.available_cash() {
            return Err(TradingError::InsufficientFunds {
                required: amount,
                available: self.available_cash(),
            });
        }
        self.reserved += amount;
        Ok(())
    }

    /// Return committed cash to the available pool
    ///
    /// Releasing more than is reserved clamps at zero.
    pub fn release(&mut self, amount: Decimal) {
        self.reserved = (self.reserved - amount.max(Decimal::ZERO)).max(Decimal::ZERO);
    }

    pub fn position(&self, symbol: &Symbol) -> Option<&Position> {
        self.positions.get(symbol)
    }

    /// Get or create the position for a symbol
    pub fn position_mut(&mut self, symbol: &Symbol) -> &mut Position {
        self.positions
            .entry(symbol.clone())
            .or_insert_with(|| Position::new(symbol.clone()))
    }

    /// Signed share count held in a symbol
    pub fn quantity(&self, symbol: &Symbol) -> i64 {
        self.positions.get(symbol).map_or(0, |p| p.quantity)
    }

    /// Cumulative realized P&L across all positions
    pub fn realized_pnl(&self) -> Decimal {
        self.positions.values().map(|p| p.realized_pnl).sum()
    }
}
