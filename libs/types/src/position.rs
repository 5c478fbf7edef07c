//! Position tracking types
//!
//! A position is a signed share count per symbol (positive = long) with a
//! weighted average cost basis and cumulative realized P&L.

use crate::errors::TradingError;
use crate::ids::Symbol;
use crate::numeric::{Price, Quantity};
use crate::order::Side;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Position side enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PositionSide {
    LONG,
    SHORT,
    FLAT,
}

/// Position in a single symbol
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub symbol: Symbol,
    /// Signed share count
    pub quantity: i64,
    /// Undefined (None) while flat
    pub average_cost: Option<Decimal>,
    pub realized_pnl: Decimal,
    pub updated_at: i64,
}

impl Position {
    /// Create a flat position
    pub fn new(symbol: Symbol) -> Self {
        Self {
            symbol,
            quantity: 0,
            average_cost: None,
            realized_pnl: Decimal::ZERO,
            updated_at: 0,
        }
    }

    pub fn side(&self) -> PositionSide {
        match self.quantity {
            q if q > 0 => PositionSide::LONG,
            q if q < 0 => PositionSide::SHORT,
            _ => PositionSide::FLAT,
        }
    }

    pub fn is_flat(&self) -> bool {
        self.quantity == 0
    }

    /// Apply a trade and return the P&L it realized.
    ///
    /// Opening or adding trades move the weighted average cost and realize
    /// nothing. Reducing trades realize `(price - avg) × closed × sign` and
    /// keep the average cost; a trade that crosses zero opens the remainder
    /// at the trade price. A trade that would push the share count out of
    /// `i64` range fails with `Overflow` and leaves the position untouched.
    pub fn apply_trade(
        &mut self,
        side: Side,
        quantity: Quantity,
        price: Price,
        timestamp: i64,
    ) -> Result<Decimal, TradingError> {
        let overflow = || TradingError::overflow(format!("{} position", self.symbol));
        let qty = quantity.as_i64().ok_or_else(overflow)?;
        let signed = side.sign() * qty;
        let prev = self.quantity;
        let next = prev.checked_add(signed).ok_or_else(overflow)?;
        let price_dec = price.as_decimal();

        if prev == 0 || prev.signum() == signed.signum() {
            let prev_abs = Decimal::from(prev.unsigned_abs());
            let cost = self.average_cost.unwrap_or(Decimal::ZERO) * prev_abs + price_dec * Decimal::from(qty);
            self.quantity = next;
            self.average_cost = Some(cost / Decimal::from(next.unsigned_abs()));
            self.updated_at = timestamp;
            return Ok(Decimal::ZERO);
        }

        let closed = qty.unsigned_abs().min(prev.unsigned_abs());
        let avg = self.average_cost.unwrap_or(price_dec);
        let realized = (price_dec - avg) * Decimal::from(closed) * Decimal::from(prev.signum());
        self.realized_pnl = self.realized_pnl.checked_add(realized).ok_or_else(overflow)?;
        self.quantity = next;

        if next == 0 {
            self.average_cost = None;
        } else if next.signum() != prev.signum() {
            // flipped through zero
            self.average_cost = Some(price_dec);
        }

        self.updated_at = timestamp;
        Ok(realized)
    }

    /// (price − average cost) × quantity; zero while flat
    pub fn unrealized_pnl(&self, price: Price) -> Decimal {
        match self.average_cost {
            Some(avg) if self.quantity != 0 => (price.as_decimal() - avg) * Decimal::from(self.quantity),
            _ => Decimal::ZERO,
        }
    }

    /// Signed market value at the given price
    pub fn market_value(&self, price: Price) -> Decimal {
        price.as_decimal() * Decimal::from(self.quantity)
    }

    /// Signed cost basis (quantity × average cost)
    pub fn cost_basis(&self) -> Decimal {
        self.average_cost.unwrap_or(Decimal::ZERO) * Decimal::from(self.quantity)
    }

    /// Realized plus unrealized P&L
    pub fn total_pnl(&self, price: Price) -> Decimal {
        self.realized_pnl + self.unrealized_pnl(price)
    }
}
