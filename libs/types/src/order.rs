//! Order lifecycle types
//!
//! An order moves `New → PartiallyFilled → Filled`, or to `Cancelled` from
//! either non-terminal state. `Filled` and `Cancelled` are terminal.

use crate::errors::{TradingError, ValidationError};
use crate::ids::{OrderId, Symbol};
use crate::numeric::{Price, Quantity};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Order side (buyer or seller)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Buy order (bid)
    BUY,
    /// Sell order (ask)
    SELL,
}

impl Side {
    /// Get the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            Side::BUY => Side::SELL,
            Side::SELL => Side::BUY,
        }
    }

    /// +1 for buys, -1 for sells
    pub fn sign(&self) -> i64 {
        match self {
            Side::BUY => 1,
            Side::SELL => -1,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::BUY => write!(f, "BUY"),
            Side::SELL => write!(f, "SELL"),
        }
    }
}

/// Order type. The limit price only exists on limit orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum OrderType {
    /// Execute immediately against the book; never rests
    Market,
    /// Execute at the limit price or better; any remainder rests
    Limit { price: Price },
}

impl OrderType {
    pub fn limit_price(&self) -> Option<Price> {
        match self {
            OrderType::Market => None,
            OrderType::Limit { price } => Some(*price),
        }
    }

    pub fn is_market(&self) -> bool {
        matches!(self, OrderType::Market)
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderType::Market => write!(f, "MARKET"),
            OrderType::Limit { price } => write!(f, "LIMIT@{}", price),
        }
    }
}

/// Order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Accepted, nothing filled yet
    New,
    /// Some quantity filled, remainder open
    PartiallyFilled,
    /// Completely matched (terminal)
    Filled,
    /// Cancelled by explicit request (terminal)
    Cancelled,
}

impl OrderStatus {
    /// Check if status is terminal (no further transitions possible)
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Filled | OrderStatus::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OrderStatus::New => "NEW",
            OrderStatus::PartiallyFilled => "PARTIALLY_FILLED",
            OrderStatus::Filled => "FILLED",
            OrderStatus::Cancelled => "CANCELLED",
        };
        f.write_str(label)
    }
}

/// Requested change to a resting limit order
///
/// `quantity` is the new total order size, shares already filled included.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Amendment {
    pub quantity: Option<Quantity>,
    pub price: Option<Price>,
}

impl Amendment {
    pub fn quantity(quantity: u64) -> Self {
        Self {
            quantity: Some(Quantity::new(quantity)),
            price: None,
        }
    }

    pub fn price(price: Price) -> Self {
        Self {
            quantity: None,
            price: Some(price),
        }
    }
}

/// Complete order structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    /// Arrival sequence assigned by the engine; defines time priority
    pub sequence: u64,
    pub symbol: Symbol,
    pub side: Side,
    pub order_type: OrderType,
    pub quantity: Quantity,
    pub filled_quantity: Quantity,
    pub remaining_quantity: Quantity,
    /// Volume-weighted fill price, `None` until the first fill
    pub average_price: Option<Decimal>,
    pub status: OrderStatus,
    pub created_at: i64, // Unix nanos
    pub updated_at: i64, // Unix nanos
    filled_value: Decimal,
}

impl Order {
    /// Create a new order in `New` status
    pub fn new(
        sequence: u64,
        symbol: Symbol,
        side: Side,
        order_type: OrderType,
        quantity: Quantity,
        timestamp: i64,
    ) -> Self {
        Self {
            order_id: OrderId::new(),
            sequence,
            symbol,
            side,
            order_type,
            quantity,
            filled_quantity: Quantity::zero(),
            remaining_quantity: quantity,
            average_price: None,
            status: OrderStatus::New,
            created_at: timestamp,
            updated_at: timestamp,
            filled_value: Decimal::ZERO,
        }
    }

    pub fn limit_price(&self) -> Option<Price> {
        self.order_type.limit_price()
    }

    /// Check quantity invariant: filled + remaining = total
    pub fn check_invariant(&self) -> bool {
        self.filled_quantity + self.remaining_quantity == self.quantity
            && (self.status == OrderStatus::Filled) == (self.filled_quantity == self.quantity)
    }

    /// Check if order is completely filled
    pub fn is_filled(&self) -> bool {
        self.filled_quantity == self.quantity
    }

    /// Check if order has any fills
    pub fn has_fills(&self) -> bool {
        !self.filled_quantity.is_zero()
    }

    /// Notional value filled so far
    pub fn filled_value(&self) -> Decimal {
        self.filled_value
    }

    /// Record a fill and advance the status
    ///
    /// Fails without mutating the order if it is terminal, the fill is
    /// empty, or the fill would exceed the order quantity.
    pub fn add_fill(&mut self, fill_quantity: Quantity, price: Price, timestamp: i64) -> Result<(), TradingError> {
        if self.status.is_terminal() {
            return Err(TradingError::internal(format!(
                "fill on terminal order {} ({})",
                self.order_id, self.status
            )));
        }
        let remaining = self
            .remaining_quantity
            .checked_sub(fill_quantity)
            .filter(|_| !fill_quantity.is_zero())
            .ok_or_else(|| {
                TradingError::internal(format!(
                    "fill of {} exceeds remaining {} on order {}",
                    fill_quantity, self.remaining_quantity, self.order_id
                ))
            })?;

        self.filled_quantity += fill_quantity;
        self.remaining_quantity = remaining;
        self.filled_value += price.notional(fill_quantity);
        self.average_price = Some(self.filled_value / self.filled_quantity.as_decimal());

        self.status = if self.is_filled() {
            OrderStatus::Filled
        } else {
            OrderStatus::PartiallyFilled
        };
        self.updated_at = timestamp;

        debug_assert!(self.check_invariant(), "Invariant violated after fill");
        Ok(())
    }

    /// Whether `amendment` lets the order keep its place in the queue.
    ///
    /// Only a quantity reduction at an unchanged price does.
    pub fn keeps_priority(&self, amendment: &Amendment) -> bool {
        let same_price = amendment.price.map_or(true, |price| Some(price) == self.limit_price());
        let not_larger = amendment.quantity.map_or(true, |quantity| quantity <= self.quantity);
        same_price && not_larger
    }

    /// Apply an amendment to a live limit order
    ///
    /// The order must keep some open quantity; fails without mutating the
    /// order otherwise.
    pub fn amend(&mut self, amendment: &Amendment, timestamp: i64) -> Result<(), TradingError> {
        if self.status.is_terminal() {
            return Err(TradingError::InvalidState {
                order_id: self.order_id.to_string(),
                status: self.status.to_string(),
            });
        }
        let OrderType::Limit { price } = self.order_type else {
            return Err(TradingError::internal(format!("market order {} cannot be amended", self.order_id)));
        };

        let quantity = amendment.quantity.unwrap_or(self.quantity);
        let remaining = quantity
            .checked_sub(self.filled_quantity)
            .filter(|remaining| !remaining.is_zero())
            .ok_or(ValidationError::AmendBelowFilled {
                filled: self.filled_quantity.as_u64(),
            })?;

        self.quantity = quantity;
        self.remaining_quantity = remaining;
        self.order_type = OrderType::Limit {
            price: amendment.price.unwrap_or(price),
        };
        self.updated_at = timestamp;

        debug_assert!(self.check_invariant(), "Invariant violated after amend");
        Ok(())
    }

    /// Cancel the order
    ///
    /// Terminal orders cannot be cancelled.
    pub fn cancel(&mut self, timestamp: i64) -> Result<(), TradingError> {
        if self.status.is_terminal() {
            return Err(TradingError::InvalidState {
                order_id: self.order_id.to_string(),
                status: self.status.to_string(),
            });
        }
        self.status = OrderStatus::Cancelled;
        self.updated_at = timestamp;
        Ok(())
    }
}
