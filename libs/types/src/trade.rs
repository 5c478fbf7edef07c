//! Trade execution types
//!
//! An execution is produced by the order book whenever an aggressor order
//! consumes liquidity, either from a resting order or, for market orders that
//! outrun the book, from the reference price.

use crate::ids::{OrderId, Symbol, TradeId};
use crate::numeric::{Price, Quantity};
use crate::order::Side;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Where the liquidity for an execution came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "UPPERCASE")]
pub enum Liquidity {
    /// Matched against a resting limit order
    Book { resting_order_id: OrderId },
    /// Filled against the market-data reference price (no counterparty order)
    Reference,
}

/// A single trade execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Execution {
    pub trade_id: TradeId,
    pub sequence: u64, // Per-engine monotonic sequence
    pub symbol: Symbol,
    pub price: Price,
    pub quantity: Quantity,

    // Aggressor details
    pub aggressor_order_id: OrderId,
    pub aggressor_side: Side,

    pub liquidity: Liquidity,
    pub executed_at: i64, // Unix nanos
}

impl Execution {
    /// Create a new execution
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        sequence: u64,
        symbol: Symbol,
        price: Price,
        quantity: Quantity,
        aggressor_order_id: OrderId,
        aggressor_side: Side,
        liquidity: Liquidity,
        executed_at: i64,
    ) -> Self {
        Self {
            trade_id: TradeId::new(),
            sequence,
            symbol,
            price,
            quantity,
            aggressor_order_id,
            aggressor_side,
            liquidity,
            executed_at,
        }
    }

    /// Resting order id, if the execution matched against the book
    pub fn resting_order_id(&self) -> Option<OrderId> {
        match self.liquidity {
            Liquidity::Book { resting_order_id } => Some(resting_order_id),
            Liquidity::Reference => None,
        }
    }

    /// Order id on the given side of the trade, if there is one
    pub fn order_id_for(&self, side: Side) -> Option<OrderId> {
        if side == self.aggressor_side {
            Some(self.aggressor_order_id)
        } else {
            self.resting_order_id()
        }
    }

    pub fn buy_order_id(&self) -> Option<OrderId> {
        self.order_id_for(Side::BUY)
    }

    pub fn sell_order_id(&self) -> Option<OrderId> {
        self.order_id_for(Side::SELL)
    }

    /// Calculate trade value (price × quantity)
    pub fn notional(&self) -> Decimal {
        self.price.notional(self.quantity)
    }

    /// Portfolio-perspective legs of this execution.
    ///
    /// A book match has a buy leg and a sell leg; a reference fill only has
    /// the aggressor's leg.
    pub fn fills(&self) -> Vec<Fill> {
        [Side::BUY, Side::SELL]
            .into_iter()
            .filter_map(|side| {
                self.order_id_for(side).map(|order_id| Fill {
                    trade_id: self.trade_id,
                    sequence: self.sequence,
                    order_id,
                    symbol: self.symbol.clone(),
                    side,
                    price: self.price,
                    quantity: self.quantity,
                    executed_at: self.executed_at,
                })
            })
            .collect()
    }
}

/// One side of an execution, as seen by the portfolio that owns the order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    pub trade_id: TradeId,
    /// Sequence of the execution this leg belongs to
    pub sequence: u64,
    pub order_id: OrderId,
    pub symbol: Symbol,
    pub side: Side,
    pub price: Price,
    pub quantity: Quantity,
    pub executed_at: i64,
}

impl Fill {
    /// Signed quantity: positive for buys, negative for sells. `None` when
    /// the share count does not fit in an `i64`.
    pub fn signed_quantity(&self) -> Option<i64> {
        self.quantity.as_i64().map(|qty| self.side.sign() * qty)
    }

    pub fn notional(&self) -> Decimal {
        self.price.notional(self.quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book_execution(aggressor_side: Side) -> Execution {
        Execution::new(
            7,
            Symbol::new("MSFT"),
            Price::from_u64(100),
            Quantity::new(10),
            OrderId::new(),
            aggressor_side,
            Liquidity::Book { resting_order_id: OrderId::new() },
            1708123456789000000,
        )
    }

    #[test]
    fn test_execution_order_ids() {
        let exec = book_execution(Side::SELL);

        assert_eq!(exec.sell_order_id(), Some(exec.aggressor_order_id));
        assert_eq!(exec.buy_order_id(), exec.resting_order_id());
        assert!(exec.buy_order_id().is_some());
    }

    #[test]
    fn test_execution_notional() {
        let exec = book_execution(Side::BUY);
        assert_eq!(exec.notional(), Decimal::from(1000));
    }

    #[test]
    fn test_book_execution_has_two_legs() {
        let exec = book_execution(Side::BUY);
        let fills = exec.fills();

        assert_eq!(fills.len(), 2);
        assert_eq!(fills[0].side, Side::BUY);
        assert_eq!(fills[0].order_id, exec.aggressor_order_id);
        assert_eq!(fills[1].side, Side::SELL);
        assert_eq!(fills.iter().filter_map(|f| f.signed_quantity()).sum::<i64>(), 0);
        assert!(fills.iter().all(|f| f.sequence == exec.sequence));
    }

    #[test]
    fn test_reference_execution_has_one_leg() {
        let exec = Execution::new(
            1,
            Symbol::new("TSLA"),
            Price::from_u64(178),
            Quantity::new(10),
            OrderId::new(),
            Side::BUY,
            Liquidity::Reference,
            0,
        );

        assert_eq!(exec.sell_order_id(), None);
        let fills = exec.fills();
        assert_eq!(fills.len(), 1);
        assert_eq!(fills[0].signed_quantity(), Some(10));
    }

    #[test]
    fn test_signed_quantity_out_of_range() {
        let exec = Execution::new(
            2,
            Symbol::new("TSLA"),
            Price::from_u64(1),
            Quantity::new(u64::MAX),
            OrderId::new(),
            Side::SELL,
            Liquidity::Reference,
            0,
        );

        assert_eq!(exec.fills()[0].signed_quantity(), None);
    }
}
