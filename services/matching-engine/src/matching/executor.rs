//! Trade execution logic
//!
//! Turns a match decision into an `Execution` with a book-wide sequence
//! number. Refuses to emit an execution with an empty quantity or a
//! non-positive price.

use rust_decimal::Decimal;
use thiserror::Error;
use types::ids::{OrderId, Symbol};
use types::numeric::{Price, Quantity};
use types::order::Side;
use types::trade::{Execution, Liquidity};

/// Match executor for handling trade generation
///
/// Sequence numbers start at 1 for every book.
#[derive(Debug, Clone)]
pub struct MatchExecutor {
    sequence_counter: u64,
}

impl MatchExecutor {
    /// Get next sequence number (monotonically increasing)
    fn next_sequence(&mut self) -> u64 {
        let seq = self.sequence_counter;
        self.sequence_counter += 1;
        seq
    }

    /// Execute a fill for an aggressor order
    ///
    /// `price` is the resting order's price for book liquidity, or the
    /// reference price for a reference fill.
    #[allow(clippy::too_many_arguments)]
    pub fn execute(
        &mut self,
        symbol: Symbol,
        price: Price,
        quantity: Quantity,
        aggressor_order_id: OrderId,
        aggressor_side: Side,
        liquidity: Liquidity,
        timestamp: i64,
    ) -> Result<Execution, MatchError> {
        if quantity.is_zero() {
            return Err(MatchError::InvalidQuantity { order_id: aggressor_order_id });
        }
        if price.as_decimal() <= Decimal::ZERO {
            return Err(MatchError::InvalidPrice {
                order_id: aggressor_order_id,
                price: price.as_decimal(),
            });
        }

        let sequence = self.next_sequence();

        Ok(Execution::new(
            sequence,
            symbol,
            price,
            quantity,
            aggressor_order_id,
            aggressor_side,
            liquidity,
            timestamp,
        ))
    }
}

impl Default for MatchExecutor {
    fn default() -> Self {
        Self { sequence_counter: 1 }
    }
}

/// Match execution errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MatchError {
    #[error("refusing zero-quantity execution for order {order_id}")]
    InvalidQuantity { order_id: OrderId },

    #[error("refusing execution at invalid price {price} for order {order_id}")]
    InvalidPrice { order_id: OrderId, price: Decimal },
}
