//! Per-symbol limit order book
//!
//! Coordinates the bid and ask books with the matching executor. Incoming
//! orders sweep the opposite side while they cross, oldest order first at
//! each level, and every execution is priced at the resting order's price.
//! A limit remainder rests at the tail of its level; a market remainder is
//! filled at the caller-supplied reference price and never rests.

use std::collections::HashMap;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::debug;
use types::errors::{DataError, TradingError};
use types::ids::{OrderId, Symbol};
use types::numeric::{Price, Quantity};
use types::order::{Amendment, Order, OrderType, Side};
use types::trade::{Execution, Liquidity};

use crate::book::{AskBook, BidBook, PriceLevel};
use crate::matching::{crossing, MatchError, MatchExecutor};
use crate::snapshot::{BookSnapshot, FillEstimate, LastTrade, LevelSnapshot};

/// Order book for a single symbol
#[derive(Debug, Clone)]
pub struct OrderBook {
    symbol: Symbol,
    bids: BidBook,
    asks: AskBook,
    /// Where each resting order lives
    index: HashMap<OrderId, (Side, Price)>,
    executor: MatchExecutor,
    last_trade: Option<LastTrade>,
}

/// Order book errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BookError {
    #[error("order {0} is not resting in the book")]
    OrderNotFound(OrderId),

    #[error("no reference price to fill {unfilled} remaining shares of {symbol}")]
    NoReferencePrice { symbol: Symbol, unfilled: Quantity },

    #[error("order {order_id} routed to {book} book but is for {symbol}")]
    SymbolMismatch { order_id: OrderId, book: Symbol, symbol: Symbol },

    #[error("order {order_id} is {order_type}, not valid for this operation")]
    OrderTypeMismatch { order_id: OrderId, order_type: OrderType },

    #[error(transparent)]
    Match(#[from] MatchError),

    #[error(transparent)]
    Order(#[from] TradingError),
}

impl From<BookError> for TradingError {
    fn from(err: BookError) -> Self {
        match err {
            BookError::OrderNotFound(order_id) => TradingError::OrderNotFound {
                order_id: order_id.to_string(),
            },
            BookError::NoReferencePrice { symbol, .. } => DataError::NoPrice {
                symbol: symbol.to_string(),
            }
            .into(),
            BookError::Order(inner) => inner,
            other => TradingError::internal(other.to_string()),
        }
    }
}

impl OrderBook {
    /// Create an empty book
    pub fn new(symbol: Symbol) -> Self {
        Self {
            symbol,
            bids: BidBook::new(),
            asks: AskBook::new(),
            index: HashMap::new(),
            executor: MatchExecutor::default(),
            last_trade: None,
        }
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    /// Add a limit order: match while it crosses, then rest any remainder
    ///
    /// Fills are applied to `order` in place; resting orders that were hit
    /// are identified by each execution's liquidity.
    pub fn add_limit_order(&mut self, order: &mut Order, timestamp: i64) -> Result<Vec<Execution>, BookError> {
        self.check_symbol(order)?;
        let limit = match order.order_type {
            OrderType::Limit { price } => price,
            OrderType::Market => {
                return Err(BookError::OrderTypeMismatch {
                    order_id: order.order_id,
                    order_type: order.order_type,
                })
            }
        };

        let executions = self.sweep(order, Some(limit), timestamp)?;

        if !order.remaining_quantity.is_zero() {
            match order.side {
                Side::BUY => self.bids.insert(order.order_id, limit, order.remaining_quantity),
                Side::SELL => self.asks.insert(order.order_id, limit, order.remaining_quantity),
            }
            self.index.insert(order.order_id, (order.side, limit));
            debug!(
                symbol = %self.symbol,
                order_id = %order.order_id,
                side = %order.side,
                price = %limit,
                quantity = %order.remaining_quantity,
                "order resting"
            );
        }

        Ok(executions)
    }

    /// Add a market order: walk the opposite side, then fill any remainder
    /// at `reference`
    ///
    /// Fails without touching the book if a remainder would be left and no
    /// reference price was supplied.
    pub fn add_market_order(
        &mut self,
        order: &mut Order,
        reference: Option<Price>,
        timestamp: i64,
    ) -> Result<Vec<Execution>, BookError> {
        self.check_symbol(order)?;
        if !order.order_type.is_market() {
            return Err(BookError::OrderTypeMismatch {
                order_id: order.order_id,
                order_type: order.order_type,
            });
        }

        let estimate = self.market_fill_estimate(order.side, order.remaining_quantity);
        if !estimate.is_complete() && reference.is_none() {
            return Err(BookError::NoReferencePrice {
                symbol: self.symbol.clone(),
                unfilled: estimate.unfilled,
            });
        }

        let mut executions = self.sweep(order, None, timestamp)?;

        if let (Some(reference), false) = (reference, order.remaining_quantity.is_zero()) {
            let quantity = order.remaining_quantity;
            let execution = self.executor.execute(
                self.symbol.clone(),
                reference,
                quantity,
                order.order_id,
                order.side,
                Liquidity::Reference,
                timestamp,
            )?;
            order.add_fill(quantity, reference, timestamp)?;
            self.record_trade(&execution);
            debug!(
                symbol = %self.symbol,
                order_id = %order.order_id,
                price = %reference,
                quantity = %quantity,
                "market remainder filled at reference price"
            );
            executions.push(execution);
        }

        Ok(executions)
    }

    /// Match `order` against the opposite side while it crosses `limit`
    fn sweep(&mut self, order: &mut Order, limit: Option<Price>, timestamp: i64) -> Result<Vec<Execution>, BookError> {
        let mut executions = Vec::new();

        while !order.remaining_quantity.is_zero() {
            let best: Option<(Price, &mut PriceLevel)> = match order.side {
                Side::BUY => self.asks.best_ask_level_mut(),
                Side::SELL => self.bids.best_bid_level_mut(),
            };
            let Some((resting_price, level)) = best else {
                break;
            };
            if !crossing::incoming_can_match(order.side, limit, resting_price) {
                break;
            }
            let Some((resting_order_id, resting_quantity)) = level.peek_front() else {
                break;
            };

            let fill_quantity = order.remaining_quantity.min(resting_quantity);
            let execution = self.executor.execute(
                self.symbol.clone(),
                resting_price,
                fill_quantity,
                order.order_id,
                order.side,
                Liquidity::Book { resting_order_id },
                timestamp,
            )?;
            order.add_fill(fill_quantity, resting_price, timestamp)?;

            let left = resting_quantity.saturating_sub(fill_quantity);
            level.update_front_quantity(left);
            if left.is_zero() {
                self.index.remove(&resting_order_id);
            }
            match order.side {
                Side::BUY => self.asks.prune(resting_price),
                Side::SELL => self.bids.prune(resting_price),
            }

            debug!(
                symbol = %self.symbol,
                sequence = execution.sequence,
                aggressor = %order.order_id,
                resting = %resting_order_id,
                price = %resting_price,
                quantity = %fill_quantity,
                "execution"
            );
            self.record_trade(&execution);
            executions.push(execution);
        }

        Ok(executions)
    }

    /// Remove a resting order, returning its unfilled quantity
    pub fn cancel_order(&mut self, order_id: &OrderId) -> Result<Quantity, BookError> {
        let (side, price) = self
            .index
            .remove(order_id)
            .ok_or(BookError::OrderNotFound(*order_id))?;

        let removed = match side {
            Side::BUY => self.bids.remove(order_id, price),
            Side::SELL => self.asks.remove(order_id, price),
        };
        removed.ok_or(BookError::OrderNotFound(*order_id))
    }

    /// Change a resting limit order's quantity or price
    ///
    /// A quantity reduction at the same price is applied in place and keeps
    /// the order's queue position. Anything else removes the order and
    /// re-adds it as a fresh limit order: it goes to the back of its new
    /// level and may match if the new price crosses. `order` is updated only
    /// when the amendment succeeds.
    pub fn amend_order(
        &mut self,
        order: &mut Order,
        amendment: &Amendment,
        timestamp: i64,
    ) -> Result<Vec<Execution>, BookError> {
        self.check_symbol(order)?;
        let (side, price) = *self
            .index
            .get(&order.order_id)
            .ok_or(BookError::OrderNotFound(order.order_id))?;

        let mut amended = order.clone();
        amended.amend(amendment, timestamp)?;

        if order.keeps_priority(amendment) {
            let updated = match side {
                Side::BUY => self.bids.update_quantity(&order.order_id, price, amended.remaining_quantity),
                Side::SELL => self.asks.update_quantity(&order.order_id, price, amended.remaining_quantity),
            };
            updated.ok_or(BookError::OrderNotFound(order.order_id))?;
            debug!(
                symbol = %self.symbol,
                order_id = %order.order_id,
                quantity = %amended.remaining_quantity,
                "order reduced in place"
            );
            *order = amended;
            return Ok(Vec::new());
        }

        self.cancel_order(&order.order_id)?;
        let executions = self.add_limit_order(&mut amended, timestamp)?;
        debug!(
            symbol = %self.symbol,
            order_id = %order.order_id,
            old_price = %price,
            executions = executions.len(),
            "order re-queued"
        );
        *order = amended;
        Ok(executions)
    }

    pub fn best_bid(&self) -> Option<Price> {
        self.bids.best_bid().map(|(price, _)| price)
    }

    pub fn best_ask(&self) -> Option<Price> {
        self.asks.best_ask().map(|(price, _)| price)
    }

    /// best ask − best bid, `None` unless both sides are populated
    pub fn spread(&self) -> Option<Decimal> {
        Some(self.best_ask()?.as_decimal() - self.best_bid()?.as_decimal())
    }

    pub fn mid_price(&self) -> Option<Decimal> {
        Some((self.best_ask()?.as_decimal() + self.best_bid()?.as_decimal()) / Decimal::TWO)
    }

    /// Total resting quantity on one side
    pub fn depth(&self, side: Side) -> Quantity {
        match side {
            Side::BUY => self.bids.total_quantity(),
            Side::SELL => self.asks.total_quantity(),
        }
    }

    pub fn last_trade(&self) -> Option<LastTrade> {
        self.last_trade
    }

    /// Remaining quantity of a resting order
    pub fn resting_quantity(&self, order_id: &OrderId) -> Option<Quantity> {
        let (side, price) = self.index.get(order_id)?;
        match side {
            Side::BUY => self.bids.quantity_of(order_id, *price),
            Side::SELL => self.asks.quantity_of(order_id, *price),
        }
    }

    pub fn contains(&self, order_id: &OrderId) -> bool {
        self.index.contains_key(order_id)
    }

    /// Number of resting orders on both sides
    pub fn order_count(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }

    /// Project a market order sweep without mutating the book
    pub fn market_fill_estimate(&self, side: Side, quantity: Quantity) -> FillEstimate {
        let levels: Box<dyn Iterator<Item = (Price, &PriceLevel)> + '_> = match side {
            Side::BUY => Box::new(self.asks.levels()),
            Side::SELL => Box::new(self.bids.levels()),
        };

        let mut wanted = quantity;
        let mut cost = Decimal::ZERO;
        for (price, level) in levels {
            if wanted.is_zero() {
                break;
            }
            let take = wanted.min(level.total_quantity());
            cost += price.notional(take);
            wanted = wanted.saturating_sub(take);
        }

        FillEstimate {
            filled: quantity.saturating_sub(wanted),
            cost,
            unfilled: wanted,
        }
    }

    /// Per-level snapshot of the top `levels` prices on each side
    pub fn snapshot(&self, levels: usize) -> BookSnapshot {
        let view = |(price, level): (Price, &PriceLevel)| LevelSnapshot {
            price,
            size: level.total_quantity(),
            order_count: level.order_count(),
        };

        BookSnapshot {
            symbol: self.symbol.clone(),
            bids: self.bids.levels().take(levels).map(view).collect(),
            asks: self.asks.levels().take(levels).map(view).collect(),
            best_bid: self.best_bid(),
            best_ask: self.best_ask(),
            spread: self.spread(),
            mid_price: self.mid_price(),
            last_trade: self.last_trade,
        }
    }

    fn check_symbol(&self, order: &Order) -> Result<(), BookError> {
        if order.symbol != self.symbol {
            return Err(BookError::SymbolMismatch {
                order_id: order.order_id,
                book: self.symbol.clone(),
                symbol: order.symbol.clone(),
            });
        }
        Ok(())
    }

    fn record_trade(&mut self, execution: &Execution) {
        self.last_trade = Some(LastTrade {
            price: execution.price,
            size: execution.quantity,
            executed_at: execution.executed_at,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::errors::ValidationError;
    use types::order::OrderStatus;

    fn symbol() -> Symbol {
        Symbol::new("AAPL")
    }

    fn limit(side: Side, price: u64, qty: u64) -> Order {
        Order::new(
            0,
            symbol(),
            side,
            OrderType::Limit { price: Price::from_u64(price) },
            Quantity::new(qty),
            1708123456789000000,
        )
    }

    fn market(side: Side, qty: u64) -> Order {
        Order::new(0, symbol(), side, OrderType::Market, Quantity::new(qty), 1708123456789000000)
    }

    #[test]
    fn test_book_resting_order() {
        let mut book = OrderBook::new(symbol());
        let mut order = limit(Side::BUY, 100, 10);

        let executions = book.add_limit_order(&mut order, 1).unwrap();

        assert!(executions.is_empty());
        assert_eq!(order.status, OrderStatus::New);
        assert_eq!(book.best_bid(), Some(Price::from_u64(100)));
        assert_eq!(book.resting_quantity(&order.order_id), Some(Quantity::new(10)));
    }

    #[test]
    fn test_book_full_match() {
        let mut book = OrderBook::new(symbol());
        let mut buy = limit(Side::BUY, 100, 10);
        book.add_limit_order(&mut buy, 1).unwrap();

        let mut sell = limit(Side::SELL, 100, 10);
        let executions = book.add_limit_order(&mut sell, 2).unwrap();

        assert_eq!(executions.len(), 1);
        assert_eq!(executions[0].quantity, Quantity::new(10));
        assert_eq!(executions[0].buy_order_id(), Some(buy.order_id));
        assert_eq!(executions[0].sell_order_id(), Some(sell.order_id));
        assert_eq!(sell.status, OrderStatus::Filled);
        assert!(book.is_empty());
        assert_eq!(book.order_count(), 0);
    }

    #[test]
    fn test_execution_uses_resting_price() {
        let mut book = OrderBook::new(symbol());
        let mut ask = limit(Side::SELL, 99, 5);
        book.add_limit_order(&mut ask, 1).unwrap();

        let mut bid = limit(Side::BUY, 105, 5);
        let executions = book.add_limit_order(&mut bid, 2).unwrap();

        assert_eq!(executions[0].price, Price::from_u64(99));
        assert_eq!(bid.average_price, Some(Decimal::from(99)));
    }

    #[test]
    fn test_book_partial_match_rests_remainder() {
        let mut book = OrderBook::new(symbol());
        let mut sell = limit(Side::SELL, 100, 4);
        book.add_limit_order(&mut sell, 1).unwrap();

        let mut buy = limit(Side::BUY, 100, 10);
        let executions = book.add_limit_order(&mut buy, 2).unwrap();

        assert_eq!(executions.len(), 1);
        assert_eq!(buy.status, OrderStatus::PartiallyFilled);
        assert_eq!(book.resting_quantity(&buy.order_id), Some(Quantity::new(6)));
        assert_eq!(book.best_ask(), None);
        assert_eq!(book.best_bid(), Some(Price::from_u64(100)));
    }

    #[test]
    fn test_book_no_cross() {
        let mut book = OrderBook::new(symbol());
        let mut sell = limit(Side::SELL, 101, 10);
        book.add_limit_order(&mut sell, 1).unwrap();

        let mut buy = limit(Side::BUY, 100, 10);
        let executions = book.add_limit_order(&mut buy, 2).unwrap();

        assert!(executions.is_empty());
        assert_eq!(book.spread(), Some(Decimal::ONE));
        assert_eq!(book.mid_price(), Some(Decimal::from_str_exact("100.5").unwrap()));
    }

    #[test]
    fn test_sweep_walks_levels_in_price_order() {
        let mut book = OrderBook::new(symbol());
        for (price, qty) in [(102, 5), (100, 5), (101, 5)] {
            book.add_limit_order(&mut limit(Side::SELL, price, qty), 1).unwrap();
        }

        let mut buy = limit(Side::BUY, 101, 12);
        let executions = book.add_limit_order(&mut buy, 2).unwrap();

        let prices: Vec<Price> = executions.iter().map(|e| e.price).collect();
        assert_eq!(prices, vec![Price::from_u64(100), Price::from_u64(101)]);
        // 10 filled, 2 rest at 101 below the remaining ask at 102
        assert_eq!(buy.filled_quantity, Quantity::new(10));
        assert_eq!(book.best_bid(), Some(Price::from_u64(101)));
        assert_eq!(book.best_ask(), Some(Price::from_u64(102)));
    }

    #[test]
    fn test_market_order_walks_book_then_reference() {
        let mut book = OrderBook::new(symbol());
        book.add_limit_order(&mut limit(Side::SELL, 100, 4), 1).unwrap();

        let mut order = market(Side::BUY, 10);
        let executions = book
            .add_market_order(&mut order, Some(Price::from_u64(110)), 2)
            .unwrap();

        assert_eq!(executions.len(), 2);
        assert!(executions[0].resting_order_id().is_some());
        assert_eq!(executions[1].liquidity, Liquidity::Reference);
        assert_eq!(executions[1].quantity, Quantity::new(6));
        assert_eq!(order.status, OrderStatus::Filled);
        assert_eq!(order.filled_value(), Decimal::from(1060));
        assert!(!book.contains(&order.order_id));
    }

    #[test]
    fn test_market_order_without_reference_leaves_book_untouched() {
        let mut book = OrderBook::new(symbol());
        let mut ask = limit(Side::SELL, 100, 4);
        book.add_limit_order(&mut ask, 1).unwrap();

        let mut order = market(Side::BUY, 10);
        let err = book.add_market_order(&mut order, None, 2).unwrap_err();

        assert!(matches!(err, BookError::NoReferencePrice { unfilled, .. } if unfilled == Quantity::new(6)));
        assert_eq!(order.status, OrderStatus::New);
        assert_eq!(book.resting_quantity(&ask.order_id), Some(Quantity::new(4)));
    }

    #[test]
    fn test_market_order_filled_by_book_needs_no_reference() {
        let mut book = OrderBook::new(symbol());
        book.add_limit_order(&mut limit(Side::BUY, 100, 10), 1).unwrap();

        let mut order = market(Side::SELL, 10);
        let executions = book.add_market_order(&mut order, None, 2).unwrap();

        assert_eq!(executions.len(), 1);
        assert_eq!(order.status, OrderStatus::Filled);
    }

    #[test]
    fn test_cancel_order() {
        let mut book = OrderBook::new(symbol());
        let mut order = limit(Side::SELL, 100, 10);
        book.add_limit_order(&mut order, 1).unwrap();

        assert_eq!(book.cancel_order(&order.order_id), Ok(Quantity::new(10)));
        assert!(book.is_empty());
        assert_eq!(
            book.cancel_order(&order.order_id),
            Err(BookError::OrderNotFound(order.order_id))
        );
    }

    #[test]
    fn test_wrong_order_type_is_rejected() {
        let mut book = OrderBook::new(symbol());
        let mut order = market(Side::BUY, 1);
        assert!(matches!(
            book.add_limit_order(&mut order, 1),
            Err(BookError::OrderTypeMismatch { .. })
        ));
    }

    #[test]
    fn test_symbol_mismatch_is_rejected() {
        let mut book = OrderBook::new(Symbol::new("MSFT"));
        let mut order = limit(Side::BUY, 100, 1);
        assert!(matches!(
            book.add_limit_order(&mut order, 1),
            Err(BookError::SymbolMismatch { .. })
        ));
    }

    #[test]
    fn test_market_fill_estimate() {
        let mut book = OrderBook::new(symbol());
        book.add_limit_order(&mut limit(Side::SELL, 100, 5), 1).unwrap();
        book.add_limit_order(&mut limit(Side::SELL, 102, 5), 1).unwrap();

        let estimate = book.market_fill_estimate(Side::BUY, Quantity::new(8));
        assert_eq!(estimate.filled, Quantity::new(8));
        assert_eq!(estimate.cost, Decimal::from(500 + 306));
        assert!(estimate.is_complete());

        let estimate = book.market_fill_estimate(Side::BUY, Quantity::new(15));
        assert_eq!(estimate.unfilled, Quantity::new(5));
    }

    #[test]
    fn test_snapshot_and_last_trade() {
        let mut book = OrderBook::new(symbol());
        book.add_limit_order(&mut limit(Side::BUY, 99, 5), 1).unwrap();
        book.add_limit_order(&mut limit(Side::BUY, 99, 7), 1).unwrap();
        book.add_limit_order(&mut limit(Side::SELL, 101, 3), 1).unwrap();
        book.add_limit_order(&mut limit(Side::SELL, 99, 2), 2).unwrap();

        let snapshot = book.snapshot(5);
        assert_eq!(snapshot.bids.len(), 1);
        assert_eq!(snapshot.bids[0].size, Quantity::new(10));
        assert_eq!(snapshot.bids[0].order_count, 2);
        assert_eq!(snapshot.asks[0].price, Price::from_u64(101));
        assert_eq!(snapshot.spread, Some(Decimal::from(2)));

        let last = snapshot.last_trade.unwrap();
        assert_eq!(last.price, Price::from_u64(99));
        assert_eq!(last.size, Quantity::new(2));
        assert_eq!(book.depth(Side::BUY), Quantity::new(10));
        assert_eq!(book.depth(Side::SELL), Quantity::new(3));
    }

    #[test]
    fn test_book_error_converts_to_trading_error() {
        let err: TradingError = BookError::OrderNotFound(OrderId::new()).into();
        assert!(matches!(err, TradingError::OrderNotFound { .. }));

        let err: TradingError = BookError::NoReferencePrice {
            symbol: symbol(),
            unfilled: Quantity::new(1),
        }
        .into();
        assert!(matches!(err, TradingError::DataUnavailable(DataError::NoPrice { .. })));

        let err: TradingError = BookError::Match(MatchError::InvalidQuantity { order_id: OrderId::new() }).into();
        assert!(matches!(err, TradingError::Internal { .. }));
    }

    fn rest(book: &mut OrderBook, side: Side, price: u64, qty: u64) -> Order {
        let mut order = limit(side, price, qty);
        book.add_limit_order(&mut order, 1).unwrap();
        order
    }

    fn resting_ids_hit(book: &mut OrderBook, side: Side, price: u64, qty: u64) -> Vec<OrderId> {
        let mut incoming = limit(side, price, qty);
        book.add_limit_order(&mut incoming, 9)
            .unwrap()
            .iter()
            .filter_map(Execution::resting_order_id)
            .collect()
    }

    #[test]
    fn test_amend_reduction_keeps_priority() {
        let mut book = OrderBook::new(symbol());
        let mut first = rest(&mut book, Side::SELL, 100, 10);
        let second = rest(&mut book, Side::SELL, 100, 10);

        let executions = book.amend_order(&mut first, &Amendment::quantity(4), 2).unwrap();

        assert!(executions.is_empty());
        assert_eq!(first.remaining_quantity, Quantity::new(4));
        assert_eq!(book.resting_quantity(&first.order_id), Some(Quantity::new(4)));
        assert_eq!(book.depth(Side::SELL), Quantity::new(14));
        assert_eq!(
            resting_ids_hit(&mut book, Side::BUY, 100, 6),
            vec![first.order_id, second.order_id]
        );
    }

    #[test]
    fn test_amend_increase_loses_priority() {
        let mut book = OrderBook::new(symbol());
        let mut first = rest(&mut book, Side::SELL, 100, 10);
        let second = rest(&mut book, Side::SELL, 100, 10);

        book.amend_order(&mut first, &Amendment::quantity(15), 2).unwrap();

        assert_eq!(book.resting_quantity(&first.order_id), Some(Quantity::new(15)));
        assert_eq!(resting_ids_hit(&mut book, Side::BUY, 100, 10), vec![second.order_id]);
    }

    #[test]
    fn test_amend_price_moves_to_back_of_new_level() {
        let mut book = OrderBook::new(symbol());
        let mut moved = rest(&mut book, Side::SELL, 101, 5);
        let waiting = rest(&mut book, Side::SELL, 100, 5);

        book.amend_order(&mut moved, &Amendment::price(Price::from_u64(100)), 2).unwrap();

        assert_eq!(moved.limit_price(), Some(Price::from_u64(100)));
        assert_eq!(book.best_ask(), Some(Price::from_u64(100)));
        assert_eq!(book.snapshot(5).asks.len(), 1);
        assert_eq!(
            resting_ids_hit(&mut book, Side::BUY, 100, 10),
            vec![waiting.order_id, moved.order_id]
        );
    }

    #[test]
    fn test_amend_to_crossing_price_matches() {
        let mut book = OrderBook::new(symbol());
        let mut bid = rest(&mut book, Side::BUY, 99, 10);
        let ask = rest(&mut book, Side::SELL, 101, 4);

        let executions = book.amend_order(&mut bid, &Amendment::price(Price::from_u64(102)), 2).unwrap();

        assert_eq!(executions.len(), 1);
        assert_eq!(executions[0].price, Price::from_u64(101));
        assert_eq!(executions[0].resting_order_id(), Some(ask.order_id));
        assert_eq!(bid.status, OrderStatus::PartiallyFilled);
        assert_eq!(book.best_bid(), Some(Price::from_u64(102)));
        assert_eq!(book.resting_quantity(&bid.order_id), Some(Quantity::new(6)));
        assert_eq!(book.best_ask(), None);
    }

    #[test]
    fn test_amend_failures_leave_book_unchanged() {
        let mut book = OrderBook::new(symbol());
        let mut bid = rest(&mut book, Side::BUY, 100, 10);
        resting_ids_hit(&mut book, Side::SELL, 100, 4);
        bid.add_fill(Quantity::new(4), Price::from_u64(100), 2).unwrap();

        let err = book.amend_order(&mut bid, &Amendment::quantity(4), 3).unwrap_err();
        assert!(matches!(
            TradingError::from(err),
            TradingError::Validation(ValidationError::AmendBelowFilled { filled: 4 })
        ));
        assert_eq!(bid.remaining_quantity, Quantity::new(6));
        assert_eq!(book.resting_quantity(&bid.order_id), Some(Quantity::new(6)));

        let mut stranger = limit(Side::BUY, 100, 1);
        let err = book.amend_order(&mut stranger, &Amendment::quantity(2), 3).unwrap_err();
        assert_eq!(err, BookError::OrderNotFound(stranger.order_id));
    }

    #[test]
    fn test_extreme_resting_sizes_and_prices_do_not_panic() {
        let mut book = OrderBook::new(symbol());
        let huge = u64::MAX / 2 + 1;
        let top = types::numeric::MAX_PRICE;
        rest(&mut book, Side::SELL, top, huge);
        rest(&mut book, Side::SELL, top, huge);

        assert_eq!(book.depth(Side::SELL), Quantity::new(u64::MAX));

        let estimate = book.market_fill_estimate(Side::BUY, Quantity::new(u64::MAX));
        assert!(estimate.is_complete());
        assert_eq!(estimate.cost, Price::from_u64(top).notional(Quantity::new(u64::MAX)));
    }
}
