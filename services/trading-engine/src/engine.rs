//! Trading Engine: order intake and orchestration
//!
//! Validates requests, routes them to the symbol's order book and settles
//! every execution through the position manager, all within one call.
//!
//! Locking: one mutex per symbol book, one over the order registry and one
//! over the portfolio. They are always taken in that order. The arrival
//! sequence is drawn while the book lock is held, so for any one symbol the
//! order of calls is the time priority used for matching.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use market_data::MarketDataFeed;
use matching_engine::{BookSnapshot, OrderBook};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use types::clock::now_nanos;
use types::errors::{TradingError, ValidationError};
use types::ids::{OrderId, Symbol};
use types::numeric::{Price, Quantity};
use types::order::{Amendment, Order, OrderStatus, OrderType, Side};
use types::position::Position;
use types::trade::Execution;

use crate::config::{ConfigError, EngineConfig, MarketOrderPolicy};
use crate::positions::{PositionManager, PriceMap};
use crate::snapshot::PortfolioSummary;
use crate::validator;

/// An order as submitted by a caller, before validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub symbol: String,
    pub side: Side,
    pub order_type: OrderType,
    pub quantity: u64,
}

impl OrderRequest {
    pub fn market(symbol: impl Into<String>, side: Side, quantity: u64) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            order_type: OrderType::Market,
            quantity,
        }
    }

    pub fn limit(symbol: impl Into<String>, side: Side, price: Price, quantity: u64) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            order_type: OrderType::Limit { price },
            quantity,
        }
    }
}

/// Trading engine service
///
/// Owns one order book per configured symbol, the registry of every order
/// it has accepted and the portfolio those orders trade for.
pub struct TradingEngine {
    config: EngineConfig,
    feed: Arc<dyn MarketDataFeed>,
    books: HashMap<Symbol, Mutex<OrderBook>>,
    registry: Mutex<HashMap<OrderId, Order>>,
    positions: Mutex<PositionManager>,
    sequence: AtomicU64,
}

impl TradingEngine {
    /// Create an engine with an empty book per configured symbol
    pub fn new(config: EngineConfig, feed: Arc<dyn MarketDataFeed>) -> Result<Self, ConfigError> {
        config.validate()?;

        let books = config
            .symbols
            .iter()
            .map(|symbol| (symbol.clone(), Mutex::new(OrderBook::new(symbol.clone()))))
            .collect();
        let positions = PositionManager::new(config.initial_capital, config.symbols.iter().cloned());

        info!(
            symbols = config.symbols.len(),
            initial_capital = %config.initial_capital,
            policy = ?config.market_order_policy,
            "trading engine started"
        );

        Ok(Self {
            config,
            feed,
            books,
            registry: Mutex::new(HashMap::new()),
            positions: Mutex::new(positions),
            sequence: AtomicU64::new(1),
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn feed(&self) -> &Arc<dyn MarketDataFeed> {
        &self.feed
    }

    /// Tracked symbols in configuration order
    pub fn symbols(&self) -> &[Symbol] {
        &self.config.symbols
    }

    pub fn is_tracked(&self, symbol: &Symbol) -> bool {
        self.books.contains_key(symbol)
    }

    /// Validate, match and settle an order
    ///
    /// Returns the order in whatever state matching left it. Nothing is
    /// created when an error is returned.
    pub fn submit_order(&self, request: OrderRequest) -> Result<Order, TradingError> {
        match self.try_submit(&request) {
            Ok(order) => {
                info!(
                    order_id = %order.order_id,
                    symbol = %order.symbol,
                    side = %order.side,
                    order_type = %order.order_type,
                    quantity = %order.quantity,
                    filled = %order.filled_quantity,
                    status = %order.status,
                    "order accepted"
                );
                Ok(order)
            }
            Err(err) => {
                warn!(
                    symbol = %request.symbol,
                    side = %request.side,
                    order_type = %request.order_type,
                    quantity = request.quantity,
                    error = %err,
                    "order rejected"
                );
                Err(err)
            }
        }
    }

    fn try_submit(&self, request: &OrderRequest) -> Result<Order, TradingError> {
        let symbol = validator::validate_symbol(&request.symbol, |s| self.is_tracked(s))?;
        let quantity = validator::validate_quantity(request.quantity)?;
        let side = request.side;

        let mut book = self.book(&symbol)?.lock();

        let (reservation, reference) = match request.order_type {
            OrderType::Limit { price } => (validator::limit_order_cost(side, price, quantity), None),
            OrderType::Market => {
                let estimate = book.market_fill_estimate(side, quantity);
                let reference = if estimate.is_complete() {
                    None
                } else if self.config.market_order_policy == MarketOrderPolicy::RejectUnfilled {
                    return Err(TradingError::InsufficientLiquidity {
                        symbol: symbol.to_string(),
                        unfilled: estimate.unfilled.as_u64(),
                    });
                } else {
                    Some(self.feed.latest_price(&symbol)?)
                };
                (validator::market_order_cost(side, &estimate, reference), reference)
            }
        };
        {
            let mut positions = self.positions.lock();
            positions.ensure_position_range(&symbol, quantity)?;
            positions.reserve(reservation)?;
        }

        let timestamp = now_nanos();
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst);
        let mut order = Order::new(sequence, symbol, side, request.order_type, quantity, timestamp);

        let routed = match order.order_type {
            OrderType::Limit { .. } => book.add_limit_order(&mut order, timestamp),
            OrderType::Market => book.add_market_order(&mut order, reference, timestamp),
        };
        let executions = match routed {
            Ok(executions) => executions,
            Err(err) => {
                self.positions.lock().release(reservation);
                return Err(err.into());
            }
        };

        self.settle(&order, &executions, reservation)?;
        Ok(order)
    }

    /// Amend the quantity and/or price of a resting limit order
    ///
    /// `amendment.quantity` is the new total including what has already
    /// filled. A pure reduction keeps the order's place in the queue; a
    /// price change or a larger quantity re-queues it with a fresh arrival
    /// sequence, and it may trade at once if the new price crosses. A buy's
    /// reservation follows its new `remaining × limit`. On error the order
    /// and the portfolio are left as they were.
    pub fn amend_order(&self, order_id: &OrderId, amendment: Amendment) -> Result<Order, TradingError> {
        match self.try_amend(order_id, &amendment) {
            Ok((order, requeued)) => {
                info!(
                    order_id = %order.order_id,
                    symbol = %order.symbol,
                    order_type = %order.order_type,
                    quantity = %order.quantity,
                    remaining = %order.remaining_quantity,
                    status = %order.status,
                    requeued,
                    "order amended"
                );
                Ok(order)
            }
            Err(err) => {
                warn!(order_id = %order_id, amendment = ?amendment, error = %err, "amend rejected");
                Err(err)
            }
        }
    }

    fn try_amend(&self, order_id: &OrderId, amendment: &Amendment) -> Result<(Order, bool), TradingError> {
        let symbol = self
            .registry
            .lock()
            .get(order_id)
            .map(|order| order.symbol.clone())
            .ok_or_else(|| not_found(order_id))?;

        let mut book = self.book(&symbol)?.lock();
        // Orders of this symbol only change under its book lock
        let mut order = self.get_order(order_id)?;

        if order.status.is_terminal() {
            return Err(TradingError::InvalidState {
                order_id: order_id.to_string(),
                status: order.status.to_string(),
            });
        }
        if let Some(quantity) = amendment.quantity {
            validator::validate_quantity(quantity.as_u64())?;
        }

        let timestamp = now_nanos();
        let mut preview = order.clone();
        preview.amend(amendment, timestamp)?;

        let held = committed_cash(&order);
        let extra = (committed_cash(&preview) - held).max(Decimal::ZERO);
        {
            let mut positions = self.positions.lock();
            positions.ensure_position_range(&symbol, preview.remaining_quantity)?;
            positions.reserve(extra)?;
        }

        let requeued = !order.keeps_priority(amendment);
        if requeued {
            order.sequence = self.sequence.fetch_add(1, Ordering::SeqCst);
        }
        let executions = match book.amend_order(&mut order, amendment, timestamp) {
            Ok(executions) => executions,
            Err(err) => {
                self.positions.lock().release(extra);
                return Err(err.into());
            }
        };

        self.settle(&order, &executions, held + extra)?;
        Ok((order, requeued))
    }

    /// Record `order` and settle the executions it took part in
    ///
    /// `reserved` is the cash committed to the order going into matching.
    /// Whatever it no longer needs is released, also when settlement fails.
    fn settle(&self, order: &Order, executions: &[Execution], reserved: Decimal) -> Result<(), TradingError> {
        let mut registry = self.registry.lock();
        let resting_release = match apply_resting_fills(&mut registry, executions) {
            Ok(released) => released,
            Err(err) => {
                self.positions.lock().release(reserved);
                return Err(err);
            }
        };
        registry.insert(order.order_id, order.clone());

        let mut positions = self.positions.lock();
        let settled = executions
            .iter()
            .flat_map(Execution::fills)
            .try_for_each(|fill| positions.apply_execution(&fill).map(|_| ()));

        positions.release(reserved - committed_cash(order) + resting_release);
        settled
    }

    /// Cancel a resting order
    ///
    /// Fails with `OrderNotFound` for unknown ids and `InvalidState` for
    /// orders that are already filled or cancelled.
    pub fn cancel_order(&self, order_id: &OrderId) -> Result<Order, TradingError> {
        let symbol = self
            .registry
            .lock()
            .get(order_id)
            .map(|order| order.symbol.clone())
            .ok_or_else(|| not_found(order_id))?;

        let mut book = self.book(&symbol)?.lock();
        let mut registry = self.registry.lock();
        let order = registry.get_mut(order_id).ok_or_else(|| not_found(order_id))?;

        if order.status.is_terminal() {
            warn!(order_id = %order_id, status = %order.status, "cancel rejected");
            return Err(TradingError::InvalidState {
                order_id: order_id.to_string(),
                status: order.status.to_string(),
            });
        }

        let removed = book.cancel_order(order_id)?;
        if removed != order.remaining_quantity {
            return Err(TradingError::internal(format!(
                "book held {} of order {} but registry has {} remaining",
                removed, order_id, order.remaining_quantity
            )));
        }
        order.cancel(now_nanos())?;

        if let (Side::BUY, Some(limit)) = (order.side, order.limit_price()) {
            self.positions.lock().release(limit.notional(removed));
        }

        info!(
            order_id = %order_id,
            symbol = %order.symbol,
            side = %order.side,
            cancelled = %removed,
            "order cancelled"
        );
        Ok(order.clone())
    }

    pub fn get_order(&self, order_id: &OrderId) -> Result<Order, TradingError> {
        self.registry
            .lock()
            .get(order_id)
            .cloned()
            .ok_or_else(|| not_found(order_id))
    }

    /// Orders matching the filters, in arrival order
    pub fn list_orders(&self, symbol: Option<&Symbol>, status: Option<OrderStatus>) -> Vec<Order> {
        let mut orders: Vec<Order> = self
            .registry
            .lock()
            .values()
            .filter(|order| symbol.map_or(true, |s| &order.symbol == s))
            .filter(|order| status.map_or(true, |s| order.status == s))
            .cloned()
            .collect();
        orders.sort_by_key(|order| order.sequence);
        orders
    }

    /// Orders that can still trade (New or PartiallyFilled), in arrival order
    pub fn active_orders(&self, symbol: Option<&Symbol>) -> Vec<Order> {
        let mut orders: Vec<Order> = self
            .registry
            .lock()
            .values()
            .filter(|order| !order.status.is_terminal())
            .filter(|order| symbol.map_or(true, |s| &order.symbol == s))
            .cloned()
            .collect();
        orders.sort_by_key(|order| order.sequence);
        orders
    }

    /// Top `levels` price levels per side of one book
    pub fn book_snapshot(&self, symbol: &Symbol, levels: usize) -> Result<BookSnapshot, TradingError> {
        Ok(self.book(symbol)?.lock().snapshot(levels))
    }

    pub fn best_bid(&self, symbol: &Symbol) -> Result<Option<Price>, TradingError> {
        Ok(self.book(symbol)?.lock().best_bid())
    }

    pub fn best_ask(&self, symbol: &Symbol) -> Result<Option<Price>, TradingError> {
        Ok(self.book(symbol)?.lock().best_ask())
    }

    pub fn spread(&self, symbol: &Symbol) -> Result<Option<Decimal>, TradingError> {
        Ok(self.book(symbol)?.lock().spread())
    }

    /// Resting quantity on one side of a book
    pub fn depth(&self, symbol: &Symbol, side: Side) -> Result<Quantity, TradingError> {
        Ok(self.book(symbol)?.lock().depth(side))
    }

    /// Cash, positions and P&L valued at `prices`
    pub fn portfolio_snapshot(&self, prices: &PriceMap) -> Result<PortfolioSummary, TradingError> {
        self.positions.lock().summary(prices)
    }

    /// Latest feed price of every symbol with an open position
    pub fn market_prices(&self) -> Result<PriceMap, TradingError> {
        let open: Vec<Symbol> = self
            .positions
            .lock()
            .open_positions()
            .map(|position| position.symbol.clone())
            .collect();

        let mut prices = PriceMap::new();
        for symbol in open {
            let price = self.feed.latest_price(&symbol)?;
            prices.insert(symbol, price);
        }
        Ok(prices)
    }

    /// Portfolio snapshot valued at the feed's latest prices
    pub fn mark_to_market(&self) -> Result<PortfolioSummary, TradingError> {
        let prices = self.market_prices()?;
        self.portfolio_snapshot(&prices)
    }

    pub fn portfolio_value(&self, prices: &PriceMap) -> Result<Decimal, TradingError> {
        self.positions.lock().portfolio_value(prices)
    }

    pub fn position(&self, symbol: &Symbol) -> Position {
        self.positions.lock().position(symbol)
    }

    pub fn cash(&self) -> Decimal {
        self.positions.lock().cash()
    }

    /// Cash not committed to resting buy orders
    pub fn available_cash(&self) -> Decimal {
        self.positions.lock().available_cash()
    }

    pub fn realized_pnl(&self) -> Decimal {
        self.positions.lock().total_realized_pnl()
    }

    fn book(&self, symbol: &Symbol) -> Result<&Mutex<OrderBook>, TradingError> {
        self.books
            .get(symbol)
            .ok_or_else(|| ValidationError::UnknownSymbol(symbol.to_string()).into())
    }
}

/// Cash a resting limit buy keeps committed: `remaining × limit`
fn committed_cash(order: &Order) -> Decimal {
    match (order.side, order.limit_price()) {
        (Side::BUY, Some(limit)) => limit.notional(order.remaining_quantity),
        _ => Decimal::ZERO,
    }
}

/// Apply book executions to the resting orders they hit
///
/// Returns the cash released by resting buys that were filled.
fn apply_resting_fills(
    registry: &mut HashMap<OrderId, Order>,
    executions: &[Execution],
) -> Result<Decimal, TradingError> {
    let mut released = Decimal::ZERO;

    for execution in executions {
        let Some(resting_id) = execution.resting_order_id() else {
            continue;
        };
        let resting = registry.get_mut(&resting_id).ok_or_else(|| {
            TradingError::internal(format!("resting order {} missing from registry", resting_id))
        })?;
        resting.add_fill(execution.quantity, execution.price, execution.executed_at)?;

        if let (Side::BUY, Some(limit)) = (resting.side, resting.limit_price()) {
            released += limit.notional(execution.quantity);
        }
        debug!(
            order_id = %resting_id,
            filled = %resting.filled_quantity,
            status = %resting.status,
            "resting order filled"
        );
    }

    Ok(released)
}

fn not_found(order_id: &OrderId) -> TradingError {
    TradingError::OrderNotFound {
        order_id: order_id.to_string(),
    }
}
