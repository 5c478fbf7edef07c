//! Position Manager
//!
//! Applies execution legs to the portfolio's cash and positions. Funds are
//! not re-checked here; the engine validates before an order reaches the
//! book.
//!
//! Every leg is settled at most once. Legs of one symbol arrive in
//! execution sequence order, buy leg before sell leg, so a per-symbol high
//! water mark of the last settled leg is enough to spot a replay.

use std::collections::HashMap;

use rust_decimal::Decimal;
use tracing::debug;
use types::errors::{DataError, TradingError};
use types::ids::Symbol;
use types::numeric::{Price, Quantity};
use types::order::Side;
use types::portfolio::{Portfolio, TradeRecord};
use types::position::Position;
use types::trade::Fill;

use crate::snapshot::{PortfolioSummary, PositionSummary};
use crate::validator;

/// Current prices keyed by symbol
pub type PriceMap = HashMap<Symbol, Price>;

/// (execution sequence, leg) of the last leg settled for a symbol
type LegMark = (u64, u8);

fn leg_mark(fill: &Fill) -> LegMark {
    let leg = match fill.side {
        Side::BUY => 0,
        Side::SELL => 1,
    };
    (fill.sequence, leg)
}

/// Owns the portfolio and settles fills against it
#[derive(Debug, Clone)]
pub struct PositionManager {
    portfolio: Portfolio,
    settled: HashMap<Symbol, LegMark>,
}

impl PositionManager {
    /// Portfolio with a flat position for each symbol
    pub fn new(initial_capital: Decimal, symbols: impl IntoIterator<Item = Symbol>) -> Self {
        Self {
            portfolio: Portfolio::new(initial_capital, symbols),
            settled: HashMap::new(),
        }
    }

    /// Settle one leg of an execution
    ///
    /// Returns the realized P&L of the leg, or `None` if this leg was
    /// already applied. Fails with `Overflow`, leaving the portfolio
    /// untouched, if cash or the position would leave their range.
    pub fn apply_execution(&mut self, fill: &Fill) -> Result<Option<Decimal>, TradingError> {
        let mark = leg_mark(fill);
        if self.settled.get(&fill.symbol).is_some_and(|last| mark <= *last) {
            debug!(trade_id = %fill.trade_id, side = %fill.side, "duplicate fill ignored");
            return Ok(None);
        }

        let notional = fill.notional();
        let cash = match fill.side {
            Side::BUY => self.portfolio.cash.checked_sub(notional),
            Side::SELL => self.portfolio.cash.checked_add(notional),
        }
        .ok_or_else(|| TradingError::overflow("cash balance"))?;
        let signed_quantity = fill
            .signed_quantity()
            .ok_or_else(|| TradingError::overflow(format!("{} fill quantity", fill.symbol)))?;

        let realized = self
            .portfolio
            .position_mut(&fill.symbol)
            .apply_trade(fill.side, fill.quantity, fill.price, fill.executed_at)?;
        self.portfolio.cash = cash;
        self.settled.insert(fill.symbol.clone(), mark);

        self.portfolio.trade_history.push(TradeRecord {
            trade_id: fill.trade_id,
            order_id: fill.order_id,
            symbol: fill.symbol.clone(),
            quantity: signed_quantity,
            price: fill.price,
            realized_pnl: realized,
            executed_at: fill.executed_at,
        });

        debug!(
            symbol = %fill.symbol,
            side = %fill.side,
            quantity = %fill.quantity,
            price = %fill.price,
            realized = %realized,
            cash = %self.portfolio.cash,
            "fill settled"
        );
        Ok(Some(realized))
    }

    /// Reject an order of `quantity` whose fills could push the position
    /// in `symbol` out of range
    pub fn ensure_position_range(&self, symbol: &Symbol, quantity: Quantity) -> Result<(), TradingError> {
        validator::validate_position_range(symbol, self.portfolio.quantity(symbol), quantity)?;
        Ok(())
    }

    /// Unrealized P&L of one symbol at `price`; zero when flat or untracked
    pub fn unrealized_pnl(&self, symbol: &Symbol, price: Price) -> Decimal {
        self.portfolio
            .position(symbol)
            .map_or(Decimal::ZERO, |position| position.unrealized_pnl(price))
    }

    /// cash + Σ quantity × price
    ///
    /// Every non-flat position needs a price in `prices`.
    pub fn portfolio_value(&self, prices: &PriceMap) -> Result<Decimal, TradingError> {
        let mut value = self.portfolio.cash;
        for position in self.open_positions() {
            let market_value = position.market_value(price_for(prices, &position.symbol)?);
            value = value
                .checked_add(market_value)
                .ok_or_else(|| TradingError::overflow("portfolio value"))?;
        }
        Ok(value)
    }

    pub fn total_realized_pnl(&self) -> Decimal {
        self.portfolio.realized_pnl()
    }

    /// Portfolio value minus initial capital
    pub fn total_pnl(&self, prices: &PriceMap) -> Result<Decimal, TradingError> {
        Ok(self.portfolio_value(prices)? - self.portfolio.initial_capital)
    }

    pub fn summary(&self, prices: &PriceMap) -> Result<PortfolioSummary, TradingError> {
        let mut positions = Vec::new();
        let mut unrealized = Decimal::ZERO;

        for position in self.open_positions() {
            let price = price_for(prices, &position.symbol)?;
            let summary = PositionSummary::new(position, price);
            unrealized += summary.unrealized_pnl;
            positions.push(summary);
        }

        let total_value = self.portfolio_value(prices)?;
        Ok(PortfolioSummary {
            cash: self.portfolio.cash,
            reserved_cash: self.portfolio.reserved,
            available_cash: self.portfolio.available_cash(),
            initial_capital: self.portfolio.initial_capital,
            total_value,
            total_pnl: total_value - self.portfolio.initial_capital,
            realized_pnl: self.total_realized_pnl(),
            unrealized_pnl: unrealized,
            positions,
            trade_count: self.portfolio.trade_history.len(),
        })
    }

    /// Commit cash for an order; fails with `InsufficientFunds`
    pub fn reserve(&mut self, amount: Decimal) -> Result<(), TradingError> {
        self.portfolio.reserve(amount)
    }

    pub fn release(&mut self, amount: Decimal) {
        self.portfolio.release(amount);
    }

    pub fn cash(&self) -> Decimal {
        self.portfolio.cash
    }

    pub fn available_cash(&self) -> Decimal {
        self.portfolio.available_cash()
    }

    /// Position in `symbol`, flat if never traded
    pub fn position(&self, symbol: &Symbol) -> Position {
        self.portfolio
            .position(symbol)
            .cloned()
            .unwrap_or_else(|| Position::new(symbol.clone()))
    }

    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    /// Non-flat positions in symbol order
    pub fn open_positions(&self) -> impl Iterator<Item = &Position> + '_ {
        self.portfolio.positions.values().filter(|position| !position.is_flat())
    }
}

fn price_for(prices: &PriceMap, symbol: &Symbol) -> Result<Price, TradingError> {
    prices.get(symbol).copied().ok_or_else(|| {
        DataError::NoPrice {
            symbol: symbol.to_string(),
        }
        .into()
    })
}
