//! Portfolio views for presentation code

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use types::ids::Symbol;
use types::numeric::Price;
use types::position::{Position, PositionSide};

/// One open position marked to a price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionSummary {
    pub symbol: Symbol,
    pub quantity: i64,
    pub side: PositionSide,
    pub average_cost: Option<Decimal>,
    pub market_price: Price,
    pub market_value: Decimal,
    pub unrealized_pnl: Decimal,
    pub realized_pnl: Decimal,
}

impl PositionSummary {
    pub fn new(position: &Position, market_price: Price) -> Self {
        Self {
            symbol: position.symbol.clone(),
            quantity: position.quantity,
            side: position.side(),
            average_cost: position.average_cost,
            market_price,
            market_value: position.market_value(market_price),
            unrealized_pnl: position.unrealized_pnl(market_price),
            realized_pnl: position.realized_pnl,
        }
    }
}

/// Cash, value and P&L of the whole portfolio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub cash: Decimal,
    pub reserved_cash: Decimal,
    pub available_cash: Decimal,
    pub initial_capital: Decimal,
    pub total_value: Decimal,
    /// total_value − initial_capital
    pub total_pnl: Decimal,
    pub realized_pnl: Decimal,
    pub unrealized_pnl: Decimal,
    pub positions: Vec<PositionSummary>,
    pub trade_count: usize,
}
