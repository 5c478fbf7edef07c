//! End-of-run report
//!
//! Portfolio valuation at the final feed prices, order counts and the
//! status of every strategy.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use market_data::Scenario;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use trading_engine::PortfolioSummary;
use types::ids::Symbol;
use types::numeric::Price;
use types::order::{Order, OrderStatus};

use crate::strategy::StrategyStatus;

/// Order counts by final status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderStats {
    pub total: usize,
    pub filled: usize,
    pub partially_filled: usize,
    pub open: usize,
    pub cancelled: usize,
}

impl OrderStats {
    pub fn from_orders(orders: &[Order]) -> Self {
        let mut stats = Self {
            total: orders.len(),
            ..Self::default()
        };
        for order in orders {
            match order.status {
                OrderStatus::Filled => stats.filled += 1,
                OrderStatus::PartiallyFilled => stats.partially_filled += 1,
                OrderStatus::New => stats.open += 1,
                OrderStatus::Cancelled => stats.cancelled += 1,
            }
        }
        stats
    }
}

/// Summary of a completed simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub version: String,
    pub seed: u64,
    pub scenario: Scenario,
    pub ticks: usize,
    pub final_prices: BTreeMap<Symbol, Price>,
    pub portfolio: PortfolioSummary,
    /// total P&L as a percentage of initial capital
    pub return_pct: Decimal,
    pub orders: OrderStats,
    pub strategies: Vec<StrategyStatus>,
}

impl SimulationReport {
    pub fn return_pct(portfolio: &PortfolioSummary) -> Decimal {
        if portfolio.initial_capital.is_zero() {
            return Decimal::ZERO;
        }
        (portfolio.total_pnl / portfolio.initial_capital * Decimal::ONE_HUNDRED).round_dp(4)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Human-readable summary
    pub fn render_text(&self) -> String {
        let p = &self.portfolio;
        let mut out = String::new();

        let _ = writeln!(out, "Simulation: {} ticks, seed {}, scenario {}", self.ticks, self.seed, self.scenario);
        let _ = writeln!(out, "Initial capital: {}", p.initial_capital.round_dp(2));
        let _ = writeln!(out, "Cash:            {}", p.cash.round_dp(2));
        let _ = writeln!(out, "Portfolio value: {}", p.total_value.round_dp(2));
        let _ = writeln!(
            out,
            "Total P&L:       {} ({}%)",
            p.total_pnl.round_dp(2),
            self.return_pct.round_dp(2)
        );
        let _ = writeln!(
            out,
            "Realized / unrealized: {} / {}",
            p.realized_pnl.round_dp(2),
            p.unrealized_pnl.round_dp(2)
        );
        let _ = writeln!(
            out,
            "Orders: {} total, {} filled, {} partial, {} open, {} cancelled",
            self.orders.total, self.orders.filled, self.orders.partially_filled, self.orders.open, self.orders.cancelled
        );

        if !p.positions.is_empty() {
            let _ = writeln!(out, "\nPositions:");
            for position in &p.positions {
                let _ = writeln!(
                    out,
                    "  {:<6} {:>8} @ {:>10}  mkt {:>10}  uPnL {:>10}",
                    position.symbol.as_str(),
                    position.quantity,
                    position.average_cost.map(|c| c.round_dp(2)).unwrap_or_default(),
                    position.market_price,
                    position.unrealized_pnl.round_dp(2)
                );
            }
        }

        let _ = writeln!(out, "\nStrategies:");
        for s in &self.strategies {
            let momentum = s
                .last_momentum
                .map(|m| m.round_dp(4).to_string())
                .unwrap_or_else(|| "-".to_string());
            let _ = writeln!(
                out,
                "  {:<6} N={} t={}  last {:?} (momentum {})  orders {}  at limit {}  rejected {}",
                s.symbol.as_str(),
                s.window,
                s.threshold,
                s.last_signal,
                momentum,
                s.orders_submitted,
                s.skipped_at_limit,
                s.rejected
            );
        }
        out
    }
}
