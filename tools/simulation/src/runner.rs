//! Tick-driven simulation runner
//!
//! Each tick advances the synthetic feed by one bar per symbol and then
//! lets every strategy evaluate in configuration order. A strategy failure
//! is logged and counted; it does not stop the run.

use std::collections::BTreeMap;
use std::sync::Arc;

use market_data::{MarketDataFeed, SyntheticFeed};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use trading_engine::{PriceMap, TradingEngine};
use types::ids::{OrderId, Symbol};
use types::numeric::Price;

use crate::config::SimulationConfig;
use crate::error::SimulationError;
use crate::report::{OrderStats, SimulationReport};
use crate::strategy::MomentumStrategy;

/// What happened during one tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickOutcome {
    pub tick: usize,
    pub prices: Vec<(Symbol, Price)>,
    pub orders: Vec<OrderId>,
    pub errors: usize,
}

/// Engine, feed and strategies wired together
pub struct Simulation {
    config: SimulationConfig,
    feed: Arc<SyntheticFeed>,
    engine: TradingEngine,
    strategies: Vec<MomentumStrategy>,
    ticks_run: usize,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> Result<Self, SimulationError> {
        config.validate()?;

        let feed = Arc::new(SyntheticFeed::new(config.feed.clone(), config.engine.symbols.iter().cloned())?);
        let engine = TradingEngine::new(config.engine.clone(), feed.clone())?;
        let strategies = config
            .strategies
            .iter()
            .cloned()
            .map(MomentumStrategy::new)
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            seed = config.feed.seed,
            scenario = %config.feed.scenario,
            ticks = config.ticks,
            strategies = strategies.len(),
            "simulation ready"
        );

        Ok(Self {
            config,
            feed,
            engine,
            strategies,
            ticks_run: 0,
        })
    }

    pub fn engine(&self) -> &TradingEngine {
        &self.engine
    }

    pub fn feed(&self) -> &SyntheticFeed {
        &self.feed
    }

    pub fn strategies(&self) -> &[MomentumStrategy] {
        &self.strategies
    }

    pub fn ticks_run(&self) -> usize {
        self.ticks_run
    }

    /// Advance the feed one bar and run every strategy
    pub fn step(&mut self) -> Result<TickOutcome, SimulationError> {
        let prices = self.feed.advance()?;
        self.ticks_run += 1;

        let mut outcome = TickOutcome {
            tick: self.ticks_run,
            prices,
            orders: Vec::new(),
            errors: 0,
        };

        for strategy in &mut self.strategies {
            match strategy.evaluate(self.feed.as_ref(), &self.engine) {
                Ok(Some(order)) => outcome.orders.push(order.order_id),
                Ok(None) => {}
                Err(err) => {
                    outcome.errors += 1;
                    warn!(tick = self.ticks_run, symbol = %strategy.symbol(), error = %err, "strategy evaluation failed");
                }
            }
        }

        debug!(tick = outcome.tick, orders = outcome.orders.len(), errors = outcome.errors, "tick complete");
        Ok(outcome)
    }

    /// Run the configured number of ticks and report
    pub fn run(&mut self) -> Result<SimulationReport, SimulationError> {
        for _ in 0..self.config.ticks {
            self.step()?;
        }
        let report = self.report()?;
        info!(
            ticks = report.ticks,
            total_value = %report.portfolio.total_value,
            total_pnl = %report.portfolio.total_pnl,
            orders = report.orders.total,
            "simulation finished"
        );
        Ok(report)
    }

    /// Report on the current state, valued at the feed's latest prices
    pub fn report(&self) -> Result<SimulationReport, SimulationError> {
        let mut final_prices = BTreeMap::new();
        for symbol in self.engine.symbols() {
            final_prices.insert(symbol.clone(), self.feed.latest_price(symbol)?);
        }
        let prices: PriceMap = final_prices.iter().map(|(s, p)| (s.clone(), *p)).collect();
        let portfolio = self.engine.portfolio_snapshot(&prices)?;

        Ok(SimulationReport {
            version: crate::VERSION.to_string(),
            seed: self.config.feed.seed,
            scenario: self.feed.scenario(),
            ticks: self.ticks_run,
            final_prices,
            return_pct: SimulationReport::return_pct(&portfolio),
            portfolio,
            orders: OrderStats::from_orders(&self.engine.list_orders(None, None)),
            strategies: self.strategies.iter().map(MomentumStrategy::status).collect(),
        })
    }
}
