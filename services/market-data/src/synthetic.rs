//! Seeded synthetic price generator
//!
//! Each symbol follows a geometric random walk driven by its own
//! `ChaCha8Rng`, so the same seed always reproduces the same series.
//! Scenarios scale the per-tick volatility by the square of their factor
//! and crash/rally add a directional drift.

use std::collections::{BTreeMap, VecDeque};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use parking_lot::RwLock;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use types::clock::now_nanos;
use types::errors::DataError;
use types::ids::Symbol;
use types::numeric::Price;

use crate::feed::{Bar, MarketDataFeed};

/// Reference prices for well-known tickers
const BASE_PRICES: &[(&str, f64)] = &[
    ("AAPL", 185.92),
    ("MSFT", 425.52),
    ("GOOGL", 175.53),
    ("AMZN", 186.51),
    ("META", 504.55),
    ("TSLA", 178.08),
    ("NVDA", 125.61),
    ("JPM", 204.32),
    ("V", 275.96),
    ("JNJ", 149.78),
    ("WMT", 68.69),
    ("PG", 165.73),
    ("XOM", 114.23),
    ("BAC", 39.78),
    ("DIS", 101.41),
];

/// Tickers that get the higher base volatility
const TECH_SYMBOLS: &[&str] = &["AAPL", "MSFT", "GOOGL", "AMZN", "META", "TSLA", "NVDA"];

/// Market regime driving the generator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scenario {
    #[default]
    Normal,
    High,
    Low,
    Crash,
    Rally,
}

impl Scenario {
    pub fn all() -> &'static [Scenario] {
        &[
            Scenario::Normal,
            Scenario::High,
            Scenario::Low,
            Scenario::Crash,
            Scenario::Rally,
        ]
    }

    /// Volatility multiplier
    pub fn volatility_factor(&self) -> f64 {
        match self {
            Scenario::Normal => 1.0,
            Scenario::High => 2.5,
            Scenario::Low => 0.5,
            Scenario::Crash => 4.0,
            Scenario::Rally => 2.0,
        }
    }

    /// Extra log-return added every tick
    pub fn drift(&self) -> f64 {
        match self {
            Scenario::Crash => -0.0035,
            Scenario::Rally => 0.002,
            _ => 0.0,
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Scenario::Normal => "normal",
            Scenario::High => "high",
            Scenario::Low => "low",
            Scenario::Crash => "crash",
            Scenario::Rally => "rally",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown scenario '{0}' (expected normal, high, low, crash or rally)")]
pub struct UnknownScenario(pub String);

impl FromStr for Scenario {
    type Err = UnknownScenario;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scenario::all()
            .iter()
            .copied()
            .find(|scenario| scenario.to_string().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownScenario(s.to_string()))
    }
}

/// Generator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub seed: u64,
    pub scenario: Scenario,
    /// Bars generated per symbol before the first `advance`
    pub warmup_bars: usize,
    /// Spacing between bars
    pub interval_secs: u64,
    /// Bars retained per symbol
    pub max_history: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            scenario: Scenario::Normal,
            warmup_bars: 30,
            interval_secs: 60,
            max_history: 1_000,
        }
    }
}

/// Random-walk state of one symbol
#[derive(Debug)]
struct Series {
    rng: ChaCha8Rng,
    last_close: f64,
    base_volatility: f64,
    trend: f64,
    base_volume: f64,
    next_timestamp: i64,
    bars: VecDeque<Bar>,
}

impl Series {
    fn new(symbol: &Symbol, seed: u64, start: i64) -> Self {
        let hash = symbol_hash(symbol);
        let is_tech = TECH_SYMBOLS.contains(&symbol.as_str());
        let trend = match (is_tech, hash) {
            (true, h) if h % 3 != 0 => 0.0004,
            (true, _) => -0.0002,
            (false, h) if h % 2 == 0 => 0.0002,
            (false, _) => -0.0002,
        };

        Self {
            rng: ChaCha8Rng::seed_from_u64(seed.wrapping_add(hash)),
            last_close: base_price(symbol),
            base_volatility: if is_tech { 0.015 } else { 0.008 },
            trend,
            base_volume: (hash % 10 + 1) as f64,
            next_timestamp: start,
            bars: VecDeque::new(),
        }
    }

    /// Standard normal draw (Box-Muller)
    fn gaussian(&mut self) -> f64 {
        let u1: f64 = 1.0 - self.rng.gen::<f64>();
        let u2: f64 = self.rng.gen();
        (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
    }

    fn step(&mut self, symbol: &Symbol, scenario: Scenario, config: &FeedConfig) -> Result<Bar, DataError> {
        let factor = scenario.volatility_factor();
        let change = self.gaussian() * self.base_volatility * factor * factor + self.trend + scenario.drift();
        let raw_close = self.last_close * change.exp();

        let close = Price::from_external(Some(raw_close)).ok_or_else(|| DataError::InvalidField {
            symbol: symbol.to_string(),
            field: "close".to_string(),
        })?;

        let noise = self.rng.gen_range(0.7..1.3);
        let volume = (self.base_volume * (1.0 + 500.0 * change.abs()) * noise * 100_000.0).max(100.0) as u64;

        let bar = Bar {
            close,
            volume: Some(volume),
            timestamp: self.next_timestamp,
        };
        self.last_close = raw_close;
        self.next_timestamp += (config.interval_secs as i64) * 1_000_000_000;
        self.bars.push_back(bar);
        while self.bars.len() > config.max_history.max(1) {
            self.bars.pop_front();
        }
        Ok(bar)
    }
}

/// Starting price: table lookup, else 50 + (sum of bytes mod 450)
pub fn base_price(symbol: &Symbol) -> f64 {
    BASE_PRICES
        .iter()
        .find(|(ticker, _)| *ticker == symbol.as_str())
        .map(|(_, price)| *price)
        .unwrap_or_else(|| 50.0 + (symbol_hash(symbol) % 450) as f64)
}

fn symbol_hash(symbol: &Symbol) -> u64 {
    symbol.as_str().bytes().map(u64::from).sum()
}

/// Deterministic synthetic feed
///
/// `advance` takes `&self`, so a feed shared with the trading engine can
/// keep ticking.
#[derive(Debug)]
pub struct SyntheticFeed {
    config: FeedConfig,
    scenario: RwLock<Scenario>,
    series: RwLock<BTreeMap<Symbol, Series>>,
}

impl SyntheticFeed {
    /// Create a feed and warm up history for every symbol
    pub fn new(config: FeedConfig, symbols: impl IntoIterator<Item = Symbol>) -> Result<Self, DataError> {
        let feed = Self {
            scenario: RwLock::new(config.scenario),
            config,
            series: RwLock::new(BTreeMap::new()),
        };
        for symbol in symbols {
            feed.add_symbol(symbol)?;
        }
        Ok(feed)
    }

    /// Start tracking a symbol; a no-op if it is already tracked
    pub fn add_symbol(&self, symbol: Symbol) -> Result<(), DataError> {
        let scenario = self.scenario();
        let mut series = self.series.write();
        if series.contains_key(&symbol) {
            return Ok(());
        }

        let warmup = self.config.warmup_bars as i64;
        let interval = (self.config.interval_secs as i64) * 1_000_000_000;
        let start = now_nanos() - warmup * interval;

        let mut state = Series::new(&symbol, self.config.seed, start);
        for _ in 0..self.config.warmup_bars {
            state.step(&symbol, scenario, &self.config)?;
        }
        debug!(symbol = %symbol, base_price = state.last_close, "synthetic series started");
        series.insert(symbol, state);
        Ok(())
    }

    pub fn symbols(&self) -> Vec<Symbol> {
        self.series.read().keys().cloned().collect()
    }

    pub fn scenario(&self) -> Scenario {
        *self.scenario.read()
    }

    /// Switch regime; applies from the next tick
    pub fn set_scenario(&self, scenario: Scenario) {
        *self.scenario.write() = scenario;
        debug!(scenario = %scenario, "synthetic scenario changed");
    }

    /// Emit one new bar per symbol, returning the new closes
    pub fn advance(&self) -> Result<Vec<(Symbol, Price)>, DataError> {
        let scenario = self.scenario();
        let mut series = self.series.write();
        let mut ticks = Vec::with_capacity(series.len());

        for (symbol, state) in series.iter_mut() {
            match state.step(symbol, scenario, &self.config) {
                Ok(bar) => ticks.push((symbol.clone(), bar.close)),
                Err(err) => {
                    warn!(symbol = %symbol, error = %err, "synthetic tick rejected");
                    return Err(err);
                }
            }
        }
        Ok(ticks)
    }
}

impl MarketDataFeed for SyntheticFeed {
    fn latest_price(&self, symbol: &Symbol) -> Result<Price, DataError> {
        self.series
            .read()
            .get(symbol)
            .and_then(|state| state.bars.back())
            .map(|bar| bar.close)
            .ok_or_else(|| DataError::NoPrice {
                symbol: symbol.to_string(),
            })
    }

    fn history(&self, symbol: &Symbol, lookback: usize) -> Result<Vec<Bar>, DataError> {
        let series = self.series.read();
        let state = series.get(symbol).ok_or_else(|| DataError::NoPrice {
            symbol: symbol.to_string(),
        })?;
        let skip = state.bars.len().saturating_sub(lookback);
        Ok(state.bars.iter().skip(skip).copied().collect())
    }
}
