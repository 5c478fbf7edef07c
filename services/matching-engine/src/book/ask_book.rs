//! Ask (sell-side) order book
//!
//! Maintains sell orders sorted by price ascending (best ask first).
//! BTreeMap keeps iteration order deterministic.

use std::collections::BTreeMap;
use types::ids::OrderId;
use types::numeric::{Price, Quantity};

use super::price_level::PriceLevel;

/// Ask (sell) side order book
///
/// Orders are sorted by price ascending, so the lowest ask is first.
/// At each price level, orders are maintained in FIFO order.
#[derive(Debug, Clone)]
pub struct AskBook {
    /// Price levels sorted ascending (lowest price first)
    levels: BTreeMap<Price, PriceLevel>,
}

impl AskBook {
    /// Create a new empty ask book
    pub fn new() -> Self {
        Self {
            levels: BTreeMap::new(),
        }
    }

    /// Append a resting order at its limit price
    pub fn insert(&mut self, order_id: OrderId, price: Price, quantity: Quantity) {
        self.levels.entry(price).or_default().insert(order_id, quantity);
    }

    /// Remove an order from the ask book
    ///
    /// Returns the order's remaining quantity if it was found. Empty levels
    /// are dropped.
    pub fn remove(&mut self, order_id: &OrderId, price: Price) -> Option<Quantity> {
        let level = self.levels.get_mut(&price)?;
        let removed = level.remove(order_id)?;
        if level.is_empty() {
            self.levels.remove(&price);
        }
        Some(removed)
    }

    /// Drop the level at `price` if nothing rests there any more
    pub(crate) fn prune(&mut self, price: Price) {
        if self.levels.get(&price).is_some_and(PriceLevel::is_empty) {
            self.levels.remove(&price);
        }
    }

    /// Get the best ask (lowest price) and its total quantity
    pub fn best_ask(&self) -> Option<(Price, Quantity)> {
        self.levels
            .iter()
            .next()
            .map(|(price, level)| (*price, level.total_quantity()))
    }

    /// Get mutable reference to the best ask level
    pub(crate) fn best_ask_level_mut(&mut self) -> Option<(Price, &mut PriceLevel)> {
        self.levels.iter_mut().next().map(|(price, level)| (*price, level))
    }

    /// Levels in priority order (lowest price first)
    pub fn levels(&self) -> impl Iterator<Item = (Price, &PriceLevel)> + '_ {
        self.levels.iter().map(|(price, level)| (*price, level))
    }

    /// Change a resting order's quantity in place, keeping its priority
    pub fn update_quantity(&mut self, order_id: &OrderId, price: Price, quantity: Quantity) -> Option<Quantity> {
        self.levels.get_mut(&price)?.set_quantity(order_id, quantity)
    }

    /// Remaining quantity of a resting order
    pub fn quantity_of(&self, order_id: &OrderId, price: Price) -> Option<Quantity> {
        self.levels.get(&price)?.quantity_of(order_id)
    }

    /// Total resting quantity across all levels
    pub fn total_quantity(&self) -> Quantity {
        self.levels.values().map(PriceLevel::total_quantity).sum()
    }

    /// Check if the ask book is empty
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

impl Default for AskBook {
    fn default() -> Self {
        Self::new()
    }
}
