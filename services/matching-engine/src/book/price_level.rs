//! Price level implementation with FIFO queue
//!
//! A price level holds every resting order at one price. Orders are kept
//! oldest-first so time priority is strict within the level.

use std::collections::VecDeque;
use types::ids::OrderId;
use types::numeric::Quantity;

/// A price level containing orders at a specific price
///
/// Orders are stored as OrderId references with their remaining quantities;
/// the full order objects live in the trading engine's registry.
#[derive(Debug, Clone)]
pub struct PriceLevel {
    /// Queue of orders at this price level (FIFO order)
    orders: VecDeque<OrderEntry>,
    /// Total quantity available at this level
    total_quantity: Quantity,
}

/// Entry in the price level queue
#[derive(Debug, Clone)]
struct OrderEntry {
    order_id: OrderId,
    remaining_quantity: Quantity,
}

impl PriceLevel {
    /// Create a new empty price level
    pub fn new() -> Self {
        Self {
            orders: VecDeque::new(),
            total_quantity: Quantity::zero(),
        }
    }

    /// Append an order at the back of the queue (time priority)
    pub fn insert(&mut self, order_id: OrderId, quantity: Quantity) {
        self.orders.push_back(OrderEntry {
            order_id,
            remaining_quantity: quantity,
        });
        self.total_quantity += quantity;
    }

    /// Remove an order from the queue by OrderId
    ///
    /// Returns the remaining quantity of the removed order, or None if not found
    pub fn remove(&mut self, order_id: &OrderId) -> Option<Quantity> {
        let position = self.orders.iter().position(|entry| &entry.order_id == order_id)?;
        let entry = self.orders.remove(position)?;
        self.total_quantity = self.total_quantity.saturating_sub(entry.remaining_quantity);
        Some(entry.remaining_quantity)
    }

    /// Peek at the oldest order: (order_id, remaining quantity)
    pub fn peek_front(&self) -> Option<(OrderId, Quantity)> {
        self.orders.front().map(|entry| (entry.order_id, entry.remaining_quantity))
    }

    /// Change an order's open quantity without moving it in the queue
    ///
    /// Returns the previous quantity, or None if the order is not here.
    pub fn set_quantity(&mut self, order_id: &OrderId, quantity: Quantity) -> Option<Quantity> {
        let entry = self.orders.iter_mut().find(|entry| &entry.order_id == order_id)?;
        let old_quantity = std::mem::replace(&mut entry.remaining_quantity, quantity);
        self.total_quantity = self.total_quantity.saturating_sub(old_quantity) + quantity;
        Some(old_quantity)
    }

    /// Update the remaining quantity for the front order
    ///
    /// Used after a fill. A zero quantity removes the order from the level.
    pub fn update_front_quantity(&mut self, new_quantity: Quantity) -> bool {
        let Some(entry) = self.orders.front_mut() else {
            return false;
        };
        let old_quantity = entry.remaining_quantity;

        if new_quantity.is_zero() {
            self.orders.pop_front();
        } else {
            entry.remaining_quantity = new_quantity;
        }

        self.total_quantity = self.total_quantity.saturating_sub(old_quantity) + new_quantity;
        true
    }

    /// Remaining quantity of a specific order at this level
    pub fn quantity_of(&self, order_id: &OrderId) -> Option<Quantity> {
        self.iter().find(|(id, _)| id == order_id).map(|(_, quantity)| quantity)
    }

    /// Iterate resting orders oldest-first
    pub fn iter(&self) -> impl Iterator<Item = (OrderId, Quantity)> + '_ {
        self.orders.iter().map(|entry| (entry.order_id, entry.remaining_quantity))
    }

    /// Check if the price level is empty
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Get the total quantity at this price level
    pub fn total_quantity(&self) -> Quantity {
        self.total_quantity
    }

    /// Get the number of orders at this level
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }
}

impl Default for PriceLevel {
    fn default() -> Self {
        Self::new()
    }
}
