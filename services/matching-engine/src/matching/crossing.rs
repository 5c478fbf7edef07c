//! Crossing detection logic
//!
//! Determines when a bid and ask can match based on price compatibility

use types::numeric::Price;
use types::order::Side;

/// Check if a bid and ask can match at given prices
///
/// A buy crosses a sell when the bid is at or above the ask.
pub fn can_match(bid_price: Price, ask_price: Price) -> bool {
    bid_price >= ask_price
}

/// Check if an incoming limit order crosses a resting price
///
/// `None` is a market order, which crosses every resting price.
pub fn incoming_can_match(incoming_side: Side, incoming_limit: Option<Price>, resting_price: Price) -> bool {
    match (incoming_side, incoming_limit) {
        (_, None) => true,
        (Side::BUY, Some(limit)) => can_match(limit, resting_price),
        (Side::SELL, Some(limit)) => can_match(resting_price, limit),
    }
}
