//! Fixed-point price and integer quantity types
//!
//! Prices use rust_decimal for deterministic arithmetic (no floating-point
//! errors) and lie in `(0, MAX_PRICE]` by construction, so `price × quantity`
//! fits in a `Decimal` for any `u64` quantity. Quantities are whole share
//! counts; a single order carries at most `MAX_ORDER_QUANTITY`.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

use crate::errors::ValidationError;

/// Decimal places kept when converting external floating-point prices.
pub const PRICE_DP: u32 = 8;

/// Highest representable price
pub const MAX_PRICE: u64 = 1_000_000_000;

/// Largest quantity one order may carry
pub const MAX_ORDER_QUANTITY: u64 = 1_000_000_000_000;

/// A strictly positive price, at most `MAX_PRICE`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    /// Create a price from a decimal
    ///
    /// # Panics
    /// Panics if the value is not in `(0, MAX_PRICE]`
    pub fn new(value: Decimal) -> Self {
        assert!(value > Decimal::ZERO, "Price must be positive");
        assert!(value <= Decimal::from(MAX_PRICE), "Price must not exceed {}", MAX_PRICE);
        Self(value)
    }

    /// Try to create a price, returning None outside `(0, MAX_PRICE]`
    pub fn try_new(value: Decimal) -> Option<Self> {
        if value > Decimal::ZERO && value <= Decimal::from(MAX_PRICE) {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Create a whole-number price
    ///
    /// # Panics
    /// Panics if the value is zero
    pub fn from_u64(value: u64) -> Self {
        Self::new(Decimal::from(value))
    }

    /// Convert a price coming from outside the core (market data, UI input).
    ///
    /// Missing, NaN, infinite and non-positive values are all rejected; the
    /// caller decides whether that means "reject" or "use a default".
    pub fn from_external(value: Option<f64>) -> Option<Self> {
        let raw = value.filter(|v| v.is_finite())?;
        let decimal = Decimal::from_f64(raw)?.round_dp(PRICE_DP);
        Self::try_new(decimal)
    }

    /// Get the inner decimal
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Price × quantity; cannot overflow for prices within `MAX_PRICE`
    pub fn notional(&self, quantity: Quantity) -> Decimal {
        self.0 * quantity.as_decimal()
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Price {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Decimal::from_str_exact(s)
            .ok()
            .and_then(Self::try_new)
            .ok_or_else(|| ValidationError::InvalidLimitPrice(s.to_string()))
    }
}

impl TryFrom<Decimal> for Price {
    type Error = ValidationError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Self::try_new(value).ok_or_else(|| ValidationError::InvalidLimitPrice(value.to_string()))
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

/// A whole-share quantity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(u64);

impl Quantity {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn zero() -> Self {
        Self(0)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    pub fn as_decimal(&self) -> Decimal {
        Decimal::from(self.0)
    }

    /// The share count as a signed integer, if it fits
    pub fn as_i64(&self) -> Option<i64> {
        i64::try_from(self.0).ok()
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn checked_add(self, other: Quantity) -> Option<Quantity> {
        self.0.checked_add(other.0).map(Quantity)
    }

    /// Subtract, returning None on underflow
    pub fn checked_sub(self, other: Quantity) -> Option<Quantity> {
        self.0.checked_sub(other.0).map(Quantity)
    }

    /// Subtract, clamping at zero
    pub fn saturating_sub(self, other: Quantity) -> Quantity {
        Quantity(self.0.saturating_sub(other.0))
    }
}

// Aggregates (level and side totals) saturate rather than wrap
impl Add for Quantity {
    type Output = Quantity;

    fn add(self, other: Quantity) -> Quantity {
        Quantity(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Quantity {
    fn add_assign(&mut self, other: Quantity) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sum for Quantity {
    fn sum<I: Iterator<Item = Quantity>>(iter: I) -> Self {
        iter.fold(Quantity::zero(), |acc, q| acc + q)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Quantity {
    fn from(value: u64) -> Self {
        Self(value)
    }
}
