//! Error types for the trading core
//!
//! Comprehensive error taxonomy using thiserror. Every condition is returned
//! synchronously to the immediate caller; nothing is retried internally.

use rust_decimal::Decimal;
use thiserror::Error;

/// Top-level error returned by the trading engine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TradingError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Order not found: {order_id}")]
    OrderNotFound { order_id: String },

    #[error("Order {order_id} already in terminal state: {status}")]
    InvalidState { order_id: String, status: String },

    #[error("Insufficient funds: required {required}, available {available}")]
    InsufficientFunds { required: Decimal, available: Decimal },

    #[error("Insufficient liquidity for {symbol}: {unfilled} shares unfillable")]
    InsufficientLiquidity { symbol: String, unfilled: u64 },

    #[error("Market data unavailable: {0}")]
    DataUnavailable(#[from] DataError),

    #[error("Arithmetic overflow in {context}")]
    Overflow { context: String },

    #[error("Internal consistency fault: {message}")]
    Internal { message: String },
}

impl TradingError {
    pub fn internal(message: impl Into<String>) -> Self {
        TradingError::Internal { message: message.into() }
    }

    pub fn overflow(context: impl Into<String>) -> Self {
        TradingError::Overflow { context: context.into() }
    }
}

/// Malformed order requests. No order is created when one of these is returned.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Quantity must be positive")]
    NonPositiveQuantity,

    #[error("Quantity {quantity} exceeds the per-order maximum of {max}")]
    QuantityTooLarge { quantity: u64, max: u64 },

    #[error("Amended quantity must exceed the {filled} shares already filled")]
    AmendBelowFilled { filled: u64 },

    #[error("Order of {quantity} would take the {symbol} position out of range")]
    PositionOutOfRange { symbol: String, quantity: u64 },

    #[error("Invalid limit price: {0}")]
    InvalidLimitPrice(String),

    #[error("Invalid symbol format: {0}")]
    InvalidSymbol(String),

    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),
}

/// Market data collaborator failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DataError {
    #[error("no price available for {symbol}")]
    NoPrice { symbol: String },

    #[error("invalid {field} for {symbol}")]
    InvalidField { symbol: String, field: String },

    #[error("feed failure: {reason}")]
    Feed { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::InvalidLimitPrice("-1".to_string());
        assert_eq!(err.to_string(), "Invalid limit price: -1");
    }

    #[test]
    fn test_quantity_too_large_display() {
        let err = ValidationError::QuantityTooLarge { quantity: u64::MAX, max: 1_000 };
        assert!(err.to_string().contains("18446744073709551615"));
        assert!(err.to_string().contains("1000"));
    }

    #[test]
    fn test_insufficient_funds_display() {
        let err = TradingError::InsufficientFunds {
            required: Decimal::from(1500),
            available: Decimal::from(1000),
        };
        assert!(err.to_string().contains("1500"));
        assert!(err.to_string().contains("1000"));
    }

    #[test]
    fn test_trading_error_from_validation_error() {
        let err: TradingError = ValidationError::NonPositiveQuantity.into();
        assert!(matches!(err, TradingError::Validation(_)));
    }

    #[test]
    fn test_trading_error_from_data_error() {
        let err: TradingError = DataError::NoPrice { symbol: "AAPL".to_string() }.into();
        assert!(matches!(err, TradingError::DataUnavailable(_)));
        assert!(err.to_string().contains("AAPL"));
    }
}
