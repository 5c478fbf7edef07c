//! Pre-trade order validation
//!
//! Pure checks run by the engine before an order is created. Checks are
//! applied in order (symbol, quantity, position range, funds) and the first
//! failure is returned. Limit prices need no check here: a `Price` only
//! exists inside `(0, MAX_PRICE]`.

use rust_decimal::Decimal;
use types::errors::ValidationError;
use types::ids::Symbol;
use types::numeric::{Price, Quantity, MAX_ORDER_QUANTITY};
use types::order::Side;

use matching_engine::FillEstimate;

/// Validate the ticker format and that the engine trades it
pub fn validate_symbol(raw: &str, is_tracked: impl Fn(&Symbol) -> bool) -> Result<Symbol, ValidationError> {
    let symbol = Symbol::try_new(raw).ok_or_else(|| ValidationError::InvalidSymbol(raw.to_string()))?;
    if !is_tracked(&symbol) {
        return Err(ValidationError::UnknownSymbol(raw.to_string()));
    }
    Ok(symbol)
}

/// Share count in `1..=MAX_ORDER_QUANTITY`
pub fn validate_quantity(raw: u64) -> Result<Quantity, ValidationError> {
    if raw == 0 {
        return Err(ValidationError::NonPositiveQuantity);
    }
    if raw > MAX_ORDER_QUANTITY {
        return Err(ValidationError::QuantityTooLarge {
            quantity: raw,
            max: MAX_ORDER_QUANTITY,
        });
    }
    Ok(Quantity::new(raw))
}

/// A trade of `quantity` in either direction keeps the position within `i64`
///
/// Both directions are checked because a self-match moves the position
/// up and back down within one execution.
pub fn validate_position_range(symbol: &Symbol, position: i64, quantity: Quantity) -> Result<(), ValidationError> {
    let fits = quantity
        .as_i64()
        .is_some_and(|qty| position.checked_add(qty).is_some() && position.checked_sub(qty).is_some());
    if !fits {
        return Err(ValidationError::PositionOutOfRange {
            symbol: symbol.to_string(),
            quantity: quantity.as_u64(),
        });
    }
    Ok(())
}

/// Cash a limit order commits: `quantity × limit` for buys, nothing for sells
pub fn limit_order_cost(side: Side, price: Price, quantity: Quantity) -> Decimal {
    match side {
        Side::BUY => price.notional(quantity),
        Side::SELL => Decimal::ZERO,
    }
}

/// Projected cash a market order commits
///
/// The book's part is priced at resting prices; any remainder the book
/// cannot absorb is priced at `reference`. Sells commit nothing.
pub fn market_order_cost(side: Side, estimate: &FillEstimate, reference: Option<Price>) -> Decimal {
    match (side, reference) {
        (Side::SELL, _) => Decimal::ZERO,
        (Side::BUY, Some(reference)) => estimate.cost_with_reference(reference),
        (Side::BUY, None) => estimate.cost,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracked(symbol: &Symbol) -> bool {
        symbol.as_str() == "AAPL"
    }

    #[test]
    fn test_validate_symbol() {
        assert_eq!(validate_symbol("AAPL", tracked), Ok(Symbol::new("AAPL")));
        assert_eq!(
            validate_symbol("aapl", tracked),
            Err(ValidationError::InvalidSymbol("aapl".to_string()))
        );
        assert_eq!(
            validate_symbol("TOOLONG", tracked),
            Err(ValidationError::InvalidSymbol("TOOLONG".to_string()))
        );
        assert_eq!(
            validate_symbol("MSFT", tracked),
            Err(ValidationError::UnknownSymbol("MSFT".to_string()))
        );
    }

    #[test]
    fn test_validate_quantity() {
        assert_eq!(validate_quantity(0), Err(ValidationError::NonPositiveQuantity));
        assert_eq!(validate_quantity(7), Ok(Quantity::new(7)));
        assert_eq!(
            validate_quantity(MAX_ORDER_QUANTITY),
            Ok(Quantity::new(MAX_ORDER_QUANTITY))
        );
        for raw in [MAX_ORDER_QUANTITY + 1, i64::MAX as u64 + 1, u64::MAX] {
            assert_eq!(
                validate_quantity(raw),
                Err(ValidationError::QuantityTooLarge {
                    quantity: raw,
                    max: MAX_ORDER_QUANTITY
                })
            );
        }
    }

    #[test]
    fn test_validate_position_range() {
        let symbol = Symbol::new("AAPL");
        let qty = Quantity::new(10);

        assert!(validate_position_range(&symbol, 0, qty).is_ok());
        assert!(validate_position_range(&symbol, -500, qty).is_ok());
        assert!(validate_position_range(&symbol, i64::MAX - 10, qty).is_ok());
        assert!(validate_position_range(&symbol, i64::MAX - 9, qty).is_err());
        assert!(validate_position_range(&symbol, i64::MIN + 9, qty).is_err());
        assert!(validate_position_range(&symbol, 0, Quantity::new(u64::MAX)).is_err());
    }

    #[test]
    fn test_limit_order_cost() {
        let price = Price::from_u64(100);
        assert_eq!(limit_order_cost(Side::BUY, price, Quantity::new(10)), Decimal::from(1_000));
        assert_eq!(limit_order_cost(Side::SELL, price, Quantity::new(10)), Decimal::ZERO);
    }

    #[test]
    fn test_market_order_cost_prices_remainder_at_reference() {
        let estimate = FillEstimate {
            filled: Quantity::new(4),
            cost: Decimal::from(400),
            unfilled: Quantity::new(6),
        };
        let reference = Some(Price::from_u64(110));

        assert_eq!(market_order_cost(Side::BUY, &estimate, reference), Decimal::from(1_060));
        assert_eq!(market_order_cost(Side::BUY, &estimate, None), Decimal::from(400));
        assert_eq!(market_order_cost(Side::SELL, &estimate, reference), Decimal::ZERO);
    }
}
