//! End-to-end order flow through the trading engine

use std::sync::Arc;
use std::thread;

use market_data::InMemoryFeed;
use proptest::prelude::*;
use rust_decimal::Decimal;
use trading_engine::{EngineConfig, MarketOrderPolicy, OrderRequest, TradingEngine};
use types::errors::TradingError;
use types::ids::Symbol;
use types::numeric::{Price, Quantity};
use types::order::{Amendment, OrderStatus, Side};

fn px(v: u64) -> Price {
    Price::from_u64(v)
}

fn config(capital: u64, policy: MarketOrderPolicy) -> EngineConfig {
    EngineConfig {
        symbols: vec![Symbol::new("X"), Symbol::new("Y")],
        initial_capital: Decimal::from(capital),
        market_order_policy: policy,
    }
}

fn engine_with_feed(feed: Arc<InMemoryFeed>) -> TradingEngine {
    TradingEngine::new(config(100_000, MarketOrderPolicy::ReferenceFill), feed).unwrap()
}

#[test]
fn test_limit_pair_fills_both_and_empties_book() {
    let engine = engine_with_feed(Arc::new(InMemoryFeed::new()));
    let x = Symbol::new("X");

    let buy = engine.submit_order(OrderRequest::limit("X", Side::BUY, px(100), 10)).unwrap();
    assert_eq!(buy.status, OrderStatus::New);

    let sell = engine.submit_order(OrderRequest::limit("X", Side::SELL, px(100), 10)).unwrap();
    assert_eq!(sell.status, OrderStatus::Filled);
    assert_eq!(sell.average_price, Some(Decimal::from(100)));

    let buy = engine.get_order(&buy.order_id).unwrap();
    assert_eq!(buy.status, OrderStatus::Filled);
    assert_eq!(buy.filled_quantity, Quantity::new(10));

    let snapshot = engine.book_snapshot(&x, 10).unwrap();
    assert!(snapshot.is_empty());
    assert_eq!(snapshot.last_trade.map(|t| t.price), Some(px(100)));
}

#[test]
fn test_same_price_fills_in_arrival_order() {
    let engine = engine_with_feed(Arc::new(InMemoryFeed::new()));

    let first = engine.submit_order(OrderRequest::limit("X", Side::BUY, px(101), 5)).unwrap();
    let second = engine.submit_order(OrderRequest::limit("X", Side::BUY, px(101), 5)).unwrap();
    let sell = engine.submit_order(OrderRequest::limit("X", Side::SELL, px(101), 7)).unwrap();

    let first = engine.get_order(&first.order_id).unwrap();
    let second = engine.get_order(&second.order_id).unwrap();

    assert_eq!(first.status, OrderStatus::Filled);
    assert_eq!(first.filled_quantity, Quantity::new(5));
    assert_eq!(second.status, OrderStatus::PartiallyFilled);
    assert_eq!(second.filled_quantity, Quantity::new(2));
    assert_eq!(sell.status, OrderStatus::Filled);
    assert_eq!(engine.depth(&Symbol::new("X"), Side::BUY).unwrap(), Quantity::new(3));
}

#[test]
fn test_market_buy_on_empty_book_fills_at_reference() {
    let feed = Arc::new(InMemoryFeed::with_closes([(Symbol::new("X"), vec![px(95), px(97)])]));
    let engine = engine_with_feed(feed);

    let order = engine.submit_order(OrderRequest::market("X", Side::BUY, 10)).unwrap();

    assert_eq!(order.status, OrderStatus::Filled);
    assert_eq!(order.average_price, Some(Decimal::from(97)));
    assert!(engine.active_orders(None).is_empty());
    assert!(engine.book_snapshot(&Symbol::new("X"), 5).unwrap().is_empty());
    assert_eq!(engine.cash(), Decimal::from(100_000 - 970));
    assert_eq!(engine.position(&Symbol::new("X")).quantity, 10);
}

#[test]
fn test_market_sweep_then_reference_remainder() {
    let feed = Arc::new(InMemoryFeed::with_closes([(Symbol::new("X"), vec![px(120)])]));
    let engine = engine_with_feed(feed);

    engine.submit_order(OrderRequest::limit("X", Side::SELL, px(100), 3)).unwrap();
    engine.submit_order(OrderRequest::limit("X", Side::SELL, px(101), 3)).unwrap();
    let buy = engine.submit_order(OrderRequest::market("X", Side::BUY, 10)).unwrap();

    // 3 @ 100 + 3 @ 101 + 4 @ 120
    assert_eq!(buy.filled_value(), Decimal::from(300 + 303 + 480));
    assert_eq!(buy.status, OrderStatus::Filled);
    // Book legs net out inside the portfolio; the reference leg does not
    assert_eq!(engine.cash(), Decimal::from(100_000 - 480));
    assert_eq!(engine.position(&Symbol::new("X")).quantity, 4);
}

#[test]
fn test_reject_unfilled_policy() {
    let feed = Arc::new(InMemoryFeed::with_closes([(Symbol::new("X"), vec![px(100)])]));
    let engine = TradingEngine::new(config(100_000, MarketOrderPolicy::RejectUnfilled), feed).unwrap();

    engine.submit_order(OrderRequest::limit("X", Side::SELL, px(100), 4)).unwrap();
    let err = engine.submit_order(OrderRequest::market("X", Side::BUY, 10)).unwrap_err();

    assert_eq!(
        err,
        TradingError::InsufficientLiquidity {
            symbol: "X".to_string(),
            unfilled: 6,
        }
    );
    // Nothing matched
    assert_eq!(engine.depth(&Symbol::new("X"), Side::SELL).unwrap(), Quantity::new(4));

    let filled = engine.submit_order(OrderRequest::market("X", Side::BUY, 4)).unwrap();
    assert_eq!(filled.status, OrderStatus::Filled);
}

#[test]
fn test_cash_conservation_round_trip() {
    let feed = Arc::new(InMemoryFeed::with_closes([(Symbol::new("X"), vec![px(50)])]));
    let engine = engine_with_feed(feed.clone());

    engine.submit_order(OrderRequest::market("X", Side::BUY, 20)).unwrap();
    assert_eq!(engine.cash(), Decimal::from(100_000 - 1_000));

    feed.push(&Symbol::new("X"), px(55));
    engine.submit_order(OrderRequest::market("X", Side::SELL, 20)).unwrap();
    assert_eq!(engine.cash(), Decimal::from(100_000 - 1_000 + 1_100));
    assert_eq!(engine.realized_pnl(), Decimal::from(100));
    assert!(engine.position(&Symbol::new("X")).is_flat());
}

#[test]
fn test_cancel_is_not_repeatable() {
    let engine = engine_with_feed(Arc::new(InMemoryFeed::new()));

    let resting = engine.submit_order(OrderRequest::limit("Y", Side::BUY, px(10), 5)).unwrap();
    engine.cancel_order(&resting.order_id).unwrap();
    assert!(matches!(
        engine.cancel_order(&resting.order_id),
        Err(TradingError::InvalidState { .. })
    ));

    engine.submit_order(OrderRequest::limit("Y", Side::SELL, px(10), 5)).unwrap();
    let buy = engine.submit_order(OrderRequest::limit("Y", Side::BUY, px(10), 5)).unwrap();
    assert_eq!(buy.status, OrderStatus::Filled);
    assert!(matches!(
        engine.cancel_order(&buy.order_id),
        Err(TradingError::InvalidState { .. })
    ));
    assert_eq!(engine.available_cash(), engine.cash());
}

#[test]
fn test_out_of_range_price_never_reaches_the_engine() {
    let json = r#"{"symbol":"X","side":"SELL","order_type":{"type":"LIMIT","price":"79228162514264337593543950335"},"quantity":2}"#;
    assert!(serde_json::from_str::<OrderRequest>(json).is_err());

    let json = r#"{"symbol":"X","side":"SELL","order_type":{"type":"LIMIT","price":"1000000000"},"quantity":2}"#;
    let request: OrderRequest = serde_json::from_str(json).unwrap();
    assert_eq!(request.order_type.limit_price(), Some(px(types::numeric::MAX_PRICE)));
}

#[test]
fn test_amend_reprices_and_keeps_books_consistent() {
    let engine = engine_with_feed(Arc::new(InMemoryFeed::new()));
    let x = Symbol::new("X");

    let ask = engine.submit_order(OrderRequest::limit("X", Side::SELL, px(110), 10)).unwrap();
    let bid = engine.submit_order(OrderRequest::limit("X", Side::BUY, px(100), 10)).unwrap();

    let ask = engine.amend_order(&ask.order_id, Amendment::quantity(4)).unwrap();
    assert_eq!(engine.depth(&x, Side::SELL).unwrap(), Quantity::new(4));

    let bid = engine.amend_order(&bid.order_id, Amendment::price(px(110))).unwrap();
    assert_eq!(bid.filled_quantity, Quantity::new(4));
    assert_eq!(bid.average_price, Some(Decimal::from(110)));
    assert_eq!(engine.get_order(&ask.order_id).unwrap().status, OrderStatus::Filled);

    let snapshot = engine.book_snapshot(&x, 5).unwrap();
    assert!(snapshot.asks.is_empty());
    assert_eq!(snapshot.bids.len(), 1);
    assert_eq!(engine.available_cash(), Decimal::from(100_000 - 110 * 6));

    let err = engine.amend_order(&ask.order_id, Amendment::quantity(8)).unwrap_err();
    assert!(matches!(err, TradingError::InvalidState { .. }));
}

#[test]
fn test_concurrent_submissions_keep_books_consistent() {
    let engine = Arc::new(engine_with_feed(Arc::new(InMemoryFeed::new())));

    let handles: Vec<_> = (0..8u64)
        .map(|worker| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || {
                let symbol = if worker % 2 == 0 { "X" } else { "Y" };
                for i in 0..50u64 {
                    let side = if (worker + i) % 2 == 0 { Side::BUY } else { Side::SELL };
                    let price = px(95 + (worker * 7 + i) % 10);
                    engine
                        .submit_order(OrderRequest::limit(symbol, side, price, 1 + i % 4))
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let orders = engine.list_orders(None, None);
    assert_eq!(orders.len(), 400);
    assert!(orders.iter().all(|order| order.check_invariant()));
    assert!(orders.windows(2).all(|w| w[0].sequence < w[1].sequence));

    for symbol in [Symbol::new("X"), Symbol::new("Y")] {
        let filled = |side: Side| -> u64 {
            orders
                .iter()
                .filter(|o| o.symbol == symbol && o.side == side)
                .map(|o| o.filled_quantity.as_u64())
                .sum()
        };
        assert_eq!(filled(Side::BUY), filled(Side::SELL));

        let snapshot = engine.book_snapshot(&symbol, 100).unwrap();
        if let (Some(bid), Some(ask)) = (snapshot.best_bid, snapshot.best_ask) {
            assert!(bid < ask);
        }
        // Every trade was between two of the portfolio's own orders
        assert!(engine.position(&symbol).is_flat());
    }

    assert_eq!(engine.cash(), Decimal::from(100_000));
    let committed: Decimal = engine
        .active_orders(None)
        .iter()
        .filter(|o| o.side == Side::BUY)
        .filter_map(|o| o.limit_price().map(|p| p.notional(o.remaining_quantity)))
        .sum();
    assert_eq!(engine.available_cash(), engine.cash() - committed);
}

proptest! {
    /// Buying q at p and selling q at p2 against reference prices moves cash
    /// by exactly −q×p then +q×p2
    #[test]
    fn prop_cash_conservation(qty in 1u64..500, p in 1u64..200, p2 in 1u64..200) {
        let x = Symbol::new("X");
        let feed = Arc::new(InMemoryFeed::with_closes([(x.clone(), vec![px(p)])]));
        let engine = engine_with_feed(feed.clone());
        let start = engine.cash();

        engine.submit_order(OrderRequest::market("X", Side::BUY, qty)).unwrap();
        let after_buy = engine.cash();
        prop_assert_eq!(after_buy, start - Decimal::from(qty * p));

        feed.push(&x, px(p2));
        engine.submit_order(OrderRequest::market("X", Side::SELL, qty)).unwrap();
        prop_assert_eq!(engine.cash(), after_buy + Decimal::from(qty * p2));
        prop_assert!(engine.position(&x).is_flat());
    }
}
