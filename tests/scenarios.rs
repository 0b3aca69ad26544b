//! End-to-end matching scenarios against a fresh engine.

use limit_book::{BookError, EngineConfig, LevelView, MatchingEngine, OrderStatus, Side};

fn engine() -> MatchingEngine {
    MatchingEngine::with_config(EngineConfig {
        order_capacity: 128,
        audit_invariants: true,
        ..EngineConfig::default()
    })
    .unwrap()
}

#[test]
fn walkthrough_partial_fill_then_price_improvement() {
    let mut engine = engine();

    // Empty book, one ask rests
    let ask = engine.submit(Side::Sell, 100, 10).unwrap();
    assert!(ask.matches.is_empty());
    assert_eq!(
        engine.depth(Side::Sell, 10),
        vec![LevelView { price: 100, volume: 10, order_count: 1 }]
    );

    // Bid 4 @ 100 takes part of it
    let bid = engine.submit(Side::Buy, 100, 4).unwrap();
    assert_eq!(bid.matches.len(), 1);
    assert_eq!((bid.matches[0].price, bid.matches[0].quantity), (100, 4));
    assert_eq!(bid.status, OrderStatus::Filled);
    assert_eq!(engine.best_ask().map(|l| l.volume), Some(6));

    // Bid 10 @ 101 fills 6 at the maker's 100 and rests 4 @ 101
    let sweep = engine.submit(Side::Buy, 101, 10).unwrap();
    assert_eq!(sweep.matches.len(), 1);
    assert_eq!(sweep.matches[0].price, 100);
    assert_eq!(sweep.matches[0].quantity, 6);
    assert_eq!(sweep.matches[0].maker_order_id, ask.order_id);
    assert_eq!(sweep.completed_makers, vec![ask.order_id]);
    assert_eq!(sweep.resting, Some(sweep.order_id));
    assert_eq!(sweep.status, OrderStatus::PartiallyFilled);

    assert!(engine.best_ask().is_none());
    assert_eq!(
        engine.best_bid(),
        Some(LevelView { price: 101, volume: 4, order_count: 1 })
    );
}

#[test]
fn fifo_fills_oldest_order_entirely_first() {
    let mut engine = engine();
    let a = engine.submit(Side::Sell, 100, 5).unwrap().order_id;
    let b = engine.submit(Side::Sell, 100, 5).unwrap().order_id;

    // Smaller than A + B: A must be consumed in full before B is touched
    let taker = engine.submit(Side::Buy, 100, 7).unwrap();

    let makers: Vec<(u64, u64)> = taker
        .matches
        .iter()
        .map(|m| (m.maker_order_id, m.quantity))
        .collect();
    assert_eq!(makers, vec![(a, 5), (b, 2)]);
    assert!(engine.order(a).is_none());
    assert_eq!(engine.order(b).map(|o| o.remaining), Some(3));
}

#[test]
fn fifo_ignores_size() {
    let mut engine = engine();
    let small = engine.submit(Side::Buy, 50, 1).unwrap().order_id;
    let large = engine.submit(Side::Buy, 50, 100).unwrap().order_id;

    let taker = engine.submit(Side::Sell, 50, 1).unwrap();

    assert_eq!(taker.matches[0].maker_order_id, small);
    assert_eq!(engine.order(large).map(|o| o.remaining), Some(100));
}

#[test]
fn cancel_in_the_middle_keeps_priority() {
    let mut engine = engine();
    let ids: Vec<u64> = (0..3)
        .map(|_| engine.submit(Side::Sell, 100, 2).unwrap().order_id)
        .collect();

    engine.cancel(ids[1]).unwrap();
    let taker = engine.submit(Side::Buy, 100, 4).unwrap();

    let makers: Vec<u64> = taker.matches.iter().map(|m| m.maker_order_id).collect();
    assert_eq!(makers, vec![ids[0], ids[2]]);
}

#[test]
fn multi_level_sweep_reports_each_level_price() {
    let mut engine = engine();
    engine.submit(Side::Sell, 102, 3).unwrap();
    engine.submit(Side::Sell, 100, 3).unwrap();
    engine.submit(Side::Sell, 101, 3).unwrap();
    engine.submit(Side::Sell, 110, 3).unwrap();

    let taker = engine.submit(Side::Buy, 102, 20).unwrap();

    let fills: Vec<(u64, u64)> = taker.matches.iter().map(|m| (m.price, m.quantity)).collect();
    assert_eq!(fills, vec![(100, 3), (101, 3), (102, 3)]);
    assert_eq!(taker.rested, 11);
    assert_eq!(engine.best_bid().map(|l| l.price), Some(102));
    assert_eq!(engine.best_ask().map(|l| l.price), Some(110));
    assert_eq!(engine.spread(), Some(8));
}

#[test]
fn filling_last_order_removes_level_from_depth() {
    let mut engine = engine();
    engine.submit(Side::Buy, 99, 2).unwrap();
    engine.submit(Side::Buy, 98, 2).unwrap();

    engine.submit(Side::Sell, 99, 2).unwrap();

    let prices: Vec<u64> = engine.depth(Side::Buy, 10).iter().map(|l| l.price).collect();
    assert_eq!(prices, vec![98]);
    assert!(!engine.book().side(Side::Buy).contains_price(99));
}

#[test]
fn canceling_last_order_removes_level_from_depth() {
    let mut engine = engine();
    let id = engine.submit(Side::Sell, 105, 2).unwrap().order_id;
    engine.submit(Side::Sell, 106, 2).unwrap();

    engine.cancel(id).unwrap();

    let prices: Vec<u64> = engine.depth(Side::Sell, 10).iter().map(|l| l.price).collect();
    assert_eq!(prices, vec![106]);
}

#[test]
fn cancel_of_terminal_order_leaves_book_byte_identical() {
    let mut engine = engine();
    let filled = engine.submit(Side::Sell, 100, 1).unwrap().order_id;
    engine.submit(Side::Buy, 100, 1).unwrap();
    let canceled = engine.submit(Side::Sell, 101, 1).unwrap().order_id;
    engine.cancel(canceled).unwrap();
    engine.submit(Side::Buy, 95, 7).unwrap();
    engine.submit(Side::Sell, 104, 3).unwrap();

    let before = engine.book().state_root().unwrap();
    let snapshot = engine.snapshot(10);

    for id in [filled, canceled, 9_999] {
        assert_eq!(engine.cancel(id), Err(BookError::OrderNotFound(id)));
    }

    assert_eq!(engine.book().state_root().unwrap(), before);
    assert_eq!(engine.snapshot(10), snapshot);
    assert!(!engine.is_halted());
}

#[test]
fn rejected_submission_changes_nothing() {
    let mut engine = engine();
    engine.submit(Side::Sell, 100, 5).unwrap();
    let before = engine.book().state_root().unwrap();

    assert!(matches!(
        engine.submit(Side::Buy, 0, 5),
        Err(BookError::InvalidOrder { .. })
    ));
    assert!(matches!(
        engine.submit(Side::Buy, 100, 0),
        Err(BookError::InvalidOrder { .. })
    ));

    assert_eq!(engine.book().state_root().unwrap(), before);
}

#[test]
fn non_crossing_orders_rest_on_both_sides() {
    let mut engine = engine();
    engine.submit(Side::Buy, 99, 5).unwrap();
    let ask = engine.submit(Side::Sell, 100, 5).unwrap();

    assert!(ask.matches.is_empty());
    assert_eq!(ask.status, OrderStatus::Resting);
    let snapshot = engine.snapshot(1);
    assert_eq!(snapshot.spread(), Some(1));
}

#[test]
fn tick_scale_parses_human_prices() {
    let mut engine = MatchingEngine::with_config(
        serde_json::from_str(r#"{ "tick_size": "0.25", "audit_invariants": true }"#).unwrap(),
    )
    .unwrap();
    let scale = engine.price_scale();

    let price = scale.to_ticks("100.75").unwrap();
    engine.submit(Side::Sell, price, 1).unwrap();

    assert_eq!(price, 403);
    assert_eq!(scale.format(engine.best_ask().unwrap().price), "100.75");
}

#[test]
fn oversized_order_at_a_full_level_is_rejected_and_engine_continues() {
    let mut engine = engine();
    engine.submit(Side::Buy, 90, u64::MAX - 10).unwrap();

    assert!(matches!(
        engine.submit(Side::Buy, 90, 11),
        Err(BookError::InvalidOrder { .. })
    ));
    assert!(!engine.is_halted());

    // Still fits exactly
    engine.submit(Side::Buy, 90, 10).unwrap();
    assert_eq!(engine.best_bid().map(|l| l.volume), Some(u64::MAX));

    let taker = engine.submit(Side::Sell, 90, 5).unwrap();
    assert_eq!(taker.filled, 5);
    assert_eq!(engine.best_bid().map(|l| l.volume), Some(u64::MAX - 5));
    engine.book().verify().unwrap();
}
