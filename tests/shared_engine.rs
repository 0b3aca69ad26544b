//! Concurrent submitters against one `SharedEngine`.

use std::thread;

use limit_book::{EngineConfig, MatchingEngine, Side, SharedEngine};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn concurrent_submitters_keep_book_consistent() {
    init_tracing();

    const THREADS: u64 = 8;
    const PER_THREAD: u64 = 500;

    let engine = SharedEngine::new(
        MatchingEngine::with_config(EngineConfig {
            order_capacity: 4_096,
            audit_invariants: true,
            ..EngineConfig::default()
        })
        .unwrap(),
    );

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let engine = engine.clone();
            thread::spawn(move || {
                let mut bought = 0u64;
                let mut sold = 0u64;
                for i in 0..PER_THREAD {
                    let side = if (t + i) % 2 == 0 { Side::Buy } else { Side::Sell };
                    let price = 1_000 + (i * 7 + t) % 20;
                    let execution = engine.submit(side, price, 1 + i % 5).unwrap();
                    assert_eq!(
                        execution.filled + execution.rested + execution.discarded,
                        1 + i % 5
                    );
                    match side {
                        Side::Buy => bought += execution.filled,
                        Side::Sell => sold += execution.filled,
                    }
                }
                (bought, sold)
            })
        })
        .collect();

    let (bought, sold) = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .fold((0, 0), |acc, (b, s)| (acc.0 + b, acc.1 + s));

    assert!(!engine.is_halted());
    engine.read(|e| e.book().verify()).unwrap();

    let snapshot = engine.snapshot(usize::MAX);
    if let (Some(bid), Some(ask)) = (snapshot.best_bid(), snapshot.best_ask()) {
        assert!(bid.price < ask.price);
    }

    // Taker-side fills were counted once per match; every match has a
    // maker on the other side, so total traded volume is what was
    // submitted minus what is still resting.
    let submitted: u64 = (0..PER_THREAD).map(|i| 1 + i % 5).sum::<u64>() * THREADS;
    let resting: u64 = snapshot
        .bids
        .iter()
        .chain(snapshot.asks.iter())
        .map(|l| l.volume)
        .sum();
    assert_eq!(submitted - resting, 2 * (bought + sold));
}

#[test]
fn cancel_races_submission_without_double_removal() {
    init_tracing();

    let engine = SharedEngine::new(MatchingEngine::new());
    let ids: Vec<u64> = (0..200)
        .map(|i| engine.submit(Side::Sell, 100 + i % 10, 1).unwrap().order_id)
        .collect();

    let taker = {
        let engine = engine.clone();
        thread::spawn(move || engine.submit(Side::Buy, 200, 200).unwrap().filled)
    };
    let canceler = {
        let engine = engine.clone();
        thread::spawn(move || ids.iter().filter(|&&id| engine.cancel(id).is_ok()).count() as u64)
    };

    let filled = taker.join().unwrap();
    let canceled = canceler.join().unwrap();

    // Each resting unit was either traded or canceled, never both
    assert_eq!(filled + canceled, 200);
    assert!(engine.best_ask().is_none());
    engine.read(|e| e.book().verify()).unwrap();
}
