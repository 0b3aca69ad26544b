//! Matching engine module.
//!
//! ## Design Principles
//!
//! 1. **Determinism**: the same request sequence yields the same matches and book
//! 2. **Fixed-Point Math**: prices are tick counts, no floating point
//! 3. **Synchronous Execution**: no I/O and no suspension points in matching
//! 4. **Price-Time Priority**: best price first, then arrival order
//!
//! ## Matching Rules
//!
//! - **Buy orders** match against asks (lowest price first)
//! - **Sell orders** match against bids (highest price first)
//! - **Execution price** is always the resting order's price
//! - **Unfilled limit quantity** rests; unfilled market quantity is dropped
//!
//! ## Example
//!
//! ```
//! use limit_book::engine::MatchingEngine;
//! use limit_book::types::Side;
//!
//! let mut engine = MatchingEngine::new();
//! engine.submit(Side::Sell, 100, 10).unwrap();
//!
//! let result = engine.submit(Side::Buy, 101, 10).unwrap();
//! assert!(result.is_fully_filled());
//! assert_eq!(result.matches[0].price, 100);
//! ```

pub mod matcher;
pub mod shared;

pub use matcher::MatchingEngine;
pub use shared::SharedEngine;
