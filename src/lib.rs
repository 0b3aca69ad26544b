//! # limit-book
//!
//! Matching core of a single-instrument limit order book.
//!
//! ## Architecture
//!
//! - **Types**: orders, requests, matches and execution reports
//! - **OrderBook**: slab-backed FIFO price levels on two ordered sides
//! - **Engine**: price-time priority matching, cancellation and queries
//!
//! ## Design Principles
//!
//! 1. **Determinism**: arrival sequence numbers, never wall-clock time, order the queue
//! 2. **No Floating Point**: prices are integer ticks
//! 3. **Pre-allocated Memory**: slab allocation for O(1) order operations
//! 4. **Serialized Mutation**: one writer per book, see [`SharedEngine`]
//!
//! ## Invariants
//!
//! After every submit and cancel:
//!
//! - each level's volume equals the sum of its orders' remaining sizes
//! - no empty level remains
//! - the best bid is strictly below the best ask, or a side is empty

// ============================================================================
// Module declarations
// ============================================================================

/// Error type and result alias
pub mod error;

/// Engine configuration
pub mod config;

/// Core data types: Order, Match, Execution
pub mod types;

/// Order book: price levels and book sides
pub mod orderbook;

/// Matching engine and its shared handle
pub mod engine;

// ============================================================================
// Re-exports for convenience
// ============================================================================

pub use config::{EngineConfig, SelfTradePolicy};
pub use engine::{MatchingEngine, SharedEngine};
pub use error::{BookError, Result};
pub use orderbook::{BookSnapshot, LevelView, OrderBook};
pub use types::{Execution, Match, Order, OrderId, OrderKind, OrderRequest, OrderStatus, Side};
