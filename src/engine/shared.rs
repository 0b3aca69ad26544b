//! Thread-safe handle to one engine.
//!
//! A single `parking_lot::Mutex` guards the whole engine. Every submit and
//! cancel runs start to finish under the lock, so no observer can see a
//! half-applied fill loop, and a cancel racing a submission lands strictly
//! before or after it. Queries take the same lock briefly and return copies.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::engine::MatchingEngine;
use crate::error::Result;
use crate::orderbook::{BookSnapshot, LevelView};
use crate::types::{Execution, Order, OrderId, OrderRequest, Side};

#[derive(Debug, Clone)]
pub struct SharedEngine {
    inner: Arc<Mutex<MatchingEngine>>,
}

impl SharedEngine {
    pub fn new(engine: MatchingEngine) -> Self {
        Self {
            inner: Arc::new(Mutex::new(engine)),
        }
    }

    pub fn submit(&self, side: Side, price: u64, size: u64) -> Result<Execution> {
        self.inner.lock().submit(side, price, size)
    }

    pub fn submit_request(&self, request: OrderRequest) -> Result<Execution> {
        self.inner.lock().submit_request(request)
    }

    pub fn cancel(&self, order_id: OrderId) -> Result<Order> {
        self.inner.lock().cancel(order_id)
    }

    pub fn best_bid(&self) -> Option<LevelView> {
        self.inner.lock().best_bid()
    }

    pub fn best_ask(&self) -> Option<LevelView> {
        self.inner.lock().best_ask()
    }

    pub fn depth(&self, side: Side, levels: usize) -> Vec<LevelView> {
        self.inner.lock().depth(side, levels)
    }

    /// Both sides copied under one lock acquisition
    pub fn snapshot(&self, levels: usize) -> BookSnapshot {
        self.inner.lock().snapshot(levels)
    }

    pub fn is_halted(&self) -> bool {
        self.inner.lock().is_halted()
    }

    /// Run a read-only closure against the engine while holding the lock
    pub fn read<R>(&self, f: impl FnOnce(&MatchingEngine) -> R) -> R {
        f(&*self.inner.lock())
    }
}

impl From<MatchingEngine> for SharedEngine {
    fn from(engine: MatchingEngine) -> Self {
        Self::new(engine)
    }
}
