//! Read-only copies of book state for market data consumers.

use crate::orderbook::PriceLevel;

/// Aggregate state of one price level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelView {
    pub price: u64,
    pub volume: u64,
    pub order_count: usize,
}

impl From<&PriceLevel> for LevelView {
    fn from(level: &PriceLevel) -> Self {
        Self {
            price: level.price,
            volume: level.total_quantity,
            order_count: level.order_count,
        }
    }
}

/// Top-of-book depth for both sides, best level first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookSnapshot {
    pub bids: Vec<LevelView>,
    pub asks: Vec<LevelView>,
}

impl BookSnapshot {
    pub fn best_bid(&self) -> Option<LevelView> {
        self.bids.first().copied()
    }

    pub fn best_ask(&self) -> Option<LevelView> {
        self.asks.first().copied()
    }

    /// best ask - best bid, when both sides are present
    pub fn spread(&self) -> Option<u64> {
        let bid = self.best_bid()?.price;
        let ask = self.best_ask()?.price;
        ask.checked_sub(bid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_spread() {
        let level = |price| LevelView {
            price,
            volume: 1,
            order_count: 1,
        };
        let snapshot = BookSnapshot {
            bids: vec![level(99), level(98)],
            asks: vec![level(101)],
        };

        assert_eq!(snapshot.best_bid().map(|l| l.price), Some(99));
        assert_eq!(snapshot.spread(), Some(2));
        assert_eq!(BookSnapshot::default().spread(), None);
    }
}
