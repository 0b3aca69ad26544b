//! One side of the book: price levels ordered best-first.
//!
//! Levels live in a `BTreeMap` keyed by price. The map is both the price
//! index and the ordered structure, so the two can never disagree. Asks read
//! the map from the low end, bids from the high end; the best level is the
//! first or last entry, O(log n).

use std::collections::btree_map::{self, BTreeMap};

use crate::error::{BookError, Result};
use crate::orderbook::PriceLevel;
use crate::types::Side;

#[derive(Debug, Clone)]
pub struct BookSide {
    side: Side,
    levels: BTreeMap<u64, PriceLevel>,
}

impl BookSide {
    pub fn new(side: Side) -> Self {
        Self {
            side,
            levels: BTreeMap::new(),
        }
    }

    #[inline]
    pub fn side(&self) -> Side {
        self.side
    }

    /// Number of price levels
    #[inline]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Level closest to the inside of the market
    pub fn best_level(&self) -> Option<&PriceLevel> {
        match self.side {
            Side::Sell => self.levels.values().next(),
            Side::Buy => self.levels.values().next_back(),
        }
    }

    #[inline]
    pub fn best_price(&self) -> Option<u64> {
        self.best_level().map(|level| level.price)
    }

    /// Best price an incoming opposite order with `limit` may trade at.
    ///
    /// `None` limit is a market order and crosses any level. A bid crosses
    /// an ask when `bid >= ask`; an ask crosses a bid when `ask <= bid`.
    pub fn crossing_price(&self, limit: Option<u64>) -> Option<u64> {
        let best = self.best_price()?;
        let crosses = match (self.side, limit) {
            (_, None) => true,
            (Side::Sell, Some(bid)) => bid >= best,
            (Side::Buy, Some(ask)) => ask <= best,
        };
        crosses.then_some(best)
    }

    #[inline]
    pub fn level(&self, price: u64) -> Option<&PriceLevel> {
        self.levels.get(&price)
    }

    #[inline]
    pub fn level_mut(&mut self, price: u64) -> Option<&mut PriceLevel> {
        self.levels.get_mut(&price)
    }

    #[inline]
    pub fn contains_price(&self, price: u64) -> bool {
        self.levels.contains_key(&price)
    }

    pub fn get_or_create_level(&mut self, price: u64) -> &mut PriceLevel {
        self.levels
            .entry(price)
            .or_insert_with(|| PriceLevel::new(price))
    }

    /// Drop an emptied level. Removing a level that still holds orders is a
    /// violation; the level is left in place.
    pub fn remove_level(&mut self, price: u64) -> Result<PriceLevel> {
        let level = self.levels.get(&price).ok_or_else(|| {
            BookError::invariant(format!("no {} level at {price} to remove", self.side))
        })?;
        if !level.is_empty() {
            return Err(BookError::invariant(format!(
                "{} level {price} removed with {} orders",
                self.side, level.order_count
            )));
        }
        self.levels
            .remove(&price)
            .ok_or_else(|| BookError::invariant(format!("{} level {price} vanished", self.side)))
    }

    /// Levels best-first
    pub fn iter(&self) -> Levels<'_> {
        Levels {
            inner: self.levels.values(),
            ascending: self.side == Side::Sell,
        }
    }
}

/// Best-first iterator over a side's levels.
pub struct Levels<'a> {
    inner: btree_map::Values<'a, u64, PriceLevel>,
    ascending: bool,
}

impl<'a> Iterator for Levels<'a> {
    type Item = &'a PriceLevel;

    fn next(&mut self) -> Option<&'a PriceLevel> {
        if self.ascending {
            self.inner.next()
        } else {
            self.inner.next_back()
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn side_with(side: Side, prices: &[u64]) -> BookSide {
        let mut book_side = BookSide::new(side);
        for &price in prices {
            let level = book_side.get_or_create_level(price);
            // Stand-in for a resting order so the level is non-empty
            level.order_count = 1;
            level.total_quantity = 10;
        }
        book_side
    }

    #[test]
    fn test_ask_side_ordering() {
        let asks = side_with(Side::Sell, &[102, 100, 101]);

        assert_eq!(asks.best_price(), Some(100));
        let prices: Vec<u64> = asks.iter().map(|l| l.price).collect();
        assert_eq!(prices, vec![100, 101, 102]);
    }

    #[test]
    fn test_bid_side_ordering() {
        let bids = side_with(Side::Buy, &[99, 101, 100]);

        assert_eq!(bids.best_price(), Some(101));
        let prices: Vec<u64> = bids.iter().map(|l| l.price).collect();
        assert_eq!(prices, vec![101, 100, 99]);
    }

    #[test]
    fn test_get_or_create_reuses_level() {
        let mut asks = side_with(Side::Sell, &[100]);
        asks.get_or_create_level(100).total_quantity = 25;

        assert_eq!(asks.len(), 1);
        assert_eq!(asks.level(100).unwrap().total_quantity, 25);
    }

    #[test]
    fn test_crossing_price() {
        let asks = side_with(Side::Sell, &[100, 101]);
        assert_eq!(asks.crossing_price(Some(100)), Some(100));
        assert_eq!(asks.crossing_price(Some(105)), Some(100));
        assert_eq!(asks.crossing_price(Some(99)), None);
        assert_eq!(asks.crossing_price(None), Some(100));

        let bids = side_with(Side::Buy, &[98, 99]);
        assert_eq!(bids.crossing_price(Some(99)), Some(99));
        assert_eq!(bids.crossing_price(Some(100)), None);
        assert_eq!(bids.crossing_price(None), Some(99));

        assert_eq!(BookSide::new(Side::Sell).crossing_price(None), None);
    }

    #[test]
    fn test_remove_level_requires_empty() {
        let mut bids = side_with(Side::Buy, &[100]);

        assert!(bids.remove_level(100).is_err());
        assert!(bids.contains_price(100));

        bids.level_mut(100).unwrap().order_count = 0;
        bids.remove_level(100).unwrap();
        assert!(bids.is_empty());
        assert!(bids.best_level().is_none());

        assert!(bids.remove_level(100).is_err());
    }
}
