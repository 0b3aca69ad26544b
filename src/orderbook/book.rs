//! Single-instrument order book.
//!
//! ## Architecture
//!
//! - **Slab**: owns every resting order; stable keys back the level queues
//! - **BookSide** x2: bids and asks, each a `BTreeMap` of price levels
//! - **HashMap**: order id to slab key, for O(1) cancel
//!
//! Ownership flows book -> levels -> orders. An order leaves the slab, the
//! index and its level together, so a terminal order is never reachable.
//!
//! ## Example
//!
//! ```
//! use limit_book::orderbook::OrderBook;
//! use limit_book::types::{Order, OrderRequest, Side};
//!
//! let mut book = OrderBook::with_capacity(16);
//! book.insert(Order::new(1, &OrderRequest::limit(Side::Buy, 99, 5), 1)).unwrap();
//! book.insert(Order::new(2, &OrderRequest::limit(Side::Sell, 101, 5), 2)).unwrap();
//!
//! assert_eq!(book.best_bid().map(|l| l.price), Some(99));
//! assert_eq!(book.best_ask().map(|l| l.price), Some(101));
//! assert_eq!(book.spread(), Some(2));
//! ```

use std::collections::HashMap;

use sha2::{Digest, Sha256};
use slab::Slab;

use crate::error::{BookError, Result};
use crate::orderbook::{BookSide, BookSnapshot, LevelView, OrderNode, PriceLevel};
use crate::types::{Order, OrderId, OrderKind, Side};

/// Copy of the order at the head of the best crossing level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestingHead {
    pub key: usize,
    pub order_id: OrderId,
    pub owner: Option<u64>,
    pub price: u64,
    pub remaining: u64,
}

#[derive(Debug)]
pub struct OrderBook {
    orders: Slab<OrderNode>,
    bids: BookSide,
    asks: BookSide,
    order_index: HashMap<OrderId, usize>,
    bid_count: usize,
    ask_count: usize,
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderBook {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Create a book with `order_capacity` slots pre-allocated
    pub fn with_capacity(order_capacity: usize) -> Self {
        Self {
            orders: Slab::with_capacity(order_capacity),
            bids: BookSide::new(Side::Buy),
            asks: BookSide::new(Side::Sell),
            order_index: HashMap::with_capacity(order_capacity),
            bid_count: 0,
            ask_count: 0,
        }
    }

    // ========================================================================
    // Capacity and Size
    // ========================================================================

    #[inline]
    pub fn capacity(&self) -> usize {
        self.orders.capacity()
    }

    /// Resting orders on both sides
    #[inline]
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    #[inline]
    pub fn bid_count(&self) -> usize {
        self.bid_count
    }

    #[inline]
    pub fn ask_count(&self) -> usize {
        self.ask_count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    #[inline]
    pub fn bid_levels(&self) -> usize {
        self.bids.len()
    }

    #[inline]
    pub fn ask_levels(&self) -> usize {
        self.asks.len()
    }

    #[inline]
    pub fn side(&self, side: Side) -> &BookSide {
        match side {
            Side::Buy => &self.bids,
            Side::Sell => &self.asks,
        }
    }

    fn parts_mut(&mut self, side: Side) -> (&mut BookSide, &mut Slab<OrderNode>) {
        match side {
            Side::Buy => (&mut self.bids, &mut self.orders),
            Side::Sell => (&mut self.asks, &mut self.orders),
        }
    }

    fn count_mut(&mut self, side: Side) -> &mut usize {
        match side {
            Side::Buy => &mut self.bid_count,
            Side::Sell => &mut self.ask_count,
        }
    }

    // ========================================================================
    // Order Management
    // ========================================================================

    /// Rest an order at its limit price, creating the level if needed.
    ///
    /// Returns the slab key. This does not match; the caller guarantees the
    /// order does not cross the opposite side.
    pub fn insert(&mut self, order: Order) -> Result<usize> {
        if order.remaining == 0 || order.kind() == OrderKind::Market {
            return Err(BookError::invariant(format!("order {order} cannot rest")));
        }
        if self.order_index.contains_key(&order.id) {
            return Err(BookError::invariant(format!("order id {} already resting", order.id)));
        }

        let order_id = order.id;
        let price = order.price;
        let side = order.side();
        if !self.can_rest(side, price, order.remaining) {
            return Err(BookError::invariant(format!(
                "{side} level {price} volume overflow resting order {order_id}"
            )));
        }

        let key = self.orders.insert(OrderNode::new(order));
        let (book_side, orders) = self.parts_mut(side);
        if let Err(err) = book_side.get_or_create_level(price).push_back(key, orders) {
            if book_side.level(price).is_some_and(PriceLevel::is_empty) {
                book_side.remove_level(price)?;
            }
            self.orders.remove(key);
            return Err(err);
        }

        self.order_index.insert(order_id, key);
        *self.count_mut(side) += 1;
        Ok(key)
    }

    /// Whether `quantity` more lots can rest at `price` on `side` without
    /// overflowing the level volume
    pub fn can_rest(&self, side: Side, price: u64, quantity: u64) -> bool {
        self.side(side)
            .level(price)
            .map_or(true, |level| level.can_accept(quantity))
    }

    /// Cancel a resting order by id.
    ///
    /// Unknown, filled and already-canceled ids yield `OrderNotFound` and
    /// leave the book untouched.
    pub fn cancel(&mut self, order_id: OrderId) -> Result<Order> {
        let key = *self
            .order_index
            .get(&order_id)
            .ok_or(BookError::OrderNotFound(order_id))?;
        self.detach(key)
    }

    /// Take a resting order out of the book by slab key.
    ///
    /// Unlinks it from its level (found through the node's level
    /// association), removes the level if it empties, and drops the index and
    /// slab entries.
    pub fn detach(&mut self, key: usize) -> Result<Order> {
        let node = self
            .orders
            .get(key)
            .ok_or_else(|| BookError::invariant(format!("detach of unknown slab key {key}")))?;
        let order_id = node.order_id();
        let side = node.order.side();
        let price = node.level.ok_or_else(|| {
            BookError::invariant(format!("order {order_id} is indexed but not resting"))
        })?;

        let (book_side, orders) = self.parts_mut(side);
        let level = book_side.level_mut(price).ok_or_else(|| {
            BookError::invariant(format!("order {order_id} points at missing {side} level {price}"))
        })?;
        level.remove(key, orders)?;
        if level.is_empty() {
            book_side.remove_level(price)?;
        }

        self.order_index.remove(&order_id);
        let count = self.count_mut(side);
        *count = count
            .checked_sub(1)
            .ok_or_else(|| BookError::invariant(format!("{side} order count underflow")))?;

        self.orders
            .try_remove(key)
            .map(|node| node.order)
            .ok_or_else(|| BookError::invariant(format!("slab key {key} vanished")))
    }

    /// Fill `amount` of the resting order at `key`.
    ///
    /// Returns the order's remaining size. At zero the caller must
    /// [`detach`](Self::detach) it.
    pub fn fill(&mut self, key: usize, amount: u64) -> Result<u64> {
        let node = self
            .orders
            .get(key)
            .ok_or_else(|| BookError::invariant(format!("fill of unknown slab key {key}")))?;
        let order_id = node.order_id();
        let side = node.order.side();
        let price = node
            .level
            .ok_or_else(|| BookError::invariant(format!("fill of detached order {order_id}")))?;

        let (book_side, orders) = self.parts_mut(side);
        book_side
            .level_mut(price)
            .ok_or_else(|| {
                BookError::invariant(format!("order {order_id} points at missing {side} level {price}"))
            })?
            .fill(key, amount, orders)
    }

    /// Oldest order at the best level of `side`, if an incoming order with
    /// `limit` would cross it (`None` = market).
    pub fn crossing_head(&self, side: Side, limit: Option<u64>) -> Option<RestingHead> {
        let book_side = self.side(side);
        let price = book_side.crossing_price(limit)?;
        let key = book_side.level(price)?.peek_head()?;
        let node = self.orders.get(key)?;
        Some(RestingHead {
            key,
            order_id: node.order_id(),
            owner: node.order.owner(),
            price: node.price(),
            remaining: node.remaining(),
        })
    }

    /// Get a resting order by id
    pub fn order(&self, order_id: OrderId) -> Option<&Order> {
        let key = self.order_index.get(&order_id)?;
        self.orders.get(*key).map(|node| &node.order)
    }

    #[inline]
    pub fn contains_order(&self, order_id: OrderId) -> bool {
        self.order_index.contains_key(&order_id)
    }

    /// Ids at one level in time priority
    pub fn level_order_ids(&self, side: Side, price: u64) -> Vec<OrderId> {
        let Some(level) = self.side(side).level(price) else {
            return Vec::new();
        };
        level
            .keys(&self.orders)
            .filter_map(|key| self.orders.get(key).map(OrderNode::order_id))
            .collect()
    }

    // ========================================================================
    // Best Bid/Ask and Depth
    // ========================================================================

    pub fn best_bid(&self) -> Option<LevelView> {
        self.bids.best_level().map(LevelView::from)
    }

    pub fn best_ask(&self) -> Option<LevelView> {
        self.asks.best_level().map(LevelView::from)
    }

    /// best ask - best bid, when both sides are present
    pub fn spread(&self) -> Option<u64> {
        let bid = self.bids.best_price()?;
        let ask = self.asks.best_price()?;
        ask.checked_sub(bid)
    }

    /// Up to `levels` levels of `side`, best first
    pub fn depth(&self, side: Side, levels: usize) -> Vec<LevelView> {
        self.side(side).iter().take(levels).map(LevelView::from).collect()
    }

    pub fn snapshot(&self, levels: usize) -> BookSnapshot {
        BookSnapshot {
            bids: self.depth(Side::Buy, levels),
            asks: self.depth(Side::Sell, levels),
        }
    }

    /// Best bid at or above best ask
    pub fn is_crossed(&self) -> bool {
        match (self.bids.best_price(), self.asks.best_price()) {
            (Some(bid), Some(ask)) => bid >= ask,
            _ => false,
        }
    }

    // ========================================================================
    // Audit
    // ========================================================================

    /// Full structural audit. O(orders + levels).
    pub fn verify(&self) -> Result<()> {
        for book_side in [&self.bids, &self.asks] {
            let side = book_side.side();
            let mut orders_on_side = 0usize;
            for level in book_side.iter() {
                level.verify(&self.orders)?;
                for key in level.keys(&self.orders) {
                    let node = &self.orders[key];
                    if node.order.side() != side {
                        return Err(BookError::invariant(format!(
                            "order {} rests on the wrong side",
                            node.order_id()
                        )));
                    }
                    if self.order_index.get(&node.order_id()) != Some(&key) {
                        return Err(BookError::invariant(format!(
                            "order {} missing from the id index",
                            node.order_id()
                        )));
                    }
                }
                orders_on_side += level.order_count;
            }
            let counted = match side {
                Side::Buy => self.bid_count,
                Side::Sell => self.ask_count,
            };
            if orders_on_side != counted {
                return Err(BookError::invariant(format!(
                    "{side} count {counted} but levels hold {orders_on_side}"
                )));
            }
        }

        if self.bid_count + self.ask_count != self.orders.len()
            || self.order_index.len() != self.orders.len()
        {
            return Err(BookError::invariant(format!(
                "{} slab entries, {} indexed, {} on levels",
                self.orders.len(),
                self.order_index.len(),
                self.bid_count + self.ask_count
            )));
        }

        if self.is_crossed() {
            return Err(BookError::invariant(format!(
                "book crossed: bid {:?} >= ask {:?}",
                self.bids.best_price(),
                self.asks.best_price()
            )));
        }
        Ok(())
    }

    /// SHA-256 over every level and resting order in priority order.
    ///
    /// Two books with identical levels, volumes and queues hash equal.
    pub fn state_root(&self) -> Result<[u8; 32]> {
        let mut hasher = Sha256::new();
        for book_side in [&self.bids, &self.asks] {
            hasher.update([book_side.side().to_u8()]);
            for level in book_side.iter() {
                hasher.update(level.price.to_le_bytes());
                hasher.update(level.total_quantity.to_le_bytes());
                for key in level.keys(&self.orders) {
                    let node = self.orders.get(key).ok_or_else(|| {
                        BookError::invariant(format!("level {} links to missing key {key}", level.price))
                    })?;
                    hasher.update(node.order.encode()?);
                }
            }
        }
        Ok(hasher.finalize().into())
    }

    pub fn state_root_hex(&self) -> Result<String> {
        self.state_root().map(hex::encode)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
