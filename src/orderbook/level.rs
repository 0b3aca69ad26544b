//! Price level management for orders at the same price.
//!
//! ## Design
//!
//! A `PriceLevel` represents all resting orders at one price on one side.
//! Orders form a doubly-linked list through their slab nodes, in arrival
//! order:
//!
//! ```text
//! head (oldest) <-> order2 <-> order3 <-> tail (newest)
//! ```
//!
//! - New orders are appended at the tail
//! - Matching consumes orders from the head
//! - Any order can be removed in O(1) using its slab key
//!
//! `total_quantity` is kept equal to the sum of the members' remaining sizes.
//! Every mutation goes through checked arithmetic; a mismatch surfaces as
//! [`BookError::BookInvariantViolation`] rather than a silent saturation.

use slab::Slab;

use crate::error::{BookError, Result};
use crate::orderbook::OrderNode;

/// A price level containing orders at a single price.
///
/// The order data lives in the slab; this struct only holds the queue
/// metadata and the aggregate volume.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceLevel {
    /// Price for this level in ticks
    pub price: u64,

    /// Sum of the remaining sizes of all orders at this level
    pub total_quantity: u64,

    /// Oldest order (first to match), slab key
    pub head: Option<usize>,

    /// Newest order, slab key
    pub tail: Option<usize>,

    pub order_count: usize,
}

impl PriceLevel {
    pub fn new(price: u64) -> Self {
        Self {
            price,
            total_quantity: 0,
            head: None,
            tail: None,
            order_count: 0,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order_count == 0
    }

    /// Oldest order's slab key, the next one to match
    #[inline]
    pub fn peek_head(&self) -> Option<usize> {
        self.head
    }

    /// Append an order at the tail and record this level on the node.
    pub fn push_back(&mut self, key: usize, slab: &mut Slab<OrderNode>) -> Result<()> {
        let price = self.price;
        let tail = self.tail;

        // Validate everything before the first write so a failure leaves the
        // level and the node untouched.
        if let Some(tail_key) = tail {
            if !slab.contains(tail_key) {
                return Err(BookError::invariant(format!(
                    "level {price} tail {tail_key} missing"
                )));
            }
        }
        let node = slab
            .get_mut(key)
            .ok_or_else(|| BookError::invariant(format!("push of unknown slab key {key}")))?;
        if node.is_resting() {
            return Err(BookError::invariant(format!(
                "order {} is already resting",
                node.order_id()
            )));
        }
        let quantity = node.remaining();
        if quantity == 0 {
            return Err(BookError::invariant(format!(
                "order {} rests with zero size",
                node.order_id()
            )));
        }
        let total_quantity = self
            .total_quantity
            .checked_add(quantity)
            .ok_or_else(|| BookError::invariant(format!("level {price} volume overflow")))?;

        node.prev = tail;
        node.next = None;
        node.level = Some(price);

        match tail.and_then(|tail_key| slab.get_mut(tail_key)) {
            Some(tail_node) => tail_node.next = Some(key),
            None => self.head = Some(key),
        }

        self.tail = Some(key);
        self.order_count += 1;
        self.total_quantity = total_quantity;
        Ok(())
    }

    /// Whether `quantity` more lots fit in this level's volume
    #[inline]
    pub fn can_accept(&self, quantity: u64) -> bool {
        self.total_quantity.checked_add(quantity).is_some()
    }

    /// Unlink an order, keeping the rest of the queue in place.
    ///
    /// Returns the remaining size the order carried out of the level.
    pub fn remove(&mut self, key: usize, slab: &mut Slab<OrderNode>) -> Result<u64> {
        let price = self.price;
        let node = slab
            .get_mut(key)
            .ok_or_else(|| BookError::invariant(format!("remove of unknown slab key {key}")))?;
        if node.level != Some(price) {
            return Err(BookError::invariant(format!(
                "order {} is not at level {price}",
                node.order_id()
            )));
        }

        let quantity = node.remaining();
        let prev_key = node.prev.take();
        let next_key = node.next.take();
        node.level = None;

        match prev_key {
            Some(prev) => link_mut(slab, prev, price)?.next = next_key,
            None => self.head = next_key,
        }
        match next_key {
            Some(next) => link_mut(slab, next, price)?.prev = prev_key,
            None => self.tail = prev_key,
        }

        self.order_count = self
            .order_count
            .checked_sub(1)
            .ok_or_else(|| BookError::invariant(format!("level {price} order count underflow")))?;
        self.reduce_quantity(quantity)?;
        Ok(quantity)
    }

    /// Fill `amount` of a member order.
    ///
    /// The caller removes the order once its remaining size reaches zero.
    /// Returns the order's remaining size after the fill.
    pub fn fill(&mut self, key: usize, amount: u64, slab: &mut Slab<OrderNode>) -> Result<u64> {
        let price = self.price;
        let node = link_mut(slab, key, price)?;
        if node.level != Some(price) {
            return Err(BookError::invariant(format!(
                "fill of order {} outside level {price}",
                node.order_id()
            )));
        }
        if amount == 0 || amount > node.remaining() {
            return Err(BookError::invariant(format!(
                "fill of {amount} against order {} with {} remaining",
                node.order_id(),
                node.remaining()
            )));
        }

        node.order.fill(amount);
        let left = node.remaining();
        self.reduce_quantity(amount)?;
        Ok(left)
    }

    fn reduce_quantity(&mut self, amount: u64) -> Result<()> {
        self.total_quantity = self.total_quantity.checked_sub(amount).ok_or_else(|| {
            BookError::invariant(format!(
                "level {} volume {} below removed {amount}",
                self.price, self.total_quantity
            ))
        })?;
        Ok(())
    }

    /// Slab keys in FIFO order
    pub fn keys<'a>(&self, slab: &'a Slab<OrderNode>) -> LevelKeys<'a> {
        LevelKeys {
            slab,
            cursor: self.head,
        }
    }

    /// Walk the queue and check links, count, volume and back-references.
    pub fn verify(&self, slab: &Slab<OrderNode>) -> Result<()> {
        let mut count = 0usize;
        let mut volume = 0u64;
        let mut prev: Option<usize> = None;
        let mut cursor = self.head;

        while let Some(key) = cursor {
            let node = slab.get(key).ok_or_else(|| {
                BookError::invariant(format!("level {} links to missing key {key}", self.price))
            })?;
            if node.prev != prev {
                return Err(BookError::invariant(format!(
                    "level {} broken prev link at order {}",
                    self.price,
                    node.order_id()
                )));
            }
            if node.level != Some(self.price) || node.price() != self.price {
                return Err(BookError::invariant(format!(
                    "order {} listed at level {} but associated with {:?}",
                    node.order_id(),
                    self.price,
                    node.level
                )));
            }
            if node.remaining() == 0 {
                return Err(BookError::invariant(format!(
                    "terminal order {} still at level {}",
                    node.order_id(),
                    self.price
                )));
            }
            count += 1;
            volume = volume.checked_add(node.remaining()).ok_or_else(|| {
                BookError::invariant(format!("level {} volume overflow", self.price))
            })?;
            prev = Some(key);
            cursor = node.next;
        }

        if self.tail != prev {
            return Err(BookError::invariant(format!("level {} tail mismatch", self.price)));
        }
        if count == 0 {
            return Err(BookError::invariant(format!("empty level {} left in book", self.price)));
        }
        if count != self.order_count || volume != self.total_quantity {
            return Err(BookError::invariant(format!(
                "level {} reports {} orders / {} volume, holds {count} / {volume}",
                self.price, self.order_count, self.total_quantity
            )));
        }
        Ok(())
    }
}

fn link_mut(slab: &mut Slab<OrderNode>, key: usize, price: u64) -> Result<&mut OrderNode> {
    slab.get_mut(key)
        .ok_or_else(|| BookError::invariant(format!("level {price} links to missing key {key}")))
}

/// FIFO iterator over a level's slab keys.
pub struct LevelKeys<'a> {
    slab: &'a Slab<OrderNode>,
    cursor: Option<usize>,
}

impl Iterator for LevelKeys<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let key = self.cursor?;
        self.cursor = self.slab.get(key).and_then(|node| node.next);
        Some(key)
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
