//! Price-time priority matching over a single [`OrderBook`].
//!
//! `submit` walks the opposite side best level first, and within a level
//! oldest order first, filling at each maker's price until the taker is done
//! or nothing crosses. A limit remainder then rests at its own price; a market
//! remainder is discarded.
//!
//! Any [`BookError::BookInvariantViolation`] raised while processing halts the
//! engine: the error is returned, logged, and every later mutation fails with
//! [`BookError::EngineHalted`].

use tracing::{debug, error, info, trace, warn};

use crate::config::{EngineConfig, SelfTradePolicy};
use crate::error::{BookError, Result};
use crate::orderbook::{BookSnapshot, LevelView, OrderBook};
use crate::types::{Execution, Match, Order, OrderId, OrderKind, OrderRequest, PriceScale, Side};

#[derive(Debug)]
pub struct MatchingEngine {
    book: OrderBook,
    config: EngineConfig,
    scale: PriceScale,
    next_order_id: OrderId,
    next_sequence: u64,
    next_match_id: u64,
    halted: bool,
}

impl Default for MatchingEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl MatchingEngine {
    /// Engine with the default configuration
    pub fn new() -> Self {
        Self::build(EngineConfig::default(), PriceScale::default())
    }

    pub fn with_config(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let scale = config.price_scale()?;
        Ok(Self::build(config, scale))
    }

    fn build(config: EngineConfig, scale: PriceScale) -> Self {
        info!(
            order_capacity = config.order_capacity,
            tick_size = %config.tick_size,
            self_trade_policy = ?config.self_trade_policy,
            audit_invariants = config.audit_invariants,
            "matching engine created"
        );
        Self {
            book: OrderBook::with_capacity(config.order_capacity),
            scale,
            config,
            next_order_id: 1,
            next_sequence: 1,
            next_match_id: 1,
            halted: false,
        }
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[inline]
    pub fn price_scale(&self) -> PriceScale {
        self.scale
    }

    /// Read access to the book for queries and audits
    #[inline]
    pub fn book(&self) -> &OrderBook {
        &self.book
    }

    #[inline]
    pub fn is_halted(&self) -> bool {
        self.halted
    }

    // ========================================================================
    // Submit
    // ========================================================================

    /// Submit a limit order of `size` lots at `price` ticks.
    ///
    /// ```
    /// use limit_book::{MatchingEngine, Side};
    ///
    /// let mut engine = MatchingEngine::new();
    /// engine.submit(Side::Sell, 100, 10).unwrap();
    ///
    /// let execution = engine.submit(Side::Buy, 100, 4).unwrap();
    /// assert_eq!(execution.matches.len(), 1);
    /// assert_eq!(engine.best_ask().map(|l| l.volume), Some(6));
    /// ```
    pub fn submit(&mut self, side: Side, price: u64, size: u64) -> Result<Execution> {
        self.submit_request(OrderRequest::limit(side, price, size))
    }

    /// Submit a market order; an unfilled remainder is discarded
    pub fn submit_market(&mut self, side: Side, size: u64) -> Result<Execution> {
        self.submit_request(OrderRequest::market(side, size))
    }

    pub fn submit_request(&mut self, request: OrderRequest) -> Result<Execution> {
        self.ensure_running()?;
        if let Err(err) = request.validate().and_then(|()| self.check_capacity(&request)) {
            warn!(side = %request.side, price = request.price, size = request.size, %err, "order rejected");
            return Err(err);
        }

        let order_id = self.next_order_id;
        let sequence = self.next_sequence;
        self.next_order_id += 1;
        self.next_sequence += 1;

        let taker = Order::new(order_id, &request, sequence);
        let execution = match self.execute(taker).and_then(|execution| {
            self.check_after_mutation()?;
            Ok(execution)
        }) {
            Ok(execution) => execution,
            Err(err) => return self.fail(err),
        };

        debug!(
            order_id,
            side = %request.side,
            price = %self.display_price(&request),
            size = request.size,
            matches = execution.matches.len(),
            filled = execution.filled,
            resting = ?execution.resting,
            discarded = execution.discarded,
            status = ?execution.status,
            "order processed"
        );
        Ok(execution)
    }

    /// The matching loop plus resting the remainder.
    fn execute(&mut self, mut taker: Order) -> Result<Execution> {
        let side = taker.side();
        let opposite = side.opposite();
        let limit = taker.limit_price();
        let size = taker.quantity;

        let mut matches = Vec::new();
        let mut completed_makers = Vec::new();
        let mut canceled_makers = Vec::new();
        let mut taker_canceled = false;

        while taker.remaining > 0 {
            let Some(head) = self.book.crossing_head(opposite, limit) else {
                break;
            };

            let self_trade = matches!((taker.owner(), head.owner), (Some(a), Some(b)) if a == b);
            if self_trade {
                match self.config.self_trade_policy {
                    SelfTradePolicy::Allow => {}
                    SelfTradePolicy::CancelResting => {
                        self.book.detach(head.key)?;
                        trace!(maker = head.order_id, taker = taker.id, "self-trade: resting order canceled");
                        canceled_makers.push(head.order_id);
                        continue;
                    }
                    SelfTradePolicy::CancelTaker => {
                        trace!(maker = head.order_id, taker = taker.id, "self-trade: taker canceled");
                        taker_canceled = true;
                        break;
                    }
                }
            }

            let quantity = taker.remaining.min(head.remaining);
            let maker_left = self.book.fill(head.key, quantity)?;
            taker.fill(quantity);

            let fill = Match::new(
                self.next_match_id,
                matches.len() as u64,
                head.order_id,
                taker.id,
                head.price,
                quantity,
            );
            self.next_match_id += 1;
            trace!(
                match_id = fill.id,
                maker = head.order_id,
                taker = taker.id,
                price = %self.scale.format(head.price),
                quantity,
                "fill"
            );
            matches.push(fill);

            if maker_left == 0 {
                self.book.detach(head.key)?;
                completed_makers.push(head.order_id);
            }
        }

        let filled = taker.filled_quantity();
        let remainder = taker.remaining;
        let order_id = taker.id;
        let (resting, rested, discarded) = if remainder == 0 {
            (None, 0, 0)
        } else if taker.kind() == OrderKind::Limit && !taker_canceled {
            self.book.insert(taker)?;
            (Some(order_id), remainder, 0)
        } else {
            (None, 0, remainder)
        };

        let matched: u64 = matches.iter().map(|m: &Match| m.quantity).sum();
        if matched != filled || filled + rested + discarded != size {
            return Err(BookError::invariant(format!(
                "order {order_id} of size {size}: matched {matched}, filled {filled}, rested {rested}, discarded {discarded}"
            )));
        }

        Ok(Execution {
            order_id,
            side,
            size,
            status: Execution::status_for(size, filled, rested),
            resting,
            matches,
            filled,
            rested,
            discarded,
            completed_makers,
            canceled_makers,
        })
    }

    // ========================================================================
    // Cancel
    // ========================================================================

    /// Cancel a resting order by the handle returned from submit.
    ///
    /// Returns the order as it stood (remaining size intact). Orders that
    /// already filled, were canceled, or never existed yield `OrderNotFound`
    /// and the book is unchanged.
    pub fn cancel(&mut self, order_id: OrderId) -> Result<Order> {
        self.ensure_running()?;
        match self.book.cancel(order_id) {
            Ok(order) => {
                if let Err(err) = self.check_after_mutation() {
                    return self.fail(err);
                }
                debug!(order_id, side = %order.side(), remaining = order.remaining, "order canceled");
                Ok(order)
            }
            Err(BookError::OrderNotFound(id)) => {
                warn!(order_id = id, "cancel of order that is not resting");
                Err(BookError::OrderNotFound(id))
            }
            Err(err) => self.fail(err),
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn best_bid(&self) -> Option<LevelView> {
        self.book.best_bid()
    }

    pub fn best_ask(&self) -> Option<LevelView> {
        self.book.best_ask()
    }

    pub fn spread(&self) -> Option<u64> {
        self.book.spread()
    }

    pub fn depth(&self, side: Side, levels: usize) -> Vec<LevelView> {
        self.book.depth(side, levels)
    }

    pub fn snapshot(&self, levels: usize) -> BookSnapshot {
        self.book.snapshot(levels)
    }

    /// A resting order by id
    pub fn order(&self, order_id: OrderId) -> Option<&Order> {
        self.book.order(order_id)
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn ensure_running(&self) -> Result<()> {
        if self.halted {
            Err(BookError::EngineHalted)
        } else {
            Ok(())
        }
    }

    /// A limit order joining an existing own-side level must fit in its
    /// volume. Such an order cannot cross, so it would rest in full.
    fn check_capacity(&self, request: &OrderRequest) -> Result<()> {
        if request.kind == OrderKind::Limit
            && !self.book.can_rest(request.side, request.price, request.size)
        {
            return Err(BookError::InvalidOrder {
                reason: "size would overflow the price level volume",
            });
        }
        Ok(())
    }

    /// Post-conditions checked after every successful mutation.
    fn check_after_mutation(&self) -> Result<()> {
        if self.config.audit_invariants {
            return self.book.verify();
        }
        if self.book.is_crossed() {
            return Err(BookError::invariant(format!(
                "book crossed after mutation: bid {:?} >= ask {:?}",
                self.book.best_bid().map(|l| l.price),
                self.book.best_ask().map(|l| l.price)
            )));
        }
        Ok(())
    }

    fn fail<T>(&mut self, err: BookError) -> Result<T> {
        if err.is_fatal() {
            error!(%err, "halting matching engine");
            self.halted = true;
        }
        Err(err)
    }

    fn display_price(&self, request: &OrderRequest) -> String {
        match request.kind {
            OrderKind::Limit => self.scale.format(request.price),
            OrderKind::Market => "market".to_string(),
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
