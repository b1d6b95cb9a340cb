//! Local mirror of the ledger's open orders.
//!
//! Two `BTreeMap`s keyed by order id:
//! - **Buys**: `BTreeMap<OrderId, Order>`
//! - **Sells**: `BTreeMap<OrderId, Order>`
//!
//! The mirror is replaced wholesale from each fetched snapshot; it never
//! diffs against the previous one. Keying by id keeps iteration order, and
//! therefore the selector's tie-breaking, deterministic.

use std::collections::BTreeMap;

use ledgermatch_types::{Order, OrderId, Side};

/// Snapshot of the ledger's open orders, split by side.
#[derive(Debug, Default, Clone)]
pub struct OrderMirror {
    buys: BTreeMap<OrderId, Order>,
    sells: BTreeMap<OrderId, Order>,
}

impl OrderMirror {
    /// Create an empty mirror.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // =================================================================
    // Mutation
    // =================================================================

    /// Insert or overwrite an order on its side.
    ///
    /// The id is dropped from the opposite side first, so an order lives on
    /// at most one side. Closed orders (zero remaining or not open) are
    /// removed instead of inserted.
    pub fn upsert(&mut self, order: Order) {
        if order.is_closed() {
            self.remove(order.id);
            return;
        }
        match order.side {
            Side::Buy => {
                self.sells.remove(&order.id);
                self.buys.insert(order.id, order);
            }
            Side::Sell => {
                self.buys.remove(&order.id);
                self.sells.insert(order.id, order);
            }
        }
    }

    /// Remove an order from whichever side holds it. No-op when absent.
    pub fn remove(&mut self, id: OrderId) -> Option<Order> {
        let buy = self.buys.remove(&id);
        let sell = self.sells.remove(&id);
        buy.or(sell)
    }

    /// Drop every order on both sides.
    pub fn clear(&mut self) {
        self.buys.clear();
        self.sells.clear();
    }

    /// Replace the whole mirror with a freshly fetched snapshot.
    pub fn replace_with(&mut self, orders: impl IntoIterator<Item = Order>) {
        self.clear();
        for order in orders {
            self.upsert(order);
        }
    }

    // =================================================================
    // Queries
    // =================================================================

    #[must_use]
    pub fn get(&self, id: OrderId) -> Option<&Order> {
        self.buys.get(&id).or_else(|| self.sells.get(&id))
    }

    #[must_use]
    pub fn get_on(&self, side: Side, id: OrderId) -> Option<&Order> {
        match side {
            Side::Buy => self.buys.get(&id),
            Side::Sell => self.sells.get(&id),
        }
    }

    #[must_use]
    pub fn contains(&self, id: OrderId) -> bool {
        self.get(id).is_some()
    }

    #[must_use]
    pub fn buy_count(&self) -> usize {
        self.buys.len()
    }

    #[must_use]
    pub fn sell_count(&self) -> usize {
        self.sells.len()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buys.len() + self.sells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buys.is_empty() && self.sells.is_empty()
    }

    // =================================================================
    // Iteration (for the selector)
    // =================================================================

    /// Buy orders in ascending id order.
    pub fn buys(&self) -> impl Iterator<Item = &Order> {
        self.buys.values()
    }

    /// Sell orders in ascending id order.
    pub fn sells(&self) -> impl Iterator<Item = &Order> {
        self.sells.values()
    }
}

#[cfg(test)]
mod tests {
    use ledgermatch_types::{OrderStatus, Price};

    use super::*;

    fn order_with_side(id: u64, side: &str) -> Order {
        let side: Side = side.parse().unwrap();
        Order::open(OrderId(id), "alice.testnet", side, Price::whole(3), 10)
    }

    #[test]
    fn upsert_routes_by_side_regardless_of_case() {
        let mut mirror = OrderMirror::new();
        for (id, side) in [(1, "Buy"), (2, "buy"), (3, "BUY")] {
            let order = order_with_side(id, side);
            mirror.upsert(order.clone());
            assert_eq!(mirror.get_on(Side::Buy, OrderId(id)), Some(&order));
            assert_eq!(mirror.get_on(Side::Sell, OrderId(id)), None);
        }
        mirror.upsert(order_with_side(4, "SELL"));
        assert_eq!(mirror.buy_count(), 3);
        assert_eq!(mirror.sell_count(), 1);
    }

    #[test]
    fn upsert_overwrites_fields() {
        let mut mirror = OrderMirror::new();
        mirror.upsert(Order::dummy(1, Side::Sell, 3, 1, 10));
        mirror.upsert(Order::dummy(1, Side::Sell, 5, 2, 4));

        let order = mirror.get(OrderId(1)).unwrap();
        assert_eq!(order.price, Price::new(5, 2).unwrap());
        assert_eq!(order.remaining_base, 4);
        assert_eq!(mirror.len(), 1);
    }

    #[test]
    fn upsert_moves_order_across_sides() {
        let mut mirror = OrderMirror::new();
        mirror.upsert(Order::dummy(1, Side::Buy, 3, 1, 10));
        mirror.upsert(Order::dummy(1, Side::Sell, 3, 1, 10));

        assert_eq!(mirror.buy_count(), 0);
        assert_eq!(mirror.sell_count(), 1);
    }

    #[test]
    fn closed_orders_never_enter() {
        let mut mirror = OrderMirror::new();
        mirror.upsert(Order::dummy(1, Side::Buy, 3, 1, 0));
        assert!(mirror.is_empty());

        let mut filled = Order::dummy(2, Side::Sell, 3, 1, 5);
        filled.status = OrderStatus::Filled;
        mirror.upsert(filled);
        assert!(mirror.is_empty());
    }

    #[test]
    fn closing_upsert_evicts_existing() {
        let mut mirror = OrderMirror::new();
        mirror.upsert(Order::dummy(1, Side::Buy, 3, 1, 10));
        mirror.upsert(Order::dummy(1, Side::Buy, 3, 1, 0));
        assert!(!mirror.contains(OrderId(1)));
    }

    #[test]
    fn remove_is_idempotent() {
        let mut mirror = OrderMirror::new();
        mirror.upsert(Order::dummy(1, Side::Buy, 3, 1, 10));
        mirror.upsert(Order::dummy(2, Side::Sell, 3, 1, 10));

        assert!(mirror.remove(OrderId(1)).is_some());
        let after_once = (mirror.buy_count(), mirror.sell_count());
        assert!(mirror.remove(OrderId(1)).is_none());
        assert_eq!((mirror.buy_count(), mirror.sell_count()), after_once);
    }

    #[test]
    fn remove_absent_is_noop() {
        let mut mirror = OrderMirror::new();
        mirror.upsert(Order::dummy(2, Side::Sell, 3, 1, 10));
        assert!(mirror.remove(OrderId(99)).is_none());
        assert_eq!(mirror.len(), 1);
    }

    #[test]
    fn replace_with_discards_previous_snapshot() {
        let mut mirror = OrderMirror::new();
        mirror.replace_with([
            Order::dummy(1, Side::Buy, 3, 1, 10),
            Order::dummy(2, Side::Sell, 3, 1, 10),
        ]);
        assert_eq!(mirror.len(), 2);

        mirror.replace_with([Order::dummy(3, Side::Sell, 4, 1, 1)]);
        assert_eq!(mirror.len(), 1);
        assert!(!mirror.contains(OrderId(1)));
        assert!(!mirror.contains(OrderId(2)));
        assert!(mirror.contains(OrderId(3)));
    }

    #[test]
    fn clear_empties_both_sides() {
        let mut mirror = OrderMirror::new();
        mirror.upsert(Order::dummy(1, Side::Buy, 3, 1, 10));
        mirror.upsert(Order::dummy(2, Side::Sell, 3, 1, 10));
        mirror.clear();
        assert!(mirror.is_empty());
        assert_eq!(mirror.buy_count(), 0);
        assert_eq!(mirror.sell_count(), 0);
    }

    #[test]
    fn iteration_is_by_ascending_id() {
        let mut mirror = OrderMirror::new();
        for id in [5, 1, 3] {
            mirror.upsert(Order::dummy(id, Side::Sell, 3, 1, 10));
        }
        let ids: Vec<u64> = mirror.sells().map(|o| o.id.0).collect();
        assert_eq!(ids, vec![1, 3, 5]);
    }
}
