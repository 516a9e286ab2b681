//! Order aggregate implementation.

use chrono::{DateTime, Utc};
use common::{OrderId, OrderLineId, UserId};
use serde::{Deserialize, Serialize};

use super::{Money, OrderError, OrderItem};

/// Order aggregate root.
///
/// The order and its lines are one unit of consistency. Totals are derived on
/// construction and on every id assignment, so `total_bill` always equals the
/// sum of the line totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    order_id: OrderId,
    user_id: UserId,
    order_date: DateTime<Utc>,
    order_items: Vec<OrderItem>,
    total_bill: Money,
}

impl Order {
    /// Builds an order from its lines, deriving every line total and the bill.
    ///
    /// Fails if there are no lines, a line has a zero quantity or a
    /// non-positive price, or a total overflows.
    pub fn new(
        order_id: OrderId,
        user_id: UserId,
        order_date: DateTime<Utc>,
        order_items: Vec<OrderItem>,
    ) -> Result<Self, OrderError> {
        if order_items.is_empty() {
            return Err(OrderError::NoItems);
        }
        if let Some(item) = order_items.iter().find(|i| i.quantity == 0) {
            return Err(OrderError::InvalidQuantity {
                product_id: item.product_id,
            });
        }
        if let Some(item) = order_items.iter().find(|i| !i.unit_price.is_positive()) {
            return Err(OrderError::InvalidPrice {
                product_id: item.product_id,
            });
        }

        let mut order = Self {
            order_id,
            user_id,
            order_date,
            order_items,
            total_bill: Money::zero(),
        };
        order.recalculate_totals()?;
        Ok(order)
    }

    pub fn order_id(&self) -> OrderId {
        self.order_id
    }

    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    pub fn order_date(&self) -> DateTime<Utc> {
        self.order_date
    }

    pub fn items(&self) -> &[OrderItem] {
        &self.order_items
    }

    pub fn total_bill(&self) -> Money {
        self.total_bill
    }

    /// Stamps the order id and a fresh id on every line.
    ///
    /// Called by repositories at insert/replace time. Totals were derived in
    /// [`Order::new`] and lines cannot change afterwards.
    pub fn assign_ids(&mut self, order_id: OrderId) {
        self.order_id = order_id;
        for item in &mut self.order_items {
            item.line_id = OrderLineId::new();
        }
    }

    fn recalculate_totals(&mut self) -> Result<(), OrderError> {
        let line_totals = self
            .order_items
            .iter_mut()
            .map(OrderItem::recalculate)
            .collect::<Option<Vec<_>>>()
            .ok_or(OrderError::TotalOutOfRange)?;
        self.total_bill = Money::checked_sum(line_totals).ok_or(OrderError::TotalOutOfRange)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::ProductId;

    fn line(price_cents: i64, quantity: u32) -> OrderItem {
        OrderItem::new(ProductId::new(), Money::from_cents(price_cents), quantity)
    }

    #[test]
    fn test_total_bill_is_sum_of_lines() {
        let order = Order::new(
            OrderId::nil(),
            UserId::new(),
            Utc::now(),
            vec![line(1000, 2), line(500, 1)],
        )
        .unwrap();

        assert_eq!(order.total_bill().cents(), 2500);
        assert_eq!(order.items()[0].total_price().cents(), 2000);
    }

    #[test]
    fn test_order_requires_items() {
        let result = Order::new(OrderId::nil(), UserId::new(), Utc::now(), vec![]);
        assert!(matches!(result, Err(OrderError::NoItems)));
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let result = Order::new(OrderId::nil(), UserId::new(), Utc::now(), vec![line(100, 0)]);
        assert!(matches!(result, Err(OrderError::InvalidQuantity { .. })));
    }

    #[test]
    fn test_line_total_overflow_rejected() {
        let result = Order::new(
            OrderId::nil(),
            UserId::new(),
            Utc::now(),
            vec![line(i64::MAX / 2, 3)],
        );
        assert!(matches!(result, Err(OrderError::TotalOutOfRange)));
    }

    #[test]
    fn test_bill_overflow_rejected() {
        let result = Order::new(
            OrderId::nil(),
            UserId::new(),
            Utc::now(),
            vec![line(i64::MAX / 2, 1), line(i64::MAX / 2, 1), line(2, 1)],
        );
        assert!(matches!(result, Err(OrderError::TotalOutOfRange)));
    }

    #[test]
    fn test_assign_ids_stamps_every_line() {
        let mut order = Order::new(
            OrderId::nil(),
            UserId::new(),
            Utc::now(),
            vec![line(100, 1), line(200, 2)],
        )
        .unwrap();
        let order_id = OrderId::new();

        order.assign_ids(order_id);

        assert_eq!(order.order_id(), order_id);
        assert!(order.items().iter().all(|i| !i.line_id.is_nil()));
        assert_ne!(order.items()[0].line_id, order.items()[1].line_id);
        assert_eq!(order.total_bill().cents(), 500);
    }

    #[test]
    fn test_document_roundtrip_keeps_totals() {
        let order = Order::new(OrderId::new(), UserId::new(), Utc::now(), vec![line(999, 3)]).unwrap();
        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["total_bill"], 2997);
        let back: Order = serde_json::from_value(json).unwrap();
        assert_eq!(back, order);
    }
}
