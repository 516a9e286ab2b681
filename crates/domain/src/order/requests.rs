//! Write requests accepted by the orchestrator.
//!
//! Fields are optional so that blank input reaches validation instead of
//! failing at deserialization, which would only report the first problem.

use chrono::{DateTime, Utc};
use common::{OrderId, ProductId, UserId};

use super::Money;

/// Request to create a new order.
#[derive(Debug, Clone, Default)]
pub struct OrderAddRequest {
    pub user_id: Option<UserId>,
    pub order_date: Option<DateTime<Utc>>,
    pub order_items: Vec<OrderItemRequest>,
}

/// Request to replace an existing order as a whole.
#[derive(Debug, Clone, Default)]
pub struct OrderUpdateRequest {
    pub order_id: Option<OrderId>,
    pub user_id: Option<UserId>,
    pub order_date: Option<DateTime<Utc>>,
    pub order_items: Vec<OrderItemRequest>,
}

/// A requested order line. Any caller-supplied total is ignored.
#[derive(Debug, Clone, Default)]
pub struct OrderItemRequest {
    pub product_id: Option<ProductId>,
    pub unit_price: Option<Money>,
    pub quantity: Option<i64>,
}

impl OrderItemRequest {
    /// Convenience constructor for a fully populated line.
    pub fn new(product_id: ProductId, unit_price: Money, quantity: i64) -> Self {
        Self {
            product_id: Some(product_id),
            unit_price: Some(unit_price),
            quantity: Some(quantity),
        }
    }
}

impl OrderAddRequest {
    pub fn new(user_id: UserId, order_date: DateTime<Utc>, order_items: Vec<OrderItemRequest>) -> Self {
        Self {
            user_id: Some(user_id),
            order_date: Some(order_date),
            order_items,
        }
    }

    /// Distinct product ids in first-seen order.
    pub fn product_ids(&self) -> Vec<ProductId> {
        distinct_product_ids(&self.order_items)
    }
}

impl OrderUpdateRequest {
    pub fn new(
        order_id: OrderId,
        user_id: UserId,
        order_date: DateTime<Utc>,
        order_items: Vec<OrderItemRequest>,
    ) -> Self {
        Self {
            order_id: Some(order_id),
            user_id: Some(user_id),
            order_date: Some(order_date),
            order_items,
        }
    }

    /// Distinct product ids in first-seen order.
    pub fn product_ids(&self) -> Vec<ProductId> {
        distinct_product_ids(&self.order_items)
    }
}

fn distinct_product_ids(items: &[OrderItemRequest]) -> Vec<ProductId> {
    let mut ids: Vec<ProductId> = Vec::with_capacity(items.len());
    for id in items.iter().filter_map(|i| i.product_id) {
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}
