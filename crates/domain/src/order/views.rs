//! Response views: an order plus denormalized display data from other services.
//!
//! Views are built per request and never persisted.

use chrono::{DateTime, Utc};
use common::{OrderId, ProductId, UserId};
use serde::{Deserialize, Serialize};

use super::Money;

/// An order as returned to callers, optionally enriched with user display fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderResponse {
    pub order_id: OrderId,
    pub user_id: UserId,
    pub user_person_name: Option<String>,
    pub email: Option<String>,
    pub total_bill: Money,
    pub order_date: DateTime<Utc>,
    pub order_items: Vec<OrderItemResponse>,
}

/// An order line as returned to callers, optionally enriched with product display fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItemResponse {
    pub product_id: ProductId,
    pub unit_price: Money,
    pub quantity: u32,
    pub total_price: Money,
    pub product_name: Option<String>,
    pub category: Option<String>,
}
