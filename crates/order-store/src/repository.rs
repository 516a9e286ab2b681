use std::sync::Arc;

use async_trait::async_trait;
use common::OrderId;
use domain::Order;

use crate::{OrderFilter, Result};

/// Core trait for order persistence.
///
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Retrieves every order.
    async fn get_orders(&self) -> Result<Vec<Order>>;

    /// Retrieves all orders matching the filter.
    async fn get_orders_by_condition(&self, filter: &OrderFilter) -> Result<Vec<Order>>;

    /// Retrieves the first order matching the filter.
    async fn get_order_by_condition(&self, filter: &OrderFilter) -> Result<Option<Order>>;

    /// Inserts a new order.
    ///
    /// Assigns a fresh order id and fresh line ids; any ids already on `order`
    /// are discarded. Returns the stored order.
    async fn add_order(&self, order: Order) -> Result<Order>;

    /// Replaces the order with the same id as a whole.
    ///
    /// Returns None if no such order exists. Line ids are reassigned.
    async fn update_order(&self, order: Order) -> Result<Option<Order>>;

    /// Deletes an order by id.
    ///
    /// Returns true if an order was removed.
    async fn delete_order(&self, order_id: OrderId) -> Result<bool>;
}

#[async_trait]
impl<T: OrderRepository + ?Sized> OrderRepository for Arc<T> {
    async fn get_orders(&self) -> Result<Vec<Order>> {
        (**self).get_orders().await
    }

    async fn get_orders_by_condition(&self, filter: &OrderFilter) -> Result<Vec<Order>> {
        (**self).get_orders_by_condition(filter).await
    }

    async fn get_order_by_condition(&self, filter: &OrderFilter) -> Result<Option<Order>> {
        (**self).get_order_by_condition(filter).await
    }

    async fn add_order(&self, order: Order) -> Result<Order> {
        (**self).add_order(order).await
    }

    async fn update_order(&self, order: Order) -> Result<Option<Order>> {
        (**self).update_order(order).await
    }

    async fn delete_order(&self, order_id: OrderId) -> Result<bool> {
        (**self).delete_order(order_id).await
    }
}
