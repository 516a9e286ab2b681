use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use common::OrderId;
use domain::Order;
use tokio::sync::RwLock;

use crate::{OrderFilter, OrderRepository, Result, StoreError};

/// In-memory order repository.
///
/// Keeps orders in insertion order and provides the same interface as the
/// PostgreSQL implementation. Writes can be made to fail for testing.
#[derive(Clone, Default)]
pub struct InMemoryOrderRepository {
    orders: Arc<RwLock<Vec<Order>>>,
    fail_writes: Arc<AtomicBool>,
}

impl InMemoryOrderRepository {
    /// Creates a new empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored orders.
    pub async fn order_count(&self) -> usize {
        self.orders.read().await.len()
    }

    /// Removes every order.
    pub async fn clear(&self) {
        self.orders.write().await.clear();
    }

    /// Makes every subsequent write fail with [`StoreError::Unavailable`].
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    fn check_writable(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("writes disabled".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn get_orders(&self) -> Result<Vec<Order>> {
        Ok(self.orders.read().await.clone())
    }

    async fn get_orders_by_condition(&self, filter: &OrderFilter) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        Ok(orders.iter().filter(|o| filter.matches(o)).cloned().collect())
    }

    async fn get_order_by_condition(&self, filter: &OrderFilter) -> Result<Option<Order>> {
        let orders = self.orders.read().await;
        Ok(orders.iter().find(|o| filter.matches(o)).cloned())
    }

    #[tracing::instrument(skip(self, order))]
    async fn add_order(&self, mut order: Order) -> Result<Order> {
        self.check_writable()?;
        order.assign_ids(OrderId::new());
        self.orders.write().await.push(order.clone());
        tracing::debug!(order_id = %order.order_id(), "order inserted");
        Ok(order)
    }

    #[tracing::instrument(skip(self, order), fields(order_id = %order.order_id()))]
    async fn update_order(&self, mut order: Order) -> Result<Option<Order>> {
        self.check_writable()?;
        let mut orders = self.orders.write().await;
        let Some(existing) = orders.iter_mut().find(|o| o.order_id() == order.order_id()) else {
            return Ok(None);
        };
        order.assign_ids(order.order_id());
        *existing = order.clone();
        Ok(Some(order))
    }

    #[tracing::instrument(skip(self))]
    async fn delete_order(&self, order_id: OrderId) -> Result<bool> {
        self.check_writable()?;
        let mut orders = self.orders.write().await;
        let before = orders.len();
        orders.retain(|o| o.order_id() != order_id);
        Ok(orders.len() < before)
    }
}
