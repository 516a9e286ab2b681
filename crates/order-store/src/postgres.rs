use async_trait::async_trait;
use common::OrderId;
use domain::Order;
use sqlx::{PgPool, Row, postgres::PgRow};

use crate::{OrderFilter, OrderRepository, Result};

/// PostgreSQL-backed order repository.
///
/// Each order is one row holding the full aggregate as a JSONB document.
#[derive(Clone)]
pub struct PostgresOrderRepository {
    pool: PgPool,
}

impl PostgresOrderRepository {
    /// Creates a new PostgreSQL order repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to `database_url` and runs the migrations.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        let repository = Self::new(pool);
        repository.run_migrations().await?;
        tracing::info!("connected to order store");
        Ok(repository)
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> std::result::Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("../../migrations").run(&self.pool).await
    }

    fn row_to_order(row: PgRow) -> Result<Order> {
        let document: serde_json::Value = row.try_get("document")?;
        Ok(serde_json::from_value(document)?)
    }

    async fn fetch(&self, filter: &OrderFilter, limit: Option<i64>) -> Result<Vec<Order>> {
        let mut sql = String::from("SELECT document FROM orders");
        match filter {
            OrderFilter::All => {}
            OrderFilter::OrderId(_) => sql.push_str(" WHERE order_id = $1"),
            OrderFilter::UserId(_) => sql.push_str(" WHERE user_id = $1"),
            OrderFilter::ProductId(_) => sql.push_str(" WHERE document -> 'order_items' @> $1"),
            OrderFilter::OrderDate(_) => {
                sql.push_str(" WHERE (order_date AT TIME ZONE 'UTC')::date = $1")
            }
        }
        sql.push_str(" ORDER BY created_at ASC, order_id ASC");
        if limit.is_some() {
            let param = if matches!(filter, OrderFilter::All) { 1 } else { 2 };
            sql.push_str(&format!(" LIMIT ${param}"));
        }

        let mut query = sqlx::query(&sql);
        query = match filter {
            OrderFilter::All => query,
            OrderFilter::OrderId(id) => query.bind(id.as_uuid()),
            OrderFilter::UserId(id) => query.bind(id.as_uuid()),
            OrderFilter::ProductId(id) => {
                query.bind(serde_json::json!([{ "product_id": id }]))
            }
            OrderFilter::OrderDate(date) => query.bind(*date),
        };
        if let Some(limit) = limit {
            query = query.bind(limit);
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.into_iter().map(Self::row_to_order).collect()
    }
}

#[async_trait]
impl OrderRepository for PostgresOrderRepository {
    async fn get_orders(&self) -> Result<Vec<Order>> {
        self.fetch(&OrderFilter::All, None).await
    }

    async fn get_orders_by_condition(&self, filter: &OrderFilter) -> Result<Vec<Order>> {
        self.fetch(filter, None).await
    }

    async fn get_order_by_condition(&self, filter: &OrderFilter) -> Result<Option<Order>> {
        Ok(self.fetch(filter, Some(1)).await?.into_iter().next())
    }

    #[tracing::instrument(skip(self, order))]
    async fn add_order(&self, mut order: Order) -> Result<Order> {
        order.assign_ids(OrderId::new());
        let document = serde_json::to_value(&order)?;

        sqlx::query(
            r#"
            INSERT INTO orders (order_id, user_id, order_date, document)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(order.order_id().as_uuid())
        .bind(order.user_id().as_uuid())
        .bind(order.order_date())
        .bind(document)
        .execute(&self.pool)
        .await?;

        metrics::counter!("order_store_writes_total", "operation" => "insert").increment(1);
        Ok(order)
    }

    #[tracing::instrument(skip(self, order), fields(order_id = %order.order_id()))]
    async fn update_order(&self, mut order: Order) -> Result<Option<Order>> {
        order.assign_ids(order.order_id());
        let document = serde_json::to_value(&order)?;

        let result = sqlx::query(
            r#"
            UPDATE orders
            SET user_id = $2, order_date = $3, document = $4
            WHERE order_id = $1
            "#,
        )
        .bind(order.order_id().as_uuid())
        .bind(order.user_id().as_uuid())
        .bind(order.order_date())
        .bind(document)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        metrics::counter!("order_store_writes_total", "operation" => "replace").increment(1);
        Ok(Some(order))
    }

    #[tracing::instrument(skip(self))]
    async fn delete_order(&self, order_id: OrderId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM orders WHERE order_id = $1")
            .bind(order_id.as_uuid())
            .execute(&self.pool)
            .await?;

        metrics::counter!("order_store_writes_total", "operation" => "delete").increment(1);
        Ok(result.rows_affected() > 0)
    }
}
