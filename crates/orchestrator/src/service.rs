//! The orders orchestrator.

use std::collections::HashSet;
use std::time::Instant;

use common::{OrderId, ProductId, UserId};
use domain::{
    Order, OrderAddRequest, OrderResponse, OrderUpdateRequest, Product, ReferenceError, User,
    mapping,
};
use order_store::{OrderFilter, OrderRepository};

use crate::clients::{CatalogClient, IdentityClient};
use crate::enrichment::{Enrichment, distinct};
use crate::error::{OrderServiceError, Result};
use crate::resilience::{CatalogPolicy, IdentityPolicy};

/// Coordinates the order store with the identity and catalog services.
///
/// Writes validate the request, confirm that the user and every product
/// exist, persist, then return a view decorated from the lookups already
/// made. Reads fetch from the store and decorate the whole result with one
/// batched lookup per dependency.
pub struct OrdersService<R, U, P>
where
    R: OrderRepository,
    U: IdentityClient,
    P: CatalogClient,
{
    repository: R,
    identity: IdentityPolicy<U>,
    catalog: CatalogPolicy<P>,
}

/// A user and products confirmed to exist for a write.
struct References {
    user: User,
    products: Vec<Product>,
}

impl<R, U, P> OrdersService<R, U, P>
where
    R: OrderRepository,
    U: IdentityClient,
    P: CatalogClient,
{
    pub fn new(repository: R, identity: IdentityPolicy<U>, catalog: CatalogPolicy<P>) -> Self {
        Self {
            repository,
            identity,
            catalog,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn identity(&self) -> &IdentityPolicy<U> {
        &self.identity
    }

    pub fn catalog(&self) -> &CatalogPolicy<P> {
        &self.catalog
    }

    /// Creates an order.
    ///
    /// Fails with a validation error before any downstream call, and with a
    /// reference error when the user or any product does not exist. A
    /// placeholder user from a degraded identity service counts as existing.
    #[tracing::instrument(skip(self, request))]
    pub async fn add_order(&self, request: OrderAddRequest) -> Result<OrderResponse> {
        let started = Instant::now();
        let order = mapping::order_from_add_request(&request)?;
        let user_id = order.user_id();

        let references = self
            .verify_references(user_id, &request.product_ids())
            .await?;
        let stored = self.repository.add_order(order).await?;

        tracing::info!(order_id = %stored.order_id(), %user_id, total = %stored.total_bill(), "order created");
        metrics::counter!("orders_created_total").increment(1);
        record_duration("add", started);

        Ok(Enrichment::for_write(user_id, references.user, references.products).apply(&stored))
    }

    /// Replaces an existing order.
    ///
    /// Same checks as [`add_order`](Self::add_order). Fails with
    /// [`OrderServiceError::NotFound`] when no order has the given id.
    #[tracing::instrument(skip(self, request), fields(order_id))]
    pub async fn update_order(&self, request: OrderUpdateRequest) -> Result<OrderResponse> {
        let started = Instant::now();
        let order = mapping::order_from_update_request(&request)?;
        let order_id = order.order_id();
        let user_id = order.user_id();
        tracing::Span::current().record("order_id", tracing::field::display(order_id));

        let references = self
            .verify_references(user_id, &request.product_ids())
            .await?;
        let updated = self
            .repository
            .update_order(order)
            .await?
            .ok_or(OrderServiceError::NotFound(order_id))?;

        tracing::info!(%order_id, total = %updated.total_bill(), "order updated");
        metrics::counter!("orders_updated_total").increment(1);
        record_duration("update", started);

        Ok(Enrichment::for_write(user_id, references.user, references.products).apply(&updated))
    }

    /// Deletes an order. Returns `false` when no order has the given id.
    #[tracing::instrument(skip(self))]
    pub async fn delete_order(&self, order_id: OrderId) -> Result<bool> {
        let started = Instant::now();
        let existing = self
            .repository
            .get_order_by_condition(&OrderFilter::OrderId(order_id))
            .await?;
        if existing.is_none() {
            tracing::debug!("order not found, nothing to delete");
            return Ok(false);
        }

        let deleted = self.repository.delete_order(order_id).await?;
        if deleted {
            tracing::info!("order deleted");
            metrics::counter!("orders_deleted_total").increment(1);
        }
        record_duration("delete", started);
        Ok(deleted)
    }

    /// Every stored order, decorated.
    #[tracing::instrument(skip(self))]
    pub async fn get_orders(&self) -> Result<Vec<OrderResponse>> {
        let started = Instant::now();
        let orders = self.repository.get_orders().await?;
        let views = self.enrich(&orders).await;
        record_duration("list", started);
        Ok(views)
    }

    /// Stored orders matching `filter`, decorated.
    #[tracing::instrument(skip(self))]
    pub async fn get_orders_by_condition(&self, filter: &OrderFilter) -> Result<Vec<OrderResponse>> {
        let started = Instant::now();
        let orders = self.repository.get_orders_by_condition(filter).await?;
        let views = self.enrich(&orders).await;
        record_duration("search", started);
        Ok(views)
    }

    /// The first stored order matching `filter`, decorated.
    #[tracing::instrument(skip(self))]
    pub async fn get_order_by_condition(
        &self,
        filter: &OrderFilter,
    ) -> Result<Option<OrderResponse>> {
        let started = Instant::now();
        let Some(order) = self.repository.get_order_by_condition(filter).await? else {
            return Ok(None);
        };
        let view = self.enrich(std::slice::from_ref(&order)).await.pop();
        record_duration("get", started);
        Ok(view)
    }

    async fn verify_references(
        &self,
        user_id: UserId,
        product_ids: &[ProductId],
    ) -> Result<References> {
        let Some(user) = self.identity.get_user(user_id).await? else {
            return Err(reference_error(ReferenceError::UnknownUser));
        };
        if user.is_placeholder() {
            tracing::info!(%user_id, "identity degraded, accepting user unverified");
        }

        let lookup = self.catalog.get_products(product_ids).await?;
        // Placeholders prove nothing, so a degraded lookup resolves no product.
        let resolved: HashSet<ProductId> = if lookup.degraded {
            HashSet::new()
        } else {
            lookup.products.iter().map(|p| p.product_id).collect()
        };
        let missing: Vec<ProductId> = product_ids
            .iter()
            .copied()
            .filter(|id| !resolved.contains(id))
            .collect();
        if !missing.is_empty() {
            return Err(reference_error(ReferenceError::UnknownProducts(missing)));
        }

        Ok(References {
            user,
            products: lookup.products,
        })
    }

    /// Decorates `orders` using one batched lookup per dependency.
    ///
    /// Lookup failures that survive the fallbacks are logged and the views
    /// are returned undecorated.
    async fn enrich(&self, orders: &[Order]) -> Vec<OrderResponse> {
        if orders.is_empty() {
            return Vec::new();
        }
        let user_ids = distinct(orders.iter().map(Order::user_id));
        let product_ids = distinct(
            orders
                .iter()
                .flat_map(|o| o.items().iter().map(|item| item.product_id)),
        );

        let (users, products) = tokio::join!(
            self.identity.get_users(&user_ids),
            self.catalog.get_products(&product_ids)
        );
        let users = users.unwrap_or_else(|err| {
            tracing::warn!(error = %err, "user lookup failed, returning orders without user details");
            Vec::new()
        });
        let products = products.map(|lookup| lookup.products).unwrap_or_else(|err| {
            tracing::warn!(error = %err, "product lookup failed, returning orders without product details");
            Vec::new()
        });

        let enrichment = Enrichment::from_lookups(users, products);
        orders.iter().map(|order| enrichment.apply(order)).collect()
    }
}

fn reference_error(err: ReferenceError) -> OrderServiceError {
    let kind = match &err {
        ReferenceError::UnknownUser => "user",
        ReferenceError::UnknownProducts(_) => "product",
    };
    tracing::info!(error = %err, "order references rejected");
    metrics::counter!("order_reference_errors_total", "kind" => kind).increment(1);
    OrderServiceError::Reference(err)
}

fn record_duration(operation: &'static str, started: Instant) {
    metrics::histogram!("order_operation_duration_seconds", "operation" => operation)
        .record(started.elapsed().as_secs_f64());
}
