//! Order CRUD and search endpoints.

use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::{DateTime, NaiveDate, Utc};
use common::{OrderId, ProductId, UserId};
use domain::{Money, OrderAddRequest, OrderUpdateRequest};
use order_store::{OrderFilter, OrderRepository};
use orchestrator::{CatalogClient, IdentityClient, OrdersService};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// The orchestrator as wired into the server, with type-erased adapters.
pub type Orders =
    OrdersService<Arc<dyn OrderRepository>, Arc<dyn IdentityClient>, Arc<dyn CatalogClient>>;

/// Shared application state accessible from all handlers.
pub struct AppState {
    pub orders: Orders,
}

// -- Request types --

#[derive(Deserialize)]
pub struct OrderRequest {
    pub order_id: Option<String>,
    pub user_id: Option<String>,
    pub order_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub order_items: Vec<OrderItemRequest>,
}

#[derive(Deserialize)]
pub struct OrderItemRequest {
    pub product_id: Option<String>,
    pub unit_price_cents: Option<i64>,
    pub quantity: Option<i64>,
}

// -- Response types --

#[derive(Serialize)]
pub struct OrderResponse {
    pub order_id: String,
    pub user_id: String,
    pub user_person_name: Option<String>,
    pub email: Option<String>,
    pub order_date: DateTime<Utc>,
    pub total_bill_cents: i64,
    pub order_items: Vec<OrderItemResponse>,
}

#[derive(Serialize)]
pub struct OrderItemResponse {
    pub product_id: String,
    pub product_name: Option<String>,
    pub category: Option<String>,
    pub unit_price_cents: i64,
    pub quantity: u32,
    pub total_price_cents: i64,
}

impl From<domain::OrderResponse> for OrderResponse {
    fn from(order: domain::OrderResponse) -> Self {
        Self {
            order_id: order.order_id.to_string(),
            user_id: order.user_id.to_string(),
            user_person_name: order.user_person_name,
            email: order.email,
            order_date: order.order_date,
            total_bill_cents: order.total_bill.cents(),
            order_items: order
                .order_items
                .into_iter()
                .map(|item| OrderItemResponse {
                    product_id: item.product_id.to_string(),
                    product_name: item.product_name,
                    category: item.category,
                    unit_price_cents: item.unit_price.cents(),
                    quantity: item.quantity,
                    total_price_cents: item.total_price.cents(),
                })
                .collect(),
        }
    }
}

fn parse_id<T>(field: &str, value: &str) -> Result<T, ApiError>
where
    T: FromStr,
    T::Err: Display,
{
    value
        .parse()
        .map_err(|e| ApiError::BadRequest(format!("Invalid {field}: {e}")))
}

fn parse_optional_id<T>(field: &str, value: Option<&str>) -> Result<Option<T>, ApiError>
where
    T: FromStr,
    T::Err: Display,
{
    value.map(|v| parse_id(field, v)).transpose()
}

fn items_from_request(
    items: &[OrderItemRequest],
) -> Result<Vec<domain::OrderItemRequest>, ApiError> {
    items
        .iter()
        .map(|item| -> Result<domain::OrderItemRequest, ApiError> {
            Ok(domain::OrderItemRequest {
                product_id: parse_optional_id("product_id", item.product_id.as_deref())?,
                unit_price: item.unit_price_cents.map(Money::from_cents),
                quantity: item.quantity,
            })
        })
        .collect()
}

fn to_responses(orders: Vec<domain::OrderResponse>) -> Json<Vec<OrderResponse>> {
    Json(orders.into_iter().map(OrderResponse::from).collect())
}

// -- Handlers --

/// GET /api/orders: list every order.
#[tracing::instrument(skip(state))]
pub async fn list(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let orders = state.orders.get_orders().await?;
    Ok(to_responses(orders))
}

/// GET /api/orders/search/orderid/{id}: load one order.
#[tracing::instrument(skip(state))]
pub async fn get_by_order_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<OrderResponse>, ApiError> {
    let order_id: OrderId = parse_id("order id", &id)?;
    let order = state
        .orders
        .get_order_by_condition(&OrderFilter::OrderId(order_id))
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Order {id} not found")))?;
    Ok(Json(order.into()))
}

/// GET /api/orders/search/productid/{id}: orders containing a product.
#[tracing::instrument(skip(state))]
pub async fn search_by_product_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let product_id: ProductId = parse_id("product id", &id)?;
    let orders = state
        .orders
        .get_orders_by_condition(&OrderFilter::ProductId(product_id))
        .await?;
    Ok(to_responses(orders))
}

/// GET /api/orders/search/userid/{id}: orders placed by a user.
#[tracing::instrument(skip(state))]
pub async fn search_by_user_id(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let user_id: UserId = parse_id("user id", &id)?;
    let orders = state
        .orders
        .get_orders_by_condition(&OrderFilter::UserId(user_id))
        .await?;
    Ok(to_responses(orders))
}

/// GET /api/orders/search/orderdate/{date}: orders placed on a UTC calendar day.
#[tracing::instrument(skip(state))]
pub async fn search_by_order_date(
    State(state): State<Arc<AppState>>,
    Path(date): Path<String>,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
        .map_err(|e| ApiError::BadRequest(format!("Invalid order date: {e}")))?;
    let orders = state
        .orders
        .get_orders_by_condition(&OrderFilter::OrderDate(date))
        .await?;
    Ok(to_responses(orders))
}

/// POST /api/orders: create an order.
#[tracing::instrument(skip(state, req))]
pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(req): Json<OrderRequest>,
) -> Result<(StatusCode, Json<OrderResponse>), ApiError> {
    let request = OrderAddRequest {
        user_id: parse_optional_id("user_id", req.user_id.as_deref())?,
        order_date: req.order_date,
        order_items: items_from_request(&req.order_items)?,
    };
    let order = state.orders.add_order(request).await?;
    Ok((StatusCode::CREATED, Json(order.into())))
}

/// PUT /api/orders/{id}: replace an order.
#[tracing::instrument(skip(state, req))]
pub async fn update(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<OrderRequest>,
) -> Result<Json<OrderResponse>, ApiError> {
    let path_id: OrderId = parse_id("order id", &id)?;
    let body_id: Option<OrderId> = parse_optional_id("order_id", req.order_id.as_deref())?;
    if body_id.is_some_and(|body_id| body_id != path_id) {
        return Err(ApiError::BadRequest(
            "Order ID in body does not match path".to_string(),
        ));
    }

    let request = OrderUpdateRequest {
        order_id: Some(path_id),
        user_id: parse_optional_id("user_id", req.user_id.as_deref())?,
        order_date: req.order_date,
        order_items: items_from_request(&req.order_items)?,
    };
    let order = state.orders.update_order(request).await?;
    Ok(Json(order.into()))
}

/// DELETE /api/orders/{id}: delete an order.
#[tracing::instrument(skip(state))]
pub async fn delete(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let order_id: OrderId = parse_id("order id", &id)?;
    if state.orders.delete_order(order_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Order {id} not found")))
    }
}
