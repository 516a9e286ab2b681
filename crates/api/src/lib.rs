//! HTTP API server with observability for the orders service.
//!
//! Provides REST endpoints for order management and search, with
//! structured logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::http::HeaderValue;
use axum::routing::get;
use metrics_exporter_prometheus::PrometheusHandle;
use orchestrator::{
    CatalogClient, CatalogPolicy, CircuitBreaker, Dependency, IdentityClient, IdentityPolicy,
    OrdersService,
};
use order_store::OrderRepository;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::routes::orders::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app(
    state: Arc<AppState>,
    metrics_handle: PrometheusHandle,
    cors_allowed_origin: &str,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route(
            "/api/orders",
            get(routes::orders::list).post(routes::orders::create),
        )
        .route(
            "/api/orders/{id}",
            axum::routing::put(routes::orders::update).delete(routes::orders::delete),
        )
        .route(
            "/api/orders/search/orderid/{id}",
            get(routes::orders::get_by_order_id),
        )
        .route(
            "/api/orders/search/productid/{id}",
            get(routes::orders::search_by_product_id),
        )
        .route(
            "/api/orders/search/userid/{id}",
            get(routes::orders::search_by_user_id),
        )
        .route(
            "/api/orders/search/orderdate/{date}",
            get(routes::orders::search_by_order_date),
        )
        .with_state(state)
        .merge(metrics_router)
        .layer(cors_layer(cors_allowed_origin))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origin: &str) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    match origin.parse::<HeaderValue>() {
        Ok(origin) => layer.allow_origin(origin),
        Err(_) => {
            tracing::warn!(%origin, "invalid CORS origin, cross-origin requests disabled");
            layer
        }
    }
}

/// Wires the orchestrator over the given adapters using the resilience settings in `config`.
pub fn create_state(
    repository: Arc<dyn OrderRepository>,
    identity: Arc<dyn IdentityClient>,
    catalog: Arc<dyn CatalogClient>,
    config: &Config,
) -> Arc<AppState> {
    let breaker = Arc::new(CircuitBreaker::new(
        Dependency::Identity,
        config.users_breaker,
    ));
    let orders = OrdersService::new(
        repository,
        IdentityPolicy::new(identity, config.users_retry, breaker),
        CatalogPolicy::new(catalog),
    );
    Arc::new(AppState { orders })
}
