//! Integration tests for the API server.

use std::sync::{Arc, OnceLock};

use api::config::Config;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{ProductId, UserId};
use domain::{Product, User};
use metrics_exporter_prometheus::PrometheusHandle;
use order_store::InMemoryOrderRepository;
use orchestrator::{InMemoryCatalogClient, InMemoryIdentityClient, RetryPolicy, SimulatedFailure};
use serde_json::{Value, json};
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

struct TestApp {
    app: axum::Router,
    identity: InMemoryIdentityClient,
    catalog: InMemoryCatalogClient,
    user_id: UserId,
    product_id: ProductId,
}

fn setup() -> TestApp {
    let identity = InMemoryIdentityClient::new();
    let catalog = InMemoryCatalogClient::new();

    let user_id = UserId::new();
    identity.insert_user(User {
        user_id,
        email: Some("ada@example.com".to_string()),
        person_name: Some("Ada Lovelace".to_string()),
        gender: None,
    });
    let product_id = ProductId::new();
    catalog.insert_product(Product {
        product_id,
        product_name: Some("Widget".to_string()),
        category: Some("Gadgets".to_string()),
        unit_price: 10.0,
        quantity_in_stock: 5,
    });

    let config = Config {
        users_retry: RetryPolicy::none(),
        ..Config::default()
    };
    let state = api::create_state(
        Arc::new(InMemoryOrderRepository::new()),
        Arc::new(identity.clone()),
        Arc::new(catalog.clone()),
        &config,
    );
    let app = api::create_app(state, get_metrics_handle(), &config.cors_allowed_origin);

    TestApp {
        app,
        identity,
        catalog,
        user_id,
        product_id,
    }
}

async fn send(app: &axum::Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_string(&json).unwrap())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn order_body(user_id: UserId, product_id: ProductId, quantity: i64) -> Value {
    json!({
        "user_id": user_id.to_string(),
        "order_date": "2024-03-15T10:30:00Z",
        "order_items": [{
            "product_id": product_id.to_string(),
            "unit_price_cents": 1250,
            "quantity": quantity
        }]
    })
}

#[tokio::test]
async fn test_health_check() {
    let t = setup();

    let (status, json) = send(&t.app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["identity_circuit"], "closed");
}

#[tokio::test]
async fn test_create_order() {
    let t = setup();

    let (status, json) = send(
        &t.app,
        "POST",
        "/api/orders",
        Some(order_body(t.user_id, t.product_id, 2)),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["total_bill_cents"], 2500);
    assert_eq!(json["user_person_name"], "Ada Lovelace");
    assert_eq!(json["order_items"][0]["product_name"], "Widget");
    assert_eq!(json["order_items"][0]["total_price_cents"], 2500);
    assert!(json["order_id"].as_str().is_some());
}

#[tokio::test]
async fn test_create_order_validation_failure() {
    let t = setup();

    let (status, json) = send(
        &t.app,
        "POST",
        "/api/orders",
        Some(json!({ "order_items": [] })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let message = json["error"].as_str().unwrap();
    assert!(message.contains("User ID can't be blank"));
    assert!(message.contains("Order Items can't be blank"));
}

#[tokio::test]
async fn test_create_order_unknown_product() {
    let t = setup();
    let unknown = ProductId::new();

    let (status, json) = send(
        &t.app,
        "POST",
        "/api/orders",
        Some(order_body(t.user_id, unknown, 1)),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], format!("Invalid Product IDs: {unknown}"));
}

#[tokio::test]
async fn test_create_order_unknown_user() {
    let t = setup();

    let (status, json) = send(
        &t.app,
        "POST",
        "/api/orders",
        Some(order_body(UserId::new(), t.product_id, 1)),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Invalid User ID");
}

#[tokio::test]
async fn test_identity_outage_still_creates_order() {
    let t = setup();
    t.identity.set_failure(SimulatedFailure::Unavailable);

    let (status, json) = send(
        &t.app,
        "POST",
        "/api/orders",
        Some(order_body(t.user_id, t.product_id, 1)),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["email"], domain::UNAVAILABLE);
}

#[tokio::test]
async fn test_create_and_get_order() {
    let t = setup();
    let (_, created) = send(
        &t.app,
        "POST",
        "/api/orders",
        Some(order_body(t.user_id, t.product_id, 1)),
    )
    .await;
    let order_id = created["order_id"].as_str().unwrap();

    let (status, json) = send(
        &t.app,
        "GET",
        &format!("/api/orders/search/orderid/{order_id}"),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["order_id"], order_id);
    assert_eq!(json["email"], "ada@example.com");
}

#[tokio::test]
async fn test_get_nonexistent_order() {
    let t = setup();

    let (status, _) = send(
        &t.app,
        "GET",
        &format!("/api/orders/search/orderid/{}", common::OrderId::new()),
        None,
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_order_id_format() {
    let t = setup();

    let (status, json) = send(&t.app, "GET", "/api/orders/search/orderid/not-a-uuid", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().starts_with("Invalid order id"));
}

#[tokio::test]
async fn test_search_endpoints() {
    let t = setup();
    send(
        &t.app,
        "POST",
        "/api/orders",
        Some(order_body(t.user_id, t.product_id, 1)),
    )
    .await;

    let (_, all) = send(&t.app, "GET", "/api/orders", None).await;
    let (_, by_product) = send(
        &t.app,
        "GET",
        &format!("/api/orders/search/productid/{}", t.product_id),
        None,
    )
    .await;
    let (_, by_user) = send(
        &t.app,
        "GET",
        &format!("/api/orders/search/userid/{}", t.user_id),
        None,
    )
    .await;
    let (_, by_date) = send(&t.app, "GET", "/api/orders/search/orderdate/2024-03-15", None).await;
    let (_, other_date) =
        send(&t.app, "GET", "/api/orders/search/orderdate/2024-03-16", None).await;
    let (status, _) = send(&t.app, "GET", "/api/orders/search/orderdate/15-03-2024", None).await;

    assert_eq!(all.as_array().unwrap().len(), 1);
    assert_eq!(by_product.as_array().unwrap().len(), 1);
    assert_eq!(by_user.as_array().unwrap().len(), 1);
    assert_eq!(by_date.as_array().unwrap().len(), 1);
    assert!(other_date.as_array().unwrap().is_empty());
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(all[0]["order_items"][0]["category"], "Gadgets");
}

#[tokio::test]
async fn test_list_during_catalog_outage() {
    let t = setup();
    send(
        &t.app,
        "POST",
        "/api/orders",
        Some(order_body(t.user_id, t.product_id, 1)),
    )
    .await;
    t.catalog.set_failure(SimulatedFailure::Unavailable);

    let (status, json) = send(&t.app, "GET", "/api/orders", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json[0]["order_items"][0]["product_name"], domain::UNAVAILABLE);
    assert_eq!(json[0]["total_bill_cents"], 1250);
}

#[tokio::test]
async fn test_update_order() {
    let t = setup();
    let (_, created) = send(
        &t.app,
        "POST",
        "/api/orders",
        Some(order_body(t.user_id, t.product_id, 1)),
    )
    .await;
    let order_id = created["order_id"].as_str().unwrap().to_string();

    let mut body = order_body(t.user_id, t.product_id, 4);
    body["order_id"] = json!(order_id);
    let (status, json) = send(&t.app, "PUT", &format!("/api/orders/{order_id}"), Some(body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["order_id"], order_id);
    assert_eq!(json["total_bill_cents"], 5000);
}

#[tokio::test]
async fn test_update_with_mismatched_id() {
    let t = setup();
    let mut body = order_body(t.user_id, t.product_id, 1);
    body["order_id"] = json!(common::OrderId::new().to_string());

    let (status, _) = send(
        &t.app,
        "PUT",
        &format!("/api/orders/{}", common::OrderId::new()),
        Some(body),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_nonexistent_order() {
    let t = setup();

    let (status, _) = send(
        &t.app,
        "PUT",
        &format!("/api/orders/{}", common::OrderId::new()),
        Some(order_body(t.user_id, t.product_id, 1)),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_order() {
    let t = setup();
    let (_, created) = send(
        &t.app,
        "POST",
        "/api/orders",
        Some(order_body(t.user_id, t.product_id, 1)),
    )
    .await;
    let uri = format!("/api/orders/{}", created["order_id"].as_str().unwrap());

    let (first, _) = send(&t.app, "DELETE", &uri, None).await;
    let (second, _) = send(&t.app, "DELETE", &uri, None).await;

    assert_eq!(first, StatusCode::NO_CONTENT);
    assert_eq!(second, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let t = setup();
    send(
        &t.app,
        "POST",
        "/api/orders",
        Some(order_body(t.user_id, t.product_id, 1)),
    )
    .await;

    let response = t
        .app
        .clone()
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("orders_created_total"));
}
