//! HTTP adapter behavior against a local stub of the identity and catalog services.

use std::time::Duration;

use axum::extract::{Path, RawQuery};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use common::{ProductId, UserId};
use orchestrator::{
    CatalogClient, Dependency, DownstreamError, HttpCatalogClient, HttpIdentityClient,
    IdentityClient,
};
use serde_json::json;

const TIMEOUT: Duration = Duration::from_secs(5);

async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

fn ids_from_query(query: Option<String>) -> Vec<String> {
    query
        .unwrap_or_default()
        .split('&')
        .filter_map(|pair| pair.strip_prefix("ids="))
        .map(str::to_string)
        .collect()
}

#[tokio::test]
async fn get_user_decodes_wire_format() {
    let router = Router::new().route(
        "/api/users/{id}",
        get(|Path(id): Path<String>| async move {
            Json(json!({
                "userID": id,
                "email": "ada@example.com",
                "personName": "Ada Lovelace",
                "gender": "Female"
            }))
        }),
    );
    let client = HttpIdentityClient::new(spawn(router).await, TIMEOUT).unwrap();
    let user_id = UserId::new();

    let user = client.get_user(user_id).await.unwrap().unwrap();

    assert_eq!(user.user_id, user_id);
    assert_eq!(user.person_name.as_deref(), Some("Ada Lovelace"));
}

#[tokio::test]
async fn statuses_are_classified() {
    let router = Router::new().route(
        "/api/users/{id}",
        get(|Path(id): Path<String>| async move {
            match id.as_str() {
                "00000000-0000-0000-0000-000000000001" => StatusCode::NOT_FOUND.into_response(),
                "00000000-0000-0000-0000-000000000002" => StatusCode::BAD_REQUEST.into_response(),
                "00000000-0000-0000-0000-000000000003" => {
                    (StatusCode::OK, "not json").into_response()
                }
                _ => StatusCode::SERVICE_UNAVAILABLE.into_response(),
            }
        }),
    );
    let client = HttpIdentityClient::new(spawn(router).await, TIMEOUT).unwrap();
    let id = |n: u128| UserId::from_uuid(uuid::Uuid::from_u128(n));

    assert_eq!(client.get_user(id(1)).await.unwrap(), None);
    assert!(matches!(
        client.get_user(id(2)).await,
        Err(DownstreamError::BadRequest {
            dependency: Dependency::Identity,
            ..
        })
    ));
    assert!(matches!(
        client.get_user(id(3)).await,
        Err(DownstreamError::Schema { .. })
    ));
    assert!(matches!(
        client.get_user(id(4)).await,
        Err(DownstreamError::Upstream {
            status: Some(503),
            ..
        })
    ));
}

#[tokio::test]
async fn get_users_sends_repeated_ids_and_skips_nulls() {
    let router = Router::new().route(
        "/api/users/search",
        get(|RawQuery(query): RawQuery| async move {
            let mut users: Vec<serde_json::Value> = ids_from_query(query)
                .into_iter()
                .map(|id| json!({ "userID": id, "email": "x@example.com", "personName": "X" }))
                .collect();
            users.push(serde_json::Value::Null);
            Json(users)
        }),
    );
    let client = HttpIdentityClient::new(spawn(router).await, TIMEOUT).unwrap();
    let ids = [UserId::new(), UserId::new()];

    let users = client.get_users(&ids).await.unwrap();

    assert_eq!(users.len(), 2);
    assert_eq!(users[0].user_id, ids[0]);
    assert_eq!(users[1].user_id, ids[1]);
}

#[tokio::test]
async fn get_products_uses_batch_endpoint() {
    let router = Router::new()
        .route(
            "/api/products/search",
            get(|RawQuery(query): RawQuery| async move {
                let products: Vec<serde_json::Value> = ids_from_query(query)
                    .into_iter()
                    .map(|id| {
                        json!({
                            "productID": id,
                            "productName": "Hammer",
                            "category": "Tools",
                            "unitPrice": 12.5,
                            "quantityInStock": 3
                        })
                    })
                    .collect();
                Json(products)
            }),
        )
        .route(
            "/api/products/search/product-id/{id}",
            get(|| async { StatusCode::NOT_FOUND }),
        );
    let client = HttpCatalogClient::new(format!("{}/", spawn(router).await), TIMEOUT).unwrap();
    let id = ProductId::new();

    let products = client.get_products(&[id]).await.unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].product_id, id);
    assert_eq!(products[0].unit_price, 12.5);

    assert_eq!(client.get_product(id).await.unwrap(), None);
    assert!(client.get_products(&[]).await.unwrap().is_empty());
}

#[tokio::test]
async fn unreachable_service_is_upstream_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let client = HttpCatalogClient::new(format!("http://{addr}"), TIMEOUT).unwrap();

    let err = client.get_products(&[ProductId::new()]).await.unwrap_err();

    assert!(matches!(
        err,
        DownstreamError::Upstream {
            dependency: Dependency::Catalog,
            status: None,
            ..
        }
    ));
    assert!(err.is_transient());
}

#[tokio::test]
async fn slow_service_times_out() {
    let router = Router::new().route(
        "/api/users/{id}",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(2)).await;
            StatusCode::OK
        }),
    );
    let client =
        HttpIdentityClient::new(spawn(router).await, Duration::from_millis(100)).unwrap();

    let err = client.get_user(UserId::new()).await.unwrap_err();

    assert!(matches!(err, DownstreamError::Upstream { status: None, .. }));
}
