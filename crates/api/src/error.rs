//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use orchestrator::{DownstreamError, OrderServiceError};

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Resource not found.
    NotFound(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Orchestrator error.
    Orders(OrderServiceError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Orders(err) => orders_error_to_response(err),
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn orders_error_to_response(err: OrderServiceError) -> (StatusCode, String) {
    match &err {
        OrderServiceError::Validation(_)
        | OrderServiceError::Reference(_)
        | OrderServiceError::Downstream(DownstreamError::BadRequest { .. }) => {
            (StatusCode::BAD_REQUEST, err.to_string())
        }
        OrderServiceError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        OrderServiceError::Downstream(_) => {
            tracing::error!(error = %err, "downstream failure");
            (StatusCode::BAD_GATEWAY, err.to_string())
        }
        OrderServiceError::Store(_) => {
            tracing::error!(error = %err, "order store failure");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        }
    }
}

impl From<OrderServiceError> for ApiError {
    fn from(err: OrderServiceError) -> Self {
        ApiError::Orders(err)
    }
}
