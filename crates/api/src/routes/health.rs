//! Health check endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use orchestrator::CircuitState;
use serde::Serialize;

use super::orders::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub identity_circuit: &'static str,
}

/// GET /health: reports liveness and the identity breaker state.
pub async fn check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let identity_circuit = match state.orders.identity().breaker().state() {
        CircuitState::Closed => "closed",
        CircuitState::Open => "open",
        CircuitState::HalfOpen => "half_open",
    };
    Json(HealthResponse {
        status: "ok",
        identity_circuit,
    })
}
