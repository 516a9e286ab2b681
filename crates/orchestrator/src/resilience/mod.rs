//! Resilience policies wrapped around the downstream clients.
//!
//! Identity calls get retry, a circuit breaker and a placeholder fallback.
//! Catalog calls get only the placeholder fallback.

mod catalog;
mod circuit_breaker;
mod identity;
mod retry;

pub use catalog::{CatalogPolicy, ProductLookup};
pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
pub use identity::IdentityPolicy;
pub use retry::RetryPolicy;

use crate::clients::{Dependency, DownstreamError};

fn record_outcome<T>(dependency: Dependency, result: &Result<T, DownstreamError>) {
    let outcome = match result {
        Ok(_) => "success",
        Err(DownstreamError::BadRequest { .. }) => "bad_request",
        Err(DownstreamError::CircuitOpen { .. }) => "rejected",
        Err(_) => "failure",
    };
    metrics::counter!(
        "downstream_requests_total",
        "dependency" => dependency.as_str(),
        "outcome" => outcome
    )
    .increment(1);
}

fn record_fallback(dependency: Dependency) {
    metrics::counter!(
        "downstream_fallbacks_total",
        "dependency" => dependency.as_str()
    )
    .increment(1);
}
