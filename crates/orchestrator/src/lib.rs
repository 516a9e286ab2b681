//! Order aggregation orchestrator.
//!
//! This crate provides:
//! - Client adapters for the identity and catalog services (HTTP and in-memory)
//! - Resilience policies: retry, circuit breaker and placeholder fallbacks
//! - `OrdersService`, which validates writes against both dependencies and
//!   decorates reads with batched lookups

pub mod clients;
pub mod enrichment;
pub mod error;
pub mod resilience;
pub mod service;

pub use clients::{
    CatalogClient, Dependency, DownstreamError, HttpCatalogClient, HttpIdentityClient,
    IdentityClient, InMemoryCatalogClient, InMemoryIdentityClient, SimulatedFailure,
};
pub use error::{OrderServiceError, Result};
pub use resilience::{
    CatalogPolicy, CircuitBreaker, CircuitBreakerConfig, CircuitState, IdentityPolicy, ProductLookup,
    RetryPolicy,
};
pub use service::OrdersService;
