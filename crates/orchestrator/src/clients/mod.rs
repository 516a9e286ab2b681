//! Downstream client adapters for the identity and catalog services.
//!
//! An adapter maps one typed request to one outbound call and classifies the
//! outcome. Adapters never retry; resilience is layered on top in
//! [`crate::resilience`].

pub mod http;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use common::{ProductId, UserId};
use domain::{Product, User};
use thiserror::Error;

pub use http::{HttpCatalogClient, HttpIdentityClient};
pub use memory::{InMemoryCatalogClient, InMemoryIdentityClient, SimulatedFailure};

/// A service this system depends on but does not control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dependency {
    Identity,
    Catalog,
}

impl Dependency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dependency::Identity => "identity",
            Dependency::Catalog => "catalog",
        }
    }
}

impl std::fmt::Display for Dependency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classified failure of a downstream call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DownstreamError {
    /// The dependency rejected the request as malformed (HTTP 400).
    #[error("{dependency} service rejected the request: {message}")]
    BadRequest {
        dependency: Dependency,
        message: String,
    },

    /// Any other non-success status, or no response at all.
    #[error("{dependency} service request failed: {message}")]
    Upstream {
        dependency: Dependency,
        status: Option<u16>,
        message: String,
    },

    /// A success response whose body did not match the expected shape.
    #[error("{dependency} service returned an unreadable response: {message}")]
    Schema {
        dependency: Dependency,
        message: String,
    },

    /// The call was not attempted because the dependency's breaker is open.
    #[error("{dependency} service circuit is open")]
    CircuitOpen { dependency: Dependency },
}

impl DownstreamError {
    /// The dependency that produced this error.
    pub fn dependency(&self) -> Dependency {
        match self {
            DownstreamError::BadRequest { dependency, .. }
            | DownstreamError::Upstream { dependency, .. }
            | DownstreamError::Schema { dependency, .. }
            | DownstreamError::CircuitOpen { dependency } => *dependency,
        }
    }

    /// True for failures that may succeed if tried again.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            DownstreamError::Upstream { .. } | DownstreamError::Schema { .. }
        )
    }

    /// True if the caller sent a malformed request.
    pub fn is_bad_request(&self) -> bool {
        matches!(self, DownstreamError::BadRequest { .. })
    }
}

/// Lookups against the identity (users) service.
#[async_trait]
pub trait IdentityClient: Send + Sync {
    /// Fetches one user. `Ok(None)` means the user does not exist.
    async fn get_user(&self, user_id: UserId) -> Result<Option<User>, DownstreamError>;

    /// Fetches many users in one call. Unknown ids are omitted from the result.
    async fn get_users(&self, user_ids: &[UserId]) -> Result<Vec<User>, DownstreamError>;
}

/// Lookups against the catalog (products) service.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Fetches one product. `Ok(None)` means the product does not exist.
    async fn get_product(&self, product_id: ProductId) -> Result<Option<Product>, DownstreamError>;

    /// Fetches many products in one call. Unknown ids are omitted from the result.
    async fn get_products(&self, product_ids: &[ProductId])
    -> Result<Vec<Product>, DownstreamError>;
}

#[async_trait]
impl<T: IdentityClient + ?Sized> IdentityClient for Arc<T> {
    async fn get_user(&self, user_id: UserId) -> Result<Option<User>, DownstreamError> {
        (**self).get_user(user_id).await
    }

    async fn get_users(&self, user_ids: &[UserId]) -> Result<Vec<User>, DownstreamError> {
        (**self).get_users(user_ids).await
    }
}

#[async_trait]
impl<T: CatalogClient + ?Sized> CatalogClient for Arc<T> {
    async fn get_product(&self, product_id: ProductId) -> Result<Option<Product>, DownstreamError> {
        (**self).get_product(product_id).await
    }

    async fn get_products(
        &self,
        product_ids: &[ProductId],
    ) -> Result<Vec<Product>, DownstreamError> {
        (**self).get_products(product_ids).await
    }
}
