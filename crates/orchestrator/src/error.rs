//! Orchestrator error types.

use common::OrderId;
use domain::{ReferenceError, ValidationError};
use order_store::StoreError;
use thiserror::Error;

use crate::clients::DownstreamError;

/// Errors returned by [`crate::OrdersService`].
#[derive(Debug, Error)]
pub enum OrderServiceError {
    /// The request failed field validation.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The request names a user or products that do not exist.
    #[error(transparent)]
    Reference(#[from] ReferenceError),

    /// The order to update does not exist.
    #[error("Order not found: {0}")]
    NotFound(OrderId),

    /// A dependency failed in a way no fallback covers.
    #[error(transparent)]
    Downstream(#[from] DownstreamError),

    /// The order store failed.
    #[error("Order store error: {0}")]
    Store(#[from] StoreError),
}

/// Result type for orchestrator operations.
pub type Result<T> = std::result::Result<T, OrderServiceError>;
