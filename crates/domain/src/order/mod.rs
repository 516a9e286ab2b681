//! Order aggregate and related types.

mod aggregate;
pub mod mapping;
mod requests;
mod validation;
mod value_objects;
mod views;

pub use aggregate::Order;
pub use requests::{OrderAddRequest, OrderItemRequest, OrderUpdateRequest};
pub use validation::Validate;
pub use value_objects::{Money, OrderItem};
pub use views::{OrderItemResponse, OrderResponse};

use common::ProductId;
use thiserror::Error;

/// Aggregate invariant violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    /// Order has no items.
    #[error("Order has no items")]
    NoItems,

    /// A line has a zero quantity.
    #[error("Invalid quantity for product {product_id} (must be greater than 0)")]
    InvalidQuantity { product_id: ProductId },

    /// A line has a non-positive unit price.
    #[error("Invalid price for product {product_id} (must be greater than 0)")]
    InvalidPrice { product_id: ProductId },

    /// A line total or the bill does not fit in cents.
    #[error("Order total is out of range")]
    TotalOutOfRange,
}
