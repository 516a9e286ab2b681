//! Domain layer for the orders service.
//!
//! This crate provides:
//! - The `Order` aggregate with server-side derived totals
//! - Write requests and their validation rule tables
//! - Point-in-time snapshots of users and products owned by other services
//! - Response views and the explicit mapping/merge functions that build them

pub mod error;
pub mod external;
pub mod order;

pub use error::{FieldViolation, ReferenceError, ValidationError};
pub use external::{Product, UNAVAILABLE, User};
pub use order::{
    Money, Order, OrderAddRequest, OrderError, OrderItem, OrderItemRequest, OrderItemResponse,
    OrderResponse, OrderUpdateRequest, Validate, mapping,
};
