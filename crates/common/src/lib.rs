//! Shared identifier types used across the orders service crates.

pub mod types;

pub use types::{OrderId, OrderLineId, ProductId, UserId};
