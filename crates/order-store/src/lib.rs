//! Persistence for order aggregates.
//!
//! The repository owns id assignment: orders and their lines receive fresh ids
//! when inserted or replaced. Backends store each order as one document.

pub mod error;
pub mod filter;
pub mod memory;
pub mod postgres;
pub mod repository;

pub use error::{Result, StoreError};
pub use filter::OrderFilter;
pub use memory::InMemoryOrderRepository;
pub use postgres::PostgresOrderRepository;
pub use repository::OrderRepository;
