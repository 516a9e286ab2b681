//! In-memory identity and catalog clients for testing.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{ProductId, UserId};
use domain::{Product, User};
use parking_lot::RwLock;

use super::{CatalogClient, Dependency, DownstreamError, IdentityClient};

/// A failure an in-memory client can be told to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulatedFailure {
    /// The dependency answers 503.
    Unavailable,
    /// The dependency answers 400.
    BadRequest,
    /// The dependency answers 200 with a body that cannot be decoded.
    Malformed,
}

impl SimulatedFailure {
    fn into_error(self, dependency: Dependency) -> DownstreamError {
        match self {
            SimulatedFailure::Unavailable => DownstreamError::Upstream {
                dependency,
                status: Some(503),
                message: "status 503 Service Unavailable".to_string(),
            },
            SimulatedFailure::BadRequest => DownstreamError::BadRequest {
                dependency,
                message: "Bad request".to_string(),
            },
            SimulatedFailure::Malformed => DownstreamError::Schema {
                dependency,
                message: "expected value at line 1 column 1".to_string(),
            },
        }
    }
}

#[derive(Debug, Default)]
struct FailurePlan {
    failure: Option<SimulatedFailure>,
    /// `None` fails every call while a failure is set.
    remaining: Option<u32>,
}

impl FailurePlan {
    fn next(&mut self, dependency: Dependency) -> Result<(), DownstreamError> {
        let Some(failure) = self.failure else {
            return Ok(());
        };
        match self.remaining.as_mut() {
            Some(0) => {
                self.failure = None;
                self.remaining = None;
                Ok(())
            }
            Some(n) => {
                *n -= 1;
                Err(failure.into_error(dependency))
            }
            None => Err(failure.into_error(dependency)),
        }
    }
}

#[derive(Debug, Default)]
struct InMemoryIdentityState {
    users: HashMap<UserId, User>,
    plan: FailurePlan,
    single_calls: usize,
    batch_calls: usize,
}

/// In-memory identity service for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryIdentityClient {
    state: Arc<RwLock<InMemoryIdentityState>>,
}

impl InMemoryIdentityClient {
    /// Creates an empty identity service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a user.
    pub fn insert_user(&self, user: User) {
        self.state.write().users.insert(user.user_id, user);
    }

    /// Makes every call fail until [`clear_failure`](Self::clear_failure).
    pub fn set_failure(&self, failure: SimulatedFailure) {
        self.state.write().plan = FailurePlan {
            failure: Some(failure),
            remaining: None,
        };
    }

    /// Makes the next `times` calls fail, then recovers.
    pub fn fail_times(&self, failure: SimulatedFailure, times: u32) {
        self.state.write().plan = FailurePlan {
            failure: Some(failure),
            remaining: Some(times),
        };
    }

    pub fn clear_failure(&self) {
        self.state.write().plan = FailurePlan::default();
    }

    /// Number of single-user lookups received.
    pub fn get_user_calls(&self) -> usize {
        self.state.read().single_calls
    }

    /// Number of batched lookups received.
    pub fn get_users_calls(&self) -> usize {
        self.state.read().batch_calls
    }
}

#[async_trait]
impl IdentityClient for InMemoryIdentityClient {
    async fn get_user(&self, user_id: UserId) -> Result<Option<User>, DownstreamError> {
        let mut state = self.state.write();
        state.single_calls += 1;
        state.plan.next(Dependency::Identity)?;
        Ok(state.users.get(&user_id).cloned())
    }

    async fn get_users(&self, user_ids: &[UserId]) -> Result<Vec<User>, DownstreamError> {
        let mut state = self.state.write();
        state.batch_calls += 1;
        state.plan.next(Dependency::Identity)?;
        Ok(user_ids
            .iter()
            .filter_map(|id| state.users.get(id).cloned())
            .collect())
    }
}

#[derive(Debug, Default)]
struct InMemoryCatalogState {
    products: HashMap<ProductId, Product>,
    plan: FailurePlan,
    single_calls: usize,
    batch_calls: usize,
    last_batch: Vec<ProductId>,
}

/// In-memory catalog service for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalogClient {
    state: Arc<RwLock<InMemoryCatalogState>>,
}

impl InMemoryCatalogClient {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a product.
    pub fn insert_product(&self, product: Product) {
        self.state
            .write()
            .products
            .insert(product.product_id, product);
    }

    /// Makes every call fail until [`clear_failure`](Self::clear_failure).
    pub fn set_failure(&self, failure: SimulatedFailure) {
        self.state.write().plan = FailurePlan {
            failure: Some(failure),
            remaining: None,
        };
    }

    /// Makes the next `times` calls fail, then recovers.
    pub fn fail_times(&self, failure: SimulatedFailure, times: u32) {
        self.state.write().plan = FailurePlan {
            failure: Some(failure),
            remaining: Some(times),
        };
    }

    pub fn clear_failure(&self) {
        self.state.write().plan = FailurePlan::default();
    }

    /// Number of single-product lookups received.
    pub fn get_product_calls(&self) -> usize {
        self.state.read().single_calls
    }

    /// Number of batched lookups received.
    pub fn get_products_calls(&self) -> usize {
        self.state.read().batch_calls
    }

    /// Ids sent with the most recent batched lookup.
    pub fn last_batch(&self) -> Vec<ProductId> {
        self.state.read().last_batch.clone()
    }
}

#[async_trait]
impl CatalogClient for InMemoryCatalogClient {
    async fn get_product(&self, product_id: ProductId) -> Result<Option<Product>, DownstreamError> {
        let mut state = self.state.write();
        state.single_calls += 1;
        state.plan.next(Dependency::Catalog)?;
        Ok(state.products.get(&product_id).cloned())
    }

    async fn get_products(
        &self,
        product_ids: &[ProductId],
    ) -> Result<Vec<Product>, DownstreamError> {
        let mut state = self.state.write();
        state.batch_calls += 1;
        state.last_batch = product_ids.to_vec();
        state.plan.next(Dependency::Catalog)?;
        Ok(product_ids
            .iter()
            .filter_map(|id| state.products.get(id).cloned())
            .collect())
    }
}
