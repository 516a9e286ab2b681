use std::sync::Arc;

use common::UserId;
use domain::User;
use tracing::warn;

use super::{CircuitBreaker, RetryPolicy, record_fallback, record_outcome};
use crate::clients::{Dependency, DownstreamError, IdentityClient};

/// Identity lookups with retry, circuit breaking and placeholder fallback.
///
/// Retry wraps the breaker, so every attempt is counted by the breaker and
/// an open breaker ends the retry loop immediately. Once retries are spent
/// or the breaker rejects the call, the lookup succeeds with a placeholder
/// user. Bad requests are returned to the caller unchanged.
#[derive(Debug)]
pub struct IdentityPolicy<C> {
    client: C,
    retry: RetryPolicy,
    breaker: Arc<CircuitBreaker>,
}

impl<C: IdentityClient> IdentityPolicy<C> {
    pub fn new(client: C, retry: RetryPolicy, breaker: Arc<CircuitBreaker>) -> Self {
        Self {
            client,
            retry,
            breaker,
        }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    /// Looks up one user. `Ok(None)` means the user does not exist.
    pub async fn get_user(&self, user_id: UserId) -> Result<Option<User>, DownstreamError> {
        let result = self
            .retry
            .execute(Dependency::Identity, "get_user", || {
                self.breaker.execute(|| self.attempt_get_user(user_id))
            })
            .await;

        match result {
            Err(err) if !err.is_bad_request() => {
                warn!(%user_id, error = %err, "identity unavailable, using placeholder user");
                record_fallback(Dependency::Identity);
                Ok(Some(User::placeholder()))
            }
            other => other,
        }
    }

    /// Looks up many users. Unknown ids are omitted.
    pub async fn get_users(&self, user_ids: &[UserId]) -> Result<Vec<User>, DownstreamError> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        let result = self
            .retry
            .execute(Dependency::Identity, "get_users", || {
                self.breaker.execute(|| self.attempt_get_users(user_ids))
            })
            .await;

        match result {
            Err(err) if !err.is_bad_request() => {
                warn!(count = user_ids.len(), error = %err, "identity unavailable, using placeholder users");
                record_fallback(Dependency::Identity);
                Ok(user_ids.iter().copied().map(User::placeholder_for).collect())
            }
            other => other,
        }
    }

    async fn attempt_get_user(&self, user_id: UserId) -> Result<Option<User>, DownstreamError> {
        let result = self.client.get_user(user_id).await;
        record_outcome(Dependency::Identity, &result);
        result
    }

    async fn attempt_get_users(&self, user_ids: &[UserId]) -> Result<Vec<User>, DownstreamError> {
        let result = self.client.get_users(user_ids).await;
        record_outcome(Dependency::Identity, &result);
        result
    }
}
