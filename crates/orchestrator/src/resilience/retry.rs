//! Retry with exponential backoff for transient downstream failures.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::clients::{Dependency, DownstreamError};

/// Retry configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry; doubled for each retry after it.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub const fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
        }
    }

    /// Delay before retry number `retry` (1-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        if retry == 0 {
            return Duration::ZERO;
        }
        let factor = 2u32.saturating_pow(retry - 1);
        self.base_delay.saturating_mul(factor)
    }

    /// Runs `operation`, retrying transient errors until the budget is spent.
    ///
    /// Non-transient errors and the last transient error are returned as-is.
    pub async fn execute<F, Fut, T>(
        &self,
        dependency: Dependency,
        operation_name: &'static str,
        mut operation: F,
    ) -> Result<T, DownstreamError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, DownstreamError>>,
    {
        let mut retry = 0;
        loop {
            match operation().await {
                Ok(value) => {
                    if retry > 0 {
                        debug!(%dependency, operation = operation_name, retry, "downstream call recovered");
                    }
                    return Ok(value);
                }
                Err(err) if err.is_transient() && retry < self.max_retries => {
                    retry += 1;
                    let delay = self.delay_for(retry);
                    warn!(
                        %dependency,
                        operation = operation_name,
                        retry,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "retrying downstream call"
                    );
                    metrics::counter!(
                        "downstream_retries_total",
                        "dependency" => dependency.as_str()
                    )
                    .increment(1);
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
