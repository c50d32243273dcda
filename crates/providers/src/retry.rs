//! The completion gateway — a retrying wrapper around one provider.
//!
//! Transient provider failures (rate limiting, timeouts, network blips,
//! interrupted streams, 5xx responses) are retried with bounded
//! exponential backoff. Non-transient failures (authentication, malformed
//! requests) propagate immediately. Exhausting the attempt cap is fatal
//! to the call and surfaces at the loop boundary.

use async_trait::async_trait;
use codecrew_core::error::ProviderError;
use codecrew_core::provider::{Provider, ProviderRequest, ProviderResponse, StreamChunk};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Bounded exponential backoff parameters.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first (cap).
    pub max_attempts: u32,
    /// Delay multiplier between consecutive attempts.
    pub multiplier: f64,
    /// Delay before the first retry.
    pub min_delay: Duration,
    /// Ceiling on any single delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            multiplier: 2.0,
            min_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// The delay to sleep before retry number `retry` (1-based).
    fn delay_for(&self, retry: u32) -> Duration {
        let factor = self.multiplier.powi(retry.saturating_sub(1) as i32);
        let delay = self.min_delay.mul_f64(factor);
        delay.min(self.max_delay)
    }
}

/// A provider that retries transient failures of an inner provider.
pub struct RetryProvider {
    inner: Arc<dyn Provider>,
    policy: RetryPolicy,
}

impl RetryProvider {
    pub fn new(inner: Arc<dyn Provider>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    /// Wrap with the default policy (3 attempts, 2–10 s window).
    pub fn with_defaults(inner: Arc<dyn Provider>) -> Self {
        Self::new(inner, RetryPolicy::default())
    }

    async fn backoff(&self, attempt: u32, error: &ProviderError) {
        let delay = self.policy.delay_for(attempt);
        warn!(
            provider = self.inner.name(),
            attempt,
            delay_secs = delay.as_secs_f64(),
            error = %error,
            "Transient provider failure, retrying after backoff"
        );
        tokio::time::sleep(delay).await;
    }
}

#[async_trait]
impl Provider for RetryProvider {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn complete(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<ProviderResponse, ProviderError> {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.inner.complete(request.clone()).await {
                Ok(response) => return Ok(response),
                Err(e) if e.is_transient() && attempt < self.policy.max_attempts => {
                    self.backoff(attempt, &e).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn stream(
        &self,
        request: ProviderRequest,
    ) -> std::result::Result<
        tokio::sync::mpsc::Receiver<std::result::Result<StreamChunk, ProviderError>>,
        ProviderError,
    > {
        // Retry covers stream *establishment*; once chunks are flowing an
        // interruption surfaces as a StreamInterrupted chunk to the reader.
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match self.inner.stream(request.clone()).await {
                Ok(rx) => return Ok(rx),
                Err(e) if e.is_transient() && attempt < self.policy.max_attempts => {
                    self.backoff(attempt, &e).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
