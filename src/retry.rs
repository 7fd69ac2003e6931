//! Transparent retries for transient server errors

use std::thread;
use std::time::Duration;

use tracing::warn;

use crate::error::FetchError;
use crate::transport::{HttpResponse, Transport};

/// Which responses are retried and how long to wait between attempts
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Seconds multiplied by `2^(n-1)` before the n-th consecutive retry
    pub backoff_factor: f64,
    pub backoff_max: Duration,
    pub status_forcelist: Vec<u16>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_factor: 1.0,
            backoff_max: Duration::from_secs(120),
            status_forcelist: vec![500, 502, 503, 504],
        }
    }
}

impl RetryPolicy {
    pub fn should_retry(&self, status: u16) -> bool {
        self.status_forcelist.contains(&status)
    }

    /// Wait before the `retry`-th consecutive retry (1-based); the first is immediate
    pub fn backoff(&self, retry: u32) -> Duration {
        if retry <= 1 {
            return Duration::ZERO;
        }
        let exponent = i32::try_from(retry - 1).unwrap_or(i32::MAX);
        let secs = self.backoff_factor.max(0.0) * 2f64.powi(exponent);
        Duration::from_secs_f64(secs.min(self.backoff_max.as_secs_f64()))
    }
}

/// Wraps a transport and retries responses whose status is in the policy's forcelist
///
/// Callers only see the final response. When the budget runs out the last
/// server error response is returned as-is.
pub struct RetryTransport<T> {
    inner: T,
    policy: RetryPolicy,
}

impl<T: Transport> RetryTransport<T> {
    pub fn new(inner: T, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: Transport> Transport for RetryTransport<T> {
    fn get(&self, url: &str) -> Result<HttpResponse, FetchError> {
        let mut retries = 0;

        loop {
            let response = self.inner.get(url)?;

            if !self.policy.should_retry(response.status) {
                return Ok(response);
            }
            if retries >= self.policy.max_retries {
                warn!(url, status = response.status, retries, "Retry budget exhausted");
                return Ok(response);
            }

            retries += 1;
            let delay = self.policy.backoff(retries);
            warn!(
                url,
                status = response.status,
                attempt = retries,
                max_retries = self.policy.max_retries,
                delay_ms = delay.as_millis() as u64,
                "Server error, retrying"
            );
            if !delay.is_zero() {
                thread::sleep(delay);
            }
        }
    }
}
