//! Webhook delivery with exponential-backoff retry.
//!
//! [`WebhookDelivery`] POSTs a JSON body to an external URL. Any 2xx
//! response is a success. Failed attempts are retried per the configured
//! [`RetryPolicy`]; the default is three retries at 1 s, 2 s and 4 s.

use std::time::Duration;

use serde::Serialize;

/// Default HTTP request timeout for a single delivery attempt.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for webhook delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    /// The underlying HTTP request failed (network, DNS, timeout, etc.).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The remote server returned a non-2xx status code.
    #[error("Webhook returned HTTP {0}")]
    HttpStatus(u16),
}

// ---------------------------------------------------------------------------
// RetryPolicy
// ---------------------------------------------------------------------------

/// Backoff delays between attempts. One attempt is made up front plus one
/// per delay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    delays: Vec<Duration>,
}

impl RetryPolicy {
    /// `max_retries` retries with delays of 1 s, 2 s, 4 s, ...
    pub fn exponential(max_retries: u32) -> Self {
        let delays = (0..max_retries)
            .map(|i| Duration::from_secs(1u64 << i.min(16)))
            .collect();
        Self { delays }
    }

    /// Explicit delays, mainly for tests.
    pub fn with_delays(delays: Vec<Duration>) -> Self {
        Self { delays }
    }

    /// A single attempt, no retries.
    pub fn none() -> Self {
        Self { delays: Vec::new() }
    }

    pub fn delays(&self) -> &[Duration] {
        &self.delays
    }

    /// Total number of attempts including the first.
    pub fn max_attempts(&self) -> usize {
        self.delays.len() + 1
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::exponential(DEFAULT_MAX_RETRIES)
    }
}

// ---------------------------------------------------------------------------
// WebhookDelivery
// ---------------------------------------------------------------------------

/// Delivers JSON notifications to external webhook endpoints.
#[derive(Debug, Clone)]
pub struct WebhookDelivery {
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl WebhookDelivery {
    /// Build a delivery service whose HTTP client times out each request
    /// after `request_timeout`.
    pub fn try_new(request_timeout: Duration) -> Result<Self, WebhookError> {
        let client = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;
        Ok(Self {
            client,
            retry: RetryPolicy::default(),
        })
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Deliver `payload` to `url`, retrying with backoff.
    ///
    /// Returns `Ok(())` on the first successful attempt, or the error of the
    /// last attempt once the policy is exhausted.
    pub async fn deliver<T>(&self, url: &str, payload: &T) -> Result<(), WebhookError>
    where
        T: Serialize + Sync + ?Sized,
    {
        for (attempt, delay) in self.retry.delays().iter().enumerate() {
            match self.try_send(url, payload).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    tracing::warn!(
                        attempt = attempt + 1,
                        url,
                        error = %e,
                        "Webhook delivery attempt failed, retrying"
                    );
                    tokio::time::sleep(*delay).await;
                }
            }
        }

        // Final attempt after the last backoff.
        self.try_send(url, payload).await.map_err(|e| {
            tracing::error!(
                url,
                attempts = self.retry.max_attempts(),
                error = %e,
                "Webhook delivery failed after all retries"
            );
            e
        })
    }

    /// Execute a single POST request and check the response status.
    async fn try_send<T>(&self, url: &str, payload: &T) -> Result<(), WebhookError>
    where
        T: Serialize + Sync + ?Sized,
    {
        let response = self.client.post(url).json(payload).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(WebhookError::HttpStatus(status.as_u16()));
        }
        tracing::debug!(url, status = status.as_u16(), "Webhook delivered");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn try_new_builds_client() {
        let delivery = WebhookDelivery::try_new(DEFAULT_REQUEST_TIMEOUT).unwrap();
        assert_eq!(delivery.retry_policy().max_attempts(), 4);
    }

    #[test]
    fn exponential_policy_doubles() {
        let policy = RetryPolicy::exponential(3);
        assert_eq!(
            policy.delays(),
            &[
                Duration::from_secs(1),
                Duration::from_secs(2),
                Duration::from_secs(4)
            ]
        );
        assert_eq!(RetryPolicy::exponential(0), RetryPolicy::none());
        assert_eq!(RetryPolicy::none().max_attempts(), 1);
    }

    #[test]
    fn webhook_error_display_http_status() {
        let err = WebhookError::HttpStatus(502);
        assert_eq!(err.to_string(), "Webhook returned HTTP 502");
    }

    #[test]
    fn webhook_error_display_request() {
        // Build a reqwest error from an invalid URL.
        let req_err = reqwest::Client::new().get("://bad").build().unwrap_err();
        let err = WebhookError::Request(req_err);
        assert!(err.to_string().contains("HTTP request failed"));
    }
}
