//! Rate-limited HTTP transport
//!
//! Sends one prepared request and retries it while the failure is transient.
//!
//! # Retry strategy
//! - HTTP 429: wait for `Retry-After` (capped by [`RetryPolicy::max_rate_limit_wait`]),
//!   or the computed backoff when the header is absent
//! - timeouts, connection failures and any 5xx: exponential backoff
//!   `base_delay * 2^attempt`, capped by [`RetryPolicy::max_delay`]
//! - everything else is handed back to the caller untouched, on the first attempt
//!
//! The loop is bounded twice: by [`RetryPolicy::max_retries`] and by the total
//! time spent sleeping ([`RetryPolicy::max_total_backoff`]). When either budget
//! runs out the last transient error is wrapped in [`ClientError::RetriesExhausted`].

use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder};
use reqwest::header::{HeaderMap, RETRY_AFTER};
use std::time::Duration;

use crate::error::{ClientError, Result};
use crate::utils::log_sanitizer::truncate_for_log;

/// 默认连接超时（秒）
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
/// 默认请求超时（秒）
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// 创建带超时配置的 HTTP Client
pub fn create_http_client() -> Result<Client> {
    Client::builder()
        .connect_timeout(Duration::from_secs(DEFAULT_CONNECT_TIMEOUT_SECS))
        .timeout(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
        .build()
        .map_err(|e| ClientError::NetworkError {
            detail: format!("Failed to create HTTP client: {e}"),
        })
}

/// Retry and backoff limits applied to every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of retries after the first attempt (0 disables retrying).
    pub max_retries: u32,
    /// Delay before the first retry; doubled on every further attempt.
    pub base_delay: Duration,
    /// Upper bound for a single computed backoff delay.
    pub max_delay: Duration,
    /// Upper bound for a single server-requested `Retry-After` wait.
    pub max_rate_limit_wait: Duration,
    /// Upper bound for the sum of all sleeps spent on one request.
    pub max_total_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            max_rate_limit_wait: Duration::from_secs(60),
            max_total_backoff: Duration::from_secs(300),
        }
    }
}

impl RetryPolicy {
    /// Exponential backoff for the given zero-based retry attempt.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let capped_attempt = attempt.min(20); // Prevent 2^attempt from overflowing
        let delay = self
            .base_delay
            .saturating_mul(1_u32 << capped_attempt);
        delay.min(self.max_delay)
    }

    /// Delay before retrying after `error`.
    ///
    /// A server-provided `Retry-After` wins over the computed backoff.
    fn delay_for(&self, error: &ClientError, attempt: u32) -> Duration {
        if let ClientError::RateLimited {
            retry_after: Some(secs),
            ..
        } = error
        {
            Duration::from_secs(*secs).min(self.max_rate_limit_wait)
        } else {
            self.backoff_delay(attempt)
        }
    }
}

/// Outcome of feeding one failure into [`RetryState`].
#[derive(Debug, Clone, PartialEq, Eq)]
enum RetryDecision {
    /// Sleep for the given duration, then resend the same request.
    Retry(Duration),
    /// Surface the error.
    GiveUp,
}

/// Bounded retry bookkeeping for a single logical request.
#[derive(Debug, Default)]
struct RetryState {
    /// Retries already scheduled.
    retries: u32,
    /// Sum of all delays already scheduled.
    total_backoff: Duration,
}

impl RetryState {
    fn next(&mut self, policy: &RetryPolicy, error: &ClientError) -> RetryDecision {
        if !error.is_transient() || self.retries >= policy.max_retries {
            return RetryDecision::GiveUp;
        }

        let delay = policy.delay_for(error, self.retries);
        let total = self.total_backoff.saturating_add(delay);
        if total > policy.max_total_backoff {
            return RetryDecision::GiveUp;
        }

        self.retries += 1;
        self.total_backoff = total;
        RetryDecision::Retry(delay)
    }

    fn attempts(&self) -> u32 {
        self.retries + 1
    }
}

/// HTTP tool function set
pub struct HttpUtils;

impl HttpUtils {
    /// Performs one HTTP request and returns the status code and response text.
    ///
    /// 429 and 5xx responses are turned into transient errors here so the retry
    /// loop sees them; every other status is returned to the caller as-is.
    pub async fn execute_request(
        request_builder: RequestBuilder,
        method_name: &str,
        url: &str,
    ) -> Result<(u16, String)> {
        log::debug!("{method_name} {url}");

        let response = request_builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ClientError::Timeout {
                    detail: e.to_string(),
                }
            } else {
                ClientError::NetworkError {
                    detail: e.to_string(),
                }
            }
        })?;

        let status_code = response.status().as_u16();
        log::debug!("Response Status: {status_code}");

        // Read Retry-After before the body consumes the response
        let retry_after = parse_retry_after(response.headers(), Utc::now());

        if status_code == 429 {
            let body = response.text().await.unwrap_or_default();
            log::warn!("Rate limited (HTTP 429), retry_after={retry_after:?}");
            return Err(ClientError::RateLimited {
                retry_after,
                raw_message: Some(body),
            });
        }

        if (500..=599).contains(&status_code) {
            let body = response.text().await.unwrap_or_default();
            log::warn!("Server error (HTTP {status_code})");
            return Err(ClientError::ServerError {
                status: status_code,
                raw_message: body,
            });
        }

        let response_text = response
            .text()
            .await
            .map_err(|e| ClientError::NetworkError {
                detail: format!("Failed to read response body: {e}"),
            })?;

        log::debug!("Response Body: {}", truncate_for_log(&response_text));

        Ok((status_code, response_text))
    }

    /// Performs an HTTP request, retrying transient failures according to `policy`.
    ///
    /// Every retry resends an identical clone of `request_builder`.
    ///
    /// # Returns
    /// * `Ok((status_code, response_text))` - any non-429, non-5xx response
    /// * `Err(ClientError::RetriesExhausted)` - transient failures outlasted the policy
    /// * `Err(_)` - a non-transient transport error, returned on first sight
    pub async fn execute_request_with_retry(
        request_builder: RequestBuilder,
        method_name: &str,
        url: &str,
        policy: &RetryPolicy,
    ) -> Result<(u16, String)> {
        let mut state = RetryState::default();

        loop {
            // RequestBuilder can only be sent once
            let Some(req) = request_builder.try_clone() else {
                log::warn!("Cannot clone request, disabling retry");
                return Self::execute_request(request_builder, method_name, url).await;
            };

            let error = match Self::execute_request(req, method_name, url).await {
                Ok(resp) => return Ok(resp),
                Err(e) => e,
            };

            match state.next(policy, &error) {
                RetryDecision::Retry(delay) => {
                    log::warn!(
                        "Request failed (attempt {}/{}), retrying in {:.1}s: {}",
                        state.attempts() - 1,
                        policy.max_retries + 1,
                        delay.as_secs_f32(),
                        error
                    );
                    tokio::time::sleep(delay).await;
                }
                RetryDecision::GiveUp if error.is_transient() => {
                    log::error!(
                        "Giving up on {method_name} {url} after {} attempts: {error}",
                        state.attempts()
                    );
                    return Err(ClientError::RetriesExhausted {
                        attempts: state.attempts(),
                        last_error: Box::new(error),
                    });
                }
                RetryDecision::GiveUp => return Err(error),
            }
        }
    }
}

/// Reads `Retry-After` as delta-seconds or as an HTTP date relative to `now`.
fn parse_retry_after(headers: &HeaderMap, now: DateTime<Utc>) -> Option<u64> {
    let value = headers.get(RETRY_AFTER)?.to_str().ok()?.trim();

    if let Ok(secs) = value.parse::<u64>() {
        return Some(secs);
    }

    let at = DateTime::parse_from_rfc2822(value).ok()?;
    let secs = (at.with_timezone(&Utc) - now).num_seconds();
    Some(u64::try_from(secs).unwrap_or(0))
}
