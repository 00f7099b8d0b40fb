//! HTTP retry helpers for transient errors.
//!
//! Dataset fetchers go through [`send_json`] instead of calling
//! `reqwest::RequestBuilder::send()` directly, so every page request gets
//! exponential backoff on timeouts, connection resets, HTTP 429 and 5xx.
//!
//! Retrying happens here, at the transport level only. The ingest pipeline
//! never retries a failed dataset on its own.

use std::time::Duration;

use reqwest::StatusCode;

use crate::SourceError;

/// Maximum length of the response body preview included in error logs.
const BODY_PREVIEW_LEN: usize = 500;

/// How many times, and how patiently, to retry a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Connection-level retries (timeouts, resets, 429, 5xx).
    pub max_retries: u32,
    /// Full re-fetches when the body arrives but cannot be decoded.
    pub max_body_retries: u32,
    /// Delay before the first retry; doubled on each further attempt.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    /// Five retries at 2s, 4s, 8s, 16s, 32s: 62 seconds of waiting in total
    /// before giving up on a page.
    fn default() -> Self {
        Self {
            max_retries: 5,
            max_body_retries: 3,
            base_delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (1-based).
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(1 << exponent)
    }
}

/// What to do with a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StatusAction {
    Accept,
    Retry,
    Fail,
}

fn classify_status(status: StatusCode) -> StatusAction {
    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        StatusAction::Retry
    } else if status.is_client_error() {
        StatusAction::Fail
    } else {
        StatusAction::Accept
    }
}

/// Returns `true` if the error is likely transient and worth retrying.
fn is_transient(e: &reqwest::Error) -> bool {
    e.is_timeout() || e.is_connect() || e.is_body() || e.is_decode() || e.is_request()
}

/// Sends an HTTP request and parses the response body as JSON.
///
/// `build_request` is called once per attempt because request builders are
/// consumed by `.send()`.
///
/// # Errors
///
/// Returns [`SourceError`] if the request still fails after the policy's
/// retries, the server answers with a non-retryable status, or the body
/// cannot be decoded after all body retries.
#[allow(clippy::future_not_send)]
pub async fn send_json<F>(
    policy: &RetryPolicy,
    build_request: F,
) -> Result<serde_json::Value, SourceError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let mut body_attempt = 0;

    loop {
        let response = send_inner(policy, &build_request).await?;
        let url = response.url().to_string();
        let status = response.status();

        let failure = match response.text().await {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(value) => return Ok(value),
                Err(json_err) => {
                    let preview: String = text.chars().take(BODY_PREVIEW_LEN).collect();
                    log::warn!(
                        "JSON parse failed for {url} (status {status}, {} bytes): {json_err}\n  \
                         body preview: {preview}",
                        text.len()
                    );
                    SourceError::Json(json_err)
                }
            },
            Err(e) => {
                log::warn!("Response body read failed for {url} (status {status}): {e}");
                SourceError::Http(e)
            }
        };

        if body_attempt >= policy.max_body_retries {
            log::error!("Giving up on {url} after {body_attempt} body retries");
            return Err(failure);
        }
        body_attempt += 1;
        let delay = policy.backoff(body_attempt);
        log::warn!(
            "Re-fetching {url} (body retry {body_attempt}/{}) in {delay:?}",
            policy.max_body_retries
        );
        tokio::time::sleep(delay).await;
    }
}

/// Connection-level retry loop. Returns the first accepted response.
#[allow(clippy::future_not_send)]
async fn send_inner<F>(
    policy: &RetryPolicy,
    build_request: &F,
) -> Result<reqwest::Response, SourceError>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let mut attempt = 0;

    loop {
        let retryable = match build_request().send().await {
            Err(e) if is_transient(&e) => {
                log::warn!("  transient error: {e}");
                SourceError::Http(e)
            }
            Err(e) => return Err(SourceError::Http(e)),
            Ok(response) => {
                let status = response.status();
                match classify_status(status) {
                    StatusAction::Accept => return Ok(response),
                    StatusAction::Fail => {
                        return Err(SourceError::HttpStatus {
                            status: status.as_u16(),
                            url: response.url().to_string(),
                        });
                    }
                    StatusAction::Retry => {
                        log::warn!("  HTTP {status} from {}", response.url());
                        SourceError::HttpStatus {
                            status: status.as_u16(),
                            url: response.url().to_string(),
                        }
                    }
                }
            }
        };

        if attempt >= policy.max_retries {
            return Err(retryable);
        }
        attempt += 1;
        let delay = policy.backoff(attempt);
        log::warn!("  retry {attempt}/{} in {delay:?}...", policy.max_retries);
        tokio::time::sleep(delay).await;
    }
}
