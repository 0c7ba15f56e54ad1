//! Network transports: a blocking `ureq` transport and a retrying wrapper.
//!
//! # Design
//! `RetryingTransport` retries only failures where no response was received
//! (connect errors, timeouts, socket I/O). A received response, whatever its
//! status, ends the loop immediately. Between attempts the calling thread
//! sleeps for a fixed delay; no attempts run concurrently.
//!
//! Retrying `POST` requests can double-submit if a response was lost after
//! the server applied the request. The retry only fires before any response
//! arrives, which narrows but does not close that window.

use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, Transport};

/// Default total attempts per request (one try plus two retries).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
/// Default pause between attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(2000);
/// Default overall timeout for a single attempt.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Blocking transport backed by a shared `ureq::Agent`.
///
/// The agent is configured not to turn 4xx/5xx statuses into errors, so
/// every received response is handed back as data.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new(DEFAULT_TIMEOUT)
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        debug!(method = request.method.as_str(), url = %request.url, "sending request");

        let result = match request.method {
            HttpMethod::Get => {
                let mut builder = self.agent.get(&request.url);
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.call()
            }
            HttpMethod::Post => {
                let mut builder = self.agent.post(&request.url);
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                match &request.body {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
        };
        let mut response = result?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    value.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| TransportError::Body(e.to_string()))?;

        debug!(status, url = %request.url, "received response");
        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

/// Bounded, fixed-delay retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Values below 1 behave as 1.
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl RetryPolicy {
    /// Whether a failure on attempt number `attempt` (1-based) should be
    /// followed by another attempt.
    pub fn should_retry(&self, err: &TransportError, attempt: u32) -> bool {
        err.is_retryable() && attempt < self.max_attempts
    }
}

/// Wraps a transport and retries pre-response failures per `RetryPolicy`.
#[derive(Debug, Clone)]
pub struct RetryingTransport<T> {
    inner: T,
    policy: RetryPolicy,
}

impl<T: Transport> RetryingTransport<T> {
    pub fn new(inner: T, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}

impl<T: Transport> Transport for RetryingTransport<T> {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut attempt = 1;
        loop {
            match self.inner.execute(request) {
                Ok(response) => return Ok(response),
                Err(err) if self.policy.should_retry(&err, attempt) => {
                    warn!(
                        attempt,
                        max_attempts = self.policy.max_attempts,
                        delay_ms = self.policy.delay.as_millis() as u64,
                        url = %request.url,
                        error = %err,
                        "transport failure, retrying"
                    );
                    thread::sleep(self.policy.delay);
                    attempt += 1;
                }
                Err(err) => {
                    if err.is_retryable() {
                        warn!(attempt, url = %request.url, error = %err, "giving up after retries");
                    }
                    return Err(err);
                }
            }
        }
    }
}
