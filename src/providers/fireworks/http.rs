//! HTTP client for the Fireworks completions API
//!
//! Wraps `reqwest` with authentication headers, status-code mapping, retry
//! with backoff and an optional client-side rate limit.

use super::types::{ApiErrorEnvelope, CompletionRequest, CompletionResponse};
use crate::error::{LlmError, LlmResult};
use crate::logging::{log_debug, log_error};
use crate::retry::{RetryExecutor, RetryPolicy};

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use std::num::NonZeroU32;
use std::time::Duration;

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_RETRY_AFTER_SECONDS: u64 = 60;

/// Shared HTTP client for completion and streaming requests
#[derive(Debug)]
pub struct FireworksHttpClient {
    client: reqwest::Client,
    retry_executor: RetryExecutor,
    rate_limiter: Option<DirectRateLimiter>,
}

impl FireworksHttpClient {
    /// Create a client with the given retry policy and optional request budget
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::ConfigurationError`] if the underlying HTTP client
    /// cannot be built (e.g. TLS backend initialization fails).
    pub fn new(retry_policy: RetryPolicy, requests_per_minute: Option<u32>) -> LlmResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| LlmError::configuration_error(format!("Failed to build HTTP client: {e}")))?;

        let rate_limiter = requests_per_minute
            .and_then(NonZeroU32::new)
            .map(|n| RateLimiter::direct(Quota::per_minute(n)));

        Ok(Self {
            client,
            retry_executor: RetryExecutor::new(retry_policy),
            rate_limiter,
        })
    }

    pub fn retry_executor(&self) -> &RetryExecutor {
        &self.retry_executor
    }

    /// Build the bearer authentication headers
    pub fn build_auth_headers(api_key: &str) -> LlmResult<HeaderMap> {
        let mut headers = HeaderMap::new();

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|e| {
                LlmError::configuration_error(format!("Invalid API key format: {e}"))
            })?,
        );

        Ok(headers)
    }

    /// Execute a completion request with retry logic
    pub async fn execute_completion(
        &self,
        url: &str,
        headers: &HeaderMap,
        request: &CompletionRequest,
    ) -> LlmResult<CompletionResponse> {
        self.retry_executor
            .execute(move || async move {
                let response = self.send(url, headers, request).await?;
                parse_success_response(response).await
            })
            .await
    }

    /// Open a streamed completion, retrying until the server accepts it
    ///
    /// Only establishing the stream is retried; the returned response body
    /// is consumed by the caller.
    pub async fn open_stream(
        &self,
        url: &str,
        headers: &HeaderMap,
        request: &CompletionRequest,
    ) -> LlmResult<reqwest::Response> {
        let mut stream_headers = headers.clone();
        stream_headers.insert(ACCEPT, HeaderValue::from_static("text/event-stream"));
        let stream_headers = &stream_headers;

        self.retry_executor
            .execute(move || self.send(url, stream_headers, request))
            .await
    }

    /// Send one request and map non-success statuses to errors
    async fn send(
        &self,
        url: &str,
        headers: &HeaderMap,
        request: &CompletionRequest,
    ) -> LlmResult<reqwest::Response> {
        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }

        log_debug!(
            url = %url,
            model = %request.model,
            stream = request.stream.unwrap_or(false),
            "Sending completion request"
        );

        let response = self
            .client
            .post(url)
            .headers(headers.clone())
            .json(request)
            .send()
            .await
            .map_err(|e| {
                log_error!(
                    url = %url,
                    error = %e,
                    "HTTP request failed"
                );
                LlmError::request_failed(format!("Request failed: {e}"), Some(Box::new(e)))
            })?;

        if !response.status().is_success() {
            return Err(handle_error_response(response).await);
        }

        Ok(response)
    }
}

/// Handle non-success HTTP responses
async fn handle_error_response(response: reqwest::Response) -> LlmError {
    let status = response.status();
    let headers = response.headers().clone();
    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());

    log_error!(
        status = %status,
        error_text = %error_text,
        "API error response"
    );

    let detail = serde_json::from_str::<ApiErrorEnvelope>(&error_text)
        .map(|envelope| envelope.error.describe())
        .unwrap_or(error_text);

    match status.as_u16() {
        401 | 403 => LlmError::authentication_failed(detail),
        429 => {
            let retry_after_seconds = headers
                .get("retry-after")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.trim().parse::<u64>().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECONDS);

            LlmError::rate_limit_exceeded(retry_after_seconds)
        }
        _ => LlmError::request_failed(format!("API error {status}: {detail}"), None),
    }
}

/// Parse successful HTTP response into a `CompletionResponse`
async fn parse_success_response(response: reqwest::Response) -> LlmResult<CompletionResponse> {
    let raw_body = response.text().await.map_err(|e| {
        log_error!(
            error = %e,
            "Failed to read response body"
        );
        LlmError::response_parsing_error(format!("Failed to read response: {e}"))
    })?;

    serde_json::from_str(&raw_body).map_err(|e| {
        log_error!(
            error = %e,
            raw_body = %raw_body,
            "Failed to parse response"
        );
        LlmError::response_parsing_error(format!("Invalid response: {e}"))
    })
}
