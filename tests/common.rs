//! Test helper utilities for fireworks-llm tests
//!
//! This module provides reusable fixtures for the MockServer-backed
//! integration tests: configurations pointing at the mock, canned completion
//! bodies and SSE stream bodies.
//!
//! IMPORTANT: These helpers are test-only and should NEVER be used in production code.

// Allow dead code in test utilities - functions are used across different test files
#![allow(dead_code)]

use fireworks_llm::{FireworksConfig, RetryPolicy};
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_API_KEY: &str = "fw-test-key";
pub const COMPLETIONS_PATH: &str = "/inference/v1/completions";

pub const WEATHER_PROMPT: &str = "How is the weather in New York today?";
pub const PICKLE_PROMPT: &str = "I'm pickle rick";
pub const COMPANY_NAME_TEMPLATE: &str = "What is a good name for a company that makes {product}?";

/// Create test retry policy with fast timeouts for testing
pub fn create_test_retry_policy() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        initial_delay: Duration::from_millis(10),
        max_delay: Duration::from_millis(100),
        backoff_multiplier: 2.0,
        total_timeout: Duration::from_secs(5),
        request_timeout: Duration::from_secs(2),
    }
}

/// Create test retry policy with no retries (for deterministic testing)
pub fn create_no_retry_policy() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 1,
        initial_delay: Duration::from_millis(0),
        max_delay: Duration::from_millis(0),
        backoff_multiplier: 1.0,
        total_timeout: Duration::from_secs(2),
        request_timeout: Duration::from_secs(2),
    }
}

/// Configuration pointing at a MockServer
pub fn create_mock_config(base_url: &str) -> FireworksConfig {
    FireworksConfig::default()
        .with_api_key(TEST_API_KEY)
        .with_base_url(base_url)
        .with_retry_policy(create_test_retry_policy())
}

/// The stop list used by the stop-sequence scenarios
pub fn comma_stop() -> Vec<String> {
    vec![",".to_string()]
}

/// JSON body of a non-streamed completion with a single choice
pub fn completion_body(text: &str) -> Value {
    json!({
        "id": "cmpl-test",
        "object": "text_completion",
        "created": 1_700_000_000,
        "model": "accounts/fireworks/models/llama-v2-7b-chat",
        "choices": [{
            "index": 0,
            "text": text,
            "finish_reason": "stop"
        }],
        "usage": {
            "prompt_tokens": 10,
            "completion_tokens": 5,
            "total_tokens": 15
        }
    })
}

pub fn completion_response(text: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(completion_body(text))
}

/// SSE body streaming `tokens` one event each, terminated by `[DONE]`
pub fn sse_body(tokens: &[&str]) -> String {
    let mut body = String::new();
    for token in tokens {
        let event = json!({
            "id": "cmpl-test",
            "object": "text_completion",
            "model": "accounts/fireworks/models/llama-v2-7b-chat",
            "choices": [{ "index": 0, "text": token, "finish_reason": null }]
        });
        body.push_str(&format!("data: {event}\n\n"));
    }
    body.push_str("data: [DONE]\n\n");
    body
}

pub fn sse_response(tokens: &[&str]) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(sse_body(tokens), "text/event-stream")
}

/// Start a MockServer from synchronous code and mount `mocks` on it
///
/// The server runs on its own thread, so the caller's thread stays outside
/// any async runtime and can drive the blocking client.
pub fn start_mock_server_blocking(
    runtime: &tokio::runtime::Runtime,
    mocks: Vec<Mock>,
) -> MockServer {
    runtime.block_on(async {
        let server = MockServer::start().await;
        for mock in mocks {
            mock.mount(&server).await;
        }
        server
    })
}

pub fn create_helper_runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Runtime::new().expect("Failed to build helper runtime")
}
