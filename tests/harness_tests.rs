//! Integration Tests for the Fireworks Call Patterns
//!
//! UNIT UNDER TEST: Fireworks (async) and blocking::Fireworks
//!
//! BUSINESS RESPONSIBILITY:
//!   - Complete single prompts, batches and multi-prompt generations
//!   - Apply stop sequences so outputs end at the stop string
//!   - Stream completions token by token, synchronously and asynchronously
//!   - Run prompt templates through a chain
//!   - Report the configured model
//!
//! TEST COVERAGE:
//!   - call, chain run, model override and invoke with stop (sync and async)
//!   - batch of 5 prompts, sync and async
//!   - generate with 2 prompts, sync and async; agenerate with 1 prompt
//!   - stream without stop, stream with stop, async stream with stop
//!
//! All scenarios run against a MockServer that answers the way the hosted
//! API does when given the stop list `[","]`. The same scenarios against the
//! live API are in live_fireworks_tests.rs.

mod common;

use common::{
    comma_stop, completion_response, create_helper_runtime, create_mock_config, sse_response,
    start_mock_server_blocking, COMPANY_NAME_TEMPLATE, COMPLETIONS_PATH, PICKLE_PROMPT,
    TEST_API_KEY, WEATHER_PROMPT,
};
use fireworks_llm::blocking;
use fireworks_llm::prompts::{ChatPromptTemplate, MessagePromptTemplate, PromptTemplate};
use fireworks_llm::{Fireworks, Llm};
use futures_util::StreamExt;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer};

// ============================================================================
// Helper Functions
// ============================================================================

fn completion_mock(text: &str) -> Mock {
    Mock::given(method("POST"))
        .and(path(COMPLETIONS_PATH))
        .and(header("authorization", format!("Bearer {TEST_API_KEY}").as_str()))
        .respond_with(completion_response(text))
}

fn stop_completion_mock(text: &str) -> Mock {
    Mock::given(method("POST"))
        .and(path(COMPLETIONS_PATH))
        .and(body_partial_json(json!({ "stop": [","] })))
        .respond_with(completion_response(text))
}

fn prompt_completion_mock(prompt: &str, text: &str) -> Mock {
    Mock::given(method("POST"))
        .and(path(COMPLETIONS_PATH))
        .and(body_partial_json(json!({ "prompt": prompt })))
        .respond_with(completion_response(text))
}

fn stream_mock(tokens: &[&str]) -> Mock {
    Mock::given(method("POST"))
        .and(path(COMPLETIONS_PATH))
        .and(body_partial_json(json!({ "stream": true })))
        .respond_with(sse_response(tokens))
}

fn stop_stream_mock(tokens: &[&str]) -> Mock {
    Mock::given(method("POST"))
        .and(path(COMPLETIONS_PATH))
        .and(body_partial_json(json!({ "stream": true, "stop": [","] })))
        .respond_with(sse_response(tokens))
}

fn company_name_prompt() -> ChatPromptTemplate {
    let human =
        PromptTemplate::from_template(COMPANY_NAME_TEMPLATE).expect("template should parse");
    ChatPromptTemplate::from_messages([MessagePromptTemplate::human(human)])
}

fn create_async_llm(mock_server: &MockServer) -> Fireworks {
    Fireworks::new(create_mock_config(&mock_server.uri())).expect("Failed to create client")
}

fn create_blocking_llm(mock_server: &MockServer) -> blocking::Fireworks {
    blocking::Fireworks::new(create_mock_config(&mock_server.uri()))
        .expect("Failed to create blocking client")
}

// ============================================================================
// Single Prompt Tests
// ============================================================================

#[test]
fn test_fireworks_call() {
    // Test verifies a plain synchronous call returns the completion text

    // Arrange
    let runtime = create_helper_runtime();
    let mock_server =
        start_mock_server_blocking(&runtime, vec![completion_mock(" foo").expect(1)]);
    let llm = create_blocking_llm(&mock_server);

    // Act
    let output = llm.call("Say foo:").expect("call should succeed");

    // Assert
    assert_eq!(output, " foo");
}

#[test]
fn test_fireworks_in_chain() {
    // Test verifies a chat prompt template runs through a blocking chain
    // Ensures the rendered transcript is what reaches the API

    // Arrange
    let runtime = create_helper_runtime();
    let rendered = "Human: What is a good name for a company that makes football helmets?";
    let mock_server = start_mock_server_blocking(
        &runtime,
        vec![prompt_completion_mock(rendered, "\n\nHelmet Heroes").expect(1)],
    );
    let llm = create_blocking_llm(&mock_server);

    // Act
    let chain = llm.chain(company_name_prompt());
    let output = chain.run("football helmets").expect("chain should run");

    // Assert
    assert_eq!(output, "\n\nHelmet Heroes");
}

#[test]
fn test_fireworks_model_param() {
    // Test verifies the model override is reported by both surfaces

    // Arrange
    let config = create_mock_config("http://localhost:1").with_model("foo");

    // Act
    let async_llm = Fireworks::new(config.clone()).expect("Failed to create client");
    let blocking_llm = blocking::Fireworks::new(config).expect("Failed to create client");

    // Assert
    assert_eq!(async_llm.model(), "foo");
    assert_eq!(blocking_llm.model(), "foo");
}

#[test]
fn test_fireworks_invoke() {
    // Test verifies invoke forwards the stop list and returns text ending at it

    // Arrange
    let runtime = create_helper_runtime();
    let mock_server = start_mock_server_blocking(
        &runtime,
        vec![stop_completion_mock("It is sunny,").expect(1)],
    );
    let llm = create_blocking_llm(&mock_server);
    let stop = comma_stop();

    // Act
    let output = llm
        .invoke(WEATHER_PROMPT, Some(&stop))
        .expect("invoke should succeed");

    // Assert
    assert!(output.ends_with(','), "got: {output:?}");
}

#[tokio::test]
async fn test_fireworks_ainvoke() {
    // Arrange
    let mock_server = MockServer::start().await;
    stop_completion_mock("It is sunny,")
        .expect(1)
        .mount(&mock_server)
        .await;
    let llm = create_async_llm(&mock_server);
    let stop = comma_stop();

    // Act
    let output = llm
        .invoke(WEATHER_PROMPT, Some(&stop))
        .await
        .expect("invoke should succeed");

    // Assert
    assert!(output.ends_with(','), "got: {output:?}");
}

// ============================================================================
// Batch Tests
// ============================================================================

#[test]
fn test_fireworks_batch() {
    // Test verifies a batch of identical prompts yields one answer each

    // Arrange
    let runtime = create_helper_runtime();
    let mock_server = start_mock_server_blocking(
        &runtime,
        vec![stop_completion_mock("Cloudy,").expect(5)],
    );
    let llm = create_blocking_llm(&mock_server);
    let prompts = vec![WEATHER_PROMPT.to_string(); 5];
    let stop = comma_stop();

    // Act
    let output = llm
        .batch(&prompts, Some(&stop))
        .expect("batch should succeed");

    // Assert
    assert_eq!(output.len(), 5);
    for answer in &output {
        assert!(answer.ends_with(','), "got: {answer:?}");
    }
}

#[tokio::test]
async fn test_fireworks_abatch() {
    // Arrange
    let mock_server = MockServer::start().await;
    stop_completion_mock("Cloudy,")
        .expect(5)
        .mount(&mock_server)
        .await;
    let llm = create_async_llm(&mock_server);
    let prompts = vec![WEATHER_PROMPT.to_string(); 5];
    let stop = comma_stop();

    // Act
    let output = llm
        .batch(&prompts, Some(&stop))
        .await
        .expect("batch should succeed");

    // Assert
    assert_eq!(output.len(), 5);
    for answer in &output {
        assert!(answer.ends_with(','), "got: {answer:?}");
    }
}

// ============================================================================
// Generate Tests
// ============================================================================

#[test]
fn test_fireworks_multiple_prompts() {
    // Test verifies generate returns one generation list per prompt, in order

    // Arrange
    let runtime = create_helper_runtime();
    let mock_server = start_mock_server_blocking(
        &runtime,
        vec![
            prompt_completion_mock(WEATHER_PROMPT, "Rainy").expect(1),
            prompt_completion_mock(PICKLE_PROMPT, "Wubba lubba").expect(1),
        ],
    );
    let llm = create_blocking_llm(&mock_server);
    let prompts = vec![WEATHER_PROMPT.to_string(), PICKLE_PROMPT.to_string()];

    // Act
    let output = llm.generate(&prompts, None).expect("generate should succeed");

    // Assert
    assert_eq!(output.generations.len(), 2);
    assert_eq!(output.first_texts(), vec!["Rainy", "Wubba lubba"]);
}

#[tokio::test]
async fn test_fireworks_agenerate() {
    // Test verifies generate reports model and token usage for a single prompt

    // Arrange
    let mock_server = MockServer::start().await;
    completion_mock("Sunny").expect(1).mount(&mock_server).await;
    let llm = create_async_llm(&mock_server);

    // Act
    let output = llm
        .generate(&[WEATHER_PROMPT.to_string()], None)
        .await
        .expect("generate should succeed");

    // Assert
    assert_eq!(output.generations.len(), 1);
    assert_eq!(output.generations[0][0].text, "Sunny");
    let llm_output = output.llm_output.expect("llm_output should be set");
    assert_eq!(llm_output.model, llm.model());
    assert_eq!(llm_output.token_usage.map(|u| u.total_tokens), Some(15));
    assert_eq!(output.run.len(), 1);
}

#[tokio::test]
async fn test_fireworks_multiple_prompts_async_agenerate() {
    // Arrange
    let mock_server = MockServer::start().await;
    prompt_completion_mock(WEATHER_PROMPT, "Rainy")
        .expect(1)
        .mount(&mock_server)
        .await;
    prompt_completion_mock(PICKLE_PROMPT, "Wubba lubba")
        .expect(1)
        .mount(&mock_server)
        .await;
    let llm = create_async_llm(&mock_server);
    let prompts = vec![WEATHER_PROMPT.to_string(), PICKLE_PROMPT.to_string()];

    // Act
    let output = llm
        .generate(&prompts, None)
        .await
        .expect("generate should succeed");

    // Assert
    assert_eq!(output.generations.len(), 2);
    assert_eq!(output.first_texts(), vec!["Rainy", "Wubba lubba"]);
}

// ============================================================================
// Streaming Tests
// ============================================================================

#[test]
fn test_fireworks_streaming() {
    // Test verifies the blocking iterator yields every streamed token

    // Arrange
    let runtime = create_helper_runtime();
    let mock_server = start_mock_server_blocking(
        &runtime,
        vec![stream_mock(&["I", "'m", " Pickle", " Rick"]).expect(1)],
    );
    let llm = create_blocking_llm(&mock_server);

    // Act
    let tokens: Vec<String> = llm
        .stream(PICKLE_PROMPT, None)
        .expect("stream should open")
        .map(|token| token.expect("token should decode"))
        .collect();

    // Assert
    assert_eq!(tokens, vec!["I", "'m", " Pickle", " Rick"]);
}

#[test]
fn test_fireworks_streaming_stop_words() {
    // Test verifies the last streamed token ends with the stop string

    // Arrange
    let runtime = create_helper_runtime();
    let mock_server = start_mock_server_blocking(
        &runtime,
        vec![stop_stream_mock(&["It", " is", " sunny", ","]).expect(1)],
    );
    let llm = create_blocking_llm(&mock_server);
    let stop = comma_stop();

    // Act
    let mut last_token = String::new();
    for token in llm
        .stream(WEATHER_PROMPT, Some(&stop))
        .expect("stream should open")
    {
        last_token = token.expect("token should decode");
    }

    // Assert
    assert!(last_token.ends_with(','), "got: {last_token:?}");
}

#[test]
fn test_blocking_stream_returns_none_after_exhaustion() {
    // Test verifies the iterator can be advanced past its end without
    // panicking, as peekable and zip adapters do

    // Arrange
    let runtime = create_helper_runtime();
    let mock_server =
        start_mock_server_blocking(&runtime, vec![stream_mock(&["a", ","]).expect(1)]);
    let llm = create_blocking_llm(&mock_server);
    let mut tokens = llm.stream(PICKLE_PROMPT, None).expect("stream should open");

    // Act
    let first = tokens.next().map(|t| t.expect("token should decode"));
    let second = tokens.next().map(|t| t.expect("token should decode"));
    let end = tokens.next();
    let past_end = tokens.next();

    // Assert
    assert_eq!(first.as_deref(), Some("a"));
    assert_eq!(second.as_deref(), Some(","));
    assert!(end.is_none());
    assert!(past_end.is_none());
}

#[tokio::test]
async fn test_fireworks_streaming_async() {
    // Test verifies async iteration over a stream with a stop list

    // Arrange
    let mock_server = MockServer::start().await;
    stop_stream_mock(&["It", " is", " sunny", ","])
        .expect(1)
        .mount(&mock_server)
        .await;
    let llm = create_async_llm(&mock_server);
    let stop = comma_stop();

    // Act
    let mut stream = llm
        .stream(WEATHER_PROMPT, Some(&stop))
        .await
        .expect("stream should open");
    let mut last_token = String::new();
    while let Some(token) = stream.next().await {
        last_token = token.expect("token should decode");
    }

    // Assert
    assert!(last_token.ends_with(','), "got: {last_token:?}");
}
