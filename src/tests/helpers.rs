// Shared fixtures for unit tests

use crate::config::FireworksConfig;
use crate::prompts::{ChatPromptTemplate, MessagePromptTemplate, PromptTemplate};
use crate::retry::RetryPolicy;
use std::time::Duration;

pub const COMPANY_NAME_TEMPLATE: &str = "What is a good name for a company that makes {product}?";

/// Configuration that passes validation without touching the environment
pub fn create_test_config() -> FireworksConfig {
    FireworksConfig::default()
        .with_api_key("fw-test-key")
        .with_retry_policy(create_fast_test_retry_policy())
}

/// Retry policy with millisecond delays to keep tests fast
pub fn create_fast_test_retry_policy() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        initial_delay: Duration::from_millis(10),
        max_delay: Duration::from_millis(50),
        backoff_multiplier: 2.0,
        total_timeout: Duration::from_millis(500),
        request_timeout: Duration::from_millis(100),
    }
}

/// The company-name prompt wrapped as a single human message
pub fn create_company_name_prompt() -> ChatPromptTemplate {
    let human = PromptTemplate::from_template(COMPANY_NAME_TEMPLATE)
        .expect("company name template should parse");
    ChatPromptTemplate::from_messages([MessagePromptTemplate::human(human)])
}
