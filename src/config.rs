//! Client configuration
//!
//! [`FireworksConfig`] carries everything needed to build a client. Start from
//! [`FireworksConfig::default()`] or [`FireworksConfig::from_env()`] and
//! override fields with the `with_*` setters:
//!
//! ```rust
//! use fireworks_llm::FireworksConfig;
//!
//! let config = FireworksConfig::default()
//!     .with_api_key("fw-test")
//!     .with_model("foo");
//! assert_eq!(config.model, "foo");
//! ```

use crate::error::{LlmError, LlmResult};
use crate::logging::log_debug;
use crate::retry::RetryPolicy;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://api.fireworks.ai";
pub const DEFAULT_MODEL: &str = "accounts/fireworks/models/llama-v2-7b-chat";

pub const API_KEY_ENV: &str = "FIREWORKS_API_KEY";
pub const BASE_URL_ENV: &str = "FIREWORKS_BASE_URL";
pub const MODEL_ENV: &str = "FIREWORKS_MODEL";

/// Sampling parameters sent with every completion request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionParams {
    pub temperature: f64,
    pub max_tokens: u32,
    pub top_p: f64,
}

impl Default for CompletionParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 512,
            top_p: 1.0,
        }
    }
}

/// Fireworks client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FireworksConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub max_context_tokens: usize,
    /// Number of prompts `generate` sends concurrently per sub-batch
    pub batch_size: usize,
    /// Client-side request budget; `None` disables local throttling
    pub requests_per_minute: Option<u32>,
    pub retry_policy: RetryPolicy,
    pub params: CompletionParams,
    /// Extra fields merged into every request body
    pub model_kwargs: serde_json::Map<String, serde_json::Value>,
}

impl Default for FireworksConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_context_tokens: 4_096,
            batch_size: 20,
            requests_per_minute: None,
            retry_policy: RetryPolicy::default(),
            params: CompletionParams::default(),
            model_kwargs: serde_json::Map::new(),
        }
    }
}

impl FireworksConfig {
    /// Load configuration from environment variables
    ///
    /// Reads `FIREWORKS_API_KEY`, `FIREWORKS_BASE_URL` and `FIREWORKS_MODEL`;
    /// anything unset keeps its default. The result is not validated here so
    /// callers can still override fields; [`crate::Fireworks::new`] validates.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(api_key) = std::env::var(API_KEY_ENV) {
            config.api_key = Some(api_key);
        }
        if let Ok(base_url) = std::env::var(BASE_URL_ENV) {
            config.base_url = base_url;
        }
        if let Ok(model) = std::env::var(MODEL_ENV) {
            config.model = model;
        }

        log_debug!(
            provider = "fireworks",
            has_api_key = config.api_key.is_some(),
            base_url = %config.base_url,
            model = %config.model,
            "Loaded Fireworks configuration from environment"
        );

        config
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_params(mut self, params: CompletionParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_requests_per_minute(mut self, requests_per_minute: u32) -> Self {
        self.requests_per_minute = Some(requests_per_minute);
        self
    }

    pub fn with_model_kwarg(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.model_kwargs.insert(key.into(), value);
        self
    }

    /// Validate the configuration is complete
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::ConfigurationError`] if:
    /// - the API key is missing or blank
    /// - base URL or model name is empty
    /// - `batch_size` or `requests_per_minute` is zero
    /// - a sampling parameter is out of range
    pub fn validate(&self) -> LlmResult<()> {
        match self.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() => {}
            _ => {
                return Err(LlmError::configuration_error(format!(
                    "Fireworks API key is required (set {API_KEY_ENV})"
                )))
            }
        }
        if self.base_url.trim().is_empty() {
            return Err(LlmError::configuration_error(
                "Fireworks base URL must not be empty",
            ));
        }
        if self.model.trim().is_empty() {
            return Err(LlmError::configuration_error("Model name must not be empty"));
        }
        if self.batch_size == 0 {
            return Err(LlmError::configuration_error(
                "batch_size must be greater than zero",
            ));
        }
        if self.requests_per_minute == Some(0) {
            return Err(LlmError::configuration_error(
                "requests_per_minute must be greater than zero when set",
            ));
        }
        if !(0.0..=2.0).contains(&self.params.temperature) {
            return Err(LlmError::configuration_error(format!(
                "temperature must be within 0.0..=2.0, got {}",
                self.params.temperature
            )));
        }
        if !(0.0..=1.0).contains(&self.params.top_p) {
            return Err(LlmError::configuration_error(format!(
                "top_p must be within 0.0..=1.0, got {}",
                self.params.top_p
            )));
        }
        if self.params.max_tokens == 0 {
            return Err(LlmError::configuration_error(
                "max_tokens must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Endpoint for text completions
    pub fn completions_url(&self) -> String {
        format!(
            "{}/inference/v1/completions",
            self.base_url.trim_end_matches('/')
        )
    }
}
