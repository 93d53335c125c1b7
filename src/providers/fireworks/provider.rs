//! Fireworks completion client

use super::http::FireworksHttpClient;
use super::streaming::decode_event_stream;
use super::types::{CompletionRequest, CompletionResponse};
use crate::config::FireworksConfig;
use crate::core_types::generation::{
    GenerateOutput, Generation, GenerationInfo, LlmOutput, RunInfo, TokenUsage,
};
use crate::core_types::provider::{Llm, TokenStream};
use crate::error::LlmResult;
use crate::logging::{duration_ms, log_debug, log_info};
use crate::tokens::TokenCounter;

use futures_util::future::try_join_all;
use reqwest::header::HeaderMap;
use std::time::Instant;

/// Client for the Fireworks text-completion API
///
/// ```rust,no_run
/// use fireworks_llm::{Fireworks, FireworksConfig, Llm};
///
/// # async fn example() -> fireworks_llm::LlmResult<()> {
/// let llm = Fireworks::new(FireworksConfig::from_env())?;
/// let stop = vec![",".to_string()];
/// let text = llm
///     .invoke("How is the weather in New York today?", Some(&stop))
///     .await?;
/// assert!(text.ends_with(','));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Fireworks {
    http_client: FireworksHttpClient,
    headers: HeaderMap,
    token_counter: TokenCounter,
    config: FireworksConfig,
}

impl Fireworks {
    /// Create a new client
    ///
    /// # Errors
    ///
    /// Returns [`crate::LlmError::ConfigurationError`] if:
    /// - the configuration fails [`FireworksConfig::validate`]
    /// - the API key cannot be used as a header value
    /// - HTTP client initialization fails
    pub fn new(config: FireworksConfig) -> LlmResult<Self> {
        log_debug!(
            provider = "fireworks",
            has_api_key = config.api_key.is_some(),
            base_url = %config.base_url,
            model = %config.model,
            max_context_tokens = config.max_context_tokens,
            batch_size = config.batch_size,
            "Creating Fireworks client"
        );

        config.validate()?;

        let headers =
            FireworksHttpClient::build_auth_headers(config.api_key.as_deref().unwrap_or_default())?;
        let http_client =
            FireworksHttpClient::new(config.retry_policy.clone(), config.requests_per_minute)?;

        Ok(Self {
            http_client,
            headers,
            token_counter: TokenCounter::new(config.max_context_tokens),
            config,
        })
    }

    /// Create a client configured from `FIREWORKS_*` environment variables
    pub fn from_env() -> LlmResult<Self> {
        Self::new(FireworksConfig::from_env())
    }

    pub fn config(&self) -> &FireworksConfig {
        &self.config
    }

    pub fn http_client(&self) -> &FireworksHttpClient {
        &self.http_client
    }

    /// Build the request body for one prompt
    pub fn build_request(
        &self,
        prompt: &str,
        stop: Option<&[String]>,
        stream: bool,
    ) -> CompletionRequest {
        let extra = self
            .config
            .model_kwargs
            .iter()
            .filter(|(key, _)| !CompletionRequest::RESERVED_FIELDS.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        CompletionRequest {
            model: self.config.model.clone(),
            prompt: prompt.to_string(),
            max_tokens: self.config.params.max_tokens,
            temperature: self.config.params.temperature,
            top_p: self.config.params.top_p,
            stop: stop.filter(|s| !s.is_empty()).map(<[String]>::to_vec),
            stream: stream.then_some(true),
            extra,
        }
    }

    /// Complete one prompt
    async fn complete(
        &self,
        prompt: &str,
        stop: Option<&[String]>,
    ) -> LlmResult<CompletionResponse> {
        let request = self.build_request(prompt, stop, false);
        self.http_client
            .execute_completion(&self.config.completions_url(), &self.headers, &request)
            .await
    }

    fn response_to_generations(response: CompletionResponse) -> Vec<Generation> {
        response
            .choices
            .into_iter()
            .map(|choice| {
                Generation::new(choice.text).with_info(GenerationInfo {
                    finish_reason: choice.finish_reason,
                    index: Some(choice.index),
                })
            })
            .collect()
    }
}

#[async_trait::async_trait]
impl Llm for Fireworks {
    fn provider_name(&self) -> &'static str {
        "fireworks"
    }

    fn model(&self) -> &str {
        &self.config.model
    }

    async fn generate(
        &self,
        prompts: &[String],
        stop: Option<&[String]>,
    ) -> LlmResult<GenerateOutput> {
        let run = RunInfo::start();
        for prompt in prompts {
            self.token_counter
                .validate_completion_budget(prompt, self.config.params.max_tokens)?;
        }

        log_debug!(
            provider = "fireworks",
            run_id = %run.run_id,
            prompt_count = prompts.len(),
            batch_size = self.config.batch_size,
            has_stop = stop.is_some(),
            "Generating completions"
        );

        let start_time = Instant::now();
        let mut generations = Vec::with_capacity(prompts.len());
        let mut token_usage: Option<TokenUsage> = None;

        for sub_batch in prompts.chunks(self.config.batch_size) {
            let responses =
                try_join_all(sub_batch.iter().map(|prompt| self.complete(prompt, stop))).await?;

            for response in responses {
                if let Some(usage) = response.usage {
                    *token_usage.get_or_insert_with(TokenUsage::default) += TokenUsage::from(usage);
                }
                generations.push(Self::response_to_generations(response));
            }
        }

        log_info!(
            provider = "fireworks",
            run_id = %run.run_id,
            model = %self.config.model,
            prompt_count = prompts.len(),
            duration_ms = duration_ms(start_time.elapsed()),
            total_tokens = token_usage.map(|u| u.total_tokens).unwrap_or(0),
            "Completions generated"
        );

        Ok(GenerateOutput {
            generations,
            llm_output: Some(LlmOutput {
                model: self.config.model.clone(),
                token_usage,
            }),
            run: vec![run],
        })
    }

    async fn stream(&self, prompt: &str, stop: Option<&[String]>) -> LlmResult<TokenStream> {
        self.token_counter
            .validate_completion_budget(prompt, self.config.params.max_tokens)?;

        let request = self.build_request(prompt, stop, true);
        let response = self
            .http_client
            .open_stream(&self.config.completions_url(), &self.headers, &request)
            .await?;

        log_debug!(
            provider = "fireworks",
            model = %self.config.model,
            "Completion stream opened"
        );

        Ok(Box::pin(decode_event_stream(response.bytes_stream())))
    }
}
