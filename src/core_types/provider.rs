//! The `Llm` trait every completion backend implements.
//!
//! Backends only have to provide [`Llm::generate`]; the single-prompt,
//! batch and streaming entry points have default implementations built on
//! top of it. Backends with native streaming override [`Llm::stream`].

use crate::core_types::generation::GenerateOutput;
use crate::error::{LlmError, LlmResult};
use crate::tokens::estimate_tokens;

use futures_util::stream::{self, Stream};
use std::pin::Pin;

/// Lazy sequence of text tokens produced by [`Llm::stream`].
pub type TokenStream = Pin<Box<dyn Stream<Item = LlmResult<String>> + Send + 'static>>;

/// A text-completion model.
///
/// All methods are async. See [`crate::blocking`] for synchronous wrappers.
#[async_trait::async_trait]
pub trait Llm: Send + Sync {
    /// Short backend identifier for logging
    fn provider_name(&self) -> &'static str;

    /// Model the backend sends requests to
    fn model(&self) -> &str;

    /// Complete every prompt, returning one generation list per prompt in
    /// input order.
    async fn generate(
        &self,
        prompts: &[String],
        stop: Option<&[String]>,
    ) -> LlmResult<GenerateOutput>;

    /// Complete a single prompt and return the first candidate's text.
    async fn invoke(&self, prompt: &str, stop: Option<&[String]>) -> LlmResult<String> {
        let output = self.generate(&[prompt.to_string()], stop).await?;
        output
            .generations
            .into_iter()
            .next()
            .and_then(|candidates| candidates.into_iter().next())
            .map(|generation| generation.text)
            .ok_or_else(|| LlmError::response_parsing_error("No generations returned for prompt"))
    }

    /// Complete a single prompt without stop sequences.
    async fn call(&self, prompt: &str) -> LlmResult<String> {
        self.invoke(prompt, None).await
    }

    /// Complete many prompts, returning one text per prompt in input order.
    async fn batch(&self, prompts: &[String], stop: Option<&[String]>) -> LlmResult<Vec<String>> {
        if prompts.is_empty() {
            return Ok(Vec::new());
        }
        let output = self.generate(prompts, stop).await?;
        if output.generations.len() != prompts.len() {
            return Err(LlmError::response_parsing_error(format!(
                "Expected {} generations, got {}",
                prompts.len(),
                output.generations.len()
            )));
        }
        output
            .generations
            .into_iter()
            .enumerate()
            .map(|(index, candidates)| {
                candidates
                    .into_iter()
                    .next()
                    .map(|generation| generation.text)
                    .ok_or_else(|| {
                        LlmError::response_parsing_error(format!(
                            "No generations returned for prompt {index}"
                        ))
                    })
            })
            .collect()
    }

    /// Stream the completion of a single prompt token by token.
    ///
    /// Without native streaming the whole completion arrives as one token.
    async fn stream(&self, prompt: &str, stop: Option<&[String]>) -> LlmResult<TokenStream> {
        let text = self.invoke(prompt, stop).await?;
        Ok(Box::pin(stream::once(async move { Ok(text) })))
    }

    /// Estimated number of tokens in `text`
    fn num_tokens(&self, text: &str) -> LlmResult<usize> {
        estimate_tokens(text)
    }
}
