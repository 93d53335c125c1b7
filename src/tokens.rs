//! Token estimation for prompts.
//!
//! Fireworks hosts many model families with their own tokenizers. We do not
//! ship those; instead prompts are measured with tiktoken's `cl100k_base`,
//! which is close enough to catch prompts that cannot possibly fit the
//! context window before a request is spent on them.
//!
//! ```rust,no_run
//! use fireworks_llm::TokenCounter;
//!
//! let counter = TokenCounter::new(4_096);
//! let tokens = counter.count_tokens("How is the weather in New York today?")?;
//! counter.validate_completion_budget("How is the weather in New York today?", 512)?;
//! # Ok::<(), fireworks_llm::LlmError>(())
//! ```

use crate::error::{LlmError, LlmResult};
use crate::logging::log_debug;

use once_cell::sync::Lazy;
use tiktoken_rs::{cl100k_base, CoreBPE};

static CL100K: Lazy<Result<CoreBPE, String>> = Lazy::new(|| cl100k_base().map_err(|e| e.to_string()));

fn tokenizer() -> LlmResult<&'static CoreBPE> {
    CL100K.as_ref().map_err(|e| {
        LlmError::configuration_error(format!("Failed to initialize tokenizer: {e}"))
    })
}

/// Estimate the number of tokens in `text`.
pub fn estimate_tokens(text: &str) -> LlmResult<usize> {
    Ok(tokenizer()?.encode_with_special_tokens(text).len())
}

/// Context-window aware token counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenCounter {
    max_context_tokens: usize,
}

impl TokenCounter {
    pub fn new(max_context_tokens: usize) -> Self {
        Self { max_context_tokens }
    }

    pub fn max_context_tokens(&self) -> usize {
        self.max_context_tokens
    }

    pub fn count_tokens(&self, text: &str) -> LlmResult<usize> {
        estimate_tokens(text)
    }

    /// Check that `prompt` plus `max_tokens` of completion fits the window.
    ///
    /// Returns the estimated prompt token count on success.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::TokenLimitExceeded`] when the estimate does not fit.
    pub fn validate_completion_budget(&self, prompt: &str, max_tokens: u32) -> LlmResult<usize> {
        let prompt_tokens = self.count_tokens(prompt)?;
        let required = prompt_tokens + max_tokens as usize;
        if required > self.max_context_tokens {
            return Err(LlmError::token_limit_exceeded(
                required,
                self.max_context_tokens,
            ));
        }

        log_debug!(
            prompt_tokens = prompt_tokens,
            max_tokens = max_tokens,
            max_context_tokens = self.max_context_tokens,
            "Prompt fits context window"
        );
        Ok(prompt_tokens)
    }

    /// Truncate text to at most `max_tokens` tokens.
    pub fn truncate_to_limit(&self, text: &str, max_tokens: usize) -> LlmResult<String> {
        let bpe = tokenizer()?;
        let tokens = bpe.encode_with_special_tokens(text);
        if tokens.len() <= max_tokens {
            return Ok(text.to_string());
        }

        bpe.decode(tokens[..max_tokens].to_vec()).map_err(|e| {
            LlmError::response_parsing_error(format!("Failed to decode truncated tokens: {e}"))
        })
    }
}
