//! # fireworks-llm
//!
//! Client for the Fireworks AI text-completion API.
//!
//! ## Key Features
//!
//! - **Call patterns**: single call, invoke with stop sequences, batch,
//!   multi-prompt generate and token streaming
//! - **Async and blocking**: the [`Llm`] trait is async; [`blocking`] wraps it
//!   for synchronous callers
//! - **Prompts and chains**: `{variable}` templates, chat message templates
//!   and [`chains::LlmChain`]
//! - **Resilience**: retry with backoff, circuit breaking and optional
//!   client-side rate limiting
//!
//! ## Example
//!
//! ```rust,no_run
//! use fireworks_llm::{Fireworks, FireworksConfig, Llm};
//!
//! # async fn example() -> fireworks_llm::LlmResult<()> {
//! let llm = Fireworks::new(FireworksConfig::from_env().with_model("foo"))?;
//! assert_eq!(llm.model(), "foo");
//!
//! let stop = vec![",".to_string()];
//! let prompts = vec!["How is the weather in New York today?".to_string(); 5];
//! let answers = llm.batch(&prompts, Some(&stop)).await?;
//! assert_eq!(answers.len(), 5);
//! # Ok(())
//! # }
//! ```

#![allow(clippy::missing_errors_doc)]

pub mod core_types;

// Logging utilities (re-exports tracing with log_* naming) - internal only
pub(crate) mod logging;

pub mod blocking;
pub mod chains;
pub mod config;
pub mod error;
pub mod prompts;
pub mod providers;
pub mod retry;
pub mod tokens;

#[cfg(test)]
pub mod tests;

pub use config::{CompletionParams, FireworksConfig};
pub use error::{ErrorCategory, ErrorSeverity, LlmError, LlmResult};
pub use providers::{FakeListLlm, Fireworks};
pub use retry::RetryPolicy;
pub use tokens::TokenCounter;

pub use core_types::{
    GenerateOutput, Generation, GenerationInfo, Llm, LlmOutput, RunInfo, TokenStream, TokenUsage,
};
