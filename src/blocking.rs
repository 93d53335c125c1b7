//! Synchronous wrappers around the async client.
//!
//! [`Fireworks`] owns a current-thread tokio runtime and drives every call
//! to completion on it. Like `reqwest::blocking`, it must not be created,
//! used or dropped from inside an async runtime.
//!
//! ```rust,no_run
//! use fireworks_llm::blocking::Fireworks;
//! use fireworks_llm::FireworksConfig;
//!
//! let llm = Fireworks::new(FireworksConfig::from_env())?;
//! let stop = vec![",".to_string()];
//! for token in llm.stream("How is the weather in New York today?", Some(&stop))? {
//!     print!("{}", token?);
//! }
//! # Ok::<(), fireworks_llm::LlmError>(())
//! ```

use crate::chains;
use crate::config::FireworksConfig;
use crate::core_types::generation::GenerateOutput;
use crate::core_types::provider::{Llm, TokenStream};
use crate::error::{LlmError, LlmResult};
use crate::prompts::{BasePromptTemplate, PromptValues};
use crate::providers::fireworks;

use futures_util::stream::{Fuse, StreamExt};
use std::sync::Arc;
use tokio::runtime::Runtime;

/// Blocking Fireworks client
#[derive(Debug)]
pub struct Fireworks {
    inner: Arc<fireworks::Fireworks>,
    runtime: Runtime,
}

impl Fireworks {
    /// Create a client with its own runtime
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::ConfigurationError`] if the configuration is
    /// invalid or the runtime cannot be started.
    pub fn new(config: FireworksConfig) -> LlmResult<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| {
                LlmError::configuration_error(format!("Failed to start blocking runtime: {e}"))
            })?;

        Ok(Self {
            inner: Arc::new(fireworks::Fireworks::new(config)?),
            runtime,
        })
    }

    pub fn from_env() -> LlmResult<Self> {
        Self::new(FireworksConfig::from_env())
    }

    /// The async client this wraps
    pub fn inner(&self) -> &Arc<fireworks::Fireworks> {
        &self.inner
    }

    pub fn model(&self) -> &str {
        self.inner.model()
    }

    pub fn config(&self) -> &FireworksConfig {
        self.inner.config()
    }

    pub fn call(&self, prompt: &str) -> LlmResult<String> {
        self.runtime.block_on(self.inner.call(prompt))
    }

    pub fn invoke(&self, prompt: &str, stop: Option<&[String]>) -> LlmResult<String> {
        self.runtime.block_on(self.inner.invoke(prompt, stop))
    }

    pub fn batch(&self, prompts: &[String], stop: Option<&[String]>) -> LlmResult<Vec<String>> {
        self.runtime.block_on(self.inner.batch(prompts, stop))
    }

    pub fn generate(
        &self,
        prompts: &[String],
        stop: Option<&[String]>,
    ) -> LlmResult<GenerateOutput> {
        self.runtime.block_on(self.inner.generate(prompts, stop))
    }

    /// Open a completion stream and iterate its tokens
    pub fn stream(&self, prompt: &str, stop: Option<&[String]>) -> LlmResult<TokenIter<'_>> {
        let stream = self.runtime.block_on(self.inner.stream(prompt, stop))?;
        Ok(TokenIter {
            runtime: &self.runtime,
            stream: stream.fuse(),
        })
    }

    /// Bind a prompt template to this client
    pub fn chain(&self, prompt: impl BasePromptTemplate + 'static) -> LlmChain<'_> {
        let llm: Arc<dyn Llm> = self.inner.clone();
        LlmChain {
            runtime: &self.runtime,
            chain: chains::LlmChain::new(llm, prompt),
        }
    }
}

/// Tokens of a streamed completion, pulled one at a time
///
/// Once exhausted, `next` keeps returning `None`.
pub struct TokenIter<'a> {
    runtime: &'a Runtime,
    stream: Fuse<TokenStream>,
}

impl std::fmt::Debug for TokenIter<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIter").finish_non_exhaustive()
    }
}

impl Iterator for TokenIter<'_> {
    type Item = LlmResult<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.runtime.block_on(self.stream.next())
    }
}

/// Blocking counterpart of [`chains::LlmChain`]
#[derive(Debug)]
pub struct LlmChain<'a> {
    runtime: &'a Runtime,
    chain: chains::LlmChain,
}

impl LlmChain<'_> {
    pub fn run(&self, input: &str) -> LlmResult<String> {
        self.runtime.block_on(self.chain.run(input))
    }

    pub fn run_with(&self, values: &PromptValues) -> LlmResult<String> {
        self.runtime.block_on(self.chain.run_with(values))
    }
}
