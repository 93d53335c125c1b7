//! Deterministic in-memory `Llm` for tests and offline development.

use crate::core_types::generation::{GenerateOutput, Generation, LlmOutput, RunInfo};
use crate::core_types::provider::{Llm, TokenStream};
use crate::error::{LlmError, LlmResult};
use crate::logging::log_trace;

use futures_util::stream;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Returns canned responses in order, cycling once exhausted.
///
/// Stop sequences are ignored; responses are returned exactly as given.
///
/// ```rust
/// use fireworks_llm::{FakeListLlm, Llm};
///
/// # async fn example() -> fireworks_llm::LlmResult<()> {
/// let llm = FakeListLlm::new(["first", "second"]);
/// assert_eq!(llm.call("a").await?, "first");
/// assert_eq!(llm.call("b").await?, "second");
/// assert_eq!(llm.call("c").await?, "first");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct FakeListLlm {
    responses: Vec<String>,
    cursor: AtomicUsize,
    stream_chars: bool,
}

impl FakeListLlm {
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            responses: responses.into_iter().map(Into::into).collect(),
            cursor: AtomicUsize::new(0),
            stream_chars: false,
        }
    }

    /// Stream responses one character per token instead of all at once
    pub fn streaming_chars(mut self) -> Self {
        self.stream_chars = true;
        self
    }

    /// Number of prompts answered so far
    pub fn calls(&self) -> usize {
        self.cursor.load(Ordering::SeqCst)
    }

    fn next_response(&self) -> LlmResult<String> {
        if self.responses.is_empty() {
            return Err(LlmError::configuration_error(
                "FakeListLlm needs at least one response",
            ));
        }
        let position = self.cursor.fetch_add(1, Ordering::SeqCst);
        Ok(self.responses[position % self.responses.len()].clone())
    }
}

#[async_trait::async_trait]
impl Llm for FakeListLlm {
    fn provider_name(&self) -> &'static str {
        "fake-list"
    }

    fn model(&self) -> &str {
        "fake-list"
    }

    async fn generate(
        &self,
        prompts: &[String],
        _stop: Option<&[String]>,
    ) -> LlmResult<GenerateOutput> {
        let run = RunInfo::start();
        let generations = prompts
            .iter()
            .map(|prompt| {
                log_trace!(provider = "fake-list", prompt = %prompt, "Answering prompt");
                self.next_response().map(|text| vec![Generation::new(text)])
            })
            .collect::<LlmResult<Vec<_>>>()?;

        Ok(GenerateOutput {
            generations,
            llm_output: Some(LlmOutput {
                model: self.model().to_string(),
                token_usage: None,
            }),
            run: vec![run],
        })
    }

    async fn stream(&self, prompt: &str, stop: Option<&[String]>) -> LlmResult<TokenStream> {
        let text = self.invoke(prompt, stop).await?;
        if !self.stream_chars {
            return Ok(Box::pin(stream::once(async move { Ok(text) })));
        }
        let tokens: Vec<LlmResult<String>> = text.chars().map(|c| Ok(c.to_string())).collect();
        Ok(Box::pin(stream::iter(tokens)))
    }
}
