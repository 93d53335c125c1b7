//! Prompt-then-complete chain

use crate::core_types::provider::Llm;
use crate::error::{LlmError, LlmResult};
use crate::logging::log_debug;
use crate::prompts::{BasePromptTemplate, PromptValues};

use std::sync::Arc;

/// Formats a prompt template and sends the result to an [`Llm`]
///
/// ```rust
/// use fireworks_llm::chains::LlmChain;
/// use fireworks_llm::prompts::{ChatPromptTemplate, MessagePromptTemplate, PromptTemplate};
/// use fireworks_llm::FakeListLlm;
/// use std::sync::Arc;
///
/// # async fn example() -> fireworks_llm::LlmResult<()> {
/// let prompt = ChatPromptTemplate::from_messages([MessagePromptTemplate::human(
///     PromptTemplate::from_template("What is a good name for a company that makes {product}?")?,
/// )]);
/// let chain = LlmChain::new(Arc::new(FakeListLlm::new(["Helmet Heroes"])), prompt);
/// assert_eq!(chain.run("football helmets").await?, "Helmet Heroes");
/// # Ok(())
/// # }
/// ```
pub struct LlmChain {
    llm: Arc<dyn Llm>,
    prompt: Box<dyn BasePromptTemplate>,
}

impl std::fmt::Debug for LlmChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmChain")
            .field("provider", &self.llm.provider_name())
            .field("model", &self.llm.model())
            .field("prompt", &self.prompt)
            .finish()
    }
}

impl LlmChain {
    pub fn new(llm: Arc<dyn Llm>, prompt: impl BasePromptTemplate + 'static) -> Self {
        Self {
            llm,
            prompt: Box::new(prompt),
        }
    }

    pub fn llm(&self) -> &Arc<dyn Llm> {
        &self.llm
    }

    pub fn prompt(&self) -> &dyn BasePromptTemplate {
        self.prompt.as_ref()
    }

    /// Run with a single input value
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::TemplateError`] unless the prompt has exactly one
    /// input variable.
    pub async fn run(&self, input: &str) -> LlmResult<String> {
        let values = self.single_input(input)?;
        self.run_with(&values).await
    }

    /// Run with named input values
    pub async fn run_with(&self, values: &PromptValues) -> LlmResult<String> {
        let prompt = self.prompt.format(values)?;
        log_debug!(
            provider = self.llm.provider_name(),
            model = %self.llm.model(),
            prompt_chars = prompt.len(),
            "Running chain"
        );
        self.llm.invoke(&prompt, None).await
    }

    /// Alias of [`run_with`](Self::run_with)
    pub async fn predict(&self, values: &PromptValues) -> LlmResult<String> {
        self.run_with(values).await
    }

    /// Format every input and complete them in one `generate` call
    pub async fn apply(&self, inputs: &[PromptValues]) -> LlmResult<Vec<String>> {
        let prompts = inputs
            .iter()
            .map(|values| self.prompt.format(values))
            .collect::<LlmResult<Vec<String>>>()?;
        self.llm.batch(&prompts, None).await
    }

    pub(crate) fn single_input(&self, input: &str) -> LlmResult<PromptValues> {
        match self.prompt.input_variables() {
            [variable] => Ok(PromptValues::from([(variable.clone(), input.to_string())])),
            variables => Err(LlmError::template_error(format!(
                "run() needs a prompt with exactly one input variable, found {variables:?}"
            ))),
        }
    }
}
