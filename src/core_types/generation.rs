//! Structured result of a `generate` call.
//!
//! One [`GenerateOutput`] bundles a list of [`Generation`]s per input prompt,
//! in prompt order, plus model-level metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single completion candidate for one prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Generation {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generation_info: Option<GenerationInfo>,
}

impl Generation {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            generation_info: None,
        }
    }

    pub fn with_info(mut self, info: GenerationInfo) -> Self {
        self.generation_info = Some(info);
        self
    }
}

/// Provider metadata attached to a generation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GenerationInfo {
    /// Why the model stopped ("stop", "length", ...)
    pub finish_reason: Option<String>,
    /// Position of the choice in the provider response
    pub index: Option<u32>,
}

/// Token usage information
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl std::ops::AddAssign for TokenUsage {
    fn add_assign(&mut self, other: Self) {
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
        self.total_tokens += other.total_tokens;
    }
}

/// Model-level output shared by every generation of a call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmOutput {
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_usage: Option<TokenUsage>,
}

/// Identifies one `generate` run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunInfo {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
}

impl RunInfo {
    pub fn start() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
        }
    }
}

/// Result of [`crate::Llm::generate`].
///
/// `generations[i]` holds the candidates for the i-th prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateOutput {
    pub generations: Vec<Vec<Generation>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_output: Option<LlmOutput>,
    #[serde(default)]
    pub run: Vec<RunInfo>,
}

impl GenerateOutput {
    pub fn new(generations: Vec<Vec<Generation>>) -> Self {
        Self {
            generations,
            llm_output: None,
            run: Vec::new(),
        }
    }

    /// Text of the first candidate for each prompt, in prompt order.
    ///
    /// Prompts without any candidate yield an empty string. [`crate::Llm::batch`]
    /// treats that case as an error instead.
    pub fn first_texts(&self) -> Vec<String> {
        self.generations
            .iter()
            .map(|candidates| {
                candidates
                    .first()
                    .map(|g| g.text.clone())
                    .unwrap_or_default()
            })
            .collect()
    }
}
