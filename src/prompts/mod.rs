//! Prompt templates
//!
//! - `template` - [`PromptTemplate`] with `{variable}` substitution
//! - `chat` - role-tagged message templates rendered as a transcript

pub mod chat;
pub mod template;

pub use chat::{ChatMessage, ChatPromptTemplate, MessagePromptTemplate, MessageRole};
pub use template::{values_from_pairs, BasePromptTemplate, PromptTemplate, PromptValues};
