//! Chat-style prompt templates.
//!
//! A [`ChatPromptTemplate`] is an ordered list of role-tagged message
//! templates. Completion models take plain text, so formatting renders the
//! messages as a transcript:
//!
//! ```text
//! System: You are a naming consultant.
//! Human: What is a good name for a company that makes football helmets?
//! ```

use super::template::{BasePromptTemplate, PromptTemplate, PromptValues};
use crate::error::LlmResult;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Speaker of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageRole {
    System,
    Human,
    Ai,
}

impl MessageRole {
    /// Transcript prefix for this role
    pub fn prefix(&self) -> &'static str {
        match self {
            MessageRole::System => "System",
            MessageRole::Human => "Human",
            MessageRole::Ai => "AI",
        }
    }
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// A formatted chat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl fmt::Display for ChatMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.role, self.content)
    }
}

/// Template for one chat message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessagePromptTemplate {
    role: MessageRole,
    prompt: PromptTemplate,
}

impl MessagePromptTemplate {
    pub fn new(role: MessageRole, prompt: PromptTemplate) -> Self {
        Self { role, prompt }
    }

    pub fn human(prompt: PromptTemplate) -> Self {
        Self::new(MessageRole::Human, prompt)
    }

    pub fn system(prompt: PromptTemplate) -> Self {
        Self::new(MessageRole::System, prompt)
    }

    pub fn ai(prompt: PromptTemplate) -> Self {
        Self::new(MessageRole::Ai, prompt)
    }

    pub fn role(&self) -> MessageRole {
        self.role
    }

    pub fn prompt(&self) -> &PromptTemplate {
        &self.prompt
    }

    pub fn format_message(&self, values: &PromptValues) -> LlmResult<ChatMessage> {
        Ok(ChatMessage {
            role: self.role,
            content: self.prompt.format(values)?,
        })
    }
}

/// Ordered list of message templates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatPromptTemplate {
    messages: Vec<MessagePromptTemplate>,
    input_variables: Vec<String>,
}

impl ChatPromptTemplate {
    /// Input variables are the union of the messages' variables, in order of
    /// first appearance.
    pub fn from_messages(messages: impl IntoIterator<Item = MessagePromptTemplate>) -> Self {
        let messages: Vec<MessagePromptTemplate> = messages.into_iter().collect();
        let mut input_variables: Vec<String> = Vec::new();
        for variable in messages
            .iter()
            .flat_map(|m| m.prompt.input_variables().iter())
        {
            if !input_variables.contains(variable) {
                input_variables.push(variable.clone());
            }
        }

        Self {
            messages,
            input_variables,
        }
    }

    pub fn messages(&self) -> &[MessagePromptTemplate] {
        &self.messages
    }

    pub fn format_messages(&self, values: &PromptValues) -> LlmResult<Vec<ChatMessage>> {
        self.messages
            .iter()
            .map(|message| message.format_message(values))
            .collect()
    }
}

impl BasePromptTemplate for ChatPromptTemplate {
    fn input_variables(&self) -> &[String] {
        &self.input_variables
    }

    fn format(&self, values: &PromptValues) -> LlmResult<String> {
        let lines: Vec<String> = self
            .format_messages(values)?
            .iter()
            .map(ChatMessage::to_string)
            .collect();
        Ok(lines.join("\n"))
    }
}
