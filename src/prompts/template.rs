//! String prompt templates with `{variable}` placeholders.
//!
//! `{{` and `}}` render as literal braces. Any other lone brace is rejected
//! when the template is built, so formatting never produces half-substituted
//! text.

use crate::error::{LlmError, LlmResult};

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// Values substituted into a template, keyed by variable name
pub type PromptValues = HashMap<String, String>;

/// Build [`PromptValues`] from `(name, value)` pairs
pub fn values_from_pairs(pairs: &[(&str, &str)]) -> PromptValues {
    pairs
        .iter()
        .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
        .collect()
}

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{|\}\}|\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap_or_else(|e| {
        unreachable!("placeholder pattern is a valid regex: {e}")
    })
});

/// Anything that renders a prompt string from named values
pub trait BasePromptTemplate: Send + Sync + std::fmt::Debug {
    /// Variables that must be supplied to [`format`](Self::format), in first
    /// appearance order
    fn input_variables(&self) -> &[String];

    /// Render the prompt
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::TemplateError`] if a variable has no value.
    fn format(&self, values: &PromptValues) -> LlmResult<String>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Variable(String),
}

/// A prompt with `{variable}` placeholders
///
/// ```rust
/// use fireworks_llm::prompts::{values_from_pairs, BasePromptTemplate, PromptTemplate};
///
/// let prompt = PromptTemplate::new(
///     "What is a good name for a company that makes {product}?",
///     ["product"],
/// )?;
/// let text = prompt.format(&values_from_pairs(&[("product", "football helmets")]))?;
/// assert_eq!(text, "What is a good name for a company that makes football helmets?");
/// # Ok::<(), fireworks_llm::LlmError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    template: String,
    input_variables: Vec<String>,
    segments: Vec<Segment>,
}

impl PromptTemplate {
    /// Build a template and check `input_variables` against its placeholders
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::TemplateError`] if the template has a stray brace,
    /// or if the declared variables differ from the placeholders found.
    pub fn new<I, S>(template: impl Into<String>, input_variables: I) -> LlmResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let parsed = Self::from_template(template)?;
        let declared: Vec<String> = input_variables.into_iter().map(Into::into).collect();

        let missing: Vec<&String> = parsed
            .input_variables
            .iter()
            .filter(|v| !declared.contains(v))
            .collect();
        let unused: Vec<&String> = declared
            .iter()
            .filter(|v| !parsed.input_variables.contains(v))
            .collect();

        if !missing.is_empty() || !unused.is_empty() {
            return Err(LlmError::template_error(format!(
                "Declared input variables {declared:?} do not match template placeholders {:?}",
                parsed.input_variables
            )));
        }

        Ok(parsed)
    }

    /// Build a template, inferring input variables from its placeholders
    pub fn from_template(template: impl Into<String>) -> LlmResult<Self> {
        let template = template.into();
        let segments = parse_segments(&template)?;

        let mut input_variables: Vec<String> = Vec::new();
        for segment in &segments {
            if let Segment::Variable(name) = segment {
                if !input_variables.contains(name) {
                    input_variables.push(name.clone());
                }
            }
        }

        Ok(Self {
            template,
            input_variables,
            segments,
        })
    }

    pub fn template(&self) -> &str {
        &self.template
    }
}

impl BasePromptTemplate for PromptTemplate {
    fn input_variables(&self) -> &[String] {
        &self.input_variables
    }

    fn format(&self, values: &PromptValues) -> LlmResult<String> {
        let mut out = String::with_capacity(self.template.len() + 32);
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Variable(name) => {
                    let value = values.get(name).ok_or_else(|| {
                        LlmError::template_error(format!(
                            "Missing value for input variable '{name}'"
                        ))
                    })?;
                    out.push_str(value);
                }
            }
        }
        Ok(out)
    }
}

fn parse_segments(template: &str) -> LlmResult<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut last_end = 0;

    for captures in PLACEHOLDER.captures_iter(template) {
        let Some(whole) = captures.get(0) else {
            continue;
        };
        push_literal(&mut literal, &template[last_end..whole.start()], whole.start())?;
        last_end = whole.end();

        match (whole.as_str(), captures.get(1)) {
            ("{{", _) => literal.push('{'),
            ("}}", _) => literal.push('}'),
            (_, Some(name)) => {
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Variable(name.as_str().to_string()));
            }
            _ => {}
        }
    }

    push_literal(&mut literal, &template[last_end..], last_end)?;
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}

/// Append plain text, rejecting braces that are not part of a placeholder
fn push_literal(literal: &mut String, text: &str, offset: usize) -> LlmResult<()> {
    if let Some(position) = text.find(['{', '}']) {
        return Err(LlmError::template_error(format!(
            "Unmatched brace at byte {} in prompt template",
            offset + position
        )));
    }
    literal.push_str(text);
    Ok(())
}
