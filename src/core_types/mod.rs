//! Core types for the completion abstraction
//!
//! ## Organization
//! - `provider` - the [`Llm`] trait and [`TokenStream`]
//! - `generation` - structured `generate` results

pub mod generation;
pub mod provider;

pub use generation::{GenerateOutput, Generation, GenerationInfo, LlmOutput, RunInfo, TokenUsage};
pub use provider::{Llm, TokenStream};
