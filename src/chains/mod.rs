//! Chains that combine a prompt template with an [`crate::Llm`]

pub mod llm_chain;

pub use llm_chain::LlmChain;
