//! `Llm` implementations
//!
//! - **fireworks**: the Fireworks AI text-completion API
//! - **fake**: canned responses for tests and offline work

pub mod fake;
pub mod fireworks;

pub use fake::FakeListLlm;
pub use fireworks::Fireworks;
