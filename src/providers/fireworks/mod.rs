//! Fireworks AI provider
//!
//! - `types` - request/response wire structures
//! - `http` - authenticated HTTP client with retry and rate limiting
//! - `streaming` - SSE decoding for streamed completions
//! - `provider` - the [`Fireworks`] client implementing [`crate::Llm`]

pub mod http;
pub mod provider;
pub mod streaming;
pub mod types;

#[cfg(test)]
mod tests;

pub use http::FireworksHttpClient;
pub use provider::Fireworks;
pub use streaming::decode_event_stream;
pub use types::{CompletionChoice, CompletionRequest, CompletionResponse, CompletionUsage};
