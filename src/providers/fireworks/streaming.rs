//! Server-sent event decoding for streamed completions.
//!
//! Reads the response body as a byte stream, splits it on SSE event
//! boundaries (`data: ...\n\n`), parses each payload as a
//! [`CompletionResponse`] and yields the text of its first choice.
//! `data: [DONE]` ends the stream.

use super::types::CompletionResponse;
use crate::error::{LlmError, LlmResult};
use crate::logging::log_debug;

use futures_util::stream::{self, Stream, StreamExt};
use std::fmt::Display;
use std::pin::Pin;

/// Outcome of decoding one SSE event
#[derive(Debug, PartialEq)]
pub(crate) enum SseEvent {
    /// A text token to hand to the caller
    Token(String),
    /// Keep-alive, comment, or a choice without text
    Skip,
    /// `[DONE]` sentinel
    Done,
}

/// Decode a raw SSE byte stream into completion tokens.
///
/// After the first error item the stream ends. The returned stream is fused,
/// so polling it again after it has ended keeps yielding `None`.
pub fn decode_event_stream<S, B, E>(bytes: S) -> impl Stream<Item = LlmResult<String>> + Send
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send,
    E: Display + Send,
{
    let state = DecoderState {
        bytes: Box::pin(bytes),
        buffer: Vec::new(),
        finished: false,
    };

    stream::unfold(state, |mut state| async move {
        let item = state.next_token().await?;
        if item.is_err() {
            state.finished = true;
        }
        Some((item, state))
    })
    .fuse()
}

struct DecoderState<S> {
    bytes: Pin<Box<S>>,
    buffer: Vec<u8>,
    finished: bool,
}

impl<S, B, E> DecoderState<S>
where
    S: Stream<Item = Result<B, E>> + Send,
    B: AsRef<[u8]> + Send,
    E: Display + Send,
{
    /// Pull bytes until a token, an error or the end of the stream
    async fn next_token(&mut self) -> Option<LlmResult<String>> {
        loop {
            if self.finished {
                return None;
            }

            if let Some((end, separator_len)) = find_event_boundary(&self.buffer) {
                let event: Vec<u8> = self.buffer.drain(..end + separator_len).collect();
                match decode_event(&String::from_utf8_lossy(&event[..end])) {
                    Ok(SseEvent::Token(token)) => return Some(Ok(token)),
                    Ok(SseEvent::Skip) => continue,
                    Ok(SseEvent::Done) => {
                        log_debug!(provider = "fireworks", "Completion stream finished");
                        self.finished = true;
                        return None;
                    }
                    Err(e) => return Some(Err(e)),
                }
            }

            match self.bytes.next().await {
                Some(Ok(chunk)) => self.buffer.extend_from_slice(chunk.as_ref()),
                Some(Err(e)) => {
                    return Some(Err(LlmError::stream_error(format!(
                        "stream read error: {e}"
                    ))))
                }
                None => {
                    // Body ended without [DONE]; flush whatever is buffered.
                    self.finished = true;
                    let rest = std::mem::take(&mut self.buffer);
                    let rest = String::from_utf8_lossy(&rest);
                    if rest.trim().is_empty() {
                        return None;
                    }
                    return match decode_event(rest.trim()) {
                        Ok(SseEvent::Token(token)) => Some(Ok(token)),
                        Ok(_) => None,
                        Err(e) => Some(Err(e)),
                    };
                }
            }
        }
    }
}

/// Earliest event boundary in `buffer` as (event end, separator length)
fn find_event_boundary(buffer: &[u8]) -> Option<(usize, usize)> {
    let lf = find_subslice(buffer, b"\n\n").map(|i| (i, 2));
    let crlf = find_subslice(buffer, b"\r\n\r\n").map(|i| (i, 4));
    match (lf, crlf) {
        (Some(a), Some(b)) => Some(if a.0 <= b.0 { a } else { b }),
        (a, b) => a.or(b),
    }
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Decode a single SSE event (possibly several `data:` lines)
pub(crate) fn decode_event(event: &str) -> LlmResult<SseEvent> {
    let data: Vec<&str> = event
        .lines()
        .filter_map(|line| {
            line.strip_prefix("data:")
                .map(|rest| rest.strip_prefix(' ').unwrap_or(rest))
        })
        .collect();

    if data.is_empty() {
        return Ok(SseEvent::Skip);
    }

    let payload = data.join("\n");
    let payload = payload.trim();
    if payload == "[DONE]" {
        return Ok(SseEvent::Done);
    }
    if payload.is_empty() {
        return Ok(SseEvent::Skip);
    }

    let value: serde_json::Value = serde_json::from_str(payload).map_err(|e| {
        LlmError::stream_error(format!("failed to parse SSE chunk: {e} (data: {payload})"))
    })?;

    if let Some(error) = value.get("error") {
        let message = error
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| error.to_string());
        return Err(LlmError::stream_error(format!("server error in stream: {message}")));
    }

    let chunk: CompletionResponse = serde_json::from_value(value)
        .map_err(|e| LlmError::stream_error(format!("unexpected SSE chunk shape: {e}")))?;

    match chunk.choices.into_iter().next() {
        Some(choice) if !choice.text.is_empty() => Ok(SseEvent::Token(choice.text)),
        _ => Ok(SseEvent::Skip),
    }
}
