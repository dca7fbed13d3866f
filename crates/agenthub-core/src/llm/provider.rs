//! LlmProvider trait definition.
//!
//! `stream` returns `Pin<Box<dyn Stream>>` so the trait stays object-safe
//! for the BoxLlmProvider wrapper.

use std::pin::Pin;

use futures_util::Stream;

use agenthub_types::llm::{CompletionRequest, LlmError, StreamEvent};

/// Boxed stream of provider events.
pub type LlmEventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, LlmError>> + Send + 'static>>;

/// Trait for chat-completion backends.
///
/// Implementations live in agenthub-infra (e.g., `OpenAiCompatibleProvider`).
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g., "openai", "gemini").
    fn name(&self) -> &str;

    /// Send a streaming completion request. Returns a stream of events.
    fn stream(&self, request: CompletionRequest) -> LlmEventStream;
}
