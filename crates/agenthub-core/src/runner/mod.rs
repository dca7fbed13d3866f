//! Agent runner ports.
//!
//! A runner drives one conversational turn: the caller creates a session,
//! submits a single message, and consumes the resulting event stream. Runners
//! are built per request by a [`RunnerFactory`], so no session state is ever
//! shared between executions.
//!
//! - `AgentRunner`: RPITIT trait for concrete runners
//! - `RunnerFactory`: builds a runner for one agent definition
//! - `InMemorySessionStore`: per-runner session storage
//! - `LlmAgentRunner`: runner backed by a chat-completion provider

pub mod llm;
pub mod session;

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::Stream;

use agenthub_types::agent::UserIdentity;
use agenthub_types::runner::{RunnerError, RunnerEvent, Session, SessionId, UserMessage};

/// Boxed stream of runner events.
pub type RunnerEventStream =
    Pin<Box<dyn Stream<Item = Result<RunnerEvent, RunnerError>> + Send + 'static>>;

/// The agent instance a runner executes.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentDefinition {
    /// Sanitized agent name.
    pub name: String,
    pub model: String,
    /// Behavioral description; the resolved system prompt.
    pub description: String,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f64>,
}

/// A runner bound to a single agent definition.
pub trait AgentRunner: Send + Sync {
    /// Create a session keyed by `session_id` for `user` under `app_name`.
    fn create_session(
        &self,
        session_id: SessionId,
        app_name: &str,
        user: &UserIdentity,
    ) -> impl std::future::Future<Output = Result<Session, RunnerError>> + Send;

    /// Submit one message to a session and stream the events it produces.
    fn run(&self, session: &Session, message: UserMessage) -> RunnerEventStream;
}

/// Builds a fresh runner (with its own session store) per execution.
pub trait RunnerFactory: Send + Sync {
    type Runner: AgentRunner;

    fn build(&self, definition: AgentDefinition) -> Result<Self::Runner, RunnerError>;
}

pin_project_lite::pin_project! {
    /// Keeps a span entered while the wrapped stream is polled, so events
    /// logged by a provider stream land inside the run's span.
    pub(crate) struct StreamInSpan<S> {
        #[pin]
        inner: S,
        span: tracing::Span,
    }
}

impl<S> StreamInSpan<S> {
    pub(crate) fn new(inner: S, span: tracing::Span) -> Self {
        Self { inner, span }
    }
}

impl<S: Stream> Stream for StreamInSpan<S> {
    type Item = S::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.project();
        let _enter = this.span.enter();
        this.inner.poll_next(cx)
    }
}
