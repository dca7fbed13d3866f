//! Runner backed by a chat-completion provider.
//!
//! Each `run` streams one completion: the agent description is the system
//! prompt, the session history plus the new message are the conversation.
//! Text deltas surface as `ModelResponse` events and the full reply closes the
//! stream as an `AgentState` event with an `output` key.

use std::sync::Arc;

use futures_util::StreamExt;
use tracing::{debug, info_span};

use agenthub_types::agent::UserIdentity;
use agenthub_types::llm::{CompletionRequest, Message, StreamEvent};
use agenthub_types::runner::{RunnerError, RunnerEvent, Session, SessionId, UserMessage};

use crate::llm::box_provider::BoxLlmProvider;

use super::session::InMemorySessionStore;
use super::{AgentDefinition, AgentRunner, RunnerEventStream, StreamInSpan};

pub struct LlmAgentRunner {
    definition: AgentDefinition,
    provider: Arc<BoxLlmProvider>,
    sessions: Arc<InMemorySessionStore>,
    default_max_tokens: u32,
}

impl LlmAgentRunner {
    /// Build a runner with an empty session store.
    ///
    /// `default_max_tokens` applies when the definition sets no cap.
    pub fn new(definition: AgentDefinition, provider: BoxLlmProvider, default_max_tokens: u32) -> Self {
        Self {
            definition,
            provider: Arc::new(provider),
            sessions: Arc::new(InMemorySessionStore::new()),
            default_max_tokens,
        }
    }

    pub fn definition(&self) -> &AgentDefinition {
        &self.definition
    }

    pub fn sessions(&self) -> &InMemorySessionStore {
        &self.sessions
    }

    fn build_request(&self, messages: Vec<Message>) -> CompletionRequest {
        CompletionRequest {
            model: self.definition.model.clone(),
            messages,
            system: Some(self.definition.description.clone()),
            max_tokens: self.definition.max_tokens.unwrap_or(self.default_max_tokens),
            temperature: self.definition.temperature,
            stream: true,
        }
    }
}

impl AgentRunner for LlmAgentRunner {
    fn create_session(
        &self,
        session_id: SessionId,
        app_name: &str,
        user: &UserIdentity,
    ) -> impl std::future::Future<Output = Result<Session, RunnerError>> + Send {
        let result = self.sessions.create(session_id, app_name, user);
        async move { result }
    }

    fn run(&self, session: &Session, message: UserMessage) -> RunnerEventStream {
        let sessions = Arc::clone(&self.sessions);
        let provider = Arc::clone(&self.provider);
        let session_id = session.id.clone();
        let user_text = message.text();

        let history = self.sessions.history(&session_id);
        let request = history.map(|mut messages| {
            messages.push(Message::user(user_text.clone()));
            self.build_request(messages)
        });

        let span = info_span!(
            "gen_ai.agent.run",
            gen_ai.agent.name = %self.definition.name,
            gen_ai.system = provider.name(),
            gen_ai.request.model = %self.definition.model,
            session.id = %session_id,
        );

        let stream: RunnerEventStream = Box::pin(async_stream::try_stream! {
            let request = request?;
            let mut events = provider.stream(request);
            let mut reply = String::new();

            while let Some(event) = events.next().await {
                match event? {
                    StreamEvent::TextDelta { text, .. } => {
                        reply.push_str(&text);
                        yield RunnerEvent::model_text(text);
                    }
                    StreamEvent::MessageDelta { stop_reason } => {
                        debug!(%stop_reason, "model finished");
                    }
                    StreamEvent::Usage(usage) => {
                        debug!(
                            gen_ai.usage.input_tokens = usage.input_tokens,
                            gen_ai.usage.output_tokens = usage.output_tokens,
                            "token usage"
                        );
                    }
                    StreamEvent::Connected | StreamEvent::Done => {}
                }
            }

            sessions.append(&session_id, Message::user(user_text))?;
            sessions.append(&session_id, Message::assistant(reply.clone()))?;
            yield RunnerEvent::agent_output(reply);
        });

        Box::pin(StreamInSpan::new(stream, span))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use agenthub_types::llm::{LlmError, StopReason};
    use crate::llm::provider::{LlmEventStream, LlmProvider};

    struct ScriptedProvider {
        deltas: Vec<&'static str>,
        fail_after: Option<usize>,
        seen: Arc<Mutex<Vec<CompletionRequest>>>,
    }

    impl ScriptedProvider {
        fn new(deltas: Vec<&'static str>) -> Self {
            Self {
                deltas,
                fail_after: None,
                seen: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    impl LlmProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        fn stream(&self, request: CompletionRequest) -> LlmEventStream {
            self.seen.lock().unwrap().push(request);
            let deltas = self.deltas.clone();
            let fail_after = self.fail_after;
            Box::pin(async_stream::stream! {
                yield Ok(StreamEvent::Connected);
                for (i, text) in deltas.into_iter().enumerate() {
                    if fail_after == Some(i) {
                        yield Err(LlmError::Stream("connection reset".to_string()));
                        return;
                    }
                    yield Ok(StreamEvent::TextDelta { index: 0, text: text.to_string() });
                }
                yield Ok(StreamEvent::MessageDelta { stop_reason: StopReason::EndTurn });
                yield Ok(StreamEvent::Done);
            })
        }
    }

    fn definition() -> AgentDefinition {
        AgentDefinition {
            name: "Helper".to_string(),
            model: "gpt-4o-mini".to_string(),
            description: "You are terse.".to_string(),
            max_tokens: None,
            temperature: Some(0.2),
        }
    }

    async fn collect(stream: RunnerEventStream) -> Vec<Result<RunnerEvent, RunnerError>> {
        stream.collect().await
    }

    #[tokio::test]
    async fn test_run_emits_deltas_then_agent_state() {
        let provider = ScriptedProvider::new(vec!["Hel", "lo"]);
        let seen = Arc::clone(&provider.seen);
        let runner = LlmAgentRunner::new(definition(), BoxLlmProvider::new(provider), 1024);

        let session = runner
            .create_session(SessionId::generate(), "AgentHub", &UserIdentity::new("alice"))
            .await
            .unwrap();
        let events = collect(runner.run(&session, UserMessage::new("Say hello"))).await;
        let events: Vec<RunnerEvent> = events.into_iter().map(Result::unwrap).collect();

        assert_eq!(
            events,
            vec![
                RunnerEvent::model_text("Hel"),
                RunnerEvent::model_text("lo"),
                RunnerEvent::agent_output("Hello"),
            ]
        );

        let requests = seen.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].system.as_deref(), Some("You are terse."));
        assert_eq!(requests[0].max_tokens, 1024);
        assert_eq!(requests[0].temperature, Some(0.2));
        assert_eq!(requests[0].messages, vec![Message::user("Say hello")]);
    }

    #[tokio::test]
    async fn test_run_records_history_in_session() {
        let runner = LlmAgentRunner::new(
            definition(),
            BoxLlmProvider::new(ScriptedProvider::new(vec!["ok"])),
            1024,
        );
        let session = runner
            .create_session(SessionId::generate(), "AgentHub", &UserIdentity::new("alice"))
            .await
            .unwrap();

        let _ = collect(runner.run(&session, UserMessage::new("ping"))).await;

        let history = runner.sessions().history(&session.id).unwrap();
        assert_eq!(history, vec![Message::user("ping"), Message::assistant("ok")]);
    }

    #[tokio::test]
    async fn test_run_unknown_session_yields_error() {
        let runner = LlmAgentRunner::new(
            definition(),
            BoxLlmProvider::new(ScriptedProvider::new(vec!["ok"])),
            1024,
        );
        let stray = Session {
            id: SessionId::generate(),
            app_name: "AgentHub".to_string(),
            user: UserIdentity::new("alice"),
            created_at: chrono::Utc::now(),
        };

        let events = collect(runner.run(&stray, UserMessage::new("ping"))).await;
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], Err(RunnerError::SessionNotFound(_))));
    }

    #[tokio::test]
    async fn test_run_propagates_provider_error() {
        let mut provider = ScriptedProvider::new(vec!["a", "b"]);
        provider.fail_after = Some(1);
        let runner = LlmAgentRunner::new(definition(), BoxLlmProvider::new(provider), 1024);
        let session = runner
            .create_session(SessionId::generate(), "AgentHub", &UserIdentity::new("alice"))
            .await
            .unwrap();

        let events = collect(runner.run(&session, UserMessage::new("x"))).await;
        assert_eq!(events.len(), 2);
        assert!(events[0].is_ok());
        assert!(matches!(events[1], Err(RunnerError::Llm(LlmError::Stream(_)))));
    }

    #[tokio::test]
    async fn test_create_session_rejects_duplicate() {
        let runner = LlmAgentRunner::new(
            definition(),
            BoxLlmProvider::new(ScriptedProvider::new(vec![])),
            1024,
        );
        let id = SessionId::generate();
        let user = UserIdentity::new("alice");
        runner.create_session(id.clone(), "AgentHub", &user).await.unwrap();
        assert!(runner.create_session(id, "AgentHub", &user).await.is_err());
    }
}
