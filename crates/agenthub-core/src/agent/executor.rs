//! Agent execution adapter.
//!
//! Drives one conversational turn through a request-scoped runner and reduces
//! the runner's event stream to a single output string.

use std::time::Duration;

use futures_util::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span, warn};

use agenthub_types::agent::{AgentConfig, NO_OUTPUT, ResolvedAgent, UserIdentity};
use agenthub_types::config::GlobalConfig;
use agenthub_types::runner::{
    ExecutionError, OutputPolicy, RunnerError, RunnerEvent, SessionId, UserMessage,
};

use crate::runner::{AgentDefinition, AgentRunner, RunnerFactory};

/// Executes resolved agents through runners built by `F`.
pub struct AgentExecutor<F: RunnerFactory> {
    factory: F,
    app_name: String,
    default_model: String,
    policy: OutputPolicy,
    timeout: Duration,
}

impl<F: RunnerFactory> AgentExecutor<F> {
    pub fn new(factory: F, config: &GlobalConfig) -> Self {
        Self {
            factory,
            app_name: config.app_name.clone(),
            default_model: config.default_model.clone(),
            policy: config.output_policy,
            timeout: config.execution_timeout(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_policy(mut self, policy: OutputPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> OutputPolicy {
        self.policy
    }

    /// Run `input` against `resolved` with the configured output policy.
    pub async fn execute(
        &self,
        resolved: &ResolvedAgent,
        config: &AgentConfig,
        input: &str,
        identity: &UserIdentity,
    ) -> Result<String, ExecutionError> {
        self.execute_with(
            resolved,
            config,
            input,
            identity,
            self.policy,
            &CancellationToken::new(),
        )
        .await
    }

    /// Run one turn with an explicit policy and cancellation token.
    ///
    /// The timeout covers runner construction, session creation, and stream
    /// consumption. Returns [`NO_OUTPUT`] when the stream carried no text.
    pub async fn execute_with(
        &self,
        resolved: &ResolvedAgent,
        config: &AgentConfig,
        input: &str,
        identity: &UserIdentity,
        policy: OutputPolicy,
        cancel: &CancellationToken,
    ) -> Result<String, ExecutionError> {
        let definition = AgentDefinition {
            name: resolved.sanitized_name.clone(),
            model: config.model_or(&self.default_model).to_string(),
            description: resolved.full_system_prompt.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        };

        let span = info_span!(
            "agent.execute",
            gen_ai.agent.name = %definition.name,
            gen_ai.request.model = %definition.model,
            user.id = %identity,
            output_policy = %policy,
        );

        let timeout_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX);
        let turn = self.run_turn(definition, input, identity, policy);

        let result = async {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(ExecutionError::Cancelled),
                outcome = tokio::time::timeout(self.timeout, turn) => {
                    outcome.unwrap_or(Err(ExecutionError::TimedOut { after_ms: timeout_ms }))
                }
            }
        }
        .instrument(span.clone())
        .await;

        span.in_scope(|| match &result {
            Ok(output) => info!(output_len = output.len(), "agent execution completed"),
            Err(e) => warn!(error = %e, "agent execution failed"),
        });
        result
    }

    async fn run_turn(
        &self,
        definition: AgentDefinition,
        input: &str,
        identity: &UserIdentity,
        policy: OutputPolicy,
    ) -> Result<String, ExecutionError> {
        let runner = self
            .factory
            .build(definition)
            .map_err(ExecutionError::SessionCreation)?;

        let session = runner
            .create_session(SessionId::generate(), &self.app_name, identity)
            .await
            .map_err(ExecutionError::SessionCreation)?;
        debug!(session.id = %session.id, "session created");

        let events = runner.run(&session, UserMessage::new(input));
        reduce_events(events, policy).await
    }
}

/// Reduce an ordered event stream to one output string.
///
/// A non-empty `agent_state.output` is authoritative: it replaces anything
/// collected so far and ends consumption. Otherwise part text is combined per
/// `policy`. An empty result becomes [`NO_OUTPUT`]; whitespace is kept.
pub async fn reduce_events<S>(events: S, policy: OutputPolicy) -> Result<String, ExecutionError>
where
    S: Stream<Item = Result<RunnerEvent, RunnerError>>,
{
    let mut events = std::pin::pin!(events);
    let mut collected = String::new();
    let mut consumed = 0usize;

    while let Some(event) = events.next().await {
        let event = event.map_err(ExecutionError::Stream)?;
        consumed += 1;

        if let Some(output) = event.authoritative_output() {
            debug!(consumed, "agent state output received");
            return Ok(output.to_string());
        }

        if let Some(text) = event.part_text() {
            match policy {
                OutputPolicy::Accumulate => collected.push_str(&text),
                OutputPolicy::LastBlock if !text.is_empty() => collected = text,
                OutputPolicy::LastBlock => {}
            }
        }
    }

    debug!(consumed, "event stream exhausted");
    if collected.is_empty() {
        Ok(NO_OUTPUT.to_string())
    } else {
        Ok(collected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use agenthub_types::llm::LlmError;
    use agenthub_types::runner::Session;
    use futures_util::stream;

    use crate::runner::RunnerEventStream;

    #[derive(Clone, Default)]
    struct Script {
        events: Vec<Result<RunnerEvent, String>>,
        fail_build: bool,
        fail_session: bool,
        /// Delay before each event.
        delay: Option<Duration>,
    }

    #[derive(Default)]
    struct Recorded {
        definitions: Vec<AgentDefinition>,
        sessions: Vec<Session>,
        messages: Vec<UserMessage>,
    }

    struct ScriptedRunner {
        script: Script,
        recorded: Arc<Mutex<Recorded>>,
    }

    impl AgentRunner for ScriptedRunner {
        fn create_session(
            &self,
            session_id: SessionId,
            app_name: &str,
            user: &UserIdentity,
        ) -> impl std::future::Future<Output = Result<Session, RunnerError>> + Send {
            let result = if self.script.fail_session {
                Err(RunnerError::Setup("store unavailable".to_string()))
            } else {
                let session = Session {
                    id: session_id,
                    app_name: app_name.to_string(),
                    user: user.clone(),
                    created_at: chrono::Utc::now(),
                };
                self.recorded.lock().unwrap().sessions.push(session.clone());
                Ok(session)
            };
            async move { result }
        }

        fn run(&self, _session: &Session, message: UserMessage) -> RunnerEventStream {
            self.recorded.lock().unwrap().messages.push(message);
            let script = self.script.clone();
            Box::pin(async_stream::stream! {
                for event in script.events {
                    if let Some(delay) = script.delay {
                        tokio::time::sleep(delay).await;
                    }
                    yield event.map_err(|e| RunnerError::Llm(LlmError::Stream(e)));
                }
            })
        }
    }

    struct ScriptedFactory {
        script: Script,
        recorded: Arc<Mutex<Recorded>>,
    }

    impl ScriptedFactory {
        fn new(script: Script) -> Self {
            Self {
                script,
                recorded: Arc::new(Mutex::new(Recorded::default())),
            }
        }
    }

    impl RunnerFactory for ScriptedFactory {
        type Runner = ScriptedRunner;

        fn build(&self, definition: AgentDefinition) -> Result<ScriptedRunner, RunnerError> {
            if self.script.fail_build {
                return Err(RunnerError::Setup("unknown provider".to_string()));
            }
            self.recorded.lock().unwrap().definitions.push(definition);
            Ok(ScriptedRunner {
                script: self.script.clone(),
                recorded: Arc::clone(&self.recorded),
            })
        }
    }

    fn executor(script: Script) -> (AgentExecutor<ScriptedFactory>, Arc<Mutex<Recorded>>) {
        let factory = ScriptedFactory::new(script);
        let recorded = Arc::clone(&factory.recorded);
        (AgentExecutor::new(factory, &GlobalConfig::default()), recorded)
    }

    fn resolved() -> ResolvedAgent {
        ResolvedAgent {
            sanitized_name: "My_Agent".to_string(),
            full_system_prompt: "Be helpful.".to_string(),
        }
    }

    fn agent_config() -> AgentConfig {
        AgentConfig {
            title: "My Agent".to_string(),
            ..Default::default()
        }
    }

    async fn run(executor: &AgentExecutor<ScriptedFactory>) -> Result<String, ExecutionError> {
        executor
            .execute(&resolved(), &agent_config(), "hello", &UserIdentity::new("alice"))
            .await
    }

    #[tokio::test]
    async fn test_zero_events_yields_no_output() {
        let (executor, _) = executor(Script::default());
        assert_eq!(run(&executor).await.unwrap(), NO_OUTPUT);
    }

    #[tokio::test]
    async fn test_agent_state_short_circuits() {
        let (executor, _) = executor(Script {
            events: vec![
                Ok(RunnerEvent::agent_output("X")),
                Ok(RunnerEvent::content_text("Y")),
            ],
            ..Default::default()
        });
        assert_eq!(run(&executor).await.unwrap(), "X");
    }

    #[tokio::test]
    async fn test_agent_state_replaces_collected_text() {
        let (executor, _) = executor(Script {
            events: vec![
                Ok(RunnerEvent::model_text("partial ")),
                Ok(RunnerEvent::agent_output("final")),
                Ok(RunnerEvent::content_text("ignored")),
            ],
            ..Default::default()
        });
        assert_eq!(run(&executor).await.unwrap(), "final");
    }

    #[tokio::test]
    async fn test_accumulate_concatenates_in_order() {
        let (executor, _) = executor(Script {
            events: vec![
                Ok(RunnerEvent::model_text("Hello")),
                Ok(RunnerEvent::content_text(", ")),
                Ok(RunnerEvent::model_text("world")),
            ],
            ..Default::default()
        });
        assert_eq!(run(&executor).await.unwrap(), "Hello, world");
    }

    #[tokio::test]
    async fn test_last_block_keeps_latest_text() {
        let (executor, _) = executor(Script {
            events: vec![
                Ok(RunnerEvent::content_text("draft")),
                Ok(RunnerEvent::content_text("final answer")),
                Ok(RunnerEvent::Content { parts: vec![] }),
            ],
            ..Default::default()
        });
        let executor = executor.with_policy(OutputPolicy::LastBlock);
        assert_eq!(run(&executor).await.unwrap(), "final answer");
    }

    #[tokio::test]
    async fn test_empty_agent_state_output_is_not_authoritative() {
        let (executor, _) = executor(Script {
            events: vec![
                Ok(RunnerEvent::agent_output("")),
                Ok(RunnerEvent::content_text("fallback")),
            ],
            ..Default::default()
        });
        assert_eq!(run(&executor).await.unwrap(), "fallback");
    }

    #[tokio::test]
    async fn test_whitespace_only_text_is_returned_as_is() {
        let (executor, _) = executor(Script {
            events: vec![Ok(RunnerEvent::content_text("  \n"))],
            ..Default::default()
        });
        assert_eq!(run(&executor).await.unwrap(), "  \n");
    }

    #[tokio::test]
    async fn test_empty_text_parts_are_no_output() {
        let (executor, _) = executor(Script {
            events: vec![
                Ok(RunnerEvent::content_text("")),
                Ok(RunnerEvent::content_text("")),
            ],
            ..Default::default()
        });
        assert_eq!(run(&executor).await.unwrap(), NO_OUTPUT);
    }

    #[tokio::test]
    async fn test_stream_error_wraps_cause() {
        let (executor, _) = executor(Script {
            events: vec![
                Ok(RunnerEvent::model_text("partial")),
                Err("connection reset".to_string()),
            ],
            ..Default::default()
        });
        let err = run(&executor).await.unwrap_err();
        assert!(matches!(err, ExecutionError::Stream(_)));
        assert!(err.to_string().contains("connection reset"));
    }

    #[tokio::test]
    async fn test_session_failure_is_session_creation_error() {
        let (executor, _) = executor(Script {
            fail_session: true,
            ..Default::default()
        });
        let err = run(&executor).await.unwrap_err();
        assert!(matches!(err, ExecutionError::SessionCreation(RunnerError::Setup(_))));
    }

    #[tokio::test]
    async fn test_factory_failure_is_session_creation_error() {
        let (executor, _) = executor(Script {
            fail_build: true,
            ..Default::default()
        });
        let err = run(&executor).await.unwrap_err();
        assert!(matches!(err, ExecutionError::SessionCreation(_)));
    }

    #[tokio::test]
    async fn test_timeout() {
        let (executor, _) = executor(Script {
            events: vec![Ok(RunnerEvent::content_text("too late"))],
            delay: Some(Duration::from_secs(5)),
            ..Default::default()
        });
        let executor = executor.with_timeout(Duration::from_millis(50));
        let err = run(&executor).await.unwrap_err();
        assert!(matches!(err, ExecutionError::TimedOut { after_ms: 50 }));
    }

    #[tokio::test]
    async fn test_cancelled_before_completion() {
        let (executor, _) = executor(Script {
            events: vec![Ok(RunnerEvent::content_text("never"))],
            delay: Some(Duration::from_secs(5)),
            ..Default::default()
        });
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let err = executor
            .execute_with(
                &resolved(),
                &agent_config(),
                "hello",
                &UserIdentity::new("alice"),
                OutputPolicy::Accumulate,
                &cancel,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ExecutionError::Cancelled));
    }

    #[tokio::test]
    async fn test_runner_receives_definition_identity_and_message() {
        let (executor, recorded) = executor(Script::default());
        let config = AgentConfig {
            title: "My Agent".to_string(),
            max_tokens: Some(256),
            temperature: Some(0.3),
            ..Default::default()
        };
        executor
            .execute(&resolved(), &config, "What is Rust?", &UserIdentity::new("bob"))
            .await
            .unwrap();

        let recorded = recorded.lock().unwrap();
        let definition = &recorded.definitions[0];
        assert_eq!(definition.name, "My_Agent");
        assert_eq!(definition.model, "gpt-4o-mini");
        assert_eq!(definition.description, "Be helpful.");
        assert_eq!(definition.max_tokens, Some(256));
        assert_eq!(definition.temperature, Some(0.3));

        let session = &recorded.sessions[0];
        assert_eq!(session.user.as_str(), "bob");
        assert_eq!(session.app_name, "AgentHub");

        assert_eq!(recorded.messages, vec![UserMessage::new("What is Rust?")]);
    }

    #[tokio::test]
    async fn test_each_execution_gets_a_fresh_session() {
        let (executor, recorded) = executor(Script::default());
        run(&executor).await.unwrap();
        run(&executor).await.unwrap();

        let recorded = recorded.lock().unwrap();
        assert_eq!(recorded.definitions.len(), 2);
        assert_ne!(recorded.sessions[0].id, recorded.sessions[1].id);
    }

    #[tokio::test]
    async fn test_reduce_events_mapping_parts() {
        use agenthub_types::runner::Part;
        let events = stream::iter(vec![Ok(RunnerEvent::Content {
            parts: vec![
                Part::Data(serde_json::json!({"text": "from mapping"})),
                Part::Data(serde_json::json!({"image": "..."})),
            ],
        })]);
        let output = reduce_events(events, OutputPolicy::Accumulate).await.unwrap();
        assert_eq!(output, "from mapping");
    }
}
