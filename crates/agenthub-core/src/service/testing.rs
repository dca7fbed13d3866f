//! In-memory repositories and an echo runner for service tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use agenthub_types::agent::{Agent, AgentRun, UserIdentity};
use agenthub_types::error::RepositoryError;
use agenthub_types::id::{AgentId, PromptId, ToolId};
use agenthub_types::library::{Prompt, Tool};
use agenthub_types::runner::{RunnerError, RunnerEvent, Session, SessionId, UserMessage};

use crate::repository::agent::AgentRepository;
use crate::repository::prompt::PromptRepository;
use crate::repository::run::AgentRunRepository;
use crate::repository::tool::ToolRepository;
use crate::runner::{AgentDefinition, AgentRunner, RunnerEventStream, RunnerFactory};

#[derive(Clone, Default)]
pub struct MemoryPromptRepo(pub Arc<Mutex<HashMap<PromptId, Prompt>>>);

impl PromptRepository for MemoryPromptRepo {
    fn create(
        &self,
        prompt: &Prompt,
    ) -> impl std::future::Future<Output = Result<Prompt, RepositoryError>> + Send {
        self.0
            .lock()
            .unwrap()
            .insert(prompt.id.clone(), prompt.clone());
        let prompt = prompt.clone();
        async move { Ok(prompt) }
    }

    fn get_by_id(
        &self,
        id: &PromptId,
    ) -> impl std::future::Future<Output = Result<Option<Prompt>, RepositoryError>> + Send {
        let found = self.0.lock().unwrap().get(id).cloned();
        async move { Ok(found) }
    }

    fn update(
        &self,
        prompt: &Prompt,
    ) -> impl std::future::Future<Output = Result<Prompt, RepositoryError>> + Send {
        let mut prompts = self.0.lock().unwrap();
        let result = match prompts.get_mut(&prompt.id) {
            Some(slot) => {
                *slot = prompt.clone();
                Ok(prompt.clone())
            }
            None => Err(RepositoryError::NotFound),
        };
        async move { result }
    }

    fn delete(
        &self,
        id: &PromptId,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send {
        let removed = self.0.lock().unwrap().remove(id);
        async move { removed.map(|_| ()).ok_or(RepositoryError::NotFound) }
    }
}

#[derive(Clone, Default)]
pub struct MemoryToolRepo(pub Arc<Mutex<HashMap<ToolId, Tool>>>);

impl ToolRepository for MemoryToolRepo {
    fn create(
        &self,
        tool: &Tool,
    ) -> impl std::future::Future<Output = Result<Tool, RepositoryError>> + Send {
        self.0.lock().unwrap().insert(tool.id.clone(), tool.clone());
        let tool = tool.clone();
        async move { Ok(tool) }
    }

    fn get_by_id(
        &self,
        id: &ToolId,
    ) -> impl std::future::Future<Output = Result<Option<Tool>, RepositoryError>> + Send {
        let found = self.0.lock().unwrap().get(id).cloned();
        async move { Ok(found) }
    }

    fn update(
        &self,
        tool: &Tool,
    ) -> impl std::future::Future<Output = Result<Tool, RepositoryError>> + Send {
        let mut tools = self.0.lock().unwrap();
        let result = match tools.get_mut(&tool.id) {
            Some(slot) => {
                *slot = tool.clone();
                Ok(tool.clone())
            }
            None => Err(RepositoryError::NotFound),
        };
        async move { result }
    }

    fn delete(
        &self,
        id: &ToolId,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send {
        let removed = self.0.lock().unwrap().remove(id);
        async move { removed.map(|_| ()).ok_or(RepositoryError::NotFound) }
    }
}

#[derive(Clone, Default)]
pub struct MemoryAgentRepo(pub Arc<Mutex<HashMap<AgentId, Agent>>>);

impl AgentRepository for MemoryAgentRepo {
    fn create(
        &self,
        agent: &Agent,
    ) -> impl std::future::Future<Output = Result<Agent, RepositoryError>> + Send {
        self.0.lock().unwrap().insert(agent.id.clone(), agent.clone());
        let agent = agent.clone();
        async move { Ok(agent) }
    }

    fn get_by_id(
        &self,
        id: &AgentId,
    ) -> impl std::future::Future<Output = Result<Option<Agent>, RepositoryError>> + Send {
        let found = self.0.lock().unwrap().get(id).cloned();
        async move { Ok(found) }
    }

    fn update(
        &self,
        agent: &Agent,
    ) -> impl std::future::Future<Output = Result<Agent, RepositoryError>> + Send {
        let mut agents = self.0.lock().unwrap();
        let result = match agents.get_mut(&agent.id) {
            Some(slot) => {
                *slot = agent.clone();
                Ok(agent.clone())
            }
            None => Err(RepositoryError::NotFound),
        };
        async move { result }
    }

    fn delete(
        &self,
        id: &AgentId,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send {
        let removed = self.0.lock().unwrap().remove(id);
        async move { removed.map(|_| ()).ok_or(RepositoryError::NotFound) }
    }
}

#[derive(Clone, Default)]
pub struct MemoryRunRepo(pub Arc<Mutex<Vec<AgentRun>>>);

impl AgentRunRepository for MemoryRunRepo {
    fn record(
        &self,
        run: &AgentRun,
    ) -> impl std::future::Future<Output = Result<AgentRun, RepositoryError>> + Send {
        self.0.lock().unwrap().push(run.clone());
        let run = run.clone();
        async move { Ok(run) }
    }

    fn list_by_agent(
        &self,
        agent_id: &AgentId,
        limit: i64,
    ) -> impl std::future::Future<Output = Result<Vec<AgentRun>, RepositoryError>> + Send {
        let mut runs: Vec<AgentRun> = self
            .0
            .lock()
            .unwrap()
            .iter()
            .filter(|run| &run.agent_id == agent_id)
            .cloned()
            .collect();
        runs.reverse();
        runs.truncate(usize::try_from(limit).unwrap_or(0));
        async move { Ok(runs) }
    }
}

/// What an [`EchoRunner`] saw during one execution.
#[derive(Debug, Clone)]
pub struct EchoCall {
    pub definition: AgentDefinition,
    pub user: UserIdentity,
    pub message: String,
}

/// Runner factory whose runners reply with the submitted message text.
#[derive(Clone, Default)]
pub struct EchoFactory {
    pub calls: Arc<Mutex<Vec<EchoCall>>>,
    /// When set, every run fails with this stream error.
    pub fail_with: Option<String>,
}

impl EchoFactory {
    pub fn calls(&self) -> Vec<EchoCall> {
        self.calls.lock().unwrap().clone()
    }
}

pub struct EchoRunner {
    definition: AgentDefinition,
    calls: Arc<Mutex<Vec<EchoCall>>>,
    fail_with: Option<String>,
}

impl AgentRunner for EchoRunner {
    fn create_session(
        &self,
        session_id: SessionId,
        app_name: &str,
        user: &UserIdentity,
    ) -> impl std::future::Future<Output = Result<Session, RunnerError>> + Send {
        let session = Session {
            id: session_id,
            app_name: app_name.to_string(),
            user: user.clone(),
            created_at: chrono::Utc::now(),
        };
        async move { Ok(session) }
    }

    fn run(&self, session: &Session, message: UserMessage) -> RunnerEventStream {
        let text = message.text();
        self.calls.lock().unwrap().push(EchoCall {
            definition: self.definition.clone(),
            user: session.user.clone(),
            message: text.clone(),
        });
        let fail_with = self.fail_with.clone();
        Box::pin(async_stream::stream! {
            match fail_with {
                Some(reason) => yield Err(RunnerError::Setup(reason)),
                None => yield Ok(RunnerEvent::content_text(text)),
            }
        })
    }
}

impl RunnerFactory for EchoFactory {
    type Runner = EchoRunner;

    fn build(&self, definition: AgentDefinition) -> Result<EchoRunner, RunnerError> {
        Ok(EchoRunner {
            definition,
            calls: Arc::clone(&self.calls),
            fail_with: self.fail_with.clone(),
        })
    }
}
