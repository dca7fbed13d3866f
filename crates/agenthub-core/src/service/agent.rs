//! Agent management and execution service.
//!
//! Orchestrates agent creation (including materializing embedded tools and
//! prompts into the library), ownership-checked updates, cloning, and
//! execution of both persisted agents and inline preview configurations.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use agenthub_types::agent::{
    Agent, AgentConfig, AgentPromptInput, AgentRun, AgentTestConfig, AgentToolInput,
    CreateAgentRequest, ExecutionResult, PromptFragment, RunStatus, ToolBinding, UserIdentity,
    Visibility,
};
use agenthub_types::error::{AgentError, RepositoryError};
use agenthub_types::id::{AgentId, PromptId, RunId, ToolId};
use agenthub_types::library::{Prompt, Tool};

use crate::agent::assembler::AgentAssembler;
use crate::agent::executor::AgentExecutor;
use crate::repository::agent::AgentRepository;
use crate::repository::prompt::PromptRepository;
use crate::repository::run::AgentRunRepository;
use crate::repository::tool::ToolRepository;
use crate::runner::RunnerFactory;

/// How a fragment referencing a missing library prompt is handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MissingPrompt {
    Fail,
    Skip,
}

/// Service orchestrating the agent lifecycle and agent runs.
///
/// Generic over repository and runner traits to maintain clean
/// architecture -- agenthub-core never depends on agenthub-infra.
pub struct AgentService<A, P, T, R, F>
where
    A: AgentRepository,
    P: PromptRepository,
    T: ToolRepository,
    R: AgentRunRepository,
    F: RunnerFactory,
{
    agents: A,
    prompts: P,
    tools: T,
    runs: R,
    executor: Arc<AgentExecutor<F>>,
}

impl<A, P, T, R, F> AgentService<A, P, T, R, F>
where
    A: AgentRepository,
    P: PromptRepository,
    T: ToolRepository,
    R: AgentRunRepository,
    F: RunnerFactory,
{
    pub fn new(agents: A, prompts: P, tools: T, runs: R, executor: Arc<AgentExecutor<F>>) -> Self {
        Self {
            agents,
            prompts,
            tools,
            runs,
            executor,
        }
    }

    /// Create an agent owned by `owner`.
    ///
    /// Tools and prompts flagged `save_to_library` are first published as
    /// standalone library records and the embedded binding is linked to them.
    pub async fn create_agent(
        &self,
        owner: &UserIdentity,
        request: CreateAgentRequest,
    ) -> Result<Agent, AgentError> {
        let config = validate_config(request.config)?;
        let tools = self.materialize_tools(owner, &config, request.tools).await?;
        let prompts = self
            .materialize_prompts(owner, &config, request.prompts)
            .await?;

        let now = chrono::Utc::now();
        let agent = Agent {
            id: AgentId::new(),
            config,
            description: request.description,
            instructions: request.instructions,
            visibility: request.visibility.unwrap_or_default(),
            tools,
            prompts,
            created_by: owner.clone(),
            created_at: now,
            updated_at: now,
        };

        let agent = self.agents.create(&agent).await?;
        info!(agent.id = %agent.id, owner = %owner, "agent created");
        Ok(agent)
    }

    pub async fn get_agent(&self, id: &AgentId) -> Result<Agent, AgentError> {
        self.agents
            .get_by_id(id)
            .await?
            .ok_or_else(|| AgentError::AgentNotFound(id.clone()))
    }

    /// Fetch an agent on behalf of `identity`, hiding other users' private agents.
    pub async fn view_agent(
        &self,
        id: &AgentId,
        identity: &UserIdentity,
    ) -> Result<Agent, AgentError> {
        let agent = self.get_agent(id).await?;
        ensure_visible(&agent, identity)?;
        Ok(agent)
    }

    /// Replace an agent's configuration and bindings. Owner only.
    pub async fn update_agent(
        &self,
        id: &AgentId,
        owner: &UserIdentity,
        request: CreateAgentRequest,
    ) -> Result<Agent, AgentError> {
        let existing = self.get_agent(id).await?;
        ensure_owner(&existing, owner)?;

        let config = validate_config(request.config)?;
        let tools = self.materialize_tools(owner, &config, request.tools).await?;
        let prompts = self
            .materialize_prompts(owner, &config, request.prompts)
            .await?;

        let agent = Agent {
            config,
            description: request.description,
            instructions: request.instructions,
            visibility: request.visibility.unwrap_or(existing.visibility.clone()),
            tools,
            prompts,
            updated_at: chrono::Utc::now(),
            ..existing
        };

        let agent = self.agents.update(&agent).await.map_err(|e| match e {
            RepositoryError::NotFound => AgentError::AgentNotFound(id.clone()),
            other => AgentError::Storage(other),
        })?;
        info!(agent.id = %agent.id, "agent updated");
        Ok(agent)
    }

    /// Delete an agent and its bindings. Owner only.
    pub async fn delete_agent(&self, id: &AgentId, owner: &UserIdentity) -> Result<(), AgentError> {
        let existing = self.get_agent(id).await?;
        ensure_owner(&existing, owner)?;

        self.agents.delete(id).await.map_err(|e| match e {
            RepositoryError::NotFound => AgentError::AgentNotFound(id.clone()),
            other => AgentError::Storage(other),
        })?;
        info!(agent.id = %id, "agent deleted");
        Ok(())
    }

    /// Copy an agent for `owner`: new id, `"{title} (Clone)"`, private.
    ///
    /// Bindings are copied as-is, so cloned tools and prompts keep pointing at
    /// the same library records.
    pub async fn clone_agent(
        &self,
        source_id: &AgentId,
        owner: &UserIdentity,
    ) -> Result<Agent, AgentError> {
        let source = self.get_agent(source_id).await?;
        ensure_visible(&source, owner)?;

        let now = chrono::Utc::now();
        let clone = Agent {
            id: AgentId::new(),
            config: AgentConfig {
                title: format!("{} (Clone)", source.config.title),
                ..source.config
            },
            visibility: Visibility::Private,
            created_by: owner.clone(),
            created_at: now,
            updated_at: now,
            ..source
        };

        let clone = self.agents.create(&clone).await?;
        info!(source.id = %source_id, agent.id = %clone.id, "agent cloned");
        Ok(clone)
    }

    /// Recent runs of an agent, newest first.
    pub async fn list_runs(
        &self,
        id: &AgentId,
        identity: &UserIdentity,
        limit: i64,
    ) -> Result<Vec<AgentRun>, AgentError> {
        let agent = self.get_agent(id).await?;
        ensure_visible(&agent, identity)?;
        Ok(self.runs.list_by_agent(id, limit.clamp(1, 100)).await?)
    }

    /// Run a persisted agent for one turn and record the outcome.
    ///
    /// Every library prompt the agent references must still exist.
    pub async fn run_agent(
        &self,
        id: &AgentId,
        input: &str,
        identity: &UserIdentity,
        cancel: &CancellationToken,
    ) -> Result<ExecutionResult, AgentError> {
        let agent = self.get_agent(id).await?;
        ensure_visible(&agent, identity)?;

        let fragments = self
            .dereference_prompts(&agent.prompts, MissingPrompt::Fail)
            .await?;
        let resolved = AgentAssembler::resolve(&agent.config, &fragments);

        let outcome = self
            .executor
            .execute_with(
                &resolved,
                &agent.config,
                input,
                identity,
                self.executor.policy(),
                cancel,
            )
            .await;

        let (status, output, error) = match &outcome {
            Ok(output) => (RunStatus::Completed, Some(output.clone()), None),
            Err(e) => (RunStatus::Failed, None, Some(e.to_string())),
        };
        let run = AgentRun {
            id: RunId::new(),
            agent_id: agent.id.clone(),
            user_id: identity.clone(),
            input: input.to_string(),
            output,
            status,
            error,
            created_at: chrono::Utc::now(),
        };
        if let Err(e) = self.runs.record(&run).await {
            warn!(agent.id = %agent.id, error = %e, "failed to record agent run");
        }

        let output = outcome?;
        Ok(ExecutionResult::new(Some(agent.id), agent.config.title, output))
    }

    /// Run an inline, unsaved configuration for one turn.
    ///
    /// Library prompts that no longer exist are skipped.
    pub async fn test_agent(
        &self,
        config: AgentTestConfig,
        input: &str,
        identity: &UserIdentity,
        cancel: &CancellationToken,
    ) -> Result<ExecutionResult, AgentError> {
        let fragments = self
            .dereference_prompts(&config.prompts, MissingPrompt::Skip)
            .await?;
        let resolved = AgentAssembler::resolve(&config.agent, &fragments);

        let output = self
            .executor
            .execute_with(
                &resolved,
                &config.agent,
                input,
                identity,
                self.executor.policy(),
                cancel,
            )
            .await?;
        Ok(ExecutionResult::new(None, config.agent.title, output))
    }

    /// Substitute library content into fragments that reference a prompt by id.
    async fn dereference_prompts(
        &self,
        fragments: &[PromptFragment],
        missing: MissingPrompt,
    ) -> Result<Vec<PromptFragment>, AgentError> {
        let mut resolved = Vec::with_capacity(fragments.len());
        for fragment in fragments {
            let prompt_id = match &fragment.prompt_id {
                Some(id) if fragment.needs_library_content() => id,
                _ => {
                    resolved.push(fragment.clone());
                    continue;
                }
            };

            match self.prompts.get_by_id(prompt_id).await? {
                Some(prompt) => resolved.push(PromptFragment {
                    content: Some(prompt.content),
                    ..fragment.clone()
                }),
                None if missing == MissingPrompt::Skip => {
                    warn!(prompt.id = %prompt_id, "skipping fragment with unknown library prompt");
                }
                None => return Err(AgentError::PromptNotFound(prompt_id.clone())),
            }
        }
        Ok(resolved)
    }

    async fn materialize_tools(
        &self,
        owner: &UserIdentity,
        config: &AgentConfig,
        inputs: Vec<AgentToolInput>,
    ) -> Result<Vec<ToolBinding>, AgentError> {
        let mut bindings = Vec::with_capacity(inputs.len());
        for input in inputs {
            let mut binding = input.binding;
            if input.save_to_library && binding.tool_id.is_none() {
                let tool = Tool {
                    id: ToolId::new(),
                    title: binding.name.clone(),
                    description: binding.description.clone(),
                    content: binding.code.clone(),
                    tags: config.tags.clone(),
                    language: None,
                    version: None,
                    recommended_model: None,
                    created_by: owner.clone(),
                    created_at: chrono::Utc::now(),
                };
                let tool = self.tools.create(&tool).await?;
                info!(tool.id = %tool.id, tool.name = %binding.name, "tool saved to library");
                binding.tool_id = Some(tool.id);
            }
            bindings.push(binding);
        }
        Ok(bindings)
    }

    async fn materialize_prompts(
        &self,
        owner: &UserIdentity,
        config: &AgentConfig,
        inputs: Vec<AgentPromptInput>,
    ) -> Result<Vec<PromptFragment>, AgentError> {
        let mut fragments = Vec::with_capacity(inputs.len());
        for input in inputs {
            let mut fragment = input.fragment;
            let saveable = input.save_to_library && fragment.prompt_id.is_none();
            let content = fragment
                .content
                .clone()
                .filter(|c| saveable && !c.trim().is_empty());
            if let Some(content) = content {
                let prompt = Prompt {
                    id: PromptId::new(),
                    title: format!("Prompt from {}", config.title),
                    description: Some(format!("Automated prompt extraction from {}", config.title)),
                    content,
                    tags: config.tags.clone(),
                    category: None,
                    recommended_model: None,
                    created_by: owner.clone(),
                    created_at: chrono::Utc::now(),
                };
                let prompt = self.prompts.create(&prompt).await?;
                info!(prompt.id = %prompt.id, "prompt saved to library");
                fragment.prompt_id = Some(prompt.id);
            }
            fragments.push(fragment);
        }
        Ok(fragments)
    }
}

fn validate_config(mut config: AgentConfig) -> Result<AgentConfig, AgentError> {
    config.title = config.title.trim().to_string();
    if config.title.is_empty() {
        return Err(AgentError::Validation("title cannot be empty".to_string()));
    }
    if config.max_tokens == Some(0) {
        return Err(AgentError::Validation(
            "max_tokens must be greater than zero".to_string(),
        ));
    }
    if let Some(temperature) = config.temperature {
        if !(0.0..=2.0).contains(&temperature) {
            return Err(AgentError::Validation(format!(
                "temperature must be between 0 and 2, got {temperature}"
            )));
        }
    }
    Ok(config)
}

fn ensure_owner(agent: &Agent, identity: &UserIdentity) -> Result<(), AgentError> {
    if &agent.created_by == identity {
        Ok(())
    } else {
        Err(AgentError::Forbidden(agent.id.clone()))
    }
}

/// Private agents are visible to their owner only.
fn ensure_visible(agent: &Agent, identity: &UserIdentity) -> Result<(), AgentError> {
    match agent.visibility {
        Visibility::Private => ensure_owner(agent, identity),
        Visibility::Public | Visibility::Unlisted => Ok(()),
    }
}
