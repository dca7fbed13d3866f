//! Tool-runner assistant.
//!
//! A fixed `tool_runner` agent that explains and simulates tools and writes
//! integration/setup documentation. Every call goes through the same
//! execution adapter as user agents, with a fresh session each time.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use agenthub_types::agent::{AgentConfig, ResolvedAgent, UserIdentity};
use agenthub_types::assist::{
    AgentInstructionsRequest, AssistOutput, InstallationStepsRequest, ToolInstructionRequest,
};
use agenthub_types::error::AgentError;
use agenthub_types::id::ToolId;
use agenthub_types::library::Tool;
use agenthub_types::runner::OutputPolicy;

use crate::agent::assembler::AgentAssembler;
use crate::agent::executor::AgentExecutor;
use crate::repository::tool::ToolRepository;
use crate::runner::RunnerFactory;

pub const TOOL_RUNNER_NAME: &str = "tool_runner";

pub const TOOL_RUNNER_DESCRIPTION: &str = "You are a helpful assistant that simulates and explains how tools work. \
When given code for a tool, you should:\n\
1. Analyze what the code does\n\
2. Explain its functionality clearly\n\
3. Show example output or simulate its behavior\n\
4. Be concise but informative\n\
\n\
Always provide a response explaining the tool.";

/// Where the tool for an integration guide comes from.
#[derive(Debug, Clone)]
pub enum ToolSource {
    Stored(ToolId),
    Inline(ToolInstructionRequest),
}

pub struct AssistService<T: ToolRepository, F: RunnerFactory> {
    tools: T,
    executor: Arc<AgentExecutor<F>>,
    config: AgentConfig,
    resolved: ResolvedAgent,
}

impl<T: ToolRepository, F: RunnerFactory> AssistService<T, F> {
    pub fn new(tools: T, executor: Arc<AgentExecutor<F>>) -> Self {
        let config = AgentConfig {
            title: TOOL_RUNNER_NAME.to_string(),
            system_prompt: TOOL_RUNNER_DESCRIPTION.to_string(),
            ..Default::default()
        };
        let resolved = AgentAssembler::resolve(&config, &[]);
        Self {
            tools,
            executor,
            config,
            resolved,
        }
    }

    /// Analyze and simulate a stored tool.
    pub async fn simulate_tool(
        &self,
        id: &ToolId,
        identity: &UserIdentity,
        cancel: &CancellationToken,
    ) -> Result<AssistOutput, AgentError> {
        let tool = self.load_tool(id).await?;
        let prompt = simulate_prompt(&tool);
        self.ask(&prompt, identity, self.executor.policy(), cancel).await
    }

    /// Integration guide for a stored or inline tool.
    ///
    /// Keeps only the final text block of the reply.
    pub async fn tool_integration_guide(
        &self,
        source: ToolSource,
        identity: &UserIdentity,
        cancel: &CancellationToken,
    ) -> Result<AssistOutput, AgentError> {
        let request = match source {
            ToolSource::Stored(id) => {
                let tool = self.load_tool(&id).await?;
                ToolInstructionRequest {
                    title: tool.title,
                    description: tool.description,
                    code: tool.content,
                }
            }
            ToolSource::Inline(request) => request,
        };
        let prompt = integration_guide_prompt(&request);
        let mut output = self
            .ask(&prompt, identity, OutputPolicy::LastBlock, cancel)
            .await?;
        output.output = output.output.trim().to_string();
        Ok(output)
    }

    pub async fn installation_steps(
        &self,
        request: &InstallationStepsRequest,
        identity: &UserIdentity,
        cancel: &CancellationToken,
    ) -> Result<AssistOutput, AgentError> {
        let prompt = installation_steps_prompt(request);
        self.ask(&prompt, identity, self.executor.policy(), cancel).await
    }

    pub async fn agent_instructions(
        &self,
        request: &AgentInstructionsRequest,
        identity: &UserIdentity,
        cancel: &CancellationToken,
    ) -> Result<AssistOutput, AgentError> {
        let prompt = agent_instructions_prompt(request);
        self.ask(&prompt, identity, self.executor.policy(), cancel).await
    }

    async fn load_tool(&self, id: &ToolId) -> Result<Tool, AgentError> {
        self.tools
            .get_by_id(id)
            .await?
            .ok_or_else(|| AgentError::ToolNotFound(id.clone()))
    }

    async fn ask(
        &self,
        prompt: &str,
        identity: &UserIdentity,
        policy: OutputPolicy,
        cancel: &CancellationToken,
    ) -> Result<AssistOutput, AgentError> {
        let output = self
            .executor
            .execute_with(&self.resolved, &self.config, prompt, identity, policy, cancel)
            .await?;
        Ok(AssistOutput { output })
    }
}

fn or_blank(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or_default()
}

fn simulate_prompt(tool: &Tool) -> String {
    format!(
        "Analyze and simulate this tool.\n\n\
         Title: {}\n\
         Description: {}\n\
         Content:\n{}\n",
        tool.title,
        or_blank(&tool.description),
        or_blank(&tool.content),
    )
}

fn integration_guide_prompt(request: &ToolInstructionRequest) -> String {
    format!(
        "Based on the code provided below, write a specific integration guide for a developer.\n\
         Focus ONLY on providing the necessary steps and code to add this tool to an agent system.\n\
         Your response MUST include:\n\
         1. A code snippet showing how to initialize a Main Agent that registers and calls this tool.\n\
         2. A description of the file structure or specific files needed to support this tool.\n\
         3. Any imports or dependencies required.\n\n\
         Do NOT provide a general summary unless required for integration.\n\n\
         Title: {}\n\
         Description: {}\n\
         Code:\n{}\n",
        request.title,
        or_blank(&request.description),
        or_blank(&request.code),
    )
}

fn installation_steps_prompt(request: &InstallationStepsRequest) -> String {
    format!(
        "Based on the code provided below, write clear step-by-step installation \
         and integration instructions for a developer.\n\n\
         Title: {}\n\
         Description: {}\n\
         Language: {}\n\
         Version: {}\n\n\
         Code:\n{}\n",
        or_blank(&request.title),
        or_blank(&request.description),
        or_blank(&request.language),
        or_blank(&request.version),
        or_blank(&request.content),
    )
}

fn list_or(items: &[String], fallback: &str) -> String {
    if items.is_empty() {
        fallback.to_string()
    } else {
        items.join(", ")
    }
}

fn agent_instructions_prompt(request: &AgentInstructionsRequest) -> String {
    format!(
        "As an expert technical writer, generate comprehensive setup and usage instructions for the following AI Agent.\n\n\
         The instructions MUST include:\n\
         1. **Overview**: A brief explanation of what the agent does.\n\
         2. **Setup & Prerequisites**: Any environment variables or dependencies needed.\n\
         3. **File Structure**: A recommended directory layout for a project using this agent (e.g., using a backticks block).\n\
         4. **Configuration**: What extra files (e.g., .env, config.json) the user needs to create and where to put them.\n\
         5. **Usage Guide**: Step-by-step instructions on how to initialize and interact with the agent.\n\
         6. **Capabilities**: Specific details on when and how to leverage the associated tools and prompts listed below.\n\n\
         AGENT CONFIGURATION:\n\
         - Title: {}\n\
         - Description: {}\n\
         - Target Model: {}\n\
         - System Role: {}\n\
         - Tags: {}\n\
         - Tools Available: {}\n\
         - Prompts Included: {}\n",
        or_blank(&request.title),
        or_blank(&request.description),
        or_blank(&request.model),
        or_blank(&request.system_prompt),
        list_or(&request.tags, "none"),
        list_or(&request.tools, "No specific tools listed"),
        list_or(&request.prompts, "No additional prompts listed"),
    )
}
