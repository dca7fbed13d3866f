//! Request shapes for the tool-runner assistant endpoints.
//!
//! These feed documentation/simulation prompts through the same execution
//! path as user agents.

use serde::{Deserialize, Serialize};

/// Inline tool description for integration-guide generation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolInstructionRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

/// Code submission for installation-step generation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstallationStepsRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// Agent configuration summary for instruction generation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentInstructionsRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    /// Names of the tools available to the agent.
    #[serde(default)]
    pub tools: Vec<String>,
    /// Contents of the prompts bundled with the agent.
    #[serde(default)]
    pub prompts: Vec<String>,
}

/// Text produced by an assistant endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssistOutput {
    pub output: String,
}
