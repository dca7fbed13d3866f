//! Library records: standalone prompts and tools users publish.
//!
//! Agents can reference these by id, and agent creation can materialize
//! embedded prompts/tools into new library records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::agent::UserIdentity;
use crate::id::{PromptId, ToolId};

/// A published prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prompt {
    pub id: PromptId,
    pub title: String,
    pub description: Option<String>,
    pub content: String,
    pub tags: Vec<String>,
    pub category: Option<String>,
    pub recommended_model: Option<String>,
    pub created_by: UserIdentity,
    pub created_at: DateTime<Utc>,
}

/// A published tool. `content` holds the tool's source code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tool {
    pub id: ToolId,
    pub title: String,
    pub description: Option<String>,
    pub content: Option<String>,
    pub tags: Vec<String>,
    pub language: Option<String>,
    pub version: Option<String>,
    pub recommended_model: Option<String>,
    pub created_by: UserIdentity,
    pub created_at: DateTime<Utc>,
}

/// Request to publish a new prompt.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreatePromptRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub recommended_model: Option<String>,
}

/// Request to publish a new tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateToolRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub recommended_model: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_prompt_request_defaults() {
        let req: CreatePromptRequest =
            serde_json::from_str(r#"{"title":"Summarize","content":"Summarize the text."}"#)
                .unwrap();
        assert!(req.tags.is_empty());
        assert!(req.description.is_none());
    }

    #[test]
    fn test_create_tool_request_content_optional() {
        let req: CreateToolRequest = serde_json::from_str(r#"{"title":"grep"}"#).unwrap();
        assert_eq!(req.title, "grep");
        assert!(req.content.is_none());
    }
}
