//! Prompt and tool library service.

use tracing::info;

use agenthub_types::agent::UserIdentity;
use agenthub_types::error::{LibraryError, RepositoryError};
use agenthub_types::id::{PromptId, ToolId};
use agenthub_types::library::{CreatePromptRequest, CreateToolRequest, Prompt, Tool};

use crate::repository::prompt::PromptRepository;
use crate::repository::tool::ToolRepository;

/// Publishes and looks up standalone prompts and tools.
pub struct LibraryService<P: PromptRepository, T: ToolRepository> {
    prompts: P,
    tools: T,
}

impl<P: PromptRepository, T: ToolRepository> LibraryService<P, T> {
    pub fn new(prompts: P, tools: T) -> Self {
        Self { prompts, tools }
    }

    pub async fn create_prompt(
        &self,
        owner: &UserIdentity,
        request: CreatePromptRequest,
    ) -> Result<Prompt, LibraryError> {
        let request = validate_prompt(request)?;
        let prompt = Prompt {
            id: PromptId::new(),
            title: request.title,
            description: request.description,
            content: request.content,
            tags: request.tags,
            category: request.category,
            recommended_model: request.recommended_model,
            created_by: owner.clone(),
            created_at: chrono::Utc::now(),
        };
        let prompt = self.prompts.create(&prompt).await?;
        info!(prompt.id = %prompt.id, owner = %owner, "prompt published");
        Ok(prompt)
    }

    pub async fn get_prompt(&self, id: &PromptId) -> Result<Prompt, LibraryError> {
        self.prompts
            .get_by_id(id)
            .await?
            .ok_or_else(|| LibraryError::PromptNotFound(id.clone()))
    }

    /// Replace a prompt's fields. Owner only; id, owner and creation time are kept.
    pub async fn update_prompt(
        &self,
        id: &PromptId,
        owner: &UserIdentity,
        request: CreatePromptRequest,
    ) -> Result<Prompt, LibraryError> {
        let existing = self.get_prompt(id).await?;
        if &existing.created_by != owner {
            return Err(LibraryError::Forbidden(format!("prompt '{id}'")));
        }

        let request = validate_prompt(request)?;
        let prompt = Prompt {
            title: request.title,
            description: request.description,
            content: request.content,
            tags: request.tags,
            category: request.category,
            recommended_model: request.recommended_model,
            ..existing
        };
        let prompt = self.prompts.update(&prompt).await.map_err(|e| match e {
            RepositoryError::NotFound => LibraryError::PromptNotFound(id.clone()),
            other => LibraryError::Storage(other),
        })?;
        info!(prompt.id = %id, "prompt updated");
        Ok(prompt)
    }

    /// Owner only. Agents that reference the prompt keep their soft reference.
    pub async fn delete_prompt(
        &self,
        id: &PromptId,
        owner: &UserIdentity,
    ) -> Result<(), LibraryError> {
        let existing = self.get_prompt(id).await?;
        if &existing.created_by != owner {
            return Err(LibraryError::Forbidden(format!("prompt '{id}'")));
        }

        self.prompts.delete(id).await.map_err(|e| match e {
            RepositoryError::NotFound => LibraryError::PromptNotFound(id.clone()),
            other => LibraryError::Storage(other),
        })?;
        info!(prompt.id = %id, "prompt deleted");
        Ok(())
    }

    pub async fn create_tool(
        &self,
        owner: &UserIdentity,
        request: CreateToolRequest,
    ) -> Result<Tool, LibraryError> {
        let request = validate_tool(request)?;
        let tool = Tool {
            id: ToolId::new(),
            title: request.title,
            description: request.description,
            content: request.content,
            tags: request.tags,
            language: request.language,
            version: request.version,
            recommended_model: request.recommended_model,
            created_by: owner.clone(),
            created_at: chrono::Utc::now(),
        };
        let tool = self.tools.create(&tool).await?;
        info!(tool.id = %tool.id, owner = %owner, "tool published");
        Ok(tool)
    }

    pub async fn get_tool(&self, id: &ToolId) -> Result<Tool, LibraryError> {
        self.tools
            .get_by_id(id)
            .await?
            .ok_or_else(|| LibraryError::ToolNotFound(id.clone()))
    }

    /// Replace a tool's fields. Owner only.
    pub async fn update_tool(
        &self,
        id: &ToolId,
        owner: &UserIdentity,
        request: CreateToolRequest,
    ) -> Result<Tool, LibraryError> {
        let existing = self.get_tool(id).await?;
        if &existing.created_by != owner {
            return Err(LibraryError::Forbidden(format!("tool '{id}'")));
        }

        let request = validate_tool(request)?;
        let tool = Tool {
            title: request.title,
            description: request.description,
            content: request.content,
            tags: request.tags,
            language: request.language,
            version: request.version,
            recommended_model: request.recommended_model,
            ..existing
        };
        let tool = self.tools.update(&tool).await.map_err(|e| match e {
            RepositoryError::NotFound => LibraryError::ToolNotFound(id.clone()),
            other => LibraryError::Storage(other),
        })?;
        info!(tool.id = %id, "tool updated");
        Ok(tool)
    }

    pub async fn delete_tool(&self, id: &ToolId, owner: &UserIdentity) -> Result<(), LibraryError> {
        let existing = self.get_tool(id).await?;
        if &existing.created_by != owner {
            return Err(LibraryError::Forbidden(format!("tool '{id}'")));
        }

        self.tools.delete(id).await.map_err(|e| match e {
            RepositoryError::NotFound => LibraryError::ToolNotFound(id.clone()),
            other => LibraryError::Storage(other),
        })?;
        info!(tool.id = %id, "tool deleted");
        Ok(())
    }
}

/// Trims the title; title and content must be non-blank.
fn validate_prompt(mut request: CreatePromptRequest) -> Result<CreatePromptRequest, LibraryError> {
    request.title = request.title.trim().to_string();
    if request.title.is_empty() {
        return Err(LibraryError::Validation("title cannot be empty".to_string()));
    }
    if request.content.trim().is_empty() {
        return Err(LibraryError::Validation("content cannot be empty".to_string()));
    }
    Ok(request)
}

fn validate_tool(mut request: CreateToolRequest) -> Result<CreateToolRequest, LibraryError> {
    request.title = request.title.trim().to_string();
    if request.title.is_empty() {
        return Err(LibraryError::Validation("title cannot be empty".to_string()));
    }
    Ok(request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::testing::{MemoryPromptRepo, MemoryToolRepo};

    fn service() -> LibraryService<MemoryPromptRepo, MemoryToolRepo> {
        LibraryService::new(MemoryPromptRepo::default(), MemoryToolRepo::default())
    }

    #[tokio::test]
    async fn test_create_and_get_prompt() {
        let service = service();
        let owner = UserIdentity::new("alice");
        let prompt = service
            .create_prompt(
                &owner,
                CreatePromptRequest {
                    title: "  Summarizer ".to_string(),
                    content: "Summarize the text.".to_string(),
                    tags: vec!["writing".to_string()],
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(prompt.title, "Summarizer");
        assert_eq!(prompt.created_by, owner);

        let fetched = service.get_prompt(&prompt.id).await.unwrap();
        assert_eq!(fetched.content, "Summarize the text.");
    }

    #[tokio::test]
    async fn test_create_prompt_requires_title_and_content() {
        let service = service();
        let owner = UserIdentity::new("alice");
        let err = service
            .create_prompt(
                &owner,
                CreatePromptRequest {
                    title: " ".to_string(),
                    content: "x".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, LibraryError::Validation(_)));

        let err = service
            .create_prompt(
                &owner,
                CreatePromptRequest {
                    title: "T".to_string(),
                    content: String::new(),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, LibraryError::Validation(_)));
    }

    #[tokio::test]
    async fn test_missing_ids_are_not_found() {
        let service = service();
        assert!(matches!(
            service.get_prompt(&PromptId::new()).await,
            Err(LibraryError::PromptNotFound(_))
        ));
        assert!(matches!(
            service.get_tool(&ToolId::new()).await,
            Err(LibraryError::ToolNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_create_tool_without_code() {
        let service = service();
        let tool = service
            .create_tool(
                &UserIdentity::new("bob"),
                CreateToolRequest {
                    title: "weather".to_string(),
                    language: Some("python".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(tool.content.is_none());
        assert_eq!(service.get_tool(&tool.id).await.unwrap().title, "weather");
    }

    fn prompt_request(title: &str, content: &str) -> CreatePromptRequest {
        CreatePromptRequest {
            title: title.to_string(),
            content: content.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_update_prompt_owner_only() {
        let service = service();
        let alice = UserIdentity::new("alice");
        let prompt = service
            .create_prompt(&alice, prompt_request("Tone", "Be concise."))
            .await
            .unwrap();

        let err = service
            .update_prompt(
                &prompt.id,
                &UserIdentity::new("bob"),
                prompt_request("Hijacked", "x"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, LibraryError::Forbidden(_)));

        let updated = service
            .update_prompt(&prompt.id, &alice, prompt_request(" Tone v2 ", "Be brief."))
            .await
            .unwrap();
        assert_eq!(updated.id, prompt.id);
        assert_eq!(updated.title, "Tone v2");
        assert_eq!(updated.created_by, alice);
        assert_eq!(updated.created_at, prompt.created_at);
        assert_eq!(service.get_prompt(&prompt.id).await.unwrap().content, "Be brief.");

        let err = service
            .update_prompt(&prompt.id, &alice, prompt_request("Tone", "  "))
            .await
            .unwrap_err();
        assert!(matches!(err, LibraryError::Validation(_)));
    }

    #[tokio::test]
    async fn test_delete_prompt_owner_only() {
        let service = service();
        let alice = UserIdentity::new("alice");
        let prompt = service
            .create_prompt(&alice, prompt_request("Tone", "Be concise."))
            .await
            .unwrap();

        let err = service
            .delete_prompt(&prompt.id, &UserIdentity::new("bob"))
            .await
            .unwrap_err();
        assert!(matches!(err, LibraryError::Forbidden(_)));

        service.delete_prompt(&prompt.id, &alice).await.unwrap();
        assert!(matches!(
            service.get_prompt(&prompt.id).await,
            Err(LibraryError::PromptNotFound(_))
        ));
        assert!(matches!(
            service.delete_prompt(&prompt.id, &alice).await,
            Err(LibraryError::PromptNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_and_delete_tool_owner_only() {
        let service = service();
        let bob = UserIdentity::new("bob");
        let tool = service
            .create_tool(
                &bob,
                CreateToolRequest {
                    title: "weather".to_string(),
                    content: Some("def weather(city): ...".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let alice = UserIdentity::new("alice");
        let rename = CreateToolRequest {
            title: "forecast".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            service.update_tool(&tool.id, &alice, rename.clone()).await,
            Err(LibraryError::Forbidden(_))
        ));
        assert!(matches!(
            service.delete_tool(&tool.id, &alice).await,
            Err(LibraryError::Forbidden(_))
        ));

        let updated = service.update_tool(&tool.id, &bob, rename).await.unwrap();
        assert_eq!(updated.title, "forecast");
        assert!(updated.content.is_none());

        service.delete_tool(&tool.id, &bob).await.unwrap();
        assert!(matches!(
            service.get_tool(&tool.id).await,
            Err(LibraryError::ToolNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let service = service();
        let alice = UserIdentity::new("alice");
        assert!(matches!(
            service
                .update_prompt(&PromptId::new(), &alice, prompt_request("T", "c"))
                .await,
            Err(LibraryError::PromptNotFound(_))
        ));
        assert!(matches!(
            service
                .update_tool(&ToolId::new(), &alice, CreateToolRequest::default())
                .await,
            Err(LibraryError::ToolNotFound(_))
        ));
        assert!(matches!(
            service.delete_tool(&ToolId::new(), &alice).await,
            Err(LibraryError::ToolNotFound(_))
        ));
    }
}
