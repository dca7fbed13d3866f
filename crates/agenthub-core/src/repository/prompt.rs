//! Prompt library repository trait definition.

use agenthub_types::error::RepositoryError;
use agenthub_types::id::PromptId;
use agenthub_types::library::Prompt;

/// Repository trait for library prompts.
///
/// Implementations live in agenthub-infra (e.g., SqlitePromptRepository).
pub trait PromptRepository: Send + Sync {
    /// Create a new prompt. Returns the created prompt.
    fn create(
        &self,
        prompt: &Prompt,
    ) -> impl std::future::Future<Output = Result<Prompt, RepositoryError>> + Send;

    fn get_by_id(
        &self,
        id: &PromptId,
    ) -> impl std::future::Future<Output = Result<Option<Prompt>, RepositoryError>> + Send;

    /// Replace a prompt's editable fields. `NotFound` if the id is unknown.
    fn update(
        &self,
        prompt: &Prompt,
    ) -> impl std::future::Future<Output = Result<Prompt, RepositoryError>> + Send;

    /// `NotFound` if nothing was deleted.
    fn delete(
        &self,
        id: &PromptId,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
