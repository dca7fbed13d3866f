//! Tool library repository trait definition.

use agenthub_types::error::RepositoryError;
use agenthub_types::id::ToolId;
use agenthub_types::library::Tool;

/// Repository trait for library tools.
pub trait ToolRepository: Send + Sync {
    fn create(
        &self,
        tool: &Tool,
    ) -> impl std::future::Future<Output = Result<Tool, RepositoryError>> + Send;

    fn get_by_id(
        &self,
        id: &ToolId,
    ) -> impl std::future::Future<Output = Result<Option<Tool>, RepositoryError>> + Send;

    fn update(
        &self,
        tool: &Tool,
    ) -> impl std::future::Future<Output = Result<Tool, RepositoryError>> + Send;

    fn delete(
        &self,
        id: &ToolId,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
