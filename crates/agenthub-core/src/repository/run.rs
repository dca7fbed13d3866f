//! Agent run history repository trait definition.

use agenthub_types::agent::AgentRun;
use agenthub_types::error::RepositoryError;
use agenthub_types::id::AgentId;

/// Repository trait for recorded agent runs.
pub trait AgentRunRepository: Send + Sync {
    fn record(
        &self,
        run: &AgentRun,
    ) -> impl std::future::Future<Output = Result<AgentRun, RepositoryError>> + Send;

    /// Most recent runs of an agent, newest first.
    fn list_by_agent(
        &self,
        agent_id: &AgentId,
        limit: i64,
    ) -> impl std::future::Future<Output = Result<Vec<AgentRun>, RepositoryError>> + Send;
}
