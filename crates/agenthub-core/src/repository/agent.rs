//! Agent repository trait definition.

use agenthub_types::agent::Agent;
use agenthub_types::error::RepositoryError;
use agenthub_types::id::AgentId;

/// Repository trait for agents and their embedded bindings.
///
/// An agent is stored together with its tool bindings and prompt fragments;
/// implementations must write all three atomically and return bindings in
/// their stored sequence.
pub trait AgentRepository: Send + Sync {
    fn create(
        &self,
        agent: &Agent,
    ) -> impl std::future::Future<Output = Result<Agent, RepositoryError>> + Send;

    fn get_by_id(
        &self,
        id: &AgentId,
    ) -> impl std::future::Future<Output = Result<Option<Agent>, RepositoryError>> + Send;

    /// Replace an agent's fields and all of its bindings.
    fn update(
        &self,
        agent: &Agent,
    ) -> impl std::future::Future<Output = Result<Agent, RepositoryError>> + Send;

    /// Delete an agent and its bindings. `NotFound` if nothing was deleted.
    fn delete(
        &self,
        id: &AgentId,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
