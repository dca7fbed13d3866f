//! SQLite agent run history repository.

use agenthub_core::repository::run::AgentRunRepository;
use agenthub_types::agent::{AgentRun, UserIdentity};
use agenthub_types::error::RepositoryError;
use agenthub_types::id::{AgentId, RunId};
use sqlx::Row;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, query_err};

/// SQLite-backed implementation of `AgentRunRepository`.
pub struct SqliteAgentRunRepository {
    pool: DatabasePool,
}

impl SqliteAgentRunRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

fn row_to_run(row: &sqlx::sqlite::SqliteRow) -> Result<AgentRun, RepositoryError> {
    let id: String = row.try_get("id").map_err(query_err)?;
    let agent_id: String = row.try_get("agent_id").map_err(query_err)?;
    let user_id: String = row.try_get("user_id").map_err(query_err)?;
    let status: String = row.try_get("status").map_err(query_err)?;
    let created_at: String = row.try_get("created_at").map_err(query_err)?;

    Ok(AgentRun {
        id: id
            .parse::<RunId>()
            .map_err(|e| RepositoryError::Query(format!("invalid run id: {e}")))?,
        agent_id: agent_id
            .parse::<AgentId>()
            .map_err(|e| RepositoryError::Query(format!("invalid agent id: {e}")))?,
        user_id: UserIdentity::new(user_id),
        input: row.try_get("input").map_err(query_err)?,
        output: row.try_get("output").map_err(query_err)?,
        status: status.parse().map_err(RepositoryError::Query)?,
        error: row.try_get("error").map_err(query_err)?,
        created_at: parse_datetime(&created_at)?,
    })
}

impl AgentRunRepository for SqliteAgentRunRepository {
    async fn record(&self, run: &AgentRun) -> Result<AgentRun, RepositoryError> {
        sqlx::query(
            "INSERT INTO agent_runs (id, agent_id, user_id, input, output, status, error, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(run.id.to_string())
        .bind(run.agent_id.to_string())
        .bind(run.user_id.as_str())
        .bind(&run.input)
        .bind(&run.output)
        .bind(run.status.to_string())
        .bind(&run.error)
        .bind(format_datetime(&run.created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e {
                if db_err.message().contains("FOREIGN KEY") {
                    return RepositoryError::NotFound;
                }
            }
            query_err(e)
        })?;

        Ok(run.clone())
    }

    async fn list_by_agent(
        &self,
        agent_id: &AgentId,
        limit: i64,
    ) -> Result<Vec<AgentRun>, RepositoryError> {
        // Run ids are UUID v7, so id breaks ties between equal timestamps.
        let rows = sqlx::query(
            "SELECT * FROM agent_runs WHERE agent_id = ?
             ORDER BY created_at DESC, id DESC LIMIT ?",
        )
        .bind(agent_id.to_string())
        .bind(limit)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_err)?;

        rows.iter().map(row_to_run).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::agent::SqliteAgentRepository;
    use crate::sqlite::pool::test_pool;
    use agenthub_core::repository::agent::AgentRepository;
    use agenthub_types::agent::{Agent, AgentConfig, RunStatus, Visibility};
    use chrono::{Duration, Utc};

    async fn seeded_agent(pool: &DatabasePool) -> AgentId {
        let now = Utc::now();
        let agent = Agent {
            id: AgentId::new(),
            config: AgentConfig {
                title: "Echo".to_string(),
                ..Default::default()
            },
            description: None,
            instructions: None,
            visibility: Visibility::Public,
            tools: vec![],
            prompts: vec![],
            created_by: UserIdentity::new("alice"),
            created_at: now,
            updated_at: now,
        };
        SqliteAgentRepository::new(pool.clone())
            .create(&agent)
            .await
            .unwrap();
        agent.id
    }

    fn make_run(agent_id: &AgentId, input: &str, offset_secs: i64) -> AgentRun {
        AgentRun {
            id: RunId::new(),
            agent_id: agent_id.clone(),
            user_id: UserIdentity::new("bob"),
            input: input.to_string(),
            output: Some(format!("echo: {input}")),
            status: RunStatus::Completed,
            error: None,
            created_at: Utc::now() + Duration::seconds(offset_secs),
        }
    }

    #[tokio::test]
    async fn test_record_and_list_newest_first() {
        let pool = test_pool().await;
        let agent_id = seeded_agent(&pool).await;
        let repo = SqliteAgentRunRepository::new(pool);

        repo.record(&make_run(&agent_id, "first", 0)).await.unwrap();
        repo.record(&make_run(&agent_id, "second", 1)).await.unwrap();
        let mut failed = make_run(&agent_id, "third", 2);
        failed.status = RunStatus::Failed;
        failed.output = None;
        failed.error = Some("execution timed out after 120000ms".to_string());
        repo.record(&failed).await.unwrap();

        let runs = repo.list_by_agent(&agent_id, 10).await.unwrap();
        let inputs: Vec<&str> = runs.iter().map(|r| r.input.as_str()).collect();
        assert_eq!(inputs, vec!["third", "second", "first"]);
        assert_eq!(runs[0].status, RunStatus::Failed);
        assert!(runs[0].output.is_none());
        assert_eq!(runs[1].output.as_deref(), Some("echo: second"));

        let limited = repo.list_by_agent(&agent_id, 1).await.unwrap();
        assert_eq!(limited.len(), 1);
        assert_eq!(limited[0].input, "third");
    }

    #[tokio::test]
    async fn test_record_for_unknown_agent_fails() {
        let repo = SqliteAgentRunRepository::new(test_pool().await);
        let err = repo
            .record(&make_run(&AgentId::new(), "orphan", 0))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_runs_deleted_with_agent() {
        let pool = test_pool().await;
        let agent_id = seeded_agent(&pool).await;
        let repo = SqliteAgentRunRepository::new(pool.clone());
        repo.record(&make_run(&agent_id, "gone", 0)).await.unwrap();

        SqliteAgentRepository::new(pool)
            .delete(&agent_id)
            .await
            .unwrap();
        assert!(repo.list_by_agent(&agent_id, 10).await.unwrap().is_empty());
    }
}
