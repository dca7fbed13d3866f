//! SQLite agent repository.
//!
//! An agent row owns two child tables: `agent_tools` and `agent_prompts`,
//! each keyed by `(agent_id, position)` so bindings come back in the order
//! they were written. Writes touching an agent and its bindings share one
//! transaction; deleting an agent cascades to bindings and run history.

use agenthub_core::repository::agent::AgentRepository;
use agenthub_types::agent::{Agent, AgentConfig, PromptFragment, ToolBinding, UserIdentity};
use agenthub_types::error::RepositoryError;
use agenthub_types::id::{AgentId, PromptId, ToolId};
use agenthub_types::llm::MessageRole;
use sqlx::{Row, SqliteConnection};

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, query_err, tags_from_json, tags_to_json};

/// SQLite-backed implementation of `AgentRepository`.
pub struct SqliteAgentRepository {
    pool: DatabasePool,
}

impl SqliteAgentRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    async fn load_tools(&self, id: &str) -> Result<Vec<ToolBinding>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT name, description, code, enabled, tool_id FROM agent_tools
             WHERE agent_id = ? ORDER BY position",
        )
        .bind(id)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_err)?;

        rows.iter()
            .map(|row| {
                let tool_id: Option<String> = row.try_get("tool_id").map_err(query_err)?;
                Ok(ToolBinding {
                    name: row.try_get("name").map_err(query_err)?,
                    description: row.try_get("description").map_err(query_err)?,
                    code: row.try_get("code").map_err(query_err)?,
                    enabled: row.try_get("enabled").map_err(query_err)?,
                    tool_id: tool_id
                        .map(|s| s.parse::<ToolId>())
                        .transpose()
                        .map_err(|e| RepositoryError::Query(format!("invalid tool id: {e}")))?,
                })
            })
            .collect()
    }

    async fn load_prompts(&self, id: &str) -> Result<Vec<PromptFragment>, RepositoryError> {
        let rows = sqlx::query(
            "SELECT role, sort_order, content, prompt_id FROM agent_prompts
             WHERE agent_id = ? ORDER BY position",
        )
        .bind(id)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_err)?;

        rows.iter()
            .map(|row| {
                let role: String = row.try_get("role").map_err(query_err)?;
                let prompt_id: Option<String> = row.try_get("prompt_id").map_err(query_err)?;
                Ok(PromptFragment {
                    role: role
                        .parse::<MessageRole>()
                        .map_err(RepositoryError::Query)?,
                    order: row.try_get("sort_order").map_err(query_err)?,
                    content: row.try_get("content").map_err(query_err)?,
                    prompt_id: prompt_id
                        .map(|s| s.parse::<PromptId>())
                        .transpose()
                        .map_err(|e| RepositoryError::Query(format!("invalid prompt id: {e}")))?,
                })
            })
            .collect()
    }
}

/// Internal row type for the `agents` table.
struct AgentRow {
    id: String,
    title: String,
    model: Option<String>,
    system_prompt: String,
    max_tokens: Option<i64>,
    temperature: Option<f64>,
    tags: String,
    description: Option<String>,
    instructions: Option<String>,
    visibility: String,
    created_by: String,
    created_at: String,
    updated_at: String,
}

impl AgentRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            model: row.try_get("model")?,
            system_prompt: row.try_get("system_prompt")?,
            max_tokens: row.try_get("max_tokens")?,
            temperature: row.try_get("temperature")?,
            tags: row.try_get("tags")?,
            description: row.try_get("description")?,
            instructions: row.try_get("instructions")?,
            visibility: row.try_get("visibility")?,
            created_by: row.try_get("created_by")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn into_agent(
        self,
        tools: Vec<ToolBinding>,
        prompts: Vec<PromptFragment>,
    ) -> Result<Agent, RepositoryError> {
        let id = self
            .id
            .parse::<AgentId>()
            .map_err(|e| RepositoryError::Query(format!("invalid agent id: {e}")))?;
        let max_tokens = self
            .max_tokens
            .map(u32::try_from)
            .transpose()
            .map_err(|e| RepositoryError::Query(format!("invalid max_tokens: {e}")))?;

        Ok(Agent {
            id,
            config: AgentConfig {
                title: self.title,
                model: self.model,
                system_prompt: self.system_prompt,
                max_tokens,
                temperature: self.temperature,
                tags: tags_from_json(&self.tags)?,
            },
            description: self.description,
            instructions: self.instructions,
            visibility: self.visibility.parse().map_err(RepositoryError::Query)?,
            tools,
            prompts,
            created_by: UserIdentity::new(self.created_by),
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
        })
    }
}

/// Write every binding of `agent`, numbering positions from zero.
async fn insert_bindings(conn: &mut SqliteConnection, agent: &Agent) -> Result<(), RepositoryError> {
    let agent_id = agent.id.to_string();

    for (position, tool) in agent.tools.iter().enumerate() {
        sqlx::query(
            "INSERT INTO agent_tools (agent_id, position, name, description, code, enabled, tool_id)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&agent_id)
        .bind(position as i64)
        .bind(&tool.name)
        .bind(&tool.description)
        .bind(&tool.code)
        .bind(tool.enabled)
        .bind(tool.tool_id.as_ref().map(ToString::to_string))
        .execute(&mut *conn)
        .await
        .map_err(query_err)?;
    }

    for (position, fragment) in agent.prompts.iter().enumerate() {
        sqlx::query(
            "INSERT INTO agent_prompts (agent_id, position, role, sort_order, content, prompt_id)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&agent_id)
        .bind(position as i64)
        .bind(fragment.role.to_string())
        .bind(fragment.order)
        .bind(&fragment.content)
        .bind(fragment.prompt_id.as_ref().map(ToString::to_string))
        .execute(&mut *conn)
        .await
        .map_err(query_err)?;
    }

    Ok(())
}

impl AgentRepository for SqliteAgentRepository {
    async fn create(&self, agent: &Agent) -> Result<Agent, RepositoryError> {
        let mut tx = self.pool.writer.begin().await.map_err(query_err)?;

        sqlx::query(
            "INSERT INTO agents (id, title, model, system_prompt, max_tokens, temperature, tags, description, instructions, visibility, created_by, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(agent.id.to_string())
        .bind(&agent.config.title)
        .bind(&agent.config.model)
        .bind(&agent.config.system_prompt)
        .bind(agent.config.max_tokens.map(i64::from))
        .bind(agent.config.temperature)
        .bind(tags_to_json(&agent.config.tags)?)
        .bind(&agent.description)
        .bind(&agent.instructions)
        .bind(agent.visibility.to_string())
        .bind(agent.created_by.as_str())
        .bind(format_datetime(&agent.created_at))
        .bind(format_datetime(&agent.updated_at))
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e {
                if db_err.message().contains("UNIQUE") {
                    return RepositoryError::Conflict(format!(
                        "agent '{}' already exists",
                        agent.id
                    ));
                }
            }
            query_err(e)
        })?;

        insert_bindings(&mut *tx, agent).await?;

        tx.commit().await.map_err(query_err)?;

        Ok(agent.clone())
    }

    async fn get_by_id(&self, id: &AgentId) -> Result<Option<Agent>, RepositoryError> {
        let id = id.to_string();
        let row = sqlx::query("SELECT * FROM agents WHERE id = ?")
            .bind(&id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_err)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let agent_row = AgentRow::from_row(&row).map_err(query_err)?;
        let tools = self.load_tools(&id).await?;
        let prompts = self.load_prompts(&id).await?;
        Ok(Some(agent_row.into_agent(tools, prompts)?))
    }

    async fn update(&self, agent: &Agent) -> Result<Agent, RepositoryError> {
        let agent_id = agent.id.to_string();
        let mut tx = self.pool.writer.begin().await.map_err(query_err)?;

        let result = sqlx::query(
            "UPDATE agents SET title = ?, model = ?, system_prompt = ?, max_tokens = ?, temperature = ?, tags = ?, description = ?, instructions = ?, visibility = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&agent.config.title)
        .bind(&agent.config.model)
        .bind(&agent.config.system_prompt)
        .bind(agent.config.max_tokens.map(i64::from))
        .bind(agent.config.temperature)
        .bind(tags_to_json(&agent.config.tags)?)
        .bind(&agent.description)
        .bind(&agent.instructions)
        .bind(agent.visibility.to_string())
        .bind(format_datetime(&agent.updated_at))
        .bind(&agent_id)
        .execute(&mut *tx)
        .await
        .map_err(query_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        sqlx::query("DELETE FROM agent_tools WHERE agent_id = ?")
            .bind(&agent_id)
            .execute(&mut *tx)
            .await
            .map_err(query_err)?;
        sqlx::query("DELETE FROM agent_prompts WHERE agent_id = ?")
            .bind(&agent_id)
            .execute(&mut *tx)
            .await
            .map_err(query_err)?;

        insert_bindings(&mut *tx, agent).await?;

        tx.commit().await.map_err(query_err)?;

        Ok(agent.clone())
    }

    async fn delete(&self, id: &AgentId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM agents WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool.writer)
            .await
            .map_err(query_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
