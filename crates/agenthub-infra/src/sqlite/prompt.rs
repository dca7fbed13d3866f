//! SQLite prompt library repository.

use agenthub_core::repository::prompt::PromptRepository;
use agenthub_types::agent::UserIdentity;
use agenthub_types::error::RepositoryError;
use agenthub_types::id::PromptId;
use agenthub_types::library::Prompt;
use sqlx::Row;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, query_err, tags_from_json, tags_to_json};

/// SQLite-backed implementation of `PromptRepository`.
pub struct SqlitePromptRepository {
    pool: DatabasePool,
}

impl SqlitePromptRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

fn row_to_prompt(row: &sqlx::sqlite::SqliteRow) -> Result<Prompt, RepositoryError> {
    let id: String = row.try_get("id").map_err(query_err)?;
    let tags: String = row.try_get("tags").map_err(query_err)?;
    let created_by: String = row.try_get("created_by").map_err(query_err)?;
    let created_at: String = row.try_get("created_at").map_err(query_err)?;

    Ok(Prompt {
        id: id
            .parse::<PromptId>()
            .map_err(|e| RepositoryError::Query(format!("invalid prompt id: {e}")))?,
        title: row.try_get("title").map_err(query_err)?,
        description: row.try_get("description").map_err(query_err)?,
        content: row.try_get("content").map_err(query_err)?,
        tags: tags_from_json(&tags)?,
        category: row.try_get("category").map_err(query_err)?,
        recommended_model: row.try_get("recommended_model").map_err(query_err)?,
        created_by: UserIdentity::new(created_by),
        created_at: parse_datetime(&created_at)?,
    })
}

impl PromptRepository for SqlitePromptRepository {
    async fn create(&self, prompt: &Prompt) -> Result<Prompt, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO prompts (id, title, description, content, tags, category, recommended_model, created_by, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(prompt.id.to_string())
        .bind(&prompt.title)
        .bind(&prompt.description)
        .bind(&prompt.content)
        .bind(tags_to_json(&prompt.tags)?)
        .bind(&prompt.category)
        .bind(&prompt.recommended_model)
        .bind(prompt.created_by.as_str())
        .bind(format_datetime(&prompt.created_at))
        .execute(&self.pool.writer)
        .await;

        match result {
            Ok(_) => Ok(prompt.clone()),
            Err(sqlx::Error::Database(db_err)) if db_err.message().contains("UNIQUE") => Err(
                RepositoryError::Conflict(format!("prompt '{}' already exists", prompt.id)),
            ),
            Err(e) => Err(query_err(e)),
        }
    }

    async fn get_by_id(&self, id: &PromptId) -> Result<Option<Prompt>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM prompts WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_err)?;

        row.as_ref().map(row_to_prompt).transpose()
    }

    async fn update(&self, prompt: &Prompt) -> Result<Prompt, RepositoryError> {
        let result = sqlx::query(
            "UPDATE prompts SET title = ?, description = ?, content = ?, tags = ?, category = ?, recommended_model = ?
             WHERE id = ?",
        )
        .bind(&prompt.title)
        .bind(&prompt.description)
        .bind(&prompt.content)
        .bind(tags_to_json(&prompt.tags)?)
        .bind(&prompt.category)
        .bind(&prompt.recommended_model)
        .bind(prompt.id.to_string())
        .execute(&self.pool.writer)
        .await
        .map_err(query_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(prompt.clone())
    }

    async fn delete(&self, id: &PromptId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM prompts WHERE id = ?")
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
