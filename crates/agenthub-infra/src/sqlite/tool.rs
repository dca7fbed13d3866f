//! SQLite tool library repository.

use agenthub_core::repository::tool::ToolRepository;
use agenthub_types::agent::UserIdentity;
use agenthub_types::error::RepositoryError;
use agenthub_types::id::ToolId;
use agenthub_types::library::Tool;
use sqlx::Row;

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, query_err, tags_from_json, tags_to_json};

/// SQLite-backed implementation of `ToolRepository`.
pub struct SqliteToolRepository {
    pool: DatabasePool,
}

impl SqliteToolRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

/// Internal row type for mapping SQLite rows to domain Tool.
struct ToolRow {
    id: String,
    title: String,
    description: Option<String>,
    content: Option<String>,
    tags: String,
    language: Option<String>,
    version: Option<String>,
    recommended_model: Option<String>,
    created_by: String,
    created_at: String,
}

impl ToolRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            content: row.try_get("content")?,
            tags: row.try_get("tags")?,
            language: row.try_get("language")?,
            version: row.try_get("version")?,
            recommended_model: row.try_get("recommended_model")?,
            created_by: row.try_get("created_by")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_tool(self) -> Result<Tool, RepositoryError> {
        let id = self
            .id
            .parse::<ToolId>()
            .map_err(|e| RepositoryError::Query(format!("invalid tool id: {e}")))?;

        Ok(Tool {
            id,
            title: self.title,
            description: self.description,
            content: self.content,
            tags: tags_from_json(&self.tags)?,
            language: self.language,
            version: self.version,
            recommended_model: self.recommended_model,
            created_by: UserIdentity::new(self.created_by),
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

impl ToolRepository for SqliteToolRepository {
    async fn create(&self, tool: &Tool) -> Result<Tool, RepositoryError> {
        let result = sqlx::query(
            "INSERT INTO tools (id, title, description, content, tags, language, version, recommended_model, created_by, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(tool.id.to_string())
        .bind(&tool.title)
        .bind(&tool.description)
        .bind(&tool.content)
        .bind(tags_to_json(&tool.tags)?)
        .bind(&tool.language)
        .bind(&tool.version)
        .bind(&tool.recommended_model)
        .bind(tool.created_by.as_str())
        .bind(format_datetime(&tool.created_at))
        .execute(&self.pool.writer)
        .await;

        match result {
            Ok(_) => Ok(tool.clone()),
            Err(sqlx::Error::Database(db_err)) if db_err.message().contains("UNIQUE") => Err(
                RepositoryError::Conflict(format!("tool '{}' already exists", tool.id)),
            ),
            Err(e) => Err(query_err(e)),
        }
    }

    async fn get_by_id(&self, id: &ToolId) -> Result<Option<Tool>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM tools WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_err)?;

        match row {
            Some(row) => {
                let tool_row = ToolRow::from_row(&row).map_err(query_err)?;
                Ok(Some(tool_row.into_tool()?))
            }
            None => Ok(None),
        }
    }

    async fn update(&self, tool: &Tool) -> Result<Tool, RepositoryError> {
        let result = sqlx::query(
            "UPDATE tools SET title = ?, description = ?, content = ?, tags = ?, language = ?, version = ?, recommended_model = ?
             WHERE id = ?",
        )
        .bind(&tool.title)
        .bind(&tool.description)
        .bind(&tool.content)
        .bind(tags_to_json(&tool.tags)?)
        .bind(&tool.language)
        .bind(&tool.version)
        .bind(&tool.recommended_model)
        .bind(tool.id.to_string())
        .execute(&self.pool.writer)
        .await
        .map_err(query_err)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(tool.clone())
    }

    async fn delete(&self, id: &ToolId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM tools WHERE id = ?")
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
