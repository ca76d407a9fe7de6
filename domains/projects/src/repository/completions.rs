//! Task completion repository

use crate::domain::entities::TaskCompletion;
use peerhub_common::Result;
use sqlx::PgPool;
use uuid::Uuid;

/// Column list shared by the completion queries
pub const COMPLETION_COLUMNS: &str =
    "id, page_id, user_id, status, completed_at, unchecked_at";

#[derive(Clone)]
pub struct CompletionRepository {
    pool: PgPool,
}

impl CompletionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get the user's open (completed) row for a page, if any
    pub async fn find_completed(
        &self,
        page_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<TaskCompletion>> {
        let query = format!(
            "SELECT {COMPLETION_COLUMNS} FROM task_completions \
             WHERE page_id = $1 AND user_id = $2 AND status = 'completed'"
        );
        let completion = sqlx::query_as::<_, TaskCompletion>(&query)
            .bind(page_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(completion)
    }

    /// Create a fresh completion row
    pub async fn create(&self, completion: &TaskCompletion) -> Result<TaskCompletion> {
        let query = format!(
            "INSERT INTO task_completions ({COMPLETION_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COMPLETION_COLUMNS}"
        );
        let created = sqlx::query_as::<_, TaskCompletion>(&query)
            .bind(completion.id)
            .bind(completion.page_id)
            .bind(completion.user_id)
            .bind(completion.status)
            .bind(completion.completed_at)
            .bind(completion.unchecked_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    /// Terminal uncheck: the row stays, re-completion creates a new one
    pub async fn mark_unchecked(&self, id: Uuid) -> Result<Option<TaskCompletion>> {
        let query = format!(
            "UPDATE task_completions SET status = 'unchecked', unchecked_at = NOW() \
             WHERE id = $1 AND status = 'completed' \
             RETURNING {COMPLETION_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, TaskCompletion>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(updated)
    }

    /// The user's completed count across a project's non-deleted pages
    /// (the progress numerator)
    pub async fn count_completed(&self, project_id: Uuid, user_id: Uuid) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM task_completions c
            INNER JOIN pages p ON c.page_id = p.id
            WHERE p.project_id = $1 AND p.status = 'active'
              AND c.user_id = $2 AND c.status = 'completed'
            "#,
        )
        .bind(project_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
