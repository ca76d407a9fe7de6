//! Page repository (tasks and description documents)

use crate::domain::entities::Page;
use peerhub_common::Result;
use sqlx::PgPool;
use uuid::Uuid;

/// Column list shared by the page queries
pub const PAGE_COLUMNS: &str = "id, project_id, author_id, title, slug, content, index, listed, \
     collaborative, status, deleted_at, created_at, updated_at";

#[derive(Clone)]
pub struct PageRepository {
    pool: PgPool,
}

impl PageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find page by ID
    pub async fn find(&self, id: Uuid) -> Result<Option<Page>> {
        let query = format!("SELECT {PAGE_COLUMNS} FROM pages WHERE id = $1");
        let page = sqlx::query_as::<_, Page>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(page)
    }

    /// Find a listed, active task by project and page slug
    pub async fn find_task(&self, project_id: Uuid, page_slug: &str) -> Result<Option<Page>> {
        let query = format!(
            "SELECT {PAGE_COLUMNS} FROM pages \
             WHERE project_id = $1 AND slug = $2 AND listed AND status = 'active'"
        );
        let page = sqlx::query_as::<_, Page>(&query)
            .bind(project_id)
            .bind(page_slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(page)
    }

    /// Listed active tasks for a project, in order
    pub async fn list_tasks(&self, project_id: Uuid) -> Result<Vec<Page>> {
        let query = format!(
            "SELECT {PAGE_COLUMNS} FROM pages \
             WHERE project_id = $1 AND listed AND status = 'active' \
             ORDER BY index ASC"
        );
        let pages = sqlx::query_as::<_, Page>(&query)
            .bind(project_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(pages)
    }

    /// Number of listed active tasks (the progress denominator)
    pub async fn count_tasks(&self, project_id: Uuid) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM pages \
             WHERE project_id = $1 AND listed AND status = 'active'",
        )
        .bind(project_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }
}
