//! Link repository

use crate::domain::entities::Link;
use peerhub_common::Result;
use sqlx::PgPool;
use uuid::Uuid;

/// Column list shared by the link queries
pub const LINK_COLUMNS: &str =
    "id, project_id, user_id, name, url, index, subscription_id, created_at";

#[derive(Clone)]
pub struct LinkRepository {
    pool: PgPool,
}

impl LinkRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find link by ID
    pub async fn find(&self, id: Uuid) -> Result<Option<Link>> {
        let query = format!("SELECT {LINK_COLUMNS} FROM links WHERE id = $1");
        let link = sqlx::query_as::<_, Link>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(link)
    }

    /// Links for a project, in curation order
    pub async fn list_for_project(&self, project_id: Uuid) -> Result<Vec<Link>> {
        let query = format!(
            "SELECT {LINK_COLUMNS} FROM links WHERE project_id = $1 ORDER BY index ASC"
        );
        let links = sqlx::query_as::<_, Link>(&query)
            .bind(project_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(links)
    }

    /// Create a link, appending it to the project's curation order
    pub async fn create(&self, link: &Link) -> Result<Link> {
        let query = format!(
            "INSERT INTO links (id, project_id, user_id, name, url, index, subscription_id, created_at) \
             VALUES ($1, $2, $3, $4, $5, \
                     (SELECT COALESCE(MAX(index), 0) + 1 FROM links WHERE project_id = $2), \
                     $6, $7) \
             RETURNING {LINK_COLUMNS}"
        );
        let created = sqlx::query_as::<_, Link>(&query)
            .bind(link.id)
            .bind(link.project_id)
            .bind(link.user_id)
            .bind(&link.name)
            .bind(&link.url)
            .bind(link.subscription_id)
            .bind(link.created_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    /// Update a link's name and URL
    pub async fn update(&self, id: Uuid, name: &str, url: &str) -> Result<Option<Link>> {
        let query = format!(
            "UPDATE links SET name = $2, url = $3 WHERE id = $1 RETURNING {LINK_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Link>(&query)
            .bind(id)
            .bind(name)
            .bind(url)
            .fetch_optional(&self.pool)
            .await?;
        Ok(updated)
    }

    /// Detach a feed subscription before repurposing a link
    pub async fn clear_subscription(&self, id: Uuid) -> Result<()> {
        sqlx::query("UPDATE links SET subscription_id = NULL WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Delete a link
    pub async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM links WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
