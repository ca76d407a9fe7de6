//! Project repository

use crate::domain::entities::{Project, ProjectKind};
use chrono::NaiveDate;
use peerhub_common::Result;
use sqlx::PgPool;
use uuid::Uuid;

/// Column list shared by the project queries
pub const PROJECT_COLUMNS: &str = "id, slug, kind, name, short_description, long_description, \
     image_path, school_id, detailed_description_id, clone_of, imported_from, \
     listed, under_development, signup_closed, start_date, end_date, \
     published_at, created_at, updated_at";

/// Fields updated by the status form
#[derive(Debug, Clone)]
pub struct StatusUpdate {
    pub listed: bool,
    pub under_development: bool,
    pub signup_closed: bool,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Clone)]
pub struct ProjectRepository {
    pool: PgPool,
}

impl ProjectRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find project by ID
    pub async fn find(&self, id: Uuid) -> Result<Option<Project>> {
        let query = format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1");
        let project = sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(project)
    }

    /// Find project by slug
    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<Project>> {
        let query = format!("SELECT {PROJECT_COLUMNS} FROM projects WHERE slug = $1");
        let project = sqlx::query_as::<_, Project>(&query)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(project)
    }

    /// List listed projects ordered by name, optionally school-filtered
    pub async fn list_listed(
        &self,
        school_id: Option<Uuid>,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<Project>> {
        let projects = match school_id {
            Some(school_id) => {
                let query = format!(
                    "SELECT {PROJECT_COLUMNS} FROM projects \
                     WHERE listed AND school_id = $1 \
                     ORDER BY name ASC OFFSET $2 LIMIT $3"
                );
                sqlx::query_as::<_, Project>(&query)
                    .bind(school_id)
                    .bind(offset)
                    .bind(limit)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let query = format!(
                    "SELECT {PROJECT_COLUMNS} FROM projects \
                     WHERE listed \
                     ORDER BY name ASC OFFSET $1 LIMIT $2"
                );
                sqlx::query_as::<_, Project>(&query)
                    .bind(offset)
                    .bind(limit)
                    .fetch_all(&self.pool)
                    .await?
            }
        };
        Ok(projects)
    }

    /// Update the summary fields edited on the project form
    pub async fn update_summary(
        &self,
        id: Uuid,
        name: &str,
        short_description: &str,
        long_description: Option<&str>,
        school_id: Option<Uuid>,
    ) -> Result<Option<Project>> {
        let query = format!(
            "UPDATE projects SET \
                name = $2, short_description = $3, long_description = $4, \
                school_id = $5, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {PROJECT_COLUMNS}"
        );
        let project = sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(name)
            .bind(short_description)
            .bind(long_description)
            .bind(school_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(project)
    }

    /// Update the status fields
    pub async fn update_status(&self, id: Uuid, update: &StatusUpdate) -> Result<Option<Project>> {
        let query = format!(
            "UPDATE projects SET \
                listed = $2, under_development = $3, signup_closed = $4, \
                start_date = $5, end_date = $6, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {PROJECT_COLUMNS}"
        );
        let project = sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(update.listed)
            .bind(update.under_development)
            .bind(update.signup_closed)
            .bind(update.start_date)
            .bind(update.end_date)
            .fetch_optional(&self.pool)
            .await?;
        Ok(project)
    }

    /// Record a freshly uploaded image
    pub async fn update_image(&self, id: Uuid, image_path: &str) -> Result<Option<Project>> {
        let query = format!(
            "UPDATE projects SET image_path = $2, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {PROJECT_COLUMNS}"
        );
        let project = sqlx::query_as::<_, Project>(&query)
            .bind(id)
            .bind(image_path)
            .fetch_optional(&self.pool)
            .await?;
        Ok(project)
    }

    /// Distinct kinds currently in use
    pub async fn distinct_kinds(&self) -> Result<Vec<ProjectKind>> {
        let kinds = sqlx::query_scalar::<_, ProjectKind>(
            "SELECT DISTINCT kind FROM projects ORDER BY kind",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(kinds)
    }

    /// Slugs containing the search term
    pub async fn matching_slugs(&self, term: &str) -> Result<Vec<String>> {
        let pattern = format!("%{}%", term.to_lowercase());
        let slugs = sqlx::query_scalar::<_, String>(
            "SELECT slug FROM projects WHERE slug LIKE $1 ORDER BY slug",
        )
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;
        Ok(slugs)
    }
}
