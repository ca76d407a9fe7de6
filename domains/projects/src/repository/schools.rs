//! School repository

use crate::domain::entities::School;
use peerhub_common::Result;
use sqlx::PgPool;
use uuid::Uuid;

/// Column list shared by the school queries
pub const SCHOOL_COLUMNS: &str = "id, slug, name, old_term_name";

#[derive(Clone)]
pub struct SchoolRepository {
    pool: PgPool,
}

impl SchoolRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find school by ID
    pub async fn find(&self, id: Uuid) -> Result<Option<School>> {
        let query = format!("SELECT {SCHOOL_COLUMNS} FROM schools WHERE id = $1");
        let school = sqlx::query_as::<_, School>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(school)
    }

    /// Find school by slug
    pub async fn find_by_slug(&self, slug: &str) -> Result<Option<School>> {
        let query = format!("SELECT {SCHOOL_COLUMNS} FROM schools WHERE slug = $1");
        let school = sqlx::query_as::<_, School>(&query)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(school)
    }

    /// Find the school mapped onto a legacy taxonomy term name
    pub async fn find_by_old_term_name(&self, old_term_name: &str) -> Result<Option<School>> {
        let query = format!("SELECT {SCHOOL_COLUMNS} FROM schools WHERE old_term_name = $1");
        let school = sqlx::query_as::<_, School>(&query)
            .bind(old_term_name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(school)
    }
}
