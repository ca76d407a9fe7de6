//! Signup repository

use crate::domain::entities::Signup;
use peerhub_common::Result;
use sqlx::PgPool;
use uuid::Uuid;

/// Column list shared by the signup queries
pub const SIGNUP_COLUMNS: &str = "id, project_id, author_id, policy, created_at";

#[derive(Clone)]
pub struct SignupRepository {
    pool: PgPool,
}

impl SignupRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The project's signup record (exactly one per project)
    pub async fn find_by_project(&self, project_id: Uuid) -> Result<Option<Signup>> {
        let query = format!("SELECT {SIGNUP_COLUMNS} FROM signups WHERE project_id = $1");
        let signup = sqlx::query_as::<_, Signup>(&query)
            .bind(project_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(signup)
    }
}
