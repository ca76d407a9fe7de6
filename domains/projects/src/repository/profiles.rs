//! Profile read repository
//!
//! Profiles are owned by the external accounts system; this domain only
//! reads them for participant management and autocompletes.

use peerhub_auth::Profile;
use peerhub_common::Result;
use sqlx::PgPool;
use uuid::Uuid;

/// Column list shared by the profile queries
pub const PROFILE_COLUMNS: &str =
    "id, username, email, full_name, is_superuser, deleted, created_at";

#[derive(Clone)]
pub struct ProfileRepository {
    pool: PgPool,
}

impl ProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a non-deleted profile by username
    pub async fn find_by_username(&self, username: &str) -> Result<Option<Profile>> {
        let query = format!(
            "SELECT {PROFILE_COLUMNS} FROM profiles WHERE username = $1 AND NOT deleted"
        );
        let profile = sqlx::query_as::<_, Profile>(&query)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(profile)
    }

    /// Usernames matching a term among non-deleted profiles that are not
    /// active participants of the project
    pub async fn matching_non_participants(
        &self,
        project_id: Uuid,
        term: &str,
    ) -> Result<Vec<String>> {
        let pattern = format!("%{}%", term);
        let usernames = sqlx::query_scalar::<_, String>(
            r#"
            SELECT u.username
            FROM profiles u
            WHERE NOT u.deleted
              AND u.username ILIKE $2
              AND NOT EXISTS(
                SELECT 1 FROM participations p
                WHERE p.project_id = $1 AND p.user_id = u.id AND p.status = 'active')
            ORDER BY u.username
            "#,
        )
        .bind(project_id)
        .bind(pattern)
        .fetch_all(&self.pool)
        .await?;
        Ok(usernames)
    }

    /// Email addresses of a project's active organizers
    pub async fn organizer_emails(&self, project_id: Uuid) -> Result<Vec<String>> {
        let emails = sqlx::query_scalar::<_, String>(
            r#"
            SELECT u.email
            FROM participations p
            INNER JOIN profiles u ON p.user_id = u.id
            WHERE p.project_id = $1 AND p.status = 'active' AND p.organizing
            ORDER BY u.email
            "#,
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(emails)
    }
}
