//! Participation repository

use crate::domain::entities::Participation;
use crate::domain::state::ParticipationStatus;
use peerhub_common::Result;
use sqlx::PgPool;
use uuid::Uuid;

/// Column list shared by the participation queries
pub const PARTICIPATION_COLUMNS: &str =
    "id, project_id, user_id, organizing, status, joined_at, left_at";

/// Participation with joined profile details for list responses
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ParticipationWithProfile {
    pub id: Uuid,
    pub project_id: Uuid,
    pub user_id: Uuid,
    pub organizing: bool,
    pub status: ParticipationStatus,
    pub joined_at: chrono::DateTime<chrono::Utc>,
    pub left_at: Option<chrono::DateTime<chrono::Utc>>,
    pub username: String,
    pub full_name: Option<String>,
}

#[derive(Clone)]
pub struct ParticipationRepository {
    pool: PgPool,
}

impl ParticipationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Get a user's active participation in a project
    pub async fn find_active(
        &self,
        project_id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Participation>> {
        let query = format!(
            "SELECT {PARTICIPATION_COLUMNS} FROM participations \
             WHERE project_id = $1 AND user_id = $2 AND status = 'active'"
        );
        let participation = sqlx::query_as::<_, Participation>(&query)
            .bind(project_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(participation)
    }

    /// Get a user's active participation by username
    pub async fn find_active_by_username(
        &self,
        project_id: Uuid,
        username: &str,
    ) -> Result<Option<Participation>> {
        let query = format!(
            "SELECT p.{} FROM participations p \
             INNER JOIN profiles u ON p.user_id = u.id \
             WHERE p.project_id = $1 AND u.username = $2 AND p.status = 'active'",
            PARTICIPATION_COLUMNS.replace(", ", ", p.")
        );
        let participation = sqlx::query_as::<_, Participation>(&query)
            .bind(project_id)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(participation)
    }

    /// All active participations for a project, oldest first
    pub async fn list_active(&self, project_id: Uuid) -> Result<Vec<ParticipationWithProfile>> {
        let rows = sqlx::query_as::<_, ParticipationWithProfile>(
            r#"
            SELECT p.id, p.project_id, p.user_id, p.organizing, p.status,
                   p.joined_at, p.left_at,
                   u.username, u.full_name
            FROM participations p
            INNER JOIN profiles u ON p.user_id = u.id
            WHERE p.project_id = $1 AND p.status = 'active'
            ORDER BY p.joined_at ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Active organizers for a project
    pub async fn organizers(&self, project_id: Uuid) -> Result<Vec<ParticipationWithProfile>> {
        let rows = sqlx::query_as::<_, ParticipationWithProfile>(
            r#"
            SELECT p.id, p.project_id, p.user_id, p.organizing, p.status,
                   p.joined_at, p.left_at,
                   u.username, u.full_name
            FROM participations p
            INNER JOIN profiles u ON p.user_id = u.id
            WHERE p.project_id = $1 AND p.status = 'active' AND p.organizing
            ORDER BY p.joined_at ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Active non-organizer participants for a project
    pub async fn non_organizer_participants(
        &self,
        project_id: Uuid,
    ) -> Result<Vec<ParticipationWithProfile>> {
        let rows = sqlx::query_as::<_, ParticipationWithProfile>(
            r#"
            SELECT p.id, p.project_id, p.user_id, p.organizing, p.status,
                   p.joined_at, p.left_at,
                   u.username, u.full_name
            FROM participations p
            INNER JOIN profiles u ON p.user_id = u.id
            WHERE p.project_id = $1 AND p.status = 'active' AND NOT p.organizing
            ORDER BY p.joined_at ASC
            "#,
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Usernames of active non-organizer participants (metrics input)
    pub async fn non_organizer_usernames(&self, project_id: Uuid) -> Result<Vec<String>> {
        let usernames = sqlx::query_scalar::<_, String>(
            r#"
            SELECT u.username
            FROM participations p
            INNER JOIN profiles u ON p.user_id = u.id
            WHERE p.project_id = $1 AND p.status = 'active' AND NOT p.organizing
            ORDER BY u.username
            "#,
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(usernames)
    }

    /// Create a participation row
    pub async fn create(&self, participation: &Participation) -> Result<Participation> {
        let query = format!(
            "INSERT INTO participations ({PARTICIPATION_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {PARTICIPATION_COLUMNS}"
        );
        let created = sqlx::query_as::<_, Participation>(&query)
            .bind(participation.id)
            .bind(participation.project_id)
            .bind(participation.user_id)
            .bind(participation.organizing)
            .bind(participation.status)
            .bind(participation.joined_at)
            .bind(participation.left_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    /// Soft leave: the row survives with status `left` and a timestamp
    pub async fn mark_left(&self, id: Uuid) -> Result<Option<Participation>> {
        let query = format!(
            "UPDATE participations SET status = 'left', left_at = NOW() \
             WHERE id = $1 AND status = 'active' \
             RETURNING {PARTICIPATION_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Participation>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(updated)
    }

    /// One-way organizer promotion
    pub async fn mark_organizing(&self, id: Uuid) -> Result<Option<Participation>> {
        let query = format!(
            "UPDATE participations SET organizing = TRUE \
             WHERE id = $1 AND status = 'active' \
             RETURNING {PARTICIPATION_COLUMNS}"
        );
        let updated = sqlx::query_as::<_, Participation>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(updated)
    }
}
