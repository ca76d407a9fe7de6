//! Follow-relationship repository

use crate::domain::entities::Relationship;
use peerhub_common::Result;
use sqlx::PgPool;
use uuid::Uuid;

/// Column list shared by the relationship queries
pub const RELATIONSHIP_COLUMNS: &str =
    "id, source_user_id, target_project_id, status, created_at, ended_at";

#[derive(Clone)]
pub struct RelationshipRepository {
    pool: PgPool,
}

impl RelationshipRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Whether a user actively follows a project
    pub async fn is_following(&self, user_id: Uuid, project_id: Uuid) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS( \
                SELECT 1 FROM relationships \
                WHERE source_user_id = $1 AND target_project_id = $2 AND status = 'active')",
        )
        .bind(user_id)
        .bind(project_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    /// Usernames of active followers who are not active participants
    pub async fn non_participant_follower_usernames(
        &self,
        project_id: Uuid,
    ) -> Result<Vec<String>> {
        let usernames = sqlx::query_scalar::<_, String>(
            r#"
            SELECT u.username
            FROM relationships r
            INNER JOIN profiles u ON r.source_user_id = u.id
            WHERE r.target_project_id = $1 AND r.status = 'active'
              AND NOT EXISTS(
                SELECT 1 FROM participations p
                WHERE p.project_id = r.target_project_id
                  AND p.user_id = r.source_user_id
                  AND p.status = 'active')
            ORDER BY u.username
            "#,
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(usernames)
    }

    /// Usernames of previous followers — ended relationships whose user
    /// is no longer an active participant (includes previous participants)
    pub async fn previous_follower_usernames(&self, project_id: Uuid) -> Result<Vec<String>> {
        let usernames = sqlx::query_scalar::<_, String>(
            r#"
            SELECT u.username
            FROM relationships r
            INNER JOIN profiles u ON r.source_user_id = u.id
            WHERE r.target_project_id = $1 AND r.status = 'ended'
              AND NOT EXISTS(
                SELECT 1 FROM participations p
                WHERE p.project_id = r.target_project_id
                  AND p.user_id = r.source_user_id
                  AND p.status = 'active')
            ORDER BY u.username
            "#,
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(usernames)
    }

    /// Get-or-create the follow and force it active
    pub async fn upsert_active(&self, user_id: Uuid, project_id: Uuid) -> Result<Relationship> {
        let relationship = Relationship::new(user_id, project_id);
        let query = format!(
            "INSERT INTO relationships ({RELATIONSHIP_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             ON CONFLICT (source_user_id, target_project_id) \
             DO UPDATE SET status = 'active', ended_at = NULL \
             RETURNING {RELATIONSHIP_COLUMNS}"
        );
        let upserted = sqlx::query_as::<_, Relationship>(&query)
            .bind(relationship.id)
            .bind(relationship.source_user_id)
            .bind(relationship.target_project_id)
            .bind(relationship.status)
            .bind(relationship.created_at)
            .bind(relationship.ended_at)
            .fetch_one(&self.pool)
            .await?;
        Ok(upserted)
    }
}
