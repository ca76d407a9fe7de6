//! Postgres-backed outbox
//!
//! Appends intents to the `outbox` table. Delivery is the job of an
//! external drainer process; rows carry a `delivered_at` column it stamps.

use sqlx::PgPool;

use crate::{Outbox, OutboxError, OutboxIntent};

#[derive(Clone)]
pub struct PgOutbox {
    pool: PgPool,
}

impl PgOutbox {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl Outbox for PgOutbox {
    async fn enqueue(&self, intent: OutboxIntent) -> Result<(), OutboxError> {
        let payload = serde_json::to_value(&intent)
            .map_err(|e| OutboxError::Enqueue(format!("Failed to serialize intent: {}", e)))?;

        sqlx::query(
            r#"
            INSERT INTO outbox (kind, payload)
            VALUES ($1, $2)
            "#,
        )
        .bind(intent.kind())
        .bind(sqlx::types::Json(payload))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, kind = intent.kind(), "Failed to enqueue outbox intent");
            OutboxError::Enqueue(e.to_string())
        })?;

        tracing::debug!(kind = intent.kind(), "Outbox intent enqueued");
        Ok(())
    }
}
