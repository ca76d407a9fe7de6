//! Peerhub outbox
//!
//! Side effects that used to be dispatched fire-and-forget (feed
//! unsubscription when an organizer repurposes a link) are recorded as
//! explicit intents instead. The caller enqueues an [`OutboxIntent`] and
//! decides what an enqueue failure means for the surrounding operation;
//! an external drainer delivers the intents.

pub mod mock;
pub mod pg;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum OutboxError {
    #[error("Outbox configuration error: {0}")]
    Configuration(String),

    #[error("Outbox enqueue error: {0}")]
    Enqueue(String),
}

/// An intent waiting to be delivered by the outbox drainer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutboxIntent {
    /// Stop a feed subscription attached to a project link
    FeedUnsubscribe {
        link_id: Uuid,
        subscription_id: Uuid,
    },
}

impl OutboxIntent {
    /// Stable kind discriminator stored alongside the payload
    pub fn kind(&self) -> &'static str {
        match self {
            OutboxIntent::FeedUnsubscribe { .. } => "feed_unsubscribe",
        }
    }
}

/// Outbox service trait for different implementations.
#[async_trait::async_trait]
pub trait Outbox: Send + Sync {
    /// Record an intent for later delivery.
    async fn enqueue(&self, intent: OutboxIntent) -> Result<(), OutboxError>;
}

/// Outbox configuration.
#[derive(Debug, Clone)]
pub struct OutboxConfig {
    /// Outbox provider (postgres, mock)
    pub provider: String,
}

impl OutboxConfig {
    /// Create outbox config from environment variables.
    pub fn from_env() -> Result<Self, OutboxError> {
        let provider = std::env::var("OUTBOX_PROVIDER").unwrap_or_else(|_| "postgres".to_string());
        Ok(Self { provider })
    }
}

/// Factory for creating Outbox implementations.
pub struct OutboxFactory;

impl OutboxFactory {
    /// Create an Outbox based on configuration.
    pub fn create(
        config: OutboxConfig,
        pool: sqlx::PgPool,
    ) -> Result<Box<dyn Outbox>, OutboxError> {
        match config.provider.as_str() {
            "postgres" => {
                tracing::info!("Creating Postgres outbox");
                Ok(Box::new(pg::PgOutbox::new(pool)))
            }
            "mock" => {
                tracing::info!("Creating mock outbox");
                Ok(Box::new(mock::MockOutbox::new()))
            }
            provider => Err(OutboxError::Configuration(format!(
                "Unknown outbox provider: {}. Supported providers: postgres, mock",
                provider
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_kind() {
        let intent = OutboxIntent::FeedUnsubscribe {
            link_id: Uuid::new_v4(),
            subscription_id: Uuid::new_v4(),
        };
        assert_eq!(intent.kind(), "feed_unsubscribe");
    }

    #[test]
    fn test_intent_serialization_tagged() {
        let link_id = Uuid::new_v4();
        let subscription_id = Uuid::new_v4();
        let intent = OutboxIntent::FeedUnsubscribe {
            link_id,
            subscription_id,
        };

        let json = serde_json::to_value(&intent).unwrap();
        assert_eq!(json["kind"], "feed_unsubscribe");
        assert_eq!(json["link_id"], link_id.to_string());
        assert_eq!(json["subscription_id"], subscription_id.to_string());
    }

    #[tokio::test]
    async fn test_mock_enqueue_records_intent() {
        let outbox = mock::MockOutbox::new();
        let intent = OutboxIntent::FeedUnsubscribe {
            link_id: Uuid::new_v4(),
            subscription_id: Uuid::new_v4(),
        };

        outbox.enqueue(intent.clone()).await.unwrap();

        let recorded = outbox.recorded_intents();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0], intent);
    }

    #[test]
    fn test_error_display() {
        let err = OutboxError::Configuration("bad provider".to_string());
        assert_eq!(err.to_string(), "Outbox configuration error: bad provider");
    }
}
