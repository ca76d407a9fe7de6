//! Peerhub email service
//!
//! Delivers "message the organizers" mail. Two implementations:
//! - `LogEmailService`: writes the message to the log (local development)
//! - `MockEmailService`: records messages for test assertions

pub mod log;
pub mod mock;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum EmailError {
    #[error("Email configuration error: {0}")]
    Configuration(String),

    #[error("Email delivery error: {0}")]
    Delivery(String),
}

/// A message addressed to the organizers of a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganizerMessage {
    pub project_id: Uuid,
    pub project_name: String,
    pub sender_username: String,
    pub subject: String,
    pub body: String,
    /// Organizer email addresses resolved by the caller
    pub recipients: Vec<String>,
}

/// Email service trait for different implementations.
#[async_trait::async_trait]
pub trait EmailService: Send + Sync {
    /// Deliver a message to a project's organizers.
    async fn send_organizer_message(&self, message: OrganizerMessage) -> Result<(), EmailError>;
}

/// Email service configuration.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// Email provider (log, mock)
    pub provider: String,
}

impl EmailConfig {
    /// Create email config from environment variables.
    pub fn from_env() -> Result<Self, EmailError> {
        let provider = std::env::var("EMAIL_PROVIDER").unwrap_or_else(|_| "log".to_string());
        Ok(Self { provider })
    }
}

/// Factory for creating EmailService implementations.
pub struct EmailServiceFactory;

impl EmailServiceFactory {
    /// Create an EmailService based on configuration.
    pub fn create(config: EmailConfig) -> Result<Box<dyn EmailService>, EmailError> {
        match config.provider.as_str() {
            "log" => {
                tracing::info!("Creating log email service");
                Ok(Box::new(log::LogEmailService::new()))
            }
            "mock" => {
                tracing::info!("Creating mock email service");
                Ok(Box::new(mock::MockEmailService::new()))
            }
            provider => Err(EmailError::Configuration(format!(
                "Unknown email provider: {}. Supported providers: log, mock",
                provider
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message() -> OrganizerMessage {
        OrganizerMessage {
            project_id: Uuid::new_v4(),
            project_name: "Intro to Testing".to_string(),
            sender_username: "maria".to_string(),
            subject: "Question about week 2".to_string(),
            body: "Is the reading list final?".to_string(),
            recipients: vec!["organizer@example.com".to_string()],
        }
    }

    #[test]
    fn test_factory_log_succeeds() {
        let config = EmailConfig {
            provider: "log".to_string(),
        };
        assert!(EmailServiceFactory::create(config).is_ok());
    }

    #[test]
    fn test_factory_unknown_provider() {
        let config = EmailConfig {
            provider: "smtp".to_string(),
        };
        let err = match EmailServiceFactory::create(config) {
            Err(e) => e,
            Ok(_) => panic!("Expected error for unknown provider"),
        };
        assert!(err.to_string().contains("Unknown email provider: smtp"));
    }

    #[tokio::test]
    async fn test_mock_records_message() {
        let service = mock::MockEmailService::new();
        service.send_organizer_message(message()).await.unwrap();

        let recorded = service.recorded_messages();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].sender_username, "maria");
    }

    #[tokio::test]
    async fn test_log_service_accepts_message() {
        let service = log::LogEmailService::new();
        assert!(service.send_organizer_message(message()).await.is_ok());
    }
}
