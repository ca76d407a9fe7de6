//! Log-based email delivery for local development

use crate::{EmailError, EmailService, OrganizerMessage};

/// Email service that writes messages to the log instead of sending them.
#[derive(Debug, Clone, Default)]
pub struct LogEmailService;

impl LogEmailService {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl EmailService for LogEmailService {
    async fn send_organizer_message(&self, message: OrganizerMessage) -> Result<(), EmailError> {
        tracing::info!(
            project = %message.project_name,
            sender = %message.sender_username,
            recipients = message.recipients.len(),
            subject = %message.subject,
            "Organizer message (log delivery)"
        );
        Ok(())
    }
}
