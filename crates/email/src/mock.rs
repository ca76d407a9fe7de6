//! Mock email service implementation
//!
//! Stores messages in memory for test assertions.
//! Thread-safe via `Arc<Mutex<>>`.

use crate::{EmailError, EmailService, OrganizerMessage};
use std::sync::{Arc, Mutex};

/// Mock email service that records messages for test assertions.
#[derive(Debug, Clone)]
pub struct MockEmailService {
    messages: Arc<Mutex<Vec<OrganizerMessage>>>,
}

impl MockEmailService {
    /// Create a new mock email service.
    pub fn new() -> Self {
        Self {
            messages: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Return all recorded messages.
    pub fn recorded_messages(&self) -> Vec<OrganizerMessage> {
        self.messages
            .lock()
            .expect("messages lock poisoned — prior test panicked")
            .clone()
    }

    /// Clear all recorded messages.
    pub fn reset(&self) {
        self.messages
            .lock()
            .expect("messages lock poisoned — prior test panicked")
            .clear();
    }
}

impl Default for MockEmailService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl EmailService for MockEmailService {
    async fn send_organizer_message(&self, message: OrganizerMessage) -> Result<(), EmailError> {
        tracing::debug!(subject = %message.subject, "Mock email: recording message");
        self.messages
            .lock()
            .map_err(|e| EmailError::Delivery(format!("messages lock poisoned: {e}")))?
            .push(message);
        Ok(())
    }
}
