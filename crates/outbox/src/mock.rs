//! Mock outbox implementation
//!
//! Stores intents in memory for test assertions.
//! Thread-safe via `Arc<Mutex<>>`.

use crate::{Outbox, OutboxError, OutboxIntent};
use std::sync::{Arc, Mutex};

/// Mock outbox that records intents for test assertions.
#[derive(Debug, Clone)]
pub struct MockOutbox {
    intents: Arc<Mutex<Vec<OutboxIntent>>>,
}

impl MockOutbox {
    /// Create a new mock outbox.
    pub fn new() -> Self {
        Self {
            intents: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Return all recorded intents.
    pub fn recorded_intents(&self) -> Vec<OutboxIntent> {
        self.intents
            .lock()
            .expect("intents lock poisoned — prior test panicked")
            .clone()
    }

    /// Clear all recorded intents.
    pub fn reset(&self) {
        self.intents
            .lock()
            .expect("intents lock poisoned — prior test panicked")
            .clear();
    }
}

impl Default for MockOutbox {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl Outbox for MockOutbox {
    async fn enqueue(&self, intent: OutboxIntent) -> Result<(), OutboxError> {
        tracing::debug!(kind = intent.kind(), "Mock outbox: recording intent");
        self.intents
            .lock()
            .map_err(|e| OutboxError::Enqueue(format!("intents lock poisoned: {e}")))?
            .push(intent);
        Ok(())
    }
}
