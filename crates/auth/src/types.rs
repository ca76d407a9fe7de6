//! Auth read-model types

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// User profile read model loaded during authentication.
///
/// Owned by the external accounts system; this service only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: Option<String>,
    pub is_superuser: bool,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    /// Display name: full name when present, username otherwise
    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or(&self.username)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(full_name: Option<&str>) -> Profile {
        Profile {
            id: Uuid::new_v4(),
            username: "maria".to_string(),
            email: "maria@example.com".to_string(),
            full_name: full_name.map(str::to_string),
            is_superuser: false,
            deleted: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_display_name_prefers_full_name() {
        assert_eq!(profile(Some("Maria Silva")).display_name(), "Maria Silva");
    }

    #[test]
    fn test_display_name_falls_back_to_username() {
        assert_eq!(profile(None).display_name(), "maria");
    }
}
