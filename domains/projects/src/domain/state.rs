//! Status enums for the projects domain
//!
//! The legacy data model used nullable timestamps as soft-delete
//! sentinels; here every soft state is an explicit status enum paired
//! with a timestamp column. The two transitions with business meaning
//! (leaving a project, unchecking a completed task) get state machines.

pub use peerhub_common::StateError;
use serde::{Deserialize, Serialize};

/// Participation states: members stay on the books after leaving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "participation_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ParticipationStatus {
    #[default]
    Active,
    Left,
}

impl ParticipationStatus {
    /// Get all valid next states from the current state
    pub fn valid_transitions(&self) -> &'static [ParticipationStatus] {
        match self {
            Self::Active => &[Self::Left],
            Self::Left => &[],
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}

impl std::fmt::Display for ParticipationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Left => write!(f, "left"),
        }
    }
}

/// Page states: deletion hides a page but keeps its history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "page_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PageStatus {
    #[default]
    Active,
    Deleted,
}

impl std::fmt::Display for PageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Deleted => write!(f, "deleted"),
        }
    }
}

/// Task completion states. A row is born Completed; unchecking it is
/// terminal — completing the task again creates a fresh row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "completion_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CompletionStatus {
    #[default]
    Completed,
    Unchecked,
}

impl CompletionStatus {
    /// Get all valid next states from the current state
    pub fn valid_transitions(&self) -> &'static [CompletionStatus] {
        match self {
            Self::Completed => &[Self::Unchecked],
            Self::Unchecked => &[],
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}

impl std::fmt::Display for CompletionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Completed => write!(f, "completed"),
            Self::Unchecked => write!(f, "unchecked"),
        }
    }
}

/// Follow-relationship states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "relationship_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RelationshipStatus {
    #[default]
    Active,
    Ended,
}

impl std::fmt::Display for RelationshipStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Ended => write!(f, "ended"),
        }
    }
}

/// Shared transition guard for the one-way machines above.
pub(crate) fn transition<S>(current: S, next: S) -> Result<S, StateError>
where
    S: Copy + PartialEq + std::fmt::Display + HasTransitions,
{
    if current.transitions().contains(&next) {
        Ok(next)
    } else if current.transitions().is_empty() {
        Err(StateError::TerminalState(current.to_string()))
    } else {
        Err(StateError::InvalidTransition {
            from: current.to_string(),
            to: next.to_string(),
            event: next.to_string(),
        })
    }
}

/// Enums with a static transition table.
pub(crate) trait HasTransitions: Sized + 'static {
    fn transitions(&self) -> &'static [Self];
}

impl HasTransitions for ParticipationStatus {
    fn transitions(&self) -> &'static [Self] {
        self.valid_transitions()
    }
}

impl HasTransitions for CompletionStatus {
    fn transitions(&self) -> &'static [Self] {
        self.valid_transitions()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_participation_active_to_left() {
        let next = transition(ParticipationStatus::Active, ParticipationStatus::Left);
        assert_eq!(next, Ok(ParticipationStatus::Left));
    }

    #[test]
    fn test_participation_left_is_terminal() {
        assert!(ParticipationStatus::Left.is_terminal());
        let result = transition(ParticipationStatus::Left, ParticipationStatus::Active);
        assert!(matches!(result, Err(StateError::TerminalState(_))));
    }

    #[test]
    fn test_completion_completed_to_unchecked() {
        let next = transition(CompletionStatus::Completed, CompletionStatus::Unchecked);
        assert_eq!(next, Ok(CompletionStatus::Unchecked));
    }

    #[test]
    fn test_completion_unchecked_is_terminal() {
        assert!(CompletionStatus::Unchecked.is_terminal());
        let result = transition(CompletionStatus::Unchecked, CompletionStatus::Completed);
        assert!(matches!(result, Err(StateError::TerminalState(_))));
    }

    #[test]
    fn test_status_display() {
        assert_eq!(ParticipationStatus::Active.to_string(), "active");
        assert_eq!(CompletionStatus::Unchecked.to_string(), "unchecked");
        assert_eq!(RelationshipStatus::Ended.to_string(), "ended");
        assert_eq!(PageStatus::Deleted.to_string(), "deleted");
    }
}
