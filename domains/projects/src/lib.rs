//! Projects domain: study groups, courses and challenges
//!
//! Organizers create projects, participants join and complete tasks,
//! organizers curate links and import historical courses from the
//! legacy site, and allowlisted administrators export participation
//! metrics.

pub mod api;
pub mod domain;
pub mod repository;

// Re-export domain types at the crate root for convenience
pub use domain::capability::{authorize, AccessContext, Check};
pub use domain::entities::{
    Activity, ActivityVerb, Link, Page, Participation, Project, ProjectKind, Relationship, School,
    Signup, SignupPolicy, TaskCompletion,
};
pub use domain::state::{
    CompletionStatus, PageStatus, ParticipationStatus, RelationshipStatus, StateError,
};

// Re-export repository types
pub use repository::{ProjectsRepositories, StatusUpdate};

// Re-export API types
pub use api::routes;
pub use api::{ProjectsSettings, ProjectsState};
