//! API layer for the projects domain

pub mod handlers;
pub mod middleware;
pub mod report;
pub mod routes;

pub use middleware::{ProjectsSettings, ProjectsState};
pub use routes::routes;
