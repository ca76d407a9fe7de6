//! Legacy course handlers
//!
//! Read-only views over the old site's database: the completed courses
//! a user organized or participated in before the migration. Profile
//! pages render these next to the user's current projects.

use axum::{
    extract::{Path, State},
    Json,
};

use peerhub_common::Result;
use peerhub_legacy::PastCourse;

use crate::api::handlers::from_legacy_error;
use crate::api::middleware::ProjectsState;

/// Completed legacy courses for a username
///
/// **GET /v1/users/{username}/past-courses**
///
/// An unknown username yields an empty list; a broken legacy record
/// surfaces as an error.
pub async fn past_courses(
    State(state): State<ProjectsState>,
    Path(username): Path<String>,
) -> Result<Json<Vec<PastCourse>>> {
    let courses = state
        .legacy
        .past_courses(&username)
        .await
        .map_err(from_legacy_error)?;

    Ok(Json(courses))
}
