//! API handlers for the projects domain

pub mod legacy_courses;
pub mod links;
pub mod metrics;
pub mod participants;
pub mod projects;
pub mod search;
pub mod tasks;

use axum::{
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
};
use uuid::Uuid;

use peerhub_common::{Error, Result};
use peerhub_legacy::LegacyError;

use crate::api::middleware::ProjectsState;
use crate::domain::entities::Project;

/// Content type of the legacy ajax autocomplete endpoints.
const AUTOCOMPLETE_CONTENT_TYPE: &str = "application/x-javascript";

/// A plain JSON array of strings served with the legacy ajax content
/// type expected by the autocomplete widgets.
#[derive(Debug)]
pub struct JsArray(pub Vec<String>);

impl IntoResponse for JsArray {
    fn into_response(self) -> Response {
        let body = serde_json::to_string(&self.0).unwrap_or_else(|_| "[]".to_string());
        ([(CONTENT_TYPE, AUTOCOMPLETE_CONTENT_TYPE)], body).into_response()
    }
}

/// Load a project by slug or 404.
pub(crate) async fn project_by_slug(state: &ProjectsState, slug: &str) -> Result<Project> {
    state
        .repos
        .projects
        .find_by_slug(slug)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Project {} not found", slug)))
}

/// The caller's (organizing, participating) flags for a project.
pub(crate) async fn participation_flags(
    state: &ProjectsState,
    project_id: Uuid,
    user_id: Uuid,
) -> Result<(bool, bool)> {
    let participation = state
        .repos
        .participations
        .find_active(project_id, user_id)
        .await?;
    match participation {
        Some(p) => Ok((p.organizing, true)),
        None => Ok((false, false)),
    }
}

/// Convert a legacy adapter failure into an API error: lookup misses
/// become 404, everything else surfaces as an internal error.
pub(crate) fn from_legacy_error(e: LegacyError) -> Error {
    match e {
        LegacyError::NotFound(what) => Error::NotFound(format!("Legacy {}", what)),
        LegacyError::InvalidData(msg) => Error::Internal(msg),
        LegacyError::Database(e) => Error::Database(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_js_array_content_type() {
        let response = JsArray(vec!["course-a".to_string()]).into_response();
        assert_eq!(
            response.headers().get(CONTENT_TYPE).unwrap(),
            AUTOCOMPLETE_CONTENT_TYPE
        );
    }

    #[test]
    fn test_from_legacy_error_maps_not_found() {
        let err = from_legacy_error(LegacyError::NotFound("url alias for x".to_string()));
        assert!(matches!(err, Error::NotFound(_)));
    }
}
