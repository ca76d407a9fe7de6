//! Type-ahead search handlers
//!
//! These endpoints keep the legacy ajax contract: a plain JSON array of
//! strings with the `application/x-javascript` content type. An empty
//! search term is a not-found, except for the kinds endpoint which then
//! lists every kind.

use axum::extract::{Path, Query, State};
use serde::Deserialize;

use peerhub_common::{Error, Result};

use crate::api::handlers::{from_legacy_error, project_by_slug, JsArray};
use crate::api::middleware::ProjectsState;

/// Common autocomplete query
#[derive(Debug, Deserialize, Default)]
pub struct TermQuery {
    #[serde(default)]
    pub term: String,
}

/// Course search query: term plus optional school scope
#[derive(Debug, Deserialize, Default)]
pub struct CourseSearchQuery {
    #[serde(default)]
    pub term: String,
    pub school: Option<String>,
}

/// Kind autocomplete
///
/// **GET /v1/projects/kinds?term=**
///
/// An empty term returns every kind in use.
pub async fn matching_kinds(
    State(state): State<ProjectsState>,
    Query(query): Query<TermQuery>,
) -> Result<JsArray> {
    let kinds = state.repos.projects.distinct_kinds().await?;

    let needle = query.term.to_lowercase();
    let labels = kinds
        .into_iter()
        .map(|kind| kind.label().to_string())
        .filter(|label| needle.is_empty() || label.contains(&needle))
        .collect();

    Ok(JsArray(labels))
}

/// Project slug autocomplete
///
/// **GET /v1/projects/search?term=**
pub async fn matching_projects(
    State(state): State<ProjectsState>,
    Query(query): Query<TermQuery>,
) -> Result<JsArray> {
    if query.term.is_empty() {
        return Err(Error::NotFound("Empty search term".to_string()));
    }

    let slugs = state.repos.projects.matching_slugs(&query.term).await?;
    Ok(JsArray(slugs))
}

/// Legacy course slug autocomplete
///
/// **GET /v1/courses/search?term=&school=**
pub async fn matching_courses(
    State(state): State<ProjectsState>,
    Query(query): Query<CourseSearchQuery>,
) -> Result<JsArray> {
    if query.term.is_empty() {
        return Err(Error::NotFound("Empty search term".to_string()));
    }

    let old_term_name = match query.school.as_deref() {
        Some(school_slug) => state
            .repos
            .schools
            .find_by_slug(school_slug)
            .await?
            .ok_or_else(|| Error::NotFound(format!("School {} not found", school_slug)))?
            .old_term_name,
        None => None,
    };

    let slugs = state
        .legacy
        .matching_course_slugs(old_term_name.as_deref(), &query.term)
        .await
        .map_err(from_legacy_error)?;

    Ok(JsArray(slugs))
}

/// Non-participant username autocomplete for the add-participant form
///
/// **GET /v1/projects/{slug}/people/search?term=**
pub async fn matching_non_participants(
    State(state): State<ProjectsState>,
    Path(slug): Path<String>,
    Query(query): Query<TermQuery>,
) -> Result<JsArray> {
    let project = project_by_slug(&state, &slug).await?;

    if query.term.is_empty() {
        return Err(Error::NotFound("Empty search term".to_string()));
    }

    let usernames = state
        .repos
        .profiles
        .matching_non_participants(project.id, &query.term)
        .await?;
    Ok(JsArray(usernames))
}
