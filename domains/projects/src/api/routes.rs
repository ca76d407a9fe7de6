//! Route definitions for the projects domain API

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{legacy_courses, links, metrics, participants, projects, search, tasks};
use super::middleware::ProjectsState;

/// Project lifecycle routes
fn project_routes() -> Router<ProjectsState> {
    Router::new()
        .route(
            "/v1/projects",
            get(projects::list_projects).post(projects::create_project),
        )
        .route("/v1/projects/clone", post(projects::clone_project))
        .route("/v1/projects/import", post(projects::import_project))
        .route(
            "/v1/projects/{slug}",
            get(projects::get_project).patch(projects::update_project),
        )
        .route("/v1/projects/{slug}/status", axum::routing::patch(projects::update_status))
        .route("/v1/projects/{slug}/image", post(projects::upload_image))
}

/// Participant management routes
fn participant_routes() -> Router<ProjectsState> {
    Router::new()
        .route(
            "/v1/projects/{slug}/participants",
            get(participants::list_participants).post(participants::add_participant),
        )
        .route(
            "/v1/projects/{slug}/participants/{username}",
            axum::routing::delete(participants::remove_participant),
        )
        .route(
            "/v1/projects/{slug}/participants/{username}/promote",
            post(participants::promote_participant),
        )
        .route("/v1/projects/{slug}/people", get(participants::list_people))
        .route(
            "/v1/projects/{slug}/contact",
            post(participants::contact_organizers),
        )
}

/// Task routes
fn task_routes() -> Router<ProjectsState> {
    Router::new()
        .route("/v1/projects/{slug}/tasks", get(tasks::task_list))
        .route(
            "/v1/projects/{slug}/tasks/{page_slug}/toggle",
            post(tasks::toggle_task_completion),
        )
}

/// Link management routes
fn link_routes() -> Router<ProjectsState> {
    Router::new()
        .route(
            "/v1/projects/{slug}/links",
            get(links::list_links).post(links::add_link),
        )
        .route(
            "/v1/projects/{slug}/links/{link_id}",
            axum::routing::patch(links::update_link).delete(links::delete_link),
        )
}

/// Type-ahead search routes
fn search_routes() -> Router<ProjectsState> {
    Router::new()
        .route("/v1/projects/kinds", get(search::matching_kinds))
        .route("/v1/projects/search", get(search::matching_projects))
        .route("/v1/courses/search", get(search::matching_courses))
        .route(
            "/v1/projects/{slug}/people/search",
            get(search::matching_non_participants),
        )
}

/// Legacy course routes
fn legacy_routes() -> Router<ProjectsState> {
    Router::new().route(
        "/v1/users/{username}/past-courses",
        get(legacy_courses::past_courses),
    )
}

/// Metrics routes
fn metrics_routes() -> Router<ProjectsState> {
    Router::new()
        .route("/v1/projects/{slug}/metrics", get(metrics::admin_metrics))
        .route(
            "/v1/projects/{slug}/metrics/detailed.csv",
            get(metrics::export_detailed_csv),
        )
}

/// Create all projects domain API routes
pub fn routes() -> Router<ProjectsState> {
    Router::new()
        .merge(project_routes())
        .merge(participant_routes())
        .merge(task_routes())
        .merge(link_routes())
        .merge(search_routes())
        .merge(legacy_routes())
        .merge(metrics_routes())
}
