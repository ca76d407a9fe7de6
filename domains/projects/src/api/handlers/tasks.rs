//! Task handlers: listing and completion toggling

use axum::{
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use peerhub_auth::AuthUser;
use peerhub_common::{Error, Result};

use crate::api::handlers::{participation_flags, project_by_slug};
use crate::api::middleware::ProjectsState;
use crate::domain::capability::{authorize, AccessContext, Check, CHALLENGE_KINDS};
use crate::domain::entities::{Page, TaskCompletion};

/// Response for task resources
#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub index: i32,
}

impl From<Page> for TaskResponse {
    fn from(page: Page) -> Self {
        Self {
            id: page.id,
            title: page.title,
            slug: page.slug,
            content: page.content,
            index: page.index,
        }
    }
}

/// Response for the completion toggle
#[derive(Debug, Serialize)]
pub struct ToggleTaskResponse {
    pub total_count: i64,
    pub completed_count: i64,
    pub progressbar_value: i64,
}

/// Completion percentage with integer floor; 0 when there are no tasks.
pub(crate) fn progressbar_value(completed_count: i64, total_count: i64) -> i64 {
    if total_count > 0 {
        completed_count * 100 / total_count
    } else {
        0
    }
}

/// List a project's tasks in order
///
/// **GET /v1/projects/{slug}/tasks**
///
/// Challenges show their tasks on the project page itself, so the
/// request is redirected to the project resource.
pub async fn task_list(
    State(state): State<ProjectsState>,
    Path(slug): Path<String>,
) -> Result<Response> {
    let project = project_by_slug(&state, &slug).await?;

    if project.is_challenge() {
        return Ok(Redirect::to(&format!("/v1/projects/{}", project.slug)).into_response());
    }

    let tasks = state.repos.pages.list_tasks(project.id).await?;
    let responses: Vec<TaskResponse> = tasks.into_iter().map(TaskResponse::from).collect();
    Ok(Json(responses).into_response())
}

/// Toggle the caller's completion of a task
///
/// **POST /v1/projects/{slug}/tasks/{page_slug}/toggle**
///
/// Idempotent flip: an open completed row is unchecked; otherwise a
/// fresh completed row is created. Returns the recomputed progress.
pub async fn toggle_task_completion(
    auth_context: AuthUser,
    State(state): State<ProjectsState>,
    Path((slug, page_slug)): Path<(String, String)>,
) -> Result<Json<ToggleTaskResponse>> {
    let actor = &auth_context.0.profile;
    let project = project_by_slug(&state, &slug).await?;

    let (organizing, participating) = participation_flags(&state, project.id, actor.id).await?;
    let ctx = AccessContext::new(actor, project.kind)
        .organizing(organizing)
        .participating(participating);
    authorize(&[Check::Participant, Check::KindOneOf(CHALLENGE_KINDS)], &ctx)?;

    let page = state
        .repos
        .pages
        .find_task(project.id, &page_slug)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Task {} not found", page_slug)))?;

    match state
        .repos
        .completions
        .find_completed(page.id, actor.id)
        .await?
    {
        Some(completion) => {
            state
                .repos
                .completions
                .mark_unchecked(completion.id)
                .await?
                .ok_or_else(|| Error::Conflict("Task was already unchecked".to_string()))?;
        }
        None => {
            let completion = TaskCompletion::new(page.id, actor.id);
            state.repos.completions.create(&completion).await?;
        }
    }

    let total_count = state.repos.pages.count_tasks(project.id).await?;
    let completed_count = state
        .repos
        .completions
        .count_completed(project.id, actor.id)
        .await?;

    Ok(Json(ToggleTaskResponse {
        total_count,
        completed_count,
        progressbar_value: progressbar_value(completed_count, total_count),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progressbar_value_zero_total() {
        assert_eq!(progressbar_value(0, 0), 0);
        assert_eq!(progressbar_value(5, 0), 0);
    }

    #[test]
    fn test_progressbar_value_floor_division() {
        assert_eq!(progressbar_value(1, 3), 33);
        assert_eq!(progressbar_value(2, 3), 66);
        assert_eq!(progressbar_value(3, 3), 100);
    }

    #[test]
    fn test_progressbar_value_bounds() {
        for completed in 0..=7 {
            let value = progressbar_value(completed, 7);
            assert!((0..=100).contains(&value));
        }
    }

    #[test]
    fn test_toggle_response_serialization() {
        let response = ToggleTaskResponse {
            total_count: 4,
            completed_count: 1,
            progressbar_value: 25,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["total_count"], 4);
        assert_eq!(json["completed_count"], 1);
        assert_eq!(json["progressbar_value"], 25);
    }
}
