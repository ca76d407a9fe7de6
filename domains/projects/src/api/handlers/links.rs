//! Link management handlers (study groups and courses only)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use peerhub_auth::AuthUser;
use peerhub_common::{Error, Result, ValidatedJson};
use peerhub_outbox::OutboxIntent;

use crate::api::handlers::{participation_flags, project_by_slug};
use crate::api::middleware::ProjectsState;
use crate::domain::capability::{authorize, AccessContext, Check, LINK_KINDS};
use crate::domain::entities::{Link, Project};

/// Request for adding or editing a link
#[derive(Debug, Deserialize, Validate)]
pub struct LinkRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[validate(url)]
    pub url: String,
}

/// Response for link resources
#[derive(Debug, Serialize)]
pub struct LinkResponse {
    pub id: Uuid,
    pub name: String,
    pub url: String,
    pub index: i32,
    pub subscribed: bool,
}

impl From<Link> for LinkResponse {
    fn from(link: Link) -> Self {
        Self {
            id: link.id,
            name: link.name,
            url: link.url,
            index: link.index,
            subscribed: link.subscription_id.is_some(),
        }
    }
}

async fn organizer_link_gate(
    state: &ProjectsState,
    actor: &peerhub_auth::Profile,
    project: &Project,
) -> Result<()> {
    let (organizing, _) = participation_flags(state, project.id, actor.id).await?;
    let ctx = AccessContext::new(actor, project.kind).organizing(organizing);
    authorize(&[Check::Organizer, Check::KindOneOf(LINK_KINDS)], &ctx)
}

/// List a project's links in curation order
///
/// **GET /v1/projects/{slug}/links**
pub async fn list_links(
    auth_context: AuthUser,
    State(state): State<ProjectsState>,
    Path(slug): Path<String>,
) -> Result<Json<Vec<LinkResponse>>> {
    let actor = &auth_context.0.profile;
    let project = project_by_slug(&state, &slug).await?;
    organizer_link_gate(&state, actor, &project).await?;

    let links = state.repos.links.list_for_project(project.id).await?;
    Ok(Json(links.into_iter().map(LinkResponse::from).collect()))
}

/// Add a link
///
/// **POST /v1/projects/{slug}/links**
pub async fn add_link(
    auth_context: AuthUser,
    State(state): State<ProjectsState>,
    Path(slug): Path<String>,
    ValidatedJson(request): ValidatedJson<LinkRequest>,
) -> Result<(StatusCode, Json<LinkResponse>)> {
    let actor = &auth_context.0.profile;
    let project = project_by_slug(&state, &slug).await?;
    organizer_link_gate(&state, actor, &project).await?;

    let link = Link::new(project.id, actor.id, request.name, request.url)?;
    let created = state.repos.links.create(&link).await?;

    Ok((StatusCode::CREATED, Json(LinkResponse::from(created))))
}

/// Edit a link
///
/// **PATCH /v1/projects/{slug}/links/{link_id}**
///
/// A link with an active feed subscription is first detached: an
/// unsubscribe intent goes on the outbox and the subscription reference
/// is cleared before the new data is saved.
pub async fn update_link(
    auth_context: AuthUser,
    State(state): State<ProjectsState>,
    Path((slug, link_id)): Path<(String, Uuid)>,
    ValidatedJson(request): ValidatedJson<LinkRequest>,
) -> Result<Json<LinkResponse>> {
    let actor = &auth_context.0.profile;
    let project = project_by_slug(&state, &slug).await?;
    organizer_link_gate(&state, actor, &project).await?;

    let link = state
        .repos
        .links
        .find(link_id)
        .await?
        .ok_or_else(|| Error::NotFound("Link not found".to_string()))?;

    if link.project_id != project.id {
        return Err(Error::Authorization("You can't edit this link".to_string()));
    }

    if let Some(subscription_id) = link.subscription_id {
        state
            .outbox
            .enqueue(OutboxIntent::FeedUnsubscribe {
                link_id: link.id,
                subscription_id,
            })
            .await
            .map_err(|e| Error::Internal(format!("Failed to enqueue unsubscribe: {}", e)))?;
        state.repos.links.clear_subscription(link.id).await?;
    }

    let updated = state
        .repos
        .links
        .update(link.id, &request.name, &request.url)
        .await?
        .ok_or_else(|| Error::NotFound("Link not found".to_string()))?;

    Ok(Json(LinkResponse::from(updated)))
}

/// Delete a link
///
/// **DELETE /v1/projects/{slug}/links/{link_id}**
pub async fn delete_link(
    auth_context: AuthUser,
    State(state): State<ProjectsState>,
    Path((slug, link_id)): Path<(String, Uuid)>,
) -> Result<StatusCode> {
    let actor = &auth_context.0.profile;
    let project = project_by_slug(&state, &slug).await?;
    organizer_link_gate(&state, actor, &project).await?;

    let link = state
        .repos
        .links
        .find(link_id)
        .await?
        .ok_or_else(|| Error::NotFound("Link not found".to_string()))?;

    if link.project_id != project.id {
        return Err(Error::Authorization("You can't edit this link".to_string()));
    }

    state.repos.links.delete(link.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_request_validation() {
        let valid = LinkRequest {
            name: "Course wiki".to_string(),
            url: "https://wiki.example.org/course".to_string(),
        };
        assert!(valid.validate().is_ok());

        let bad_url = LinkRequest {
            name: "Course wiki".to_string(),
            url: "not-a-url".to_string(),
        };
        assert!(bad_url.validate().is_err());

        let empty_name = LinkRequest {
            name: String::new(),
            url: "https://wiki.example.org".to_string(),
        };
        assert!(empty_name.validate().is_err());
    }

    #[test]
    fn test_link_response_reports_subscription() {
        let mut link = Link::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "Feed".to_string(),
            "https://blog.example.org/feed".to_string(),
        )
        .unwrap();
        link.subscription_id = Some(Uuid::new_v4());

        let response = LinkResponse::from(link);
        assert!(response.subscribed);
    }
}
