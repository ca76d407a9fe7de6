//! Participant management handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use peerhub_auth::AuthUser;
use peerhub_common::{Error, Result, ValidatedJson};
use peerhub_email::OrganizerMessage;

use crate::api::handlers::{participation_flags, project_by_slug};
use crate::api::middleware::ProjectsState;
use crate::domain::capability::{authorize, AccessContext, Check, LINK_KINDS};
use crate::domain::entities::Participation;
use crate::repository::ParticipationWithProfile;

/// Request for adding a participant by username
#[derive(Debug, Deserialize, Validate)]
pub struct AddParticipantRequest {
    #[validate(length(min = 1, max = 30))]
    pub username: String,

    /// Add directly as an organizer
    #[serde(default)]
    pub organizer: bool,
}

/// Request for messaging the organizers
#[derive(Debug, Deserialize, Validate)]
pub struct ContactOrganizersRequest {
    #[validate(length(min = 1, max = 200))]
    pub subject: String,

    #[validate(length(min = 1, max = 10000))]
    pub body: String,
}

/// Response for participation resources
#[derive(Debug, Serialize)]
pub struct ParticipantResponse {
    pub username: String,
    pub full_name: Option<String>,
    pub organizing: bool,
    pub joined_at: chrono::DateTime<chrono::Utc>,
}

impl From<ParticipationWithProfile> for ParticipantResponse {
    fn from(p: ParticipationWithProfile) -> Self {
        Self {
            username: p.username,
            full_name: p.full_name,
            organizing: p.organizing,
            joined_at: p.joined_at,
        }
    }
}

/// Public project roster
#[derive(Debug, Serialize)]
pub struct PeopleResponse {
    pub organizers: Vec<ParticipantResponse>,
    pub participants: Vec<ParticipantResponse>,
    pub followers: Vec<String>,
}

/// List a project's active participants, oldest first
///
/// **GET /v1/projects/{slug}/participants**
pub async fn list_participants(
    auth_context: AuthUser,
    State(state): State<ProjectsState>,
    Path(slug): Path<String>,
) -> Result<Json<Vec<ParticipantResponse>>> {
    let actor = &auth_context.0.profile;
    let project = project_by_slug(&state, &slug).await?;

    let (organizing, _) = participation_flags(&state, project.id, actor.id).await?;
    let ctx = AccessContext::new(actor, project.kind).organizing(organizing);
    authorize(&[Check::Organizer], &ctx)?;

    let participants = state.repos.participations.list_active(project.id).await?;
    Ok(Json(
        participants
            .into_iter()
            .map(ParticipantResponse::from)
            .collect(),
    ))
}

/// Add a participant
///
/// **POST /v1/projects/{slug}/participants**
///
/// Creates an active participation plus the follow relationship.
pub async fn add_participant(
    auth_context: AuthUser,
    State(state): State<ProjectsState>,
    Path(slug): Path<String>,
    ValidatedJson(request): ValidatedJson<AddParticipantRequest>,
) -> Result<(StatusCode, Json<ParticipantResponse>)> {
    let actor = &auth_context.0.profile;
    let project = project_by_slug(&state, &slug).await?;

    let (organizing, _) = participation_flags(&state, project.id, actor.id).await?;
    let ctx = AccessContext::new(actor, project.kind).organizing(organizing);
    authorize(&[Check::Organizer], &ctx)?;

    let user = state
        .repos
        .profiles
        .find_by_username(&request.username)
        .await?
        .ok_or_else(|| Error::NotFound(format!("User {} not found", request.username)))?;

    let existing = state
        .repos
        .participations
        .find_active(project.id, user.id)
        .await?;
    if existing.is_some() {
        return Err(Error::Conflict(
            "User already participates in this project".to_string(),
        ));
    }

    let participation = Participation::new(project.id, user.id, request.organizer);
    let created = state.repos.participations.create(&participation).await?;
    state
        .repos
        .relationships
        .upsert_active(user.id, project.id)
        .await?;

    tracing::info!(slug = %project.slug, username = %user.username, "Participant added");
    Ok((
        StatusCode::CREATED,
        Json(ParticipantResponse {
            username: user.username,
            full_name: user.full_name,
            organizing: created.organizing,
            joined_at: created.joined_at,
        }),
    ))
}

/// Promote a participant to organizer
///
/// **POST /v1/projects/{slug}/participants/{username}/promote**
///
/// One-way: promoting someone who already organizes is refused.
pub async fn promote_participant(
    auth_context: AuthUser,
    State(state): State<ProjectsState>,
    Path((slug, username)): Path<(String, String)>,
) -> Result<Json<ParticipantResponse>> {
    let actor = &auth_context.0.profile;
    let project = project_by_slug(&state, &slug).await?;

    let (organizing, _) = participation_flags(&state, project.id, actor.id).await?;
    let ctx = AccessContext::new(actor, project.kind).organizing(organizing);
    authorize(&[Check::Organizer], &ctx)?;

    let participation = state
        .repos
        .participations
        .find_active_by_username(project.id, &username)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Participant {} not found", username)))?;

    if participation.organizing {
        return Err(Error::Authorization(
            "You can't make that person an organizer".to_string(),
        ));
    }

    let updated = state
        .repos
        .participations
        .mark_organizing(participation.id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Participant {} not found", username)))?;

    let user = state
        .repos
        .profiles
        .find_by_username(&username)
        .await?
        .ok_or_else(|| Error::NotFound(format!("User {} not found", username)))?;

    Ok(Json(ParticipantResponse {
        username: user.username,
        full_name: user.full_name,
        organizing: updated.organizing,
        joined_at: updated.joined_at,
    }))
}

/// Remove a participant (soft leave)
///
/// **DELETE /v1/projects/{slug}/participants/{username}**
///
/// The participation row survives with status `left`; the same user can
/// rejoin later under a fresh row.
pub async fn remove_participant(
    auth_context: AuthUser,
    State(state): State<ProjectsState>,
    Path((slug, username)): Path<(String, String)>,
) -> Result<StatusCode> {
    let actor = &auth_context.0.profile;
    let project = project_by_slug(&state, &slug).await?;

    let (organizing, _) = participation_flags(&state, project.id, actor.id).await?;
    let ctx = AccessContext::new(actor, project.kind).organizing(organizing);
    authorize(&[Check::Organizer, Check::KindOneOf(LINK_KINDS)], &ctx)?;

    let participation = state
        .repos
        .participations
        .find_active_by_username(project.id, &username)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Participant {} not found", username)))?;

    state
        .repos
        .participations
        .mark_left(participation.id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Participant {} not found", username)))?;

    tracing::info!(slug = %project.slug, username = %username, "Participant removed");
    Ok(StatusCode::NO_CONTENT)
}

/// Public roster: organizers, participants, followers
///
/// **GET /v1/projects/{slug}/people**
pub async fn list_people(
    State(state): State<ProjectsState>,
    Path(slug): Path<String>,
) -> Result<Json<PeopleResponse>> {
    let project = project_by_slug(&state, &slug).await?;

    let organizers = state.repos.participations.organizers(project.id).await?;
    let participants = state
        .repos
        .participations
        .non_organizer_participants(project.id)
        .await?;
    let followers = state
        .repos
        .relationships
        .non_participant_follower_usernames(project.id)
        .await?;

    Ok(Json(PeopleResponse {
        organizers: organizers.into_iter().map(ParticipantResponse::from).collect(),
        participants: participants
            .into_iter()
            .map(ParticipantResponse::from)
            .collect(),
        followers,
    }))
}

/// Message the project's organizers
///
/// **POST /v1/projects/{slug}/contact**
pub async fn contact_organizers(
    auth_context: AuthUser,
    State(state): State<ProjectsState>,
    Path(slug): Path<String>,
    ValidatedJson(request): ValidatedJson<ContactOrganizersRequest>,
) -> Result<StatusCode> {
    let actor = &auth_context.0.profile;
    let project = project_by_slug(&state, &slug).await?;

    let ctx = AccessContext::new(actor, project.kind);
    authorize(&[Check::KindOneOf(LINK_KINDS)], &ctx)?;

    let recipients = state.repos.profiles.organizer_emails(project.id).await?;

    state
        .email
        .send_organizer_message(OrganizerMessage {
            project_id: project.id,
            project_name: project.name.clone(),
            sender_username: actor.username.clone(),
            subject: request.subject,
            body: request.body,
            recipients,
        })
        .await
        .map_err(|e| Error::Internal(format!("Failed to send message: {}", e)))?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_participant_request_validation() {
        let valid = AddParticipantRequest {
            username: "maria".to_string(),
            organizer: false,
        };
        assert!(valid.validate().is_ok());

        let empty = AddParticipantRequest {
            username: String::new(),
            organizer: false,
        };
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_contact_request_validation() {
        let valid = ContactOrganizersRequest {
            subject: "Question".to_string(),
            body: "When does week 2 start?".to_string(),
        };
        assert!(valid.validate().is_ok());

        let empty_body = ContactOrganizersRequest {
            subject: "Question".to_string(),
            body: String::new(),
        };
        assert!(empty_body.validate().is_err());
    }

    #[test]
    fn test_participant_response_serialization() {
        let response = ParticipantResponse {
            username: "maria".to_string(),
            full_name: Some("Maria Silva".to_string()),
            organizing: true,
            joined_at: chrono::Utc::now(),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["username"], "maria");
        assert_eq!(json["organizing"], true);
    }
}
