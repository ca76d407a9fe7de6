//! Project lifecycle handlers: listing, create, clone, import, edit

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use peerhub_auth::{AuthUser, MaybeAuthUser};
use peerhub_common::{Error, Pagination, Result, ValidatedJson};

use crate::api::handlers::{from_legacy_error, participation_flags, project_by_slug};
use crate::api::middleware::ProjectsState;
use crate::domain::capability::{authorize, AccessContext, Check};
use crate::domain::entities::{
    Project, ProjectKind, SignupPolicy, DEFAULT_DETAILED_DESCRIPTION,
};
use crate::repository::transactions::{create_project_graph, NewProjectGraph};
use crate::repository::StatusUpdate;

/// Accepted image upload extensions
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];

/// Request for creating a project
#[derive(Debug, Deserialize, Validate)]
pub struct CreateProjectRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    pub kind: ProjectKind,

    #[validate(length(min = 1, max = 420))]
    pub short_description: String,

    pub long_description: Option<String>,
}

/// Request for cloning an existing project by slug
#[derive(Debug, Deserialize, Validate)]
pub struct CloneProjectRequest {
    #[validate(length(min = 1))]
    pub project: String,
}

/// Request for importing a completed legacy course by slug
#[derive(Debug, Deserialize, Validate)]
pub struct ImportProjectRequest {
    #[validate(length(min = 1))]
    pub course: String,
}

/// Request for the summary edit form
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProjectRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,

    #[validate(length(min = 1, max = 420))]
    pub short_description: String,

    pub long_description: Option<String>,

    /// School slug, or null to detach
    pub school: Option<String>,
}

/// Request for the status edit form
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateStatusRequest {
    pub listed: bool,
    pub under_development: bool,
    pub signup_closed: bool,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

/// Query parameters for the project listing
#[derive(Debug, Deserialize, Default)]
pub struct ProjectListQuery {
    /// Filter by school slug
    pub school: Option<String>,
    #[serde(default)]
    pub offset: Option<i64>,
    #[serde(default)]
    pub limit: Option<i64>,
}

/// Response for project resources
#[derive(Debug, Serialize)]
pub struct ProjectResponse {
    pub id: Uuid,
    pub slug: String,
    pub kind: ProjectKind,
    pub name: String,
    pub short_description: String,
    pub long_description: Option<String>,
    pub image_path: Option<String>,
    pub school_id: Option<Uuid>,
    pub clone_of: Option<Uuid>,
    pub imported_from: Option<String>,
    pub listed: bool,
    pub under_development: bool,
    pub signup_closed: bool,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub published_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<Project> for ProjectResponse {
    fn from(project: Project) -> Self {
        Self {
            id: project.id,
            slug: project.slug,
            kind: project.kind,
            name: project.name,
            short_description: project.short_description,
            long_description: project.long_description,
            image_path: project.image_path,
            school_id: project.school_id,
            clone_of: project.clone_of,
            imported_from: project.imported_from,
            listed: project.listed,
            under_development: project.under_development,
            signup_closed: project.signup_closed,
            start_date: project.start_date,
            end_date: project.end_date,
            published_at: project.published_at,
            created_at: project.created_at,
        }
    }
}

/// Project detail with the caller's relationship flags
#[derive(Debug, Serialize)]
pub struct ProjectDetailResponse {
    #[serde(flatten)]
    pub project: ProjectResponse,
    pub organizing: bool,
    pub participating: bool,
    pub following: bool,
}

/// List listed projects, ordered by name
///
/// **GET /v1/projects?school=<slug>**
pub async fn list_projects(
    State(state): State<ProjectsState>,
    Query(query): Query<ProjectListQuery>,
) -> Result<Json<Vec<ProjectResponse>>> {
    let school_id = match query.school.as_deref() {
        Some(slug) => Some(
            state
                .repos
                .schools
                .find_by_slug(slug)
                .await?
                .ok_or_else(|| Error::NotFound(format!("School {} not found", slug)))?
                .id,
        ),
        None => None,
    };

    let pagination = Pagination {
        offset: query.offset,
        limit: query.limit,
    };
    let projects = state
        .repos
        .projects
        .list_listed(school_id, pagination.offset(), pagination.limit())
        .await?;

    Ok(Json(projects.into_iter().map(ProjectResponse::from).collect()))
}

/// Create a project
///
/// **POST /v1/projects**
///
/// Writes the aggregate in fixed order (project, activity, organizing
/// participation, follow, description page, signup) and publishes it
/// only after every write succeeded.
pub async fn create_project(
    auth_context: AuthUser,
    State(state): State<ProjectsState>,
    ValidatedJson(request): ValidatedJson<CreateProjectRequest>,
) -> Result<(StatusCode, Json<ProjectResponse>)> {
    let actor = &auth_context.0.profile;

    let project = Project::new(
        request.kind,
        request.name,
        request.short_description,
        request.long_description,
    )?;

    let mut tx = state.repos.begin().await?;
    let created = create_project_graph(
        &mut tx,
        actor,
        NewProjectGraph {
            project,
            detailed_description_content: DEFAULT_DETAILED_DESCRIPTION.to_string(),
            signup_policy: SignupPolicy::default(),
            tasks: Vec::new(),
            links: Vec::new(),
        },
    )
    .await?;
    tx.commit().await?;

    tracing::info!(slug = %created.slug, kind = %created.kind, "Project created");
    Ok((StatusCode::CREATED, Json(ProjectResponse::from(created))))
}

/// Clone an existing project
///
/// **POST /v1/projects/clone**
///
/// Copies the base project's summary, description page content, signup
/// policy, listed tasks and links into a fresh aggregate.
pub async fn clone_project(
    auth_context: AuthUser,
    State(state): State<ProjectsState>,
    ValidatedJson(request): ValidatedJson<CloneProjectRequest>,
) -> Result<(StatusCode, Json<ProjectResponse>)> {
    let actor = &auth_context.0.profile;

    let base = project_by_slug(&state, &request.project).await?;

    let mut project = Project::new(
        base.kind,
        base.name.clone(),
        base.short_description.clone(),
        base.long_description.clone(),
    )?;
    project.clone_of = Some(base.id);

    let detailed_description_content = match base.detailed_description_id {
        Some(page_id) => state
            .repos
            .pages
            .find(page_id)
            .await?
            .map(|page| page.content)
            .unwrap_or_else(|| DEFAULT_DETAILED_DESCRIPTION.to_string()),
        None => DEFAULT_DETAILED_DESCRIPTION.to_string(),
    };

    let signup_policy = state
        .repos
        .signups
        .find_by_project(base.id)
        .await?
        .map(|signup| signup.policy)
        .unwrap_or_default();

    let tasks = state
        .repos
        .pages
        .list_tasks(base.id)
        .await?
        .into_iter()
        .map(|task| (task.title, task.content))
        .collect();

    let links = state
        .repos
        .links
        .list_for_project(base.id)
        .await?
        .into_iter()
        .map(|link| (link.name, link.url))
        .collect();

    let mut tx = state.repos.begin().await?;
    let created = create_project_graph(
        &mut tx,
        actor,
        NewProjectGraph {
            project,
            detailed_description_content,
            signup_policy,
            tasks,
            links,
        },
    )
    .await?;
    tx.commit().await?;

    tracing::info!(slug = %created.slug, base = %base.slug, "Project cloned");
    Ok((StatusCode::CREATED, Json(ProjectResponse::from(created))))
}

/// Import a completed course from the legacy site
///
/// **POST /v1/projects/import**
pub async fn import_project(
    auth_context: AuthUser,
    State(state): State<ProjectsState>,
    ValidatedJson(request): ValidatedJson<ImportProjectRequest>,
) -> Result<(StatusCode, Json<ProjectResponse>)> {
    let actor = &auth_context.0.profile;

    let course = state
        .legacy
        .course_detail(&request.course, true)
        .await
        .map_err(from_legacy_error)?;

    let school_id = match course.school_term_name.as_deref() {
        Some(term_name) => state
            .repos
            .schools
            .find_by_old_term_name(term_name)
            .await?
            .map(|school| school.id),
        None => None,
    };

    let short_description = if course.short_description.is_empty() {
        course.name.clone()
    } else {
        course.short_description.clone()
    };

    let mut project = Project::new(
        ProjectKind::Course,
        course.name.clone(),
        short_description,
        Some(course.long_description.clone()).filter(|d| !d.is_empty()),
    )?;
    project.imported_from = Some(course.slug.clone());
    project.school_id = school_id;

    let detailed_description_content = if course.detailed_description.is_empty() {
        DEFAULT_DETAILED_DESCRIPTION.to_string()
    } else {
        course.detailed_description.clone()
    };

    let signup_policy = if course.sign_up {
        SignupPolicy::ParticipantsOnly
    } else {
        SignupPolicy::Closed
    };

    let mut tx = state.repos.begin().await?;
    let created = create_project_graph(
        &mut tx,
        actor,
        NewProjectGraph {
            project,
            detailed_description_content,
            signup_policy,
            tasks: course.tasks,
            links: course.links,
        },
    )
    .await?;
    tx.commit().await?;

    tracing::info!(slug = %created.slug, imported_from = %course.slug, "Project imported");
    Ok((StatusCode::CREATED, Json(ProjectResponse::from(created))))
}

/// Project detail with the caller's relationship flags
///
/// **GET /v1/projects/{slug}**
pub async fn get_project(
    auth_context: MaybeAuthUser,
    State(state): State<ProjectsState>,
    Path(slug): Path<String>,
) -> Result<Json<ProjectDetailResponse>> {
    let project = project_by_slug(&state, &slug).await?;

    let (organizing, participating, following) = match &auth_context.0 {
        Some(ctx) => {
            let (organizing, participating) =
                participation_flags(&state, project.id, ctx.profile.id).await?;
            let following = state
                .repos
                .relationships
                .is_following(ctx.profile.id, project.id)
                .await?;
            (organizing, participating, following)
        }
        None => (false, false, false),
    };

    Ok(Json(ProjectDetailResponse {
        project: ProjectResponse::from(project),
        organizing,
        participating,
        following,
    }))
}

/// Edit the project summary
///
/// **PATCH /v1/projects/{slug}**
pub async fn update_project(
    auth_context: AuthUser,
    State(state): State<ProjectsState>,
    Path(slug): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateProjectRequest>,
) -> Result<Json<ProjectResponse>> {
    let actor = &auth_context.0.profile;
    let project = project_by_slug(&state, &slug).await?;

    let (organizing, _) = participation_flags(&state, project.id, actor.id).await?;
    let ctx = AccessContext::new(actor, project.kind).organizing(organizing);
    authorize(&[Check::Organizer], &ctx)?;

    let school_id = match request.school.as_deref() {
        Some(school_slug) => Some(
            state
                .repos
                .schools
                .find_by_slug(school_slug)
                .await?
                .ok_or_else(|| Error::NotFound(format!("School {} not found", school_slug)))?
                .id,
        ),
        None => None,
    };

    let updated = state
        .repos
        .projects
        .update_summary(
            project.id,
            &request.name,
            &request.short_description,
            request.long_description.as_deref(),
            school_id,
        )
        .await?
        .ok_or_else(|| Error::NotFound(format!("Project {} not found", slug)))?;

    Ok(Json(ProjectResponse::from(updated)))
}

/// Edit the project status flags and dates
///
/// **PATCH /v1/projects/{slug}/status**
pub async fn update_status(
    auth_context: AuthUser,
    State(state): State<ProjectsState>,
    Path(slug): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateStatusRequest>,
) -> Result<Json<ProjectResponse>> {
    let actor = &auth_context.0.profile;
    let project = project_by_slug(&state, &slug).await?;

    let (organizing, _) = participation_flags(&state, project.id, actor.id).await?;
    let ctx = AccessContext::new(actor, project.kind).organizing(organizing);
    authorize(&[Check::Organizer], &ctx)?;

    if let (Some(start), Some(end)) = (request.start_date, request.end_date) {
        if end < start {
            return Err(Error::Validation(
                "End date cannot precede start date".to_string(),
            ));
        }
    }

    let updated = state
        .repos
        .projects
        .update_status(
            project.id,
            &StatusUpdate {
                listed: request.listed,
                under_development: request.under_development,
                signup_closed: request.signup_closed,
                start_date: request.start_date,
                end_date: request.end_date,
            },
        )
        .await?
        .ok_or_else(|| Error::NotFound(format!("Project {} not found", slug)))?;

    Ok(Json(ProjectResponse::from(updated)))
}

/// Upload the project image
///
/// **POST /v1/projects/{slug}/image**
///
/// Multipart upload. The ajax widget contract is preserved: both
/// outcomes are HTTP 200, with either `{"filename": …}` or
/// `{"error": …}` in the body.
pub async fn upload_image(
    auth_context: AuthUser,
    State(state): State<ProjectsState>,
    Path(slug): Path<String>,
    multipart: Multipart,
) -> Result<Json<serde_json::Value>> {
    let actor = &auth_context.0.profile;
    let project = project_by_slug(&state, &slug).await?;

    let (organizing, _) = participation_flags(&state, project.id, actor.id).await?;
    let ctx = AccessContext::new(actor, project.kind).organizing(organizing);
    authorize(&[Check::Organizer], &ctx)?;

    match store_image(&state, &project, multipart).await {
        Ok(filename) => Ok(Json(json!({ "filename": filename }))),
        Err(e) => {
            tracing::warn!(slug = %project.slug, error = %e, "Image upload failed");
            Ok(Json(json!({
                "error": "There was an error uploading your image."
            })))
        }
    }
}

async fn store_image(
    state: &ProjectsState,
    project: &Project,
    mut multipart: Multipart,
) -> Result<String> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| Error::Validation(e.to_string()))?
    {
        if field.name() != Some("image") {
            continue;
        }

        let extension = field
            .file_name()
            .and_then(|name| name.rsplit('.').next())
            .map(str::to_lowercase)
            .filter(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
            .ok_or_else(|| Error::Validation("Unsupported image type".to_string()))?;

        let data = field
            .bytes()
            .await
            .map_err(|e| Error::Validation(e.to_string()))?;
        if data.is_empty() {
            return Err(Error::Validation("Empty image upload".to_string()));
        }

        let filename = format!("projects/{}.{}", Uuid::new_v4(), extension);
        let disk_path = std::path::Path::new(&state.settings.media_root).join(&filename);
        if let Some(parent) = disk_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::Internal(format!("Failed to prepare media dir: {}", e)))?;
        }
        tokio::fs::write(&disk_path, &data)
            .await
            .map_err(|e| Error::Internal(format!("Failed to store image: {}", e)))?;

        state
            .repos
            .projects
            .update_image(project.id, &filename)
            .await?;

        return Ok(filename);
    }

    Err(Error::Validation("No image field in upload".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_project_request_validation() {
        let valid = CreateProjectRequest {
            name: "Intro to Testing".to_string(),
            kind: ProjectKind::Course,
            short_description: "Learn to test software.".to_string(),
            long_description: None,
        };
        assert!(valid.validate().is_ok());

        let empty_name = CreateProjectRequest {
            name: String::new(),
            kind: ProjectKind::Course,
            short_description: "desc".to_string(),
            long_description: None,
        };
        assert!(empty_name.validate().is_err());

        let long_short_description = CreateProjectRequest {
            name: "Course".to_string(),
            kind: ProjectKind::Course,
            short_description: "d".repeat(421),
            long_description: None,
        };
        assert!(long_short_description.validate().is_err());
    }

    #[test]
    fn test_clone_request_requires_slug() {
        let request = CloneProjectRequest {
            project: String::new(),
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_project_detail_response_flattens_project() {
        let project = Project::new(
            ProjectKind::Challenge,
            "Webcraft".to_string(),
            "Build a site.".to_string(),
            None,
        )
        .unwrap();
        let response = ProjectDetailResponse {
            project: ProjectResponse::from(project),
            organizing: true,
            participating: true,
            following: false,
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["kind"], "challenge");
        assert_eq!(json["organizing"], true);
        assert_eq!(json["following"], false);
    }
}
