//! Metrics handlers: overview and detailed CSV export
//!
//! Both endpoints are restricted to the CSV allowlist and superusers
//! via the `MetricsViewer` capability check.

use axum::{
    extract::{Path, State},
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;

use peerhub_auth::AuthUser;
use peerhub_common::{Error, Result};
use peerhub_metrics::OverviewRow;

use crate::api::handlers::project_by_slug;
use crate::api::middleware::ProjectsState;
use crate::api::report::{build_detailed_csv, ReportSections};
use crate::domain::capability::{authorize, AccessContext, Check};

/// Fixed attachment filename of the detailed report.
const REPORT_FILENAME: &str = "detailed_report.csv";

fn metrics_error(e: peerhub_metrics::MetricsError) -> Error {
    Error::Internal(format!("Metrics service failure: {}", e))
}

/// Per-participant overview metrics
///
/// **GET /v1/projects/{slug}/metrics**
///
/// Refreshes the metrics cache, then returns one overview row per
/// non-organizer participant.
pub async fn admin_metrics(
    auth_context: AuthUser,
    State(state): State<ProjectsState>,
    Path(slug): Path<String>,
) -> Result<Json<Vec<OverviewRow>>> {
    let actor = &auth_context.0.profile;
    let project = project_by_slug(&state, &slug).await?;

    let ctx = AccessContext::new(actor, project.kind)
        .metrics_allowlist(&state.settings.metrics_csv_usernames);
    authorize(&[Check::MetricsViewer], &ctx)?;

    state
        .metrics
        .refresh_cache(project.id)
        .await
        .map_err(metrics_error)?;

    let participants = state
        .repos
        .participations
        .non_organizer_usernames(project.id)
        .await?;
    let rows = state
        .metrics
        .overview_rows(project.id, &participants)
        .await
        .map_err(metrics_error)?;

    Ok(Json(rows))
}

/// Detailed CSV export
///
/// **GET /v1/projects/{slug}/metrics/detailed.csv**
///
/// `text/csv` attachment with the fixed filename `detailed_report.csv`.
pub async fn export_detailed_csv(
    auth_context: AuthUser,
    State(state): State<ProjectsState>,
    Path(slug): Path<String>,
) -> Result<Response> {
    let actor = &auth_context.0.profile;
    let project = project_by_slug(&state, &slug).await?;

    let ctx = AccessContext::new(actor, project.kind)
        .metrics_allowlist(&state.settings.metrics_csv_usernames);
    authorize(&[Check::MetricsViewer], &ctx)?;

    state
        .metrics
        .refresh_cache(project.id)
        .await
        .map_err(metrics_error)?;
    let axes = state.metrics.axes(project.id).await.map_err(metrics_error)?;

    let participants = state
        .repos
        .participations
        .non_organizer_usernames(project.id)
        .await?;
    let followers = state
        .repos
        .relationships
        .non_participant_follower_usernames(project.id)
        .await?;
    let previous_followers = state
        .repos
        .relationships
        .previous_follower_usernames(project.id)
        .await?;

    let sections = ReportSections {
        participants: state
            .metrics
            .detail_rows(project.id, &participants, &axes)
            .await
            .map_err(metrics_error)?,
        followers: state
            .metrics
            .detail_rows(project.id, &followers, &axes)
            .await
            .map_err(metrics_error)?,
        previous_followers: state
            .metrics
            .detail_rows(project.id, &previous_followers, &axes)
            .await
            .map_err(metrics_error)?,
        unauth: state
            .metrics
            .unauth_rows(project.id, &axes)
            .await
            .map_err(metrics_error)?,
    };

    let body = build_detailed_csv(&project.name, Utc::now().date_naive(), &axes, &sections)?;

    Ok((
        [
            (CONTENT_TYPE, "text/csv".to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename={}", REPORT_FILENAME),
            ),
        ],
        body,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_filename_is_fixed() {
        assert_eq!(REPORT_FILENAME, "detailed_report.csv");
    }
}
