//! Projects domain state and auth backend integration

use std::sync::Arc;

use axum::extract::FromRef;

use peerhub_auth::AuthBackend;
use peerhub_email::EmailService;
use peerhub_legacy::LegacyCourses;
use peerhub_metrics::MetricsService;
use peerhub_outbox::Outbox;

use crate::ProjectsRepositories;

/// Settings this domain needs, passed explicitly instead of read from
/// global configuration.
#[derive(Debug, Clone)]
pub struct ProjectsSettings {
    /// Filesystem root for uploaded project images
    pub media_root: String,
    /// Public URL prefix for uploaded media
    pub media_url: String,
    /// Usernames allowed to view metrics overviews and CSV exports
    pub metrics_csv_usernames: Vec<String>,
}

/// Application state for the projects domain
#[derive(Clone)]
pub struct ProjectsState {
    pub repos: ProjectsRepositories,
    pub auth: AuthBackend,
    pub legacy: LegacyCourses,
    pub metrics: Arc<dyn MetricsService>,
    pub outbox: Arc<dyn Outbox>,
    pub email: Arc<dyn EmailService>,
    pub settings: Arc<ProjectsSettings>,
}

impl FromRef<ProjectsState> for AuthBackend {
    fn from_ref(state: &ProjectsState) -> Self {
        state.auth.clone()
    }
}
