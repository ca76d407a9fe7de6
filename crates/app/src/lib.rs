//! Peerhub application composition root
//!
//! Wires configuration, database pools, the auth backend and the
//! service implementations into the projects domain router.

use std::sync::Arc;

use axum::Router;
use sqlx::PgPool;

use peerhub_auth::{AuthBackend, AuthConfig};
use peerhub_common::Config;
use peerhub_email::{EmailConfig, EmailServiceFactory};
use peerhub_legacy::{LegacyConfig, LegacyCourses};
use peerhub_metrics::{MetricsConfig, MetricsServiceFactory};
use peerhub_outbox::{OutboxConfig, OutboxFactory};
use peerhub_projects::{ProjectsRepositories, ProjectsSettings, ProjectsState};

/// Create the main application router with all routes and middleware
pub async fn create_app(
    config: Config,
    pool: PgPool,
    legacy_pool: PgPool,
) -> Result<Router, anyhow::Error> {
    let repos = ProjectsRepositories::new(pool.clone());

    let auth = AuthBackend::new(
        pool.clone(),
        AuthConfig {
            jwt_secret: config.jwt_secret.clone(),
            issuer: config.jwt_issuer.clone(),
            audience: config.jwt_audience.clone(),
        },
    );

    let legacy = LegacyCourses::new(
        legacy_pool,
        LegacyConfig {
            site_url: config.legacy_site_url.clone(),
            files_url: config.legacy_files_url.clone(),
            media_url: config.media_url.clone(),
        },
    );

    let metrics = MetricsServiceFactory::create(MetricsConfig::from_env()?, pool.clone())?;
    let outbox = OutboxFactory::create(OutboxConfig::from_env()?, pool)?;
    let email = EmailServiceFactory::create(EmailConfig::from_env()?)?;

    let projects_state = ProjectsState {
        repos,
        auth,
        legacy,
        metrics: Arc::from(metrics),
        outbox: Arc::from(outbox),
        email: Arc::from(email),
        settings: Arc::new(ProjectsSettings {
            media_root: config.media_root.clone(),
            media_url: config.media_url.clone(),
            metrics_csv_usernames: config.metrics_csv_usernames.clone(),
        }),
    };

    // Build router — compose domain routers with shared infrastructure routes
    let app = Router::new()
        .route("/health", axum::routing::get(health_check))
        .route("/", axum::routing::get(|| async { "Peerhub API v0.1.0" }))
        .merge(peerhub_projects::routes().with_state(projects_state));

    Ok(app)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
