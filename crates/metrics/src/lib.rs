//! Peerhub metrics service
//!
//! Participation metrics consumed by the projects domain as an opaque
//! aggregation dependency: a cache refresh, the report axes (dates ×
//! page paths), per-user overview and detail rows, and the aggregate
//! for unauthenticated visitors.

pub mod mock;
pub mod pg;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum MetricsError {
    #[error("Metrics configuration error: {0}")]
    Configuration(String),

    #[error("Metrics query error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Report axes: the dates and page paths a detailed report spans.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MetricsAxes {
    pub dates: Vec<NaiveDate>,
    pub page_paths: Vec<String>,
}

/// One per-participant row of the overview table.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct OverviewRow {
    pub username: String,
    pub last_active: Option<DateTime<Utc>>,
    pub course_activity_minutes: i64,
    pub comment_count: i64,
    pub task_edits_count: i64,
}

/// One data row of the detailed report: a username followed by the
/// pre-rendered metric cells for every date/page-path group.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailRow {
    pub username: String,
    pub cells: Vec<String>,
}

/// Metrics service trait for different implementations.
#[async_trait::async_trait]
pub trait MetricsService: Send + Sync {
    /// Re-aggregate raw page views into the metrics cache for a project.
    async fn refresh_cache(&self, project_id: Uuid) -> Result<(), MetricsError>;

    /// Axes of the cached metrics for a project.
    async fn axes(&self, project_id: Uuid) -> Result<MetricsAxes, MetricsError>;

    /// Overview rows for the given usernames.
    async fn overview_rows(
        &self,
        project_id: Uuid,
        usernames: &[String],
    ) -> Result<Vec<OverviewRow>, MetricsError>;

    /// Detailed rows for the given usernames, shaped by the axes.
    async fn detail_rows(
        &self,
        project_id: Uuid,
        usernames: &[String],
        axes: &MetricsAxes,
    ) -> Result<Vec<DetailRow>, MetricsError>;

    /// Aggregate rows for unauthenticated visitors, shaped by the axes.
    async fn unauth_rows(
        &self,
        project_id: Uuid,
        axes: &MetricsAxes,
    ) -> Result<Vec<DetailRow>, MetricsError>;
}

/// Metrics service configuration.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Metrics provider (postgres, mock)
    pub provider: String,
}

impl MetricsConfig {
    /// Create metrics config from environment variables.
    pub fn from_env() -> Result<Self, MetricsError> {
        let provider = std::env::var("METRICS_PROVIDER").unwrap_or_else(|_| "postgres".to_string());
        Ok(Self { provider })
    }
}

/// Factory for creating MetricsService implementations.
pub struct MetricsServiceFactory;

impl MetricsServiceFactory {
    /// Create a MetricsService based on configuration.
    pub fn create(
        config: MetricsConfig,
        pool: sqlx::PgPool,
    ) -> Result<Box<dyn MetricsService>, MetricsError> {
        match config.provider.as_str() {
            "postgres" => {
                tracing::info!("Creating Postgres metrics service");
                Ok(Box::new(pg::PgMetricsService::new(pool)))
            }
            "mock" => {
                tracing::info!("Creating mock metrics service");
                Ok(Box::new(mock::MockMetricsService::new()))
            }
            provider => Err(MetricsError::Configuration(format!(
                "Unknown metrics provider: {}. Supported providers: postgres, mock",
                provider
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axes_default_is_empty() {
        let axes = MetricsAxes::default();
        assert!(axes.dates.is_empty());
        assert!(axes.page_paths.is_empty());
    }

    #[test]
    fn test_overview_row_serializes_fields() {
        let row = OverviewRow {
            username: "maria".to_string(),
            last_active: None,
            course_activity_minutes: 42,
            comment_count: 3,
            task_edits_count: 1,
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["username"], "maria");
        assert_eq!(json["course_activity_minutes"], 42);
    }

    #[tokio::test]
    async fn test_factory_mock_succeeds() {
        let config = MetricsConfig {
            provider: "mock".to_string(),
        };
        // A lazily-connecting pool is enough: the mock never touches it.
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/peerhub_test")
            .unwrap();
        assert!(MetricsServiceFactory::create(config, pool).is_ok());
    }

    #[tokio::test]
    async fn test_factory_unknown_provider() {
        let config = MetricsConfig {
            provider: "csvfile".to_string(),
        };
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy("postgres://localhost/peerhub_test")
            .unwrap();
        let err = match MetricsServiceFactory::create(config, pool) {
            Err(e) => e,
            Ok(_) => panic!("Expected error for unknown provider"),
        };
        assert!(err.to_string().contains("Unknown metrics provider"));
    }
}
