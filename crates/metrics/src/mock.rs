//! Mock metrics service implementation
//!
//! Serves canned axes and rows, and records cache refreshes for test
//! assertions. Thread-safe via `Arc<Mutex<>>`.

use std::sync::{Arc, Mutex};

use uuid::Uuid;

use crate::{DetailRow, MetricsAxes, MetricsError, MetricsService, OverviewRow};

/// Mock metrics service with canned data.
#[derive(Debug, Clone)]
pub struct MockMetricsService {
    axes: MetricsAxes,
    refreshed: Arc<Mutex<Vec<Uuid>>>,
}

impl MockMetricsService {
    /// Create a mock with empty axes.
    pub fn new() -> Self {
        Self::with_axes(MetricsAxes::default())
    }

    /// Create a mock serving the given axes.
    pub fn with_axes(axes: MetricsAxes) -> Self {
        Self {
            axes,
            refreshed: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Project IDs whose cache refresh was requested, in order.
    pub fn refreshed_projects(&self) -> Vec<Uuid> {
        self.refreshed
            .lock()
            .expect("refreshed lock poisoned — prior test panicked")
            .clone()
    }

    fn zero_cells(&self) -> Vec<String> {
        let group_width = 5 + 3 * self.axes.page_paths.len();
        vec!["0".to_string(); (self.axes.dates.len() + 1) * group_width]
    }
}

impl Default for MockMetricsService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl MetricsService for MockMetricsService {
    async fn refresh_cache(&self, project_id: Uuid) -> Result<(), MetricsError> {
        tracing::debug!(project_id = %project_id, "Mock metrics: recording refresh");
        self.refreshed
            .lock()
            .map_err(|e| MetricsError::Configuration(format!("refreshed lock poisoned: {e}")))?
            .push(project_id);
        Ok(())
    }

    async fn axes(&self, _project_id: Uuid) -> Result<MetricsAxes, MetricsError> {
        Ok(self.axes.clone())
    }

    async fn overview_rows(
        &self,
        _project_id: Uuid,
        usernames: &[String],
    ) -> Result<Vec<OverviewRow>, MetricsError> {
        Ok(usernames
            .iter()
            .map(|name| OverviewRow {
                username: name.clone(),
                last_active: None,
                course_activity_minutes: 0,
                comment_count: 0,
                task_edits_count: 0,
            })
            .collect())
    }

    async fn detail_rows(
        &self,
        _project_id: Uuid,
        usernames: &[String],
        _axes: &MetricsAxes,
    ) -> Result<Vec<DetailRow>, MetricsError> {
        Ok(usernames
            .iter()
            .map(|name| DetailRow {
                username: name.clone(),
                cells: self.zero_cells(),
            })
            .collect())
    }

    async fn unauth_rows(
        &self,
        _project_id: Uuid,
        _axes: &MetricsAxes,
    ) -> Result<Vec<DetailRow>, MetricsError> {
        Ok(vec![DetailRow {
            username: "Anonymous".to_string(),
            cells: self.zero_cells(),
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_records_refreshes() {
        let service = MockMetricsService::new();
        let id = Uuid::new_v4();

        service.refresh_cache(id).await.unwrap();
        service.refresh_cache(id).await.unwrap();

        assert_eq!(service.refreshed_projects(), vec![id, id]);
    }

    #[tokio::test]
    async fn test_mock_detail_rows_match_axes_width() {
        let axes = MetricsAxes {
            dates: vec!["2026-08-01".parse().unwrap()],
            page_paths: vec!["intro".to_string()],
        };
        let service = MockMetricsService::with_axes(axes.clone());

        let rows = service
            .detail_rows(Uuid::new_v4(), &["maria".to_string()], &axes)
            .await
            .unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].cells.len(), 2 * (5 + 3));
    }
}
