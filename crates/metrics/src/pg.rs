//! Postgres-backed metrics service
//!
//! Aggregates the raw `page_views` table into the `page_view_metrics`
//! cache, then answers axes/row queries from the cache. Detail rows are
//! pivoted in memory: one cache row per (username, date, page path)
//! becomes the flat cell layout the detailed report expects.

use std::collections::HashMap;

use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{DetailRow, MetricsAxes, MetricsError, MetricsService, OverviewRow};

/// Label used for the unauthenticated aggregate row.
const UNAUTH_LABEL: &str = "Anonymous";

/// One cache row: metrics for a (username, date, page path) cell.
/// `username` is NULL for unauthenticated traffic.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MetricsCacheRow {
    pub username: Option<String>,
    pub page_path: String,
    pub view_date: NaiveDate,
    pub total_seconds: i64,
    pub nonzero_views: i64,
    pub zero_views: i64,
    pub comments: i64,
    pub task_edits: i64,
}

#[derive(Clone)]
pub struct PgMetricsService {
    pool: PgPool,
}

impl PgMetricsService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn cache_rows(
        &self,
        project_id: Uuid,
        usernames: Option<&[String]>,
    ) -> Result<Vec<MetricsCacheRow>, MetricsError> {
        let rows = match usernames {
            Some(names) => {
                sqlx::query_as::<_, MetricsCacheRow>(
                    r#"
                    SELECT username, page_path, view_date, total_seconds,
                           nonzero_views, zero_views, comments, task_edits
                    FROM page_view_metrics
                    WHERE project_id = $1 AND username = ANY($2)
                    ORDER BY username, view_date, page_path
                    "#,
                )
                .bind(project_id)
                .bind(names)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, MetricsCacheRow>(
                    r#"
                    SELECT username, page_path, view_date, total_seconds,
                           nonzero_views, zero_views, comments, task_edits
                    FROM page_view_metrics
                    WHERE project_id = $1 AND username IS NULL
                    ORDER BY view_date, page_path
                    "#,
                )
                .bind(project_id)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(rows)
    }
}

#[async_trait::async_trait]
impl MetricsService for PgMetricsService {
    async fn refresh_cache(&self, project_id: Uuid) -> Result<(), MetricsError> {
        sqlx::query(
            r#"
            INSERT INTO page_view_metrics (
                project_id, username, page_path, view_date,
                total_seconds, nonzero_views, zero_views, comments, task_edits
            )
            SELECT project_id, username, page_path, viewed_on::date,
                   SUM(seconds),
                   COUNT(*) FILTER (WHERE seconds > 0),
                   COUNT(*) FILTER (WHERE seconds = 0),
                   SUM(comments), SUM(task_edits)
            FROM page_views
            WHERE project_id = $1
            GROUP BY project_id, username, page_path, viewed_on::date
            ON CONFLICT (project_id, username, page_path, view_date)
            DO UPDATE SET
                total_seconds = EXCLUDED.total_seconds,
                nonzero_views = EXCLUDED.nonzero_views,
                zero_views = EXCLUDED.zero_views,
                comments = EXCLUDED.comments,
                task_edits = EXCLUDED.task_edits,
                refreshed_at = NOW()
            "#,
        )
        .bind(project_id)
        .execute(&self.pool)
        .await?;

        tracing::debug!(project_id = %project_id, "Metrics cache refreshed");
        Ok(())
    }

    async fn axes(&self, project_id: Uuid) -> Result<MetricsAxes, MetricsError> {
        let dates: Vec<NaiveDate> = sqlx::query_scalar(
            "SELECT DISTINCT view_date FROM page_view_metrics WHERE project_id = $1 ORDER BY view_date",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;

        let page_paths: Vec<String> = sqlx::query_scalar(
            "SELECT DISTINCT page_path FROM page_view_metrics WHERE project_id = $1 ORDER BY page_path",
        )
        .bind(project_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(MetricsAxes { dates, page_paths })
    }

    async fn overview_rows(
        &self,
        project_id: Uuid,
        usernames: &[String],
    ) -> Result<Vec<OverviewRow>, MetricsError> {
        let rows = sqlx::query_as::<_, OverviewRow>(
            r#"
            SELECT username,
                   MAX(view_date)::timestamptz AS last_active,
                   (SUM(total_seconds) / 60)::bigint AS course_activity_minutes,
                   SUM(comments)::bigint AS comment_count,
                   SUM(task_edits)::bigint AS task_edits_count
            FROM page_view_metrics
            WHERE project_id = $1 AND username = ANY($2)
            GROUP BY username
            ORDER BY username
            "#,
        )
        .bind(project_id)
        .bind(usernames)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn detail_rows(
        &self,
        project_id: Uuid,
        usernames: &[String],
        axes: &MetricsAxes,
    ) -> Result<Vec<DetailRow>, MetricsError> {
        let rows = self.cache_rows(project_id, Some(usernames)).await?;

        let mut by_user: HashMap<&str, Vec<&MetricsCacheRow>> = HashMap::new();
        for row in &rows {
            if let Some(name) = row.username.as_deref() {
                by_user.entry(name).or_default().push(row);
            }
        }

        // Preserve the caller's ordering; users without any cached views
        // still get a row of zero cells.
        let empty: Vec<&MetricsCacheRow> = Vec::new();
        Ok(usernames
            .iter()
            .map(|name| DetailRow {
                username: name.clone(),
                cells: pivot_cells(by_user.get(name.as_str()).unwrap_or(&empty), axes),
            })
            .collect())
    }

    async fn unauth_rows(
        &self,
        project_id: Uuid,
        axes: &MetricsAxes,
    ) -> Result<Vec<DetailRow>, MetricsError> {
        let rows = self.cache_rows(project_id, None).await?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let refs: Vec<&MetricsCacheRow> = rows.iter().collect();
        Ok(vec![DetailRow {
            username: UNAUTH_LABEL.to_string(),
            cells: pivot_cells(&refs, axes),
        }])
    }
}

/// Flatten a user's cache rows into report cells: for every date a
/// five-cell course summary then three cells per page path, followed by
/// the same layout summed over all dates (the TOTAL group).
fn pivot_cells(rows: &[&MetricsCacheRow], axes: &MetricsAxes) -> Vec<String> {
    let mut by_cell: HashMap<(NaiveDate, &str), &MetricsCacheRow> = HashMap::new();
    for &row in rows {
        by_cell.insert((row.view_date, row.page_path.as_str()), row);
    }

    let mut cells = Vec::new();
    let mut groups: Vec<Option<NaiveDate>> = axes.dates.iter().copied().map(Some).collect();
    groups.push(None); // the TOTAL group

    for group in groups {
        let in_group = |row: &&&MetricsCacheRow| match group {
            Some(date) => row.view_date == date,
            None => true,
        };

        let seconds: i64 = rows.iter().filter(in_group).map(|r| r.total_seconds).sum();
        let nonzero: i64 = rows.iter().filter(in_group).map(|r| r.nonzero_views).sum();
        let zero: i64 = rows.iter().filter(in_group).map(|r| r.zero_views).sum();
        let comments: i64 = rows.iter().filter(in_group).map(|r| r.comments).sum();
        let edits: i64 = rows.iter().filter(in_group).map(|r| r.task_edits).sum();

        cells.push((seconds / 60).to_string());
        cells.push(nonzero.to_string());
        cells.push(zero.to_string());
        cells.push(comments.to_string());
        cells.push(edits.to_string());

        for path in &axes.page_paths {
            let (mut seconds, mut nonzero, mut zero) = (0i64, 0i64, 0i64);
            match group {
                Some(date) => {
                    if let Some(row) = by_cell.get(&(date, path.as_str())) {
                        seconds = row.total_seconds;
                        nonzero = row.nonzero_views;
                        zero = row.zero_views;
                    }
                }
                None => {
                    for row in rows.iter().filter(|r| r.page_path == *path) {
                        seconds += row.total_seconds;
                        nonzero += row.nonzero_views;
                        zero += row.zero_views;
                    }
                }
            }
            cells.push(seconds.to_string());
            cells.push(nonzero.to_string());
            cells.push(zero.to_string());
        }
    }

    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(
        date: &str,
        path: &str,
        seconds: i64,
        nonzero: i64,
        zero: i64,
        comments: i64,
        edits: i64,
    ) -> MetricsCacheRow {
        MetricsCacheRow {
            username: Some("maria".to_string()),
            page_path: path.to_string(),
            view_date: date.parse().unwrap(),
            total_seconds: seconds,
            nonzero_views: nonzero,
            zero_views: zero,
            comments,
            task_edits: edits,
        }
    }

    fn axes() -> MetricsAxes {
        MetricsAxes {
            dates: vec!["2026-08-01".parse().unwrap(), "2026-08-02".parse().unwrap()],
            page_paths: vec!["intro".to_string(), "week-1".to_string()],
        }
    }

    #[test]
    fn test_pivot_cells_layout_width() {
        let rows = vec![row("2026-08-01", "intro", 120, 2, 1, 1, 0)];
        let refs: Vec<&MetricsCacheRow> = rows.iter().collect();
        let cells = pivot_cells(&refs, &axes());
        // (2 dates + TOTAL) * (5 summary + 3 per path * 2 paths)
        assert_eq!(cells.len(), 3 * (5 + 3 * 2));
    }

    #[test]
    fn test_pivot_cells_first_date_group() {
        let rows = vec![
            row("2026-08-01", "intro", 120, 2, 1, 1, 0),
            row("2026-08-01", "week-1", 60, 1, 0, 0, 2),
        ];
        let refs: Vec<&MetricsCacheRow> = rows.iter().collect();
        let cells = pivot_cells(&refs, &axes());

        // Summary for 2026-08-01: 180s -> 3 minutes, 3 nonzero, 1 zero, 1 comment, 2 edits
        assert_eq!(&cells[0..5], &["3", "3", "1", "1", "2"]);
        // Per-path cells: intro then week-1
        assert_eq!(&cells[5..8], &["120", "2", "1"]);
        assert_eq!(&cells[8..11], &["60", "1", "0"]);
    }

    #[test]
    fn test_pivot_cells_total_group_sums_dates() {
        let rows = vec![
            row("2026-08-01", "intro", 120, 2, 1, 0, 0),
            row("2026-08-02", "intro", 60, 1, 0, 1, 1),
        ];
        let refs: Vec<&MetricsCacheRow> = rows.iter().collect();
        let cells = pivot_cells(&refs, &axes());

        let group_width = 5 + 3 * 2;
        let total = &cells[2 * group_width..];
        // TOTAL summary: 180s -> 3 minutes, 3 nonzero, 1 zero, 1 comment, 1 edit
        assert_eq!(&total[0..5], &["3", "3", "1", "1", "1"]);
        // TOTAL intro: summed across both dates
        assert_eq!(&total[5..8], &["180", "3", "1"]);
        // TOTAL week-1: no traffic
        assert_eq!(&total[8..11], &["0", "0", "0"]);
    }

    #[test]
    fn test_pivot_cells_no_rows_all_zero() {
        let refs: Vec<&MetricsCacheRow> = Vec::new();
        let cells = pivot_cells(&refs, &axes());
        assert!(cells.iter().all(|c| c == "0"));
    }
}
