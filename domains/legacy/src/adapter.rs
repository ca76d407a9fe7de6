//! Legacy course adapter
//!
//! Read-only translation of legacy CMS rows into course values. Every
//! lookup that the legacy data model guarantees (node for a membership,
//! fields for a node, alias for a node) surfaces a missing row as a
//! [`LegacyError::NotFound`]; callers convert that to a not-found
//! response. Course resolution failures are logged with the slug before
//! being surfaced unchanged.

use serde::Serialize;
use sqlx::PgPool;
use thiserror::Error;

use crate::rows::{
    CourseFieldsRow, FileRow, GroupMembershipRow, LegacyUserRow, NodeRow, TermDataRow, TermNodeRow,
};

/// Node type under which the old site stored courses.
pub const COURSE_NODE_TYPE: &str = "course";

/// Status sentinel marking a course as completed.
pub const COMPLETE_STATUS: &str = "30_complete";

/// Path prefix of files still hosted under the old site's upload tree.
pub const FILE_PATH_PREFIX: &str = "sites/$NSITE.dev.p2pu.org/files/";

/// Placeholder shown when a course has no usable photo.
pub const MISSING_IMAGE_PATH: &str = "/images/project-missing.png";

#[derive(Error, Debug)]
pub enum LegacyError {
    #[error("Legacy record not found: {0}")]
    NotFound(String),

    #[error("Invalid legacy data: {0}")]
    InvalidData(String),

    #[error("Legacy database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// URLs used when rewriting legacy references.
#[derive(Debug, Clone)]
pub struct LegacyConfig {
    /// Base URL of the old site, prepended to course slugs
    pub site_url: String,
    /// Base URL now serving the old site's uploaded files
    pub files_url: String,
    /// Public media URL prefix of this application
    pub media_url: String,
}

/// A completed course a legacy user organized or participated in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PastCourse {
    pub name: String,
    pub url: String,
    pub organizer: bool,
    pub image_url: String,
}

/// Full detail of a legacy course, resolved by slug.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacyCourse {
    pub name: String,
    pub slug: String,
    pub url: String,
    /// Taxonomy term name the caller maps onto a school
    pub school_term_name: Option<String>,
    pub short_description: String,
    pub long_description: String,
    pub detailed_description: String,
    /// Whether the course required a sign-up task
    pub sign_up: bool,
    pub tasks: Vec<(String, String)>,
    pub links: Vec<(String, String)>,
}

/// Read-only accessor over the legacy database.
#[derive(Clone)]
pub struct LegacyCourses {
    pool: PgPool,
    config: LegacyConfig,
}

impl LegacyCourses {
    pub fn new(pool: PgPool, config: LegacyConfig) -> Self {
        Self { pool, config }
    }

    /// Completed past courses for a legacy username.
    ///
    /// An unknown username yields an empty list; a membership pointing at
    /// a missing node or fields row is an error.
    pub async fn past_courses(&self, username: &str) -> Result<Vec<PastCourse>, LegacyError> {
        let Some(user) = self.find_user(username).await? else {
            return Ok(Vec::new());
        };

        let memberships: Vec<GroupMembershipRow> = sqlx::query_as(
            "SELECT uid, nid, is_admin, is_active FROM og_uid WHERE uid = $1",
        )
        .bind(user.uid)
        .fetch_all(&self.pool)
        .await?;

        let mut past_courses = Vec::new();
        for membership in memberships {
            let node = self.find_course_node(membership.nid).await?.ok_or_else(|| {
                LegacyError::NotFound(format!("course node {}", membership.nid))
            })?;
            let fields = self.find_course_fields(node.nid).await?.ok_or_else(|| {
                LegacyError::NotFound(format!("course fields for node {}", node.nid))
            })?;

            if is_complete(fields.status_value.as_deref()) {
                let slug = self.slug_for_node(node.nid).await?;
                let image_url = self.image_url(fields.photo_fid).await?;
                past_courses.push(PastCourse {
                    name: node.title,
                    url: format!("{}{}", self.config.site_url, slug),
                    organizer: membership.is_admin != 0,
                    image_url,
                });
            }
        }

        Ok(past_courses)
    }

    /// Resolve a course by slug.
    ///
    /// `full` additionally loads the school term, descriptions and the
    /// sign-up flag. Any failure during resolution is logged with the
    /// slug and surfaced unchanged.
    pub async fn course_detail(&self, slug: &str, full: bool) -> Result<LegacyCourse, LegacyError> {
        match self.resolve_course(slug, full).await {
            Ok(course) => Ok(course),
            Err(e) => {
                tracing::error!(slug = %slug, error = %e, "Course not found on the old site");
                Err(e)
            }
        }
    }

    async fn resolve_course(&self, slug: &str, full: bool) -> Result<LegacyCourse, LegacyError> {
        let src: Option<String> =
            sqlx::query_scalar("SELECT src FROM url_alias WHERE dst = $1")
                .bind(slug)
                .fetch_optional(&self.pool)
                .await?;
        let src = src.ok_or_else(|| LegacyError::NotFound(format!("url alias for {}", slug)))?;

        let nid = parse_node_id(&src)?;
        let node = self
            .find_course_node(nid)
            .await?
            .ok_or_else(|| LegacyError::NotFound(format!("course node {}", nid)))?;

        let mut course = LegacyCourse {
            name: node.title,
            slug: slug.to_string(),
            url: format!("{}{}", self.config.site_url, slug),
            ..LegacyCourse::default()
        };
        if !full {
            return Ok(course);
        }

        let term_node: Option<TermNodeRow> =
            sqlx::query_as("SELECT nid, tid FROM term_node WHERE nid = $1")
                .bind(nid)
                .fetch_optional(&self.pool)
                .await?;
        let term_node =
            term_node.ok_or_else(|| LegacyError::NotFound(format!("term for node {}", nid)))?;

        let term_data: Option<TermDataRow> =
            sqlx::query_as("SELECT tid, name FROM term_data WHERE tid = $1")
                .bind(term_node.tid)
                .fetch_optional(&self.pool)
                .await?;
        let term_data = term_data
            .ok_or_else(|| LegacyError::NotFound(format!("term data {}", term_node.tid)))?;
        course.school_term_name = Some(term_data.name);

        let fields = self
            .find_course_fields(nid)
            .await?
            .ok_or_else(|| LegacyError::NotFound(format!("course fields for node {}", nid)))?;

        course.short_description = fields.short_description.clone().unwrap_or_default();
        course.long_description = String::new();
        course.detailed_description = assemble_detailed_description(&fields);
        course.sign_up = fields
            .sign_up_requirement
            .as_deref()
            .is_some_and(|v| !v.is_empty());

        Ok(course)
    }

    /// Slugs of courses matching a search term, optionally scoped to a
    /// school's legacy taxonomy term.
    pub async fn matching_course_slugs(
        &self,
        old_term_name: Option<&str>,
        term: &str,
    ) -> Result<Vec<String>, LegacyError> {
        let nids: Vec<i32> = match old_term_name {
            Some(name) => {
                let term_data: Option<TermDataRow> =
                    sqlx::query_as("SELECT tid, name FROM term_data WHERE name = $1")
                        .bind(name)
                        .fetch_optional(&self.pool)
                        .await?;
                let term_data = term_data
                    .ok_or_else(|| LegacyError::NotFound(format!("term data named {}", name)))?;

                sqlx::query_scalar("SELECT nid FROM term_node WHERE tid = $1")
                    .bind(term_data.tid)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                sqlx::query_scalar("SELECT nid FROM node WHERE type = $1")
                    .bind(COURSE_NODE_TYPE)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        let needle = term.to_lowercase();
        let mut slugs = Vec::new();
        for nid in nids {
            let slug = self.slug_for_node(nid).await?;
            if slug.contains(&needle) {
                slugs.push(slug);
            }
        }
        Ok(slugs)
    }

    /// Public image URL for a course photo file ID.
    ///
    /// Files still under the old upload tree are rewritten to the new
    /// static host; anything else gets the placeholder.
    pub async fn image_url(&self, fid: Option<i32>) -> Result<String, LegacyError> {
        if let Some(fid) = fid {
            let file: Option<FileRow> =
                sqlx::query_as("SELECT fid, filepath FROM files WHERE fid = $1")
                    .bind(fid)
                    .fetch_optional(&self.pool)
                    .await?;
            let file = file.ok_or_else(|| LegacyError::NotFound(format!("file {}", fid)))?;

            return Ok(rewrite_image_path(
                &file.filepath,
                &self.config.files_url,
                &self.config.media_url,
            ));
        }
        Ok(format!("{}{}", self.config.media_url, MISSING_IMAGE_PATH))
    }

    async fn find_user(&self, username: &str) -> Result<Option<LegacyUserRow>, LegacyError> {
        let user = sqlx::query_as("SELECT uid, name FROM users WHERE name = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_course_node(&self, nid: i32) -> Result<Option<NodeRow>, LegacyError> {
        let node = sqlx::query_as(
            r#"SELECT nid, type AS node_type, title FROM node WHERE type = $1 AND nid = $2"#,
        )
        .bind(COURSE_NODE_TYPE)
        .bind(nid)
        .fetch_optional(&self.pool)
        .await?;
        Ok(node)
    }

    async fn find_course_fields(&self, nid: i32) -> Result<Option<CourseFieldsRow>, LegacyError> {
        let fields = sqlx::query_as(
            r#"
            SELECT nid,
                   field_course_status_value AS status_value,
                   field_course_photo_fid AS photo_fid,
                   field_course_short_desc_value AS short_description,
                   field_course_summary_value AS summary,
                   field_course_learning_objectives_value AS learning_objectives,
                   field_course_prerequisites_value AS prerequisites,
                   field_course_sign_up_req_value AS sign_up_requirement
            FROM content_type_course
            WHERE nid = $1
            "#,
        )
        .bind(nid)
        .fetch_optional(&self.pool)
        .await?;
        Ok(fields)
    }

    /// Canonical slug for a node, resolved only through the alias table.
    async fn slug_for_node(&self, nid: i32) -> Result<String, LegacyError> {
        let dst: Option<String> = sqlx::query_scalar("SELECT dst FROM url_alias WHERE src = $1")
            .bind(format!("node/{}", nid))
            .fetch_optional(&self.pool)
            .await?;
        dst.ok_or_else(|| LegacyError::NotFound(format!("url alias for node {}", nid)))
    }
}

/// Whether a legacy course status marks the course as completed.
fn is_complete(status: Option<&str>) -> bool {
    status == Some(COMPLETE_STATUS)
}

/// Parse a node ID out of an alias source like `node/42`.
fn parse_node_id(src: &str) -> Result<i32, LegacyError> {
    src.strip_prefix("node/")
        .and_then(|rest| rest.parse().ok())
        .ok_or_else(|| LegacyError::InvalidData(format!("alias source {} is not a node path", src)))
}

/// Assemble the detailed description from the optional rich-text fields,
/// in fixed order. Empty and missing fields are skipped alike.
fn assemble_detailed_description(fields: &CourseFieldsRow) -> String {
    let sections = [
        ("Summary", fields.summary.as_deref()),
        ("Learning Objectives", fields.learning_objectives.as_deref()),
        ("Prerequisites", fields.prerequisites.as_deref()),
        ("Sign-Up Task", fields.sign_up_requirement.as_deref()),
    ];

    let mut description = String::new();
    for (heading, value) in sections {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            description.push_str(&format!("<h2>{}</h2><br>", heading));
            description.push_str(value);
            description.push_str("<br>");
        }
    }
    description
}

/// Rewrite a legacy file path to its public URL, falling back to the
/// placeholder for paths outside the old upload tree.
fn rewrite_image_path(filepath: &str, files_url: &str, media_url: &str) -> String {
    if let Some(rest) = filepath.strip_prefix(FILE_PATH_PREFIX) {
        format!("{}{}", files_url, rest)
    } else {
        format!("{}{}", media_url, MISSING_IMAGE_PATH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_complete_requires_exact_sentinel() {
        assert!(is_complete(Some("30_complete")));
        assert!(!is_complete(Some("20_in_progress")));
        assert!(!is_complete(Some("")));
        assert!(!is_complete(None));
    }

    #[test]
    fn test_parse_node_id() {
        assert_eq!(parse_node_id("node/42").unwrap(), 42);
        assert!(parse_node_id("taxonomy/7").is_err());
        assert!(parse_node_id("node/abc").is_err());
        assert!(parse_node_id("").is_err());
    }

    #[test]
    fn test_assemble_detailed_description_order() {
        let fields = CourseFieldsRow {
            summary: Some("An overview.".to_string()),
            learning_objectives: Some("Learn things.".to_string()),
            prerequisites: Some("None.".to_string()),
            sign_up_requirement: Some("Introduce yourself.".to_string()),
            ..CourseFieldsRow::default()
        };

        let description = assemble_detailed_description(&fields);
        let summary_at = description.find("Summary").unwrap();
        let objectives_at = description.find("Learning Objectives").unwrap();
        let prerequisites_at = description.find("Prerequisites").unwrap();
        let sign_up_at = description.find("Sign-Up Task").unwrap();

        assert!(summary_at < objectives_at);
        assert!(objectives_at < prerequisites_at);
        assert!(prerequisites_at < sign_up_at);
        assert!(description.starts_with("<h2>Summary</h2><br>An overview.<br>"));
    }

    #[test]
    fn test_assemble_detailed_description_skips_empty_fields() {
        let fields = CourseFieldsRow {
            summary: Some(String::new()),
            learning_objectives: None,
            prerequisites: Some("Basic Python.".to_string()),
            ..CourseFieldsRow::default()
        };

        let description = assemble_detailed_description(&fields);
        assert_eq!(
            description,
            "<h2>Prerequisites</h2><br>Basic Python.<br>"
        );
    }

    #[test]
    fn test_assemble_detailed_description_all_absent() {
        assert_eq!(
            assemble_detailed_description(&CourseFieldsRow::default()),
            ""
        );
    }

    #[test]
    fn test_rewrite_image_path_under_legacy_tree() {
        let url = rewrite_image_path(
            "sites/$NSITE.dev.p2pu.org/files/photos/course.png",
            "https://static.example.org/legacy/",
            "/media",
        );
        assert_eq!(url, "https://static.example.org/legacy/photos/course.png");
    }

    #[test]
    fn test_rewrite_image_path_outside_legacy_tree() {
        let url = rewrite_image_path("elsewhere/photo.png", "https://static.example.org/", "/media");
        assert_eq!(url, format!("/media{}", MISSING_IMAGE_PATH));
    }
}
