//! Row types for the legacy CMS schema
//!
//! Columns are aliased in the queries so the structs carry this crate's
//! names rather than the legacy field names.

/// A content node. Courses are nodes with type `course`.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct NodeRow {
    pub nid: i32,
    pub node_type: String,
    pub title: String,
}

/// Course-specific fields keyed by node ID.
#[derive(Debug, Clone, Default, sqlx::FromRow)]
pub struct CourseFieldsRow {
    pub nid: i32,
    pub status_value: Option<String>,
    pub photo_fid: Option<i32>,
    pub short_description: Option<String>,
    pub summary: Option<String>,
    pub learning_objectives: Option<String>,
    pub prerequisites: Option<String>,
    pub sign_up_requirement: Option<String>,
}

/// Group membership: which legacy users belonged to which course node.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct GroupMembershipRow {
    pub uid: i32,
    pub nid: i32,
    pub is_admin: i32,
    pub is_active: i32,
}

/// Uploaded file metadata.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FileRow {
    pub fid: i32,
    pub filepath: String,
}

/// Taxonomy term; schools map onto terms by name.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TermDataRow {
    pub tid: i32,
    pub name: String,
}

/// Node-to-term association.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TermNodeRow {
    pub nid: i32,
    pub tid: i32,
}

/// Legacy account row, matched by username.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct LegacyUserRow {
    pub uid: i32,
    pub name: String,
}
