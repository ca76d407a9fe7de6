//! Domain entities for the Peerhub projects domain
//!
//! The Project aggregate and its satellite records. Entities validate
//! their own invariants; the soft states carry a status enum plus a
//! timestamp that must be set iff the status is terminal.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use peerhub_common::{Error, Result};
use validator::ValidateUrl;

use crate::domain::state::{
    transition, CompletionStatus, PageStatus, ParticipationStatus, RelationshipStatus,
};

/// Title and slug of the auto-created description page.
pub const FULL_DESCRIPTION_TITLE: &str = "Full Description";
pub const FULL_DESCRIPTION_SLUG: &str = "full-description";

/// Initial content of the description page when nothing better exists.
pub const DEFAULT_DETAILED_DESCRIPTION: &str =
    "<p>Use this page to describe the goals, schedule and expectations in detail.</p>";

/// Project categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "project_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProjectKind {
    #[default]
    StudyGroup,
    Course,
    Challenge,
}

impl ProjectKind {
    /// Human-facing label, used in messages and kind autocomplete.
    pub fn label(&self) -> &'static str {
        match self {
            ProjectKind::StudyGroup => "study group",
            ProjectKind::Course => "course",
            ProjectKind::Challenge => "challenge",
        }
    }

    pub const ALL: [ProjectKind; 3] = [
        ProjectKind::StudyGroup,
        ProjectKind::Course,
        ProjectKind::Challenge,
    ];
}

impl std::fmt::Display for ProjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-project sign-up policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "signup_policy", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SignupPolicy {
    /// Anyone may sign up
    Public,
    /// Sign-up answers are visible to existing participants only
    ParticipantsOnly,
    /// Sign-up is moderated by organizers
    #[default]
    Closed,
}

/// The central aggregate: a study group, course or challenge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Project {
    pub id: Uuid,
    pub slug: String,
    pub kind: ProjectKind,
    pub name: String,
    pub short_description: String,
    pub long_description: Option<String>,
    pub image_path: Option<String>,
    pub school_id: Option<Uuid>,
    pub detailed_description_id: Option<Uuid>,
    pub clone_of: Option<Uuid>,
    pub imported_from: Option<String>,
    pub listed: bool,
    pub under_development: bool,
    pub signup_closed: bool,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Create a new project with validation. The slug is derived from the
    /// name with a random suffix for uniqueness.
    pub fn new(
        kind: ProjectKind,
        name: String,
        short_description: String,
        long_description: Option<String>,
    ) -> Result<Self> {
        Self::validate_name(&name)?;
        Self::validate_short_description(&short_description)?;

        let slug = Self::generate_slug(&name)?;

        let now = Utc::now();
        Ok(Project {
            id: Uuid::new_v4(),
            slug,
            kind,
            name,
            short_description,
            long_description,
            image_path: None,
            school_id: None,
            detailed_description_id: None,
            clone_of: None,
            imported_from: None,
            listed: true,
            under_development: true,
            signup_closed: false,
            start_date: None,
            end_date: None,
            published_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn is_challenge(&self) -> bool {
        self.kind == ProjectKind::Challenge
    }

    fn validate_name(name: &str) -> Result<()> {
        if name.trim().is_empty() || name.len() > 100 {
            return Err(Error::Validation(
                "Project name must be 1-100 characters".to_string(),
            ));
        }
        Ok(())
    }

    fn validate_short_description(short_description: &str) -> Result<()> {
        if short_description.is_empty() || short_description.len() > 420 {
            return Err(Error::Validation(
                "Short description must be 1-420 characters".to_string(),
            ));
        }
        Ok(())
    }

    /// Validate slug format
    pub fn validate_slug(slug: &str) -> Result<()> {
        if slug.is_empty() || slug.len() > 110 {
            return Err(Error::Validation(
                "Slug must be 1-110 characters".to_string(),
            ));
        }

        if !slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(Error::Validation(
                "Slug must contain only lowercase letters, numbers, and hyphens".to_string(),
            ));
        }

        if slug.starts_with('-') || slug.ends_with('-') {
            return Err(Error::Validation(
                "Slug cannot start or end with a hyphen".to_string(),
            ));
        }

        if slug.contains("--") {
            return Err(Error::Validation(
                "Slug cannot contain consecutive hyphens".to_string(),
            ));
        }

        Ok(())
    }

    /// Generate slug from name with random suffix for uniqueness
    fn generate_slug(name: &str) -> Result<String> {
        let raw = name
            .to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '-' })
            .collect::<String>();

        // Collapse consecutive hyphens and trim leading/trailing
        let mut base = String::with_capacity(raw.len());
        let mut prev_hyphen = false;
        for ch in raw.chars() {
            if ch == '-' {
                if !prev_hyphen {
                    base.push(ch);
                }
                prev_hyphen = true;
            } else {
                base.push(ch);
                prev_hyphen = false;
            }
        }
        let base = base.trim_matches('-').to_string();

        if base.is_empty() {
            return Err(Error::Validation(
                "Cannot generate valid slug from name".to_string(),
            ));
        }

        let suffix = Uuid::new_v4().to_string()[..8].to_string();
        let slug = format!("{}-{}", base, suffix);

        Self::validate_slug(&slug)?;
        Ok(slug)
    }

    /// Validate invariants
    pub fn validate(&self) -> Result<()> {
        Self::validate_name(&self.name)?;
        Self::validate_short_description(&self.short_description)?;
        Self::validate_slug(&self.slug)?;

        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if end < start {
                return Err(Error::Validation(
                    "End date cannot precede start date".to_string(),
                ));
            }
        }

        Ok(())
    }
}

/// Membership record linking a user to a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Participation {
    pub id: Uuid,
    pub project_id: Uuid,
    pub user_id: Uuid,
    pub organizing: bool,
    pub status: ParticipationStatus,
    pub joined_at: DateTime<Utc>,
    pub left_at: Option<DateTime<Utc>>,
}

impl Participation {
    pub fn new(project_id: Uuid, user_id: Uuid, organizing: bool) -> Self {
        Participation {
            id: Uuid::new_v4(),
            project_id,
            user_id,
            organizing,
            status: ParticipationStatus::Active,
            joined_at: Utc::now(),
            left_at: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == ParticipationStatus::Active
    }

    /// Leave the project. The row survives; rejoining creates a new one.
    pub fn leave(&mut self) -> Result<()> {
        self.status = transition(self.status, ParticipationStatus::Left)
            .map_err(|e| Error::Validation(e.to_string()))?;
        self.left_at = Some(Utc::now());
        Ok(())
    }

    /// One-way promotion to organizer.
    pub fn promote(&mut self) -> Result<()> {
        if self.organizing {
            return Err(Error::Authorization(
                "You can't make that person an organizer".to_string(),
            ));
        }
        if !self.is_active() {
            return Err(Error::Validation(
                "Only active participants can be promoted".to_string(),
            ));
        }
        self.organizing = true;
        Ok(())
    }

    /// Validate invariants
    pub fn validate(&self) -> Result<()> {
        match self.status {
            ParticipationStatus::Active if self.left_at.is_some() => Err(Error::Validation(
                "Active participation cannot carry a leave timestamp".to_string(),
            )),
            ParticipationStatus::Left if self.left_at.is_none() => Err(Error::Validation(
                "Left participation must carry a leave timestamp".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

/// An orderable content unit: free-form documentation, or a completable
/// task in challenge projects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Page {
    pub id: Uuid,
    pub project_id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub index: i32,
    pub listed: bool,
    pub collaborative: bool,
    pub status: PageStatus,
    pub deleted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Page {
    pub fn new(
        project_id: Uuid,
        author_id: Uuid,
        title: String,
        slug: String,
        content: String,
    ) -> Result<Self> {
        if title.trim().is_empty() || title.len() > 100 {
            return Err(Error::Validation(
                "Page title must be 1-100 characters".to_string(),
            ));
        }
        Project::validate_slug(&slug)?;

        let now = Utc::now();
        Ok(Page {
            id: Uuid::new_v4(),
            project_id,
            author_id,
            title,
            slug,
            content,
            index: 0,
            listed: true,
            collaborative: true,
            status: PageStatus::Active,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn is_active(&self) -> bool {
        self.status == PageStatus::Active
    }

    /// Validate invariants
    pub fn validate(&self) -> Result<()> {
        match self.status {
            PageStatus::Active if self.deleted_at.is_some() => Err(Error::Validation(
                "Active page cannot carry a deletion timestamp".to_string(),
            )),
            PageStatus::Deleted if self.deleted_at.is_none() => Err(Error::Validation(
                "Deleted page must carry a deletion timestamp".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

/// A user's completion of a task page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TaskCompletion {
    pub id: Uuid,
    pub page_id: Uuid,
    pub user_id: Uuid,
    pub status: CompletionStatus,
    pub completed_at: DateTime<Utc>,
    pub unchecked_at: Option<DateTime<Utc>>,
}

impl TaskCompletion {
    pub fn new(page_id: Uuid, user_id: Uuid) -> Self {
        TaskCompletion {
            id: Uuid::new_v4(),
            page_id,
            user_id,
            status: CompletionStatus::Completed,
            completed_at: Utc::now(),
            unchecked_at: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == CompletionStatus::Completed
    }

    /// Uncheck this completion. Terminal for the row; a later completion
    /// creates a fresh row.
    pub fn uncheck(&mut self) -> Result<()> {
        self.status = transition(self.status, CompletionStatus::Unchecked)
            .map_err(|e| Error::Validation(e.to_string()))?;
        self.unchecked_at = Some(Utc::now());
        Ok(())
    }

    /// Validate invariants
    pub fn validate(&self) -> Result<()> {
        match self.status {
            CompletionStatus::Completed if self.unchecked_at.is_some() => Err(Error::Validation(
                "Completed row cannot carry an uncheck timestamp".to_string(),
            )),
            CompletionStatus::Unchecked if self.unchecked_at.is_none() => Err(Error::Validation(
                "Unchecked row must carry an uncheck timestamp".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

/// Organizer-curated external resource, optionally tied to a feed
/// subscription maintained by the outbox drainer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Link {
    pub id: Uuid,
    pub project_id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub url: String,
    pub index: i32,
    pub subscription_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Link {
    pub fn new(project_id: Uuid, user_id: Uuid, name: String, url: String) -> Result<Self> {
        Self::validate_fields(&name, &url)?;
        Ok(Link {
            id: Uuid::new_v4(),
            project_id,
            user_id,
            name,
            url,
            index: 0,
            subscription_id: None,
            created_at: Utc::now(),
        })
    }

    pub fn validate_fields(name: &str, url: &str) -> Result<()> {
        if name.trim().is_empty() || name.len() > 100 {
            return Err(Error::Validation(
                "Link name must be 1-100 characters".to_string(),
            ));
        }
        if !url.validate_url() {
            return Err(Error::Validation("Invalid link URL".to_string()));
        }
        Ok(())
    }
}

/// Per-project sign-up record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Signup {
    pub id: Uuid,
    pub project_id: Uuid,
    pub author_id: Uuid,
    pub policy: SignupPolicy,
    pub created_at: DateTime<Utc>,
}

impl Signup {
    pub fn new(project_id: Uuid, author_id: Uuid, policy: SignupPolicy) -> Self {
        Signup {
            id: Uuid::new_v4(),
            project_id,
            author_id,
            policy,
            created_at: Utc::now(),
        }
    }
}

/// Follow relationship between a user and a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Relationship {
    pub id: Uuid,
    pub source_user_id: Uuid,
    pub target_project_id: Uuid,
    pub status: RelationshipStatus,
    pub created_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl Relationship {
    pub fn new(source_user_id: Uuid, target_project_id: Uuid) -> Self {
        Relationship {
            id: Uuid::new_v4(),
            source_user_id,
            target_project_id,
            status: RelationshipStatus::Active,
            created_at: Utc::now(),
            ended_at: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == RelationshipStatus::Active
    }
}

/// Activity-feed verbs used by this domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, Default)]
#[sqlx(type_name = "activity_verb", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ActivityVerb {
    #[default]
    Post,
}

/// Activity-feed entry scoped to a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Activity {
    pub id: Uuid,
    pub actor_id: Uuid,
    pub verb: ActivityVerb,
    pub project_id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl Activity {
    pub fn new(actor_id: Uuid, verb: ActivityVerb, project_id: Uuid) -> Self {
        Activity {
            id: Uuid::new_v4(),
            actor_id,
            verb,
            project_id,
            created_at: Utc::now(),
        }
    }
}

/// School a project can belong to. `old_term_name` links it to the
/// legacy taxonomy term used by the import adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct School {
    pub id: Uuid,
    pub slug: String,
    pub name: String,
    pub old_term_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_creation() {
        let project = Project::new(
            ProjectKind::Course,
            "Intro to Testing".to_string(),
            "Learn to test software.".to_string(),
            None,
        )
        .unwrap();

        assert_eq!(project.kind, ProjectKind::Course);
        assert!(project.slug.starts_with("intro-to-testing-"));
        assert!(project.listed);
        assert!(project.published_at.is_none());
        assert!(project.validate().is_ok());
    }

    #[test]
    fn test_project_name_validation() {
        assert!(Project::new(
            ProjectKind::Course,
            "".to_string(),
            "desc".to_string(),
            None
        )
        .is_err());
        assert!(Project::new(
            ProjectKind::Course,
            "a".repeat(101),
            "desc".to_string(),
            None
        )
        .is_err());
    }

    #[test]
    fn test_project_short_description_boundary() {
        let ok = Project::new(
            ProjectKind::Course,
            "Course".to_string(),
            "d".repeat(420),
            None,
        );
        assert!(ok.is_ok());

        let too_long = Project::new(
            ProjectKind::Course,
            "Course".to_string(),
            "d".repeat(421),
            None,
        );
        assert!(too_long.is_err());
    }

    #[test]
    fn test_project_slug_validation() {
        assert!(Project::validate_slug("intro-to-testing").is_ok());
        assert!(Project::validate_slug("a").is_ok());
        assert!(Project::validate_slug("course123").is_ok());

        assert!(Project::validate_slug("").is_err());
        assert!(Project::validate_slug("-leading").is_err());
        assert!(Project::validate_slug("trailing-").is_err());
        assert!(Project::validate_slug("UPPER").is_err());
        assert!(Project::validate_slug("with_underscore").is_err());
        assert!(Project::validate_slug("a--b").is_err());
        assert!(Project::validate_slug(&"a".repeat(111)).is_err());
    }

    #[test]
    fn test_project_slug_generation_collapses_specials() {
        let project = Project::new(
            ProjectKind::StudyGroup,
            "Math!! & Physics".to_string(),
            "desc".to_string(),
            None,
        )
        .unwrap();
        assert!(project.slug.starts_with("math-physics-"));
        assert!(!project.slug.contains("--"));
    }

    #[test]
    fn test_project_date_ordering_invariant() {
        let mut project = Project::new(
            ProjectKind::Course,
            "Course".to_string(),
            "desc".to_string(),
            None,
        )
        .unwrap();
        project.start_date = Some("2026-09-01".parse().unwrap());
        project.end_date = Some("2026-08-01".parse().unwrap());
        assert!(project.validate().is_err());

        project.end_date = Some("2026-10-01".parse().unwrap());
        assert!(project.validate().is_ok());
    }

    #[test]
    fn test_kind_labels() {
        assert_eq!(ProjectKind::StudyGroup.label(), "study group");
        assert_eq!(ProjectKind::Course.label(), "course");
        assert_eq!(ProjectKind::Challenge.label(), "challenge");
    }

    #[test]
    fn test_participation_leave_sets_state_and_timestamp() {
        let mut participation = Participation::new(Uuid::new_v4(), Uuid::new_v4(), false);
        assert!(participation.is_active());
        assert!(participation.left_at.is_none());

        participation.leave().unwrap();

        assert_eq!(participation.status, ParticipationStatus::Left);
        assert!(participation.left_at.is_some());
        assert!(participation.validate().is_ok());
    }

    #[test]
    fn test_participation_cannot_leave_twice() {
        let mut participation = Participation::new(Uuid::new_v4(), Uuid::new_v4(), false);
        participation.leave().unwrap();
        assert!(participation.leave().is_err());
    }

    #[test]
    fn test_participation_promote_is_one_way() {
        let mut participation = Participation::new(Uuid::new_v4(), Uuid::new_v4(), false);
        participation.promote().unwrap();
        assert!(participation.organizing);

        // Promoting an organizer is refused
        assert!(participation.promote().is_err());
    }

    #[test]
    fn test_participation_promote_requires_active() {
        let mut participation = Participation::new(Uuid::new_v4(), Uuid::new_v4(), false);
        participation.leave().unwrap();
        assert!(participation.promote().is_err());
    }

    #[test]
    fn test_participation_status_timestamp_pairing() {
        let mut participation = Participation::new(Uuid::new_v4(), Uuid::new_v4(), false);
        assert!(participation.validate().is_ok());

        participation.left_at = Some(Utc::now());
        assert!(participation.validate().is_err());

        participation.status = ParticipationStatus::Left;
        assert!(participation.validate().is_ok());

        participation.left_at = None;
        assert!(participation.validate().is_err());
    }

    #[test]
    fn test_page_creation_validates_title_and_slug() {
        assert!(Page::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "".to_string(),
            "slug".to_string(),
            String::new()
        )
        .is_err());
        assert!(Page::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "Title".to_string(),
            "Bad Slug".to_string(),
            String::new()
        )
        .is_err());

        let page = Page::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "Week 1".to_string(),
            "week-1".to_string(),
            "<p>Read chapter 1</p>".to_string(),
        )
        .unwrap();
        assert!(page.is_active());
        assert!(page.listed);
    }

    #[test]
    fn test_completion_uncheck_terminal() {
        let mut completion = TaskCompletion::new(Uuid::new_v4(), Uuid::new_v4());
        assert!(completion.is_completed());
        assert!(completion.unchecked_at.is_none());

        completion.uncheck().unwrap();
        assert!(!completion.is_completed());
        assert!(completion.unchecked_at.is_some());
        assert!(completion.validate().is_ok());

        // Re-completing a row is invalid; callers create a fresh row
        assert!(completion.uncheck().is_err());
    }

    #[test]
    fn test_link_validation() {
        assert!(Link::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "Course wiki".to_string(),
            "https://wiki.example.org/course".to_string()
        )
        .is_ok());

        assert!(Link::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "".to_string(),
            "https://wiki.example.org".to_string()
        )
        .is_err());

        assert!(Link::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            "Bad".to_string(),
            "not-a-url".to_string()
        )
        .is_err());
    }

    #[test]
    fn test_relationship_starts_active() {
        let relationship = Relationship::new(Uuid::new_v4(), Uuid::new_v4());
        assert!(relationship.is_active());
        assert!(relationship.ended_at.is_none());
    }

    #[test]
    fn test_signup_policy_default_is_closed() {
        assert_eq!(SignupPolicy::default(), SignupPolicy::Closed);
    }

    #[test]
    fn test_serialization_roundtrip() {
        let project = Project::new(
            ProjectKind::Challenge,
            "Webcraft 101".to_string(),
            "Build a site.".to_string(),
            Some("A longer pitch.".to_string()),
        )
        .unwrap();

        let json = serde_json::to_string(&project).unwrap();
        let deserialized: Project = serde_json::from_str(&json).unwrap();
        assert_eq!(project, deserialized);
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        let json = serde_json::to_value(ProjectKind::StudyGroup).unwrap();
        assert_eq!(json, "study_group");
    }
}
