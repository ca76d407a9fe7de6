//! Capability-check pipeline
//!
//! Authorization is an ordered list of predicates over (actor, project),
//! evaluated before a handler body runs and short-circuiting at the
//! first failure with a tagged forbidden error. Authentication itself
//! happens upstream in the `AuthUser` extractor.

use peerhub_auth::Profile;
use peerhub_common::{Error, Result};

use crate::domain::entities::ProjectKind;

/// Kinds for which link and participant-removal management exists.
pub const LINK_KINDS: &[ProjectKind] = &[ProjectKind::StudyGroup, ProjectKind::Course];

/// Kinds with completable tasks.
pub const CHALLENGE_KINDS: &[ProjectKind] = &[ProjectKind::Challenge];

/// A single authorization predicate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Check {
    /// Actor must be an active organizer of the project
    Organizer,
    /// Actor must be an active participant of the project
    Participant,
    /// Project kind must be one of the listed kinds
    KindOneOf(&'static [ProjectKind]),
    /// Actor must be on the metrics allowlist or a superuser
    MetricsViewer,
}

/// Everything the checks need to know about the actor and the project.
#[derive(Debug)]
pub struct AccessContext<'a> {
    pub profile: &'a Profile,
    pub kind: ProjectKind,
    pub organizing: bool,
    pub participating: bool,
    pub metrics_allowlist: &'a [String],
}

impl<'a> AccessContext<'a> {
    pub fn new(profile: &'a Profile, kind: ProjectKind) -> Self {
        Self {
            profile,
            kind,
            organizing: false,
            participating: false,
            metrics_allowlist: &[],
        }
    }

    pub fn organizing(mut self, organizing: bool) -> Self {
        self.organizing = organizing;
        // Organizers are participants by construction
        self.participating = self.participating || organizing;
        self
    }

    pub fn participating(mut self, participating: bool) -> Self {
        self.participating = self.participating || participating;
        self
    }

    pub fn metrics_allowlist(mut self, allowlist: &'a [String]) -> Self {
        self.metrics_allowlist = allowlist;
        self
    }
}

/// Evaluate checks in order; the first failure wins.
pub fn authorize(checks: &[Check], ctx: &AccessContext<'_>) -> Result<()> {
    for check in checks {
        evaluate(check, ctx)?;
    }
    Ok(())
}

fn evaluate(check: &Check, ctx: &AccessContext<'_>) -> Result<()> {
    match check {
        Check::Organizer => {
            if !ctx.organizing {
                return Err(Error::Authorization(
                    "Only organizers can perform this action".to_string(),
                ));
            }
        }
        Check::Participant => {
            if !ctx.participating {
                return Err(Error::Authorization(
                    "Only participants can perform this action".to_string(),
                ));
            }
        }
        Check::KindOneOf(kinds) => {
            if !kinds.contains(&ctx.kind) {
                return Err(Error::Authorization(format!(
                    "This action is not available for a {}",
                    ctx.kind
                )));
            }
        }
        Check::MetricsViewer => {
            let allowed = ctx.profile.is_superuser
                || ctx
                    .metrics_allowlist
                    .iter()
                    .any(|name| name == &ctx.profile.username);
            if !allowed {
                return Err(Error::Authorization(
                    "You are not allowed to view these metrics".to_string(),
                ));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn profile(username: &str, is_superuser: bool) -> Profile {
        Profile {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: format!("{}@example.com", username),
            full_name: None,
            is_superuser,
            deleted: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_organizer_check() {
        let p = profile("maria", false);
        let ctx = AccessContext::new(&p, ProjectKind::Course).organizing(true);
        assert!(authorize(&[Check::Organizer], &ctx).is_ok());

        let ctx = AccessContext::new(&p, ProjectKind::Course).participating(true);
        assert!(authorize(&[Check::Organizer], &ctx).is_err());
    }

    #[test]
    fn test_organizers_count_as_participants() {
        let p = profile("maria", false);
        let ctx = AccessContext::new(&p, ProjectKind::Challenge).organizing(true);
        assert!(authorize(&[Check::Participant], &ctx).is_ok());
    }

    #[test]
    fn test_kind_restriction() {
        let p = profile("maria", false);
        let ctx = AccessContext::new(&p, ProjectKind::Challenge).organizing(true);

        let result = authorize(&[Check::Organizer, Check::KindOneOf(LINK_KINDS)], &ctx);
        let err = result.unwrap_err();
        assert!(matches!(err, Error::Authorization(_)));
        assert!(err.to_string().contains("challenge"));
    }

    #[test]
    fn test_checks_short_circuit_in_order() {
        let p = profile("maria", false);
        // Both checks would fail; the organizer check comes first
        let ctx = AccessContext::new(&p, ProjectKind::Challenge);
        let err = authorize(&[Check::Organizer, Check::KindOneOf(LINK_KINDS)], &ctx).unwrap_err();
        assert!(err.to_string().contains("organizers"));

        // Swapped order surfaces the kind failure instead
        let err = authorize(&[Check::KindOneOf(LINK_KINDS), Check::Organizer], &ctx).unwrap_err();
        assert!(err.to_string().contains("challenge"));
    }

    #[test]
    fn test_metrics_viewer_allowlist() {
        let p = profile("maria", false);
        let allowlist = vec!["maria".to_string()];
        let ctx = AccessContext::new(&p, ProjectKind::Course).metrics_allowlist(&allowlist);
        assert!(authorize(&[Check::MetricsViewer], &ctx).is_ok());

        let other = profile("omar", false);
        let ctx = AccessContext::new(&other, ProjectKind::Course).metrics_allowlist(&allowlist);
        assert!(authorize(&[Check::MetricsViewer], &ctx).is_err());
    }

    #[test]
    fn test_metrics_viewer_superuser_bypasses_allowlist() {
        let root = profile("root", true);
        let ctx = AccessContext::new(&root, ProjectKind::Course);
        assert!(authorize(&[Check::MetricsViewer], &ctx).is_ok());
    }

    #[test]
    fn test_empty_pipeline_allows() {
        let p = profile("maria", false);
        let ctx = AccessContext::new(&p, ProjectKind::Course);
        assert!(authorize(&[], &ctx).is_ok());
    }
}
