//! Repository implementations for the projects domain

pub mod completions;
pub mod links;
pub mod pages;
pub mod participations;
pub mod profiles;
pub mod projects;
pub mod relationships;
pub mod schools;
pub mod signups;
pub mod transactions;

use sqlx::PgPool;

pub use completions::CompletionRepository;
pub use links::LinkRepository;
pub use pages::PageRepository;
pub use participations::{ParticipationRepository, ParticipationWithProfile};
pub use profiles::ProfileRepository;
pub use projects::{ProjectRepository, StatusUpdate};
pub use relationships::RelationshipRepository;
pub use schools::SchoolRepository;
pub use signups::SignupRepository;

/// Combined repository access for the projects domain
#[derive(Clone)]
pub struct ProjectsRepositories {
    pool: PgPool,
    pub projects: ProjectRepository,
    pub participations: ParticipationRepository,
    pub pages: PageRepository,
    pub completions: CompletionRepository,
    pub links: LinkRepository,
    pub relationships: RelationshipRepository,
    pub signups: SignupRepository,
    pub profiles: ProfileRepository,
    pub schools: SchoolRepository,
}

impl ProjectsRepositories {
    pub fn new(pool: PgPool) -> Self {
        Self {
            projects: ProjectRepository::new(pool.clone()),
            participations: ParticipationRepository::new(pool.clone()),
            pages: PageRepository::new(pool.clone()),
            completions: CompletionRepository::new(pool.clone()),
            links: LinkRepository::new(pool.clone()),
            relationships: RelationshipRepository::new(pool.clone()),
            signups: SignupRepository::new(pool.clone()),
            profiles: ProfileRepository::new(pool.clone()),
            schools: SchoolRepository::new(pool.clone()),
            pool,
        }
    }

    /// Begin a transaction for multi-row write sequences
    pub async fn begin(&self) -> Result<sqlx::Transaction<'_, sqlx::Postgres>, sqlx::Error> {
        self.pool.begin().await
    }

    /// Get a reference to the underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
