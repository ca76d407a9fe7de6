//! Concrete authentication backend
//!
//! Wraps `PgPool` + `AuthConfig` and owns auth-specific SQL queries.
//! Uses runtime `sqlx::query_as` consistent with the repository layer.

use sqlx::PgPool;
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::context::AuthContext;
use crate::error::AuthError;
use crate::jwt::validate_jwt_token;
use crate::types::Profile;

/// Concrete authentication backend.
///
/// Wraps a database pool and auth configuration. Domain states expose
/// this via `FromRef`:
/// ```ignore
/// impl FromRef<MyDomainState> for AuthBackend {
///     fn from_ref(state: &MyDomainState) -> Self {
///         state.auth.clone()
///     }
/// }
/// ```
#[derive(Clone)]
pub struct AuthBackend {
    pool: PgPool,
    config: AuthConfig,
}

impl AuthBackend {
    pub fn new(pool: PgPool, config: AuthConfig) -> Self {
        Self { pool, config }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    /// Find a profile by ID
    pub(crate) async fn find_profile(&self, id: Uuid) -> Result<Option<Profile>, AuthError> {
        let profile: Option<Profile> = sqlx::query_as(
            r#"
            SELECT id, username, email, full_name, is_superuser, deleted, created_at
            FROM profiles
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, profile_id = %id, "Failed to load profile");
            AuthError::UserLoadError
        })?;

        Ok(profile)
    }

    /// Authenticate a bearer token: validate the JWT, then load the profile.
    ///
    /// Deleted profiles authenticate as not-found so a removed account
    /// cannot keep acting through an unexpired token.
    pub async fn authenticate(&self, token: &str) -> Result<AuthContext, AuthError> {
        let claims = validate_jwt_token(token, &self.config)?;

        let profile_id: Uuid = claims.sub.parse().map_err(|_| AuthError::InvalidUserId)?;

        let profile = self
            .find_profile(profile_id)
            .await?
            .filter(|p| !p.deleted)
            .ok_or(AuthError::UserNotFound)?;

        Ok(AuthContext::new(profile))
    }
}
