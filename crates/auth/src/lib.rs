//! Authentication for Peerhub
//!
//! JWT bearer-token validation backed by the profiles table. Domain states
//! expose the [`AuthBackend`] via `FromRef` so the [`AuthUser`] extractor can
//! authenticate requests before handler bodies run.

pub mod backend;
pub mod claims;
pub mod config;
pub mod context;
pub mod error;
pub mod extractors;
pub mod jwt;
pub mod types;

pub use backend::AuthBackend;
pub use claims::Claims;
pub use config::AuthConfig;
pub use context::AuthContext;
pub use error::AuthError;
pub use extractors::{AuthUser, MaybeAuthUser};
pub use types::Profile;
