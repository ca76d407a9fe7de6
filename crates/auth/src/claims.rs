//! JWT claims types

use serde::{Deserialize, Serialize};

/// Claims carried by Peerhub bearer tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (profile ID)
    pub sub: String,
    /// Username at issuance time
    pub username: String,
    /// Email, when the issuer includes it
    pub email: Option<String>,
    /// Issued at
    pub iat: u64,
    /// Expires at
    pub exp: u64,
}
