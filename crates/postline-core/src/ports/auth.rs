//! Identity provider port.

use crate::domain::CurrentUser;

/// Verifies session tokens issued by the external identity provider.
pub trait IdentityProvider: Send + Sync {
    /// Resolve a bearer token to the signed-in user.
    fn verify(&self, token: &str) -> Result<CurrentUser, AuthError>;
}

/// Authentication errors.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Missing authorization header")]
    MissingAuth,
}
