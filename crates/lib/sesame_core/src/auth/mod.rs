//! Authentication: credential verification, token issuance and verification.
//!
//! The HTTP layer in `sesame_api` only composes these pieces; everything
//! that decides whether a request is authenticated lives here.

pub mod authenticator;
pub mod fingerprint;
pub mod issuer;
pub mod jwt;
pub mod password;
pub mod service;
pub mod verifier;

use thiserror::Error;

pub use authenticator::Authenticator;
pub use issuer::TokenIssuer;
pub use service::AuthService;
pub use verifier::TokenVerifier;

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account inactive")]
    AccountInactive,

    #[error("Malformed token")]
    MalformedToken,

    #[error("Token expired")]
    TokenExpired,

    #[error("Stale token")]
    StaleToken,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    DbError(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// True for the kinds a caller must see as a plain "unauthorized".
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidCredentials
                | AuthError::AccountInactive
                | AuthError::MalformedToken
                | AuthError::TokenExpired
                | AuthError::StaleToken
        )
    }

    /// Short machine-readable name, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            AuthError::InvalidCredentials => "invalid_credentials",
            AuthError::AccountInactive => "account_inactive",
            AuthError::MalformedToken => "malformed_token",
            AuthError::TokenExpired => "token_expired",
            AuthError::StaleToken => "stale_token",
            AuthError::Validation(_) => "validation",
            AuthError::DbError(_) => "db",
            AuthError::Internal(_) => "internal",
        }
    }
}
