//! Identifier/secret verification.

use std::sync::Arc;

use tracing::{info, warn};

use super::AuthError;
use super::password::{hash_password, verify_password};
use crate::models::auth::UserHandle;
use crate::store::{CredentialStore, normalize_identifier};

/// Checks submitted credentials against a [`CredentialStore`].
#[derive(Clone)]
pub struct Authenticator {
    store: Arc<dyn CredentialStore>,
    /// Verified against when no user matches, so unknown users cost the
    /// same bcrypt work as wrong passwords.
    dummy_hash: Arc<str>,
}

impl Authenticator {
    /// `bcrypt_cost` should match the cost of stored hashes.
    pub fn new(store: Arc<dyn CredentialStore>, bcrypt_cost: u32) -> Result<Self, AuthError> {
        let dummy_hash = hash_password("sesame-dummy-password", bcrypt_cost)?;
        Ok(Self {
            store,
            dummy_hash: dummy_hash.into(),
        })
    }

    /// Verify `identifier`/`secret`.
    ///
    /// The identifier is matched case-insensitively. Both strings are used
    /// verbatim otherwise: NUL characters are ordinary characters.
    ///
    /// Returns `InvalidCredentials` for an unknown user or a wrong secret,
    /// and `AccountInactive` for a correct secret on an inactive account.
    pub async fn authenticate(
        &self,
        identifier: &str,
        secret: &str,
    ) -> Result<UserHandle, AuthError> {
        let normalized = normalize_identifier(identifier);
        let Some(user) = self.store.find_user_by_identifier(&normalized).await? else {
            let _ = verify_password(secret, &self.dummy_hash)?;
            warn!(kind = "unknown_user", "login failed");
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(secret, &user.password_hash)? {
            warn!(user_id = %user.id, kind = "bad_password", "login failed");
            return Err(AuthError::InvalidCredentials);
        }

        if !user.active {
            warn!(user_id = %user.id, kind = "inactive", "login failed");
            return Err(AuthError::AccountInactive);
        }

        info!(user_id = %user.id, username = %user.username, "login succeeded");
        Ok(user.handle())
    }
}
