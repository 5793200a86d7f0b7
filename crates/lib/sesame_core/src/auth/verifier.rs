//! Bearer token verification.
//!
//! Each call runs parse → expiry → fingerprint → resolve and stops at the
//! first failing step. Nothing is cached between calls.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;
use uuid::Uuid;

use super::AuthError;
use super::fingerprint::{FingerprintPolicy, fingerprint};
use super::jwt::decode_claims;
use crate::models::auth::UserHandle;
use crate::store::CredentialStore;

/// Validates presented tokens against the live credential state.
#[derive(Clone)]
pub struct TokenVerifier {
    store: Arc<dyn CredentialStore>,
    signing_key: Vec<u8>,
    policy: FingerprintPolicy,
}

impl TokenVerifier {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        signing_key: &[u8],
        policy: FingerprintPolicy,
    ) -> Self {
        Self {
            store,
            signing_key: signing_key.to_vec(),
            policy,
        }
    }

    pub async fn verify(&self, token: &str) -> Result<UserHandle, AuthError> {
        self.verify_at(token, Utc::now()).await
    }

    /// Verify `token` as if the current time were `now`.
    pub async fn verify_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<UserHandle, AuthError> {
        // Parse
        let claims = decode_claims(token, &self.signing_key)?;
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::MalformedToken)?;

        // Expiry
        if now.timestamp() > claims.exp {
            debug!(%user_id, exp = claims.exp, "token expired");
            return Err(AuthError::TokenExpired);
        }

        // Fingerprint
        let Some(user) = self.store.find_user_by_id(user_id).await? else {
            debug!(%user_id, "token references a missing user");
            return Err(AuthError::StaleToken);
        };
        if fingerprint(&user, self.policy) != claims.fpr {
            debug!(%user_id, jti = %claims.jti, "token fingerprint mismatch");
            return Err(AuthError::StaleToken);
        }

        // Resolve
        Ok(user.handle())
    }
}
