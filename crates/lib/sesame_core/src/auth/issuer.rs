//! Bearer token issuance.

use chrono::{DateTime, Duration, Utc};
use tracing::debug;
use uuid::Uuid;

use super::AuthError;
use super::fingerprint::{FingerprintPolicy, fingerprint};
use super::jwt::encode_claims;
use crate::models::auth::{IssuedToken, TokenClaims, UserRecord};

/// Mints signed, time-limited tokens bound to a user's current credential.
#[derive(Clone)]
pub struct TokenIssuer {
    signing_key: Vec<u8>,
    policy: FingerprintPolicy,
}

impl TokenIssuer {
    pub fn new(signing_key: &[u8], policy: FingerprintPolicy) -> Self {
        Self {
            signing_key: signing_key.to_vec(),
            policy,
        }
    }

    /// Issue a token for `user` valid for `ttl` from now.
    pub fn issue(&self, user: &UserRecord, ttl: Duration) -> Result<IssuedToken, AuthError> {
        self.issue_at(user, ttl, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(
        &self,
        user: &UserRecord,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, AuthError> {
        if ttl <= Duration::zero() {
            return Err(AuthError::Validation("token ttl must be positive".into()));
        }
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or_else(|| AuthError::Validation("token ttl out of range".into()))?;

        let claims = TokenClaims {
            sub: user.id.to_string(),
            username: user.username.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
            jti: Uuid::now_v7().to_string(),
            fpr: fingerprint(user, self.policy),
        };
        let token = encode_claims(&claims, &self.signing_key)?;

        debug!(user_id = %user.id, jti = %claims.jti, exp = claims.exp, "issued token");
        Ok(IssuedToken {
            token,
            expires_at,
            expires_in: ttl.num_seconds(),
        })
    }
}
