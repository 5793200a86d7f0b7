//! Authentication service: login, token and password flows over one store.

use std::sync::Arc;

use tracing::info;

use super::password::{hash_password, validate_new_password, verify_password};
use super::{AuthError, Authenticator, TokenIssuer, TokenVerifier};
use crate::config::AuthConfig;
use crate::models::auth::{IssuedToken, NewUser, Role, UserHandle, UserRecord};
use crate::store::AccountStore;

/// Composes the authenticator, issuer and verifier around one store.
///
/// Cheap to clone; share one instance across request handlers.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn AccountStore>,
    authenticator: Authenticator,
    issuer: TokenIssuer,
    verifier: TokenVerifier,
    config: Arc<AuthConfig>,
}

impl AuthService {
    pub fn new(store: Arc<dyn AccountStore>, config: AuthConfig) -> Result<Self, AuthError> {
        let key = config.signing_key.as_bytes();
        let authenticator = Authenticator::new(store.clone(), config.bcrypt_cost)?;
        let issuer = TokenIssuer::new(key, config.fingerprint_policy);
        let verifier = TokenVerifier::new(store.clone(), key, config.fingerprint_policy);
        Ok(Self {
            store,
            authenticator,
            issuer,
            verifier,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn AccountStore> {
        &self.store
    }

    /// Authenticate and issue a token with the configured TTL.
    pub async fn login(
        &self,
        identifier: &str,
        secret: &str,
    ) -> Result<(UserHandle, IssuedToken), AuthError> {
        let handle = self.authenticator.authenticate(identifier, secret).await?;
        let token = self.issue_for(&handle).await?;
        Ok((handle, token))
    }

    /// Issue a fresh token for an already-authenticated identity.
    ///
    /// Re-reads the record so the token carries the current fingerprint.
    pub async fn issue_for(&self, handle: &UserHandle) -> Result<IssuedToken, AuthError> {
        let user = self.live_record(handle).await?;
        self.issuer.issue(&user, self.config.token_ttl)
    }

    pub async fn verify(&self, token: &str) -> Result<UserHandle, AuthError> {
        self.verifier.verify(token).await
    }

    /// Replace the caller's password and return a fresh token. Every token
    /// issued before the change becomes stale.
    pub async fn change_password(
        &self,
        handle: &UserHandle,
        current: &str,
        new: &str,
    ) -> Result<IssuedToken, AuthError> {
        let user = self.live_record(handle).await?;
        if !verify_password(current, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials);
        }
        validate_new_password(new)?;

        let hash = hash_password(new, self.config.bcrypt_cost)?;
        self.store.set_password_hash(user.id, &hash).await?;
        info!(user_id = %user.id, "password changed; earlier tokens invalidated");

        let updated = self.live_record(handle).await?;
        self.issuer.issue(&updated, self.config.token_ttl)
    }

    /// Create an account with a plaintext password.
    pub async fn provision_user(
        &self,
        username: &str,
        password: &str,
        role: Role,
        active: bool,
    ) -> Result<UserRecord, AuthError> {
        if username.trim().is_empty() {
            return Err(AuthError::Validation("Username must not be empty".into()));
        }
        let password_hash = hash_password(password, self.config.bcrypt_cost)?;
        self.store
            .create_user(NewUser {
                username: username.to_string(),
                password_hash,
                active,
                role,
            })
            .await
    }

    async fn live_record(&self, handle: &UserHandle) -> Result<UserRecord, AuthError> {
        self.store
            .find_user_by_id(handle.id)
            .await?
            .ok_or(AuthError::StaleToken)
    }
}
