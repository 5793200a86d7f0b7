//! Credential storage.
//!
//! [`CredentialStore`] is the read side the authentication core depends on.
//! [`AccountStore`] adds the provisioning writes used by the CLI, the
//! change-password flow, and tests.
//!
//! Identifiers are normalized with [`normalize_identifier`] before they reach
//! a store, and stores index by that normalized form.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::auth::AuthError;
use crate::models::auth::{NewUser, UserRecord};

pub use memory::MemoryCredentialStore;
pub use postgres::PgCredentialStore;

/// Canonical lookup form of a user identifier: the Unicode default case
/// fold. Every casing variant of a name folds to the same key, including
/// final sigma and `ß`/`SS`.
pub fn normalize_identifier(identifier: &str) -> String {
    caseless::default_case_fold_str(identifier)
}

/// Read access to user credentials.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Exact match on an already-normalized identifier. Returns inactive
    /// users too.
    async fn find_user_by_identifier(
        &self,
        normalized_id: &str,
    ) -> Result<Option<UserRecord>, AuthError>;

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, AuthError>;

    /// Like [`find_user_by_identifier`](Self::find_user_by_identifier),
    /// restricted to active users.
    async fn find_active_user_by_identifier(
        &self,
        normalized_id: &str,
    ) -> Result<Option<UserRecord>, AuthError> {
        Ok(self
            .find_user_by_identifier(normalized_id)
            .await?
            .filter(|u| u.active))
    }
}

/// Account provisioning on top of [`CredentialStore`].
#[async_trait]
pub trait AccountStore: CredentialStore {
    /// Insert a user. Fails with `Validation` if the normalized username is
    /// taken.
    async fn create_user(&self, user: NewUser) -> Result<UserRecord, AuthError>;

    async fn set_password_hash(&self, id: Uuid, password_hash: &str) -> Result<(), AuthError>;

    async fn set_active(&self, id: Uuid, active: bool) -> Result<(), AuthError>;
}
