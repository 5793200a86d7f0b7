//! In-memory credential store.
//!
//! Used when no database is configured, and by tests.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use super::{AccountStore, CredentialStore, normalize_identifier};
use crate::auth::AuthError;
use crate::models::auth::{NewUser, UserRecord};

#[derive(Debug, Default)]
struct Inner {
    users: HashMap<Uuid, UserRecord>,
    /// normalized username → user id
    by_identifier: HashMap<String, Uuid>,
}

/// Credential store backed by two hash maps behind a `RwLock`.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    inner: RwLock<Inner>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users.
    pub async fn len(&self) -> usize {
        self.inner.read().await.users.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_user_by_identifier(
        &self,
        normalized_id: &str,
    ) -> Result<Option<UserRecord>, AuthError> {
        let inner = self.inner.read().await;
        Ok(inner
            .by_identifier
            .get(normalized_id)
            .and_then(|id| inner.users.get(id))
            .cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, AuthError> {
        Ok(self.inner.read().await.users.get(&id).cloned())
    }
}

#[async_trait]
impl AccountStore for MemoryCredentialStore {
    async fn create_user(&self, user: NewUser) -> Result<UserRecord, AuthError> {
        let key = normalize_identifier(&user.username);
        let mut inner = self.inner.write().await;
        if inner.by_identifier.contains_key(&key) {
            return Err(AuthError::Validation(format!(
                "Username '{}' already exists",
                user.username
            )));
        }
        let record = UserRecord {
            id: Uuid::now_v7(),
            username: user.username,
            password_hash: user.password_hash,
            active: user.active,
            role: user.role,
            created_at: Utc::now(),
        };
        inner.by_identifier.insert(key, record.id);
        inner.users.insert(record.id, record.clone());
        info!(
            user_id = %record.id,
            username = %record.username,
            role = %record.role,
            "created user"
        );
        Ok(record)
    }

    async fn set_password_hash(&self, id: Uuid, password_hash: &str) -> Result<(), AuthError> {
        let mut inner = self.inner.write().await;
        let user = inner
            .users
            .get_mut(&id)
            .ok_or_else(|| AuthError::Validation("user not found".into()))?;
        user.password_hash = password_hash.to_string();
        Ok(())
    }

    async fn set_active(&self, id: Uuid, active: bool) -> Result<(), AuthError> {
        let mut inner = self.inner.write().await;
        let user = inner
            .users
            .get_mut(&id)
            .ok_or_else(|| AuthError::Validation("user not found".into()))?;
        user.active = active;
        Ok(())
    }
}
