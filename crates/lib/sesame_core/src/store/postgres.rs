//! PostgreSQL credential store.
//!
//! Lookups go through the unique `username_normalized` index created by the
//! embedded migrations. That column is filled with [`normalize_identifier`]
//! on insert, never by SQL `lower()`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use super::{AccountStore, CredentialStore, normalize_identifier};
use crate::auth::AuthError;
use crate::models::auth::{NewUser, Role, UserRecord};

type UserRow = (Uuid, String, String, bool, String, DateTime<Utc>);

const SELECT_USER: &str =
    "SELECT id, username, password_hash, active, role, created_at FROM users";

/// Credential store over a PostgreSQL pool.
#[derive(Debug, Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn into_record(row: UserRow) -> Result<UserRecord, AuthError> {
    let (id, username, password_hash, active, role, created_at) = row;
    let role = role
        .parse::<Role>()
        .map_err(|e| AuthError::Internal(format!("user {id}: {e}")))?;
    Ok(UserRecord {
        id,
        username,
        password_hash,
        active,
        role,
        created_at,
    })
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find_user_by_identifier(
        &self,
        normalized_id: &str,
    ) -> Result<Option<UserRecord>, AuthError> {
        // Postgres text cannot hold NUL, so no stored username can match.
        if normalized_id.contains('\0') {
            return Ok(None);
        }
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "{SELECT_USER} WHERE username_normalized = $1"
        ))
        .bind(normalized_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(into_record).transpose()
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, AuthError> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{SELECT_USER} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(into_record).transpose()
    }
}

#[async_trait]
impl AccountStore for PgCredentialStore {
    async fn create_user(&self, user: NewUser) -> Result<UserRecord, AuthError> {
        if user.username.contains('\0') {
            return Err(AuthError::Validation(
                "Username must not contain NUL characters".into(),
            ));
        }
        let row = sqlx::query_as::<_, UserRow>(
            "INSERT INTO users (id, username, username_normalized, password_hash, active, role) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id, username, password_hash, active, role, created_at",
        )
        .bind(Uuid::now_v7())
        .bind(&user.username)
        .bind(normalize_identifier(&user.username))
        .bind(&user.password_hash)
        .bind(user.active)
        .bind(user.role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => AuthError::Validation(
                format!("Username '{}' already exists", user.username),
            ),
            other => AuthError::DbError(other),
        })?;
        let record = into_record(row)?;
        info!(
            user_id = %record.id,
            username = %record.username,
            role = %record.role,
            "created user"
        );
        Ok(record)
    }

    async fn set_password_hash(&self, id: Uuid, password_hash: &str) -> Result<(), AuthError> {
        let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AuthError::Validation("user not found".into()));
        }
        Ok(())
    }

    async fn set_active(&self, id: Uuid, active: bool) -> Result<(), AuthError> {
        let result = sqlx::query("UPDATE users SET active = $2 WHERE id = $1")
            .bind(id)
            .bind(active)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AuthError::Validation("user not found".into()));
        }
        Ok(())
    }
}
