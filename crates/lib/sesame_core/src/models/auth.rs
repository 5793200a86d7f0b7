//! Authentication domain models.
//!
//! These are internal domain models, distinct from the HTTP request/response
//! shapes in `sesame_api::models`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Capability tag attached to every user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Pentester,
    Client,
    AssetOwner,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Pentester => "pentester",
            Role::Client => "client",
            Role::AssetOwner => "asset_owner",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "pentester" => Ok(Role::Pentester),
            "client" => Ok(Role::Client),
            "asset_owner" => Ok(Role::AssetOwner),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

/// Stored user record, including the password hash.
///
/// Never serialized: the hash must not leave the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub id: Uuid,
    /// Username as provisioned (original casing preserved).
    pub username: String,
    /// bcrypt hash of the password.
    pub password_hash: String,
    pub active: bool,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    /// Identity view of this record.
    pub fn handle(&self) -> UserHandle {
        UserHandle {
            id: self.id,
            username: self.username.clone(),
            role: self.role,
        }
    }
}

/// Input for account provisioning. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub active: bool,
    pub role: Role,
}

/// Resolved identity returned by a successful login or token verification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserHandle {
    pub id: Uuid,
    pub username: String,
    pub role: Role,
}

/// JWT claims embedded in bearer tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject: user ID (standard JWT `sub` claim).
    pub sub: String,
    /// Username at issue time.
    pub username: String,
    pub role: Role,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiry (unix timestamp).
    pub exp: i64,
    /// Unique token ID (UUIDv7).
    pub jti: String,
    /// Credential fingerprint at issue time.
    pub fpr: String,
}

/// A freshly minted bearer token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    /// Seconds until expiry, from the issue instant.
    pub expires_in: i64,
}
