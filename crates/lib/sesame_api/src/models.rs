//! Request and response bodies.

use serde::{Deserialize, Serialize};
use sesame_core::models::auth::{Role, UserHandle};

/// `POST /login` body. The identifier is accepted as `email` or `username`.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    #[serde(alias = "username")]
    pub email: String,
    pub password: String,
}

/// `POST /login` response: `{"response": {"user": {...}}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub response: LoginResponseBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponseBody {
    pub user: LoginUser,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginUser {
    pub id: String,
    pub username: String,
    pub role: Role,
    pub authentication_token: String,
}

/// `GET /session` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResponse {
    pub id: String,
    pub username: String,
    pub role: Role,
}

impl From<&UserHandle> for SessionResponse {
    fn from(handle: &UserHandle) -> Self {
        Self {
            id: handle.id.to_string(),
            username: handle.username.clone(),
            role: handle.role,
        }
    }
}

/// `POST /change_password` body.
#[derive(Debug, Clone, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// `POST /change_password` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub authentication_token: String,
    pub expires_in: i64,
}

/// `POST /logout` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogoutResponse {
    pub success: bool,
}

/// Error body returned for every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
