//! Authentication middleware: token extraction and verification.

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use sesame_core::models::auth::UserHandle;
use tracing::debug;

use crate::AppState;
use crate::error::AppError;
use crate::services::cookies::SESSION_COOKIE;

/// Header carrying a bare token, as an alternative to `Authorization`.
pub const AUTHENTICATION_TOKEN_HEADER: &str = "authentication-token";

/// Identity of the caller, stored in request extensions.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub UserHandle);

/// Schemes accepted in `Authorization`, compared case-insensitively.
const AUTH_SCHEMES: [&str; 2] = ["token", "bearer"];

/// Find the presented token, in order: `Authorization: Token <v>` (or
/// `Bearer <v>`), `Authentication-Token: <v>`, then the session cookie.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    let from_authorization = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim_start().split_once(' '))
        .filter(|(scheme, _)| AUTH_SCHEMES.iter().any(|s| scheme.eq_ignore_ascii_case(s)))
        .map(|(_, credentials)| credentials.trim());
    if let Some(token) = from_authorization
        && !token.is_empty()
    {
        return Some(token.to_string());
    }

    let from_header = headers
        .get(AUTHENTICATION_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim);
    if let Some(token) = from_header
        && !token.is_empty()
    {
        return Some(token.to_string());
    }

    CookieJar::from_headers(headers)
        .get(SESSION_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|v| !v.is_empty())
}

/// Axum middleware: verifies the presented token and injects
/// `AuthenticatedUser` into request extensions. Any failure is a 401.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(token) = extract_token(request.headers()) else {
        debug!(path = %request.uri().path(), "no token presented");
        return Err(AppError::unauthorized());
    };

    let handle = state.auth.verify(&token).await?;
    request.extensions_mut().insert(AuthenticatedUser(handle));

    Ok(next.run(request).await)
}
