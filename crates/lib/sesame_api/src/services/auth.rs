//! Authentication service: login and token flows delegating to
//! `sesame_core::auth::AuthService`, shaped into API responses.

use sesame_core::auth::AuthService;
use sesame_core::models::auth::{IssuedToken, UserHandle};

use crate::error::AppResult;
use crate::models::{LoginResponse, LoginResponseBody, LoginUser, TokenResponse};

/// Build the login response body from an identity and its token.
fn build_login_response(handle: &UserHandle, token: &IssuedToken) -> LoginResponse {
    LoginResponse {
        response: LoginResponseBody {
            user: LoginUser {
                id: handle.id.to_string(),
                username: handle.username.clone(),
                role: handle.role,
                authentication_token: token.token.clone(),
            },
        },
    }
}

/// Authenticate with identifier + password.
pub async fn login(
    auth: &AuthService,
    identifier: &str,
    password: &str,
) -> AppResult<(LoginResponse, IssuedToken)> {
    let (handle, token) = auth.login(identifier, password).await?;
    Ok((build_login_response(&handle, &token), token))
}

/// Mint a fresh token for the authenticated caller.
pub async fn token_for(auth: &AuthService, handle: &UserHandle) -> AppResult<IssuedToken> {
    Ok(auth.issue_for(handle).await?)
}

/// Replace the caller's password; all earlier tokens stop validating.
pub async fn change_password(
    auth: &AuthService,
    handle: &UserHandle,
    current: &str,
    new: &str,
) -> AppResult<(TokenResponse, IssuedToken)> {
    let token = auth.change_password(handle, current, new).await?;
    Ok((
        TokenResponse {
            authentication_token: token.token.clone(),
            expires_in: token.expires_in,
        },
        token,
    ))
}
