//! Authentication request handlers.

use axum::extract::{FromRequest, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Form, Json};
use axum_extra::extract::cookie::CookieJar;

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{
    ChangePasswordRequest, LoginRequest, LoginResponse, LogoutResponse, TokenResponse,
};
use crate::services::auth;
use crate::services::cookies::{clear_session_cookie, session_cookie};

/// Login body, read as a urlencoded form when the request says so and as
/// JSON otherwise.
pub struct LoginBody(pub LoginRequest);

impl<S> FromRequest<S> for LoginBody
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_form = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .is_some_and(|mime| {
                mime.trim()
                    .eq_ignore_ascii_case("application/x-www-form-urlencoded")
            });

        if is_form {
            let Form(body) = Form::<LoginRequest>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            Ok(Self(body))
        } else {
            let Json(body) = Json::<LoginRequest>::from_request(req, state)
                .await
                .map_err(IntoResponse::into_response)?;
            Ok(Self(body))
        }
    }
}

/// `POST /login`: authenticate with identifier + password. Also starts a
/// cookie session.
pub async fn login_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    LoginBody(body): LoginBody,
) -> AppResult<(CookieJar, Json<LoginResponse>)> {
    let (resp, token) = auth::login(&state.auth, &body.email, &body.password).await?;
    let jar = jar.add(session_cookie(
        &token.token,
        token.expires_in,
        state.config.secure_cookies,
    ));
    Ok((jar, Json(resp)))
}

/// `POST /logout`: end the cookie session. Tokens already handed out stay
/// valid until they expire.
pub async fn logout_handler(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<LogoutResponse>) {
    (
        jar.add(clear_session_cookie(state.config.secure_cookies)),
        Json(LogoutResponse { success: true }),
    )
}

/// `GET /v2/token/`: mint a fresh bearer token for the caller.
pub async fn token_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> AppResult<Json<String>> {
    let token = auth::token_for(&state.auth, &user.0).await?;
    Ok(Json(token.token))
}

/// `POST /change_password`: replace the caller's password. Returns a new
/// token and refreshes the session cookie; every older token is invalidated.
pub async fn change_password_handler(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    jar: CookieJar,
    Json(body): Json<ChangePasswordRequest>,
) -> AppResult<(CookieJar, Json<TokenResponse>)> {
    let (resp, token) = auth::change_password(
        &state.auth,
        &user.0,
        &body.current_password,
        &body.new_password,
    )
    .await?;
    let jar = jar.add(session_cookie(
        &token.token,
        token.expires_in,
        state.config.secure_cookies,
    ));
    Ok((jar, Json(resp)))
}
