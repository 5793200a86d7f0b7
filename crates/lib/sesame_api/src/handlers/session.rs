//! Session introspection.

use axum::{Extension, Json};

use crate::middleware::auth::AuthenticatedUser;
use crate::models::SessionResponse;

/// `GET /session`: identity of the authenticated caller.
pub async fn session_handler(
    Extension(user): Extension<AuthenticatedUser>,
) -> Json<SessionResponse> {
    Json(SessionResponse::from(&user.0))
}
