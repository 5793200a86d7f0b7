//! # sesame_api
//!
//! HTTP API library for Sesame: login, token retrieval, and the middleware
//! that guards every protected route.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::{get, post};
use sesame_core::auth::{AuthError, AuthService};
use sesame_core::store::{AccountStore, MemoryCredentialStore, PgCredentialStore};
use sqlx::postgres::PgPoolOptions;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::config::ApiConfig;
use crate::handlers::{auth, session};

/// Route paths.
pub mod routes {
    pub const POST_LOGIN: &str = "/login";
    pub const POST_LOGOUT: &str = "/logout";
    pub const GET_TOKEN: &str = "/v2/token/";
    pub const GET_SESSION: &str = "/session";
    pub const POST_CHANGE_PASSWORD: &str = "/change_password";
}

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    /// API configuration.
    pub config: ApiConfig,
}

impl AppState {
    pub fn new(store: Arc<dyn AccountStore>, config: ApiConfig) -> Result<Self, AuthError> {
        let auth = AuthService::new(store, config.auth.clone())?;
        Ok(Self { auth, config })
    }
}

/// Open the credential store named by the config: PostgreSQL when a
/// database URL is set (migrations are run), otherwise in memory.
pub async fn open_store(
    config: &ApiConfig,
    max_connections: u32,
) -> Result<Arc<dyn AccountStore>, Box<dyn std::error::Error + Send + Sync>> {
    let Some(url) = config.database_url.as_deref() else {
        warn!("no DATABASE_URL; users are kept in memory and lost on exit");
        return Ok(Arc::new(MemoryCredentialStore::new()));
    };

    info!(max_connections, "connecting to PostgreSQL");
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(30))
        .connect(url)
        .await?;

    info!("running database migrations");
    sesame_core::migrate::migrate(&pool).await?;

    Ok(Arc::new(PgCredentialStore::new(pool)))
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Public routes (no auth required)
    let public = Router::new()
        .route(routes::POST_LOGIN, post(auth::login_handler))
        .route(routes::POST_LOGOUT, post(auth::logout_handler));

    // Protected routes (require auth)
    let protected = Router::new()
        .route(routes::GET_TOKEN, get(auth::token_handler))
        .route(routes::GET_SESSION, get(session::session_handler))
        .route(
            routes::POST_CHANGE_PASSWORD,
            post(auth::change_password_handler),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(cors)
        .with_state(state)
}
