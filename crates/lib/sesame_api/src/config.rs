//! API server configuration.

use sesame_core::config::AuthConfig;

/// Default listen address.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5985";

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:5985").
    pub bind_addr: String,
    /// PostgreSQL connection URL. `None` keeps users in memory.
    pub database_url: Option<String>,
    /// Whether the session cookie is marked `Secure`.
    pub secure_cookies: bool,
    pub auth: AuthConfig,
}

impl ApiConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable         | Default                                  |
    /// |------------------|------------------------------------------|
    /// | `BIND_ADDR`      | `127.0.0.1:5985`                         |
    /// | `DATABASE_URL`   | unset (in-memory store)                  |
    /// | `SECURE_COOKIES` | `false`                                  |
    ///
    /// Auth settings come from [`AuthConfig::from_env`].
    pub fn from_env() -> Self {
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.into()),
            database_url: std::env::var("DATABASE_URL")
                .ok()
                .filter(|url| !url.is_empty()),
            secure_cookies: std::env::var("SECURE_COOKIES")
                .map(|v| matches!(v.as_str(), "1" | "true" | "TRUE" | "on" | "ON"))
                .unwrap_or(false),
            auth: AuthConfig::from_env(),
        }
    }
}
