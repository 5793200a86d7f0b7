//! Authentication configuration.

use chrono::Duration;
use tracing::warn;

use crate::auth::fingerprint::FingerprintPolicy;
use crate::auth::jwt::resolve_signing_key;
use crate::auth::password::DEFAULT_BCRYPT_COST;

/// Default token lifetime: 24 hours.
pub const DEFAULT_TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

/// Process-wide authentication settings, read-only after startup.
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// HS256 signing key.
    pub signing_key: String,
    /// Lifetime of issued tokens.
    pub token_ttl: Duration,
    pub fingerprint_policy: FingerprintPolicy,
    /// bcrypt cost for newly hashed passwords.
    pub bcrypt_cost: u32,
}

impl AuthConfig {
    /// Config with defaults and the given signing key.
    pub fn new(signing_key: impl Into<String>) -> Self {
        Self {
            signing_key: signing_key.into(),
            token_ttl: Duration::seconds(DEFAULT_TOKEN_TTL_SECS),
            fingerprint_policy: FingerprintPolicy::default(),
            bcrypt_cost: DEFAULT_BCRYPT_COST,
        }
    }

    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable                     | Default                          |
    /// |------------------------------|----------------------------------|
    /// | `SESAME_SECRET_KEY` / `SECRET_KEY` | generated & persisted to file |
    /// | `SESAME_TOKEN_TTL_SECS`      | `86400`                          |
    /// | `SESAME_FINGERPRINT_POLICY`  | `credential`                     |
    /// | `SESAME_BCRYPT_COST`         | `10`                             |
    pub fn from_env() -> Self {
        let mut config = Self::new(resolve_signing_key());
        if let Some(secs) = env_parse::<i64>("SESAME_TOKEN_TTL_SECS") {
            match ttl_from_secs(secs) {
                Some(ttl) => config.token_ttl = ttl,
                None => warn!(secs, "SESAME_TOKEN_TTL_SECS out of range; keeping default"),
            }
        }
        if let Some(policy) = env_parse::<FingerprintPolicy>("SESAME_FINGERPRINT_POLICY") {
            config.fingerprint_policy = policy;
        }
        if let Some(cost) = env_parse::<u32>("SESAME_BCRYPT_COST") {
            config.bcrypt_cost = cost;
        }
        config
    }
}

/// A positive TTL that `chrono` can represent, or `None`.
fn ttl_from_secs(secs: i64) -> Option<Duration> {
    if secs <= 0 {
        return None;
    }
    Duration::try_seconds(secs)
}

fn env_parse<T: std::str::FromStr>(var: &str) -> Option<T> {
    std::env::var(var).ok().and_then(|v| v.trim().parse().ok())
}
