//! HS256 JWT encoding/decoding and signing-key resolution.

use std::path::{Path, PathBuf};

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use tracing::{debug, info, warn};

use super::AuthError;
use crate::models::auth::TokenClaims;

/// Length of a generated signing key.
const GENERATED_KEY_LEN: usize = 64;

/// Sign claims with HS256.
pub fn encode_claims(claims: &TokenClaims, key: &[u8]) -> Result<String, AuthError> {
    encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(key),
    )
    .map_err(|e| AuthError::Internal(format!("jwt encode: {e}")))
}

/// Check the HS256 signature and decode the claims.
///
/// Expiry is not validated here; the verifier checks it against its own
/// clock with zero leeway.
pub fn decode_claims(token: &str, key: &[u8]) -> Result<TokenClaims, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp", "sub"]);
    decode::<TokenClaims>(token, &DecodingKey::from_secret(key), &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            debug!(error = %e, "jwt decode failed");
            AuthError::MalformedToken
        })
}

/// Resolve the signing key: env var `SESAME_SECRET_KEY` → `SECRET_KEY` →
/// persisted file.
pub fn resolve_signing_key() -> String {
    for var in ["SESAME_SECRET_KEY", "SECRET_KEY"] {
        if let Ok(secret) = std::env::var(var)
            && !secret.is_empty()
        {
            return secret;
        }
    }
    load_or_generate_key(&signing_key_path())
}

/// Read the key persisted at `path`, or generate and persist a new one.
pub fn load_or_generate_key(path: &Path) -> String {
    if let Ok(existing) = std::fs::read_to_string(path) {
        let trimmed = existing.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    let secret: String = rng()
        .sample_iter(&Alphanumeric)
        .take(GENERATED_KEY_LEN)
        .map(char::from)
        .collect();
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    if let Err(e) = std::fs::write(path, &secret) {
        warn!(path = %path.display(), error = %e, "could not persist signing key; tokens will not survive a restart");
    } else {
        info!(path = %path.display(), "generated new signing key");
    }
    secret
}

/// Path to the persisted signing key file.
fn signing_key_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("sesame")
        .join("secret-key")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::Role;

    fn claims() -> TokenClaims {
        TokenClaims {
            sub: "0190f5c2-0000-7000-8000-000000000000".into(),
            username: "alice".into(),
            role: Role::Pentester,
            iat: 1_700_000_000,
            exp: 1_700_000_500,
            jti: "j1".into(),
            fpr: "f1".into(),
        }
    }

    #[test]
    fn decode_ignores_expiry() {
        // exp is far in the past; the signature is still good.
        let token = encode_claims(&claims(), b"k1").unwrap();
        assert_eq!(decode_claims(&token, b"k1").unwrap(), claims());
    }

    #[test]
    fn wrong_key_is_malformed() {
        let token = encode_claims(&claims(), b"k1").unwrap();
        assert!(matches!(
            decode_claims(&token, b"k2"),
            Err(AuthError::MalformedToken)
        ));
    }

    #[test]
    fn garbage_is_malformed() {
        assert!(matches!(
            decode_claims("invalid.token.here", b"k1"),
            Err(AuthError::MalformedToken)
        ));
        assert!(matches!(decode_claims("", b"k1"), Err(AuthError::MalformedToken)));
    }

    #[test]
    fn generated_key_is_persisted_and_reused() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("secret-key");
        let first = load_or_generate_key(&path);
        assert_eq!(first.len(), GENERATED_KEY_LEN);
        assert_eq!(load_or_generate_key(&path), first);
    }
}
