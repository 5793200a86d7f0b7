//! Password hashing via bcrypt.
//!
//! Passwords are handed to bcrypt as raw UTF-8 bytes: embedded NUL
//! characters are part of the secret, not terminators.

use super::AuthError;

/// Default bcrypt cost factor.
pub const DEFAULT_BCRYPT_COST: u32 = 10;

/// Minimum length accepted for a new password.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Hash a password with bcrypt at the given cost.
pub fn hash_password(password: &str, cost: u32) -> Result<String, AuthError> {
    bcrypt::hash(password, cost).map_err(|e| AuthError::Internal(format!("bcrypt hash: {e}")))
}

/// Verify a password against a bcrypt hash. The digest comparison is
/// constant-time.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AuthError> {
    bcrypt::verify(password, hash).map_err(|e| AuthError::Internal(format!("bcrypt verify: {e}")))
}

/// Check a new password against the length policy.
pub fn validate_new_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_COST: u32 = 4;

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("pepito", TEST_COST).unwrap();
        assert!(hash.starts_with("$2"));
        assert!(verify_password("pepito", &hash).unwrap());
        assert!(!verify_password("Pepito", &hash).unwrap());
    }

    #[test]
    fn same_password_gets_fresh_salt() {
        let a = hash_password("pepito", TEST_COST).unwrap();
        let b = hash_password("pepito", TEST_COST).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn nul_bytes_are_part_of_the_secret() {
        let hash = hash_password("\0asd\0asd\0", TEST_COST).unwrap();
        assert!(verify_password("\0asd\0asd\0", &hash).unwrap());
        assert!(!verify_password("asdasd", &hash).unwrap());
        assert!(!verify_password("", &hash).unwrap());
        assert!(!verify_password("\0asd", &hash).unwrap());
    }

    #[test]
    fn garbage_hash_is_an_error() {
        assert!(verify_password("pepito", "not-a-bcrypt-hash").is_err());
    }

    #[test]
    fn short_password_rejected() {
        assert!(validate_new_password("short").is_err());
        assert!(validate_new_password("long enough").is_ok());
    }
}
