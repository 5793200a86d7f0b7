//! Credential fingerprints.
//!
//! A fingerprint is derived from the stored password hash on every call and
//! embedded in each token. A password change produces a new bcrypt hash (new
//! salt), so every token minted before the change stops matching.

use std::fmt;
use std::str::FromStr;

use sha2::{Digest, Sha256};

use crate::models::auth::UserRecord;

const DOMAIN: &[u8] = b"sesame/fingerprint/v1";

/// Hex characters kept from the digest.
const FINGERPRINT_LEN: usize = 32;

/// Which parts of the user record feed the fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FingerprintPolicy {
    /// Only the password hash. Deactivating a user leaves live tokens valid.
    #[default]
    CredentialOnly,
    /// Password hash and the active flag. Deactivating a user invalidates
    /// every live token.
    CredentialAndStatus,
}

impl fmt::Display for FingerprintPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FingerprintPolicy::CredentialOnly => f.write_str("credential"),
            FingerprintPolicy::CredentialAndStatus => f.write_str("credential_and_status"),
        }
    }
}

impl FromStr for FingerprintPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "credential" | "credential_only" => Ok(FingerprintPolicy::CredentialOnly),
            "credential_and_status" | "status" => Ok(FingerprintPolicy::CredentialAndStatus),
            other => Err(format!("unknown fingerprint policy '{other}'")),
        }
    }
}

/// Compute the live fingerprint of a user under the given policy.
pub fn fingerprint(user: &UserRecord, policy: FingerprintPolicy) -> String {
    let mut hasher = Sha256::new();
    hasher.update(DOMAIN);
    hasher.update([0u8]);
    hasher.update(user.password_hash.as_bytes());
    if policy == FingerprintPolicy::CredentialAndStatus {
        hasher.update([0u8]);
        hasher.update(if user.active { b"active".as_slice() } else { b"inactive".as_slice() });
    }
    let mut hex = format!("{:x}", hasher.finalize());
    hex.truncate(FINGERPRINT_LEN);
    hex
}
