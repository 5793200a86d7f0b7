//! # sesame_core
//!
//! Core authentication logic for Sesame: credential storage, password
//! verification, and stateless bearer tokens that stop validating when the
//! user's password changes.

pub mod auth;
pub mod config;
pub mod migrate;
pub mod models;
pub mod store;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_not_empty() {
        assert!(!version().is_empty());
    }
}
