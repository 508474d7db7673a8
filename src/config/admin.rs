//! Admin credential configuration loaded from environment variables.
//!
//! The back-office is protected by a single shared password. It is configured either as
//! an argon2 PHC hash in `ADMIN_PASSWORD_HASH` (preferred) or as a plaintext
//! `ADMIN_PASSWORD`, which is hashed once at startup and never kept around.

use crate::errors::{Error, Result};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use std::fmt;

/// Hashed admin password.
#[derive(Clone)]
pub struct AdminCredential {
    hash: String,
}

impl fmt::Debug for AdminCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminCredential")
            .field("hash", &"<redacted>")
            .finish()
    }
}

impl AdminCredential {
    /// Reads the credential from `ADMIN_PASSWORD_HASH` or `ADMIN_PASSWORD`.
    ///
    /// # Errors
    /// Returns a configuration error when neither variable is set, or when the
    /// configured hash is not a valid PHC string.
    pub fn from_env() -> Result<Self> {
        if let Ok(hash) = std::env::var("ADMIN_PASSWORD_HASH") {
            return Self::from_hash(hash);
        }
        if let Ok(password) = std::env::var("ADMIN_PASSWORD") {
            tracing::warn!("ADMIN_PASSWORD is set in plaintext; prefer ADMIN_PASSWORD_HASH");
            return Self::from_password(&password);
        }
        Err(Error::Config {
            message: "Set ADMIN_PASSWORD_HASH or ADMIN_PASSWORD to enable the admin panel"
                .to_string(),
        })
    }

    /// Hashes a plaintext password with a fresh salt.
    pub fn from_password(password: &str) -> Result<Self> {
        if password.is_empty() {
            return Err(Error::Config {
                message: "Admin password cannot be empty".to_string(),
            });
        }
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| Error::Config {
                message: format!("Failed to hash admin password: {e}"),
            })?
            .to_string();
        Ok(Self { hash })
    }

    /// Wraps an existing argon2 PHC hash after checking that it parses.
    pub fn from_hash(hash: impl Into<String>) -> Result<Self> {
        let hash = hash.into();
        PasswordHash::new(&hash).map_err(|e| Error::Config {
            message: format!("ADMIN_PASSWORD_HASH is not a valid password hash: {e}"),
        })?;
        Ok(Self { hash })
    }

    /// Checks a login attempt against the stored hash.
    #[must_use]
    pub fn verify(&self, password: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(&self.hash) else {
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}
