//! Password schemes.
//!
//! Stored passwords go through a [`PasswordScheme`]. The default
//! [`PlaintextScheme`] keeps them as given; [`Argon2Scheme`] stores Argon2id
//! PHC strings instead and is selected with `auth.password_scheme = "argon2"`.

use std::sync::Arc;

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, Params,
};
use rand_core::OsRng;
use thiserror::Error;

use crate::FilehubError;

/// Password-related errors.
#[derive(Error, Debug)]
pub enum PasswordError {
    /// Hasher parameters were rejected.
    #[error("invalid hasher parameters: {0}")]
    Params(String),

    /// Password hashing failed.
    #[error("password hashing failed: {0}")]
    HashError(String),
}

impl From<PasswordError> for FilehubError {
    fn from(e: PasswordError) -> Self {
        FilehubError::Validation(e.to_string())
    }
}

/// Turns passwords into their stored form and checks them at login.
pub trait PasswordScheme: Send + Sync + std::fmt::Debug {
    /// Name used in configuration.
    fn name(&self) -> &'static str;

    /// Produce the stored form of `password`.
    fn hash(&self, password: &str) -> Result<String, PasswordError>;

    /// Check `password` against a stored value.
    fn verify(&self, password: &str, stored: &str) -> bool;
}

/// Stores passwords unchanged and compares them for equality.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaintextScheme;

impl PasswordScheme for PlaintextScheme {
    fn name(&self) -> &'static str {
        "plaintext"
    }

    fn hash(&self, password: &str) -> Result<String, PasswordError> {
        Ok(password.to_string())
    }

    fn verify(&self, password: &str, stored: &str) -> bool {
        password == stored
    }
}

/// Argon2id hashing with a random salt per password.
#[derive(Debug, Clone, Copy)]
pub struct Argon2Scheme {
    /// Memory cost in KiB.
    m_cost: u32,
    /// Time cost (iterations).
    t_cost: u32,
    /// Parallelism (lanes).
    p_cost: u32,
}

impl Default for Argon2Scheme {
    /// 64 MB memory, 3 iterations, 4 lanes.
    fn default() -> Self {
        Self {
            m_cost: 65536,
            t_cost: 3,
            p_cost: 4,
        }
    }
}

impl Argon2Scheme {
    /// Create a scheme with custom cost parameters.
    pub fn with_params(m_cost: u32, t_cost: u32, p_cost: u32) -> Self {
        Self {
            m_cost,
            t_cost,
            p_cost,
        }
    }

    fn hasher(&self) -> Result<Argon2<'static>, PasswordError> {
        let params = Params::new(self.m_cost, self.t_cost, self.p_cost, None)
            .map_err(|e| PasswordError::Params(e.to_string()))?;
        Ok(Argon2::new(
            argon2::Algorithm::Argon2id,
            argon2::Version::V0x13,
            params,
        ))
    }
}

impl PasswordScheme for Argon2Scheme {
    fn name(&self) -> &'static str {
        "argon2"
    }

    fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .hasher()?
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| PasswordError::HashError(e.to_string()))?;
        Ok(hash.to_string())
    }

    fn verify(&self, password: &str, stored: &str) -> bool {
        // Parameters come from the parsed hash.
        match PasswordHash::new(stored) {
            Ok(parsed) => Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }
}

/// Look up a scheme by its configuration name (case-insensitive).
pub fn scheme_from_name(name: &str) -> Option<Arc<dyn PasswordScheme>> {
    match name.trim().to_ascii_lowercase().as_str() {
        "plaintext" => Some(Arc::new(PlaintextScheme)),
        "argon2" | "argon2id" => Some(Arc::new(Argon2Scheme::default())),
        _ => None,
    }
}
