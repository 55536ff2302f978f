//! Password hashing used when users are loaded or registered.
//!
//! The repository never sees plaintext passwords; ingestion and the service
//! layer hash them through a [`PasswordHasher`] before building a `User`.

use crate::error::ModelError;
use argon2::password_hash::{
    rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
};
use argon2::{Algorithm, Argon2, Params, Version};

/// One-way password hashing.
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, plaintext: &str) -> Result<String, ModelError>;

    /// Checks `plaintext` against a value produced by [`PasswordHasher::hash`].
    fn verify(&self, plaintext: &str, hashed: &str) -> bool;
}

/// Argon2id with a random salt per password, stored as a PHC string
/// (`$argon2id$v=19$m=...,t=...,p=...$<salt>$<hash>`).
#[derive(Debug, Clone, Default)]
pub struct Argon2Hasher {
    params: Params,
}

impl Argon2Hasher {
    /// Default Argon2id cost parameters
    pub fn new() -> Self {
        Self::default()
    }

    /// Custom memory (KiB) and iteration cost, single lane.
    pub fn with_cost(memory_kib: u32, iterations: u32) -> Result<Self, ModelError> {
        let params = Params::new(memory_kib, iterations, 1, None)
            .map_err(|e| ModelError::PasswordHash(e.to_string()))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, plaintext: &str) -> Result<String, ModelError> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2()
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| ModelError::PasswordHash(e.to_string()))
    }

    fn verify(&self, plaintext: &str, hashed: &str) -> bool {
        // Cost parameters are read back from the PHC string itself
        match PasswordHash::new(hashed) {
            Ok(parsed) => self
                .argon2()
                .verify_password(plaintext.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }
}
