//! Member password hashes
//!
//! Passwords are stored as Argon2id PHC strings in `members.password_hash`.
//! The service-wide pepper is appended (base64) before hashing, so a leaked
//! database alone is not enough to mount an offline guess.

use crate::error::{AppError, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use base64::Engine;

/// Pepper length generated on first run
pub const PEPPER_LEN: usize = 32;

// 19 MiB, 2 passes, 1 lane
const MEMORY_KIB: u32 = 19 * 1024;
const PASSES: u32 = 2;
const LANES: u32 = 1;

/// Hashes and checks member passwords
pub struct CredentialHasher {
    params: Params,
    /// Base64 pepper suffix, empty when peppering is off
    pepper_suffix: String,
}

impl CredentialHasher {
    /// An empty pepper disables peppering
    pub fn new(pepper: &[u8]) -> Result<Self> {
        let params = Params::new(MEMORY_KIB, PASSES, LANES, None)
            .map_err(|e| AppError::Internal(format!("Invalid Argon2 params: {}", e)))?;

        let pepper_suffix = if pepper.is_empty() {
            String::new()
        } else {
            base64::engine::general_purpose::STANDARD.encode(pepper)
        };

        Ok(Self {
            params,
            pepper_suffix,
        })
    }

    /// Fresh random pepper for a new installation
    pub fn generate_pepper() -> Vec<u8> {
        use rand::RngCore;
        let mut pepper = vec![0u8; PEPPER_LEN];
        OsRng.fill_bytes(&mut pepper);
        pepper
    }

    /// PHC string for a new or changed member password
    pub fn hash(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2()
            .hash_password(self.peppered(password).as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
    }

    /// Check a login attempt against a stored PHC string
    pub fn verify(&self, password: &str, stored: &str) -> Result<bool> {
        let parsed = PasswordHash::new(stored)
            .map_err(|e| AppError::Internal(format!("Stored password hash is malformed: {}", e)))?;

        // Cost parameters come from the PHC string, not from self.params
        match self
            .argon2()
            .verify_password(self.peppered(password).as_bytes(), &parsed)
        {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AppError::Internal(format!(
                "Password verification failed: {}",
                e
            ))),
        }
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    fn peppered(&self, password: &str) -> String {
        format!("{}{}", password, self.pepper_suffix)
    }
}
