//! services/app/src/adapters/credentials.rs
//!
//! Argon2 password hashing behind the `CredentialVerifier` port.

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use rand_core::OsRng;
use rttc_core::ports::{CredentialVerifier, PortError, PortResult};

#[derive(Clone, Default)]
pub struct Argon2Verifier {
    argon2: Argon2<'static>,
}

impl Argon2Verifier {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialVerifier for Argon2Verifier {
    fn hash(&self, password: &str) -> PortResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PortError::Unexpected(format!("Failed to hash password: {}", e)))
    }

    fn verify(&self, password: &str, password_hash: &str) -> bool {
        // Unparseable hashes never match.
        match PasswordHash::new(password_hash) {
            Ok(parsed) => self
                .argon2
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }
}
