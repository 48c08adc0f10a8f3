//! Password hashing and verification.

use argon2::{
    Argon2,
    password_hash::{
        PasswordHash, PasswordHasher, PasswordVerifier as _, SaltString, rand_core::OsRng,
    },
};

use super::errors::{AuthError, AuthResult};

/// Capability contract for salted one-way password hashing.
///
/// Any implementation satisfying this trait is substitutable; the default is
/// [`Argon2Verifier`]. The adapter takes no external configuration.
pub trait PasswordVerifier: Send + Sync {
    /// Hash a plaintext password. Every call salts freshly, so repeated
    /// calls with the same input yield different encoded hashes, all of
    /// which verify against the original plaintext.
    fn hash(&self, plain: &str) -> AuthResult<String>;

    /// Verify a plaintext password against a stored hash. Malformed hashes
    /// verify as false rather than erroring.
    fn verify(&self, plain: &str, hash: &str) -> bool;
}

/// Argon2id implementation of [`PasswordVerifier`].
///
/// Hash comparison is constant-time via the `argon2` crate.
#[derive(Debug, Clone, Default)]
pub struct Argon2Verifier;

impl PasswordVerifier for Argon2Verifier {
    fn hash(&self, plain: &str) -> AuthResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        Ok(Argon2::default()
            .hash_password(plain.as_bytes(), &salt)
            .map_err(|_| AuthError::HashingFailed)?
            .to_string())
    }

    fn verify(&self, plain: &str, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(h) => h,
            Err(_) => return false,
        };
        Argon2::default()
            .verify_password(plain.as_bytes(), &parsed_hash)
            .is_ok()
    }
}
