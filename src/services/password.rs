use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString},
};
use password_hash::{PasswordHash, PasswordVerifier};
use rand::thread_rng;
use std::sync::OnceLock;

use crate::domain::user::Password;
use crate::error::{HbnbError, Result};

/// Hash a password into an argon2 PHC string.
pub fn hash_password(password: &Password) -> Result<String> {
    let salt = SaltString::generate(thread_rng());
    let hash = Argon2::default()
        .hash_password(password.expose().as_bytes(), &salt)
        .map_err(|e| HbnbError::Hashing(e.to_string()))?;
    Ok(hash.to_string())
}

/// `false` for a wrong password and for a stored hash that does not parse.
pub fn verify_password(candidate: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        tracing::warn!("Stored password hash is not a valid PHC string");
        return false;
    };
    Argon2::default()
        .verify_password(candidate.as_bytes(), &parsed)
        .is_ok()
}

static DUMMY_HASH: OnceLock<String> = OnceLock::new();

/// Hash of a throwaway password, verified against when a login names no
/// account so both failure paths pay for one argon2 verification.
pub fn dummy_hash() -> &'static str {
    DUMMY_HASH.get_or_init(|| {
        Password::try_from("hbnb-no-such-account")
            .ok()
            .and_then(|p| hash_password(&p).ok())
            .unwrap_or_default()
    })
}
