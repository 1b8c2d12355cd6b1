//! Argon2id password hashing and verification.

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

use super::Error;

/// Hash a plaintext password with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, Error> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|error| Error::internal(format!("failed to hash password: {error}")))
}

/// Verify a plaintext password against a stored PHC-format hash.
///
/// Returns `Ok(false)` on mismatch; an unparseable stored hash is an
/// internal error because only [`hash_password`] writes that column.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, Error> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|error| Error::internal(format!("stored password hash is invalid: {error}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn hash_then_verify_accepts_matching_password() {
        let hash = hash_password("hunter2").expect("hash");
        assert!(verify_password("hunter2", &hash).expect("verify"));
    }

    #[rstest]
    fn verify_rejects_wrong_password() {
        let hash = hash_password("hunter2").expect("hash");
        assert!(!verify_password("hunter3", &hash).expect("verify"));
    }

    #[rstest]
    fn verify_flags_garbage_hash_as_internal() {
        let err = verify_password("hunter2", "not-a-phc-hash").expect_err("garbage hash");
        assert_eq!(err.code(), crate::domain::ErrorCode::InternalError);
    }
}
