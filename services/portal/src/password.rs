//! services/portal/src/password.rs
//!
//! One-way password hashing for patient credentials. Argon2id with a fresh
//! OS-random salt per call; the digest is an opaque PHC string.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use portal_core::ports::{PortError, PortResult};

/// Hashes a plaintext password. Two calls with the same plaintext produce
/// different digests (salted), but both verify.
pub fn hash_password(plain: &str) -> PortResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let digest = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| PortError::Unexpected(format!("Failed to hash password: {}", e)))?;
    Ok(digest.to_string())
}

/// Verifies a plaintext password against a stored digest.
///
/// Returns false both on mismatch and on a malformed digest; a corrupt row
/// must read as "wrong password", never as a server error.
pub fn verify_password(plain: &str, digest: &str) -> bool {
    match PasswordHash::new(digest) {
        Ok(parsed) => Argon2::default()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_round_trips() {
        let digest = hash_password("pw123").unwrap();
        assert!(verify_password("pw123", &digest));
    }

    #[test]
    fn wrong_password_does_not_verify() {
        let digest = hash_password("pw123").unwrap();
        assert!(!verify_password("pw124", &digest));
    }

    #[test]
    fn same_plaintext_yields_different_digests() {
        let a = hash_password("pw123").unwrap();
        let b = hash_password("pw123").unwrap();
        assert_ne!(a, b);
        assert!(verify_password("pw123", &a));
        assert!(verify_password("pw123", &b));
    }

    #[test]
    fn malformed_digest_verifies_false() {
        assert!(!verify_password("pw123", "not-a-phc-string"));
        assert!(!verify_password("pw123", ""));
    }
}
