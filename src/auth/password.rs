//! Password hashing with bcrypt
//!
//! The work factor is fixed at 12 to match every credential already stored;
//! changing it would require a rehash-on-login migration.

use bcrypt::BcryptError;
use thiserror::Error;

/// Fixed bcrypt work factor for all stored credentials
pub const BCRYPT_COST: u32 = 12;

/// Password hashing errors
#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Bcrypt error: {0}")]
    Bcrypt(#[from] BcryptError),
}

/// Hash a plaintext password with the fixed work factor.
///
/// CPU-bound; handlers run this through `web::block` so the reactor is
/// never stalled.
pub fn hash_password(plain: &str) -> Result<String, PasswordError> {
    hash_with_cost(plain, BCRYPT_COST)
}

fn hash_with_cost(plain: &str, cost: u32) -> Result<String, PasswordError> {
    Ok(bcrypt::hash(plain, cost)?)
}

/// Verify a plaintext candidate against a stored hash
pub fn verify_password(plain: &str, hashed: &str) -> Result<bool, PasswordError> {
    Ok(bcrypt::verify(plain, hashed)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_round_trip() {
        let hashed = hash_with_cost("secret1", 4).unwrap();
        assert!(verify_password("secret1", &hashed).unwrap());
        assert!(!verify_password("secret2", &hashed).unwrap());
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_with_cost("secret1", 4).unwrap();
        let b = hash_with_cost("secret1", 4).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn production_cost_is_encoded_in_hash() {
        let hashed = hash_password("secret1").unwrap();
        assert!(hashed.contains("$12$"), "unexpected hash format: {}", hashed);
    }

    #[test]
    fn verify_rejects_garbage_hash() {
        assert!(verify_password("secret1", "not-a-bcrypt-hash").is_err());
    }
}
