//! Password digest used by registration and login.
//!
//! The stored credential is the unsalted SHA-256 hex digest of the password.
//! Login compares digests for exact equality, so the digest format is part of
//! the stored-data contract. A deployment that cares about offline attacks
//! should swap this for a salted, slow KDF and migrate the `users` table.

use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 digest of `password`.
pub fn hash_password(password: &str) -> String {
    let digest = Sha256::digest(password.as_bytes());
    hex::encode(digest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_digest() {
        // echo -n password | sha256sum
        assert_eq!(
            hash_password("password"),
            "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8"
        );
    }

    #[test]
    fn test_digest_is_stable_and_distinct() {
        assert_eq!(hash_password("hunter2"), hash_password("hunter2"));
        assert_ne!(hash_password("hunter2"), hash_password("hunter3"));
    }
}
