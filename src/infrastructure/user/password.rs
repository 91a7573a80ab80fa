//! Password hashing and verification
//!
//! Stored hashes are bcrypt by default (cost 10). Argon2 PHC strings are
//! supported as an alternate scheme.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher as Argon2PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use serde::Deserialize;
use std::fmt::Debug;
use std::sync::Arc;

use crate::domain::DomainError;

#[cfg(test)]
use mockall::automock;

/// Default bcrypt work factor
pub const DEFAULT_BCRYPT_COST: u32 = 10;

/// Trait for password hashing operations
#[cfg_attr(test, automock)]
pub trait PasswordHasher: Send + Sync + Debug {
    /// Hash a password
    fn hash(&self, password: &str) -> Result<String, DomainError>;

    /// Verify a password against a stored hash.
    ///
    /// Returns false for a mismatch and for a hash that cannot be parsed; the two
    /// cases are indistinguishable to the caller.
    fn verify(&self, password: &str, hash: &str) -> bool;
}

/// Which hashing scheme new hashes are produced with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PasswordScheme {
    #[default]
    Bcrypt,
    Argon2,
}

/// Accepted bcrypt work factors
pub const BCRYPT_COST_RANGE: std::ops::RangeInclusive<u32> = 4..=31;

/// Build the hasher for a scheme
///
/// New hashes use `scheme`; verification accepts stored hashes of either
/// scheme. Fails with `Configuration` for a bcrypt cost outside
/// [`BCRYPT_COST_RANGE`], whatever the scheme.
pub fn create_hasher(
    scheme: PasswordScheme,
    bcrypt_cost: u32,
) -> Result<Arc<dyn PasswordHasher>, DomainError> {
    if !BCRYPT_COST_RANGE.contains(&bcrypt_cost) {
        return Err(DomainError::configuration(format!(
            "bcrypt cost {} is outside {}..={}",
            bcrypt_cost,
            BCRYPT_COST_RANGE.start(),
            BCRYPT_COST_RANGE.end()
        )));
    }

    Ok(Arc::new(SchemeAwareHasher {
        scheme,
        bcrypt: BcryptHasher::with_cost(bcrypt_cost),
        argon2: Argon2Hasher::new(),
    }))
}

/// Hashes with the configured scheme, verifies by the stored hash's prefix
#[derive(Debug, Clone)]
pub struct SchemeAwareHasher {
    scheme: PasswordScheme,
    bcrypt: BcryptHasher,
    argon2: Argon2Hasher,
}

impl PasswordHasher for SchemeAwareHasher {
    fn hash(&self, password: &str) -> Result<String, DomainError> {
        match self.scheme {
            PasswordScheme::Bcrypt => self.bcrypt.hash(password),
            PasswordScheme::Argon2 => self.argon2.hash(password),
        }
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        if hash.starts_with("$argon2") {
            self.argon2.verify(password, hash)
        } else {
            self.bcrypt.verify(password, hash)
        }
    }
}

/// bcrypt-based password hasher
#[derive(Debug, Clone)]
pub struct BcryptHasher {
    cost: u32,
}

impl BcryptHasher {
    /// Create a hasher with the default cost
    pub fn new() -> Self {
        Self::with_cost(DEFAULT_BCRYPT_COST)
    }

    pub fn with_cost(cost: u32) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }
}

impl Default for BcryptHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasher for BcryptHasher {
    fn hash(&self, password: &str) -> Result<String, DomainError> {
        bcrypt::hash(password, self.cost)
            .map_err(|e| DomainError::internal(format!("Failed to hash password: {}", e)))
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        bcrypt::verify(password, hash).unwrap_or(false)
    }
}

/// Argon2-based password hasher
#[derive(Debug, Clone, Default)]
pub struct Argon2Hasher;

impl Argon2Hasher {
    /// Create a new Argon2 hasher
    pub fn new() -> Self {
        Self
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, password: &str) -> Result<String, DomainError> {
        let salt = SaltString::generate(&mut OsRng);

        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| DomainError::internal(format!("Failed to hash password: {}", e)))
    }

    fn verify(&self, password: &str, hash: &str) -> bool {
        let Ok(parsed_hash) = PasswordHash::new(hash) else {
            return false;
        };

        Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_bcrypt() -> BcryptHasher {
        BcryptHasher::with_cost(4)
    }

    #[test]
    fn test_bcrypt_hash_and_verify() {
        let hasher = fast_bcrypt();
        let hash = hasher.hash("pw123").unwrap();

        assert!(hash.starts_with("$2"));
        assert!(hasher.verify("pw123", &hash));
        assert!(!hasher.verify("wrong", &hash));
        assert!(!hasher.verify("pw1234", &hash));
        assert!(!hasher.verify("", &hash));
    }

    #[test]
    fn test_bcrypt_default_cost() {
        let hasher = BcryptHasher::default();
        assert_eq!(hasher.cost(), 10);

        let hash = hasher.hash("pw123").unwrap();
        assert!(hash.contains("$10$"));
        assert!(hasher.verify("pw123", &hash));
    }

    #[test]
    fn test_bcrypt_salts_differ() {
        let hasher = fast_bcrypt();

        let hash1 = hasher.hash("pw123").unwrap();
        let hash2 = hasher.hash("pw123").unwrap();

        assert_ne!(hash1, hash2);
        assert!(hasher.verify("pw123", &hash1));
        assert!(hasher.verify("pw123", &hash2));
    }

    #[test]
    fn test_bcrypt_malformed_hash_is_a_mismatch() {
        let hasher = fast_bcrypt();

        assert!(!hasher.verify("pw123", ""));
        assert!(!hasher.verify("pw123", "not-a-hash"));
        assert!(!hasher.verify("pw123", "$2b$10$tooshort"));
    }

    #[test]
    fn test_argon2_hash_and_verify() {
        let hasher = Argon2Hasher::new();
        let hash = hasher.hash("my_secure_password").unwrap();

        assert!(hasher.verify("my_secure_password", &hash));
        assert!(!hasher.verify("wrong_password", &hash));
        assert!(!hasher.verify("password", "invalid_hash_format"));
    }

    #[test]
    fn test_schemes_do_not_cross_verify() {
        let bcrypt_hash = fast_bcrypt().hash("pw123").unwrap();
        let argon_hash = Argon2Hasher::new().hash("pw123").unwrap();

        assert!(!Argon2Hasher::new().verify("pw123", &bcrypt_hash));
        assert!(!fast_bcrypt().verify("pw123", &argon_hash));
    }

    #[test]
    fn test_create_hasher() {
        let hasher = create_hasher(PasswordScheme::Bcrypt, 4).unwrap();
        let hash = hasher.hash("pw123").unwrap();
        assert!(hash.contains("$04$"));

        let hasher = create_hasher(PasswordScheme::Argon2, 4).unwrap();
        assert!(hasher.hash("pw123").unwrap().starts_with("$argon2"));
    }

    #[test]
    fn test_create_hasher_rejects_bcrypt_cost_out_of_range() {
        for cost in [0, 3, 32, 100] {
            for scheme in [PasswordScheme::Bcrypt, PasswordScheme::Argon2] {
                assert!(matches!(
                    create_hasher(scheme, cost),
                    Err(DomainError::Configuration { .. })
                ));
            }
        }

        assert!(create_hasher(PasswordScheme::Bcrypt, 31).is_ok());
    }

    #[test]
    fn test_verify_follows_stored_hash_scheme() {
        let bcrypt_hash = fast_bcrypt().hash("pw123").unwrap();
        let argon_hash = Argon2Hasher::new().hash("pw123").unwrap();

        for scheme in [PasswordScheme::Bcrypt, PasswordScheme::Argon2] {
            let hasher = create_hasher(scheme, 4).unwrap();

            assert!(hasher.verify("pw123", &bcrypt_hash));
            assert!(hasher.verify("pw123", &argon_hash));
            assert!(!hasher.verify("wrong", &bcrypt_hash));
            assert!(!hasher.verify("wrong", &argon_hash));
            assert!(!hasher.verify("pw123", "not-a-hash"));
        }
    }
}
