//! User infrastructure module
//!
//! File-backed user repository and password hashing (bcrypt, Argon2).

mod file_repository;
mod password;

pub use file_repository::FileUserRepository;
pub use password::{
    create_hasher, Argon2Hasher, BcryptHasher, PasswordHasher, PasswordScheme,
    BCRYPT_COST_RANGE, DEFAULT_BCRYPT_COST,
};

#[cfg(test)]
pub use password::MockPasswordHasher;
