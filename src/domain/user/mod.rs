//! User domain
//!
//! This module provides domain types and traits for the user store: records,
//! roles, the outward profile projection, validation, and the repository trait.

mod entity;
mod profile;
mod repository;
mod validation;

pub use entity::{Role, UserCollection, UserId, UserRecord};
pub use profile::{ProfilePatch, ProfileProjection};
pub use repository::{UserMutator, UserRepository};
pub use validation::{
    validate_email, validate_password, validate_user_id, validate_username, UserValidationError,
};

#[cfg(test)]
pub use repository::mock::MockUserRepository;
