//! Domain layer - core types, validation, and repository traits

pub mod error;
pub mod user;

pub use error::DomainError;
