//! Infrastructure layer - storage, hashing, tokens, and the orchestration services

pub mod auth;
pub mod logging;
pub mod observability;
pub mod profile;
pub mod user;
