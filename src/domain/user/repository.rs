//! User repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::{UserId, UserRecord};
use crate::domain::DomainError;

/// In-place field mutation applied by [`UserRepository::update_by_id`]
pub type UserMutator = Box<dyn FnOnce(&mut UserRecord) + Send>;

/// Repository trait for the user collection
///
/// The repository is the only component that touches the backing store.
#[async_trait]
pub trait UserRepository: Send + Sync + Debug {
    /// Re-read the whole backing store and replace the in-memory snapshot.
    ///
    /// Never fails: an unreadable or malformed store leaves an empty collection
    /// and a warning. Returns the number of users now held.
    async fn reload(&self) -> usize;

    /// First user with this username in the current snapshot
    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, DomainError>;

    /// First user with this id in the current snapshot
    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserRecord>, DomainError>;

    /// Mutate one user and write the entire collection back to the store.
    ///
    /// Fails with `NotFound` when no user has this id and `Persistence` when the
    /// store write fails. Updates within one process are serialized; writers in
    /// other processes are not coordinated with and the last write wins.
    async fn update_by_id(&self, id: &UserId, mutator: UserMutator)
        -> Result<UserRecord, DomainError>;

    /// All users in the current snapshot, in store order
    async fn list_all(&self) -> Result<Vec<UserRecord>, DomainError>;
}
