//! JSON-file user repository
//!
//! The whole collection is read on reload and written on every mutation. Reads
//! go against an `Arc` snapshot that is swapped in one step, so they never block
//! on a writer. Reloads and updates share one mutex, which serializes every
//! read-modify-write within this process. Other processes writing the same file
//! are not coordinated with: the last writer wins.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tracing::{error, info, warn};

use crate::domain::user::{UserCollection, UserId, UserMutator, UserRecord, UserRepository};
use crate::domain::DomainError;

/// Why the backing store could not be loaded
#[derive(Debug, Error)]
enum LoadError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

/// User repository backed by a single JSON file
#[derive(Debug)]
pub struct FileUserRepository {
    path: PathBuf,
    snapshot: RwLock<Arc<UserCollection>>,
    write_lock: Mutex<()>,
}

impl FileUserRepository {
    /// Create a repository for `path` with an empty snapshot. Nothing is read
    /// until [`UserRepository::reload`] is called.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            snapshot: RwLock::new(Arc::new(UserCollection::default())),
            write_lock: Mutex::new(()),
        }
    }

    /// Create a repository and load the store once
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let repository = Self::new(path);
        repository.reload().await;
        repository
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn current(&self) -> Arc<UserCollection> {
        self.snapshot.read().await.clone()
    }

    async fn replace(&self, collection: UserCollection) {
        *self.snapshot.write().await = Arc::new(collection);
    }

    async fn load(&self) -> Result<UserCollection, LoadError> {
        let display = self.path.display().to_string();

        let data = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| LoadError::Read {
                path: display.clone(),
                source,
            })?;

        serde_json::from_str(&data).map_err(|source| LoadError::Parse {
            path: display,
            source,
        })
    }

    /// Write the full collection through a sibling temp file and rename it into place
    async fn persist(&self, collection: &UserCollection) -> std::io::Result<()> {
        let data = serde_json::to_string_pretty(collection)?;
        let temp_path = self.temp_path();

        tokio::fs::write(&temp_path, data).await?;
        tokio::fs::rename(&temp_path, &self.path).await
    }

    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "users.json".to_string());

        self.path.with_file_name(format!("{}.tmp", file_name))
    }
}

#[async_trait]
impl UserRepository for FileUserRepository {
    async fn reload(&self) -> usize {
        let _guard = self.write_lock.lock().await;

        let collection = match self.load().await {
            Ok(collection) => {
                info!(count = collection.len(), "Users loaded successfully");
                collection
            }
            Err(e) => {
                warn!(error = %e, "Error loading users, continuing with an empty collection");
                UserCollection::default()
            }
        };

        let count = collection.len();
        self.replace(collection).await;
        count
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<UserRecord>, DomainError> {
        Ok(self.current().await.find_by_username(username).cloned())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<UserRecord>, DomainError> {
        Ok(self.current().await.find_by_id(id).cloned())
    }

    async fn update_by_id(
        &self,
        id: &UserId,
        mutator: UserMutator,
    ) -> Result<UserRecord, DomainError> {
        let _guard = self.write_lock.lock().await;

        let mut collection = UserCollection::clone(&*self.current().await);

        let user = collection
            .find_by_id_mut(id)
            .ok_or_else(|| DomainError::not_found(format!("User '{}' not found", id)))?;

        let before = user.clone();
        mutator(user);
        let updated = user.clone();

        if updated == before {
            return Ok(updated);
        }

        if let Err(e) = self.persist(&collection).await {
            error!(user_id = %id, error = %e, "Error saving user");
            return Err(DomainError::persistence(format!(
                "Error updating user '{}'",
                id
            )));
        }

        self.replace(collection).await;
        Ok(updated)
    }

    async fn list_all(&self) -> Result<Vec<UserRecord>, DomainError> {
        Ok(self.current().await.to_vec())
    }
}
