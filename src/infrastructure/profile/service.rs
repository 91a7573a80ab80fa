//! Profile reads and updates
//!
//! Every operation re-syncs the repository from the backing store first, since
//! the store may be edited out-of-band. No authorization happens here; callers
//! decide who may reach which method.

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::user::{ProfilePatch, ProfileProjection, UserId, UserRecord, UserRepository};
use crate::domain::DomainError;
use crate::infrastructure::observability::record_profile_update;

/// Profile service over the user repository
#[derive(Debug)]
pub struct ProfileService {
    repository: Arc<dyn UserRepository>,
}

impl ProfileService {
    pub fn new(repository: Arc<dyn UserRepository>) -> Self {
        Self { repository }
    }

    /// Fresh stripped profile for one user
    pub async fn get_profile(&self, user_id: &str) -> Result<ProfileProjection, DomainError> {
        self.repository.reload().await;

        let user = self.find(user_id).await?;
        Ok(ProfileProjection::from(&user))
    }

    /// Profile plus timestamps. The timestamps are the time of this call.
    pub async fn get_detailed_profile(
        &self,
        user_id: &str,
    ) -> Result<ProfileProjection, DomainError> {
        Ok(self.get_profile(user_id).await?.with_read_timestamps())
    }

    /// Apply a partial update and write it through to the store.
    ///
    /// On `Persistence` errors the outcome is indeterminate; re-read before retrying.
    pub async fn update_profile(
        &self,
        user_id: &str,
        patch: ProfilePatch,
    ) -> Result<ProfileProjection, DomainError> {
        self.repository.reload().await;

        let id = parse_user_id(user_id)?;

        let result = self
            .repository
            .update_by_id(&id, Box::new(move |user: &mut UserRecord| patch.apply(user)))
            .await;

        match &result {
            Ok(_) => {
                info!(user_id = %id, "Profile updated");
                record_profile_update("success");
            }
            Err(DomainError::NotFound { .. }) => record_profile_update("not_found"),
            Err(_) => record_profile_update("error"),
        }

        result.map(|user| ProfileProjection::from(&user))
    }

    /// Every profile, stripped. Callers must have checked the privileged role.
    pub async fn get_all_profiles(&self) -> Result<Vec<ProfileProjection>, DomainError> {
        self.repository.reload().await;

        let users = self.repository.list_all().await?;
        Ok(users.iter().map(ProfileProjection::from).collect())
    }

    async fn find(&self, user_id: &str) -> Result<UserRecord, DomainError> {
        let id = parse_user_id(user_id)?;

        self.repository
            .find_by_id(&id)
            .await?
            .ok_or_else(|| {
                debug!(user_id = %id, "Profile lookup missed");
                DomainError::not_found("User not found")
            })
    }
}

/// The empty id cannot exist in the store, so it is simply not found
fn parse_user_id(user_id: &str) -> Result<UserId, DomainError> {
    UserId::new(user_id).map_err(|_| DomainError::not_found("User not found"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::{MockUserRepository, Role};
    use crate::infrastructure::user::FileUserRepository;
    use tempfile::TempDir;

    fn record(id: &str, username: &str, email: &str, role: Role) -> UserRecord {
        UserRecord::new(UserId::new(id).unwrap(), username, "$2b$10$hash", email, role)
    }

    fn users() -> Vec<UserRecord> {
        vec![
            record("1", "alice", "a@x.com", Role::User),
            record("2", "root", "r@x.com", Role::Admin),
        ]
    }

    fn create_service() -> (ProfileService, Arc<MockUserRepository>) {
        let repository = Arc::new(MockUserRepository::with_users(users()));
        (ProfileService::new(repository.clone()), repository)
    }

    #[tokio::test]
    async fn test_get_profile_reloads_first() {
        let (service, repository) = create_service();

        let profile = service.get_profile("1").await.unwrap();

        assert_eq!(profile.username, "alice");
        assert_eq!(profile.role, Role::User);
        assert!(profile.created_at.is_none());
        assert_eq!(repository.reload_count(), 1);
    }

    #[tokio::test]
    async fn test_get_profile_not_found() {
        let (service, _) = create_service();

        assert!(matches!(
            service.get_profile("99").await,
            Err(DomainError::NotFound { .. })
        ));
        assert!(matches!(
            service.get_profile("").await,
            Err(DomainError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_free_form_id_is_found() {
        let repository = Arc::new(MockUserRepository::with_users(vec![record(
            "bob@corp.example",
            "bob",
            "b@x.com",
            Role::User,
        )]));
        let service = ProfileService::new(repository);

        let profile = service.get_profile("bob@corp.example").await.unwrap();
        assert_eq!(profile.username, "bob");
    }

    #[tokio::test]
    async fn test_detailed_profile_has_timestamps() {
        let (service, _) = create_service();

        let profile = service.get_detailed_profile("1").await.unwrap();

        assert_eq!(profile.id, "1");
        assert!(profile.created_at.is_some());
        assert!(profile.last_login.is_some());
    }

    #[tokio::test]
    async fn test_update_then_get() {
        let (service, repository) = create_service();

        let updated = service
            .update_profile("1", ProfilePatch::with_email("a@b.com"))
            .await
            .unwrap();
        assert_eq!(updated.email, "a@b.com");

        let profile = service.get_profile("1").await.unwrap();
        assert_eq!(profile.email, "a@b.com");
        assert_eq!(profile.username, "alice");
        assert_eq!(repository.write_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_patch_writes_nothing() {
        let (service, repository) = create_service();

        let profile = service
            .update_profile("1", ProfilePatch::default())
            .await
            .unwrap();

        assert_eq!(profile.email, "a@x.com");
        assert_eq!(repository.write_count(), 0);
    }

    #[tokio::test]
    async fn test_update_missing_user() {
        let (service, _) = create_service();

        let result = service
            .update_profile("99", ProfilePatch::with_email("a@b.com"))
            .await;

        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_update_persistence_failure() {
        let (service, repository) = create_service();
        repository.set_fail_writes(true).await;

        let result = service
            .update_profile("1", ProfilePatch::with_email("a@b.com"))
            .await;

        assert!(matches!(result, Err(DomainError::Persistence { .. })));
    }

    #[tokio::test]
    async fn test_get_all_profiles_strips_hashes() {
        let (service, repository) = create_service();

        let profiles = service.get_all_profiles().await.unwrap();

        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[0].username, "alice");
        assert_eq!(profiles[1].role, Role::Admin);
        assert_eq!(repository.reload_count(), 1);

        let json = serde_json::to_string(&profiles).unwrap();
        assert!(!json.contains("password"));
        assert!(!json.contains("$2b$"));
    }

    #[tokio::test]
    async fn test_empty_patch_leaves_store_bytes_unchanged() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("users.json");
        let original = serde_json::to_string(&users()).unwrap();
        std::fs::write(&path, &original).unwrap();

        let service = ProfileService::new(Arc::new(FileUserRepository::new(&path)));
        service
            .update_profile("1", ProfilePatch::default())
            .await
            .unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), original);
    }

    #[tokio::test]
    async fn test_reads_see_out_of_band_edits() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("users.json");
        std::fs::write(&path, serde_json::to_string(&users()).unwrap()).unwrap();

        let service = ProfileService::new(Arc::new(FileUserRepository::new(&path)));
        assert_eq!(service.get_profile("1").await.unwrap().email, "a@x.com");

        let edited = vec![record("1", "alice", "edited@x.com", Role::User)];
        std::fs::write(&path, serde_json::to_string(&edited).unwrap()).unwrap();

        assert_eq!(service.get_profile("1").await.unwrap().email, "edited@x.com");
        assert_eq!(service.get_all_profiles().await.unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_profile_updates_keep_one_value() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("users.json");
        std::fs::write(&path, serde_json::to_string(&users()).unwrap()).unwrap();
        let service = Arc::new(ProfileService::new(Arc::new(FileUserRepository::new(&path))));

        let tasks: Vec<_> = ["x@x.com", "y@x.com"]
            .into_iter()
            .map(|email| {
                let service = service.clone();
                tokio::spawn(async move {
                    service
                        .update_profile("1", ProfilePatch::with_email(email))
                        .await
                })
            })
            .collect();

        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let stored: Vec<UserRecord> =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(stored.len(), 2);
        let email = stored[0].email();
        assert!(email == "x@x.com" || email == "y@x.com");
        assert_eq!(stored[1].email(), "r@x.com");
    }
}
