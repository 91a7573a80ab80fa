//! Auth BFF
//!
//! Credential login, bearer-token validation, and profile access over a
//! JSON-file user store:
//! - bcrypt (or argon2) password verification
//! - HS256 access tokens with configurable lifetime
//! - Write-through profile updates, serialized per process

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use rand::Rng;

use api::state::AppState;
use domain::user::UserRepository;
use infrastructure::auth::{AuthService, JwtConfig, JwtService};
use infrastructure::profile::ProfileService;
use infrastructure::user::{create_hasher, FileUserRepository};

/// Build the application state from configuration
pub async fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let lifetime = config.auth.token_lifetime()?;

    let repository: Arc<dyn UserRepository> =
        Arc::new(FileUserRepository::open(&config.storage.users_path).await);

    let hasher = create_hasher(config.auth.password_scheme, config.auth.bcrypt_cost)?;

    let secret = resolve_jwt_secret(config.auth.jwt_secret.as_deref());
    let tokens = Arc::new(JwtService::new(JwtConfig::new(secret, lifetime)));

    let auth_service = Arc::new(AuthService::new(repository.clone(), hasher, tokens));
    let profile_service = Arc::new(ProfileService::new(repository));

    Ok(AppState::new(auth_service, profile_service))
}

fn resolve_jwt_secret(configured: Option<&str>) -> String {
    match configured.map(str::trim).filter(|s| !s.is_empty()) {
        Some(secret) => secret.to_string(),
        None => {
            tracing::warn!(
                "No JWT secret configured. Generating random secret. \
                Issued tokens will NOT survive a restart. \
                Set APP__AUTH__JWT_SECRET or JWT_SECRET for persistent sessions."
            );
            generate_random_secret()
        }
    }
}

fn generate_random_secret() -> String {
    use rand::distributions::Alphanumeric;

    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_secret_is_used() {
        assert_eq!(resolve_jwt_secret(Some("s3cret")), "s3cret");
    }

    #[test]
    fn test_missing_secret_is_generated() {
        let a = resolve_jwt_secret(None);
        let b = resolve_jwt_secret(Some("   "));

        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_create_app_state_rejects_bad_lifetime() {
        let mut config = AppConfig::default();
        config.auth.jwt_expires_in = "forever".to_string();

        assert!(create_app_state(&config).await.is_err());
    }

    #[tokio::test]
    async fn test_create_app_state_rejects_bad_bcrypt_cost() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.storage.users_path = dir.path().join("users.json");
        config.auth.bcrypt_cost = 99;

        assert!(create_app_state(&config).await.is_err());
    }

    #[tokio::test]
    async fn test_create_app_state_with_missing_store() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.storage.users_path = dir.path().join("users.json");

        let state = create_app_state(&config).await.unwrap();
        assert!(state.profile_service.get_all_profiles().await.unwrap().is_empty());
    }
}
