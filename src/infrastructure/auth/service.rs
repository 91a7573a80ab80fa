//! Authentication flow: credentials in, bearer token out

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::OnceCell;
use tracing::{debug, error, info, warn};

use crate::domain::user::{ProfileProjection, UserId, UserRepository};
use crate::domain::DomainError;
use crate::infrastructure::observability::record_login_attempt;
use crate::infrastructure::user::PasswordHasher;

use super::jwt::{IdentityClaims, TokenClaims, TokenService};

/// Successful login payload
#[derive(Debug, Clone, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: String,
    pub user: ProfileProjection,
}

/// Turns credentials into tokens and tokens back into identities
#[derive(Debug)]
pub struct AuthService {
    repository: Arc<dyn UserRepository>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenService>,
    dummy_hash: OnceCell<String>,
}

impl AuthService {
    pub fn new(
        repository: Arc<dyn UserRepository>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenService>,
    ) -> Self {
        Self {
            repository,
            hasher,
            tokens,
            dummy_hash: OnceCell::new(),
        }
    }

    /// Authenticate a username/password pair and issue a token.
    ///
    /// Unknown usernames and wrong passwords both yield `InvalidCredentials`
    /// after one hash verification, so neither the error nor the timing tells
    /// them apart.
    pub async fn login(&self, username: &str, password: &str) -> Result<AuthResponse, DomainError> {
        let Some(user) = self.repository.find_by_username(username).await? else {
            let dummy = self.dummy_hash().await;
            self.verify_password(password, dummy).await;

            debug!("Login rejected");
            record_login_attempt(false);
            return Err(DomainError::InvalidCredentials);
        };

        if !self
            .verify_password(password, user.password_hash().to_string())
            .await
        {
            debug!("Login rejected");
            record_login_attempt(false);
            return Err(DomainError::InvalidCredentials);
        }

        let access_token = self.tokens.issue(&IdentityClaims::from(&user))?;

        info!(user_id = %user.id(), "User logged in");
        record_login_attempt(true);

        Ok(AuthResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: self.tokens.lifetime().to_string(),
            user: ProfileProjection::from(&user),
        })
    }

    /// Verify a presented token. Every failure collapses to `InvalidOrExpiredToken`.
    pub fn validate_token(&self, token: &str) -> Result<TokenClaims, DomainError> {
        self.tokens.verify(token).map_err(|e| {
            debug!(reason = %e, "Token rejected");
            DomainError::InvalidOrExpiredToken
        })
    }

    /// Look up the user a verified token speaks for.
    ///
    /// A token can outlive its user; that surfaces here as `UserNotFound`.
    pub async fn resolve_identity(
        &self,
        claims: &TokenClaims,
    ) -> Result<ProfileProjection, DomainError> {
        let Ok(user_id) = UserId::new(claims.user_id()) else {
            return Err(DomainError::UserNotFound);
        };

        self.repository
            .find_by_id(&user_id)
            .await?
            .map(|user| ProfileProjection::from(&user))
            .ok_or(DomainError::UserNotFound)
    }

    async fn verify_password(&self, password: &str, hash: String) -> bool {
        let hasher = self.hasher.clone();
        let password = password.to_string();

        tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .unwrap_or_else(|e| {
                error!(error = %e, "Password verification task failed");
                false
            })
    }

    /// Hash compared against when the username is unknown
    async fn dummy_hash(&self) -> String {
        self.dummy_hash
            .get_or_init(|| async {
                let hasher = self.hasher.clone();

                match tokio::task::spawn_blocking(move || hasher.hash("unknown-user-placeholder")).await {
                    Ok(Ok(hash)) => hash,
                    Ok(Err(e)) => {
                        warn!(error = %e, "Could not prepare placeholder hash");
                        String::new()
                    }
                    Err(e) => {
                        warn!(error = %e, "Could not prepare placeholder hash");
                        String::new()
                    }
                }
            })
            .await
            .clone()
    }
}
