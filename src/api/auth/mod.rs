//! Authentication API endpoints
//!
//! Login, token validation, and identity lookup for bearer-token clients.

use axum::{
    extract::State,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};

use crate::api::health;
use crate::api::middleware::RequireUser;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::user::{validate_password, validate_username, ProfileProjection};
use crate::infrastructure::auth::{AuthResponse, TokenClaims};

/// Create the authentication router
pub fn create_auth_router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/validate", post(validate))
        .route("/me", get(me))
        .route("/health", get(health::health_check))
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl LoginRequest {
    fn validate(&self) -> Result<(), ApiError> {
        validate_username(&self.username).map_err(|e| ApiError::bad_request(e.to_string()))?;
        validate_password(&self.password).map_err(|e| ApiError::bad_request(e.to_string()))?;
        Ok(())
    }
}

/// Token validation request
#[derive(Debug, Deserialize)]
pub struct ValidateRequest {
    #[serde(default)]
    pub token: String,
}

/// Token validation response
#[derive(Debug, Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    pub payload: TokenClaims,
}

/// Login with username and password
///
/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    request.validate()?;

    let response = state
        .auth_service
        .login(&request.username, &request.password)
        .await?;

    Ok(Json(response))
}

/// Check a token and echo its claims
///
/// POST /auth/validate
pub async fn validate(
    State(state): State<AppState>,
    Json(request): Json<ValidateRequest>,
) -> Result<Json<ValidateResponse>, ApiError> {
    let payload = state.auth_service.validate_token(request.token.trim())?;

    Ok(Json(ValidateResponse {
        valid: true,
        payload,
    }))
}

/// Current user as stored now, not as of token issue
///
/// GET /auth/me
pub async fn me(
    State(state): State<AppState>,
    RequireUser(claims): RequireUser,
) -> Result<Json<ProfileProjection>, ApiError> {
    let profile = state.auth_service.resolve_identity(&claims).await?;
    Ok(Json(profile))
}
