//! Bearer token extractors

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::domain::DomainError;
use crate::infrastructure::auth::TokenClaims;

pub const ADMIN_ONLY_MESSAGE: &str = "Access denied. Only administrators can access this route.";

/// Extractor that requires a valid access token
///
/// Reads the token from the `Authorization: Bearer <token>` header and hands
/// the verified claims to the handler.
#[derive(Debug, Clone)]
pub struct RequireUser(pub TokenClaims);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers)?;

        let claims = state.auth_service.validate_token(&token)?;

        Ok(RequireUser(claims))
    }
}

/// Extractor that requires a valid access token carrying the admin role
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub TokenClaims);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let RequireUser(claims) = RequireUser::from_request_parts(parts, state).await?;

        if !claims.role().is_privileged() {
            debug!(user_id = %claims.user_id(), role = %claims.role().as_str(), "Admin route refused");
            return Err(DomainError::forbidden(ADMIN_ONLY_MESSAGE).into());
        }

        Ok(RequireAdmin(claims))
    }
}

/// Extract the bearer token from the Authorization header
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<String, ApiError> {
    if let Some(auth_header) = headers.get(header::AUTHORIZATION) {
        let auth_str = auth_header
            .to_str()
            .map_err(|_| {
                ApiError::unauthorized("Invalid Authorization header encoding")
                    .with_code("invalid_token")
            })?;

        if let Some(token) = auth_str.strip_prefix("Bearer ") {
            let token = token.trim();
            if !token.is_empty() {
                return Ok(token.to_string());
            }
        }
    }

    Err(ApiError::unauthorized(
        "Authentication required. Provide a token via 'Authorization: Bearer <token>' header",
    )
    .with_code("missing_token"))
}
