//! Profile API endpoints

use axum::{extract::State, routing::get, Router};

use crate::api::middleware::{RequireAdmin, RequireUser};
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::user::{validate_email, ProfilePatch, ProfileProjection};

/// Create the profile router
pub fn create_profile_router() -> Router<AppState> {
    Router::new()
        .route("/profile", get(get_profile).put(update_profile))
        .route("/profile/detailed", get(get_detailed_profile))
        .route("/profile/all", get(get_all_profiles))
}

/// GET /profile
pub async fn get_profile(
    State(state): State<AppState>,
    RequireUser(claims): RequireUser,
) -> Result<Json<ProfileProjection>, ApiError> {
    let profile = state.profile_service.get_profile(claims.user_id()).await?;
    Ok(Json(profile))
}

/// GET /profile/detailed
pub async fn get_detailed_profile(
    State(state): State<AppState>,
    RequireUser(claims): RequireUser,
) -> Result<Json<ProfileProjection>, ApiError> {
    let profile = state
        .profile_service
        .get_detailed_profile(claims.user_id())
        .await?;
    Ok(Json(profile))
}

/// PUT /profile
///
/// Only `email` is updatable; other fields in the body are ignored.
pub async fn update_profile(
    State(state): State<AppState>,
    RequireUser(claims): RequireUser,
    Json(patch): Json<ProfilePatch>,
) -> Result<Json<ProfileProjection>, ApiError> {
    if let Some(email) = &patch.email {
        validate_email(email).map_err(|e| ApiError::bad_request(e.to_string()))?;
    }

    let profile = state
        .profile_service
        .update_profile(claims.user_id(), patch)
        .await?;
    Ok(Json(profile))
}

/// GET /profile/all (admin only)
pub async fn get_all_profiles(
    State(state): State<AppState>,
    RequireAdmin(_claims): RequireAdmin,
) -> Result<Json<Vec<ProfileProjection>>, ApiError> {
    let profiles = state.profile_service.get_all_profiles().await?;
    Ok(Json(profiles))
}
