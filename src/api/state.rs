//! Application state for shared services

use std::sync::Arc;

use crate::infrastructure::auth::AuthService;
use crate::infrastructure::profile::ProfileService;

/// Services shared by every request
#[derive(Debug, Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub profile_service: Arc<ProfileService>,
}

impl AppState {
    pub fn new(auth_service: Arc<AuthService>, profile_service: Arc<ProfileService>) -> Self {
        Self {
            auth_service,
            profile_service,
        }
    }
}
