//! Outward-safe user views and profile patches

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use super::entity::{Role, UserRecord};

/// Hash-stripped view of a user record
///
/// The timestamps are only set by the detailed read and reflect the time of
/// that read, not anything persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileProjection {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login: Option<String>,
}

impl ProfileProjection {
    /// Attach "as of now" timestamps
    pub fn with_read_timestamps(mut self) -> Self {
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        self.created_at = Some(now.clone());
        self.last_login = Some(now);
        self
    }
}

impl From<&UserRecord> for ProfileProjection {
    fn from(user: &UserRecord) -> Self {
        Self {
            id: user.id().as_str().to_string(),
            username: user.username().to_string(),
            email: user.email().to_string(),
            role: user.role().clone(),
            created_at: None,
            last_login: None,
        }
    }
}

/// Partial profile update; absent fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProfilePatch {
    #[serde(default)]
    pub email: Option<String>,
}

impl ProfilePatch {
    pub fn with_email(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
        }
    }

    /// Apply the present fields to a record. An empty email counts as absent.
    pub fn apply(&self, user: &mut UserRecord) {
        if let Some(email) = self.email.as_deref().filter(|e| !e.is_empty()) {
            user.set_email(email);
        }
    }
}
