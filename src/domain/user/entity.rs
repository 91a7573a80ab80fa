//! User record, role and collection types

use serde::{Deserialize, Serialize};

use super::validation::{validate_user_id, UserValidationError};

/// User identifier, an opaque string unique within the store
///
/// Records read from the store are taken as-is; only ids built from caller
/// input go through [`UserId::new`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Create a new UserId after validation
    pub fn new(id: impl Into<String>) -> Result<Self, UserValidationError> {
        let id = id.into();
        validate_user_id(&id)?;
        Ok(Self(id))
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for UserId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role tag carried by a user record and its token claims
///
/// Tags other than `user` and `admin` are kept verbatim so the store round-trips.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum Role {
    #[default]
    User,
    Admin,
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
            Self::Other(tag) => tag,
        }
    }

    /// Whether this role may list every profile
    pub fn is_privileged(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        match value.as_str() {
            "user" => Self::User,
            "admin" => Self::Admin,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for Role {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Other(tag) => tag,
            other => other.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user as persisted in the backing store
///
/// The stored hash travels under the `password` key to stay compatible with
/// existing store files. This type is never returned across the service
/// boundary; use [`ProfileProjection`](super::ProfileProjection) for that.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    id: UserId,
    username: String,
    #[serde(rename = "password")]
    password_hash: String,
    email: String,
    role: Role,
}

impl UserRecord {
    pub fn new(
        id: UserId,
        username: impl Into<String>,
        password_hash: impl Into<String>,
        email: impl Into<String>,
        role: Role,
    ) -> Self {
        Self {
            id,
            username: username.into(),
            password_hash: password_hash.into(),
            email: email.into(),
            role,
        }
    }

    // Getters

    pub fn id(&self) -> &UserId {
        &self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn role(&self) -> &Role {
        &self.role
    }

    // Mutators

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.email = email.into();
    }
}

impl std::fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserRecord")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password_hash", &"[hidden]")
            .field("email", &self.email)
            .field("role", &self.role)
            .finish()
    }
}

/// Ordered user collection, the in-memory image of the backing store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserCollection(Vec<UserRecord>);

impl UserCollection {
    pub fn new(users: Vec<UserRecord>) -> Self {
        Self(users)
    }

    /// First record with this username
    pub fn find_by_username(&self, username: &str) -> Option<&UserRecord> {
        self.0.iter().find(|u| u.username == username)
    }

    /// First record with this id
    pub fn find_by_id(&self, id: &UserId) -> Option<&UserRecord> {
        self.0.iter().find(|u| &u.id == id)
    }

    pub fn find_by_id_mut(&mut self, id: &UserId) -> Option<&mut UserRecord> {
        self.0.iter_mut().find(|u| &u.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &UserRecord> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_vec(&self) -> Vec<UserRecord> {
        self.0.clone()
    }
}

impl From<Vec<UserRecord>> for UserCollection {
    fn from(users: Vec<UserRecord>) -> Self {
        Self(users)
    }
}
