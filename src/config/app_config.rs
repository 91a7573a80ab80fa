use std::collections::HashMap;
use std::path::PathBuf;

use serde::Deserialize;

use crate::domain::DomainError;
use crate::infrastructure::auth::TokenLifetime;
use crate::infrastructure::user::{PasswordScheme, DEFAULT_BCRYPT_COST};

/// Unprefixed variables honored as fallbacks, mapped to their config keys
const LEGACY_ENV_VARS: &[(&str, &str)] = &[
    ("auth.jwt_secret", "JWT_SECRET"),
    ("auth.jwt_expires_in", "JWT_EXPIRES_IN"),
    ("storage.users_path", "USERS_FILE"),
];

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Token signing secret; a random one is generated when unset
    pub jwt_secret: Option<String>,
    pub jwt_expires_in: String,
    pub password_scheme: PasswordScheme,
    pub bcrypt_cost: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON file holding the user collection
    pub users_path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    pub enabled: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            jwt_expires_in: "1h".to_string(),
            password_scheme: PasswordScheme::default(),
            bcrypt_cost: DEFAULT_BCRYPT_COST,
        }
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "[hidden]"))
            .field("jwt_expires_in", &self.jwt_expires_in)
            .field("password_scheme", &self.password_scheme)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .finish()
    }
}

impl AuthConfig {
    /// Parsed token lifetime
    pub fn token_lifetime(&self) -> Result<TokenLifetime, DomainError> {
        self.jwt_expires_in.parse()
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            users_path: PathBuf::from("data/users.json"),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_with_env(std::env::vars().collect())
    }

    /// Load configuration against an explicit environment
    pub fn load_with_env(env: HashMap<String, String>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        for (key, var) in LEGACY_ENV_VARS {
            if let Some(value) = env.get(*var) {
                builder = builder.set_default(*key, value.clone())?;
            }
        }

        let config = builder
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true)
                    .source(Some(env)),
            )
            .build()?;

        config.try_deserialize()
    }
}
