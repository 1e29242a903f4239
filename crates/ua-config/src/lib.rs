//! Users API Configuration System
//!
//! TOML-based configuration with environment variable override support.
//! Every section has defaults, so an empty file (or no file at all) yields a
//! runnable in-memory setup.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

mod loader;

pub use loader::ConfigLoader;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),

    #[error("Environment variable error: {0}")]
    EnvError(String),
}

/// Root application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub http: HttpConfig,
    pub store: StoreConfig,
    pub identity: IdentityConfig,
    pub response: ResponseConfig,

    /// Enable development mode (in-memory backends without warnings)
    pub dev_mode: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            http: HttpConfig::default(),
            store: StoreConfig::default(),
            identity: IdentityConfig::default(),
            response: ResponseConfig::default(),
            dev_mode: false,
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub port: u16,
    pub host: String,
    pub cors_origins: Vec<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "0.0.0.0".to_string(),
            cors_origins: vec!["*".to_string()],
        }
    }
}

/// Document store backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Memory,
    Mongodb,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "mongodb" | "mongo" => Ok(StoreBackend::Mongodb),
            other => Err(ConfigError::EnvError(format!("Unknown store backend: {}", other))),
        }
    }
}

impl fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreBackend::Memory => write!(f, "memory"),
            StoreBackend::Mongodb => write!(f, "mongodb"),
        }
    }
}

/// Document store configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub mongodb: MongoConfig,
    /// Table (collection) holding role records
    pub roles_table: String,
    /// Table (collection) holding user records
    pub users_table: String,
    /// Attempts for a version-checked read-modify-write before giving up
    pub max_write_attempts: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            mongodb: MongoConfig::default(),
            roles_table: "Roles".to_string(),
            users_table: "Users".to_string(),
            max_write_attempts: 3,
        }
    }
}

/// MongoDB configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            uri: "mongodb://localhost:27017".to_string(),
            database: "users_api".to_string(),
        }
    }
}

/// Identity provider backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityProviderKind {
    Memory,
    Cognito,
}

impl FromStr for IdentityProviderKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(IdentityProviderKind::Memory),
            "cognito" => Ok(IdentityProviderKind::Cognito),
            other => Err(ConfigError::EnvError(format!("Unknown identity provider: {}", other))),
        }
    }
}

impl fmt::Display for IdentityProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentityProviderKind::Memory => write!(f, "memory"),
            IdentityProviderKind::Cognito => write!(f, "cognito"),
        }
    }
}

/// Identity provider configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    pub provider: IdentityProviderKind,
    /// AWS region; empty means the SDK default chain decides
    pub region: String,
    pub user_pool_id: String,
    pub app_client_id: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            provider: IdentityProviderKind::Memory,
            region: String::new(),
            user_pool_id: String::new(),
            app_client_id: String::new(),
        }
    }
}

/// Headers stamped on every response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResponseConfig {
    pub custom_header_name: String,
    pub custom_header_value: String,
}

impl Default for ResponseConfig {
    fn default() -> Self {
        Self {
            custom_header_name: "X-Custom-Header".to_string(),
            custom_header_value: "application/json".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration with environment variable override
    pub fn load() -> Result<Self, ConfigError> {
        ConfigLoader::new().load()
    }

    /// Check cross-field constraints that serde defaults cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.max_write_attempts == 0 {
            return Err(ConfigError::ValidationError(
                "store.max_write_attempts must be at least 1".to_string(),
            ));
        }
        if self.store.roles_table.trim().is_empty() || self.store.users_table.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "store.roles_table and store.users_table must not be empty".to_string(),
            ));
        }
        if self.store.roles_table == self.store.users_table {
            return Err(ConfigError::ValidationError(format!(
                "store.roles_table and store.users_table must differ (both are '{}')",
                self.store.roles_table
            )));
        }
        if self.store.backend == StoreBackend::Mongodb && self.store.mongodb.uri.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "store.mongodb.uri is required for the mongodb backend".to_string(),
            ));
        }
        if self.identity.provider == IdentityProviderKind::Cognito {
            if self.identity.user_pool_id.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "identity.user_pool_id is required for the cognito provider".to_string(),
                ));
            }
            if self.identity.app_client_id.trim().is_empty() {
                return Err(ConfigError::ValidationError(
                    "identity.app_client_id is required for the cognito provider".to_string(),
                ));
            }
        }
        if !is_header_token(&self.response.custom_header_name) {
            return Err(ConfigError::ValidationError(format!(
                "response.custom_header_name '{}' is not a valid header name",
                self.response.custom_header_name
            )));
        }
        Ok(())
    }

    /// Generate an example TOML configuration
    pub fn example_toml() -> String {
        r#"# Users API Configuration
# Environment variables (USERS_API_*) override these settings

dev_mode = false

[http]
port = 8080
host = "0.0.0.0"
cors_origins = ["*"]

[store]
backend = "memory"  # memory or mongodb
roles_table = "Roles"
users_table = "Users"
max_write_attempts = 3

[store.mongodb]
uri = "mongodb://localhost:27017"
database = "users_api"

[identity]
provider = "memory"  # memory or cognito
region = ""
user_pool_id = ""
app_client_id = ""

[response]
custom_header_name = "X-Custom-Header"
custom_header_value = "application/json"
"#
        .to_string()
    }
}

/// RFC 7230 token characters.
fn is_header_token(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "!#$%&'*+-.^_`|~".contains(c))
}
