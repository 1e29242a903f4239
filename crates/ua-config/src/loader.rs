//! Configuration loader with file and environment variable support

use crate::{AppConfig, ConfigError};
use std::env;
use std::path::PathBuf;
use tracing::info;

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_VAR: &str = "USERS_API_CONFIG";

/// Standard config file search paths
const CONFIG_PATHS: &[&str] = &[
    "config.toml",
    "users-api.toml",
    "./config/config.toml",
    "/etc/users-api/config.toml",
];

/// Configuration loader
pub struct ConfigLoader {
    config_path: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new configuration loader
    pub fn new() -> Self {
        Self { config_path: None }
    }

    /// Create a loader with a specific config file path
    pub fn with_path<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            config_path: Some(path.into()),
        }
    }

    /// Load configuration from file (if found), apply environment overrides,
    /// then validate the result.
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        let mut config = match self.find_config_file()? {
            Some(path) => {
                info!(?path, "Loading configuration from file");
                AppConfig::from_file(&path)?
            }
            None => AppConfig::default(),
        };

        apply_overrides(&mut config, |key| env::var(key).ok())?;
        config.validate()?;

        Ok(config)
    }

    /// Find the configuration file to use.
    ///
    /// An explicitly requested file that does not exist is an error; the
    /// standard search paths are optional.
    fn find_config_file(&self) -> Result<Option<PathBuf>, ConfigError> {
        if let Some(path) = &self.config_path {
            return existing(path.clone()).map(Some);
        }

        if let Ok(path) = env::var(CONFIG_PATH_VAR) {
            return existing(PathBuf::from(path)).map(Some);
        }

        Ok(CONFIG_PATHS
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists()))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn existing(path: PathBuf) -> Result<PathBuf, ConfigError> {
    if path.exists() {
        Ok(path)
    } else {
        Err(ConfigError::ValidationError(format!(
            "Config file not found: {}",
            path.display()
        )))
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::EnvError(format!("{} has an invalid value: {}", key, value)))
}

/// Apply `USERS_API_*` overrides read through `lookup`.
pub(crate) fn apply_overrides<F>(config: &mut AppConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    // HTTP
    if let Some(val) = lookup("USERS_API_HTTP_PORT") {
        config.http.port = parse_var("USERS_API_HTTP_PORT", &val)?;
    }
    if let Some(val) = lookup("USERS_API_HTTP_HOST") {
        config.http.host = val;
    }
    if let Some(val) = lookup("USERS_API_CORS_ORIGINS") {
        config.http.cors_origins = val.split(',').map(|s| s.trim().to_string()).collect();
    }

    // Store
    if let Some(val) = lookup("USERS_API_STORE_BACKEND") {
        config.store.backend = val.parse()?;
    }
    if let Some(val) = lookup("USERS_API_MONGODB_URI") {
        config.store.mongodb.uri = val;
    }
    if let Some(val) = lookup("USERS_API_MONGODB_DATABASE") {
        config.store.mongodb.database = val;
    }
    if let Some(val) = lookup("USERS_API_ROLES_TABLE") {
        config.store.roles_table = val;
    }
    if let Some(val) = lookup("USERS_API_USERS_TABLE") {
        config.store.users_table = val;
    }
    if let Some(val) = lookup("USERS_API_MAX_WRITE_ATTEMPTS") {
        config.store.max_write_attempts = parse_var("USERS_API_MAX_WRITE_ATTEMPTS", &val)?;
    }

    // Identity provider
    if let Some(val) = lookup("USERS_API_IDENTITY_PROVIDER") {
        config.identity.provider = val.parse()?;
    }
    if let Some(val) = lookup("USERS_API_AWS_REGION") {
        config.identity.region = val;
    }
    if let Some(val) = lookup("USERS_API_USER_POOL_ID") {
        config.identity.user_pool_id = val;
    }
    if let Some(val) = lookup("USERS_API_APP_CLIENT_ID") {
        config.identity.app_client_id = val;
    }

    // Response headers
    if let Some(val) = lookup("USERS_API_CUSTOM_HEADER_NAME") {
        config.response.custom_header_name = val;
    }
    if let Some(val) = lookup("USERS_API_CUSTOM_HEADER_VALUE") {
        config.response.custom_header_value = val;
    }

    // General
    if let Some(val) = lookup("USERS_API_DEV_MODE") {
        config.dev_mode = matches!(val.trim(), "true" | "1" | "yes");
    }

    Ok(())
}
