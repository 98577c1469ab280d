//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::storage::{FileRules, StorageConfig};

/// Token used when none is configured anywhere.
pub const DEV_ADMIN_TOKEN: &str = "dev-token";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_cors_origin() -> String {
    "*".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

/// Admin panel access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Token written directly in the config file
    #[serde(default)]
    pub token: Option<String>,

    /// Environment variable checked before `token`
    #[serde(default = "default_token_env")]
    pub token_env: String,
}

fn default_token_env() -> String {
    "BHML_ADMIN_TOKEN".to_string()
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            token: None,
            token_env: default_token_env(),
        }
    }
}

impl AdminConfig {
    /// Resolve the admin token: environment first, then config, then the dev token.
    pub fn resolve_token(&self) -> String {
        let from_env = std::env::var(&self.token_env).ok();
        pick_token(from_env, self.token.clone())
    }
}

fn pick_token(from_env: Option<String>, configured: Option<String>) -> String {
    [from_env, configured]
        .into_iter()
        .flatten()
        .map(|t| t.trim().to_string())
        .find(|t| !t.is_empty())
        .unwrap_or_else(|| DEV_ADMIN_TOKEN.to_string())
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_site_root")]
    pub site_root: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub admin: AdminConfig,

    #[serde(default)]
    pub files: FileRules,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_site_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            site_root: default_site_root(),
            log_level: default_log_level(),
            server: ServerConfig::default(),
            admin: AdminConfig::default(),
            files: FileRules::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &PathBuf) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        if self.admin.token_env.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "admin.token_env must not be empty".to_string(),
            ));
        }

        if matches!(&self.admin.token, Some(t) if t.trim().is_empty()) {
            return Err(ConfigError::ValidationError(
                "admin.token must not be blank".to_string(),
            ));
        }

        if self.files.allowed_extensions.is_empty() {
            return Err(ConfigError::ValidationError(
                "files.allowed_extensions must list at least one extension".to_string(),
            ));
        }

        Ok(())
    }

    pub fn storage(&self) -> StorageConfig {
        StorageConfig::new(self.data_dir.clone(), self.site_root.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.site_root, PathBuf::from("."));
        assert_eq!(config.log_level, "info");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.admin.token_env, "BHML_ADMIN_TOKEN");
        assert!(config.files.allowed_extensions.contains(&".json".to_string()));
    }

    #[test]
    fn test_config_validation_ok() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_bad_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_no_extensions() {
        let mut config = AppConfig::default();
        config.files.allowed_extensions.clear();

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_blank_token() {
        let mut config = AppConfig::default();
        config.admin.token = Some("  ".to_string());

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            data_dir = "/srv/site/data"

            [admin]
            token = "s3cret"

            [files]
            allowed_extensions = [".html"]
            "#,
        )
        .unwrap();

        assert_eq!(config.data_dir, PathBuf::from("/srv/site/data"));
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.admin.token.as_deref(), Some("s3cret"));
        assert_eq!(config.files.allowed_extensions, vec![".html"]);
        assert!(!config.files.ignored_dirs.is_empty());
    }

    #[test]
    fn test_token_precedence() {
        assert_eq!(
            pick_token(Some("env".into()), Some("file".into())),
            "env"
        );
        assert_eq!(pick_token(Some("  ".into()), Some("file".into())), "file");
        assert_eq!(pick_token(None, Some("file".into())), "file");
        assert_eq!(pick_token(None, None), DEV_ADMIN_TOKEN);
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string(&config).unwrap();

        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.data_dir, parsed.data_dir);
        assert_eq!(config.files, parsed.files);
    }
}
