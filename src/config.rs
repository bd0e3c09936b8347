//! Configuration module for filehub.

use serde::Deserialize;
use std::path::Path;

use crate::{FilehubError, Result};

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origins (empty allows any origin).
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/filehub.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// File storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FilesConfig {
    /// Directory that holds every uploaded object.
    #[serde(default = "default_storage_path")]
    pub storage_path: String,
    /// Maximum upload size in megabytes.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size_mb: u64,
    /// Base URL used to build each record's public URL.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

fn default_storage_path() -> String {
    "uploads".to_string()
}

fn default_max_upload_size() -> u64 {
    10
}

fn default_public_base_url() -> String {
    "http://localhost:8080".to_string()
}

impl FilesConfig {
    /// Upload limit in bytes.
    pub fn max_upload_bytes(&self) -> usize {
        (self.max_upload_size_mb as usize).saturating_mul(1024 * 1024)
    }
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            storage_path: default_storage_path(),
            max_upload_size_mb: default_max_upload_size(),
            public_base_url: default_public_base_url(),
        }
    }
}

/// Password handling configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// Password scheme: `plaintext` or `argon2`.
    #[serde(default = "default_password_scheme")]
    pub password_scheme: String,
}

fn default_password_scheme() -> String {
    "plaintext".to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            password_scheme: default_password_scheme(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log file path. Empty disables the file sink.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/filehub.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// File storage configuration.
    #[serde(default)]
    pub files: FilesConfig,
    /// Password handling.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(FilehubError::Io)?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| FilehubError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `FILEHUB_DATABASE_PATH`: SQLite database file
    /// - `FILEHUB_STORAGE_PATH`: upload directory
    /// - `FILEHUB_PUBLIC_BASE_URL`: base of generated public URLs
    ///
    /// Empty values are ignored.
    pub fn apply_env_overrides(&mut self) {
        if let Some(path) = non_empty_env("FILEHUB_DATABASE_PATH") {
            self.database.path = path;
        }
        if let Some(path) = non_empty_env("FILEHUB_STORAGE_PATH") {
            self.files.storage_path = path;
        }
        if let Some(url) = non_empty_env("FILEHUB_PUBLIC_BASE_URL") {
            self.files.public_base_url = url;
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.files.storage_path.trim().is_empty() {
            return Err(FilehubError::Config(
                "files.storage_path must not be empty".to_string(),
            ));
        }
        if self.files.max_upload_size_mb == 0 {
            return Err(FilehubError::Config(
                "files.max_upload_size_mb must be greater than zero".to_string(),
            ));
        }
        let base = self.files.public_base_url.as_str();
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(FilehubError::Config(format!(
                "files.public_base_url must be an http(s) URL, got '{base}'"
            )));
        }
        if crate::auth::scheme_from_name(&self.auth.password_scheme).is_none() {
            return Err(FilehubError::Config(format!(
                "unknown auth.password_scheme '{}'",
                self.auth.password_scheme
            )));
        }
        Ok(())
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}
