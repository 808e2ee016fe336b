//! Service configuration
//!
//! Configuration is resolved once at startup: a TOML file (created with
//! defaults when missing), then environment overrides, then CLI overrides
//! applied by `main`. Precedence is CLI > environment > file.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub web: WebConfig,
    pub storage: StorageConfig,
    pub media: MediaConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory where inbound image uploads are staged before being
    /// forwarded to the media store
    #[serde(default = "default_upload_path")]
    pub upload_path: PathBuf,
    /// Maximum accepted upload size in bytes
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    /// Namespace folder for uploaded school images on the media host
    #[serde(default = "default_media_folder")]
    pub folder: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_upload_path() -> PathBuf {
    PathBuf::from("./data/uploads")
}

fn default_max_upload_size() -> usize {
    5 * 1024 * 1024
}

fn default_media_folder() -> String {
    "school-registry/schools".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://./data/school-registry.db".to_string(),
            max_connections: Some(10),
        }
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_path: default_upload_path(),
            max_upload_size: default_max_upload_size(),
        }
    }
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            cloud_name: String::new(),
            api_key: String::new(),
            api_secret: String::new(),
            folder: default_media_folder(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_file =
            std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".to_string());
        Self::load_from_file(&config_file)
    }

    pub fn load_from_file(config_file: &str) -> Result<Self> {
        let mut config = if std::path::Path::new(&config_file).exists() {
            let contents = std::fs::read_to_string(config_file)?;
            toml::from_str(&contents)?
        } else {
            let default_config = Self::default();
            let contents = toml::to_string_pretty(&default_config)?;
            std::fs::write(config_file, contents)?;
            info!("Created default config file: {}", config_file);
            default_config
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides on top of the file-derived
    /// configuration. `DATABASE_URL` wins over discrete file settings,
    /// matching deployment platforms that inject a single connection string.
    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("DATABASE_URL") {
            if !url.is_empty() {
                self.database.url = url;
            }
        }
        if let Ok(name) = std::env::var("CLOUDINARY_CLOUD_NAME") {
            if !name.is_empty() {
                self.media.cloud_name = name;
            }
        }
        if let Ok(key) = std::env::var("CLOUDINARY_API_KEY") {
            if !key.is_empty() {
                self.media.api_key = key;
            }
        }
        if let Ok(secret) = std::env::var("CLOUDINARY_API_SECRET") {
            if !secret.is_empty() {
                self.media.api_secret = secret;
            }
        }
    }
}
