//! # Tracker Configuration
//!
//! A single YAML file `hydration_config.yaml` at the root of the data
//! directory, created with defaults on first launch.
//!
//! ## YAML Format
//!
//! ```yaml
//! data_directory: null
//! retention_days: 30
//! storage_quota_bytes: null
//! log_filter: info
//! config_version: "1.0"
//! created_at: "2025-01-21T19:30:00Z"
//! ```
//!
//! `data_directory` redirects the store to another folder; when empty the
//! store lives next to the config file.

use anyhow::{Context, Result};
use chrono::Utc;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "hydration_config.yaml";
pub const DATA_DIR_ENV_VAR: &str = "HYDRATION_TRACKER_DATA_DIR";
pub const DEFAULT_DIRECTORY_NAME: &str = "Hydration Tracker";
pub const DEFAULT_RETENTION_DAYS: u32 = 30;
pub const CONFIG_VERSION: &str = "1.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Alternative directory for the state files
    pub data_directory: Option<PathBuf>,
    /// Days of intake history kept before pruning
    pub retention_days: u32,
    /// Byte budget for the store; unlimited when absent
    pub storage_quota_bytes: Option<u64>,
    /// `EnvFilter` directive used when `RUST_LOG` is not set
    pub log_filter: String,
    pub config_version: String,
    pub created_at: String,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            data_directory: None,
            retention_days: DEFAULT_RETENTION_DAYS,
            storage_quota_bytes: None,
            log_filter: "info".to_string(),
            config_version: CONFIG_VERSION.to_string(),
            created_at: Utc::now().to_rfc3339(),
        }
    }
}

impl TrackerConfig {
    /// Load the config from the default directory, creating it if needed
    pub fn load_default() -> Result<(Self, PathBuf)> {
        let config_dir = default_data_directory()?;
        let config = Self::load_or_create(&config_dir)?;
        Ok((config, config_dir))
    }

    /// Load `hydration_config.yaml` from `config_dir`, writing defaults if missing
    pub fn load_or_create(config_dir: &Path) -> Result<Self> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            let yaml_content = fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read {:?}", config_path))?;
            let config: TrackerConfig = serde_yaml::from_str(&yaml_content)
                .with_context(|| format!("Invalid config file {:?}", config_path))?;
            debug!("Loaded tracker config from {:?}", config_path);
            Ok(config)
        } else {
            let config = TrackerConfig::default();
            config.save(config_dir)?;
            info!("Created default tracker config at {:?}", config_path);
            Ok(config)
        }
    }

    pub fn save(&self, config_dir: &Path) -> Result<()> {
        if !config_dir.exists() {
            fs::create_dir_all(config_dir)?;
            info!("Created data directory: {:?}", config_dir);
        }

        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let yaml_content = serde_yaml::to_string(self)?;

        let temp_path = config_path.with_extension("tmp");
        fs::write(&temp_path, yaml_content)?;
        fs::rename(&temp_path, &config_path)?;

        debug!("Saved tracker config to {:?}", config_path);
        Ok(())
    }

    /// Directory holding the state files
    ///
    /// A redirect to a missing directory is ignored so a removed external
    /// drive does not stop the tracker from starting.
    pub fn resolve_data_directory(&self, config_dir: &Path) -> PathBuf {
        match &self.data_directory {
            Some(path) if path.as_os_str().is_empty() => config_dir.to_path_buf(),
            Some(path) if path.is_dir() => {
                info!("Using redirected data directory: {}", path.display());
                path.clone()
            }
            Some(path) => {
                warn!("Configured data directory {} does not exist. Using default.", path.display());
                config_dir.to_path_buf()
            }
            None => config_dir.to_path_buf(),
        }
    }
}

/// `HYDRATION_TRACKER_DATA_DIR`, or `<local data dir>/Hydration Tracker`
pub fn default_data_directory() -> Result<PathBuf> {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV_VAR) {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir.trim()));
        }
    }

    dirs::data_local_dir()
        .map(|dir| dir.join(DEFAULT_DIRECTORY_NAME))
        .ok_or_else(|| anyhow::anyhow!("Could not determine local data directory"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_creates_default_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_dir = temp_dir.path().join("nested");

        let config = TrackerConfig::load_or_create(&config_dir).unwrap();
        assert_eq!(config.retention_days, 30);
        assert_eq!(config.log_filter, "info");
        assert!(config_dir.join(CONFIG_FILE_NAME).exists());

        let reloaded = TrackerConfig::load_or_create(&config_dir).unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(
            temp_dir.path().join(CONFIG_FILE_NAME),
            "retention_days: 7\nstorage_quota_bytes: 4096\n",
        )
        .unwrap();

        let config = TrackerConfig::load_or_create(temp_dir.path()).unwrap();
        assert_eq!(config.retention_days, 7);
        assert_eq!(config.storage_quota_bytes, Some(4096));
        assert_eq!(config.config_version, CONFIG_VERSION);
        assert!(config.data_directory.is_none());
    }

    #[test]
    fn test_invalid_yaml_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(CONFIG_FILE_NAME), "retention_days: [oops").unwrap();
        assert!(TrackerConfig::load_or_create(temp_dir.path()).is_err());
    }

    #[test]
    fn test_resolve_data_directory() {
        let temp_dir = TempDir::new().unwrap();
        let redirect = temp_dir.path().join("elsewhere");
        fs::create_dir_all(&redirect).unwrap();

        let mut config = TrackerConfig::default();
        assert_eq!(config.resolve_data_directory(temp_dir.path()), temp_dir.path());

        config.data_directory = Some(redirect.clone());
        assert_eq!(config.resolve_data_directory(temp_dir.path()), redirect);

        config.data_directory = Some(temp_dir.path().join("missing"));
        assert_eq!(config.resolve_data_directory(temp_dir.path()), temp_dir.path());
    }
}
