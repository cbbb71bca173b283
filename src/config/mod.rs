//! Configuration management for Dandelion

pub mod schema;

pub use schema::{Config, Profile};

use crate::error::{DandelionError, DandelionResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("dandelion")
            .join("config.toml")
    }

    /// Load configuration, falling back to the profile defaults if the file is missing
    pub async fn load(&self, profile: Option<Profile>) -> DandelionResult<Config> {
        let mut config = if self.config_path.exists() {
            self.load_from_file(&self.config_path).await?
        } else {
            debug!("Config file not found, using defaults");
            Config::for_profile(profile.unwrap_or_default())
        };

        // An explicit profile replaces only the profile-driven toggles
        if let Some(profile) = profile {
            if profile != config.profile {
                debug!("Switching profile to {:?}", profile);
                let defaults = Config::for_profile(profile);
                config.profile = profile;
                config.asset.minification = defaults.asset.minification;
                config.asset.caching = defaults.asset.caching;
                config.asset.merging = defaults.asset.merging;
            }
        }

        Ok(config)
    }

    /// Load configuration from a specific file
    pub async fn load_from_file(&self, path: &Path) -> DandelionResult<Config> {
        let content = fs::read_to_string(path).await.map_err(|e| {
            DandelionError::io(format!("reading config from {}", path.display()), e)
        })?;

        let config: Config =
            toml::from_str(&content).map_err(|e| DandelionError::ConfigInvalid {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Save configuration to file
    pub async fn save(&self, config: &Config) -> DandelionResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                DandelionError::io(format!("creating directory {}", parent.display()), e)
            })?;
        }

        let content = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, content).await.map_err(|e| {
            DandelionError::io(
                format!("writing config to {}", self.config_path.display()),
                e,
            )
        })?;

        info!("Configuration saved to {}", self.config_path.display());
        Ok(())
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}
