//! Configuration for the menu bridge
//!
//! This module provides the bridge's TOML configuration:
//! - Type-safe config struct via serde
//! - Auto-generation of a default config file
//! - Manual reload capability
//!
//! # Example
//!
//! ```ignore
//! use menubridge_core::BridgeConfig;
//!
//! let config = BridgeConfig::load(game_dir).unwrap_or_default();
//! let library = config.library_path(game_dir);
//! ```

mod loader;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub use loader::{bridge_base_dir, configs_dir, core_config_path, gamedata_path, library_file_name};

/// Configuration system errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read or write config file
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML content
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Failed to serialize config to TOML
    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),
}

/// Result type for config operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Bridge configuration.
///
/// Loaded from:
/// `<game>/csgo/addons/menu_bridge/configs/core.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Config version for future migration support
    pub version: u32,

    /// Enable debug logging
    pub debug: bool,

    /// Factory version string of the menu system interface
    pub factory_version: String,

    /// Explicit menu library path, overriding `library_dir`/`library_stem`
    pub library_path: Option<PathBuf>,

    /// Menu library directory, relative to `<game>/csgo`
    pub library_dir: String,

    /// Menu library file name without platform suffix
    pub library_stem: String,

    /// Frames a new menu must survive before its profile may be read
    pub settle_frames: u64,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            version: 1,
            debug: false,
            factory_version: "Menu System v1.0.0".to_string(),
            library_path: None,
            library_dir: "addons/menu_system/bin".to_string(),
            library_stem: "menu".to_string(),
            settle_frames: 1,
        }
    }
}

impl BridgeConfig {
    /// Load config from file, creating default if missing.
    pub fn load(game_dir: &Path) -> ConfigResult<Self> {
        let path = core_config_path(game_dir);

        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            let config: Self = toml::from_str(&content)?;
            tracing::debug!("Loaded bridge config from {:?}", path);
            Ok(config)
        } else {
            let default = Self::default();
            default.save(game_dir)?;
            tracing::info!("Created default bridge config at {:?}", path);
            Ok(default)
        }
    }

    /// Save config to file.
    ///
    /// Creates parent directories if they don't exist.
    pub fn save(&self, game_dir: &Path) -> ConfigResult<()> {
        let path = core_config_path(game_dir);

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&path, content)?;
        tracing::debug!("Saved bridge config to {:?}", path);
        Ok(())
    }

    /// Reload config from file.
    pub fn reload(&mut self, game_dir: &Path) -> ConfigResult<()> {
        let path = core_config_path(game_dir);
        let content = std::fs::read_to_string(&path)?;
        *self = toml::from_str(&content)?;
        tracing::debug!("Reloaded bridge config from {:?}", path);
        Ok(())
    }

    /// Factory version as a NUL-terminated byte string
    pub fn factory_version_bytes(&self) -> Vec<u8> {
        let mut bytes: Vec<u8> = self
            .factory_version
            .bytes()
            .take_while(|&b| b != 0)
            .collect();
        bytes.push(0);
        bytes
    }

    /// Resolve the menu library path for this platform
    pub fn library_path(&self, game_dir: &Path) -> PathBuf {
        match &self.library_path {
            Some(path) => path.clone(),
            None => game_dir
                .join("csgo")
                .join(&self.library_dir)
                .join(library_file_name(&self.library_stem)),
        }
    }
}
