//! Gamedata system for overriding vtable slot indices from JSON
//!
//! Slot indices are compiled into the bindings, but a menu system update can
//! shift them. A gamedata.json deployed with the plugin overrides individual
//! slots without recompiling.
//!
//! # Format
//!
//! ```json
//! {
//!     "IMenuSystem::display_instance_to_player": {
//!         "offsets": { "linux": 13, "windows": 13 }
//!     },
//!     "IMenu::get_current_position": { "linux": 9, "windows": 9 }
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading gamedata
#[derive(Debug, Error)]
pub enum GamedataError {
    #[error("Failed to read gamedata file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse gamedata JSON: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Offset not found: {0}")]
    OffsetNotFound(String),

    #[error("Invalid offset for {0}: {1}")]
    InvalidOffset(String, i64),

    #[error("Gamedata already initialized")]
    AlreadyInitialized,
}

/// Platform-specific offset entry
#[derive(Debug, Deserialize)]
pub struct OffsetEntry {
    /// Windows offset value
    pub windows: Option<i64>,
    /// Linux offset value
    pub linux: Option<i64>,
}

/// Loaded gamedata
#[derive(Debug, Default)]
pub struct Gamedata {
    offsets: HashMap<String, OffsetEntry>,
}

/// Global gamedata instance
static GAMEDATA: OnceLock<Gamedata> = OnceLock::new();

impl Gamedata {
    /// Load gamedata from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, GamedataError> {
        let content = std::fs::read_to_string(path)?;
        Self::load_from_str(&content)
    }

    /// Load gamedata from a JSON string
    pub fn load_from_str(json: &str) -> Result<Self, GamedataError> {
        let raw: HashMap<String, serde_json::Value> = serde_json::from_str(json)?;

        let mut gamedata = Gamedata::default();

        for (name, value) in raw {
            // Check if it has "offsets" key
            if let Some(offsets) = value.get("offsets") {
                let entry: OffsetEntry = serde_json::from_value(offsets.clone())?;
                gamedata.offsets.insert(name, entry);
            }
            // Assume it's an offset entry directly
            else if value.get("linux").is_some() || value.get("windows").is_some() {
                let entry: OffsetEntry = serde_json::from_value(value)?;
                gamedata.offsets.insert(name, entry);
            } else {
                tracing::debug!("Ignoring gamedata entry without offsets: {}", name);
            }
        }

        tracing::info!("Loaded gamedata: {} offsets", gamedata.offsets.len());

        Ok(gamedata)
    }

    /// Get an offset by name for the current platform
    pub fn get_offset(&self, name: &str) -> Result<i64, GamedataError> {
        let entry = self
            .offsets
            .get(name)
            .ok_or_else(|| GamedataError::OffsetNotFound(name.to_string()))?;

        #[cfg(target_os = "linux")]
        let offset = entry.linux;

        #[cfg(target_os = "windows")]
        let offset = entry.windows;

        #[cfg(not(any(target_os = "linux", target_os = "windows")))]
        let offset: Option<i64> = None;

        offset.ok_or_else(|| {
            GamedataError::OffsetNotFound(format!("{} (no offset for this platform)", name))
        })
    }

    /// Get a vtable slot index for `Interface::method`
    pub fn get_slot(&self, interface: &str, method: &str) -> Result<usize, GamedataError> {
        let key = format!("{}::{}", interface, method);
        let offset = self.get_offset(&key)?;
        usize::try_from(offset).map_err(|_| GamedataError::InvalidOffset(key, offset))
    }

    /// Number of loaded offsets
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// Check if no offsets were loaded
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}

/// Initialize global gamedata from file
pub fn init_gamedata<P: AsRef<Path>>(path: P) -> Result<(), GamedataError> {
    let gd = Gamedata::load_from_file(path)?;
    GAMEDATA
        .set(gd)
        .map_err(|_| GamedataError::AlreadyInitialized)
}

/// Get the global gamedata instance
pub fn gamedata() -> Option<&'static Gamedata> {
    GAMEDATA.get()
}

/// Slot override for `Interface::method`, if gamedata provides one
pub(crate) fn slot_override(interface: &str, method: &str) -> Option<usize> {
    let slot = gamedata()?.get_slot(interface, method).ok()?;
    tracing::debug!("Gamedata slot override {}::{} -> {}", interface, method, slot);
    Some(slot)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_nested_and_flat_offsets() {
        let json = r#"{
            "IMenuSystem::display_instance_to_player": {
                "offsets": { "linux": 15, "windows": 16 }
            },
            "IMenu::get_current_position": { "linux": 11, "windows": 12 },
            "Comment": { "note": "ignored" }
        }"#;

        let gd = Gamedata::load_from_str(json).unwrap();
        assert_eq!(gd.len(), 2);

        #[cfg(target_os = "linux")]
        {
            assert_eq!(
                gd.get_slot("IMenuSystem", "display_instance_to_player").unwrap(),
                15
            );
            assert_eq!(gd.get_slot("IMenu", "get_current_position").unwrap(), 11);
        }

        #[cfg(target_os = "windows")]
        {
            assert_eq!(
                gd.get_slot("IMenuSystem", "display_instance_to_player").unwrap(),
                16
            );
        }
    }

    #[test]
    fn test_missing_offset() {
        let gd = Gamedata::load_from_str("{}").unwrap();
        assert!(gd.is_empty());
        assert!(matches!(
            gd.get_slot("IMenu", "get_profile"),
            Err(GamedataError::OffsetNotFound(_))
        ));
    }

    #[test]
    fn test_negative_offset_rejected() {
        let json = r#"{ "IMenu::get_profile": { "linux": -1, "windows": -1 } }"#;
        let gd = Gamedata::load_from_str(json).unwrap();
        assert!(matches!(
            gd.get_slot("IMenu", "get_profile"),
            Err(GamedataError::InvalidOffset(_, -1))
        ));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            Gamedata::load_from_str("not json"),
            Err(GamedataError::ParseError(_))
        ));
    }
}
