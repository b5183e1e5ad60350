//! Config path resolution
//!
//! Handles resolving paths for configuration and gamedata files relative to
//! the game directory the host reports.

use std::path::{Path, PathBuf};

/// Returns the bridge base directory.
///
/// Path: `<game>/csgo/addons/menu_bridge/`
pub fn bridge_base_dir(game_dir: &Path) -> PathBuf {
    game_dir.join("csgo").join("addons").join("menu_bridge")
}

/// Returns the configs directory.
///
/// Path: `<game>/csgo/addons/menu_bridge/configs/`
pub fn configs_dir(game_dir: &Path) -> PathBuf {
    bridge_base_dir(game_dir).join("configs")
}

/// Returns the bridge config path.
///
/// Path: `<game>/csgo/addons/menu_bridge/configs/core.toml`
pub fn core_config_path(game_dir: &Path) -> PathBuf {
    configs_dir(game_dir).join("core.toml")
}

/// Returns the gamedata path.
///
/// Path: `<game>/csgo/addons/menu_bridge/gamedata/gamedata.json`
pub fn gamedata_path(game_dir: &Path) -> PathBuf {
    bridge_base_dir(game_dir).join("gamedata").join("gamedata.json")
}

/// Append the platform's shared library suffix to `stem`
pub fn library_file_name(stem: &str) -> String {
    if cfg!(target_os = "windows") {
        format!("{}.dll", stem)
    } else if cfg!(target_os = "macos") {
        format!("{}.dylib", stem)
    } else {
        format!("{}.so", stem)
    }
}
