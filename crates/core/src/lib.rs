//! Menu Bridge - Core Logic
//!
//! Typed access to the native menu system for Rust plugins:
//! - [`menus`] - proxies for the menu system, profiles and menus
//! - [`callbacks`] - closure registry behind callback-style menu items
//! - [`native`] - vtable invocation and text marshaling
//! - [`frames`] - frame clock and deferred calls
//!
//! # Re-exports
//!
//! This crate re-exports the SDK and engine crates for convenience:
//! - [`sdk`] - Native interface types and export names
//! - [`engine`] - Library loading and process-wide globals
//!
//! # Example
//!
//! ```ignore
//! let system = unsafe { menubridge_core::init(factory, &config, game_dir) }?;
//! let menu = system.create_menu(None, None)?;
//! menu.set_title("Vote")?;
//! menu.add_item_callback("Yes", StyleFlags::DEFAULT, |player, _, _| count_vote(player))?;
//! menu.display(slot)?;
//! ```

use std::path::Path;
use std::sync::OnceLock;

use tracing::info;

pub use menubridge_engine as engine;
pub use menubridge_sdk as sdk;

pub mod boundary;
pub mod callbacks;
pub mod config;
pub mod error;
pub mod frames;
pub mod gamedata;
pub mod menus;
pub mod native;

#[cfg(test)]
pub(crate) mod testing;

use menubridge_sdk::MetaFactoryFn;

pub use boundary::{boundary, try_boundary};
pub use callbacks::{pending_count, release_all, CallbackToken};
pub use config::{BridgeConfig, ConfigError, ConfigResult};
pub use error::{MenuError, MenuResult};
pub use frames::{frame_count, on_game_frame, queue_task};
pub use gamedata::{Gamedata, GamedataError};
pub use menus::{
    Menu, MenuHandler, MenuPlayer, MenuSystem, Profile, ProfileSystem, StyleFlags, MAX_PLAYERS,
};

/// Process-wide menu system proxy
static SYSTEM: OnceLock<MenuSystem> = OnceLock::new();

/// Connect to the native menu system
///
/// Loads gamedata overrides (if deployed), looks up the menu system through
/// `factory` and loads the menu library. Runs once; later calls return the
/// first outcome.
///
/// # Safety
/// `factory` must be the host's Metamod factory and the configured menu
/// library trusted.
#[tracing::instrument(skip_all)]
pub unsafe fn init(
    factory: MetaFactoryFn,
    config: &BridgeConfig,
    game_dir: &Path,
) -> MenuResult<MenuSystem> {
    if let Some(system) = SYSTEM.get() {
        return Ok(system.clone());
    }

    let gamedata_path = config::gamedata_path(game_dir);
    if gamedata_path.exists() {
        match gamedata::init_gamedata(&gamedata_path) {
            Ok(()) => info!("Loaded gamedata from {:?}", gamedata_path),
            Err(GamedataError::AlreadyInitialized) => {}
            Err(e) => tracing::warn!("Ignoring gamedata: {}", e),
        }
    }

    let library_path = config.library_path(game_dir);
    let version = config.factory_version_bytes();
    let globals = engine::bootstrap(factory, &version, Some(&library_path))?;

    let system = MenuSystem::from_bridge(globals)?;
    system.set_settle_frames(config.settle_frames);

    Ok(SYSTEM.get_or_init(|| system).clone())
}

/// Get the menu system connected by [`init`]
///
/// # Errors
/// [`MenuError::DependencyMissing`] if the menu system is not available.
pub fn menu_system() -> MenuResult<MenuSystem> {
    SYSTEM
        .get()
        .cloned()
        .ok_or_else(|| MenuError::DependencyMissing("menu system not initialized".to_string()))
}

/// Check if menus can be created
pub fn is_available() -> bool {
    SYSTEM.get().is_some()
}

/// Shutdown the bridge
///
/// Called when the host unloads the plugin. Pending item callbacks are
/// dropped since their menus can no longer fire.
pub fn shutdown() {
    info!("Menu bridge shutting down...");
    release_all();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use crate::callbacks::trampoline::on_item_selected;
    use crate::testing::FakeMenuSystem;

    #[test]
    fn test_sdk_types_exist() {
        use crate::sdk::IMenuSystem;
        let _: *const IMenuSystem = std::ptr::null();
    }

    #[test]
    fn test_menu_system_before_init() {
        if !is_available() {
            assert!(matches!(menu_system(), Err(MenuError::DependencyMissing(_))));
        }
    }

    #[test]
    fn test_end_to_end_menu_flow() {
        let fake = FakeMenuSystem::new();
        let system = fake.menu_system();

        let profiles = system.get_profile_system().unwrap();
        let profile = profiles.get_profile("default").unwrap().expect("default profile");

        let menu = system.create_menu(Some(&profile), None).unwrap();
        menu.set_title("T").unwrap();
        assert_eq!(menu.get_title().unwrap(), "T");

        let fired = Arc::new(AtomicUsize::new(usize::MAX));
        let record = fired.clone();
        let index = menu
            .add_item_callback("A", StyleFlags::DEFAULT, move |_, _, item| {
                record.store(item as usize, Ordering::SeqCst);
            })
            .unwrap();
        assert_eq!(index, 0);

        // Fire the trampoline directly, the way the native library would
        let token = fake.item_data(menu.handle(), 0);
        on_item_selected(menu.handle().as_ptr(), 0, 0, 0, token);

        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert_eq!(menu.pending_callbacks(), 0);
    }

    #[test]
    fn test_callback_panic_stays_inside_bridge() {
        let fake = FakeMenuSystem::new();
        let menu = fake.menu_system().create_menu(None, None).unwrap();

        menu.add_item_callback("Boom", StyleFlags::DEFAULT, |_, _, _| {
            panic!("handler failed")
        })
        .unwrap();

        assert!(fake.select(menu.handle(), 0, 0));
        assert_eq!(menu.pending_callbacks(), 0);
    }
}
