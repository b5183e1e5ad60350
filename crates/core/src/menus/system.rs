//! Menu system proxy
//!
//! The menu system is the singleton the native library exposes through the
//! Metamod factory. It creates menus, shows them to players and hands out the
//! profile system.

use std::ptr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use menubridge_engine::{BridgeGlobals, ExportTable};
use menubridge_sdk::{IMenuHandler, IMenuProfile, NativeHandle};
use parking_lot::RwLock;

use crate::error::{MenuError, MenuResult};
use crate::frames;
use crate::native::layouts::SystemTable;

use super::menu::{Menu, MenuHandler};
use super::player::{is_valid_slot, MenuPlayer};
use super::profiles::{self, Profile, ProfileSystem, DEFAULT_PROFILE};

/// Extra player validity check installed by the host
pub type PlayerFilter = Box<dyn Fn(i32) -> bool + Send + Sync>;

struct SystemInner {
    table: SystemTable,
    exports: &'static ExportTable,
    settle_frames: AtomicU64,
    player_filter: RwLock<Option<PlayerFilter>>,
}

/// Proxy for the native `IMenuSystem` singleton
///
/// Cheap to clone; clones share bindings and settings.
#[derive(Clone)]
pub struct MenuSystem {
    inner: Arc<SystemInner>,
}

impl MenuSystem {
    /// Wrap a native menu system
    ///
    /// # Safety
    /// `handle` must be null or point at a live `IMenuSystem` that outlives
    /// the proxy, and `exports` must belong to the library implementing it.
    pub unsafe fn from_handle(
        handle: NativeHandle,
        exports: &'static ExportTable,
    ) -> MenuResult<Self> {
        Ok(Self {
            inner: Arc::new(SystemInner {
                table: SystemTable::new(handle)?,
                exports,
                settle_frames: AtomicU64::new(1),
                player_filter: RwLock::new(None),
            }),
        })
    }

    /// Wrap the singleton found during bootstrap
    pub fn from_bridge(globals: &'static BridgeGlobals) -> MenuResult<Self> {
        // SAFETY: the bootstrap singleton lives for the whole process.
        unsafe { Self::from_handle(globals.system_handle(), globals.exports) }
    }

    pub fn handle(&self) -> NativeHandle {
        self.inner.table.handle()
    }

    /// Library exports used by menus of this system
    pub fn exports(&self) -> &'static ExportTable {
        self.inner.exports
    }

    /// Frames a new menu waits before its profile may be read
    pub fn settle_frames(&self) -> u64 {
        self.inner.settle_frames.load(Ordering::Relaxed)
    }

    pub fn set_settle_frames(&self, frames: u64) {
        self.inner.settle_frames.store(frames, Ordering::Relaxed);
    }

    /// Install a filter consulted before a slot resolves to a player
    ///
    /// # Example
    ///
    /// ```ignore
    /// system.set_player_filter(|slot| is_client_connected(slot));
    /// ```
    pub fn set_player_filter<F>(&self, filter: F)
    where
        F: Fn(i32) -> bool + Send + Sync + 'static,
    {
        *self.inner.player_filter.write() = Some(Box::new(filter));
    }

    pub fn clear_player_filter(&self) {
        *self.inner.player_filter.write() = None;
    }

    /// Native player object for `slot`, possibly null
    pub fn get_player_handle(&self, slot: i32) -> MenuResult<NativeHandle> {
        // SAFETY: the system outlives its proxies.
        let player = unsafe { self.inner.table.get_player(slot) }?;
        Ok(NativeHandle::from_ptr(player))
    }

    /// Resolve `slot` to a player
    ///
    /// Returns `None` for out-of-range slots, slots rejected by the player
    /// filter, and slots with no native player object.
    pub fn get_player(&self, slot: i32) -> Option<MenuPlayer> {
        if !is_valid_slot(slot) {
            return None;
        }

        if let Some(filter) = self.inner.player_filter.read().as_ref() {
            if !filter(slot) {
                return None;
            }
        }

        match self.get_player_handle(slot) {
            Ok(handle) => handle.non_null().map(|h| MenuPlayer::new(slot, h)),
            Err(e) => {
                tracing::debug!("Player lookup for slot {} failed: {}", slot, e);
                None
            }
        }
    }

    /// Get the profile system
    ///
    /// # Errors
    /// [`MenuError::NullResult`] if the native side returns no profile system.
    pub fn get_profile_system(&self) -> MenuResult<ProfileSystem> {
        // SAFETY: the system outlives its proxies.
        let profiles = unsafe { self.inner.table.get_profiles() }?;
        let handle = NativeHandle::from_ptr(profiles)
            .non_null()
            .ok_or(MenuError::NullResult("IMenuSystem::get_profiles"))?;

        // SAFETY: non-null result of IMenuSystem::GetProfiles.
        unsafe { ProfileSystem::from_handle(handle) }
    }

    /// Look up a profile by name through the profile system
    pub fn get_profile(&self, name: &str) -> MenuResult<Option<Profile>> {
        self.get_profile_system()?.get_profile(name)
    }

    /// Create a menu
    ///
    /// Without an explicit profile the `"default"` profile is used; creating a
    /// menu with no profile at all faults inside the native library, so a
    /// missing default profile is reported as [`MenuError::NullResult`].
    pub fn create_menu(
        &self,
        profile: Option<&Profile>,
        handler: Option<&MenuHandler>,
    ) -> MenuResult<Menu> {
        let fallback;
        let profile = match profile {
            Some(profile) => profile,
            None => {
                fallback = self
                    .get_profile(DEFAULT_PROFILE)?
                    .ok_or(MenuError::NullResult("IMenuProfileSystem::get_profile(\"default\")"))?;
                &fallback
            }
        };

        let handler_ptr = handler
            .map(|h| h.handle().as_ptr::<IMenuHandler>())
            .unwrap_or(ptr::null_mut());

        // SAFETY: profile and handler are live native objects or null.
        let menu = unsafe {
            self.inner
                .table
                .create_instance(profile.handle().as_ptr::<IMenuProfile>(), handler_ptr)
        }?;

        let handle = NativeHandle::from_ptr(menu)
            .non_null()
            .ok_or(MenuError::NullResult("IMenuSystem::create_instance"))?;

        let created_at = frames::frame_count();
        tracing::debug!("Created menu {} on frame {}", handle, created_at);
        profiles::hold_until(
            profile.handle(),
            created_at.saturating_add(self.settle_frames()),
        );

        // SAFETY: non-null result of IMenuSystem::CreateInstance.
        unsafe { Menu::from_handle(self.clone(), handle, created_at) }
    }

    /// Show `menu` to the player in `slot` from the first item
    pub fn display(&self, menu: &Menu, slot: i32) -> MenuResult<bool> {
        self.display_from(menu, slot, 0, 0)
    }

    /// Show `menu` to the player in `slot`
    ///
    /// # Arguments
    /// * `start_item` - Item the first page starts at
    /// * `display_time` - Seconds before the menu closes itself (0 = never)
    pub fn display_from(
        &self,
        menu: &Menu,
        slot: i32,
        start_item: i32,
        display_time: i32,
    ) -> MenuResult<bool> {
        // SAFETY: `menu` is a live menu of this system.
        unsafe {
            self.inner.table.display_instance_to_player(
                menu.handle().as_ptr(),
                slot,
                start_item,
                display_time,
            )
        }
    }

    /// Close `menu` for every player viewing it
    pub fn close(&self, menu: &Menu) -> MenuResult<bool> {
        // SAFETY: `menu` is a live menu of this system.
        unsafe { self.inner.table.close_instance(menu.handle().as_ptr()) }
    }

    pub fn has_get_player(&self) -> bool {
        self.inner.table.has_get_player()
    }

    pub fn has_create_instance(&self) -> bool {
        self.inner.table.has_create_instance()
    }
}

impl std::fmt::Debug for MenuSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MenuSystem")
            .field("handle", &self.handle())
            .field("exports", self.inner.exports)
            .finish()
    }
}
