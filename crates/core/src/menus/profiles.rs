//! Profile system and profile proxies
//!
//! A profile is a named set of display metadata applied to menus. Profiles
//! are owned by the native profile system; proxies here only hold handles.

use std::collections::HashMap;
use std::ffi::c_void;
use std::sync::LazyLock;

use menubridge_sdk::NativeHandle;
use parking_lot::Mutex;

use crate::error::{MenuError, MenuResult};
use crate::frames;
use crate::native::layouts::{ProfileSystemTable, ProfileTable};
use crate::native::marshal::{from_string_object, to_native};

/// Name of the profile every menu system registers
pub const DEFAULT_PROFILE: &str = "default";

/// Profiles recently handed to a new menu, with the frame they settle at
static HELD: LazyLock<Mutex<HashMap<NativeHandle, u64>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// Refuse reads of the profile at `handle` before frame `settles_at`
///
/// Applies to every proxy of that native profile, however it was obtained.
pub(crate) fn hold_until(handle: NativeHandle, settles_at: u64) {
    let mut held = HELD.lock();
    let entry = held.entry(handle).or_insert(settles_at);
    *entry = (*entry).max(settles_at);
}

/// Frame the profile at `handle` is held until, or 0
fn held_until(handle: NativeHandle) -> u64 {
    let now = frames::frame_count();
    let mut held = HELD.lock();
    match held.get(&handle) {
        Some(&settles_at) if settles_at > now => settles_at,
        Some(_) => {
            held.remove(&handle);
            0
        }
        None => 0,
    }
}

/// Registry of named display profiles
pub struct ProfileSystem {
    table: ProfileSystemTable,
}

impl ProfileSystem {
    /// Wrap a native profile system
    ///
    /// # Safety
    /// `handle` must be null or point at a live `IMenuProfileSystem`.
    pub unsafe fn from_handle(handle: NativeHandle) -> MenuResult<Self> {
        Ok(Self {
            table: ProfileSystemTable::new(handle)?,
        })
    }

    pub fn handle(&self) -> NativeHandle {
        self.table.handle()
    }

    /// Look up a profile by name
    ///
    /// Returns `Ok(None)` when no profile with that name is registered.
    pub fn get_profile(&self, name: &str) -> MenuResult<Option<Profile>> {
        let name = to_native(name);
        // SAFETY: the profile system outlives every proxy handed out for it.
        let profile = unsafe { self.table.get_profile(name.as_ptr()) }?;

        match NativeHandle::from_ptr(profile).non_null() {
            // SAFETY: non-null result of IMenuProfileSystem::GetProfile.
            Some(handle) => unsafe { Profile::from_handle(handle, 0) }.map(Some),
            None => Ok(None),
        }
    }

    /// Get the profile named [`DEFAULT_PROFILE`]
    pub fn get_default_profile(&self) -> MenuResult<Option<Profile>> {
        self.get_profile(DEFAULT_PROFILE)
    }

    /// Register `data` under `name`, replacing any existing profile
    ///
    /// # Safety
    /// `data` must be a profile key-values object allocated with the
    /// allocator from [`get_allocator_handle`](Self::get_allocator_handle).
    /// Ownership passes to the native side.
    pub unsafe fn add_or_replace_profile(&self, name: &str, data: NativeHandle) -> MenuResult<()> {
        let name = to_native(name);
        self.table
            .add_or_replace_profile(name.as_ptr(), data.as_ptr::<c_void>())
    }

    /// Allocator for profile key-values data
    pub fn get_allocator_handle(&self) -> MenuResult<NativeHandle> {
        // SAFETY: the profile system outlives every proxy handed out for it.
        let allocator = unsafe { self.table.get_entity_key_values_allocator() }?;
        Ok(NativeHandle::from_ptr(allocator))
    }

    pub fn has_get_profile(&self) -> bool {
        self.table.has_get_profile()
    }
}

/// Display metadata of a menu
///
/// A profile used by a freshly created menu is not safe to query until the
/// native side has finished populating the menu. Until that frame the
/// accessors of every proxy for that profile fail with
/// [`MenuError::NotSettled`].
pub struct Profile {
    table: ProfileTable,
    settles_at: u64,
}

impl Profile {
    /// Wrap a native profile
    ///
    /// # Safety
    /// `handle` must be null or point at a live `IMenuProfile`.
    pub unsafe fn from_handle(handle: NativeHandle, settles_at: u64) -> MenuResult<Self> {
        Ok(Self {
            table: ProfileTable::new(handle)?,
            settles_at,
        })
    }

    pub fn handle(&self) -> NativeHandle {
        self.table.handle()
    }

    /// First frame the profile's accessors may be called on
    pub fn settles_at(&self) -> u64 {
        self.settles_at.max(held_until(self.handle()))
    }

    /// Check if the profile's accessors may be called this frame
    pub fn is_settled(&self) -> bool {
        frames::frame_count() >= self.settles_at()
    }

    fn ensure_settled(&self) -> MenuResult<()> {
        if self.is_settled() {
            Ok(())
        } else {
            tracing::debug!(
                "Profile {} read before frame {} (now {})",
                self.handle(),
                self.settles_at(),
                frames::frame_count()
            );
            Err(MenuError::NotSettled)
        }
    }

    /// Name shown in the menu header
    pub fn display_name(&self) -> MenuResult<String> {
        self.ensure_settled()?;
        // SAFETY: settled profiles are fully constructed on the native side.
        let text = unsafe { self.table.get_display_name() }?;
        Ok(unsafe { from_string_object(text) })
    }

    /// Profile description
    pub fn description(&self) -> MenuResult<String> {
        self.ensure_settled()?;
        // SAFETY: settled profiles are fully constructed on the native side.
        let text = unsafe { self.table.get_description() }?;
        Ok(unsafe { from_string_object(text) })
    }
}

impl std::fmt::Debug for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Profile")
            .field("handle", &self.handle())
            .field("settles_at", &self.settles_at)
            .finish()
    }
}
