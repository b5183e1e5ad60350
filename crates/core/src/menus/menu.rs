//! Menu proxy
//!
//! # Item callbacks
//!
//! ```ignore
//! let menu = system.create_menu(None, None)?;
//! menu.set_title("Shop")?;
//! menu.add_item_callback("Buy AK-47", StyleFlags::DEFAULT, |player, menu, item| {
//!     if let Some(player) = player {
//!         buy(player.slot(), item);
//!     }
//!     let _ = menu.close();
//! })?;
//! menu.display(slot)?;
//! ```
//!
//! A callback runs at most once. Native code passes the registration token
//! back on selection and the trampoline consumes it.

use std::ffi::c_void;
use std::sync::Arc;

use menubridge_engine::ExportTable;
use menubridge_sdk::{IMenuProfile, ItemSelectFn, NativeHandle};
use parking_lot::Mutex;

use crate::callbacks::{self, trampoline};
use crate::error::{MenuError, MenuResult};
use crate::frames;
use crate::native::layouts::MenuTable;
use crate::native::marshal::{from_native, to_native};

use super::player::MenuPlayer;
use super::profiles::Profile;
use super::style::StyleFlags;
use super::system::MenuSystem;

/// Native handler receiving menu lifecycle events
///
/// Only carried through to [`MenuSystem::create_menu`]; the bridge binds no
/// calls on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MenuHandler {
    handle: NativeHandle,
}

impl MenuHandler {
    pub fn from_handle(handle: NativeHandle) -> MenuResult<Self> {
        handle
            .non_null()
            .map(|handle| Self { handle })
            .ok_or(MenuError::NullHandle("IMenuHandler"))
    }

    pub fn handle(&self) -> NativeHandle {
        self.handle
    }
}

struct MenuInner {
    table: MenuTable,
    system: MenuSystem,
    created_at: u64,
    settles_at: u64,
}

/// Proxy for a native `IMenu`
///
/// Clones share bindings and refer to the same native menu. The native side
/// owns the menu; once it destroys it every clone is dangling.
#[derive(Clone)]
pub struct Menu {
    inner: Arc<MenuInner>,
}

impl Menu {
    /// Wrap a native menu created on frame `created_at`
    ///
    /// # Safety
    /// `handle` must be null or point at a live `IMenu` owned by `system`.
    pub unsafe fn from_handle(
        system: MenuSystem,
        handle: NativeHandle,
        created_at: u64,
    ) -> MenuResult<Self> {
        let settles_at = created_at.saturating_add(system.settle_frames());

        Ok(Self {
            inner: Arc::new(MenuInner {
                table: MenuTable::new(handle)?,
                system,
                created_at,
                settles_at,
            }),
        })
    }

    pub fn handle(&self) -> NativeHandle {
        self.inner.table.handle()
    }

    /// The system that created this menu
    pub fn system(&self) -> &MenuSystem {
        &self.inner.system
    }

    fn exports(&self) -> &'static ExportTable {
        self.inner.system.exports()
    }

    /// Frame the menu was created on
    pub fn created_at(&self) -> u64 {
        self.inner.created_at
    }

    /// Check if the native side has had time to finish building the menu
    pub fn is_settled(&self) -> bool {
        frames::frame_count() >= self.inner.settles_at
    }

    /// Profile the menu was created with
    ///
    /// # Errors
    /// [`MenuError::NotSettled`] on the frames right after creation, when
    /// the native profile is still being populated. Use
    /// [`defer_profile`](Self::defer_profile) to read it once it is safe.
    pub fn get_profile(&self) -> MenuResult<Option<Profile>> {
        if !self.is_settled() {
            tracing::debug!(
                "Profile of menu {} requested before frame {}",
                self.handle(),
                self.inner.settles_at
            );
            return Err(MenuError::NotSettled);
        }

        // SAFETY: the menu is live and settled.
        let profile = unsafe { self.inner.table.get_profile() }?;
        match NativeHandle::from_ptr(profile).non_null() {
            // SAFETY: non-null result of IMenu::GetProfile.
            Some(handle) => {
                unsafe { Profile::from_handle(handle, self.inner.settles_at) }.map(Some)
            }
            None => Ok(None),
        }
    }

    /// Run `f` with the menu's profile once reading it is safe
    ///
    /// `f` runs on a later frame, from [`frames::on_game_frame`].
    pub fn defer_profile<F>(&self, f: F) -> MenuResult<()>
    where
        F: FnOnce(MenuResult<Option<Profile>>) + Send + 'static,
    {
        let menu = self.clone();
        frames::queue_task(move || menu.deliver_profile(f))
    }

    fn deliver_profile<F>(self, f: F)
    where
        F: FnOnce(MenuResult<Option<Profile>>) + Send + 'static,
    {
        if self.is_settled() {
            f(self.get_profile());
            return;
        }

        let handle = self.handle();
        let f = Arc::new(Mutex::new(Some(f)));
        let pending = f.clone();
        let queued = frames::queue_task(move || {
            if let Some(f) = pending.lock().take() {
                self.deliver_profile(f);
            }
        });

        if let Err(e) = queued {
            tracing::error!("Could not requeue profile read for menu {}: {}", handle, e);
            if let Some(f) = f.lock().take() {
                f(Err(e));
            }
        }
    }

    /// Apply `profile` to this menu for the player in `slot`
    pub fn apply_profile(&self, slot: i32, profile: &Profile) -> MenuResult<bool> {
        // SAFETY: menu and profile are live native objects.
        unsafe {
            self.inner
                .table
                .apply_profile(slot, profile.handle().as_ptr::<IMenuProfile>())
        }
    }

    /// Native handler the menu was created with
    ///
    /// Handler bindings are not supported: a menu with a handler reports
    /// [`MenuError::Unimplemented`], a menu without one `Ok(None)`.
    pub fn get_handler(&self) -> MenuResult<Option<MenuHandler>> {
        // SAFETY: the menu is live.
        let handler = unsafe { self.inner.table.get_handler() }?;
        if handler.is_null() {
            Ok(None)
        } else {
            Err(MenuError::Unimplemented("IMenu::get_handler"))
        }
    }

    pub fn get_title(&self) -> MenuResult<String> {
        let get_title = self
            .exports()
            .get_title()
            .ok_or(MenuError::ExportUnresolved("Menu_GetTitle"))?;

        // SAFETY: the menu is live; the returned buffer is read before any
        // other call into the menu.
        Ok(unsafe { from_native(get_title(self.handle().as_ptr())) })
    }

    pub fn set_title(&self, title: &str) -> MenuResult<()> {
        let set_title = self
            .exports()
            .set_title()
            .ok_or(MenuError::ExportUnresolved("Menu_SetTitle"))?;

        let title = to_native(title);
        // SAFETY: the menu is live; the native side copies the title.
        unsafe { set_title(self.handle().as_ptr(), title.as_ptr()) };
        Ok(())
    }

    /// Add an item with no selection handler
    ///
    /// Returns the item's index.
    pub fn add_item(&self, text: &str, style: StyleFlags) -> MenuResult<i32> {
        // SAFETY: no handler is installed.
        unsafe { self.add_item_native(text, style, None, std::ptr::null_mut()) }
    }

    /// Add an item with a native selection handler
    ///
    /// # Safety
    /// `handler` must stay callable and `data` valid for as long as the
    /// native menu may fire the item.
    pub unsafe fn add_item_native(
        &self,
        text: &str,
        style: StyleFlags,
        handler: Option<ItemSelectFn>,
        data: *mut c_void,
    ) -> MenuResult<i32> {
        let add_item = self
            .exports()
            .add_item()
            .ok_or(MenuError::ExportUnresolved("Menu_AddItem"))?;

        let content = to_native(text);
        let index = add_item(self.handle().as_ptr(), style.bits(), content.as_ptr(), handler, data);

        if index < 0 {
            tracing::warn!("Menu {} rejected item '{}' ({})", self.handle(), text, index);
            return Err(MenuError::ItemRejected(index));
        }
        Ok(index)
    }

    /// Add an item whose selection runs `callback`
    ///
    /// The callback receives the acting player (if the slot still resolves
    /// to one), this menu, and the selected item index. It runs at most once;
    /// if the native side rejects the item it never runs and is dropped
    /// immediately.
    pub fn add_item_callback<F>(
        &self,
        text: &str,
        style: StyleFlags,
        callback: F,
    ) -> MenuResult<i32>
    where
        F: FnOnce(Option<MenuPlayer>, &Menu, i32) + Send + 'static,
    {
        if !self.exports().has_add_item() {
            return Err(MenuError::ExportUnresolved("Menu_AddItem"));
        }

        let token = callbacks::register(self, Box::new(callback));

        // SAFETY: the trampoline is valid for the process lifetime and the
        // token stays registered until it fires or is released.
        let result = unsafe {
            self.add_item_native(
                text,
                style,
                Some(trampoline::on_item_selected),
                token.as_ptr(),
            )
        };

        if result.is_err() && callbacks::release(token) {
            tracing::warn!("Released callback {:?} of rejected item '{}'", token, text);
        }
        result
    }

    /// Item position the player in `slot` is viewing
    pub fn get_current_position(&self, slot: i32) -> MenuResult<i32> {
        // SAFETY: the menu is live.
        unsafe { self.inner.table.get_current_position(slot) }
    }

    pub fn has_get_current_position(&self) -> bool {
        self.inner.table.has_get_current_position()
    }

    /// Show this menu to the player in `slot`
    pub fn display(&self, slot: i32) -> MenuResult<bool> {
        self.inner.system.display(self, slot)
    }

    /// Close this menu
    pub fn close(&self) -> MenuResult<bool> {
        self.inner.system.close(self)
    }

    /// Number of item callbacks on this menu that have not fired
    pub fn pending_callbacks(&self) -> usize {
        callbacks::pending_for(self.handle())
    }

    /// Drop every not-yet-fired callback of this menu
    ///
    /// Later selections of those items do nothing. Returns the number
    /// released.
    pub fn release_callbacks(&self) -> usize {
        callbacks::release_for(self.handle())
    }
}

impl PartialEq for Menu {
    fn eq(&self, other: &Self) -> bool {
        self.handle() == other.handle()
    }
}

impl Eq for Menu {}

impl std::fmt::Debug for Menu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Menu")
            .field("handle", &self.handle())
            .field("created_at", &self.inner.created_at)
            .finish()
    }
}
