//! Menu system interface type definitions
//!
//! These are opaque types representing C++ menu system interfaces.
//! We don't need their internal structure - just pointers.
//! Virtual functions are called through the core crate's vtable invoker.

use std::ffi::{c_char, c_int, c_void};

/// Opaque type for IMenuSystem
/// The menu system singleton, acquired through the Metamod factory
#[repr(C)]
pub struct IMenuSystem {
    _opaque: [u8; 0],
}

/// Opaque type for IMenuProfileSystem
/// Registry of named display profiles
#[repr(C)]
pub struct IMenuProfileSystem {
    _opaque: [u8; 0],
}

/// Opaque type for IMenuProfile
/// Display metadata applied to a menu
#[repr(C)]
pub struct IMenuProfile {
    _opaque: [u8; 0],
}

/// Opaque type for IMenu
/// A single menu instance
#[repr(C)]
pub struct IMenu {
    _opaque: [u8; 0],
}

/// Opaque type for IMenuHandler
/// Native-side handler receiving menu lifecycle events
#[repr(C)]
pub struct IMenuHandler {
    _opaque: [u8; 0],
}

/// Metamod factory function signature
///
/// # Arguments
/// * `name` - Interface version string (e.g., "Menu System v1.0.0")
/// * `return_code` - Optional pointer to receive error code (0 = success)
/// * `plugin_id` - Optional pointer to receive the owning plugin id
///
/// # Returns
/// Pointer to the interface, or null if not found
pub type MetaFactoryFn = unsafe extern "C" fn(
    name: *const c_char,
    return_code: *mut c_int,
    plugin_id: *mut c_int,
) -> *mut c_void;

/// Item selection callback
///
/// Invoked by the menu system when a player picks an item:
/// `(menu, player_slot, item_index, item_on_page, data)`
pub type ItemSelectFn = extern "C" fn(
    menu: *mut IMenu,
    player_slot: c_int,
    item_index: c_int,
    item_on_page: c_int,
    data: *mut c_void,
);

/// `Menu_AddItem` export
///
/// Returns the new item index, or a negative value if the item was rejected.
pub type MenuAddItemFn = unsafe extern "C" fn(
    menu: *mut IMenu,
    style_flags: u8,
    content: *const c_char,
    handler: Option<ItemSelectFn>,
    data: *mut c_void,
) -> c_int;

/// `Menu_GetTitle` export
///
/// Returns a UTF-8 buffer owned by the menu, or null.
pub type MenuGetTitleFn = unsafe extern "C" fn(menu: *mut IMenu) -> *const c_char;

/// `Menu_SetTitle` export
pub type MenuSetTitleFn = unsafe extern "C" fn(menu: *mut IMenu, title: *const c_char);
