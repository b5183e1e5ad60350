//! Virtual table layouts of the menu system interfaces
//!
//! Every slot index the bridge calls lives here. Indices can be overridden
//! per platform through gamedata (`"IMenu::get_current_position"` etc.).

use std::ffi::{c_char, c_int, c_void};

use menubridge_sdk::{IMenu, IMenuHandler, IMenuProfile, IMenuProfileSystem};

use super::vtable::native_vtable;

native_vtable! {
    /// `IMenuSystem` bindings
    pub struct SystemTable: "IMenuSystem" {
        10 => fn get_player(slot: c_int) -> *mut c_void;
        11 => fn get_profiles() -> *mut IMenuProfileSystem;
        12 => fn create_instance(
            profile: *mut IMenuProfile,
            handler: *mut IMenuHandler,
        ) -> *mut IMenu;
        13 => fn display_instance_to_player(
            menu: *mut IMenu,
            slot: c_int,
            start_item: c_int,
            display_time: c_int,
        ) -> bool;
        14 => fn close_instance(menu: *mut IMenu) -> bool;
    }
}

native_vtable! {
    /// `IMenuProfileSystem` bindings
    pub struct ProfileSystemTable: "IMenuProfileSystem" {
        0 => fn get_profile(name: *const c_char) -> *mut IMenuProfile;
        1 => fn add_or_replace_profile(name: *const c_char, data: *mut c_void) -> ();
        2 => fn get_entity_key_values_allocator() -> *mut c_void;
    }
}

native_vtable! {
    /// `IMenu` bindings
    ///
    /// Slots 3-8 (title and item accessors) are reached through the
    /// library's C exports instead.
    pub struct MenuTable: "IMenu" {
        0 => fn get_profile() -> *mut IMenuProfile;
        1 => fn apply_profile(slot: c_int, profile: *mut IMenuProfile) -> bool;
        2 => fn get_handler() -> *mut IMenuHandler;
        9 => fn get_current_position(slot: c_int) -> c_int;
    }
}

native_vtable! {
    /// `IMenuProfile` bindings
    ///
    /// Both accessors return a reference to a native string object.
    pub struct ProfileTable: "IMenuProfile" {
        0 => fn get_display_name() -> *const c_void;
        1 => fn get_description() -> *const c_void;
    }
}
