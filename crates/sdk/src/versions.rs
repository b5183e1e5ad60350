//! Factory version strings and exported symbol names
//!
//! These strings must match exactly what the menu system registers and exports.

/// Menu system interface, resolved through the Metamod factory
pub const MENU_SYSTEM: &[u8] = b"Menu System v1.0.0\0";

/// Adds an item to a menu
pub const MENU_ADD_ITEM: &[u8] = b"Menu_AddItem\0";

/// Reads a menu's title buffer
pub const MENU_GET_TITLE: &[u8] = b"Menu_GetTitle\0";

/// Replaces a menu's title
pub const MENU_SET_TITLE: &[u8] = b"Menu_SetTitle\0";

/// Collected export names for iteration
pub const EXPORT_NAMES: &[(&str, &[u8])] = &[
    ("Menu_AddItem", MENU_ADD_ITEM),
    ("Menu_GetTitle", MENU_GET_TITLE),
    ("Menu_SetTitle", MENU_SET_TITLE),
];
