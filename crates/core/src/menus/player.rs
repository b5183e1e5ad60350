//! Acting player passed to item callbacks

use menubridge_sdk::NativeHandle;

/// Maximum number of player slots
pub const MAX_PLAYERS: i32 = 64;

/// A player slot resolved through the menu system
///
/// Only produced for slots in `0..MAX_PLAYERS` whose native player object
/// exists. The handle is owned by the menu system and is only valid for the
/// duration of the callback that received it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MenuPlayer {
    slot: i32,
    handle: NativeHandle,
}

impl MenuPlayer {
    pub(crate) fn new(slot: i32, handle: NativeHandle) -> Self {
        Self { slot, handle }
    }

    /// Player slot (0-63)
    pub fn slot(&self) -> i32 {
        self.slot
    }

    /// Native menu-system player object
    pub fn handle(&self) -> NativeHandle {
        self.handle
    }
}

/// Check if `slot` is a valid player slot
pub fn is_valid_slot(slot: i32) -> bool {
    (0..MAX_PLAYERS).contains(&slot)
}
