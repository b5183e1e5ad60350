//! Global bridge storage
//!
//! The menu system singleton and export table are acquired once during plugin
//! load and stored here. Access is thread-safe via OnceLock.

use std::ptr::NonNull;
use std::sync::OnceLock;

use menubridge_sdk::{IMenuSystem, NativeHandle};

use crate::error::LoadError;
use crate::exports::ExportTable;

/// Global bridge state
pub struct BridgeGlobals {
    /// Menu system singleton from the Metamod factory
    pub system: NonNull<IMenuSystem>,

    /// Resolved library exports (possibly partial)
    pub exports: &'static ExportTable,
}

// SAFETY: The menu system singleton lives for the entire plugin lifetime and is
// only ever called from the main thread. Initialization is synchronized via OnceLock.
unsafe impl Send for BridgeGlobals {}
unsafe impl Sync for BridgeGlobals {}

/// Global bridge state storage
static BRIDGE: OnceLock<BridgeGlobals> = OnceLock::new();

/// Initialize bridge globals
///
/// Called once during plugin load. Returns error if already initialized.
pub fn init_bridge(globals: BridgeGlobals) -> Result<(), LoadError> {
    BRIDGE
        .set(globals)
        .map_err(|_| LoadError::AlreadyInitialized)
}

/// Try to get bridge globals without panicking
pub fn try_bridge() -> Option<&'static BridgeGlobals> {
    BRIDGE.get()
}

impl BridgeGlobals {
    /// Create new BridgeGlobals
    ///
    /// # Arguments
    /// * `system` - Menu system singleton
    /// * `exports` - Process-wide export table
    pub fn new(system: NonNull<IMenuSystem>, exports: &'static ExportTable) -> Self {
        Self { system, exports }
    }

    /// Menu system singleton as an opaque handle
    pub fn system_handle(&self) -> NativeHandle {
        NativeHandle::from_ptr(self.system.as_ptr())
    }
}
