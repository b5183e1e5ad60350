//! Error taxonomy for menu operations

use menubridge_engine::LoadError;

/// Error type for menu bridge operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MenuError {
    /// Menu system or library absent; the feature is disabled
    #[error("Dependency missing: {0}")]
    DependencyMissing(String),

    /// A named library export did not resolve
    #[error("Export not resolved: {0}")]
    ExportUnresolved(&'static str),

    /// A virtual table slot could not be resolved for this object
    #[error("{interface}::{method} unavailable (vtable slot {slot})")]
    SlotUnavailable {
        interface: &'static str,
        method: &'static str,
        slot: usize,
    },

    /// A proxy was constructed from a null handle
    #[error("Null handle for {0}")]
    NullHandle(&'static str),

    /// A call contractually returning an object returned null
    #[error("{0} returned null")]
    NullResult(&'static str),

    /// Capability intentionally not supported by the bridge
    #[error("Unimplemented: {0}")]
    Unimplemented(&'static str),

    /// Native side rejected a new menu item
    #[error("Menu item rejected by native code (result {0})")]
    ItemRejected(i32),

    /// Profile data read too early after menu creation
    #[error("Menu profile not settled yet; defer the read to a later frame")]
    NotSettled,

    /// Deferred task queue is full
    #[error("Deferred task queue full")]
    QueueFull,

    /// A panic was caught at a failure boundary
    #[error("Panic in {0}")]
    Panicked(String),
}

/// Result type for menu bridge operations
pub type MenuResult<T> = Result<T, MenuError>;

impl From<LoadError> for MenuError {
    fn from(e: LoadError) -> Self {
        MenuError::DependencyMissing(e.to_string())
    }
}
