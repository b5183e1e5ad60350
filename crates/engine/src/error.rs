//! Error types for menu library loading

/// Error type for library and factory loading operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    /// Library file does not exist at the given path
    #[error("Library not found: {0}")]
    LibraryNotFound(String),

    /// Library exists but the loader rejected it
    #[error("Failed to load library: {0}")]
    LoadFailed(String),

    /// Metamod factory returned null for the requested interface
    #[error("Dependency missing: {0}")]
    DependencyMissing(String),

    /// Invalid factory version string (not null-terminated)
    #[error("Invalid version string: {0}")]
    InvalidVersionString(String),

    /// Bridge already initialized
    #[error("Bridge already initialized")]
    AlreadyInitialized,
}
