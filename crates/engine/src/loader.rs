//! Menu library loading and factory lookup

use std::ffi::{c_int, CStr};
use std::path::{Path, PathBuf};
use std::ptr::NonNull;
use std::sync::OnceLock;

use libloading::Library;
use menubridge_sdk::{IMenuSystem, MetaFactoryFn};

use crate::error::LoadError;
use crate::exports::{init_exports, ExportTable};
use crate::globals::{init_bridge, try_bridge, BridgeGlobals};

/// A loaded native library and the path it came from
pub struct NativeLibrary {
    library: Library,
    path: PathBuf,
}

impl NativeLibrary {
    /// Load a library from an explicit path
    ///
    /// # Safety
    /// Loading a dynamic library runs its initialization code. The caller
    /// must ensure the library at `path` is trusted.
    pub unsafe fn load(path: &Path) -> Result<Self, LoadError> {
        if !path.exists() {
            return Err(LoadError::LibraryNotFound(path.display().to_string()));
        }

        let library = Library::new(path).map_err(|e| LoadError::LoadFailed(e.to_string()))?;

        Ok(Self {
            library,
            path: path.to_path_buf(),
        })
    }

    /// Path the library was loaded from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolve a named export as a typed callable
    ///
    /// Returns `None` when the symbol is absent. A missing symbol never
    /// invalidates the library or other exports.
    ///
    /// # Safety
    /// `T` must be a function pointer type matching the export's real signature.
    pub unsafe fn resolve_export<T: Copy>(&self, name: &[u8]) -> Option<T> {
        let export_name = String::from_utf8_lossy(name.strip_suffix(b"\0").unwrap_or(name));

        match self.library.get::<T>(name) {
            Ok(symbol) => {
                tracing::debug!("Resolved export '{}' in {}", export_name, self.path.display());
                Some(*symbol)
            }
            Err(e) => {
                tracing::warn!(
                    "Export '{}' not found in {}: {}",
                    export_name,
                    self.path.display(),
                    e
                );
                None
            }
        }
    }
}

/// Attempt to load the menu library, reporting absence without failing
///
/// # Safety
/// Same as [`NativeLibrary::load`]
pub unsafe fn try_load(path: &Path) -> Option<NativeLibrary> {
    match NativeLibrary::load(path) {
        Ok(library) => {
            tracing::info!("Loaded menu library: {}", path.display());
            Some(library)
        }
        Err(LoadError::LibraryNotFound(p)) => {
            tracing::info!("Menu library not installed at {}", p);
            None
        }
        Err(e) => {
            tracing::warn!("{}", e);
            None
        }
    }
}

/// Wrapper around the Metamod factory function
pub struct MetaFactory {
    factory: MetaFactoryFn,
}

impl MetaFactory {
    /// Create a new factory wrapper
    pub fn new(factory: MetaFactoryFn) -> Self {
        Self { factory }
    }

    /// Look up an interface by version string
    ///
    /// # Arguments
    /// * `version` - Null-terminated version string (e.g., b"Menu System v1.0.0\0")
    ///
    /// # Safety
    /// The returned pointer is only valid if T matches the actual interface type
    pub unsafe fn get<T>(&self, version: &[u8]) -> Result<NonNull<T>, LoadError> {
        let version_str = CStr::from_bytes_with_nul(version).map_err(|_| {
            LoadError::InvalidVersionString(String::from_utf8_lossy(version).into_owned())
        })?;

        let mut ret_code: c_int = 0;
        let ptr = (self.factory)(version_str.as_ptr(), &mut ret_code, std::ptr::null_mut());

        NonNull::new(ptr as *mut T).ok_or_else(|| {
            LoadError::DependencyMissing(format!(
                "{} (factory code {})",
                version_str.to_string_lossy(),
                ret_code
            ))
        })
    }
}

/// Outcome of the one-time bootstrap, cached so a missing dependency is
/// reported once and never retried
static BOOTSTRAP: OnceLock<Result<(), LoadError>> = OnceLock::new();

/// Look up the menu system and load the menu library
///
/// Runs at most once per process. Later calls return the first outcome:
/// the same globals on success, the same error on failure.
///
/// # Arguments
/// * `factory` - Metamod factory used to find the menu system singleton
/// * `version` - Null-terminated factory version string
/// * `library_path` - Menu library location; `None` leaves every export unresolved
///
/// # Safety
/// `factory` must be callable and the library at `library_path` trusted.
#[tracing::instrument(skip_all)]
pub unsafe fn bootstrap(
    factory: MetaFactoryFn,
    version: &[u8],
    library_path: Option<&Path>,
) -> Result<&'static BridgeGlobals, LoadError> {
    let outcome = BOOTSTRAP.get_or_init(|| {
        let factory = MetaFactory::new(factory);

        let system = match factory.get::<IMenuSystem>(version) {
            Ok(system) => system,
            Err(e) => {
                tracing::error!("{}; menu features disabled", e);
                return Err(e);
            }
        };
        tracing::info!("IMenuSystem: {:p}", system.as_ptr());

        let exports: &'static ExportTable = init_exports(library_path);
        if !exports.is_available() {
            tracing::warn!(
                "Menu exports partially unavailable ({}/3 resolved)",
                exports.resolved_count()
            );
        }

        init_bridge(BridgeGlobals::new(system, exports))
    });

    match outcome {
        Ok(()) => try_bridge().ok_or(LoadError::AlreadyInitialized),
        Err(e) => Err(e.clone()),
    }
}
