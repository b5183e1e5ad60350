//! Exported menu functions resolved from the loaded library
//!
//! The export table is built once per process. A missing symbol is recorded
//! as absent rather than failing the load, so callers probe availability
//! before depending on an operation.

use std::path::Path;
use std::sync::OnceLock;

use menubridge_sdk::{versions, MenuAddItemFn, MenuGetTitleFn, MenuSetTitleFn};

use crate::loader::{try_load, NativeLibrary};

/// Typed callables for the menu library's C exports
#[derive(Clone, Copy, Default)]
pub struct ExportTable {
    add_item: Option<MenuAddItemFn>,
    get_title: Option<MenuGetTitleFn>,
    set_title: Option<MenuSetTitleFn>,
}

impl ExportTable {
    /// A table with every export unresolved
    pub const fn unresolved() -> Self {
        Self {
            add_item: None,
            get_title: None,
            set_title: None,
        }
    }

    /// Build a table from already-known function pointers
    ///
    /// Used when the menu library is linked statically or provided by a
    /// test double.
    pub const fn from_raw(
        add_item: Option<MenuAddItemFn>,
        get_title: Option<MenuGetTitleFn>,
        set_title: Option<MenuSetTitleFn>,
    ) -> Self {
        Self {
            add_item,
            get_title,
            set_title,
        }
    }

    /// Resolve every export from a loaded library independently
    ///
    /// # Safety
    /// The library must export these symbols with the signatures declared in
    /// `menubridge_sdk::interfaces`, and must stay loaded while the table is used.
    pub unsafe fn from_library(library: &NativeLibrary) -> Self {
        Self {
            add_item: library.resolve_export(versions::MENU_ADD_ITEM),
            get_title: library.resolve_export(versions::MENU_GET_TITLE),
            set_title: library.resolve_export(versions::MENU_SET_TITLE),
        }
    }

    /// `Menu_AddItem`, if resolved
    pub fn add_item(&self) -> Option<MenuAddItemFn> {
        self.add_item
    }

    /// `Menu_GetTitle`, if resolved
    pub fn get_title(&self) -> Option<MenuGetTitleFn> {
        self.get_title
    }

    /// `Menu_SetTitle`, if resolved
    pub fn set_title(&self) -> Option<MenuSetTitleFn> {
        self.set_title
    }

    pub fn has_add_item(&self) -> bool {
        self.add_item.is_some()
    }

    pub fn has_get_title(&self) -> bool {
        self.get_title.is_some()
    }

    pub fn has_set_title(&self) -> bool {
        self.set_title.is_some()
    }

    /// Number of exports that resolved
    pub fn resolved_count(&self) -> usize {
        [self.has_add_item(), self.has_get_title(), self.has_set_title()]
            .into_iter()
            .filter(|&resolved| resolved)
            .count()
    }

    /// Check if every export resolved
    pub fn is_available(&self) -> bool {
        self.resolved_count() == 3
    }
}

impl std::fmt::Debug for ExportTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let resolved = [self.has_add_item(), self.has_get_title(), self.has_set_title()];

        let mut s = f.debug_struct("ExportTable");
        for ((name, _), resolved) in versions::EXPORT_NAMES.iter().zip(resolved) {
            s.field(name, &resolved);
        }
        s.finish()
    }
}

/// Library kept loaded for the process lifetime; exports point into it
static LIBRARY: OnceLock<Option<NativeLibrary>> = OnceLock::new();

/// Process-wide export table
static EXPORTS: OnceLock<ExportTable> = OnceLock::new();

/// Fallback while nothing has been initialized
static UNRESOLVED: ExportTable = ExportTable::unresolved();

/// Load the menu library and resolve its exports
///
/// Idempotent: after the first call, later calls return the same table
/// regardless of `path`.
///
/// # Safety
/// See [`NativeLibrary::load`] and [`ExportTable::from_library`].
pub unsafe fn init_exports(path: Option<&Path>) -> &'static ExportTable {
    EXPORTS.get_or_init(|| {
        let library = LIBRARY.get_or_init(|| path.and_then(|p| try_load(p)));

        match library {
            Some(library) => {
                let table = ExportTable::from_library(library);
                tracing::info!("Menu exports: {:?}", table);
                table
            }
            None => {
                tracing::info!("Menu library unavailable; exports unresolved");
                ExportTable::unresolved()
            }
        }
    })
}

/// Get the process-wide export table
///
/// Returns a fully unresolved table before [`init_exports`] runs.
pub fn exports() -> &'static ExportTable {
    EXPORTS.get().unwrap_or(&UNRESOLVED)
}
