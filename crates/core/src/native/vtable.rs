//! Virtual table invocation by slot index
//!
//! A native object's first word points at its dispatch table: a contiguous
//! array of function addresses. Calling slot `n` means reading entry `n` and
//! invoking it with the object as the first argument.
//!
//! Slot indices and signatures are declared, never verified. What *can* be
//! checked is whether the table reaches a slot at all: resolution walks the
//! table from entry 0 and stops at the first entry that is null, unreadable,
//! or does not point into executable memory. A slot past that point is
//! reported as [`MenuError::SlotUnavailable`] instead of being called.
//!
//! ```text
//! object ──► [ vtable* | fields... ]
//!               │
//!               ▼
//!             [ fn0 | fn1 | ... | fnN | 0 ]   walk stops at the terminator
//! ```

use std::collections::{HashMap, HashSet};
use std::ops::Range;

use menubridge_sdk::NativeHandle;
use parking_lot::Mutex;

use crate::error::{MenuError, MenuResult};
use crate::gamedata;

/// Resolved entries of one object's dispatch table
#[derive(Default)]
struct SlotCache {
    /// Entries 0..len known to be callable
    entries: Vec<usize>,
    /// Index where the walk terminated, once found
    end: Option<usize>,
    /// Gamedata slot overrides already looked up, by method name
    overrides: HashMap<&'static str, usize>,
    /// Unavailable slots already reported
    warned: HashSet<usize>,
}

/// Lazily resolved view of one native object's virtual table
///
/// Each proxy owns its own `VirtualTable`; two proxies over the same object
/// resolve independently.
pub struct VirtualTable {
    interface: &'static str,
    this: NativeHandle,
    cache: Mutex<SlotCache>,
}

impl VirtualTable {
    /// Create a view over `this`
    ///
    /// # Safety
    /// `this` must point at a live native object implementing `interface`
    /// whose first word is its vtable pointer.
    pub unsafe fn new(interface: &'static str, this: NativeHandle) -> MenuResult<Self> {
        if this.is_null() {
            return Err(MenuError::NullHandle(interface));
        }

        Ok(Self {
            interface,
            this,
            cache: Mutex::new(SlotCache::default()),
        })
    }

    /// Native interface name
    pub fn interface(&self) -> &'static str {
        self.interface
    }

    /// The object this table belongs to
    pub fn this(&self) -> NativeHandle {
        self.this
    }

    /// Slot index to use for `method`, honoring gamedata overrides
    fn slot_for(&self, cache: &mut SlotCache, method: &'static str, default: usize) -> usize {
        *cache.overrides.entry(method).or_insert_with(|| {
            gamedata::slot_override(self.interface, method).unwrap_or(default)
        })
    }

    /// Resolve `method` to a callable address
    ///
    /// Results are cached per slot, so the table is walked at most once.
    pub fn resolve(&self, method: &'static str, default_slot: usize) -> MenuResult<usize> {
        let mut cache = self.cache.lock();
        let slot = self.slot_for(&mut cache, method, default_slot);

        let mut memory = MemoryMap::default();
        while cache.entries.len() <= slot && cache.end.is_none() {
            let index = cache.entries.len();
            // SAFETY: guaranteed by the contract of `VirtualTable::new`.
            match unsafe { read_entry(&mut memory, self.this, index) } {
                Some(address) => cache.entries.push(address),
                None => {
                    tracing::debug!(
                        "{} vtable at {} ends at slot {}",
                        self.interface,
                        self.this,
                        index
                    );
                    cache.end = Some(index);
                }
            }
        }

        match cache.entries.get(slot) {
            Some(&address) => Ok(address),
            None => {
                if cache.warned.insert(slot) {
                    tracing::warn!(
                        "{}::{} unavailable: vtable of {} has no slot {}",
                        self.interface,
                        method,
                        self.this,
                        slot
                    );
                }
                Err(MenuError::SlotUnavailable {
                    interface: self.interface,
                    method,
                    slot,
                })
            }
        }
    }

    /// Number of slots resolved so far
    pub fn resolved_len(&self) -> usize {
        self.cache.lock().entries.len()
    }
}

/// Memory mappings seen during one table walk
///
/// Consecutive entries usually share a page, and every function in the table
/// lives in the same few code mappings, so each mapping is queried once.
#[derive(Default)]
struct MemoryMap {
    /// (address range, readable, executable)
    regions: Vec<(Range<usize>, bool, bool)>,
    queries: usize,
}

impl MemoryMap {
    fn lookup(&mut self, address: usize) -> Option<(bool, bool)> {
        if address == 0 {
            return None;
        }
        if let Some((_, readable, executable)) =
            self.regions.iter().find(|(range, ..)| range.contains(&address))
        {
            return Some((*readable, *executable));
        }

        self.queries += 1;
        let region = region::query(address as *const u8).ok()?;
        let flags = (region.is_readable(), region.is_executable());
        self.regions.push((region.as_range(), flags.0, flags.1));
        Some(flags)
    }

    /// Check that a word at `address` can be read
    fn is_readable(&mut self, address: usize) -> bool {
        address % std::mem::align_of::<usize>() == 0
            && self.lookup(address).is_some_and(|(readable, _)| readable)
    }

    /// Check that `address` points into executable memory
    fn is_executable(&mut self, address: usize) -> bool {
        self.lookup(address).is_some_and(|(_, executable)| executable)
    }
}

/// Read vtable entry `index` of `this`
///
/// # Safety
/// `this` must point at a live object whose first word is a vtable pointer,
/// and entries `0..index` must already have been validated.
unsafe fn read_entry(memory: &mut MemoryMap, this: NativeHandle, index: usize) -> Option<usize> {
    if !memory.is_readable(this.addr()) {
        return None;
    }
    let vtable = *(this.addr() as *const usize);

    let slot_address = vtable.checked_add(index * std::mem::size_of::<usize>())?;
    if !memory.is_readable(slot_address) {
        return None;
    }

    let entry = *(slot_address as *const usize);
    memory.is_executable(entry).then_some(entry)
}

/// Declare typed bindings for a native interface
///
/// Each entry binds a slot index to a method name and signature. The macro
/// generates a struct wrapping a [`VirtualTable`] with, per method:
/// - `unsafe fn method(&self, args...) -> MenuResult<Ret>` invoking the slot
/// - `fn has_method(&self) -> bool` probing availability
///
/// # Example
///
/// ```ignore
/// native_vtable! {
///     pub(crate) struct MenuTable: "IMenu" {
///         0 => fn get_profile() -> *mut IMenuProfile;
///         9 => fn get_current_position(slot: c_int) -> c_int;
///     }
/// }
/// ```
macro_rules! native_vtable {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident : $iface:literal {
            $( $slot:literal => fn $method:ident ( $($arg:ident : $ty:ty),* $(,)? ) -> $ret:ty; )*
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            table: $crate::native::vtable::VirtualTable,
        }

        #[allow(dead_code)]
        impl $name {
            /// Native interface name, used in logs and gamedata keys
            pub const INTERFACE: &'static str = $iface;

            /// Compiled-in (method, slot) layout
            pub const LAYOUT: &'static [(&'static str, usize)] =
                &[$((stringify!($method), $slot)),*];

            /// # Safety
            /// `this` must be null or point at a live object implementing this interface.
            pub unsafe fn new(
                this: ::menubridge_sdk::NativeHandle,
            ) -> $crate::error::MenuResult<Self> {
                Ok(Self {
                    table: $crate::native::vtable::VirtualTable::new($iface, this)?,
                })
            }

            /// The wrapped object
            pub fn handle(&self) -> ::menubridge_sdk::NativeHandle {
                self.table.this()
            }

            $(
                paste::paste! {
                    /// Check if this method's slot resolves to a callable entry
                    pub fn [<has_ $method>](&self) -> bool {
                        self.table.resolve(stringify!($method), $slot).is_ok()
                    }
                }

                #[doc = concat!(
                    "Invoke `", $iface, "::", stringify!($method),
                    "` (default slot ", stringify!($slot), ")"
                )]
                ///
                /// # Safety
                /// The declared signature must match the native slot and the
                /// object must not have been destroyed by native code.
                pub unsafe fn $method(&self, $($arg: $ty),*) -> $crate::error::MenuResult<$ret> {
                    let address = self.table.resolve(stringify!($method), $slot)?;
                    let func = ::std::mem::transmute::<
                        usize,
                        unsafe extern "C" fn(*mut ::std::ffi::c_void $(, $ty)*) -> $ret,
                    >(address);
                    Ok(func(self.table.this().as_ptr() $(, $arg)*))
                }
            )*
        }
    };
}

pub(crate) use native_vtable;
