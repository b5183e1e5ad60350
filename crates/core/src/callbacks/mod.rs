//! Item callback registry
//!
//! Native code cannot call a Rust closure directly. Each callback-style item
//! registers its closure here and receives a [`CallbackToken`]; the token is
//! passed to native code as the item's data pointer alongside the shared
//! [`trampoline`]. When the item is selected, the trampoline takes the
//! context back out by token and runs it.
//!
//! Tokens are generation-checked slot map keys. A released slot can be reused
//! by a later registration, but under a new generation, so a stale token
//! never reaches a newer closure.

pub mod trampoline;

use std::ffi::c_void;
use std::sync::LazyLock;

use menubridge_sdk::NativeHandle;
use parking_lot::Mutex;
use slotmap::{new_key_type, Key, KeyData, SlotMap};

use crate::menus::{Menu, MenuPlayer};

#[cfg(not(target_pointer_width = "64"))]
compile_error!("callback tokens are passed as 64-bit data pointers");

new_key_type! {
    /// Key for registered item callbacks
    pub struct CallbackKey;
}

/// Closure run when a callback-style item is selected
pub type ItemCallback = Box<dyn FnOnce(Option<MenuPlayer>, &Menu, i32) + Send + 'static>;

/// A registered closure and the menu that owns it
pub(crate) struct CallbackContext {
    pub(crate) callback: ItemCallback,
    pub(crate) menu: Menu,
}

/// Opaque token identifying one registered callback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackToken(u64);

impl CallbackToken {
    fn from_key(key: CallbackKey) -> Self {
        Self(key.data().as_ffi())
    }

    fn key(self) -> CallbackKey {
        KeyData::from_ffi(self.0).into()
    }

    /// Token as the data pointer handed to native code
    pub fn as_ptr(self) -> *mut c_void {
        self.0 as usize as *mut c_void
    }

    /// Recover a token from a native data pointer
    pub fn from_ptr(ptr: *mut c_void) -> Option<Self> {
        if ptr.is_null() {
            None
        } else {
            Some(Self(ptr as usize as u64))
        }
    }
}

struct CallbackRegistry {
    contexts: SlotMap<CallbackKey, CallbackContext>,
}

static REGISTRY: LazyLock<Mutex<CallbackRegistry>> = LazyLock::new(|| {
    Mutex::new(CallbackRegistry {
        contexts: SlotMap::with_key(),
    })
});

/// Register `callback` for an item of `menu`
pub(crate) fn register(menu: &Menu, callback: ItemCallback) -> CallbackToken {
    let key = REGISTRY.lock().contexts.insert(CallbackContext {
        callback,
        menu: menu.clone(),
    });
    let token = CallbackToken::from_key(key);
    tracing::trace!("Registered callback {:?} for menu {}", token, menu.handle());
    token
}

/// Remove a context so it can be run
///
/// Returns `None` for unknown or already released tokens.
pub(crate) fn take(token: CallbackToken) -> Option<CallbackContext> {
    REGISTRY.lock().contexts.remove(token.key())
}

/// Release a context without running it
///
/// Returns `true` if the token was still registered.
pub(crate) fn release(token: CallbackToken) -> bool {
    // Dropped after the lock is released
    let context = take(token);
    context.is_some()
}

/// Check if `token` still refers to a pending callback
pub fn is_registered(token: CallbackToken) -> bool {
    REGISTRY.lock().contexts.contains_key(token.key())
}

/// Number of callbacks that have not fired or been released
pub fn pending_count() -> usize {
    REGISTRY.lock().contexts.len()
}

pub(crate) fn pending_for(menu: NativeHandle) -> usize {
    REGISTRY
        .lock()
        .contexts
        .values()
        .filter(|context| context.menu.handle() == menu)
        .count()
}

fn remove_where<P>(predicate: P) -> Vec<CallbackContext>
where
    P: Fn(&CallbackContext) -> bool,
{
    let mut registry = REGISTRY.lock();
    let keys: Vec<CallbackKey> = registry
        .contexts
        .iter()
        .filter(|(_, context)| predicate(context))
        .map(|(key, _)| key)
        .collect();

    keys.into_iter()
        .filter_map(|key| registry.contexts.remove(key))
        .collect()
}

pub(crate) fn release_for(menu: NativeHandle) -> usize {
    let released = remove_where(|context| context.menu.handle() == menu);
    if !released.is_empty() {
        tracing::debug!("Released {} callbacks of menu {}", released.len(), menu);
    }
    released.len()
}

/// Drop every pending callback
///
/// Called on unload, when native menus can no longer fire.
pub fn release_all() -> usize {
    let released = remove_where(|_| true);
    if !released.is_empty() {
        tracing::info!("Released {} pending menu callbacks", released.len());
    }
    released.len()
}
