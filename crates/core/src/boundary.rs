//! Scoped failure boundaries
//!
//! Native code cannot tolerate a Rust panic unwinding through its frames.
//! Anything that runs on a path entered from native code goes through
//! [`boundary`], which turns a panic into [`MenuError::Panicked`].

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::error::{MenuError, MenuResult};

/// Run `f`, converting a panic into a caller-visible error
///
/// # Example
///
/// ```ignore
/// use menubridge_core::boundary;
///
/// let result = boundary("open shop menu", || open_shop(&system, slot));
/// ```
pub fn boundary<T, F>(label: &str, f: F) -> MenuResult<T>
where
    F: FnOnce() -> T,
{
    catch_unwind(AssertUnwindSafe(f)).map_err(|payload| {
        let message = panic_message(payload.as_ref());
        tracing::error!("Panic in {}: {}", label, message);
        MenuError::Panicked(format!("{}: {}", label, message))
    })
}

/// Like [`boundary`], for closures that already return a [`MenuResult`]
pub fn try_boundary<T, F>(label: &str, f: F) -> MenuResult<T>
where
    F: FnOnce() -> MenuResult<T>,
{
    boundary(label, f).and_then(|result| result)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
