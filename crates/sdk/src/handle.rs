//! Opaque handles to natively owned objects
//!
//! A [`NativeHandle`] is an address handed out by the menu system. The bridge
//! never follows it; it is only passed back into native calls or compared.
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │        usize address (0 = absent)        │
//! └──────────────────────────────────────────┘
//! ```

use std::fmt;

/// Opaque address of a native-side instance
///
/// Handles compare by address. A null handle is the well-defined "absent"
/// value and is never a valid receiver for a native call.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NativeHandle(usize);

impl NativeHandle {
    /// The absent handle
    pub const NULL: Self = Self(0);

    /// Create a handle from a raw address
    #[inline]
    pub const fn from_addr(addr: usize) -> Self {
        Self(addr)
    }

    /// Create a handle from a native pointer
    #[inline]
    pub fn from_ptr<T>(ptr: *const T) -> Self {
        Self(ptr as usize)
    }

    /// Get the raw address
    #[inline]
    pub const fn addr(self) -> usize {
        self.0
    }

    /// Reinterpret the handle as a typed pointer for passing back to native code
    #[inline]
    pub fn as_ptr<T>(self) -> *mut T {
        self.0 as *mut T
    }

    /// Check if this is the absent handle
    #[inline]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    /// Returns `None` for the absent handle
    #[inline]
    pub fn non_null(self) -> Option<Self> {
        if self.is_null() {
            None
        } else {
            Some(self)
        }
    }
}

impl fmt::Debug for NativeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativeHandle({:#x})", self.0)
    }
}

impl fmt::Display for NativeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl<T> From<*mut T> for NativeHandle {
    fn from(ptr: *mut T) -> Self {
        Self(ptr as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_handle() {
        assert!(NativeHandle::NULL.is_null());
        assert!(NativeHandle::default().is_null());
        assert_eq!(NativeHandle::NULL.non_null(), None);
    }

    #[test]
    fn test_handle_identity() {
        let value = 42u64;
        let a = NativeHandle::from_ptr(&value);
        let b = NativeHandle::from_addr(&value as *const u64 as usize);
        assert_eq!(a, b);
        assert_eq!(a.non_null(), Some(a));
        assert_eq!(a.as_ptr::<u64>() as *const u64, &value as *const u64);
    }

    #[test]
    fn test_handle_debug_format() {
        let handle = NativeHandle::from_addr(0x1000);
        assert_eq!(format!("{:?}", handle), "NativeHandle(0x1000)");
        assert_eq!(handle.to_string(), "0x1000");
    }
}
