//! Text marshaling across the native boundary
//!
//! Native code speaks NUL-terminated UTF-8. Marshaling never fails:
//! - a null buffer reads as an empty string
//! - invalid UTF-8 is replaced lossily
//! - an outgoing string is cut at its first interior NUL

use std::ffi::{c_char, c_void, CStr, CString};

/// Convert Rust text into a NUL-terminated buffer for native code
pub fn to_native(text: &str) -> CString {
    match CString::new(text) {
        Ok(s) => s,
        Err(e) => {
            let position = e.nul_position();
            tracing::warn!(
                "Text contains a NUL byte at {}; truncating for native code",
                position
            );
            let mut bytes = e.into_vec();
            bytes.truncate(position);
            // No NUL remains before `position`
            CString::new(bytes).unwrap_or_default()
        }
    }
}

/// Read a native NUL-terminated buffer
///
/// # Safety
/// `ptr` must be null or point at a NUL-terminated buffer that stays valid
/// for the duration of the call.
pub unsafe fn from_native(ptr: *const c_char) -> String {
    if ptr.is_null() {
        return String::new();
    }
    CStr::from_ptr(ptr).to_string_lossy().into_owned()
}

/// Read a native string object whose first word is its text buffer
///
/// # Safety
/// `object` must be null or point at a live string object laid out with a
/// `const char*` as its first member.
pub unsafe fn from_string_object(object: *const c_void) -> String {
    if object.is_null() {
        return String::new();
    }
    from_native(*(object as *const *const c_char))
}
