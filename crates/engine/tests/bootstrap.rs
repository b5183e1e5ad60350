//! Bootstrap runs once per process, so these checks live in their own binary
//! where the globals start empty.

use std::ffi::{c_char, c_int, c_void, CStr};
use std::path::Path;

use menubridge_engine::{bootstrap, exports, init_exports, try_bridge};
use menubridge_sdk::versions::MENU_SYSTEM;

static SINGLETON: u64 = 1;
static REPLACEMENT: u64 = 2;

unsafe extern "C" fn menu_factory(
    name: *const c_char,
    _return_code: *mut c_int,
    _plugin_id: *mut c_int,
) -> *mut c_void {
    if CStr::from_ptr(name).to_bytes_with_nul() == MENU_SYSTEM {
        &SINGLETON as *const u64 as *mut c_void
    } else {
        std::ptr::null_mut()
    }
}

unsafe extern "C" fn replacement_factory(
    _name: *const c_char,
    _return_code: *mut c_int,
    _plugin_id: *mut c_int,
) -> *mut c_void {
    &REPLACEMENT as *const u64 as *mut c_void
}

#[test]
fn test_second_bootstrap_returns_first_globals() {
    assert!(try_bridge().is_none());

    let first = unsafe {
        bootstrap(
            menu_factory,
            MENU_SYSTEM,
            Some(Path::new("/nonexistent/menu_system/bin/menu.so")),
        )
    }
    .expect("bootstrap with a working factory should succeed");

    assert_eq!(
        first.system_handle().addr(),
        &SINGLETON as *const u64 as usize
    );
    assert_eq!(first.exports.resolved_count(), 0);
    assert!(std::ptr::eq(exports(), first.exports));

    let table = unsafe { init_exports(Some(Path::new("/elsewhere/menu.so"))) };
    assert!(std::ptr::eq(table, first.exports));

    let second = unsafe {
        bootstrap(
            replacement_factory,
            MENU_SYSTEM,
            Some(Path::new("/elsewhere/menu.so")),
        )
    }
    .expect("repeated bootstrap should return the cached globals");

    assert!(std::ptr::eq(first, second));
    assert_eq!(
        second.system_handle().addr(),
        &SINGLETON as *const u64 as usize
    );
    assert!(try_bridge().is_some_and(|globals| std::ptr::eq(globals, first)));
}
