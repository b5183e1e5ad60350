//! C-compatible exports called by the host plugin loader

use std::ffi::{c_char, c_void, CStr};
use std::path::PathBuf;

use tracing::instrument;
use tracing_subscriber::EnvFilter;

use menubridge_core::{boundary, try_boundary, BridgeConfig};
use menubridge_sdk::MetaFactoryFn;

// Plugin metadata - static strings with null terminators for C compatibility
static AUTHOR: &[u8] = b"dollan\0";
static NAME: &[u8] = b"MenuBridge\0";
static DESCRIPTION: &[u8] = b"Rust bridge to the Metamod menu system\0";
static URL: &[u8] = b"https://github.com/dollannn/menubridge\0";
static LICENSE: &[u8] = b"MIT\0";
static VERSION: &[u8] = b"0.1.0\0";
static LOG_TAG: &[u8] = b"MENUBRIDGE\0";

/// Install the tracing subscriber
///
/// `RUST_LOG` wins over the config's debug flag.
fn init_tracing(config: &BridgeConfig) {
    let default_level = if config.debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Called when the host loads the plugin
///
/// Returns `false` and writes a message into `error` when the menu system
/// is missing; menu features stay disabled for the rest of the process.
///
/// # Safety
/// - `meta_factory` must be the host's Metamod factory function
/// - `game_dir` must be a valid null-terminated path
/// - `error` must be a valid pointer to a buffer of at least `maxlen` bytes, or null
#[no_mangle]
#[instrument(skip_all)]
pub unsafe extern "C" fn menubridge_load(
    meta_factory: *mut c_void,
    game_dir: *const c_char,
    error: *mut c_char,
    maxlen: usize,
) -> bool {
    if game_dir.is_null() {
        write_error(error, maxlen, "Game directory is null");
        return false;
    }
    let game_dir = PathBuf::from(CStr::from_ptr(game_dir).to_string_lossy().into_owned());

    let config_result = BridgeConfig::load(&game_dir);
    let config = config_result.as_ref().cloned().unwrap_or_default();
    init_tracing(&config);

    if let Err(e) = &config_result {
        tracing::warn!("Failed to load bridge config, using defaults: {}", e);
    }

    tracing::info!("Menu bridge loading...");

    if meta_factory.is_null() {
        write_error(error, maxlen, "Metamod factory is null");
        return false;
    }

    // Cast factory function pointer
    let factory: MetaFactoryFn = std::mem::transmute(meta_factory);

    match try_boundary("menubridge_load", || menubridge_core::init(factory, &config, &game_dir)) {
        Ok(system) => {
            tracing::info!("Menu bridge loaded: {:?}", system);
            tracing::info!("Main thread ID: {:?}", std::thread::current().id());
            true
        }
        Err(e) => {
            tracing::error!("Menu bridge unavailable: {}", e);
            write_error(error, maxlen, &e.to_string());
            false
        }
    }
}

/// Called when the host unloads the plugin
///
/// # Safety
/// - `error` must be a valid pointer to a buffer of at least `maxlen` bytes, or null
#[no_mangle]
#[instrument(skip_all)]
pub unsafe extern "C" fn menubridge_unload(error: *mut c_char, maxlen: usize) -> bool {
    tracing::info!("Menu bridge unloading...");

    match boundary("menubridge_unload", crate::shutdown) {
        Ok(()) => true,
        Err(e) => {
            write_error(error, maxlen, &e.to_string());
            false
        }
    }
}

/// Called by the host every server tick
#[no_mangle]
pub extern "C" fn menubridge_on_game_frame() {
    let _ = boundary("game frame", menubridge_core::on_game_frame);
}

/// Check if the menu system was found at load
#[no_mangle]
pub extern "C" fn menubridge_is_available() -> bool {
    menubridge_core::is_available()
}

// Metadata exports - these return static strings for the host to display

#[no_mangle]
pub extern "C" fn menubridge_get_author() -> *const c_char {
    AUTHOR.as_ptr() as *const c_char
}

#[no_mangle]
pub extern "C" fn menubridge_get_name() -> *const c_char {
    NAME.as_ptr() as *const c_char
}

#[no_mangle]
pub extern "C" fn menubridge_get_description() -> *const c_char {
    DESCRIPTION.as_ptr() as *const c_char
}

#[no_mangle]
pub extern "C" fn menubridge_get_url() -> *const c_char {
    URL.as_ptr() as *const c_char
}

#[no_mangle]
pub extern "C" fn menubridge_get_license() -> *const c_char {
    LICENSE.as_ptr() as *const c_char
}

#[no_mangle]
pub extern "C" fn menubridge_get_version() -> *const c_char {
    VERSION.as_ptr() as *const c_char
}

#[no_mangle]
pub extern "C" fn menubridge_get_log_tag() -> *const c_char {
    LOG_TAG.as_ptr() as *const c_char
}

/// Helper to write an error message to a C buffer
///
/// # Safety
/// - `error` must be a valid pointer or null
/// - `maxlen` must accurately reflect the buffer size
unsafe fn write_error(error: *mut c_char, maxlen: usize, msg: &str) {
    if !error.is_null() && maxlen > 0 {
        let bytes = msg.as_bytes();
        let len = bytes.len().min(maxlen - 1);
        std::ptr::copy_nonoverlapping(bytes.as_ptr(), error as *mut u8, len);
        *error.add(len) = 0;
    }
}
