//! In-process stand-in for the native menu library
//!
//! Objects are `#[repr(C)]` structs whose first word points at a
//! null-terminated table of `extern "C"` functions, which is the layout the
//! vtable invoker expects from real native objects. Everything is leaked so
//! handles stay valid for the whole test run.

use std::collections::HashMap;
use std::ffi::{c_char, c_int, c_void, CStr, CString};
use std::sync::atomic::{AtomicBool, Ordering};

use menubridge_engine::ExportTable;
use menubridge_sdk::{
    IMenu, IMenuHandler, IMenuProfile, IMenuProfileSystem, ItemSelectFn, MenuAddItemFn,
    MenuGetTitleFn, MenuSetTitleFn, NativeHandle,
};
use parking_lot::Mutex;

use crate::menus::MenuSystem;

/// A native-shaped object: vtable pointer followed by test state
#[repr(C)]
pub struct FakeObject<S> {
    vtable: *const usize,
    pub state: S,
}

/// Leak a dispatch table holding `entries` followed by a null terminator
/// Held by tests that fill or drain the deferred call queue
pub static QUEUE_LOCK: Mutex<()> = Mutex::new(());

pub fn leak_vtable(entries: &[usize]) -> *const usize {
    let mut table = entries.to_vec();
    table.push(0);
    Box::leak(table.into_boxed_slice()).as_ptr()
}

/// Leak an object whose first word is `vtable`
pub fn leak_object<S>(vtable: *const usize, state: S) -> NativeHandle {
    let object = Box::leak(Box::new(FakeObject { vtable, state }));
    NativeHandle::from_ptr(object as *const FakeObject<S>)
}

/// State of the object behind `this`
///
/// # Safety
/// `this` must come from [`leak_object`] with state type `S`.
pub unsafe fn object_state<'a, S>(this: *mut c_void) -> &'a S {
    &(*(this as *const FakeObject<S>)).state
}

/// Placeholder for slots the bridge never calls
extern "C" fn unused_slot(_this: *mut c_void) {}

/// Native string object: text buffer first, then the owned storage
#[repr(C)]
struct FakeString {
    text: *const c_char,
    _owned: CString,
}

fn leak_string(text: &str) -> *const c_void {
    let owned = CString::new(text).unwrap();
    let string = Box::leak(Box::new(FakeString {
        text: owned.as_ptr(),
        _owned: owned,
    }));
    string as *const FakeString as *const c_void
}

// ---------------------------------------------------------------------------
// IMenuProfile
// ---------------------------------------------------------------------------

pub struct ProfileState {
    display_name: *const c_void,
    description: *const c_void,
}

extern "C" fn profile_display_name(this: *mut c_void) -> *const c_void {
    unsafe { object_state::<ProfileState>(this) }.display_name
}

extern "C" fn profile_description(this: *mut c_void) -> *const c_void {
    unsafe { object_state::<ProfileState>(this) }.description
}

pub fn fake_profile(display_name: &str, description: &str) -> NativeHandle {
    let vtable = leak_vtable(&[
        profile_display_name as *const () as usize,
        profile_description as *const () as usize,
    ]);
    leak_object(
        vtable,
        ProfileState {
            display_name: leak_string(display_name),
            description: leak_string(description),
        },
    )
}

// ---------------------------------------------------------------------------
// IMenuProfileSystem
// ---------------------------------------------------------------------------

pub struct ProfileSystemState {
    pub profiles: Mutex<HashMap<String, usize>>,
    allocator: u64,
}

extern "C" fn profiles_get(this: *mut c_void, name: *const c_char) -> *mut IMenuProfile {
    let state = unsafe { object_state::<ProfileSystemState>(this) };
    let name = unsafe { CStr::from_ptr(name) }.to_string_lossy();
    state
        .profiles
        .lock()
        .get(name.as_ref())
        .map_or(std::ptr::null_mut(), |&addr| addr as *mut IMenuProfile)
}

extern "C" fn profiles_add_or_replace(this: *mut c_void, name: *const c_char, _data: *mut c_void) {
    let state = unsafe { object_state::<ProfileSystemState>(this) };
    let name = unsafe { CStr::from_ptr(name) }.to_string_lossy().into_owned();
    let profile = fake_profile(&name, "custom");
    state.profiles.lock().insert(name, profile.addr());
}

extern "C" fn profiles_allocator(this: *mut c_void) -> *mut c_void {
    let state = unsafe { object_state::<ProfileSystemState>(this) };
    &state.allocator as *const u64 as *mut c_void
}

// ---------------------------------------------------------------------------
// IMenu
// ---------------------------------------------------------------------------

/// One item added through `Menu_AddItem`
pub struct FakeItem {
    pub content: String,
    pub style: u8,
    pub handler: Option<ItemSelectFn>,
    pub data: usize,
}

pub struct MenuState {
    pub profile: usize,
    pub handler: usize,
    pub title: Mutex<CString>,
    pub null_title: AtomicBool,
    pub reject_items: AtomicBool,
    pub items: Mutex<Vec<FakeItem>>,
    pub applied: Mutex<Vec<(i32, usize)>>,
    pub positions: Mutex<HashMap<i32, i32>>,
}

extern "C" fn menu_get_profile(this: *mut c_void) -> *mut IMenuProfile {
    unsafe { object_state::<MenuState>(this) }.profile as *mut IMenuProfile
}

extern "C" fn menu_apply_profile(
    this: *mut c_void,
    slot: c_int,
    profile: *mut IMenuProfile,
) -> bool {
    let state = unsafe { object_state::<MenuState>(this) };
    state.applied.lock().push((slot, profile as usize));
    !profile.is_null()
}

extern "C" fn menu_get_handler(this: *mut c_void) -> *mut IMenuHandler {
    unsafe { object_state::<MenuState>(this) }.handler as *mut IMenuHandler
}

extern "C" fn menu_get_current_position(this: *mut c_void, slot: c_int) -> c_int {
    let state = unsafe { object_state::<MenuState>(this) };
    state.positions.lock().get(&slot).copied().unwrap_or(-1)
}

fn new_menu(profile: usize, handler: usize, short: bool) -> NativeHandle {
    let mut entries = vec![
        menu_get_profile as *const () as usize,
        menu_apply_profile as *const () as usize,
        menu_get_handler as *const () as usize,
    ];
    if !short {
        entries.extend(std::iter::repeat(unused_slot as *const () as usize).take(6));
        entries.push(menu_get_current_position as *const () as usize);
    }

    leak_object(
        leak_vtable(&entries),
        MenuState {
            profile,
            handler,
            title: Mutex::new(CString::default()),
            null_title: AtomicBool::new(false),
            reject_items: AtomicBool::new(false),
            items: Mutex::new(Vec::new()),
            applied: Mutex::new(Vec::new()),
            positions: Mutex::new(HashMap::new()),
        },
    )
}

unsafe extern "C" fn export_add_item(
    menu: *mut IMenu,
    style: u8,
    content: *const c_char,
    handler: Option<ItemSelectFn>,
    data: *mut c_void,
) -> c_int {
    let state = object_state::<MenuState>(menu.cast());
    if state.reject_items.load(Ordering::SeqCst) {
        return -1;
    }

    let mut items = state.items.lock();
    items.push(FakeItem {
        content: CStr::from_ptr(content).to_string_lossy().into_owned(),
        style,
        handler,
        data: data as usize,
    });
    (items.len() - 1) as c_int
}

unsafe extern "C" fn export_get_title(menu: *mut IMenu) -> *const c_char {
    let state = object_state::<MenuState>(menu.cast());
    if state.null_title.load(Ordering::SeqCst) {
        return std::ptr::null();
    }
    // The buffer stays alive until the next set_title
    state.title.lock().as_ptr()
}

unsafe extern "C" fn export_set_title(menu: *mut IMenu, title: *const c_char) {
    let state = object_state::<MenuState>(menu.cast());
    *state.title.lock() = CStr::from_ptr(title).to_owned();
}

/// Exports of the fake library
pub static FAKE_EXPORTS: ExportTable = ExportTable::from_raw(
    Some(export_add_item as MenuAddItemFn),
    Some(export_get_title as MenuGetTitleFn),
    Some(export_set_title as MenuSetTitleFn),
);

/// A library that loaded but exports nothing
pub static NO_EXPORTS: ExportTable = ExportTable::unresolved();

// ---------------------------------------------------------------------------
// IMenuSystem
// ---------------------------------------------------------------------------

pub struct SystemState {
    pub profile_system: usize,
    pub players: Mutex<HashMap<i32, usize>>,
    pub null_profiles: AtomicBool,
    pub null_menus: AtomicBool,
    pub short_menus: AtomicBool,
    pub menus: Mutex<Vec<usize>>,
    pub displayed: Mutex<Vec<(usize, i32, i32, i32)>>,
    pub closed: Mutex<Vec<usize>>,
}

extern "C" fn system_get_player(this: *mut c_void, slot: c_int) -> *mut c_void {
    let state = unsafe { object_state::<SystemState>(this) };
    state
        .players
        .lock()
        .get(&slot)
        .map_or(std::ptr::null_mut(), |&addr| addr as *mut c_void)
}

extern "C" fn system_get_profiles(this: *mut c_void) -> *mut IMenuProfileSystem {
    let state = unsafe { object_state::<SystemState>(this) };
    if state.null_profiles.load(Ordering::SeqCst) {
        return std::ptr::null_mut();
    }
    state.profile_system as *mut IMenuProfileSystem
}

extern "C" fn system_create_instance(
    this: *mut c_void,
    profile: *mut IMenuProfile,
    handler: *mut IMenuHandler,
) -> *mut IMenu {
    let state = unsafe { object_state::<SystemState>(this) };
    if state.null_menus.load(Ordering::SeqCst) {
        return std::ptr::null_mut();
    }
    // The real library crashes here; the bridge must never pass null
    if profile.is_null() {
        return std::ptr::null_mut();
    }

    let menu = new_menu(
        profile as usize,
        handler as usize,
        state.short_menus.load(Ordering::SeqCst),
    );
    state.menus.lock().push(menu.addr());
    menu.as_ptr()
}

extern "C" fn system_display(
    this: *mut c_void,
    menu: *mut IMenu,
    slot: c_int,
    start_item: c_int,
    display_time: c_int,
) -> bool {
    let state = unsafe { object_state::<SystemState>(this) };
    if menu.is_null() {
        return false;
    }
    state
        .displayed
        .lock()
        .push((menu as usize, slot, start_item, display_time));
    unsafe { object_state::<MenuState>(menu.cast()) }
        .positions
        .lock()
        .insert(slot, start_item);
    true
}

extern "C" fn system_close(this: *mut c_void, menu: *mut IMenu) -> bool {
    let state = unsafe { object_state::<SystemState>(this) };
    state.closed.lock().push(menu as usize);
    state.menus.lock().contains(&(menu as usize))
}

/// A complete fake menu system with a `"default"` profile
pub struct FakeMenuSystem {
    pub system: NativeHandle,
    pub profile_system: NativeHandle,
    pub default_profile: NativeHandle,
}

impl FakeMenuSystem {
    pub fn new() -> Self {
        let default_profile = fake_profile("Default", "Default menu profile");

        let profile_system = leak_object(
            leak_vtable(&[
                profiles_get as *const () as usize,
                profiles_add_or_replace as *const () as usize,
                profiles_allocator as *const () as usize,
            ]),
            ProfileSystemState {
                profiles: Mutex::new(HashMap::from([(
                    "default".to_string(),
                    default_profile.addr(),
                )])),
                allocator: 0,
            },
        );

        let mut entries = vec![unused_slot as *const () as usize; 10];
        entries.extend([
            system_get_player as *const () as usize,
            system_get_profiles as *const () as usize,
            system_create_instance as *const () as usize,
            system_display as *const () as usize,
            system_close as *const () as usize,
        ]);

        let system = leak_object(
            leak_vtable(&entries),
            SystemState {
                profile_system: profile_system.addr(),
                players: Mutex::new(HashMap::new()),
                null_profiles: AtomicBool::new(false),
                null_menus: AtomicBool::new(false),
                short_menus: AtomicBool::new(false),
                menus: Mutex::new(Vec::new()),
                displayed: Mutex::new(Vec::new()),
                closed: Mutex::new(Vec::new()),
            },
        );

        Self {
            system,
            profile_system,
            default_profile,
        }
    }

    /// Proxy over this system with every export resolved
    pub fn menu_system(&self) -> MenuSystem {
        self.menu_system_with(&FAKE_EXPORTS)
    }

    pub fn menu_system_with(&self, exports: &'static ExportTable) -> MenuSystem {
        let system = unsafe { MenuSystem::from_handle(self.system, exports) }.unwrap();
        system.set_settle_frames(0);
        system
    }

    pub fn system_state(&self) -> &SystemState {
        unsafe { object_state::<SystemState>(self.system.as_ptr()) }
    }

    pub fn profile_system_state(&self) -> &ProfileSystemState {
        unsafe { object_state::<ProfileSystemState>(self.profile_system.as_ptr()) }
    }

    pub fn menu_state(&self, menu: NativeHandle) -> &MenuState {
        unsafe { object_state::<MenuState>(menu.as_ptr()) }
    }

    pub fn remove_profile(&self, name: &str) {
        self.profile_system_state().profiles.lock().remove(name);
    }

    /// Give `slot` a native player object
    pub fn connect_player(&self, slot: i32) -> NativeHandle {
        let player = self.leak_token();
        self.system_state().players.lock().insert(slot, player.addr());
        player
    }

    /// A unique non-null address with nothing behind it
    pub fn leak_token(&self) -> NativeHandle {
        NativeHandle::from_ptr(Box::leak(Box::new(0u64)) as *const u64)
    }

    /// Data pointer native code holds for item `item` of `menu`
    pub fn item_data(&self, menu: NativeHandle, item: usize) -> *mut c_void {
        self.menu_state(menu).items.lock()[item].data as *mut c_void
    }

    /// Simulate the player in `slot` selecting `item`
    ///
    /// Returns `false` if the item has no handler.
    pub fn select(&self, menu: NativeHandle, slot: i32, item: usize) -> bool {
        let (handler, data) = {
            let items = self.menu_state(menu).items.lock();
            (items[item].handler, items[item].data)
        };

        match handler {
            Some(handler) => {
                handler(menu.as_ptr(), slot, item as c_int, item as c_int, data as *mut c_void);
                true
            }
            None => false,
        }
    }
}
