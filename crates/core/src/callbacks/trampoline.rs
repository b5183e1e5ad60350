//! Native landing point for item selections
//!
//! Every callback-style item is registered with the same function address,
//! [`on_item_selected`]. The item's data pointer carries the registry token.

use std::ffi::{c_int, c_void};

use menubridge_sdk::{IMenu, NativeHandle};

use super::{take, CallbackContext, CallbackToken};
use crate::boundary::boundary;

/// Item selection entry point called by the native menu library
///
/// Unknown or already consumed tokens are ignored. The context is removed
/// from the registry before its closure runs, so each token fires at most
/// once even if the closure re-enters the bridge.
pub extern "C" fn on_item_selected(
    menu: *mut IMenu,
    player_slot: c_int,
    item_index: c_int,
    item_on_page: c_int,
    data: *mut c_void,
) {
    let _ = boundary("menu item callback", || {
        dispatch(
            NativeHandle::from_ptr(menu),
            player_slot,
            item_index,
            item_on_page,
            data,
        )
    });
}

fn dispatch(
    menu: NativeHandle,
    player_slot: i32,
    item_index: i32,
    item_on_page: i32,
    data: *mut c_void,
) {
    let Some(token) = CallbackToken::from_ptr(data) else {
        tracing::debug!("Item {} of menu {} selected without a token", item_index, menu);
        return;
    };

    let Some(CallbackContext { callback, menu: owner }) = take(token) else {
        tracing::debug!("Ignoring selection for unknown callback {:?}", token);
        return;
    };

    if owner.handle() != menu {
        tracing::warn!(
            "Callback {:?} belongs to menu {} but fired from {}",
            token,
            owner.handle(),
            menu
        );
    }

    let player = owner.system().get_player(player_slot);
    tracing::trace!(
        "Menu {} item {} (page position {}) selected by slot {}",
        owner.handle(),
        item_index,
        item_on_page,
        player_slot
    );

    callback(player, &owner, item_index);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use crate::callbacks::{is_registered, register};
    use crate::testing::FakeMenuSystem;

    #[test]
    fn test_unknown_token_is_a_no_op() {
        on_item_selected(std::ptr::null_mut(), 0, 0, 0, std::ptr::null_mut());
        on_item_selected(std::ptr::null_mut(), 0, 0, 0, 0xdead_0001usize as *mut c_void);
    }

    #[test]
    fn test_fires_once() {
        let fake = FakeMenuSystem::new();
        let menu = fake.menu_system().create_menu(None, None).unwrap();

        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let token = register(
            &menu,
            Box::new(move |_, _, _| {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        );

        let raw = menu.handle().as_ptr::<IMenu>();
        on_item_selected(raw, 0, 0, 0, token.as_ptr());
        on_item_selected(raw, 0, 0, 0, token.as_ptr());

        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert!(!is_registered(token));
    }

    #[test]
    fn test_panicking_callback_is_contained_and_released() {
        let fake = FakeMenuSystem::new();
        let menu = fake.menu_system().create_menu(None, None).unwrap();

        let token = register(&menu, Box::new(|_, _, _| panic!("callback failure")));
        on_item_selected(menu.handle().as_ptr(), 0, 0, 0, token.as_ptr());

        assert!(!is_registered(token));
    }

    #[test]
    fn test_player_resolution() {
        let fake = FakeMenuSystem::new();
        let menu = fake.menu_system().create_menu(None, None).unwrap();
        let player = fake.connect_player(7);

        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        for slot in [7, 8] {
            let seen = seen.clone();
            let token = register(
                &menu,
                Box::new(move |player, _, _| seen.lock().push(player.map(|p| p.handle()))),
            );
            on_item_selected(menu.handle().as_ptr(), slot, 0, 0, token.as_ptr());
        }

        assert_eq!(*seen.lock(), vec![Some(player), None]);
    }

    #[test]
    fn test_reentrant_registration_from_callback() {
        let fake = FakeMenuSystem::new();
        let menu = fake.menu_system().create_menu(None, None).unwrap();

        let nested = Arc::new(parking_lot::Mutex::new(None));
        let slot = nested.clone();
        let token = register(
            &menu,
            Box::new(move |_, menu, _| {
                *slot.lock() = Some(register(menu, Box::new(|_, _, _| {})));
            }),
        );
        on_item_selected(menu.handle().as_ptr(), 0, 0, 0, token.as_ptr());

        let inner = nested.lock().take().unwrap();
        assert!(is_registered(inner));
        assert!(crate::callbacks::release(inner));
    }
}
