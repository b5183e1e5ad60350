//! Frame clock and deferred calls
//!
//! The host drives [`on_game_frame`] once per server tick. Menus read the
//! counter to tell whether they have survived long enough for the native
//! side to finish populating them, and deferred work queued from any thread
//! runs at the start of the next frame.

pub mod queue;

use std::sync::atomic::{AtomicU64, Ordering};

pub use queue::{process_queued_tasks, queue_task, Task};

/// Frame counter (increments every `on_game_frame` call)
static FRAME_COUNT: AtomicU64 = AtomicU64::new(0);

/// Get the current frame count
pub fn frame_count() -> u64 {
    FRAME_COUNT.load(Ordering::Acquire)
}

/// Advance the frame clock and run deferred work.
///
/// Called by the host every server tick, on the main thread.
pub fn on_game_frame() {
    let frame = FRAME_COUNT.fetch_add(1, Ordering::AcqRel) + 1;

    let processed = process_queued_tasks();
    if processed > 0 {
        tracing::trace!("Processed {} deferred calls on frame {}", processed, frame);
    }
}
