//! Deferred call queue
//!
//! Work queued here runs on the main thread during the next frame. Calls are
//! drained in FIFO order; a call that queues another call lands in a later
//! frame rather than the current drain.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use std::sync::LazyLock;

use crate::boundary::boundary;
use crate::error::{MenuError, MenuResult};

/// A call to execute on the main thread
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Capacity of the deferred call queue
const QUEUE_CAPACITY: usize = 1024;

struct TaskQueue {
    sender: Sender<Task>,
    receiver: Receiver<Task>,
}

static TASK_QUEUE: LazyLock<TaskQueue> = LazyLock::new(|| {
    let (sender, receiver) = bounded(QUEUE_CAPACITY);
    TaskQueue { sender, receiver }
});

/// Queue a call to execute on the next frame
///
/// This is safe to call from any thread.
///
/// # Errors
/// [`MenuError::QueueFull`] if the queue is at capacity. The call is dropped.
#[tracing::instrument(skip(task))]
pub fn queue_task<F>(task: F) -> MenuResult<()>
where
    F: FnOnce() + Send + 'static,
{
    match TASK_QUEUE.sender.try_send(Box::new(task)) {
        Ok(()) => Ok(()),
        Err(TrySendError::Full(_)) => {
            tracing::warn!("Deferred call queue full, dropping call");
            Err(MenuError::QueueFull)
        }
        Err(TrySendError::Disconnected(_)) => {
            tracing::error!("Deferred call queue disconnected");
            Err(MenuError::QueueFull)
        }
    }
}

/// Run the calls queued before this frame began
///
/// Each call runs behind the failure boundary so one panicking call does not
/// starve the rest. Returns the number of calls processed.
pub fn process_queued_tasks() -> usize {
    let pending = TASK_QUEUE.receiver.len();
    let mut count = 0;

    while count < pending {
        let Ok(task) = TASK_QUEUE.receiver.try_recv() else {
            break;
        };
        let _ = boundary("deferred call", task);
        count += 1;
    }

    count
}
