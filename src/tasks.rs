//! Background execution of long enumerations.
//!
//! A registry scan, a temp walk, or an inventory fetch must not block a
//! responsive caller, so it runs on a worker thread and delivers its result
//! back over a single-producer single-consumer channel. There is no
//! cancellation: once started, a task runs to completion or failure.

use std::thread;

use crossbeam_channel::{Receiver, bounded};

use crate::core::errors::{Result, WmhError};

/// Run `task` on a worker thread, returning the receiving end of a
/// capacity-one channel that will carry the single result.
pub fn run_background<T, F>(task: F) -> Receiver<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let (tx, rx) = bounded::<T>(1);
    thread::spawn(move || {
        // The receiver may have been dropped; nothing to deliver to then.
        let _ = tx.send(task());
    });
    rx
}

/// Block until a background task delivers, mapping a dead worker to a
/// channel error instead of a panic.
pub fn wait<T>(rx: &Receiver<T>) -> Result<T> {
    rx.recv().map_err(|_| WmhError::ChannelClosed {
        component: "background task",
    })
}
