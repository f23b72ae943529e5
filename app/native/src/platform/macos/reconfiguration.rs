//! Display reconfiguration notifications.

use std::ffi::c_void;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use crate::constants::SCREEN_CHANGE_DELAY;
use crate::error::{AnchorError, Result};
use crate::platform::spawn_named_thread;
use crate::reactor::TopologyChange;

type ReconfigurationCallback = unsafe extern "C" fn(u32, u32, *mut c_void);

#[link(name = "CoreGraphics", kind = "framework")]
unsafe extern "C" {
    fn CGDisplayRegisterReconfigurationCallback(
        callback: ReconfigurationCallback,
        user_info: *mut c_void,
    ) -> i32;
    fn CGDisplayRemoveReconfigurationCallback(
        callback: ReconfigurationCallback,
        user_info: *mut c_void,
    ) -> i32;
}

/// Keeps a reconfiguration callback registered until dropped.
///
/// Callbacks arrive in bursts. Each burst is collected for a short delay so
/// CoreGraphics finishes updating its display list, then handed to the
/// handler on a dedicated thread.
pub struct DisplayReconfigurationMonitor {
    sink: *mut Sender<TopologyChange>,
}

// SAFETY: `sink` is only dereferenced by the CoreGraphics callback and
// freed once in `Drop`, after the callback has been removed.
unsafe impl Send for DisplayReconfigurationMonitor {}

impl DisplayReconfigurationMonitor {
    /// Registers the callback and starts the delivery thread.
    ///
    /// # Errors
    ///
    /// Returns [`AnchorError::CommandError`] if the thread cannot be spawned
    /// or CoreGraphics rejects the registration.
    pub fn register<F>(handler: F) -> Result<Self>
    where
        F: Fn(Vec<TopologyChange>) + Send + 'static,
    {
        let (sender, changes) = mpsc::channel();
        spawn_named_thread("display-changes", move || deliver(&changes, &handler))
            .ok_or_else(|| AnchorError::CommandError("failed to spawn display change thread".into()))?;

        let sink = Box::into_raw(Box::new(sender));
        let result = unsafe { CGDisplayRegisterReconfigurationCallback(on_reconfigure, sink.cast()) };
        if result != 0 {
            drop(unsafe { Box::from_raw(sink) });
            return Err(AnchorError::CommandError(format!(
                "CGDisplayRegisterReconfigurationCallback failed: {result}"
            )));
        }

        tracing::debug!("display reconfiguration callback registered");
        Ok(Self { sink })
    }
}

impl Drop for DisplayReconfigurationMonitor {
    fn drop(&mut self) {
        unsafe {
            CGDisplayRemoveReconfigurationCallback(on_reconfigure, self.sink.cast());
            drop(Box::from_raw(self.sink));
        }
    }
}

fn deliver(changes: &Receiver<TopologyChange>, handler: &dyn Fn(Vec<TopologyChange>)) {
    while let Ok(first) = changes.recv() {
        thread::sleep(SCREEN_CHANGE_DELAY);
        let mut burst = vec![first];
        burst.extend(changes.try_iter());

        tracing::debug!(changes = ?burst, "display configuration changed");
        handler(burst);
    }
}

unsafe extern "C" fn on_reconfigure(display: u32, flags: u32, user_info: *mut c_void) {
    let Some(change) = TopologyChange::from_flags(display, flags) else {
        return;
    };
    // SAFETY: `user_info` is the boxed sender owned by the monitor.
    if let Some(sink) = unsafe { user_info.cast::<Sender<TopologyChange>>().as_ref() } {
        let _ = sink.send(change);
    }
}
