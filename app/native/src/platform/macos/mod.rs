//! CoreGraphics implementations of the platform seams.
//!
//! Display reconfiguration callbacks are delivered on the thread that runs
//! the main run loop, so the binary must call [`run_main_loop`] on its main
//! thread after registering a [`DisplayReconfigurationMonitor`].

pub mod accessibility;
pub mod displays;
pub mod dock;
pub mod event_tap;
pub mod pointer;
pub mod reconfiguration;

use core_foundation::runloop::CFRunLoop;
pub use reconfiguration::DisplayReconfigurationMonitor;

/// Runs the current thread's run loop. Returns when the loop is stopped.
pub fn run_main_loop() { CFRunLoop::run_current(); }
