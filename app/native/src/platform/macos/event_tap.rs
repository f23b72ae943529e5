//! The system-wide pointer tap.
//!
//! Each installed tap gets its own thread and run loop. The tap is created
//! at the HID level as a filtering tap, so returning a null event from the
//! callback drops the event before the window server acts on it.

use std::ffi::c_void;
use std::panic::{self, AssertUnwindSafe};
use std::ptr;
use std::sync::Arc;
use std::sync::atomic::{AtomicPtr, Ordering};
use std::sync::mpsc::{self, SyncSender};

use core_foundation::base::TCFType;
use core_foundation::mach_port::CFMachPort;
use core_foundation::runloop::{CFRunLoop, kCFRunLoopCommonModes};
use core_foundation_sys::base::{CFRelease, CFRetain};
use core_foundation_sys::mach_port::CFMachPortInvalidate;
use core_foundation_sys::runloop::CFRunLoopStop;
use core_graphics::geometry::CGPoint;

use crate::constants::TAP_INSTALL_TIMEOUT;
use crate::error::{AnchorError, Result};
use crate::geometry::Point;
use crate::intercept::{TapEvent, TapEventKind, Verdict};
use crate::platform::{EventTapDriver, InstalledTap, TapCallback, spawn_named_thread};

type CGEventRef = *mut c_void;
type CGEventTapProxy = *mut c_void;
type CFMachPortRef = *mut c_void;

type CGEventTapCallBack = extern "C" fn(
    proxy: CGEventTapProxy,
    event_type: u32,
    event: CGEventRef,
    user_info: *mut c_void,
) -> CGEventRef;

#[link(name = "CoreGraphics", kind = "framework")]
unsafe extern "C" {
    fn CGEventTapCreate(
        tap: u32,
        place: u32,
        options: u32,
        events_of_interest: u64,
        callback: CGEventTapCallBack,
        user_info: *mut c_void,
    ) -> CFMachPortRef;

    fn CGEventTapEnable(tap: CFMachPortRef, enable: bool);
    fn CGEventTapIsEnabled(tap: CFMachPortRef) -> bool;
    fn CGEventGetLocation(event: CGEventRef) -> CGPoint;
    fn CGEventGetIntegerValueField(event: CGEventRef, field: u32) -> i64;
}

#[link(name = "CoreFoundation", kind = "framework")]
unsafe extern "C" {
    fn CFMachPortIsValid(port: CFMachPortRef) -> u8;
}

const K_CG_HID_EVENT_TAP: u32 = 0;
const K_CG_HEAD_INSERT_EVENT_TAP: u32 = 0;
const K_CG_EVENT_TAP_OPTION_DEFAULT: u32 = 0;

const K_CG_EVENT_MOUSE_MOVED: u32 = 5;
const K_CG_EVENT_LEFT_MOUSE_DRAGGED: u32 = 6;
const K_CG_EVENT_RIGHT_MOUSE_DRAGGED: u32 = 7;
const K_CG_EVENT_OTHER_MOUSE_DRAGGED: u32 = 27;
const K_CG_EVENT_TAP_DISABLED_BY_TIMEOUT: u32 = 0xFFFF_FFFE;
const K_CG_EVENT_TAP_DISABLED_BY_USER_INPUT: u32 = 0xFFFF_FFFF;

const K_CG_EVENT_SOURCE_USER_DATA: u32 = 42;

const EVENT_MASK: u64 = (1 << K_CG_EVENT_MOUSE_MOVED)
    | (1 << K_CG_EVENT_LEFT_MOUSE_DRAGGED)
    | (1 << K_CG_EVENT_RIGHT_MOUSE_DRAGGED)
    | (1 << K_CG_EVENT_OTHER_MOUSE_DRAGGED);

/// State shared between a tap handle and its run loop thread.
struct TapShared {
    callback: TapCallback,
    port: AtomicPtr<c_void>,
    run_loop: AtomicPtr<c_void>,
}

/// Installs CoreGraphics event taps.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoreGraphicsTaps;

impl EventTapDriver for CoreGraphicsTaps {
    fn install(&self, callback: TapCallback) -> Result<Box<dyn InstalledTap>> {
        let failed = || AnchorError::TapInstallationFailed { needs_permission_reset: false };

        let shared = Arc::new(TapShared {
            callback,
            port: AtomicPtr::new(ptr::null_mut()),
            run_loop: AtomicPtr::new(ptr::null_mut()),
        });
        let (ready, installed) = mpsc::sync_channel(1);

        let thread_shared = Arc::clone(&shared);
        spawn_named_thread("event-tap", move || run_tap(&thread_shared, &ready)).ok_or_else(failed)?;

        match installed.recv_timeout(TAP_INSTALL_TIMEOUT) {
            Ok(true) => {
                tracing::debug!("event tap installed");
                Ok(Box::new(CoreGraphicsTap { shared }))
            }
            Ok(false) => Err(failed()),
            Err(err) => {
                tracing::error!(error = %err, "event tap thread did not report in time");
                Err(failed())
            }
        }
    }
}

/// Handle to a running tap.
struct CoreGraphicsTap {
    shared: Arc<TapShared>,
}

/// What the watchdog sees when it inspects the tap port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PortHealth {
    Live,
    /// Disabled by the window server but still registered.
    Disabled,
    Dead,
}

impl PortHealth {
    const fn of(port_valid: bool, enabled: bool) -> Self {
        match (port_valid, enabled) {
            (false, _) => Self::Dead,
            (true, false) => Self::Disabled,
            (true, true) => Self::Live,
        }
    }
}

impl InstalledTap for CoreGraphicsTap {
    fn is_valid(&self) -> bool {
        let port = self.shared.port.load(Ordering::Acquire);
        if port.is_null() {
            return false;
        }

        let health = unsafe { PortHealth::of(CFMachPortIsValid(port) != 0, CGEventTapIsEnabled(port)) };
        match health {
            PortHealth::Live => true,
            PortHealth::Disabled => {
                tracing::debug!("event tap found disabled, re-enabling");
                unsafe { CGEventTapEnable(port, true) };
                true
            }
            PortHealth::Dead => false,
        }
    }

    fn remove(self: Box<Self>) {
        let port = self.shared.port.load(Ordering::Acquire);
        if !port.is_null() {
            unsafe { CGEventTapEnable(port, false) };
        }

        let run_loop = self.shared.run_loop.swap(ptr::null_mut(), Ordering::AcqRel);
        if !run_loop.is_null() {
            unsafe {
                CFRunLoopStop(run_loop.cast());
                CFRelease(run_loop.cast_const());
            }
        }
    }
}

fn run_tap(shared: &Arc<TapShared>, ready: &SyncSender<bool>) {
    let user_info = Arc::as_ptr(shared).cast_mut().cast::<c_void>();

    unsafe {
        let port = CGEventTapCreate(
            K_CG_HID_EVENT_TAP,
            K_CG_HEAD_INSERT_EVENT_TAP,
            K_CG_EVENT_TAP_OPTION_DEFAULT,
            EVENT_MASK,
            tap_callback,
            user_info,
        );

        if port.is_null() {
            tracing::error!("CGEventTapCreate returned null, check accessibility permission");
            let _ = ready.send(false);
            return;
        }

        let tap_port = CFMachPort::wrap_under_create_rule(port.cast());
        let Ok(source) = tap_port.create_runloop_source(0) else {
            tracing::error!("failed to create event tap run loop source");
            CFMachPortInvalidate(port.cast());
            let _ = ready.send(false);
            return;
        };

        let run_loop = CFRunLoop::get_current();
        run_loop.add_source(&source, kCFRunLoopCommonModes);

        shared.port.store(port, Ordering::Release);
        let retained = CFRetain(run_loop.as_concrete_TypeRef().cast());
        shared.run_loop.store(retained.cast_mut(), Ordering::Release);

        CGEventTapEnable(port, true);

        // The installer gave up waiting; nobody owns this tap.
        if ready.send(true).is_err() {
            CGEventTapEnable(port, false);
            CFMachPortInvalidate(port.cast());
            shared.port.store(ptr::null_mut(), Ordering::Release);
            let stale = shared.run_loop.swap(ptr::null_mut(), Ordering::AcqRel);
            if !stale.is_null() {
                CFRelease(stale.cast_const());
            }
            return;
        }

        CFRunLoop::run_current();

        shared.port.store(ptr::null_mut(), Ordering::Release);
        CFMachPortInvalidate(port.cast());
    }

    tracing::debug!("event tap run loop exited");
}

fn read_event(event_type: u32, event: CGEventRef) -> TapEvent {
    let kind = match event_type {
        K_CG_EVENT_MOUSE_MOVED
        | K_CG_EVENT_LEFT_MOUSE_DRAGGED
        | K_CG_EVENT_RIGHT_MOUSE_DRAGGED
        | K_CG_EVENT_OTHER_MOUSE_DRAGGED => TapEventKind::PointerMoved,
        K_CG_EVENT_TAP_DISABLED_BY_TIMEOUT => TapEventKind::TapDisabledByTimeout,
        K_CG_EVENT_TAP_DISABLED_BY_USER_INPUT => TapEventKind::TapDisabledByUserInput,
        _ => TapEventKind::Other,
    };

    if event.is_null() || kind != TapEventKind::PointerMoved {
        return TapEvent { kind, location: Point::default(), user_data: 0 };
    }

    let (location, user_data) = unsafe {
        (CGEventGetLocation(event), CGEventGetIntegerValueField(event, K_CG_EVENT_SOURCE_USER_DATA))
    };
    TapEvent { kind, location: Point::new(location.x, location.y), user_data }
}

/// Runs inside the window server's event delivery path.
extern "C" fn tap_callback(
    _proxy: CGEventTapProxy,
    event_type: u32,
    event: CGEventRef,
    user_info: *mut c_void,
) -> CGEventRef {
    // SAFETY: `user_info` points at the `TapShared` the tap thread keeps
    // alive for as long as its run loop runs.
    let Some(shared) = (unsafe { user_info.cast::<TapShared>().as_ref() }) else {
        return event;
    };

    let verdict = panic::catch_unwind(AssertUnwindSafe(|| {
        let tap_event = read_event(event_type, event);
        (shared.callback)(&tap_event)
    }))
    .unwrap_or(Verdict::Pass);

    match verdict {
        Verdict::ReenableTap => {
            let port = shared.port.load(Ordering::Acquire);
            if !port.is_null() {
                unsafe { CGEventTapEnable(port, true) };
            }
            event
        }
        verdict if verdict.drops_event() => ptr::null_mut(),
        _ => event,
    }
}
