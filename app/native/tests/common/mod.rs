//! In-memory platform for driving [`DockAnchor`] without a window server.
//!
//! The fake pointer routes every synthetic move through whatever tap is
//! installed, and moves the fake Dock when an unfiltered move reaches a
//! display's trigger zone, the way the window server does.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use dockanchor_lib::display::naming::EmptyInventory;
use dockanchor_lib::display::{RawDisplay, SystemDisplayInventory};
use dockanchor_lib::error::{AnchorError, Result};
use dockanchor_lib::geometry::{Point, Rect};
use dockanchor_lib::intercept::{EngineOptions, TapEvent, TapEventKind, Verdict};
use dockanchor_lib::platform::{
    DisplayBackend, DockProbe, EventTapDriver, InstalledTap, Platform, PermissionProbe,
    PointerDriver, TapCallback,
};
use dockanchor_lib::reactor::AnchorSettings;
use dockanchor_lib::relocation::RelocationTuning;
use dockanchor_lib::zone::{DockEdge, trigger_zone};
use dockanchor_lib::{DockAnchor, DockAnchorOptions, Fingerprint};
use parking_lot::Mutex;

pub const PRIMARY: Rect = Rect::new(0.0, 0.0, 1920.0, 1080.0);
pub const SECONDARY: Rect = Rect::new(1920.0, 0.0, 1920.0, 1080.0);
pub const LEFT_OF_PRIMARY: Rect = Rect::new(-1920.0, 0.0, 1920.0, 1080.0);

/// A display with a UUID and serial number.
pub fn display(handle: u32, uuid: &str, serial: Option<u32>, bounds: Rect, primary: bool) -> RawDisplay {
    RawDisplay {
        handle,
        bounds,
        is_primary: primary,
        uuid: Some(uuid.to_string()),
        serial,
        ..RawDisplay::default()
    }
}

#[derive(Default)]
pub struct FakeDisplays {
    displays: Mutex<Vec<RawDisplay>>,
}

impl FakeDisplays {
    pub fn set(&self, displays: Vec<RawDisplay>) { *self.displays.lock() = displays; }
}

impl DisplayBackend for FakeDisplays {
    fn active_displays(&self) -> Vec<RawDisplay> { self.displays.lock().clone() }
}

pub struct FakeDock {
    edge: Mutex<DockEdge>,
    frame: Mutex<Option<Rect>>,
    moves: AtomicUsize,
}

impl FakeDock {
    fn on(bounds: &Rect) -> Self {
        Self {
            edge: Mutex::new(DockEdge::Bottom),
            frame: Mutex::new(Some(dock_frame_on(bounds))),
            moves: AtomicUsize::new(0),
        }
    }

    pub fn move_to(&self, bounds: &Rect) { *self.frame.lock() = Some(dock_frame_on(bounds)); }

    pub fn is_on(&self, bounds: &Rect) -> bool {
        self.frame.lock().is_some_and(|frame| bounds.contains(frame.center()))
    }

    /// How many times the Dock changed display.
    pub fn moves(&self) -> usize { self.moves.load(Ordering::SeqCst) }
}

fn dock_frame_on(bounds: &Rect) -> Rect {
    Rect::new(bounds.x + bounds.width / 4.0, bounds.max_y() - 70.0, bounds.width / 2.0, 70.0)
}

impl DockProbe for FakeDock {
    fn orientation(&self) -> DockEdge { *self.edge.lock() }

    fn dock_frame(&self) -> Option<Rect> { *self.frame.lock() }
}

pub struct FakePermission(AtomicBool);

impl FakePermission {
    pub fn set(&self, trusted: bool) { self.0.store(trusted, Ordering::SeqCst); }
}

impl PermissionProbe for FakePermission {
    fn is_trusted(&self) -> bool { self.0.load(Ordering::SeqCst) }

    fn request(&self) -> bool { self.is_trusted() }
}

#[derive(Default)]
pub struct FakeTaps {
    callback: Arc<Mutex<Option<TapCallback>>>,
    valid: Arc<AtomicBool>,
    installs: AtomicUsize,
    removals: Arc<AtomicUsize>,
    refuse: AtomicBool,
}

struct FakeTap {
    callback: Arc<Mutex<Option<TapCallback>>>,
    valid: Arc<AtomicBool>,
    removals: Arc<AtomicUsize>,
}

impl InstalledTap for FakeTap {
    fn is_valid(&self) -> bool { self.valid.load(Ordering::SeqCst) }

    fn remove(self: Box<Self>) {
        self.callback.lock().take();
        self.removals.fetch_add(1, Ordering::SeqCst);
    }
}

impl EventTapDriver for FakeTaps {
    fn install(&self, callback: TapCallback) -> Result<Box<dyn InstalledTap>> {
        if self.refuse.load(Ordering::SeqCst) {
            return Err(AnchorError::TapInstallationFailed { needs_permission_reset: false });
        }
        self.installs.fetch_add(1, Ordering::SeqCst);
        self.valid.store(true, Ordering::SeqCst);
        *self.callback.lock() = Some(callback);
        Ok(Box::new(FakeTap {
            callback: Arc::clone(&self.callback),
            valid: Arc::clone(&self.valid),
            removals: Arc::clone(&self.removals),
        }))
    }
}

impl FakeTaps {
    /// Delivers `event` to the installed tap. `None` when no tap is installed.
    pub fn deliver(&self, event: &TapEvent) -> Option<Verdict> {
        let callback = self.callback.lock().clone()?;
        Some(callback(event))
    }

    /// Delivers a real (hardware) pointer move.
    pub fn real_move(&self, x: f64, y: f64) -> Option<Verdict> {
        self.deliver(&TapEvent::moved(Point::new(x, y)))
    }

    pub fn is_installed(&self) -> bool { self.callback.lock().is_some() }

    pub fn installs(&self) -> usize { self.installs.load(Ordering::SeqCst) }

    pub fn removals(&self) -> usize { self.removals.load(Ordering::SeqCst) }

    /// Makes the system disable the tap, as it does after a callback timeout.
    pub fn invalidate(&self) { self.valid.store(false, Ordering::SeqCst); }
}

/// A real move that arrived while a synthetic one was being posted.
#[derive(Debug, Clone, PartialEq)]
pub struct Interleaved {
    pub synthetic: Option<Verdict>,
    pub real: Option<Verdict>,
}

pub struct FakePointer {
    taps: Arc<FakeTaps>,
    dock: Arc<FakeDock>,
    displays: Arc<FakeDisplays>,
    location: Mutex<Point>,
    warps: Mutex<Vec<Point>>,
    posted: Mutex<Vec<Interleaved>>,
    hidden: AtomicBool,
    /// Inject a real hardware move alongside every synthetic one.
    pub jitter: AtomicBool,
}

impl FakePointer {
    pub fn warps(&self) -> Vec<Point> { self.warps.lock().clone() }

    pub fn posted(&self) -> Vec<Interleaved> { self.posted.lock().clone() }

    pub fn is_hidden(&self) -> bool { self.hidden.load(Ordering::SeqCst) }

    pub fn location(&self) -> Point { *self.location.lock() }

    pub fn place(&self, at: Point) { *self.location.lock() = at; }
}

impl PointerDriver for FakePointer {
    fn location(&self) -> Option<Point> { Some(*self.location.lock()) }

    fn warp(&self, to: Point) {
        self.warps.lock().push(to);
        *self.location.lock() = to;
    }

    fn post_move(&self, to: Point, marker: i64) {
        let event = TapEvent { kind: TapEventKind::PointerMoved, location: to, user_data: marker };
        let synthetic = self.taps.deliver(&event);

        let real = if self.jitter.load(Ordering::SeqCst) {
            self.taps.real_move(to.x - 1.0, to.y)
        } else {
            None
        };

        *self.location.lock() = to;
        self.posted.lock().push(Interleaved { synthetic: synthetic.clone(), real });

        if synthetic.as_ref().is_none_or(|verdict| !verdict.drops_event()) {
            self.window_server_sees(to);
        }
    }

    fn set_cursor_visible(&self, visible: bool) { self.hidden.store(!visible, Ordering::SeqCst); }
}

impl FakePointer {
    fn window_server_sees(&self, at: Point) {
        let edge = self.dock.orientation();
        let target = self
            .displays
            .active_displays()
            .into_iter()
            .find(|d| trigger_zone(&d.bounds, edge).contains(at));

        if let Some(target) = target
            && !self.dock.is_on(&target.bounds)
        {
            self.dock.move_to(&target.bounds);
            self.dock.moves.fetch_add(1, Ordering::SeqCst);
        }
    }
}

/// Every fake plus the assembled service.
pub struct Harness {
    pub displays: Arc<FakeDisplays>,
    pub dock: Arc<FakeDock>,
    pub permission: Arc<FakePermission>,
    pub taps: Arc<FakeTaps>,
    pub pointer: Arc<FakePointer>,
    pub anchor: DockAnchor,
}

pub struct HarnessBuilder {
    displays: Vec<RawDisplay>,
    anchor: Option<Fingerprint>,
    settings: AnchorSettings,
    trusted: bool,
    dock_on: Rect,
    watchdog_interval: Duration,
    tuning: RelocationTuning,
}

impl Default for HarnessBuilder {
    fn default() -> Self {
        Self {
            displays: Vec::new(),
            anchor: None,
            settings: AnchorSettings { settle_delay: Duration::ZERO, ..AnchorSettings::default() },
            trusted: true,
            dock_on: PRIMARY,
            watchdog_interval: Duration::from_secs(3600),
            tuning: RelocationTuning {
                approach_steps: 4,
                step_delay: Duration::ZERO,
                hold_steps: 3,
                hold_delay: Duration::ZERO,
                settle_delay: Duration::ZERO,
                ..RelocationTuning::default()
            },
        }
    }
}

impl HarnessBuilder {
    pub fn displays(mut self, displays: Vec<RawDisplay>) -> Self {
        self.displays = displays;
        self
    }

    pub fn anchor(mut self, fingerprint: &str) -> Self {
        self.anchor = Some(Fingerprint::new(fingerprint));
        self
    }

    pub fn settings(mut self, f: impl FnOnce(&mut AnchorSettings)) -> Self {
        f(&mut self.settings);
        self
    }

    pub fn untrusted(mut self) -> Self {
        self.trusted = false;
        self
    }

    pub fn dock_on(mut self, bounds: Rect) -> Self {
        self.dock_on = bounds;
        self
    }

    pub fn watchdog_interval(mut self, interval: Duration) -> Self {
        self.watchdog_interval = interval;
        self
    }

    /// Keeps each session running long enough to race against.
    pub fn slow_hold(mut self) -> Self {
        self.tuning.hold_steps = 10;
        self.tuning.hold_delay = Duration::from_millis(30);
        self
    }

    pub fn build(self) -> Harness {
        let displays = Arc::new(FakeDisplays::default());
        displays.set(self.displays);
        let dock = Arc::new(FakeDock::on(&self.dock_on));
        let permission = Arc::new(FakePermission(AtomicBool::new(self.trusted)));
        let taps = Arc::new(FakeTaps::default());
        let pointer = Arc::new(FakePointer {
            taps: Arc::clone(&taps),
            dock: Arc::clone(&dock),
            displays: Arc::clone(&displays),
            location: Mutex::new(Point::new(100.0, 100.0)),
            warps: Mutex::new(Vec::new()),
            posted: Mutex::new(Vec::new()),
            hidden: AtomicBool::new(false),
            jitter: AtomicBool::new(false),
        });

        let platform = Platform {
            displays: Arc::clone(&displays) as Arc<dyn DisplayBackend>,
            inventory: Arc::new(EmptyInventory) as Arc<dyn SystemDisplayInventory>,
            dock: Arc::clone(&dock) as Arc<dyn DockProbe>,
            permissions: Arc::clone(&permission) as Arc<dyn PermissionProbe>,
            taps: Arc::clone(&taps) as Arc<dyn EventTapDriver>,
            pointer: Arc::clone(&pointer) as Arc<dyn PointerDriver>,
        };
        let options = DockAnchorOptions {
            anchor: self.anchor,
            settings: self.settings,
            tuning: self.tuning,
            profiles: Vec::new(),
            engine: EngineOptions {
                watchdog_interval: self.watchdog_interval,
                blocked_status_duration: Duration::from_millis(50),
                notice_cooldown: Duration::from_millis(20),
            },
        };
        let anchor = DockAnchor::new(platform, options).expect("build dock anchor");

        Harness { displays, dock, permission, taps, pointer, anchor }
    }
}

/// Polls `condition` until it holds or `timeout` elapses.
pub fn wait_for(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    condition()
}
