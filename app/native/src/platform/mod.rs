//! Operating-system seams.
//!
//! Every interaction with the window server goes through one of the traits
//! below so the anchor core can be driven by in-memory fakes in tests. The
//! CoreGraphics implementations live in [`macos`].
//!
//! - [`DisplayBackend`] - active display enumeration
//! - [`DockProbe`] - Dock orientation preference and on-screen frame
//! - [`PermissionProbe`] - accessibility trust
//! - [`EventTapDriver`] / [`InstalledTap`] - the system-wide pointer tap
//! - [`PointerDriver`] - cursor warping and synthetic motion

pub mod inventory;
#[cfg(target_os = "macos")]
pub mod macos;
pub mod thread;

use std::sync::Arc;

pub use thread::spawn_named_thread;

use crate::display::{RawDisplay, SystemDisplayInventory};
use crate::error::Result;
use crate::geometry::{Point, Rect};
use crate::intercept::{TapEvent, Verdict};
use crate::zone::DockEdge;

/// Enumerates the displays currently attached and active.
pub trait DisplayBackend: Send + Sync {
    fn active_displays(&self) -> Vec<RawDisplay>;
}

/// Reads where the Dock lives.
pub trait DockProbe: Send + Sync {
    /// The edge the Dock is configured to attach to.
    fn orientation(&self) -> DockEdge;

    /// The Dock window's frame in global coordinates, if it can be found.
    fn dock_frame(&self) -> Option<Rect>;
}

/// Accessibility trust checks.
pub trait PermissionProbe: Send + Sync {
    fn is_trusted(&self) -> bool;

    /// Checks trust and asks the system to show its permission prompt when
    /// the process is not trusted yet.
    fn request(&self) -> bool;
}

/// Callback invoked for every event the tap receives.
///
/// Runs on the tap thread inside the window server's delivery path: it must
/// not block, allocate heavily, or log.
pub type TapCallback = Arc<dyn Fn(&TapEvent) -> Verdict + Send + Sync>;

/// Installs system-wide pointer taps.
pub trait EventTapDriver: Send + Sync {
    /// Installs a filtering tap for pointer motion and tap-disabled
    /// notifications.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::AnchorError::TapInstallationFailed`] when the
    /// window server refuses to create the tap.
    fn install(&self, callback: TapCallback) -> Result<Box<dyn InstalledTap>>;
}

/// A tap that is currently installed.
pub trait InstalledTap: Send {
    /// Whether the tap is still registered with the window server.
    ///
    /// A tap the window server merely disabled is re-enabled and still
    /// counts as valid.
    fn is_valid(&self) -> bool;

    /// Disables and releases the tap.
    fn remove(self: Box<Self>);
}

/// Moves the cursor and injects synthetic pointer motion.
pub trait PointerDriver: Send + Sync {
    /// Current pointer location in global coordinates.
    fn location(&self) -> Option<Point>;

    /// Teleports the cursor without generating motion events.
    fn warp(&self, to: Point);

    /// Posts a pointer-moved event at `to`, stamped with `marker`.
    fn post_move(&self, to: Point, marker: i64);

    fn set_cursor_visible(&self, visible: bool);
}

/// The full set of OS seams the anchor core needs.
#[derive(Clone)]
pub struct Platform {
    pub displays: Arc<dyn DisplayBackend>,
    pub inventory: Arc<dyn SystemDisplayInventory>,
    pub dock: Arc<dyn DockProbe>,
    pub permissions: Arc<dyn PermissionProbe>,
    pub taps: Arc<dyn EventTapDriver>,
    pub pointer: Arc<dyn PointerDriver>,
}

impl Platform {
    /// The CoreGraphics-backed platform.
    #[cfg(target_os = "macos")]
    #[must_use]
    pub fn native() -> Self {
        Self {
            displays: Arc::new(macos::displays::CoreGraphicsDisplays),
            inventory: Arc::new(inventory::SystemProfilerInventory::default()),
            dock: Arc::new(macos::dock::WindowServerDock),
            permissions: Arc::new(macos::accessibility::AccessibilityPermission),
            taps: Arc::new(macos::event_tap::CoreGraphicsTaps),
            pointer: Arc::new(macos::pointer::CoreGraphicsPointer),
        }
    }
}

impl std::fmt::Debug for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Platform").finish_non_exhaustive()
    }
}
