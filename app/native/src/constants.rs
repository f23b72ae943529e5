//! Application-wide constants.

use std::time::Duration;

/// Application name, used for thread names, config directories and logs.
pub const APP_NAME: &str = "dockanchor";

/// Environment variable holding the tracing filter directive.
pub const LOG_ENV_VAR: &str = "DOCKANCHOR_LOG";

/// Thickness of the edge band that makes macOS move the Dock.
pub const TRIGGER_ZONE_THICKNESS: f64 = 10.0;

/// Value stamped into `kCGEventSourceUserData` on every synthetic event.
///
/// ASCII "DOCKANCH".
pub const SYNTHETIC_EVENT_MARKER: i64 = 0x444F_434B_414E_4348;

/// How often the watchdog re-verifies permission and tap health.
pub const WATCHDOG_INTERVAL: Duration = Duration::from_secs(2);

/// How long the "blocked" status stays up before reverting.
pub const BLOCKED_STATUS_DURATION: Duration = Duration::from_millis(1500);

/// Minimum spacing between two blocked-attempt notices.
pub const BLOCKED_NOTICE_COOLDOWN: Duration = Duration::from_millis(500);

/// How long the post-relocation status stays up before reverting.
pub const RELOCATION_STATUS_DURATION: Duration = Duration::from_secs(2);

/// Delay before handling a display reconfiguration callback.
///
/// CoreGraphics fires the callback before it has finished updating display
/// state; querying immediately returns stale bounds.
pub const SCREEN_CHANGE_DELAY: Duration = Duration::from_millis(200);

/// Capacity of the tap-to-notifier channel. Excess notices are dropped.
pub const NOTICE_CHANNEL_CAPACITY: usize = 16;

/// Capacity of the broadcast event bus.
pub const EVENT_BUS_CAPACITY: usize = 64;

/// How long to wait for a freshly spawned tap thread to report back.
pub const TAP_INSTALL_TIMEOUT: Duration = Duration::from_secs(2);
