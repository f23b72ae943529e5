//! DockAnchor - keeps the macOS Dock on one display.
//!
//! macOS moves the Dock to whichever display the pointer pushes against at
//! the bottom (or side) edge. DockAnchor installs a system-wide event tap
//! that swallows pointer motion entering that trigger band on every display
//! except the chosen anchor, follows display hot-plugging, and moves the Dock
//! back by replaying a synthetic edge push when it ends up elsewhere.
//!
//! The library is split into platform-neutral logic driven through the
//! traits in [`platform`], and the CoreGraphics implementations behind them.
//! [`DockAnchor`] assembles the pieces.

pub mod anchor;
pub mod cli;
pub mod config;
pub mod constants;
pub mod display;
pub mod error;
pub mod events;
pub mod geometry;
pub mod intercept;
pub mod platform;
pub mod reactor;
pub mod relocation;
pub mod status;
pub mod zone;

pub use anchor::{DockAnchor, DockAnchorOptions};
pub use display::{DisplayDescriptor, Fingerprint};
pub use error::{AnchorError, Result};
pub use events::AnchorEvent;
pub use intercept::AnchorState;
pub use zone::DockEdge;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Installs the global tracing subscriber.
///
/// The filter comes from `DOCKANCHOR_LOG` when set, otherwise `debug` with
/// `verbose` and `info` without.
pub fn init_tracing(verbose: bool) {
    let fallback = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_env(constants::LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(fallback));

    // A subscriber may already be installed when embedded in another binary.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
        .try_init();
}
