//! Error types for DockAnchor.
//!
//! Every fallible operation of the library surfaces an [`AnchorError`]. The
//! event tap callback never produces one: anything that goes wrong there is
//! resolved to pass-through and reported later through the status board.

use serde::Serialize;
use thiserror::Error;

/// Errors surfaced by the anchor core and its front ends.
///
/// Serializes as `{"kind": "...", "message": ...}` so front ends can render
/// structured failures.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", content = "message")]
pub enum AnchorError {
    /// The process is not trusted for accessibility.
    #[error("Accessibility permission is required to monitor pointer input")]
    PermissionDenied,
    /// Permission looks granted but the window server refused the tap.
    #[error("Failed to install the event tap{}", reset_hint(.needs_permission_reset))]
    TapInstallationFailed { needs_permission_reset: bool },
    /// The installed tap stopped being valid while monitoring.
    #[error("The event tap was invalidated by the system")]
    TapInvalidated,
    /// Accessibility permission was withdrawn while monitoring.
    #[error("Accessibility permission was revoked")]
    PermissionRevokedAtRuntime,
    /// The requested display is not currently attached.
    #[error("Display unavailable: {0}")]
    DisplayUnavailable(String),
    /// A relocation is already running.
    #[error("A relocation is already in progress")]
    RelocationInProgress,
    /// The operation needs a platform this build does not target.
    #[error("Unsupported: {0}")]
    Unsupported(String),
    /// Configuration error.
    #[error("Configuration error: {0}")]
    ConfigError(String),
    /// IO error.
    #[error("IO error: {0}")]
    IoError(String),
    /// Generic command error.
    #[error("{0}")]
    CommandError(String),
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn reset_hint(needs_reset: &bool) -> &'static str {
    if *needs_reset { " (remove and re-add the accessibility permission)" } else { "" }
}

impl AnchorError {
    /// Whether the error can only be resolved by the user in System Settings.
    #[must_use]
    pub const fn requires_user_action(&self) -> bool {
        matches!(
            self,
            Self::PermissionDenied
                | Self::PermissionRevokedAtRuntime
                | Self::TapInstallationFailed { .. }
        )
    }
}

impl From<std::io::Error> for AnchorError {
    fn from(err: std::io::Error) -> Self { Self::IoError(err.to_string()) }
}

impl From<serde_json::Error> for AnchorError {
    fn from(err: serde_json::Error) -> Self { Self::CommandError(err.to_string()) }
}

impl From<crate::config::ConfigError> for AnchorError {
    fn from(err: crate::config::ConfigError) -> Self { Self::ConfigError(err.to_string()) }
}

impl From<String> for AnchorError {
    fn from(msg: String) -> Self { Self::CommandError(msg) }
}

impl From<&str> for AnchorError {
    fn from(msg: &str) -> Self { Self::CommandError(msg.to_string()) }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AnchorError>;
