//! Pure re-derivation of anchor state from a display set.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::display::{DisplayDescriptor, Fingerprint, find_display};
use crate::intercept::AnchorState;

/// Which display stands in while the anchor is disconnected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum DefaultAnchorPolicy {
    #[default]
    BuiltIn,
    MainDisplay,
}

/// The display used when no anchor applies.
///
/// Built-in policy prefers the built-in panel, then the main display, then
/// the first display. Main-display policy skips the built-in step.
#[must_use]
pub fn fallback_display(
    displays: &[DisplayDescriptor],
    policy: DefaultAnchorPolicy,
) -> Option<&DisplayDescriptor> {
    let builtin = || displays.iter().find(|d| d.is_builtin);
    let primary = || displays.iter().find(|d| d.is_primary);

    match policy {
        DefaultAnchorPolicy::BuiltIn => builtin().or_else(primary),
        DefaultAnchorPolicy::MainDisplay => primary(),
    }
    .or_else(|| displays.first())
}

/// Result of [`reconcile`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    pub state: AnchorState,
    /// The anchor now carries a richer fingerprint for the same display and
    /// the persisted value should be updated.
    pub anchor_refined: bool,
}

/// Re-derives anchor state for `displays`.
///
/// The anchor is never cleared or replaced by a different display: when it
/// is unavailable only `effective` falls back. When it is available under a
/// richer fingerprint (same UUID, newly readable serial), the anchor is
/// upgraded to that fingerprint. A connected profile target takes over
/// `effective` without touching the anchor.
#[must_use]
pub fn reconcile(
    previous: &AnchorState,
    displays: &[DisplayDescriptor],
    policy: DefaultAnchorPolicy,
) -> Reconciled {
    let (anchor, enforced, anchor_refined) = match previous.anchor.as_ref() {
        None => (None, None, false),
        Some(anchor) => match find_display(displays, anchor) {
            Some(display) => {
                let current = &display.fingerprint;
                let refined = current != anchor && current.has_suffix();
                let kept = if refined { current.clone() } else { anchor.clone() };
                (Some(kept), Some(current.clone()), refined)
            }
            None => (Some(anchor.clone()), None, false),
        },
    };

    let profile = previous
        .profile_anchor
        .as_ref()
        .and_then(|fp| find_display(displays, fp))
        .map(|d| d.fingerprint.clone());
    let effective = profile
        .or(enforced)
        .or_else(|| fallback_display(displays, policy).map(|d| d.fingerprint.clone()));

    Reconciled {
        state: AnchorState {
            anchor,
            effective,
            edge: previous.edge,
            profile_anchor: previous.profile_anchor.clone(),
        },
        anchor_refined,
    }
}

/// The main display's fingerprint, for the follow-main policy.
#[must_use]
pub fn primary_fingerprint(displays: &[DisplayDescriptor]) -> Option<Fingerprint> {
    displays.iter().find(|d| d.is_primary).map(|d| d.fingerprint.clone())
}
