//! Reconfiguration reactor.
//!
//! Every handler re-enumerates displays from scratch, re-derives anchor
//! state with [`reconcile`], and publishes one new snapshot. Nothing is
//! patched incrementally, so display handles reused across reconnects can
//! never leave stale state behind.

pub mod profiles;
pub mod reconcile;
pub mod topology;

use std::sync::Arc;
use std::time::Duration;

use eyeball::{SharedObservable, Subscriber};
use parking_lot::{Mutex, RwLock};
pub use profiles::{NoProfiles, ProfileActivator, ProfileRule, ProfileRules};
pub use reconcile::{DefaultAnchorPolicy, Reconciled, fallback_display, primary_fingerprint, reconcile};
use serde::Serialize;
pub use topology::{TopologyChange, coalesce};

use crate::display::{DisplayDescriptor, DisplayResolver, Fingerprint, find_display};
use crate::error::{AnchorError, Result};
use crate::events::{AnchorEvent, EventBus};
use crate::intercept::{AnchorState, InterceptState, Snapshot};
use crate::platform::DockProbe;
use crate::relocation::RelocationRequest;
use crate::status::StatusBoard;

/// Anchor policy pushed in by the settings collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorSettings {
    pub default_policy: DefaultAnchorPolicy,
    /// Re-anchor to the main display whenever it changes.
    pub follow_main_display: bool,
    pub auto_relocate_on_reconnect: bool,
    pub auto_relocate_on_anchor_change: bool,
    /// Wait before a topology-driven relocation.
    pub settle_delay: Duration,
}

impl Default for AnchorSettings {
    fn default() -> Self {
        Self {
            default_policy: DefaultAnchorPolicy::BuiltIn,
            follow_main_display: false,
            auto_relocate_on_reconnect: true,
            auto_relocate_on_anchor_change: true,
            settle_delay: Duration::from_millis(500),
        }
    }
}

/// Where relocation requests go.
pub trait RelocationScheduler: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if the request cannot be queued.
    fn schedule(&self, request: RelocationRequest) -> Result<()>;
}

impl RelocationScheduler for crate::relocation::RelocationWorker {
    fn schedule(&self, request: RelocationRequest) -> Result<()> { self.submit(request) }
}

/// Result of an explicit anchor selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum SetAnchorOutcome {
    Applied { anchor: Fingerprint },
    /// The requested display is not connected; the default was used instead
    /// and should be persisted in its place.
    Substituted { requested: Fingerprint, substitute: Fingerprint },
}

impl SetAnchorOutcome {
    #[must_use]
    pub const fn anchor(&self) -> &Fingerprint {
        match self {
            Self::Applied { anchor } | Self::Substituted { substitute: anchor, .. } => anchor,
        }
    }
}

/// Collaborators the reactor publishes to.
#[derive(Clone)]
pub struct ReactorContext {
    pub resolver: DisplayResolver,
    pub dock: Arc<dyn DockProbe>,
    pub state: Arc<InterceptState>,
    pub status: StatusBoard,
    pub events: EventBus,
    pub profiles: Arc<dyn ProfileActivator>,
    pub scheduler: Arc<dyn RelocationScheduler>,
}

/// What one transition decided beyond the re-derived state.
#[derive(Debug, Default)]
struct Transition {
    persist: bool,
    relocate: Option<Duration>,
}

/// Reacts to topology changes and explicit anchor selection.
pub struct Reactor {
    ctx: ReactorContext,
    settings: RwLock<AnchorSettings>,
    displays: SharedObservable<Arc<[DisplayDescriptor]>>,
    /// Current anchor state. Holding the lock serializes transitions.
    current: Mutex<AnchorState>,
}

impl std::fmt::Debug for Reactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reactor")
            .field("settings", &*self.settings.read())
            .field("anchor", &*self.current.lock())
            .finish_non_exhaustive()
    }
}

impl Reactor {
    #[must_use]
    pub fn new(ctx: ReactorContext, settings: AnchorSettings) -> Self {
        Self {
            ctx,
            settings: RwLock::new(settings),
            displays: SharedObservable::new(Arc::from(Vec::new())),
            current: Mutex::new(AnchorState::default()),
        }
    }

    #[must_use]
    pub fn settings(&self) -> AnchorSettings { *self.settings.read() }

    #[must_use]
    pub fn anchor_state(&self) -> AnchorState { self.current.lock().clone() }

    #[must_use]
    pub fn current_displays(&self) -> Arc<[DisplayDescriptor]> { self.displays.get() }

    #[must_use]
    pub fn subscribe_displays(&self) -> Subscriber<Arc<[DisplayDescriptor]>> {
        self.displays.subscribe()
    }

    /// Loads the persisted anchor. A disconnected anchor is kept as intent
    /// and a fallback is enforced until it returns.
    pub fn initialize(&self, anchor: Option<Fingerprint>) -> AnchorState {
        let mut current = self.current.lock();
        current.anchor = anchor;
        current.effective = None;

        let displays = self.enumerate();
        self.commit(&mut current, &displays, Transition::default());
        current.clone()
    }

    /// Handles one topology change.
    pub fn handle(&self, change: TopologyChange) {
        let mut current = self.current.lock();
        let settings = self.settings();
        let displays = self.enumerate();
        self.ctx.profiles.displays_changed(&displays);
        self.drop_inactive_profile(&mut current);

        tracing::debug!(change = ?change, count = displays.len(), "handling topology change");

        let mut transition = Transition::default();
        match change {
            TopologyChange::Added(handle) => {
                let added = displays.iter().find(|d| d.handle == handle);
                let claimed = added.and_then(|d| self.ctx.profiles.activate_for(&d.fingerprint));

                if let Some(target) = claimed {
                    current.profile_anchor = Some(target);
                } else if settings.follow_main_display && !self.ctx.profiles.is_active() {
                    transition.persist = self.follow_primary(&mut current, &displays);
                }

                if settings.auto_relocate_on_reconnect {
                    transition.relocate = Some(settings.settle_delay);
                }
            }
            TopologyChange::MainDisplayChanged => {
                if settings.follow_main_display && !self.ctx.profiles.is_active() {
                    transition.persist = self.follow_primary(&mut current, &displays);
                    if transition.persist && settings.auto_relocate_on_anchor_change {
                        transition.relocate = Some(settings.settle_delay);
                    }
                }
            }
            TopologyChange::Removed(_) | TopologyChange::Reconfigured | TopologyChange::ModeChanged => {}
        }

        self.commit(&mut current, &displays, transition);
    }

    /// Re-enumerates on demand.
    pub fn refresh(&self) -> Arc<[DisplayDescriptor]> {
        self.handle(TopologyChange::Reconfigured);
        self.current_displays()
    }

    /// Explicit anchor selection by the user.
    ///
    /// # Errors
    ///
    /// Returns [`AnchorError::DisplayUnavailable`] when the display is not
    /// connected and there is no display to substitute.
    pub fn set_anchor(&self, requested: &Fingerprint) -> Result<SetAnchorOutcome> {
        let mut current = self.current.lock();
        let settings = self.settings();
        let displays = self.current_displays();

        let outcome = match find_display(&displays, requested) {
            Some(display) => SetAnchorOutcome::Applied { anchor: display.fingerprint.clone() },
            None => {
                let substitute = fallback_display(&displays, settings.default_policy)
                    .ok_or_else(|| AnchorError::DisplayUnavailable(requested.to_string()))?;
                tracing::warn!(
                    requested = %requested,
                    substitute = %substitute.fingerprint,
                    "requested anchor unavailable, substituting default"
                );
                SetAnchorOutcome::Substituted {
                    requested: requested.clone(),
                    substitute: substitute.fingerprint.clone(),
                }
            }
        };

        current.anchor = Some(outcome.anchor().clone());
        current.profile_anchor = None;
        let transition = Transition {
            persist: true,
            relocate: settings.auto_relocate_on_anchor_change.then_some(Duration::ZERO),
        };
        self.commit(&mut current, &displays, transition);
        Ok(outcome)
    }

    /// Applies new settings and re-derives state under the new policy.
    pub fn update_settings(&self, settings: AnchorSettings) {
        let mut current = self.current.lock();
        let previous = std::mem::replace(&mut *self.settings.write(), settings);
        let profile_dropped = self.drop_inactive_profile(&mut current);
        if previous == settings && !profile_dropped {
            return;
        }

        tracing::debug!(settings = ?settings, "anchor settings updated");
        let displays = self.current_displays();
        let mut transition = Transition::default();
        if settings.follow_main_display && !previous.follow_main_display && !self.ctx.profiles.is_active()
        {
            transition.persist = self.follow_primary(&mut current, &displays);
        }
        self.commit(&mut current, &displays, transition);
    }

    /// Clears the profile override once the activator has let it go.
    fn drop_inactive_profile(&self, current: &mut AnchorState) -> bool {
        if current.profile_anchor.is_none() || self.ctx.profiles.is_active() {
            return false;
        }
        tracing::info!(anchor = ?current.anchor.as_ref().map(Fingerprint::as_str), "profile released anchor");
        current.profile_anchor = None;
        true
    }

    fn follow_primary(&self, current: &mut AnchorState, displays: &[DisplayDescriptor]) -> bool {
        let Some(primary) = primary_fingerprint(displays) else {
            return false;
        };
        if current.anchor.as_ref().is_some_and(|anchor| anchor.same_display(&primary)) {
            return false;
        }
        tracing::info!(anchor = %primary, "following main display");
        current.anchor = Some(primary);
        true
    }

    fn enumerate(&self) -> Arc<[DisplayDescriptor]> {
        let displays: Arc<[DisplayDescriptor]> = Arc::from(self.ctx.resolver.enumerate());
        self.displays.set(Arc::clone(&displays));
        self.ctx.events.emit(AnchorEvent::DisplayListChanged(Arc::clone(&displays)));
        displays
    }

    /// Re-derives, publishes and reports the new state.
    fn commit(
        &self,
        current: &mut AnchorState,
        displays: &Arc<[DisplayDescriptor]>,
        transition: Transition,
    ) {
        let previous = current.clone();
        current.edge = self.ctx.dock.orientation();

        let Reconciled { state, anchor_refined } =
            reconcile(current, displays, self.settings().default_policy);
        *current = state;

        self.ctx.state.publish(Snapshot::new(Arc::clone(displays), current.clone()));
        self.update_status(current, displays);

        let persist = transition.persist || anchor_refined;
        if persist || current.anchor != previous.anchor || current.effective != previous.effective {
            if current.is_fallback() {
                let missing = current.anchor.as_ref().map(ToString::to_string).unwrap_or_default();
                tracing::warn!(
                    error = %AnchorError::DisplayUnavailable(missing),
                    effective = ?current.effective.as_ref().map(Fingerprint::as_str),
                    "anchor display disconnected, enforcing fallback"
                );
            } else {
                tracing::info!(
                    anchor = ?current.anchor.as_ref().map(Fingerprint::as_str),
                    persist,
                    "anchor changed"
                );
            }
            self.ctx.events.emit(AnchorEvent::AnchorChanged {
                effective: current.effective.clone(),
                anchor: current.anchor.clone(),
                persist,
            });
        }

        if let (Some(delay), Some(target)) = (transition.relocate, current.effective.clone())
            && let Err(err) = self.ctx.scheduler.schedule(RelocationRequest::after(target, delay))
        {
            tracing::warn!(error = %err, "failed to schedule relocation");
        }
    }

    fn update_status(&self, state: &AnchorState, displays: &[DisplayDescriptor]) {
        let name = state
            .effective
            .as_ref()
            .and_then(|fp| find_display(displays, fp))
            .map(|display| {
                if state.is_fallback() {
                    format!("{} (anchor display disconnected)", display.name)
                } else {
                    display.name.clone()
                }
            });
        self.ctx.status.set_anchor_name(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::naming::EmptyInventory;
    use crate::display::RawDisplay;
    use crate::geometry::Rect;
    use crate::platform::DisplayBackend;
    use crate::zone::DockEdge;

    #[derive(Default)]
    struct Displays(Mutex<Vec<RawDisplay>>);

    impl DisplayBackend for Displays {
        fn active_displays(&self) -> Vec<RawDisplay> { self.0.lock().clone() }
    }

    struct Dock;

    impl DockProbe for Dock {
        fn orientation(&self) -> DockEdge { DockEdge::Bottom }

        fn dock_frame(&self) -> Option<Rect> { None }
    }

    #[derive(Default)]
    struct Recorder(Mutex<Vec<RelocationRequest>>);

    impl RelocationScheduler for Recorder {
        fn schedule(&self, request: RelocationRequest) -> Result<()> {
            self.0.lock().push(request);
            Ok(())
        }
    }

    struct Fixture {
        reactor: Reactor,
        backend: Arc<Displays>,
        scheduled: Arc<Recorder>,
        events: EventBus,
        status: StatusBoard,
    }

    fn raw(handle: u32, x: f64, primary: bool, builtin: bool, uuid: &str, serial: Option<u32>) -> RawDisplay {
        RawDisplay {
            handle,
            bounds: Rect::new(x, 0.0, 1920.0, 1080.0),
            is_primary: primary,
            is_builtin: builtin,
            uuid: Some(uuid.to_string()),
            serial,
            ..RawDisplay::default()
        }
    }

    fn fixture(settings: AnchorSettings, profiles: Arc<dyn ProfileActivator>) -> Fixture {
        let backend = Arc::new(Displays::default());
        let scheduled = Arc::new(Recorder::default());
        let events = EventBus::new();
        let status = StatusBoard::new();
        let ctx = ReactorContext {
            resolver: DisplayResolver::new(Arc::clone(&backend) as Arc<dyn DisplayBackend>, Arc::new(EmptyInventory)),
            dock: Arc::new(Dock),
            state: Arc::new(InterceptState::new()),
            status: status.clone(),
            events: events.clone(),
            profiles,
            scheduler: Arc::clone(&scheduled) as Arc<dyn RelocationScheduler>,
        };
        Fixture { reactor: Reactor::new(ctx, settings), backend, scheduled, events, status }
    }

    fn persisted(events: &mut tokio::sync::broadcast::Receiver<AnchorEvent>) -> Vec<Option<Fingerprint>> {
        std::iter::from_fn(|| events.try_recv().ok())
            .filter_map(|event| match event {
                AnchorEvent::AnchorChanged { anchor, persist: true, .. } => Some(anchor),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_initialize_keeps_disconnected_anchor() {
        let f = fixture(AnchorSettings::default(), Arc::new(NoProfiles));
        *f.backend.0.lock() = vec![raw(1, 0.0, true, true, "LCD", None)];
        f.status.set_monitoring(true);

        let state = f.reactor.initialize(Some(Fingerprint::new("EXT-SN1")));

        assert_eq!(state.anchor, Some(Fingerprint::new("EXT-SN1")));
        assert_eq!(state.effective, Some(Fingerprint::new("LCD")));
        assert!(f.status.current().contains("anchor display disconnected"));
    }

    #[test]
    fn test_removed_then_added_restores_anchor() {
        let f = fixture(AnchorSettings::default(), Arc::new(NoProfiles));
        *f.backend.0.lock() =
            vec![raw(1, 0.0, true, true, "LCD", None), raw(2, 1920.0, false, false, "EXT", Some(7))];
        f.reactor.initialize(Some(Fingerprint::new("EXT-SN7")));

        f.backend.0.lock().pop();
        f.reactor.handle(TopologyChange::Removed(2));
        let during = f.reactor.anchor_state();
        assert_eq!(during.anchor, Some(Fingerprint::new("EXT-SN7")));
        assert_eq!(during.effective, Some(Fingerprint::new("LCD")));
        assert!(f.scheduled.0.lock().is_empty());

        f.backend.0.lock().push(raw(5, 1920.0, false, false, "EXT", Some(7)));
        f.reactor.handle(TopologyChange::Added(5));
        let after = f.reactor.anchor_state();
        assert_eq!(after.effective, Some(Fingerprint::new("EXT-SN7")));

        let scheduled = f.scheduled.0.lock();
        assert_eq!(scheduled.len(), 1);
        assert_eq!(scheduled[0].target, Fingerprint::new("EXT-SN7"));
        assert_eq!(scheduled[0].delay, AnchorSettings::default().settle_delay);
    }

    #[test]
    fn test_reconnect_with_new_serial_persists_richer_fingerprint() {
        let f = fixture(AnchorSettings::default(), Arc::new(NoProfiles));
        *f.backend.0.lock() =
            vec![raw(1, 0.0, true, true, "LCD", None), raw(2, 1920.0, false, false, "EXT", None)];
        f.reactor.initialize(Some(Fingerprint::new("EXT")));
        let mut rx = f.events.subscribe();

        f.backend.0.lock().pop();
        f.reactor.handle(TopologyChange::Removed(2));
        assert_eq!(f.reactor.anchor_state().anchor, Some(Fingerprint::new("EXT")));

        f.backend.0.lock().push(raw(9, 1920.0, false, false, "EXT", Some(42)));
        f.reactor.handle(TopologyChange::Added(9));

        let state = f.reactor.anchor_state();
        assert_eq!(state.anchor, Some(Fingerprint::new("EXT-SN42")));
        assert_eq!(state.effective, Some(Fingerprint::new("EXT-SN42")));
        assert_eq!(persisted(&mut rx), vec![Some(Fingerprint::new("EXT-SN42"))]);
    }

    #[test]
    fn test_moves_do_not_touch_anchor() {
        let f = fixture(AnchorSettings::default(), Arc::new(NoProfiles));
        *f.backend.0.lock() =
            vec![raw(1, 0.0, true, false, "MAIN", None), raw(2, 1920.0, false, false, "EXT", None)];
        f.reactor.initialize(Some(Fingerprint::new("EXT")));
        let mut rx = f.events.subscribe();

        f.backend.0.lock()[1].bounds = Rect::new(-1920.0, 0.0, 1920.0, 1080.0);
        f.reactor.handle(TopologyChange::Reconfigured);

        assert_eq!(f.reactor.anchor_state().effective, Some(Fingerprint::new("EXT")));
        assert_eq!(f.reactor.current_displays()[1].bounds.x, -1920.0);
        let events: Vec<AnchorEvent> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
        assert!(matches!(events.as_slice(), [AnchorEvent::DisplayListChanged(_)]));
        assert!(f.scheduled.0.lock().is_empty());
    }

    #[test]
    fn test_follow_main_display() {
        let settings = AnchorSettings { follow_main_display: true, ..AnchorSettings::default() };
        let f = fixture(settings, Arc::new(NoProfiles));
        *f.backend.0.lock() =
            vec![raw(1, 0.0, true, false, "MAIN", None), raw(2, 1920.0, false, false, "EXT", None)];
        f.reactor.initialize(Some(Fingerprint::new("MAIN")));

        {
            let mut displays = f.backend.0.lock();
            displays[0].is_primary = false;
            displays[1].is_primary = true;
        }
        f.reactor.handle(TopologyChange::MainDisplayChanged);

        assert_eq!(f.reactor.anchor_state().anchor, Some(Fingerprint::new("EXT")));
        assert_eq!(f.scheduled.0.lock().len(), 1);
    }

    #[test]
    fn test_main_change_without_follow_policy_keeps_anchor() {
        let f = fixture(AnchorSettings::default(), Arc::new(NoProfiles));
        *f.backend.0.lock() =
            vec![raw(1, 0.0, true, false, "MAIN", None), raw(2, 1920.0, false, false, "EXT", None)];
        f.reactor.initialize(Some(Fingerprint::new("MAIN")));

        f.backend.0.lock()[0].is_primary = false;
        f.backend.0.lock()[1].is_primary = true;
        f.reactor.handle(TopologyChange::MainDisplayChanged);

        assert_eq!(f.reactor.anchor_state().anchor, Some(Fingerprint::new("MAIN")));
        assert!(f.scheduled.0.lock().is_empty());
    }

    #[test]
    fn test_profile_claims_added_display() {
        let profiles = Arc::new(ProfileRules::new(vec![ProfileRule {
            name: "tv".into(),
            when_connected: Fingerprint::new("TV"),
            anchor: Fingerprint::new("LCD"),
        }]));
        let settings = AnchorSettings { follow_main_display: true, ..AnchorSettings::default() };
        let f = fixture(settings, profiles.clone());
        *f.backend.0.lock() = vec![raw(1, 0.0, true, true, "LCD", None)];
        f.reactor.initialize(Some(Fingerprint::new("LCD")));

        f.backend.0.lock().insert(0, raw(3, 1920.0, true, false, "TV", None));
        f.backend.0.lock()[1].is_primary = false;
        f.reactor.handle(TopologyChange::Added(3));

        assert!(profiles.is_active());
        assert_eq!(f.reactor.anchor_state().anchor, Some(Fingerprint::new("LCD")));
    }

    #[test]
    fn test_profile_overrides_effective_and_releases_stored_anchor() {
        let profiles = Arc::new(ProfileRules::new(vec![ProfileRule {
            name: "tv".into(),
            when_connected: Fingerprint::new("TV"),
            anchor: Fingerprint::new("LCD"),
        }]));
        let f = fixture(AnchorSettings::default(), profiles.clone());
        *f.backend.0.lock() =
            vec![raw(1, 0.0, true, true, "LCD", Some(3)), raw(2, 1920.0, false, false, "EXT", Some(7))];
        f.reactor.initialize(Some(Fingerprint::new("EXT-SN7")));
        let mut rx = f.events.subscribe();

        f.backend.0.lock().push(raw(4, 3840.0, false, false, "TV", None));
        f.reactor.handle(TopologyChange::Added(4));

        let with_profile = f.reactor.anchor_state();
        assert!(profiles.is_active());
        assert_eq!(with_profile.anchor, Some(Fingerprint::new("EXT-SN7")));
        assert_eq!(with_profile.effective, Some(Fingerprint::new("LCD-SN3")));
        assert!(!with_profile.is_fallback());
        assert_eq!(f.scheduled.0.lock()[0].target, Fingerprint::new("LCD-SN3"));

        f.backend.0.lock().pop();
        f.reactor.handle(TopologyChange::Removed(4));

        let released = f.reactor.anchor_state();
        assert!(!profiles.is_active());
        assert_eq!(released.anchor, Some(Fingerprint::new("EXT-SN7")));
        assert_eq!(released.effective, Some(Fingerprint::new("EXT-SN7")));
        assert_eq!(released.profile_anchor, None);
        assert!(persisted(&mut rx).is_empty());
    }

    #[test]
    fn test_explicit_selection_clears_profile_override() {
        let profiles = Arc::new(ProfileRules::new(vec![ProfileRule {
            name: "tv".into(),
            when_connected: Fingerprint::new("TV"),
            anchor: Fingerprint::new("LCD"),
        }]));
        let f = fixture(AnchorSettings::default(), profiles);
        *f.backend.0.lock() =
            vec![raw(1, 0.0, true, true, "LCD", None), raw(2, 1920.0, false, false, "EXT", None)];
        f.reactor.initialize(Some(Fingerprint::new("EXT")));
        f.backend.0.lock().push(raw(4, 3840.0, false, false, "TV", None));
        f.reactor.handle(TopologyChange::Added(4));
        assert_eq!(f.reactor.anchor_state().effective, Some(Fingerprint::new("LCD")));

        f.reactor.set_anchor(&Fingerprint::new("TV")).unwrap();

        let state = f.reactor.anchor_state();
        assert_eq!(state.anchor, Some(Fingerprint::new("TV")));
        assert_eq!(state.effective, Some(Fingerprint::new("TV")));
        assert_eq!(state.profile_anchor, None);
    }

    #[test]
    fn test_set_anchor_applies_and_persists() {
        let f = fixture(AnchorSettings::default(), Arc::new(NoProfiles));
        *f.backend.0.lock() =
            vec![raw(1, 0.0, true, true, "LCD", None), raw(2, 1920.0, false, false, "EXT", Some(1))];
        f.reactor.initialize(None);
        let mut rx = f.events.subscribe();

        let outcome = f.reactor.set_anchor(&Fingerprint::new("EXT")).unwrap();

        assert_eq!(outcome, SetAnchorOutcome::Applied { anchor: Fingerprint::new("EXT-SN1") });
        assert_eq!(persisted(&mut rx), vec![Some(Fingerprint::new("EXT-SN1"))]);
        assert_eq!(f.scheduled.0.lock()[0].delay, Duration::ZERO);
    }

    #[test]
    fn test_set_anchor_substitutes_unavailable_display() {
        let f = fixture(AnchorSettings::default(), Arc::new(NoProfiles));
        *f.backend.0.lock() =
            vec![raw(1, 0.0, true, false, "MAIN", None), raw(2, 1920.0, false, true, "LCD", None)];
        f.reactor.initialize(None);

        let outcome = f.reactor.set_anchor(&Fingerprint::new("GONE")).unwrap();

        assert_eq!(outcome, SetAnchorOutcome::Substituted {
            requested: Fingerprint::new("GONE"),
            substitute: Fingerprint::new("LCD"),
        });
        assert_eq!(f.reactor.anchor_state().anchor, Some(Fingerprint::new("LCD")));
    }

    #[test]
    fn test_set_anchor_without_displays_fails() {
        let f = fixture(AnchorSettings::default(), Arc::new(NoProfiles));
        f.reactor.initialize(None);

        assert_eq!(
            f.reactor.set_anchor(&Fingerprint::new("GONE")),
            Err(AnchorError::DisplayUnavailable("GONE".into()))
        );
    }

    #[test]
    fn test_policy_change_rederives_fallback() {
        let f = fixture(AnchorSettings::default(), Arc::new(NoProfiles));
        *f.backend.0.lock() =
            vec![raw(1, 0.0, true, false, "MAIN", None), raw(2, 1920.0, false, true, "LCD", None)];
        f.reactor.initialize(Some(Fingerprint::new("GONE")));
        assert_eq!(f.reactor.anchor_state().effective, Some(Fingerprint::new("LCD")));

        f.reactor.update_settings(AnchorSettings {
            default_policy: DefaultAnchorPolicy::MainDisplay,
            ..AnchorSettings::default()
        });

        let state = f.reactor.anchor_state();
        assert_eq!(state.effective, Some(Fingerprint::new("MAIN")));
        assert_eq!(state.anchor, Some(Fingerprint::new("GONE")));
    }

    #[test]
    fn test_published_snapshot_matches_state() {
        let f = fixture(AnchorSettings::default(), Arc::new(NoProfiles));
        *f.backend.0.lock() =
            vec![raw(1, 0.0, true, false, "MAIN", None), raw(2, 1920.0, false, false, "EXT", None)];
        f.reactor.initialize(Some(Fingerprint::new("MAIN")));

        let snapshot = f.reactor.ctx.state.load();
        assert_eq!(snapshot.anchor(), &f.reactor.anchor_state());
        assert_eq!(snapshot.blocked_zones().len(), 1);
    }
}
