//! The assembled anchor service.
//!
//! [`DockAnchor`] wires the display resolver, reconfiguration reactor,
//! interception engine and relocation worker around one shared
//! [`InterceptState`]. Frontends (the CLI, a menu bar app) talk to this type
//! only, and observe it through the status board and the event bus.

use std::sync::Arc;

use eyeball::Subscriber;
use tokio::sync::broadcast;

use crate::display::{DisplayDescriptor, DisplayResolver, Fingerprint};
use crate::error::Result;
use crate::events::{AnchorEvent, EventBus};
use crate::intercept::{AnchorState, EngineContext, EngineOptions, InterceptState, InterceptionEngine};
use crate::platform::Platform;
use crate::reactor::{
    AnchorSettings, ProfileActivator, ProfileRule, ProfileRules, Reactor, ReactorContext,
    RelocationScheduler, SetAnchorOutcome, TopologyChange, coalesce,
};
use crate::relocation::{
    RelocationOutcome, RelocationRequest, RelocationSimulator, RelocationTuning, RelocationWorker,
    SkipReason,
};
use crate::status::StatusBoard;

/// Everything [`DockAnchor::new`] needs besides the platform.
#[derive(Debug, Clone, Default)]
pub struct DockAnchorOptions {
    /// Persisted anchor fingerprint, if any.
    pub anchor: Option<Fingerprint>,
    pub settings: AnchorSettings,
    pub tuning: RelocationTuning,
    pub profiles: Vec<ProfileRule>,
    pub engine: EngineOptions,
}

/// Keeps the Dock on one display.
pub struct DockAnchor {
    status: StatusBoard,
    events: EventBus,
    engine: InterceptionEngine,
    simulator: Arc<RelocationSimulator>,
    worker: RelocationWorker,
    reactor: Arc<Reactor>,
    profiles: Arc<ProfileRules>,
}

impl std::fmt::Debug for DockAnchor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DockAnchor")
            .field("monitoring", &self.is_monitoring())
            .field("anchor", &self.anchor_state())
            .finish_non_exhaustive()
    }
}

impl DockAnchor {
    /// Builds the service and derives the initial anchor state.
    ///
    /// Monitoring is not started; call [`DockAnchor::start`].
    ///
    /// # Errors
    ///
    /// Returns an error if the relocation worker thread cannot be spawned.
    pub fn new(platform: Platform, options: DockAnchorOptions) -> Result<Self> {
        let state = Arc::new(InterceptState::new());
        let status = StatusBoard::new();
        let events = EventBus::new();

        let engine = InterceptionEngine::new(
            EngineContext { state: Arc::clone(&state), status: status.clone(), events: events.clone() },
            Arc::clone(&platform.taps),
            Arc::clone(&platform.permissions),
            options.engine,
        );

        let simulator = Arc::new(RelocationSimulator::new(
            engine.clone(),
            Arc::clone(&platform.pointer),
            Arc::clone(&platform.dock),
            status.clone(),
            events.clone(),
            options.tuning,
        ));
        let worker = RelocationWorker::spawn(Arc::clone(&simulator))?;
        let profiles = Arc::new(ProfileRules::new(options.profiles));

        let reactor = Arc::new(Reactor::new(
            ReactorContext {
                resolver: DisplayResolver::new(platform.displays, platform.inventory),
                dock: platform.dock,
                state,
                status: status.clone(),
                events: events.clone(),
                profiles: Arc::clone(&profiles) as Arc<dyn ProfileActivator>,
                scheduler: Arc::new(worker.clone()) as Arc<dyn RelocationScheduler>,
            },
            options.settings,
        ));
        reactor.initialize(options.anchor);

        Ok(Self { status, events, engine, simulator, worker, reactor, profiles })
    }

    /// Starts intercepting edge triggers. Idempotent.
    ///
    /// # Errors
    ///
    /// See [`InterceptionEngine::start`].
    pub fn start(&self) -> Result<()> { self.engine.start() }

    /// Stops intercepting. Idempotent.
    pub fn stop(&self) { self.engine.stop(); }

    #[must_use]
    pub fn is_monitoring(&self) -> bool { self.engine.is_monitoring() }

    #[must_use]
    pub fn subscribe_monitoring(&self) -> Subscriber<bool> { self.engine.subscribe_monitoring() }

    /// Displays from the latest enumeration.
    #[must_use]
    pub fn current_displays(&self) -> Arc<[DisplayDescriptor]> { self.reactor.current_displays() }

    #[must_use]
    pub fn subscribe_displays(&self) -> Subscriber<Arc<[DisplayDescriptor]>> {
        self.reactor.subscribe_displays()
    }

    #[must_use]
    pub fn anchor_state(&self) -> AnchorState { self.reactor.anchor_state() }

    /// Selects the anchor display.
    ///
    /// # Errors
    ///
    /// See [`Reactor::set_anchor`].
    pub fn set_anchor(&self, fingerprint: &Fingerprint) -> Result<SetAnchorOutcome> {
        self.reactor.set_anchor(fingerprint)
    }

    /// Queues an immediate relocation to the effective anchor.
    ///
    /// # Errors
    ///
    /// Returns an error if the relocation worker is gone.
    pub fn relocate_now(&self) -> Result<Option<SkipReason>> {
        let Some(target) = self.anchor_state().effective else {
            return Ok(Some(SkipReason::NoTarget));
        };
        self.worker.submit(RelocationRequest::now(target))?;
        Ok(None)
    }

    /// Relocates to the effective anchor on the calling thread.
    ///
    /// # Errors
    ///
    /// - [`crate::error::AnchorError::RelocationInProgress`] if a session is already running.
    /// - [`crate::error::AnchorError::TapInstallationFailed`] if a temporary tap is needed
    ///   and cannot be installed.
    pub fn relocate_blocking(&self) -> Result<RelocationOutcome> {
        match self.anchor_state().effective {
            Some(target) => self.simulator.relocate(&target),
            None => Ok(RelocationOutcome::Skipped(SkipReason::NoTarget)),
        }
    }

    #[must_use]
    pub fn status_message(&self) -> String { self.status.current() }

    #[must_use]
    pub fn subscribe_status(&self) -> Subscriber<String> { self.status.subscribe() }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<AnchorEvent> { self.events.subscribe() }

    /// Handles one burst of reconfiguration notifications.
    pub fn handle_topology_changes(&self, changes: Vec<TopologyChange>) {
        for change in coalesce(changes) {
            self.reactor.handle(change);
        }
    }

    /// Re-enumerates displays and re-derives anchor state.
    #[must_use = "returns the refreshed display list"]
    pub fn refresh_displays(&self) -> Arc<[DisplayDescriptor]> { self.reactor.refresh() }

    /// Applies reloaded settings.
    pub fn update_settings(
        &self,
        settings: AnchorSettings,
        tuning: RelocationTuning,
        profiles: Vec<ProfileRule>,
    ) {
        self.simulator.set_tuning(tuning);
        self.profiles.replace(profiles);
        self.reactor.update_settings(settings);
    }

    /// Name of the profile currently governing the anchor.
    #[must_use]
    pub fn active_profile(&self) -> Option<String> { self.profiles.active_name() }
}

impl Drop for DockAnchor {
    fn drop(&mut self) { self.engine.stop(); }
}
