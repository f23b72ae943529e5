//! Tap ownership, monitoring lifecycle and the liveness watchdog.

use std::ops::ControlFlow;
use std::sync::mpsc::{self, Receiver, SyncSender};
use std::sync::{Arc, Weak};
use std::time::Duration;

use eyeball::{SharedObservable, Subscriber};
use parking_lot::Mutex;

use super::decision::{Verdict, decide};
use super::state::InterceptState;
use super::watchdog::Watchdog;
use crate::constants::{
    BLOCKED_NOTICE_COOLDOWN, BLOCKED_STATUS_DURATION, NOTICE_CHANNEL_CAPACITY, WATCHDOG_INTERVAL,
};
use crate::display::Fingerprint;
use crate::error::{AnchorError, Result};
use crate::events::{AnchorEvent, EventBus};
use crate::platform::{EventTapDriver, InstalledTap, PermissionProbe, TapCallback, spawn_named_thread};
use crate::status::StatusBoard;

/// Timing knobs for the engine.
#[derive(Debug, Clone, Copy)]
pub struct EngineOptions {
    pub watchdog_interval: Duration,
    pub blocked_status_duration: Duration,
    pub notice_cooldown: Duration,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            watchdog_interval: WATCHDOG_INTERVAL,
            blocked_status_duration: BLOCKED_STATUS_DURATION,
            notice_cooldown: BLOCKED_NOTICE_COOLDOWN,
        }
    }
}

/// Collaborators the engine reports to.
#[derive(Debug, Clone)]
pub struct EngineContext {
    pub state: Arc<InterceptState>,
    pub status: StatusBoard,
    pub events: EventBus,
}

#[derive(Default)]
struct Runtime {
    tap: Option<Box<dyn InstalledTap>>,
    watchdog: Option<Watchdog>,
    /// Tap installed only for a relocation. `start` adopts it.
    temporary: Option<Box<dyn InstalledTap>>,
}

struct EngineCore {
    ctx: EngineContext,
    taps: Arc<dyn EventTapDriver>,
    permissions: Arc<dyn PermissionProbe>,
    monitoring: SharedObservable<bool>,
    runtime: Mutex<Runtime>,
    notices: SyncSender<Fingerprint>,
    watchdog_interval: Duration,
}

/// Owns the system-wide pointer tap.
///
/// Cloning yields another handle to the same engine.
#[derive(Clone)]
pub struct InterceptionEngine {
    core: Arc<EngineCore>,
}

impl std::fmt::Debug for InterceptionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InterceptionEngine")
            .field("monitoring", &self.is_monitoring())
            .finish_non_exhaustive()
    }
}

/// Keeps a tap installed for the duration of a relocation.
///
/// Either borrows the monitoring tap or installs a temporary one that is
/// removed when the lease drops, unless monitoring adopted it meanwhile.
pub struct TapLease {
    owner: Option<Arc<EngineCore>>,
}

impl TapLease {
    #[must_use]
    pub const fn is_temporary(&self) -> bool { self.owner.is_some() }
}

impl Drop for TapLease {
    fn drop(&mut self) {
        let Some(core) = self.owner.take() else {
            return;
        };
        let temporary = core.runtime.lock().temporary.take();
        if let Some(tap) = temporary {
            tap.remove();
            tracing::debug!("temporary relocation tap removed");
        }
    }
}

impl InterceptionEngine {
    #[must_use]
    pub fn new(
        ctx: EngineContext,
        taps: Arc<dyn EventTapDriver>,
        permissions: Arc<dyn PermissionProbe>,
        options: EngineOptions,
    ) -> Self {
        let (notices, received) = mpsc::sync_channel(NOTICE_CHANNEL_CAPACITY);

        let notifier_ctx = ctx.clone();
        spawn_named_thread("notices", move || run_notifier(&received, &notifier_ctx, options));

        Self {
            core: Arc::new(EngineCore {
                ctx,
                taps,
                permissions,
                monitoring: SharedObservable::new(false),
                runtime: Mutex::new(Runtime::default()),
                notices,
                watchdog_interval: options.watchdog_interval,
            }),
        }
    }

    /// Starts monitoring. Calling it while monitoring is a no-op.
    ///
    /// # Errors
    ///
    /// - [`AnchorError::PermissionDenied`] when the process is not trusted;
    ///   no tap is installed.
    /// - [`AnchorError::TapInstallationFailed`] when the window server
    ///   refuses the tap.
    pub fn start(&self) -> Result<()> {
        let core = &self.core;
        let mut runtime = core.runtime.lock();
        if runtime.tap.is_some() {
            return Ok(());
        }

        if !core.permissions.request() {
            drop(runtime);
            tracing::warn!("accessibility permission not granted");
            core.ctx.status.set_error(AnchorError::PermissionDenied.to_string());
            return Err(AnchorError::PermissionDenied);
        }

        let tap = match runtime.temporary.take() {
            Some(tap) => {
                tracing::debug!("adopting relocation tap for monitoring");
                tap
            }
            None => match core.install_tap() {
                Ok(tap) => tap,
                Err(err) => {
                    drop(runtime);
                    core.ctx.status.set_error(err.to_string());
                    return Err(err);
                }
            },
        };
        runtime.tap = Some(tap);

        let weak = Arc::downgrade(core);
        runtime.watchdog = Watchdog::spawn(core.watchdog_interval, move || watchdog_tick(&weak));
        if runtime.watchdog.is_none() {
            tracing::warn!("watchdog unavailable, tap health will not be verified");
        }
        drop(runtime);

        core.set_monitoring(true);
        tracing::info!("monitoring started");
        Ok(())
    }

    /// Removes the tap and stops the watchdog. Idempotent.
    pub fn stop(&self) {
        if self.core.teardown() {
            self.core.set_monitoring(false);
            tracing::info!("monitoring stopped");
        }
    }

    #[must_use]
    pub fn is_monitoring(&self) -> bool { self.core.monitoring.get() }

    #[must_use]
    pub fn subscribe_monitoring(&self) -> Subscriber<bool> { self.core.monitoring.subscribe() }

    #[must_use]
    pub fn state(&self) -> &Arc<InterceptState> { &self.core.ctx.state }

    /// Ensures a tap is installed while a relocation runs.
    ///
    /// # Errors
    ///
    /// Returns [`AnchorError::TapInstallationFailed`] if no tap is running
    /// and a temporary one cannot be installed.
    pub fn acquire_tap_lease(&self) -> Result<TapLease> {
        // Held across the install so `start` never adds a second tap.
        let mut runtime = self.core.runtime.lock();
        if runtime.tap.is_some() || runtime.temporary.is_some() {
            return Ok(TapLease { owner: None });
        }

        runtime.temporary = Some(self.core.install_tap()?);
        tracing::debug!("temporary relocation tap installed");
        Ok(TapLease { owner: Some(Arc::clone(&self.core)) })
    }

    /// Runs one watchdog check immediately.
    pub fn check_health(&self) -> ControlFlow<()> { self.core.check_health() }
}

impl EngineCore {
    fn callback(&self) -> TapCallback {
        let state = Arc::clone(&self.ctx.state);
        let notices = self.notices.clone();

        Arc::new(move |event| {
            let snapshot = state.try_load();
            let verdict = decide(event, state.is_suppressing(), snapshot.as_deref());

            if let Verdict::Block(fingerprint) = &verdict
                && state.claim_notice()
                && notices.try_send(fingerprint.clone()).is_err()
            {
                state.release_notice();
            }
            verdict
        })
    }

    fn install_tap(&self) -> Result<Box<dyn InstalledTap>> {
        self.taps.install(self.callback()).map_err(|err| {
            let needs_permission_reset = self.permissions.is_trusted();
            tracing::error!(error = %err, needs_permission_reset, "event tap installation failed");
            AnchorError::TapInstallationFailed { needs_permission_reset }
        })
    }

    /// Removes the tap and watchdog. Returns whether anything was running.
    fn teardown(&self) -> bool {
        let (tap, watchdog) = {
            let mut runtime = self.runtime.lock();
            (runtime.tap.take(), runtime.watchdog.take())
        };
        drop(watchdog);

        tap.is_some_and(|tap| {
            tap.remove();
            true
        })
    }

    fn check_health(&self) -> ControlFlow<()> {
        let failure = if self.permissions.is_trusted() {
            let runtime = self.runtime.lock();
            match &runtime.tap {
                None => return ControlFlow::Break(()),
                Some(tap) if !tap.is_valid() => Some(AnchorError::TapInvalidated),
                Some(_) => None,
            }
        } else {
            Some(AnchorError::PermissionRevokedAtRuntime)
        };

        failure.map_or(ControlFlow::Continue(()), |error| {
            self.halt(&error);
            ControlFlow::Break(())
        })
    }

    /// Stops monitoring after a health check failed and reports why.
    fn halt(&self, error: &AnchorError) {
        tracing::warn!(error = %error, "stopping monitoring");
        self.teardown();
        self.set_monitoring(false);
        self.ctx.status.set_error(error.to_string());

        if *error == AnchorError::PermissionRevokedAtRuntime {
            self.ctx.events.emit(AnchorEvent::PermissionLost);
        }
    }

    fn set_monitoring(&self, monitoring: bool) {
        if self.monitoring.set_if_not_eq(monitoring).is_some() {
            self.ctx.events.emit(AnchorEvent::MonitoringChanged(monitoring));
        }
        self.ctx.status.set_monitoring(monitoring);
    }
}

impl Drop for EngineCore {
    fn drop(&mut self) { self.teardown(); }
}

fn watchdog_tick(core: &Weak<EngineCore>) -> ControlFlow<()> {
    core.upgrade().map_or(ControlFlow::Break(()), |core| core.check_health())
}

/// Turns blocked-attempt notices from the tap into status and events.
///
/// The tap sends at most one notice at a time; the flag it claims is
/// released here after the cooldown so bursts of blocked motion collapse
/// into a single report.
fn run_notifier(received: &Receiver<Fingerprint>, ctx: &EngineContext, options: EngineOptions) {
    while let Ok(fingerprint) = received.recv() {
        let name = ctx
            .state
            .load()
            .display(&fingerprint)
            .map_or_else(|| fingerprint.to_string(), |display| display.name.clone());

        tracing::debug!(fingerprint = %fingerprint, "blocked Dock move");
        ctx.status.flash(format!("Blocked Dock move to {name}"), options.blocked_status_duration);
        ctx.events.emit(AnchorEvent::BlockedAttempt(fingerprint));

        std::thread::sleep(options.notice_cooldown);
        ctx.state.release_notice();
    }
}
