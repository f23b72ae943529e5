//! Profile auto-activation.
//!
//! A profile says "when display X is connected, anchor to display Y". The
//! reactor asks the activator before applying its own default-anchor logic.

use parking_lot::Mutex;

use crate::display::{DisplayDescriptor, Fingerprint, find_display};

/// Collaborator that may claim a newly connected display.
pub trait ProfileActivator: Send + Sync {
    /// Called when `connected` shows up. Returns the anchor to apply if a
    /// profile claims the display.
    fn activate_for(&self, connected: &Fingerprint) -> Option<Fingerprint>;

    /// Whether a profile currently governs the anchor.
    fn is_active(&self) -> bool;

    /// Called after every re-enumeration.
    fn displays_changed(&self, _displays: &[DisplayDescriptor]) {}
}

/// Activator with no profiles.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProfiles;

impl ProfileActivator for NoProfiles {
    fn activate_for(&self, _connected: &Fingerprint) -> Option<Fingerprint> { None }

    fn is_active(&self) -> bool { false }
}

/// One auto-activation rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileRule {
    pub name: String,
    pub when_connected: Fingerprint,
    pub anchor: Fingerprint,
}

/// Activator driven by a list of rules.
///
/// The first rule whose trigger display matches wins. A profile stays
/// active until its trigger display disappears.
#[derive(Debug, Default)]
pub struct ProfileRules {
    rules: Mutex<Vec<ProfileRule>>,
    active: Mutex<Option<ProfileRule>>,
}

impl ProfileRules {
    #[must_use]
    pub fn new(rules: Vec<ProfileRule>) -> Self {
        Self { rules: Mutex::new(rules), active: Mutex::new(None) }
    }

    /// Replaces the rules. The active profile is kept only if it still exists.
    pub fn replace(&self, rules: Vec<ProfileRule>) {
        let mut active = self.active.lock();
        if active.as_ref().is_some_and(|current| !rules.contains(current)) {
            *active = None;
        }
        *self.rules.lock() = rules;
    }

    #[must_use]
    pub fn active_name(&self) -> Option<String> { self.active.lock().as_ref().map(|p| p.name.clone()) }
}

impl ProfileActivator for ProfileRules {
    fn activate_for(&self, connected: &Fingerprint) -> Option<Fingerprint> {
        let rule = self
            .rules
            .lock()
            .iter()
            .find(|rule| rule.when_connected.same_display(connected))
            .cloned()?;

        tracing::info!(profile = %rule.name, anchor = %rule.anchor, "profile activated");
        let anchor = rule.anchor.clone();
        *self.active.lock() = Some(rule);
        Some(anchor)
    }

    fn is_active(&self) -> bool { self.active.lock().is_some() }

    fn displays_changed(&self, displays: &[DisplayDescriptor]) {
        let mut active = self.active.lock();
        if let Some(rule) = active.as_ref()
            && find_display(displays, &rule.when_connected).is_none()
        {
            tracing::info!(profile = %rule.name, "profile deactivated");
            *active = None;
        }
    }
}
