//! Display enumeration and fingerprint resolution.

use std::collections::HashSet;
use std::sync::Arc;

use super::naming::{SystemDisplayInventory, assign_names};
use super::{DisplayDescriptor, Fingerprint};
use crate::platform::DisplayBackend;

/// Enumerates active displays and resolves fingerprints against them.
#[derive(Clone)]
pub struct DisplayResolver {
    backend: Arc<dyn DisplayBackend>,
    inventory: Arc<dyn SystemDisplayInventory>,
}

impl DisplayResolver {
    #[must_use]
    pub fn new(
        backend: Arc<dyn DisplayBackend>,
        inventory: Arc<dyn SystemDisplayInventory>,
    ) -> Self {
        Self { backend, inventory }
    }

    /// Returns the active displays, primary first, then left to right.
    ///
    /// Never fails: an empty list is a valid degenerate topology.
    #[must_use]
    pub fn enumerate(&self) -> Vec<DisplayDescriptor> {
        let raw = self.backend.active_displays();
        let mut seen = HashSet::with_capacity(raw.len());
        let mut displays = Vec::with_capacity(raw.len());

        for entry in &raw {
            let descriptor = DisplayDescriptor::from_raw(entry);
            if seen.insert(descriptor.fingerprint.clone()) {
                displays.push(descriptor);
            } else {
                tracing::warn!(
                    fingerprint = %descriptor.fingerprint,
                    handle = descriptor.handle,
                    "duplicate display fingerprint, ignoring"
                );
            }
        }

        displays.sort_by(|a, b| {
            b.is_primary
                .cmp(&a.is_primary)
                .then(a.bounds.x.total_cmp(&b.bounds.x))
                .then(a.bounds.y.total_cmp(&b.bounds.y))
        });

        if !displays.is_empty() {
            let hints = self.inventory.query();
            assign_names(&mut displays, &hints);
        }

        tracing::debug!(count = displays.len(), "enumerated displays");
        displays
    }

    /// Resolves a fingerprint to the current display handle.
    #[must_use]
    pub fn resolve_handle(&self, fingerprint: &Fingerprint) -> Option<u32> {
        resolve_handle(&self.enumerate(), fingerprint)
    }

    /// Whether a display with this fingerprint is currently attached.
    #[must_use]
    pub fn is_available(&self, fingerprint: &Fingerprint) -> bool {
        is_available(&self.enumerate(), fingerprint)
    }
}

/// Finds the display for `fingerprint` using two-tier matching: an exact
/// match first, then a match on the UUID prefix alone.
#[must_use]
pub fn find_display<'a>(
    displays: &'a [DisplayDescriptor],
    fingerprint: &Fingerprint,
) -> Option<&'a DisplayDescriptor> {
    displays.iter().find(|d| d.fingerprint == *fingerprint).or_else(|| {
        let prefix = fingerprint.uuid_prefix();
        displays.iter().find(|d| d.fingerprint.uuid_prefix() == prefix)
    })
}

/// Resolves a fingerprint to the handle of the matching display.
#[must_use]
pub fn resolve_handle(displays: &[DisplayDescriptor], fingerprint: &Fingerprint) -> Option<u32> {
    find_display(displays, fingerprint).map(|d| d.handle)
}

/// Whether `fingerprint` matches any display in the snapshot.
#[must_use]
pub fn is_available(displays: &[DisplayDescriptor], fingerprint: &Fingerprint) -> bool {
    find_display(displays, fingerprint).is_some()
}
