//! Typed events for collaborators.
//!
//! Every event has a stable name following `dockanchor://<area>/<event-name>`,
//! used by the CLI when printing the event stream.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::broadcast;

use crate::constants::EVENT_BUS_CAPACITY;
use crate::display::{DisplayDescriptor, Fingerprint};

/// Something observable changed in the anchor core.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "payload", rename_all = "camelCase")]
pub enum AnchorEvent {
    /// The display set was re-enumerated.
    DisplayListChanged(Arc<[DisplayDescriptor]>),
    /// The enforced anchor changed.
    ///
    /// `persist` is set when the user's stored intent changed (explicit
    /// selection, substitution, or a richer fingerprint after reconnect)
    /// and the settings store should be updated.
    #[serde(rename_all = "camelCase")]
    AnchorChanged {
        effective: Option<Fingerprint>,
        anchor: Option<Fingerprint>,
        persist: bool,
    },
    /// The tap refused a move toward this display's trigger zone.
    BlockedAttempt(Fingerprint),
    /// A relocation to this display finished.
    RelocationCompleted(Fingerprint),
    MonitoringChanged(bool),
    /// Monitoring stopped because accessibility permission was withdrawn.
    PermissionLost,
}

impl AnchorEvent {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::DisplayListChanged(_) => "dockanchor://displays/list-changed",
            Self::AnchorChanged { .. } => "dockanchor://anchor/changed",
            Self::BlockedAttempt(_) => "dockanchor://intercept/blocked-attempt",
            Self::RelocationCompleted(_) => "dockanchor://relocation/completed",
            Self::MonitoringChanged(_) => "dockanchor://intercept/monitoring-changed",
            Self::PermissionLost => "dockanchor://intercept/permission-lost",
        }
    }
}

/// Broadcast channel carrying [`AnchorEvent`]s.
///
/// Slow subscribers miss events rather than stall the publisher.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<AnchorEvent>,
}

impl Default for EventBus {
    fn default() -> Self { Self::new() }
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_BUS_CAPACITY);
        Self { sender }
    }

    pub fn emit(&self, event: AnchorEvent) {
        tracing::debug!(event = event.name(), "emitting event");
        // No subscribers is not an error.
        let _ = self.sender.send(event);
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<AnchorEvent> { self.sender.subscribe() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_names_are_namespaced() {
        let events = [
            AnchorEvent::DisplayListChanged(Arc::from(Vec::new())),
            AnchorEvent::AnchorChanged { effective: None, anchor: None, persist: false },
            AnchorEvent::BlockedAttempt(Fingerprint::new("A")),
            AnchorEvent::RelocationCompleted(Fingerprint::new("A")),
            AnchorEvent::MonitoringChanged(true),
            AnchorEvent::PermissionLost,
        ];

        for event in &events {
            assert!(event.name().starts_with("dockanchor://"));
        }
    }

    #[test]
    fn test_emit_without_subscribers_is_fine() {
        EventBus::new().emit(AnchorEvent::PermissionLost);
    }

    #[test]
    fn test_subscribers_receive_events_in_order() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();

        bus.emit(AnchorEvent::MonitoringChanged(true));
        bus.emit(AnchorEvent::BlockedAttempt(Fingerprint::new("B")));

        assert_eq!(rx.try_recv().unwrap(), AnchorEvent::MonitoringChanged(true));
        assert_eq!(rx.try_recv().unwrap(), AnchorEvent::BlockedAttempt(Fingerprint::new("B")));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_event_serialization() {
        let json = serde_json::to_string(&AnchorEvent::AnchorChanged {
            effective: Some(Fingerprint::new("A")),
            anchor: Some(Fingerprint::new("A")),
            persist: true,
        })
        .unwrap();

        assert!(json.contains("\"event\":\"anchorChanged\""));
        assert!(json.contains("\"persist\":true"));
    }
}
