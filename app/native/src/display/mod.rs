//! Display identity: enumeration, fingerprints and cosmetic naming.
//!
//! The resolver turns the OS's volatile display list into an ordered set of
//! [`DisplayDescriptor`]s keyed by stable [`Fingerprint`]s. The set is rebuilt
//! wholesale on every topology change and never patched in place.

pub mod fingerprint;
pub mod naming;
pub mod resolver;

pub use fingerprint::{Fingerprint, IdentityParts};
pub use naming::{ConnectionKind, NameHint, SystemDisplayInventory};
pub use resolver::{DisplayResolver, find_display, is_available, resolve_handle};
use serde::Serialize;

use crate::geometry::Rect;

/// Raw facts about one active display, as reported by the platform backend.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawDisplay {
    /// OS-assigned handle, valid for the current topology only.
    pub handle: u32,
    pub bounds: Rect,
    pub is_primary: bool,
    pub is_builtin: bool,
    pub uuid: Option<String>,
    pub serial: Option<u32>,
    pub vendor: Option<u32>,
    pub model: Option<u32>,
}

impl RawDisplay {
    /// Fingerprint composed from this display's identity facts.
    #[must_use]
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::compose(&IdentityParts {
            handle: self.handle,
            uuid: self.uuid.as_deref(),
            serial: self.serial,
            vendor: self.vendor,
            model: self.model,
        })
    }
}

/// One currently active physical display.
///
/// `handle` must never be persisted or compared across snapshots.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayDescriptor {
    pub handle: u32,
    pub fingerprint: Fingerprint,
    pub bounds: Rect,
    pub is_primary: bool,
    pub is_builtin: bool,
    /// Best-effort human label. Cosmetic only.
    pub name: String,
}

impl DisplayDescriptor {
    /// Builds a descriptor from raw facts with an empty name.
    #[must_use]
    pub fn from_raw(raw: &RawDisplay) -> Self {
        Self {
            handle: raw.handle,
            fingerprint: raw.fingerprint(),
            bounds: raw.bounds,
            is_primary: raw.is_primary,
            is_builtin: raw.is_builtin,
            name: String::new(),
        }
    }
}
