//! Stable display fingerprints.
//!
//! A fingerprint identifies a physical display across reboots, cable swaps
//! and reassignment of the session-scoped display handle. It is built from
//! the display UUID plus the richest hardware suffix available:
//!
//! ```text
//! <UUID>-SN<serial>          EDID serial number resolved
//! <UUID>-V<vendor>M<model>   vendor/model pair resolved
//! <UUID>                     nothing else available
//! DisplayID-<handle>...      UUID unavailable
//! ```
//!
//! Serial numbers can appear or disappear across reconnects, so two
//! fingerprints sharing the same UUID prefix name the same display.

use std::fmt;
use std::sync::Arc;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

const SERIAL_TAG: &str = "-SN";
const VENDOR_TAG: &str = "-V";

/// Hardware identity facts read from the OS for one display.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityParts<'a> {
    /// Session-scoped display handle, used only when the UUID is missing.
    pub handle: u32,
    pub uuid: Option<&'a str>,
    pub serial: Option<u32>,
    pub vendor: Option<u32>,
    pub model: Option<u32>,
}

/// A reconnect-resistant display identifier.
///
/// Cheap to clone; the tap callback hands these around on the hot path.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct Fingerprint(#[schemars(with = "String")] Arc<str>);

impl Fingerprint {
    /// Wraps an already-composed fingerprint string (e.g. read from settings).
    #[must_use]
    pub fn new(value: impl AsRef<str>) -> Self { Self(Arc::from(value.as_ref())) }

    /// Composes a fingerprint from hardware identity facts.
    #[must_use]
    pub fn compose(parts: &IdentityParts<'_>) -> Self {
        let mut value = match parts.uuid.filter(|uuid| !uuid.is_empty()) {
            Some(uuid) => uuid.to_string(),
            None => format!("DisplayID-{}", parts.handle),
        };

        if let Some(serial) = parts.serial {
            value.push_str(&format!("{SERIAL_TAG}{serial}"));
        } else if let (Some(vendor), Some(model)) = (parts.vendor, parts.model) {
            value.push_str(&format!("{VENDOR_TAG}{vendor}M{model}"));
        }

        Self::new(value)
    }

    #[must_use]
    pub fn as_str(&self) -> &str { &self.0 }

    /// The identity prefix with any serial or vendor/model suffix removed.
    #[must_use]
    pub fn uuid_prefix(&self) -> &str {
        let value = self.as_str();
        let cut = value.find(SERIAL_TAG).or_else(|| vendor_suffix_start(value));
        cut.map_or(value, |index| &value[..index])
    }

    /// Whether this fingerprint carries a serial or vendor/model suffix.
    #[must_use]
    pub fn has_suffix(&self) -> bool { self.uuid_prefix().len() != self.as_str().len() }

    /// Two-tier equality: exact match, else matching UUID prefix.
    #[must_use]
    pub fn same_display(&self, other: &Self) -> bool {
        self == other || self.uuid_prefix() == other.uuid_prefix()
    }
}

/// Finds a `-V<digits>M<digits>` suffix. UUIDs are hex so `-V` never occurs
/// inside one, but `DisplayID-` fallbacks are checked for the digit shape too.
fn vendor_suffix_start(value: &str) -> Option<usize> {
    let index = value.find(VENDOR_TAG)?;
    let rest = &value[index + VENDOR_TAG.len()..];
    let (vendor, model) = rest.split_once('M')?;
    let numeric = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    (numeric(vendor) && numeric(model)).then_some(index)
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Fingerprint").field(&&*self.0).finish()
    }
}

impl From<&str> for Fingerprint {
    fn from(value: &str) -> Self { Self::new(value) }
}

impl From<String> for Fingerprint {
    fn from(value: String) -> Self { Self(Arc::from(value)) }
}
