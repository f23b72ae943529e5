//! Display name hints from `system_profiler SPDisplaysDataType -json`.

use std::process::Command;

use serde::Deserialize;

use crate::display::{ConnectionKind, NameHint, SystemDisplayInventory};

const SYSTEM_PROFILER: &str = "/usr/sbin/system_profiler";

/// Names that identify virtual or mirroring displays.
const VIRTUAL_MARKERS: &[&str] = &["sidecar", "airplay", "displaylink", "virtual", "dummy"];

#[derive(Debug, Deserialize)]
struct Report {
    #[serde(rename = "SPDisplaysDataType", default)]
    adapters: Vec<Adapter>,
}

#[derive(Debug, Deserialize)]
struct Adapter {
    #[serde(rename = "spdisplays_ndrvs", default)]
    displays: Vec<Entry>,
}

#[derive(Debug, Default, Deserialize)]
struct Entry {
    #[serde(rename = "_name", default)]
    name: String,
    #[serde(rename = "_spdisplays_resolution")]
    resolution: Option<String>,
    #[serde(rename = "_spdisplays_pixels")]
    pixels: Option<String>,
    #[serde(rename = "spdisplays_connection_type")]
    connection_type: Option<String>,
    #[serde(rename = "spdisplays_display_type")]
    display_type: Option<String>,
    #[serde(rename = "spdisplays_virtualdevice")]
    virtual_device: Option<String>,
    #[serde(rename = "spdisplays_main")]
    main: Option<String>,
}

impl Entry {
    fn connection(&self) -> ConnectionKind {
        let lowered = self.name.to_lowercase();
        let is_virtual = self.virtual_device.as_deref() == Some("spdisplays_yes")
            || VIRTUAL_MARKERS.iter().any(|marker| lowered.contains(marker));
        let is_internal = self.connection_type.as_deref() == Some("spdisplays_internal")
            || self.display_type.as_deref().is_some_and(|t| t.contains("built-in"));

        if is_virtual {
            ConnectionKind::Virtual
        } else if is_internal {
            ConnectionKind::BuiltIn
        } else {
            ConnectionKind::External
        }
    }

    fn into_hint(self) -> NameHint {
        NameHint {
            connection: self.connection(),
            resolution: self.resolution.as_deref().and_then(parse_dimensions),
            pixels: self.pixels.as_deref().and_then(parse_dimensions),
            is_main: self.main.as_deref() == Some("spdisplays_yes"),
            name: self.name,
        }
    }
}

/// Parses `"1512 x 982 @ 120.00Hz"` or `"3024 x 1964"` into `(1512, 982)`.
fn parse_dimensions(value: &str) -> Option<(u32, u32)> {
    let (width, rest) = value.split_once('x')?;
    let height = rest.split_whitespace().next()?;
    Some((width.trim().parse().ok()?, height.trim().parse().ok()?))
}

/// Parses a full `system_profiler` JSON report.
///
/// # Errors
///
/// Returns the JSON error when the report is malformed.
pub fn parse_report(json: &str) -> serde_json::Result<Vec<NameHint>> {
    let report: Report = serde_json::from_str(json)?;
    Ok(report
        .adapters
        .into_iter()
        .flat_map(|adapter| adapter.displays)
        .filter(|entry| !entry.name.is_empty())
        .map(Entry::into_hint)
        .collect())
}

/// Inventory backed by the `system_profiler` tool.
#[derive(Debug, Clone)]
pub struct SystemProfilerInventory {
    program: String,
}

impl Default for SystemProfilerInventory {
    fn default() -> Self { Self { program: SYSTEM_PROFILER.to_string() } }
}

impl SystemDisplayInventory for SystemProfilerInventory {
    fn query(&self) -> Vec<NameHint> {
        let output = match Command::new(&self.program).args(["SPDisplaysDataType", "-json"]).output()
        {
            Ok(output) if output.status.success() => output,
            Ok(output) => {
                tracing::debug!(status = %output.status, "system_profiler exited unsuccessfully");
                return Vec::new();
            }
            Err(err) => {
                tracing::debug!(error = %err, "failed to run system_profiler");
                return Vec::new();
            }
        };

        let json = String::from_utf8_lossy(&output.stdout);
        parse_report(&json).unwrap_or_else(|err| {
            tracing::warn!(error = %err, "failed to parse system_profiler output");
            Vec::new()
        })
    }
}
