//! Best-effort human names for displays.
//!
//! Names are matched against a system display inventory by resolution and
//! connection type. The heuristics are inherently ambiguous for identical
//! external monitors, which is acceptable: names are cosmetic and never take
//! part in identity or trigger-zone logic.

use super::DisplayDescriptor;
use crate::geometry::Rect;

/// Relative tolerance for a "near" resolution match (virtual displays).
const NEAR_TOLERANCE: f64 = 0.02;

/// Relative tolerance for the last-resort approximate match.
const APPROXIMATE_TOLERANCE: f64 = 0.10;

/// How a display is attached, as reported by the inventory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConnectionKind {
    BuiltIn,
    /// Sidecar, AirPlay, DisplayLink and other virtual or mirroring displays.
    Virtual,
    #[default]
    External,
}

/// One entry from the system display inventory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameHint {
    pub name: String,
    /// "Looks like" resolution in points.
    pub resolution: Option<(u32, u32)>,
    /// Native panel resolution in pixels.
    pub pixels: Option<(u32, u32)>,
    pub connection: ConnectionKind,
    pub is_main: bool,
}

/// Source of display name hints.
///
/// The macOS implementation shells out to `system_profiler`; tests inject a
/// fixed list.
pub trait SystemDisplayInventory: Send + Sync {
    fn query(&self) -> Vec<NameHint>;
}

/// Inventory that knows nothing; every display gets a positional name.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyInventory;

impl SystemDisplayInventory for EmptyInventory {
    fn query(&self) -> Vec<NameHint> { Vec::new() }
}

/// Resolution agreement between a hint and a display, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Fit {
    Exact,
    Scaled,
    Near,
    Approximate,
    Mismatch,
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn display_size(bounds: &Rect) -> (u32, u32) {
    (bounds.width.round().max(0.0) as u32, bounds.height.round().max(0.0) as u32)
}

fn within(actual: (u32, u32), expected: (u32, u32), tolerance: f64) -> bool {
    let close = |a: u32, e: u32| {
        let e = f64::from(e);
        e > 0.0 && ((f64::from(a) - e).abs() / e) <= tolerance
    };
    close(actual.0, expected.0) && close(actual.1, expected.1)
}

fn fit(hint: &NameHint, bounds: &Rect) -> Fit {
    let size = display_size(bounds);
    let doubled = (size.0 * 2, size.1 * 2);
    let candidates = [hint.resolution, hint.pixels];

    if candidates.iter().flatten().any(|&res| res == size) {
        Fit::Exact
    } else if candidates.iter().flatten().any(|&res| res == doubled) {
        Fit::Scaled
    } else if candidates.iter().flatten().any(|&res| within(size, res, NEAR_TOLERANCE)) {
        Fit::Near
    } else if candidates.iter().flatten().any(|&res| {
        within(size, res, APPROXIMATE_TOLERANCE)
            || within(doubled, res, APPROXIMATE_TOLERANCE)
    }) {
        Fit::Approximate
    } else {
        Fit::Mismatch
    }
}

struct Matcher<'a> {
    hints: &'a [NameHint],
    used: Vec<bool>,
    named: Vec<bool>,
}

impl Matcher<'_> {
    fn pass(
        &mut self,
        displays: &mut [DisplayDescriptor],
        accept: impl Fn(&DisplayDescriptor, &NameHint, Fit) -> bool,
    ) {
        for (index, display) in displays.iter_mut().enumerate() {
            if self.named[index] {
                continue;
            }

            let view: &DisplayDescriptor = display;
            let best = self
                .hints
                .iter()
                .enumerate()
                .filter(|(slot, _)| !self.used[*slot])
                .map(|(slot, hint)| (slot, fit(hint, &view.bounds)))
                .filter(|(slot, quality)| accept(view, &self.hints[*slot], *quality))
                .min_by_key(|(_, quality)| *quality);

            if let Some((slot, _)) = best {
                display.name.clone_from(&self.hints[slot].name);
                self.used[slot] = true;
                self.named[index] = true;
            }
        }
    }
}

/// Assigns a name to every display, consuming each hint at most once.
///
/// Priority: virtual displays by exact/near resolution, built-in panels by
/// exact resolution, external displays by exact resolution, the main-display
/// flag, then approximate resolution. Anything left gets a positional name.
pub fn assign_names(displays: &mut [DisplayDescriptor], hints: &[NameHint]) {
    let mut matcher = Matcher {
        hints,
        used: vec![false; hints.len()],
        named: vec![false; displays.len()],
    };

    matcher.pass(displays, |_, hint, quality| {
        hint.connection == ConnectionKind::Virtual && quality <= Fit::Near
    });
    matcher.pass(displays, |display, hint, quality| {
        display.is_builtin && hint.connection == ConnectionKind::BuiltIn && quality <= Fit::Scaled
    });
    matcher.pass(displays, |display, hint, quality| {
        !display.is_builtin && hint.connection == ConnectionKind::External && quality <= Fit::Scaled
    });
    matcher.pass(displays, |display, hint, _| display.is_primary && hint.is_main);
    matcher.pass(displays, |_, _, quality| quality <= Fit::Approximate);

    let primary = displays.iter().find(|d| d.is_primary).map(|d| d.bounds);
    let count = displays.len();
    for (index, display) in displays.iter_mut().enumerate() {
        if !matcher.named[index] {
            display.name = positional_name(display, primary, count);
        }
    }

    disambiguate(displays);
}

fn positional_name(display: &DisplayDescriptor, primary: Option<Rect>, count: usize) -> String {
    if display.is_builtin {
        return "Built-in Display".to_string();
    }
    if count == 1 || display.is_primary {
        return "Main Display".to_string();
    }

    let Some(primary) = primary else {
        return "External Display".to_string();
    };

    let center = display.bounds.center();
    let label = if center.x < primary.min_x() {
        "Left Display"
    } else if center.x > primary.max_x() {
        "Right Display"
    } else if center.y < primary.min_y() {
        "Upper Display"
    } else {
        "Lower Display"
    };
    label.to_string()
}

/// Suffixes repeated names ("DELL U2720Q", "DELL U2720Q (2)").
fn disambiguate(displays: &mut [DisplayDescriptor]) {
    for index in 1..displays.len() {
        let (seen, rest) = displays.split_at_mut(index);
        let current = &mut rest[0];
        let repeats = seen.iter().filter(|d| name_stem(&d.name) == current.name).count();
        if repeats > 0 {
            current.name = format!("{} ({})", current.name, repeats + 1);
        }
    }
}

fn name_stem(name: &str) -> &str {
    name.rsplit_once(" (")
        .filter(|(_, tail)| tail.ends_with(')') && tail[..tail.len() - 1].bytes().all(|b| b.is_ascii_digit()))
        .map_or(name, |(stem, _)| stem)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::Fingerprint;

    fn display(x: f64, width: f64, height: f64, primary: bool, builtin: bool) -> DisplayDescriptor {
        DisplayDescriptor {
            handle: 1,
            fingerprint: Fingerprint::new(format!("FP-{x}")),
            bounds: Rect::new(x, 0.0, width, height),
            is_primary: primary,
            is_builtin: builtin,
            name: String::new(),
        }
    }

    fn hint(name: &str, res: (u32, u32), connection: ConnectionKind, main: bool) -> NameHint {
        NameHint {
            name: name.to_string(),
            resolution: Some(res),
            pixels: Some((res.0 * 2, res.1 * 2)),
            connection,
            is_main: main,
        }
    }

    #[test]
    fn test_builtin_and_external_exact_match() {
        let mut displays = vec![
            display(0.0, 1512.0, 982.0, true, true),
            display(1512.0, 2560.0, 1440.0, false, false),
        ];
        let hints = vec![
            hint("LG HDR 4K", (2560, 1440), ConnectionKind::External, false),
            hint("Color LCD", (1512, 982), ConnectionKind::BuiltIn, true),
        ];

        assign_names(&mut displays, &hints);

        assert_eq!(displays[0].name, "Color LCD");
        assert_eq!(displays[1].name, "LG HDR 4K");
    }

    #[test]
    fn test_virtual_display_matched_first_by_near_resolution() {
        let mut displays = vec![
            display(0.0, 1920.0, 1080.0, true, false),
            display(1920.0, 1366.0, 1024.0, false, false),
        ];
        let hints = vec![
            hint("DELL P2419H", (1920, 1080), ConnectionKind::External, true),
            NameHint {
                name: "Sidecar Display".to_string(),
                resolution: Some((1366, 1030)),
                pixels: None,
                connection: ConnectionKind::Virtual,
                is_main: false,
            },
        ];

        assign_names(&mut displays, &hints);

        assert_eq!(displays[0].name, "DELL P2419H");
        assert_eq!(displays[1].name, "Sidecar Display");
    }

    #[test]
    fn test_main_flag_confirms_when_resolution_disagrees() {
        let mut displays = vec![display(0.0, 1728.0, 1117.0, true, false)];
        let hints = vec![hint("Studio Display", (2560, 1440), ConnectionKind::External, true)];

        assign_names(&mut displays, &hints);

        assert_eq!(displays[0].name, "Studio Display");
    }

    #[test]
    fn test_approximate_match_is_last_resort() {
        let mut displays = vec![
            display(0.0, 1920.0, 1080.0, true, false),
            display(1920.0, 1680.0, 1050.0, false, false),
        ];
        let hints = vec![
            hint("Primary Panel", (1920, 1080), ConnectionKind::External, true),
            NameHint {
                name: "Odd Scaler".to_string(),
                resolution: Some((1600, 1000)),
                pixels: None,
                connection: ConnectionKind::External,
                is_main: false,
            },
        ];

        assign_names(&mut displays, &hints);

        assert_eq!(displays[1].name, "Odd Scaler");
    }

    #[test]
    fn test_positional_fallback_without_inventory() {
        let mut displays = vec![
            display(0.0, 1920.0, 1080.0, true, false),
            display(1920.0, 1920.0, 1080.0, false, false),
            display(-1920.0, 1920.0, 1080.0, false, false),
        ];

        assign_names(&mut displays, &[]);

        assert_eq!(displays[0].name, "Main Display");
        assert_eq!(displays[1].name, "Right Display");
        assert_eq!(displays[2].name, "Left Display");
    }

    #[test]
    fn test_identical_monitors_are_disambiguated() {
        let mut displays = vec![
            display(0.0, 2560.0, 1440.0, true, false),
            display(2560.0, 2560.0, 1440.0, false, false),
        ];
        let hints = vec![
            hint("DELL U2720Q", (2560, 1440), ConnectionKind::External, true),
            hint("DELL U2720Q", (2560, 1440), ConnectionKind::External, false),
        ];

        assign_names(&mut displays, &hints);

        assert_eq!(displays[0].name, "DELL U2720Q");
        assert_eq!(displays[1].name, "DELL U2720Q (2)");
    }

    #[test]
    fn test_fit_ordering() {
        let h = hint("X", (1920, 1080), ConnectionKind::External, false);
        assert_eq!(fit(&h, &Rect::new(0.0, 0.0, 1920.0, 1080.0)), Fit::Exact);
        assert_eq!(fit(&h, &Rect::new(0.0, 0.0, 960.0, 540.0)), Fit::Scaled);
        assert_eq!(fit(&h, &Rect::new(0.0, 0.0, 800.0, 600.0)), Fit::Mismatch);
    }
}
