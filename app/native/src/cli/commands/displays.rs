//! `dockanchor displays`: lists attached displays and their fingerprints.

use std::path::Path;

use colored::Colorize;
use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Modify, Style};
use tabled::{Table, Tabled};

use crate::cli::output;
use crate::display::{DisplayDescriptor, Fingerprint};
use crate::error::AnchorError;

#[derive(Tabled)]
struct DisplayRow {
    #[tabled(rename = "Fingerprint")]
    fingerprint: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Resolution")]
    resolution: String,
    #[tabled(rename = "Position")]
    position: String,
    #[tabled(rename = "Main")]
    main: String,
    #[tabled(rename = "Built-in")]
    builtin: String,
    #[tabled(rename = "Anchor")]
    anchor: String,
}

/// Execute the displays command.
///
/// # Errors
///
/// Returns [`AnchorError::Unsupported`] off macOS, or an error if the list
/// cannot be serialized.
#[cfg(target_os = "macos")]
pub fn execute(config: Option<&Path>, json: bool) -> Result<(), AnchorError> {
    use crate::display::DisplayResolver;
    use crate::platform::Platform;

    let (config, _) = crate::config::load_or_default(config);
    let platform = Platform::native();
    let displays = DisplayResolver::new(platform.displays, platform.inventory).enumerate();

    print_displays(&displays, config.anchor.as_ref(), json)
}

/// Execute the displays command.
///
/// # Errors
///
/// Always returns [`AnchorError::Unsupported`]: enumeration needs CoreGraphics.
#[cfg(not(target_os = "macos"))]
pub fn execute(_config: Option<&Path>, _json: bool) -> Result<(), AnchorError> {
    Err(AnchorError::Unsupported("display enumeration requires macOS".to_string()))
}

/// Prints `displays` as a table or as JSON.
///
/// # Errors
///
/// Returns an error if the list cannot be serialized.
pub fn print_displays(
    displays: &[DisplayDescriptor],
    anchor: Option<&Fingerprint>,
    json: bool,
) -> Result<(), AnchorError> {
    if json {
        output::print_highlighted_json(&serde_json::to_value(displays)?);
        return Ok(());
    }

    if displays.is_empty() {
        println!("{}", "No displays detected.".dimmed());
        return Ok(());
    }

    println!("{}", format!("Displays ({})", displays.len()).bold());
    println!("{}", render_table(displays, anchor));
    if anchor.is_none() {
        println!("\n{}", "No anchor selected. Run 'dockanchor anchor <FINGERPRINT>'.".dimmed());
    }
    Ok(())
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn render_table(displays: &[DisplayDescriptor], anchor: Option<&Fingerprint>) -> String {
    let rows: Vec<DisplayRow> = displays
        .iter()
        .map(|d| {
            let width = d.bounds.width as u32;
            let height = d.bounds.height as u32;
            let x = d.bounds.x as i32;
            let y = d.bounds.y as i32;
            DisplayRow {
                fingerprint: d.fingerprint.to_string(),
                name: output::truncate(&d.name, 32),
                resolution: format!("{width}x{height}"),
                position: format!("{x}, {y}"),
                main: output::format_bool(d.is_primary),
                builtin: output::format_bool(d.is_builtin),
                anchor: output::format_bool(anchor.is_some_and(|a| a.same_display(&d.fingerprint))),
            }
        })
        .collect();

    Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Columns::new(2..4)).with(Alignment::right()))
        .with(Modify::new(Columns::new(4..7)).with(Alignment::center()))
        .to_string()
}
