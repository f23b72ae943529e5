//! Terminal output helpers shared by the CLI commands.

use colored::Colorize;

/// Prints `value` as pretty JSON with syntax highlighting.
///
/// Keys are cyan, strings green, numbers yellow, and booleans and `null`
/// magenta. Colors are dropped when stdout is not a terminal.
pub fn print_highlighted_json(value: &serde_json::Value) {
    let pretty = serde_json::to_string_pretty(value).unwrap_or_else(|_| "null".to_string());
    println!("{}", highlight_json(&pretty));
}

/// Colors a pretty-printed JSON document.
fn highlight_json(json: &str) -> String {
    let mut out = String::with_capacity(json.len() * 2);
    let mut chars = json.char_indices().peekable();

    while let Some((start, ch)) = chars.next() {
        match ch {
            '"' => {
                let mut end = start + 1;
                let mut escaped = false;
                for (i, c) in chars.by_ref() {
                    end = i + c.len_utf8();
                    if escaped {
                        escaped = false;
                    } else if c == '\\' {
                        escaped = true;
                    } else if c == '"' {
                        break;
                    }
                }
                let literal = &json[start..end];
                // Only object keys are followed by a colon.
                let is_key = json[end..].chars().find(|c| !c.is_whitespace()) == Some(':');
                let colored = if is_key { literal.cyan() } else { literal.green() };
                out.push_str(&colored.to_string());
            }
            '{' | '}' | '[' | ']' | ':' | ',' => out.push_str(&ch.to_string().bold().to_string()),
            c if c.is_whitespace() => out.push(c),
            _ => {
                let mut end = start + ch.len_utf8();
                while let Some(&(i, c)) = chars.peek() {
                    if matches!(c, ',' | '}' | ']') || c.is_whitespace() {
                        break;
                    }
                    end = i + c.len_utf8();
                    chars.next();
                }
                let scalar = &json[start..end];
                let colored = match scalar {
                    "true" | "false" | "null" => scalar.magenta(),
                    _ => scalar.yellow(),
                };
                out.push_str(&colored.to_string());
            }
        }
    }
    out
}

/// Shortens `s` to at most `max_chars` characters, ending in `…` when cut.
///
/// Counts characters, not bytes, so multi-byte names are never split.
#[must_use]
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let kept: String = s.chars().take(max_chars.saturating_sub(1)).collect();
    format!("{kept}…")
}

/// Formats a boolean as a colored check mark or cross.
#[must_use]
pub fn format_bool(value: bool) -> String {
    if value { "✓".green().to_string() } else { "✗".red().to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strip_ansi(s: &str) -> String {
        let mut out = String::with_capacity(s.len());
        let mut chars = s.chars();
        while let Some(c) = chars.next() {
            if c == '\u{1b}' {
                chars.by_ref().find(|&c| c == 'm');
            } else {
                out.push(c);
            }
        }
        out
    }

    #[test]
    fn test_highlight_preserves_text() {
        let json = serde_json::to_string_pretty(&serde_json::json!({
            "fingerprint": "37D8832A-SN16843009",
            "bounds": { "x": -1920.0, "width": 1920.0 },
            "isPrimary": false,
            "names": ["Color LCD", "a \"quoted\" name"],
            "serial": null
        }))
        .unwrap();

        assert_eq!(strip_ansi(&highlight_json(&json)), json);
    }

    #[test]
    fn test_keys_and_values_are_told_apart() {
        let out = highlight_json(r#"{"anchor": "anchor", "names": ["a"]}"#);

        assert!(out.contains(&"\"anchor\"".cyan().to_string()));
        assert!(out.contains(&"\"anchor\"".green().to_string()));
        assert!(out.contains(&"\"a\"".green().to_string()));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Studio Display", 20), "Studio Display");
        assert_eq!(truncate("Studio Display", 14), "Studio Display");
        assert_eq!(truncate("Studio Display", 7), "Studio…");
        assert_eq!(truncate("Studio Display", 1), "…");
    }

    #[test]
    fn test_truncate_counts_characters() {
        assert_eq!(truncate("Écran intégré", 6), "Écran…");
        assert_eq!(truncate("LG 🖥 UltraFine", 5), "LG 🖥…");
    }

    #[test]
    fn test_format_bool() {
        assert!(format_bool(true).contains('✓'));
        assert!(format_bool(false).contains('✗'));
    }
}
