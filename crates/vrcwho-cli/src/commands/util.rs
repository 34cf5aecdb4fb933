//! Shared utilities for CLI commands.

use chrono::NaiveDateTime;

/// Accepted window-bound formats: the common form, datetime-local style
/// (with and without seconds), and the log's own timestamp format.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y.%m.%d %H:%M:%S",
];

/// Parse a window bound in any accepted format.
pub fn parse_datetime(s: &str) -> anyhow::Result<NaiveDateTime> {
    let s = s.trim();
    for format in DATETIME_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(parsed);
        }
    }
    anyhow::bail!(
        "invalid time: {s}. Use e.g. \"2025-08-31 04:47:35\", \"2025-08-31T04:47\", or the log's own \"2025.08.31 04:47:35\""
    )
}

/// Formats whole seconds as a duration string.
/// Returns "Xh Ym" if >= 1 hour, "Xm" if < 1 hour.
/// Negative durations are treated as 0m.
pub fn format_duration(secs: i64) -> String {
    if secs < 0 {
        return "0m".to_string();
    }
    let total_minutes = secs / 60;
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;

    if hours >= 1 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}
