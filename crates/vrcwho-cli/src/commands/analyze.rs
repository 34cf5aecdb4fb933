//! Analyze command: run the engine over one log file and render the report.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use vrcwho_core::{Report, Window};

use super::util::{format_duration, parse_datetime};
use crate::Config;

/// Timestamp format used everywhere in the human-readable output.
const DISPLAY_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Runs the analyze command. Window validation happens before the file is
/// even read; per-line problems never surface here.
pub fn run(file: &Path, start: &str, end: &str, json: bool, config: &Config) -> Result<()> {
    let start = parse_datetime(start).context("invalid --start")?;
    let end = parse_datetime(end).context("invalid --end")?;
    let window = Window::new(start, end)?;

    let bytes = std::fs::read(file)
        .with_context(|| format!("failed to read log file {}", file.display()))?;
    tracing::debug!(bytes = bytes.len(), "analyzing log file");
    let report = vrcwho_core::analyze(&bytes, &window)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", format_report(&report, config));
    }
    Ok(())
}

fn display(at: NaiveDateTime) -> String {
    at.format(DISPLAY_FORMAT).to_string()
}

/// Formats the human-readable report output.
pub fn format_report(report: &Report, config: &Config) -> String {
    let mut output = String::new();

    writeln!(
        output,
        "PRESENCE REPORT: {} .. {}",
        display(report.window_start),
        display(report.window_end)
    )
    .unwrap();

    if report.instances.is_empty() {
        writeln!(output).unwrap();
        writeln!(output, "No instances overlap this window.").unwrap();
        return output;
    }

    for instance in &report.instances {
        writeln!(output).unwrap();
        let name = instance.name.as_deref().unwrap_or("(unnamed)");
        writeln!(output, "INSTANCE {name}").unwrap();
        writeln!(output, "  id:      {}", instance.id).unwrap();
        let exited = instance
            .exited_at
            .map_or_else(|| "(still open)".to_string(), display);
        writeln!(
            output,
            "  entered: {}   exited: {exited}",
            display(instance.entered_at)
        )
        .unwrap();

        if instance.sessions.is_empty() {
            writeln!(output, "  (no users in window)").unwrap();
            continue;
        }

        writeln!(output, "  sessions:").unwrap();
        for session in &instance.sessions {
            let left = session
                .left_at
                .map_or_else(|| "(open)".to_string(), display);
            writeln!(
                output,
                "    {:<24} {} -> {left}",
                session.username,
                display(session.joined_at)
            )
            .unwrap();
        }

        writeln!(output, "  users:").unwrap();
        for stat in &instance.stats {
            writeln!(
                output,
                "    {:<24} joins: {:<3} time: {}",
                stat.username,
                stat.join_count,
                format_duration(stat.playtime_secs)
            )
            .unwrap();
        }
    }

    writeln!(output).unwrap();
    writeln!(output, "SUMMARY").unwrap();
    writeln!(output, "───────").unwrap();
    for stat in &report.overall {
        writeln!(
            output,
            "{:<24} joins: {:<3} time: {:<8} {}{}",
            stat.username,
            stat.join_count,
            format_duration(stat.playtime_secs),
            config.profile_url_base,
            stat.username
        )
        .unwrap();
    }

    output
}
