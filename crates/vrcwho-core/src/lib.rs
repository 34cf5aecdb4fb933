//! Core engine for VRChat presence reports.
//!
//! Turns raw log bytes plus a report window into a structured report:
//! - Tokenizing: classifying log lines into typed records
//! - Reconstruction: folding records into instances and user sessions
//! - Filtering: clipping the model to a `[start, end)` window
//! - Aggregation: per-user join counts and playtime
//!
//! Everything is request-scoped and synchronous; the engine holds no state
//! between calls.

pub mod aggregate;
pub mod record;
pub mod reconstruct;
pub mod report;
pub mod window;

use thiserror::Error;

pub use aggregate::UserStat;
pub use record::{LogRecord, RecordKind, Tokenizer};
pub use reconstruct::{Instance, UserSession};
pub use report::{InstanceReport, Report};
pub use window::{Window, WindowError};

/// Whole-request analysis failures. Per-line problems never surface here;
/// they degrade to ignored records inside the tokenizer.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("log file is not valid UTF-8 text: {0}")]
    UnreadableInput(#[from] std::str::Utf8Error),
}

/// Runs the full pipeline: tokenize, reconstruct, filter, aggregate, build.
///
/// The window has already been validated at construction, so the only
/// remaining whole-request failure is undecodable input.
pub fn analyze(bytes: &[u8], window: &Window) -> Result<Report, AnalyzeError> {
    let text = std::str::from_utf8(bytes)?;
    let instances = reconstruct::reconstruct(Tokenizer::new(text));
    let filtered = window::filter_instances(&instances, window);
    Ok(report::build_report(filtered, window))
}
