//! Log line tokenizer.
//!
//! All knowledge of the VRChat log line format lives here. Every line starts
//! with a `2025.08.31 04:47:35` timestamp; the rest of the line is classified
//! into a typed record. Lines that match no known pattern (or whose timestamp
//! is unparsable) become [`RecordKind::Other`] and are skipped downstream.

use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;

/// Timestamp prefix format shared by every log line.
const TIMESTAMP_FORMAT: &str = "%Y.%m.%d %H:%M:%S";

/// Byte length of the timestamp prefix (`2025.08.31 04:47:35`).
const TIMESTAMP_LEN: usize = 19;

static INSTANCE_ENTER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[Behaviour\] Joining (wrld_\S+)").unwrap());

static ROOM_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[Behaviour\] Joining or Creating Room: (.+?)\s*$").unwrap());

static USER_JOIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"OnPlayerJoined (.+?)(?: \(usr_[0-9a-fA-F-]+\))?\s*$").unwrap());

static USER_LEAVE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"OnPlayerLeft (.+?)(?: \(usr_[0-9a-fA-F-]+\))?\s*$").unwrap());

static INSTANCE_EXIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[Behaviour\] OnLeftRoom").unwrap());

/// The event a log line encodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordKind {
    /// The client started joining a world instance.
    InstanceEnter { instance_id: String },
    /// Human-readable room name, logged right after an instance enter.
    RoomName { name: String },
    /// A remote user joined the current instance.
    UserJoin { username: String },
    /// A remote user left the current instance.
    UserLeave { username: String },
    /// The client left the current instance.
    InstanceExit,
    /// Unrecognized or malformed line; ignored by downstream consumers.
    Other,
}

impl RecordKind {
    /// Classifies the portion of a line after the timestamp prefix.
    fn classify(line: &str) -> Self {
        if let Some(caps) = INSTANCE_ENTER_RE.captures(line) {
            return Self::InstanceEnter {
                instance_id: caps[1].to_string(),
            };
        }
        if let Some(caps) = ROOM_NAME_RE.captures(line) {
            return Self::RoomName {
                name: caps[1].to_string(),
            };
        }
        if let Some(caps) = USER_JOIN_RE.captures(line) {
            return Self::UserJoin {
                username: caps[1].to_string(),
            };
        }
        if let Some(caps) = USER_LEAVE_RE.captures(line) {
            return Self::UserLeave {
                username: caps[1].to_string(),
            };
        }
        if INSTANCE_EXIT_RE.is_match(line) {
            return Self::InstanceExit;
        }
        Self::Other
    }
}

/// A classified log line.
///
/// Immutable once produced. `raw` borrows the input text so the tokenizer
/// never copies lines it is going to ignore.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord<'a> {
    /// Parsed line timestamp. `None` only when the prefix is missing or
    /// malformed, in which case `kind` is always [`RecordKind::Other`].
    pub timestamp: Option<NaiveDateTime>,
    pub kind: RecordKind,
    /// The raw line, kept for diagnostics.
    pub raw: &'a str,
}

impl<'a> LogRecord<'a> {
    /// Parses a single line. Never fails: anything unrecognized degrades to
    /// [`RecordKind::Other`] so one bad line cannot abort a whole file.
    pub fn parse(line: &'a str) -> Self {
        let Some(prefix) = line.get(..TIMESTAMP_LEN) else {
            return Self::other(line);
        };
        let Ok(timestamp) = NaiveDateTime::parse_from_str(prefix, TIMESTAMP_FORMAT) else {
            return Self::other(line);
        };
        Self {
            timestamp: Some(timestamp),
            kind: RecordKind::classify(&line[TIMESTAMP_LEN..]),
            raw: line,
        }
    }

    const fn other(line: &'a str) -> Self {
        Self {
            timestamp: None,
            kind: RecordKind::Other,
            raw: line,
        }
    }
}

/// Lazy iterator over the records of a log file, in file order.
///
/// Restartable: it borrows the input, so constructing a new tokenizer (or
/// cloning one before use) rescans the same text from the top.
#[derive(Debug, Clone)]
pub struct Tokenizer<'a> {
    lines: std::str::Lines<'a>,
}

impl<'a> Tokenizer<'a> {
    #[must_use]
    pub fn new(text: &'a str) -> Self {
        Self {
            lines: text.lines(),
        }
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = LogRecord<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let line = self.lines.next()?;
        // VRChat logs come from Windows; `lines()` leaves the \r behind.
        let line = line.strip_suffix('\r').unwrap_or(line);
        Some(LogRecord::parse(line))
    }
}
