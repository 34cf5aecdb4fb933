//! Session reconstruction from the tokenized record stream.
//!
//! Folds the record sequence into an ordered list of instances, each holding
//! the join/leave intervals observed for every user. The running state (the
//! open instance plus each user's open session) is an explicit struct
//! threaded through the fold so the reconstructor can be driven and tested
//! in isolation.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::record::{LogRecord, RecordKind};

/// One continuous join-to-leave presence interval for one user.
///
/// `left_at` absent means the leave was never observed (still present at log
/// end, or the log was truncated). Invariant: `joined_at <= left_at` whenever
/// `left_at` is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSession {
    pub username: String,
    pub joined_at: NaiveDateTime,
    pub left_at: Option<NaiveDateTime>,
}

impl UserSession {
    /// End of the presence interval, with open-ended sessions extending to
    /// `fallback`.
    #[must_use]
    pub fn end_or(&self, fallback: NaiveDateTime) -> NaiveDateTime {
        self.left_at.unwrap_or(fallback)
    }
}

/// One multiplayer session in a world instance, bounded by enter/exit
/// records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Instance {
    /// World + instance identifier as logged (e.g. `wrld_…:12345~private`).
    pub id: String,
    /// Human-readable room name, when the log carried one.
    pub name: Option<String>,
    pub entered_at: NaiveDateTime,
    /// Absent when the log ended before the client left the instance.
    pub exited_at: Option<NaiveDateTime>,
    /// Sessions in observation order. A username may appear multiple times
    /// as distinct entries, one per join/leave cycle.
    pub users: Vec<UserSession>,
}

/// The instance currently being built, plus each username's open session
/// (an index into `instance.users`).
#[derive(Debug)]
struct OpenInstance {
    instance: Instance,
    open_sessions: HashMap<String, usize>,
}

impl OpenInstance {
    fn new(instance_id: String, entered_at: NaiveDateTime) -> Self {
        Self {
            instance: Instance {
                id: instance_id,
                name: None,
                entered_at,
                exited_at: None,
                users: Vec::new(),
            },
            open_sessions: HashMap::new(),
        }
    }

    fn join(&mut self, username: String, at: NaiveDateTime) {
        if let Some(&index) = self.open_sessions.get(&username) {
            // Two joins without an intervening leave: the leave was missed,
            // so the earlier session ends where the new one starts.
            tracing::debug!(user = %username, "consecutive join closes previous session");
            let previous = &mut self.instance.users[index];
            previous.left_at = Some(at.max(previous.joined_at));
        }
        self.open_sessions
            .insert(username.clone(), self.instance.users.len());
        self.instance.users.push(UserSession {
            username,
            joined_at: at,
            left_at: None,
        });
    }

    fn leave(&mut self, username: String, at: NaiveDateTime) {
        if let Some(index) = self.open_sessions.remove(&username) {
            let session = &mut self.instance.users[index];
            if at < session.joined_at {
                tracing::warn!(user = %username, "leave precedes join, clamping to join time");
                session.left_at = Some(session.joined_at);
            } else {
                session.left_at = Some(at);
            }
        } else {
            // Leave with no observed join: the user was present since before
            // logging of this instance started.
            tracing::debug!(user = %username, "leave without matching join, assuming present since instance start");
            let joined_at = self.instance.entered_at.min(at);
            self.instance.users.push(UserSession {
                username,
                joined_at,
                left_at: Some(at),
            });
        }
    }
}

/// Folds a record stream into the ordered list of instances it describes.
///
/// Records with no parsable timestamp and [`RecordKind::Other`] records are
/// skipped. Join/leave/exit records seen before any instance enter are
/// dropped: the log started mid-instance and there is nothing to attach them
/// to.
pub fn reconstruct<'a, I>(records: I) -> Vec<Instance>
where
    I: IntoIterator<Item = LogRecord<'a>>,
{
    let mut instances: Vec<Instance> = Vec::new();
    let mut current: Option<OpenInstance> = None;

    for record in records {
        let Some(at) = record.timestamp else {
            continue;
        };
        match record.kind {
            RecordKind::InstanceEnter { instance_id } => {
                // Open sessions of the previous instance keep left_at unset;
                // a leave was never observed and none is synthesized.
                if let Some(open) = current.take() {
                    instances.push(open.instance);
                }
                current = Some(OpenInstance::new(instance_id, at));
            }
            RecordKind::RoomName { name } => match current.as_mut() {
                Some(open) => {
                    if open.instance.name.is_none() {
                        open.instance.name = Some(name);
                    }
                }
                None => tracing::debug!(room = %name, "room name with no open instance, dropped"),
            },
            RecordKind::UserJoin { username } => match current.as_mut() {
                Some(open) => open.join(username, at),
                None => tracing::debug!(user = %username, "join before any instance enter, dropped"),
            },
            RecordKind::UserLeave { username } => match current.as_mut() {
                Some(open) => open.leave(username, at),
                None => tracing::debug!(user = %username, "leave before any instance enter, dropped"),
            },
            RecordKind::InstanceExit => match current.take() {
                Some(mut open) => {
                    open.instance.exited_at = Some(at);
                    instances.push(open.instance);
                }
                None => tracing::debug!("instance exit with no open instance, dropped"),
            },
            RecordKind::Other => {}
        }
    }

    if let Some(open) = current {
        instances.push(open.instance);
    }
    instances
}
