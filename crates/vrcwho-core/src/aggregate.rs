//! Per-user statistics over filtered sessions.

use std::collections::HashMap;

use serde::Serialize;

use crate::reconstruct::{Instance, UserSession};
use crate::window::Window;

/// Derived per-user numbers for one report scope (a single instance, or the
/// whole report). Recomputed per request, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserStat {
    pub username: String,
    /// Number of session entries for this user in scope.
    pub join_count: u32,
    /// Total in-window presence, in whole seconds. Never negative.
    pub playtime_secs: i64,
}

/// Stats for the sessions of a single instance.
#[must_use]
pub fn instance_stats(instance: &Instance, window: &Window) -> Vec<UserStat> {
    stats_over(instance.users.iter(), window)
}

/// Stats across every instance in scope. The same username in different
/// instances is the same identity (case-sensitive exact match).
#[must_use]
pub fn overall_stats(instances: &[Instance], window: &Window) -> Vec<UserStat> {
    stats_over(
        instances.iter().flat_map(|instance| instance.users.iter()),
        window,
    )
}

fn stats_over<'a, I>(sessions: I, window: &Window) -> Vec<UserStat>
where
    I: Iterator<Item = &'a UserSession>,
{
    let mut by_user: HashMap<&str, (u32, i64)> = HashMap::new();
    for session in sessions {
        let (joins, playtime) = by_user.entry(session.username.as_str()).or_insert((0, 0));
        *joins = joins.saturating_add(1);
        *playtime += window.clipped_seconds(session);
    }

    let mut stats: Vec<UserStat> = by_user
        .into_iter()
        .map(|(username, (join_count, playtime_secs))| UserStat {
            username: username.to_string(),
            join_count,
            playtime_secs,
        })
        .collect();
    sort_stats(&mut stats);
    stats
}

/// Default report order: playtime descending, username ascending as tiebreak.
fn sort_stats(stats: &mut [UserStat]) {
    stats.sort_by(|a, b| {
        b.playtime_secs
            .cmp(&a.playtime_secs)
            .then_with(|| a.username.cmp(&b.username))
    });
}
