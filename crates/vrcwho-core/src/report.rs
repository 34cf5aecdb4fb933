//! Final report assembly.

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::aggregate::{self, UserStat};
use crate::reconstruct::{Instance, UserSession};
use crate::window::Window;

/// One instance of the report: identity, bounds, the user session rows that
/// survived filtering (true, unclipped timestamps), and the per-user stats.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstanceReport {
    pub id: String,
    pub name: Option<String>,
    pub entered_at: NaiveDateTime,
    pub exited_at: Option<NaiveDateTime>,
    pub sessions: Vec<UserSession>,
    /// Playtime descending, username as tiebreak.
    pub stats: Vec<UserStat>,
}

/// The complete analysis result handed to the display layer. Fully owned and
/// serializable; holds no references to the input text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub window_start: NaiveDateTime,
    pub window_end: NaiveDateTime,
    /// Instances in chronological order.
    pub instances: Vec<InstanceReport>,
    /// Whole-report stats, usernames merged across instances.
    pub overall: Vec<UserStat>,
}

/// Assembles the report from already-filtered instances.
#[must_use]
pub fn build_report(instances: Vec<Instance>, window: &Window) -> Report {
    let overall = aggregate::overall_stats(&instances, window);
    let instances = instances
        .into_iter()
        .map(|instance| {
            let stats = aggregate::instance_stats(&instance, window);
            InstanceReport {
                id: instance.id,
                name: instance.name,
                entered_at: instance.entered_at,
                exited_at: instance.exited_at,
                sessions: instance.users,
                stats,
            }
        })
        .collect();

    Report {
        window_start: window.start(),
        window_end: window.end(),
        instances,
        overall,
    }
}
