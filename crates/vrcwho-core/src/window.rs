//! Report window validation, filtering, and clipping.

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::reconstruct::{Instance, UserSession};

/// Window validation errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WindowError {
    #[error("window end {end} is before start {start}")]
    EndBeforeStart {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
}

/// A validated half-open `[start, end)` report window.
///
/// Construction fails when `end < start`, so an invalid window is
/// unrepresentable everywhere downstream of the boundary check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl Window {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self, WindowError> {
        if end < start {
            return Err(WindowError::EndBeforeStart { start, end });
        }
        Ok(Self { start, end })
    }

    #[must_use]
    pub const fn start(&self) -> NaiveDateTime {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> NaiveDateTime {
        self.end
    }

    /// Whether `[span_start, span_end]` overlaps the window. Zero-length
    /// spans count when their instant lies inside `[start, end)`; anything
    /// else needs a non-empty intersection.
    fn overlaps(&self, span_start: NaiveDateTime, span_end: NaiveDateTime) -> bool {
        if span_start == span_end {
            return self.start <= span_start && span_start < self.end;
        }
        span_start.max(self.start) < span_end.min(self.end)
    }

    fn includes_instance(&self, instance: &Instance) -> bool {
        // Open-ended instances extend to the window end, not to "now",
        // keeping reports reproducible for a given window.
        self.overlaps(instance.entered_at, instance.exited_at.unwrap_or(self.end))
    }

    fn includes_session(&self, session: &UserSession) -> bool {
        self.overlaps(session.joined_at, session.end_or(self.end))
    }

    /// Clips a session's presence interval to the window, in whole seconds.
    /// Open-ended sessions clip to the window end. Degenerate intervals
    /// clamp to zero.
    #[must_use]
    pub fn clipped_seconds(&self, session: &UserSession) -> i64 {
        let start = session.joined_at.max(self.start);
        let end = session.end_or(self.end).min(self.end);
        let seconds = (end - start).num_seconds();
        if seconds < 0 {
            tracing::warn!(user = %session.username, "negative clipped duration, clamping to zero");
            return 0;
        }
        seconds
    }
}

/// Produces a filtered copy containing only the instances and sessions whose
/// spans intersect the window. Timestamps are left unclipped: the true
/// join/leave times stay available for display, and only duration
/// computation ([`Window::clipped_seconds`]) applies the boundaries.
#[must_use]
pub fn filter_instances(instances: &[Instance], window: &Window) -> Vec<Instance> {
    instances
        .iter()
        .filter(|instance| window.includes_instance(instance))
        .map(|instance| Instance {
            id: instance.id.clone(),
            name: instance.name.clone(),
            entered_at: instance.entered_at,
            exited_at: instance.exited_at,
            users: instance
                .users
                .iter()
                .filter(|session| window.includes_session(session))
                .cloned()
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 8, 31)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    fn session(user: &str, joined: NaiveDateTime, left: Option<NaiveDateTime>) -> UserSession {
        UserSession {
            username: user.to_string(),
            joined_at: joined,
            left_at: left,
        }
    }

    fn instance(
        entered: NaiveDateTime,
        exited: Option<NaiveDateTime>,
        users: Vec<UserSession>,
    ) -> Instance {
        Instance {
            id: "wrld_a:1".to_string(),
            name: None,
            entered_at: entered,
            exited_at: exited,
            users,
        }
    }

    #[test]
    fn rejects_end_before_start() {
        let err = Window::new(ts(5, 0, 0), ts(4, 0, 0)).unwrap_err();
        assert!(matches!(err, WindowError::EndBeforeStart { .. }));
    }

    #[test]
    fn accepts_empty_window() {
        assert!(Window::new(ts(4, 0, 0), ts(4, 0, 0)).is_ok());
    }

    #[test]
    fn drops_instance_entirely_outside_window() {
        let window = Window::new(ts(6, 0, 0), ts(7, 0, 0)).unwrap();
        let instances = vec![instance(ts(4, 0, 0), Some(ts(5, 0, 0)), Vec::new())];
        assert!(filter_instances(&instances, &window).is_empty());
    }

    #[test]
    fn keeps_instance_straddling_window_start() {
        let window = Window::new(ts(4, 30, 0), ts(6, 0, 0)).unwrap();
        let instances = vec![instance(ts(4, 0, 0), Some(ts(5, 0, 0)), Vec::new())];
        assert_eq!(filter_instances(&instances, &window).len(), 1);
    }

    #[test]
    fn open_ended_instance_extends_to_window_end() {
        let window = Window::new(ts(6, 0, 0), ts(7, 0, 0)).unwrap();
        let instances = vec![instance(ts(4, 0, 0), None, Vec::new())];
        assert_eq!(filter_instances(&instances, &window).len(), 1);

        // But an instance entered at or after the window end is out.
        let late = vec![instance(ts(7, 0, 0), None, Vec::new())];
        assert!(filter_instances(&late, &window).is_empty());
    }

    #[test]
    fn drops_sessions_with_zero_overlap() {
        let window = Window::new(ts(4, 30, 0), ts(6, 0, 0)).unwrap();
        let instances = vec![instance(
            ts(4, 0, 0),
            None,
            vec![
                session("Early", ts(4, 0, 0), Some(ts(4, 10, 0))),
                session("Kept", ts(4, 0, 0), Some(ts(4, 45, 0))),
            ],
        )];

        let filtered = filter_instances(&instances, &window);
        assert_eq!(filtered[0].users.len(), 1);
        assert_eq!(filtered[0].users[0].username, "Kept");
    }

    #[test]
    fn boundary_touch_is_not_overlap() {
        // A session ending exactly at the window start has zero overlap.
        let window = Window::new(ts(4, 30, 0), ts(6, 0, 0)).unwrap();
        let instances = vec![instance(
            ts(4, 0, 0),
            None,
            vec![session("Edge", ts(4, 0, 0), Some(ts(4, 30, 0)))],
        )];
        assert!(filter_instances(&instances, &window)[0].users.is_empty());
    }

    #[test]
    fn zero_length_session_inside_window_is_kept() {
        let window = Window::new(ts(4, 0, 0), ts(6, 0, 0)).unwrap();
        let instances = vec![instance(
            ts(4, 0, 0),
            None,
            vec![session("Blink", ts(4, 30, 0), Some(ts(4, 30, 0)))],
        )];
        assert_eq!(filter_instances(&instances, &window)[0].users.len(), 1);
    }

    #[test]
    fn filtering_preserves_true_timestamps() {
        let window = Window::new(ts(4, 30, 0), ts(5, 0, 0)).unwrap();
        let instances = vec![instance(
            ts(4, 0, 0),
            None,
            vec![session("Alice", ts(4, 10, 0), Some(ts(5, 30, 0)))],
        )];

        let filtered = filter_instances(&instances, &window);
        let kept = &filtered[0].users[0];
        assert_eq!(kept.joined_at, ts(4, 10, 0));
        assert_eq!(kept.left_at, Some(ts(5, 30, 0)));
    }

    #[test]
    fn filtering_is_idempotent() {
        let window = Window::new(ts(4, 30, 0), ts(6, 0, 0)).unwrap();
        let instances = vec![
            instance(
                ts(4, 0, 0),
                Some(ts(5, 0, 0)),
                vec![
                    session("Alice", ts(4, 10, 0), Some(ts(4, 50, 0))),
                    session("Early", ts(4, 0, 0), Some(ts(4, 10, 0))),
                ],
            ),
            instance(ts(6, 30, 0), None, Vec::new()),
        ];

        let once = filter_instances(&instances, &window);
        let twice = filter_instances(&once, &window);
        assert_eq!(once, twice);
    }

    #[test]
    fn clip_bounds_duration_to_window() {
        let window = Window::new(ts(4, 30, 0), ts(5, 0, 0)).unwrap();
        let full = session("Alice", ts(4, 0, 0), Some(ts(6, 0, 0)));
        assert_eq!(window.clipped_seconds(&full), 30 * 60);
    }

    #[test]
    fn clip_open_ended_session_to_window_end() {
        let window = Window::new(ts(4, 0, 0), ts(5, 0, 0)).unwrap();
        let open = session("Alice", ts(4, 40, 0), None);
        assert_eq!(window.clipped_seconds(&open), 20 * 60);
    }

    #[test]
    fn clip_never_negative() {
        let window = Window::new(ts(4, 0, 0), ts(5, 0, 0)).unwrap();
        let outside = session("Alice", ts(6, 0, 0), Some(ts(7, 0, 0)));
        assert_eq!(window.clipped_seconds(&outside), 0);
    }
}
