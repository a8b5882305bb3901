use chrono::{DateTime, FixedOffset};
use tracing::warn;

use crate::models::schedule::{ConflictKind, ConflictSeverity, ScheduleConflict};
use crate::services::interval_aggregator::Interval;
use crate::services::schedule_utils;

/// A committed assignment as the detector sees it: the exact window plus the
/// deadline it was scheduled against.
#[derive(Debug, Clone)]
pub struct Placement {
    pub task_id: String,
    pub title: String,
    pub window: Interval,
    pub due: Option<DateTime<FixedOffset>>,
}

/// Post-hoc scan over committed placements: every overlapping pair and every
/// window ending past its task's deadline is reported as a high-severity
/// conflict. Quadratic in placement count, which stays in the tens.
pub fn detect_conflicts(placements: &[Placement]) -> Vec<ScheduleConflict> {
    let mut conflicts = Vec::new();

    for (idx, a) in placements.iter().enumerate() {
        for b in placements.iter().skip(idx + 1) {
            if a.window.overlaps(&b.window) {
                warn!(
                    target: "planner::conflict",
                    kind = %ConflictKind::Overlap,
                    first = %a.task_id,
                    second = %b.task_id,
                    "overlapping assignments"
                );
                conflicts.push(ScheduleConflict {
                    kind: ConflictKind::Overlap,
                    severity: ConflictSeverity::High,
                    message: format!(
                        "assignments for '{}' and '{}' overlap between {} and {}",
                        a.title,
                        b.title,
                        schedule_utils::format_datetime(a.window.start.max(b.window.start)),
                        schedule_utils::format_datetime(a.window.end.min(b.window.end)),
                    ),
                    task_ids: vec![a.task_id.clone(), b.task_id.clone()],
                });
            }
        }
    }

    for placement in placements {
        if let Some(due) = placement.due {
            if placement.window.end > due {
                warn!(
                    target: "planner::conflict",
                    kind = %ConflictKind::DeadlineOverrun,
                    task_id = %placement.task_id,
                    "assignment ends past its deadline"
                );
                conflicts.push(ScheduleConflict {
                    kind: ConflictKind::DeadlineOverrun,
                    severity: ConflictSeverity::High,
                    message: format!(
                        "'{}' ends at {} but is due at {}",
                        placement.title,
                        schedule_utils::format_datetime(placement.window.end),
                        schedule_utils::format_datetime(due),
                    ),
                    task_ids: vec![placement.task_id.clone()],
                });
            }
        }
    }

    conflicts
}
