use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::task::Task;
use crate::models::workload::DayWorkload;

/// A span of time on the calendar, RFC3339 timestamps. Depending on context this
/// is a busy interval, a free window, or a committed assignment window.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TimeWindow {
    pub start_at: String,
    pub end_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlanningRange {
    pub start_at: String,
    pub end_at: String,
}

/// A runner-up window kept alongside an assignment so callers can offer
/// alternatives without re-running the engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AlternativeSlot {
    pub start_at: String,
    pub end_at: String,
    pub score: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub task_id: String,
    pub start_at: String,
    pub end_at: String,
    pub score: i64,
    pub confidence: f64,
    pub reasoning: String,
    #[serde(default)]
    pub alternatives: Vec<AlternativeSlot>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictKind {
    Overlap,
    DeadlineOverrun,
}

impl ConflictKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictKind::Overlap => "overlap",
            ConflictKind::DeadlineOverrun => "deadline-overrun",
        }
    }
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub enum ConflictSeverity {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleConflict {
    pub kind: ConflictKind,
    pub severity: ConflictSeverity,
    pub message: String,
    #[serde(default)]
    pub task_ids: Vec<String>,
}

/// Everything a single `generate` run produces. Conflicts are reported, never
/// silently dropped; unassigned tasks are a normal outcome.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationResult {
    pub assignments: Vec<Assignment>,
    pub unassigned_tasks: Vec<Task>,
    pub conflicts: Vec<ScheduleConflict>,
    pub workload: Vec<DayWorkload>,
}
