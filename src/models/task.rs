use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
    Urgent,
}

impl TaskPriority {
    /// Ordering weight used by the prioritizer (urgent first).
    pub fn weight(&self) -> i64 {
        match self {
            TaskPriority::Urgent => 4,
            TaskPriority::High => 3,
            TaskPriority::Medium => 2,
            TaskPriority::Low => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskPriority::Low => "low",
            TaskPriority::Medium => "medium",
            TaskPriority::High => "high",
            TaskPriority::Urgent => "urgent",
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for TaskPriority {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "low" => Ok(TaskPriority::Low),
            "medium" => Ok(TaskPriority::Medium),
            "high" => Ok(TaskPriority::High),
            "urgent" => Ok(TaskPriority::Urgent),
            other => Err(format!("unsupported task priority: {other}")),
        }
    }
}

/// A unit of work the engine should place into the calendar. Immutable for the
/// duration of a single optimization run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub duration_minutes: i64,
    pub priority: TaskPriority,
    #[serde(default)]
    pub due_at: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    /// Explicit time-of-day preference; when absent the keyword classifier
    /// infers one from the title.
    #[serde(default)]
    pub time_hint: Option<crate::services::time_hint::TimeOfDayHint>,
    #[serde(default)]
    pub requires_focus: bool,
    #[serde(default)]
    pub completed: bool,
}
