use serde::{Deserialize, Serialize};

/// Daily working hours as minutes from midnight, e.g. 540 = 09:00.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WorkingHours {
    pub start_minute: u32,
    pub end_minute: u32,
}

impl Default for WorkingHours {
    fn default() -> Self {
        Self {
            start_minute: 9 * 60,
            end_minute: 17 * 60,
        }
    }
}

/// A recurring block of the day reserved for deep work. Tasks flagged
/// `requires_focus` receive a scoring bonus when placed inside one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FocusBlock {
    pub start_minute: u32,
    pub end_minute: u32,
    /// Weekday indices (0 = Sunday .. 6 = Saturday) the block applies to.
    #[serde(default)]
    pub days: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerPreferences {
    #[serde(default)]
    pub working_hours: WorkingHours,
    /// Weekday indices (0 = Sunday .. 6 = Saturday) when scheduling is allowed.
    #[serde(default = "default_working_days")]
    pub working_days: Vec<u8>,
    /// Minimum gap required between an assignment and the end of its window.
    #[serde(default = "default_buffer_minutes")]
    pub buffer_minutes: i64,
    #[serde(default)]
    pub focus_blocks: Vec<FocusBlock>,
}

fn default_working_days() -> Vec<u8> {
    vec![1, 2, 3, 4, 5]
}

fn default_buffer_minutes() -> i64 {
    15
}

impl Default for SchedulerPreferences {
    fn default() -> Self {
        Self {
            working_hours: WorkingHours::default(),
            working_days: default_working_days(),
            buffer_minutes: default_buffer_minutes(),
            focus_blocks: Vec::new(),
        }
    }
}

impl SchedulerPreferences {
    pub fn is_working_day(&self, weekday_index: u8) -> bool {
        self.working_days.contains(&weekday_index)
    }
}
