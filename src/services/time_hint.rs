use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::task::Task;

/// Structured time-of-day preference for a task. Meal hints carry a narrow
/// contextual hour band inside a wider day period; plain period hints only have
/// the period; `Any` matches everything weakly.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDayHint {
    Breakfast,
    Lunch,
    Dinner,
    Morning,
    Afternoon,
    Evening,
    Any,
}

impl TimeOfDayHint {
    /// Narrow hour band for an exact contextual match, `[start, end)`.
    pub fn exact_hours(&self) -> Option<(u32, u32)> {
        match self {
            TimeOfDayHint::Breakfast => Some((7, 9)),
            TimeOfDayHint::Lunch => Some((11, 14)),
            TimeOfDayHint::Dinner => Some((18, 21)),
            _ => None,
        }
    }

    /// Wider day period the hint belongs to, `[start, end)` in hours.
    pub fn period_hours(&self) -> Option<(u32, u32)> {
        match self {
            TimeOfDayHint::Breakfast | TimeOfDayHint::Morning => Some((6, 12)),
            TimeOfDayHint::Lunch | TimeOfDayHint::Afternoon => Some((12, 18)),
            TimeOfDayHint::Dinner | TimeOfDayHint::Evening => Some((18, 22)),
            TimeOfDayHint::Any => None,
        }
    }
}

/// Pluggable classifier so the scorer never does string matching itself.
pub trait TimeHintClassifier: Send + Sync {
    fn classify(&self, task: &Task) -> TimeOfDayHint;
}

static BREAKFAST_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(breakfast|brunch)\b").expect("valid regex"));
static LUNCH_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\blunch\b").expect("valid regex"));
static DINNER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(dinner|supper)\b").expect("valid regex"));
static MORNING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bmorning\b").expect("valid regex"));
static AFTERNOON_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bafternoon\b").expect("valid regex"));
static EVENING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(evening|tonight)\b").expect("valid regex"));

/// Default classifier: honors an explicit hint on the task, otherwise sniffs
/// the title for well-known keywords.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordClassifier;

impl TimeHintClassifier for KeywordClassifier {
    fn classify(&self, task: &Task) -> TimeOfDayHint {
        if let Some(hint) = task.time_hint {
            return hint;
        }

        let title = task.title.as_str();
        if BREAKFAST_RE.is_match(title) {
            TimeOfDayHint::Breakfast
        } else if LUNCH_RE.is_match(title) {
            TimeOfDayHint::Lunch
        } else if DINNER_RE.is_match(title) {
            TimeOfDayHint::Dinner
        } else if MORNING_RE.is_match(title) {
            TimeOfDayHint::Morning
        } else if AFTERNOON_RE.is_match(title) {
            TimeOfDayHint::Afternoon
        } else if EVENING_RE.is_match(title) {
            TimeOfDayHint::Evening
        } else {
            TimeOfDayHint::Any
        }
    }
}
