use chrono::{DateTime, Duration, FixedOffset, Timelike};
use serde::{Deserialize, Serialize};

use crate::models::preferences::SchedulerPreferences;
use crate::models::task::{Task, TaskPriority};
use crate::services::interval_aggregator::{weekday_index_of, Interval};
use crate::services::schedule_utils;
use crate::services::time_hint::TimeOfDayHint;

/// All scoring policy in one overridable place; control flow in `score_slot`
/// stays free of magic numbers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ScoringWeights {
    pub base: i64,
    pub hint_exact: i64,
    pub hint_period: i64,
    pub hint_any: i64,
    pub priority_urgent: i64,
    pub priority_high: i64,
    pub priority_medium: i64,
    pub priority_low: i64,
    pub deadline_exact: i64,
    pub deadline_same_day: i64,
    pub deadline_proximity_max: i64,
    pub deadline_day_before: i64,
    pub deadline_two_days_before: i64,
    pub early_penalty_per_day: i64,
    pub deadline_missed: i64,
    pub fit_tight: i64,
    pub fit_partial: i64,
    pub focus_block: i64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            base: 50,
            hint_exact: 40,
            hint_period: 25,
            hint_any: 10,
            priority_urgent: 30,
            priority_high: 20,
            priority_medium: 10,
            priority_low: 5,
            deadline_exact: 1000,
            deadline_same_day: 500,
            deadline_proximity_max: 100,
            deadline_day_before: 50,
            deadline_two_days_before: 20,
            early_penalty_per_day: 20,
            deadline_missed: -1000,
            fit_tight: 10,
            fit_partial: 5,
            focus_block: 15,
        }
    }
}

impl ScoringWeights {
    fn priority_bonus(&self, priority: TaskPriority) -> i64 {
        match priority {
            TaskPriority::Urgent => self.priority_urgent,
            TaskPriority::High => self.priority_high,
            TaskPriority::Medium => self.priority_medium,
            TaskPriority::Low => self.priority_low,
        }
    }
}

/// Score one candidate slot for one task. The assignment under evaluation
/// starts at `slot.start` and runs for exactly the task's duration; `slot.end`
/// only matters for the duration-fit term.
pub fn score_slot(
    task: &Task,
    due: Option<DateTime<FixedOffset>>,
    slot: &Interval,
    hint: TimeOfDayHint,
    preferences: &SchedulerPreferences,
    weights: &ScoringWeights,
) -> i64 {
    let mut score = weights.base;

    score += hint_bonus(hint, slot.start.hour(), weights);
    score += weights.priority_bonus(task.priority);

    if let Some(due) = due {
        score += deadline_bonus(slot.start, due, task.duration_minutes, weights);
    }

    score += duration_fit_bonus(task.duration_minutes, slot.minutes(), weights);

    if task.requires_focus && in_focus_block(slot.start, preferences) {
        score += weights.focus_block;
    }

    score
}

/// Normalized confidence handed back to callers, `clamp(score, 0, 100) / 100`.
pub fn confidence_from_score(score: i64) -> f64 {
    score.clamp(0, 100) as f64 / 100.0
}

fn hint_bonus(hint: TimeOfDayHint, slot_hour: u32, weights: &ScoringWeights) -> i64 {
    if let Some((start, end)) = hint.exact_hours() {
        if (start..end).contains(&slot_hour) {
            return weights.hint_exact;
        }
    }
    match hint.period_hours() {
        Some((start, end)) if (start..end).contains(&slot_hour) => weights.hint_period,
        Some(_) => 0,
        None => weights.hint_any,
    }
}

/// Dominant scoring term. An exact start-at-deadline match must beat every
/// other candidate; same-day slots keep a large bonus plus proximity, earlier
/// days decay, and a finish past the deadline (outside its own day) is
/// effectively disqualified.
fn deadline_bonus(
    slot_start: DateTime<FixedOffset>,
    due: DateTime<FixedOffset>,
    duration_minutes: i64,
    weights: &ScoringWeights,
) -> i64 {
    let offset_minutes = due.signed_duration_since(slot_start).num_minutes();
    if offset_minutes.abs() <= 1 {
        return weights.deadline_exact;
    }

    if schedule_utils::same_day(slot_start, due) {
        let diff = (schedule_utils::midnight_minutes_of(due)
            - schedule_utils::midnight_minutes_of(slot_start))
        .abs();
        let proximity = (weights.deadline_proximity_max
            - diff * weights.deadline_proximity_max / 1440)
            .max(0);
        return weights.deadline_same_day + proximity;
    }

    let end = slot_start + Duration::minutes(duration_minutes);
    if end > due {
        return weights.deadline_missed;
    }

    let days_early = due
        .date_naive()
        .signed_duration_since(slot_start.date_naive())
        .num_days();
    match days_early {
        1 => weights.deadline_day_before,
        2 => weights.deadline_two_days_before,
        d if d > 2 => -(weights.early_penalty_per_day * (d - 2)),
        _ => weights.deadline_missed,
    }
}

fn duration_fit_bonus(duration_minutes: i64, slot_minutes: i64, weights: &ScoringWeights) -> i64 {
    if slot_minutes <= 0 {
        return 0;
    }
    let ratio = duration_minutes as f64 / slot_minutes as f64;
    if (0.8..=1.0).contains(&ratio) {
        weights.fit_tight
    } else if (0.5..0.8).contains(&ratio) {
        weights.fit_partial
    } else {
        0
    }
}

fn in_focus_block(start: DateTime<FixedOffset>, preferences: &SchedulerPreferences) -> bool {
    let weekday = weekday_index_of(start.date_naive());
    let minute = schedule_utils::midnight_minutes_of(start);
    preferences.focus_blocks.iter().any(|block| {
        let day_matches = block.days.is_empty() || block.days.contains(&weekday);
        day_matches
            && minute >= block.start_minute as i64
            && minute < block.end_minute as i64
    })
}
