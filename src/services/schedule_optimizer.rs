use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};
use crate::models::preferences::SchedulerPreferences;
use crate::models::schedule::{
    AlternativeSlot, Assignment, OptimizationResult, PlanningRange, TimeWindow,
};
use crate::models::task::Task;
use crate::services::conflict_detector::{detect_conflicts, Placement};
use crate::services::interval_aggregator::{self, Interval};
use crate::services::narrative::{template_reasoning, NarrativeGenerator};
use crate::services::schedule_utils;
use crate::services::slot_scorer::{confidence_from_score, score_slot, ScoringWeights};
use crate::services::slot_segmenter::{segment_window, DEFAULT_GRANULARITY_MINUTES};
use crate::services::time_hint::{KeywordClassifier, TimeHintClassifier};
use crate::services::workload_analyzer;

const MAX_ALTERNATIVES: usize = 3;
const MINUTES_PER_DAY: u32 = 24 * 60;

/// Greedy, deadline-aware scheduling engine. Stateless across runs: every
/// `generate` call is an atomic computation over its own inputs, so concurrent
/// runs never share mutable state.
pub struct ScheduleOptimizer {
    seed: u64,
    granularity_minutes: i64,
    weights: ScoringWeights,
    classifier: Box<dyn TimeHintClassifier>,
    narrative: Option<Arc<dyn NarrativeGenerator>>,
}

impl ScheduleOptimizer {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            seed: seed.unwrap_or(42),
            granularity_minutes: DEFAULT_GRANULARITY_MINUTES,
            weights: ScoringWeights::default(),
            classifier: Box::new(KeywordClassifier),
            narrative: None,
        }
    }

    pub fn with_weights(mut self, weights: ScoringWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn with_classifier(mut self, classifier: Box<dyn TimeHintClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn with_narrative(mut self, narrative: Arc<dyn NarrativeGenerator>) -> Self {
        self.narrative = Some(narrative);
        self
    }

    pub fn with_granularity(mut self, minutes: i64) -> Self {
        self.granularity_minutes = minutes.max(1);
        self
    }

    /// Run one optimization pass: aggregate free windows, assign tasks greedily
    /// in priority order, then report conflicts and per-day workload.
    pub fn generate(
        &self,
        tasks: &[Task],
        busy_intervals: &[TimeWindow],
        preferences: &SchedulerPreferences,
        range: &PlanningRange,
    ) -> AppResult<OptimizationResult> {
        let parsed = validate_inputs(tasks, busy_intervals, preferences, range)?;

        let mut free_pool = interval_aggregator::free_windows(
            &parsed.busy,
            &parsed.range,
            preferences,
            &parsed.deadline_days,
        )?;

        let ordered = self.order_tasks(parsed.pending);

        let mut placements: Vec<Placement> = Vec::new();
        let mut assignments = Vec::new();
        let mut unassigned = Vec::new();

        for pending in ordered {
            match self.best_candidate(&pending, &free_pool, preferences) {
                Some(chosen) => {
                    let end = schedule_utils::add_minutes(
                        chosen.slot.start,
                        pending.task.duration_minutes,
                    )?;
                    let window = Interval::new(chosen.slot.start, end);
                    split_consumed_window(&mut free_pool, chosen.window_idx, &window);

                    debug!(
                        target: "planner::assign",
                        task_id = %pending.task.id,
                        start = %schedule_utils::format_datetime(window.start),
                        score = chosen.score,
                        "committed assignment"
                    );

                    assignments.push(self.build_assignment(&pending, &window, &chosen));
                    placements.push(Placement {
                        task_id: pending.task.id.clone(),
                        title: pending.task.title.clone(),
                        window,
                        due: pending.due,
                    });
                }
                None => {
                    debug!(
                        target: "planner::assign",
                        task_id = %pending.task.id,
                        "no viable slot, task left unassigned"
                    );
                    unassigned.push(pending.task);
                }
            }
        }

        let conflicts = detect_conflicts(&placements);
        let assignment_windows: Vec<Interval> =
            placements.iter().map(|placement| placement.window).collect();
        let workload = workload_analyzer::summarize(&assignment_windows, &parsed.range);

        info!(
            target: "planner::generate",
            assigned = assignments.len(),
            unassigned = unassigned.len(),
            conflicts = conflicts.len(),
            "optimization run complete"
        );

        Ok(OptimizationResult {
            assignments,
            unassigned_tasks: unassigned,
            conflicts,
            workload,
        })
    }

    /// Priority weight descending, then earlier deadline first (deadline-less
    /// tasks last), then a seeded hash of the id so reruns are stable.
    fn order_tasks(&self, mut tasks: Vec<PendingTask>) -> Vec<PendingTask> {
        tasks.sort_by(|a, b| {
            b.task
                .priority
                .weight()
                .cmp(&a.task.priority.weight())
                .then_with(|| compare_due(a.due, b.due))
                .then_with(|| self.tie_breaker(&a.task, &b.task))
        });
        tasks
    }

    fn tie_breaker(&self, a: &Task, b: &Task) -> Ordering {
        deterministic_hash(&a.id, self.seed).cmp(&deterministic_hash(&b.id, self.seed))
    }

    /// Segment every currently-free window for this task, drop candidates that
    /// fail the fit or deadline filters, score the rest and keep the best
    /// (ties to the earliest start). Runner-ups stay attached as alternatives.
    fn best_candidate(
        &self,
        pending: &PendingTask,
        free_pool: &[Interval],
        preferences: &SchedulerPreferences,
    ) -> Option<ScoredCandidate> {
        let duration = pending.task.duration_minutes;
        let required = duration + preferences.buffer_minutes;
        let hint = self.classifier.classify(&pending.task);

        let mut candidates: Vec<ScoredCandidate> = Vec::new();
        for (window_idx, window) in free_pool.iter().enumerate() {
            for slot in segment_window(
                window,
                duration,
                preferences.buffer_minutes,
                self.granularity_minutes,
            ) {
                if slot.minutes() < required {
                    continue;
                }
                if let Some(due) = pending.due {
                    let end = slot.start + Duration::minutes(duration);
                    // same-day slots stay legal even when they run past the
                    // deadline instant; the conflict detector flags them
                    if end > due && !schedule_utils::same_day(slot.start, due) {
                        continue;
                    }
                }
                let score = score_slot(
                    &pending.task,
                    pending.due,
                    &slot,
                    hint,
                    preferences,
                    &self.weights,
                );
                candidates.push(ScoredCandidate {
                    window_idx,
                    slot,
                    score,
                    alternatives: Vec::new(),
                });
            }
        }

        if candidates.is_empty() {
            return None;
        }

        candidates.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.slot.start.cmp(&b.slot.start))
                .then_with(|| a.window_idx.cmp(&b.window_idx))
        });

        let mut best = candidates.remove(0);
        let mut seen_starts = vec![best.slot.start];
        for runner_up in candidates {
            if best.alternatives.len() >= MAX_ALTERNATIVES {
                break;
            }
            if seen_starts.contains(&runner_up.slot.start) {
                continue;
            }
            seen_starts.push(runner_up.slot.start);
            best.alternatives.push(AlternativeSlot {
                start_at: schedule_utils::format_datetime(runner_up.slot.start),
                end_at: schedule_utils::format_datetime(
                    runner_up.slot.start + Duration::minutes(duration),
                ),
                score: runner_up.score,
            });
        }
        Some(best)
    }

    fn build_assignment(
        &self,
        pending: &PendingTask,
        window: &Interval,
        chosen: &ScoredCandidate,
    ) -> Assignment {
        let reasoning = match &self.narrative {
            Some(generator) => match generator.explain(&pending.task, window, chosen.score) {
                Ok(text) if !text.trim().is_empty() => text,
                Ok(_) => template_reasoning(&pending.task, window, chosen.score),
                Err(err) => {
                    warn!(
                        target: "planner::narrative",
                        task_id = %pending.task.id,
                        error = %err,
                        "narrative generator failed, using template fallback"
                    );
                    template_reasoning(&pending.task, window, chosen.score)
                }
            },
            None => template_reasoning(&pending.task, window, chosen.score),
        };

        Assignment {
            task_id: pending.task.id.clone(),
            start_at: schedule_utils::format_datetime(window.start),
            end_at: schedule_utils::format_datetime(window.end),
            score: chosen.score,
            confidence: confidence_from_score(chosen.score),
            reasoning,
            alternatives: chosen.alternatives.clone(),
        }
    }
}

#[derive(Debug, Clone)]
struct PendingTask {
    task: Task,
    due: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Clone)]
struct ScoredCandidate {
    window_idx: usize,
    slot: Interval,
    score: i64,
    alternatives: Vec<AlternativeSlot>,
}

struct ParsedInputs {
    pending: Vec<PendingTask>,
    busy: Vec<Interval>,
    range: Interval,
    deadline_days: BTreeSet<NaiveDate>,
}

/// The engine's only hard failure path: reject malformed input before any
/// scoring begins.
fn validate_inputs(
    tasks: &[Task],
    busy_intervals: &[TimeWindow],
    preferences: &SchedulerPreferences,
    range: &PlanningRange,
) -> AppResult<ParsedInputs> {
    let range_start = schedule_utils::parse_datetime(&range.start_at)?;
    let range_end = schedule_utils::parse_datetime(&range.end_at)?;
    schedule_utils::ensure_window(range_start, range_end)?;

    let mut busy = Vec::with_capacity(busy_intervals.len());
    for window in busy_intervals {
        let start = schedule_utils::parse_datetime(&window.start_at)?;
        let end = schedule_utils::parse_datetime(&window.end_at)?;
        schedule_utils::ensure_window(start, end)?;
        busy.push(Interval::new(start, end));
    }

    if preferences.buffer_minutes < 0 {
        return Err(AppError::validation("buffer minutes must not be negative"));
    }
    // 1440 is allowed as an end minute and means end of day
    if preferences.working_hours.start_minute >= MINUTES_PER_DAY
        || preferences.working_hours.end_minute > MINUTES_PER_DAY
    {
        return Err(AppError::validation_with_details(
            "working hours minutes out of range",
            json!({
                "startMinute": preferences.working_hours.start_minute,
                "endMinute": preferences.working_hours.end_minute,
            }),
        ));
    }
    if preferences.working_hours.start_minute > preferences.working_hours.end_minute {
        return Err(AppError::validation(
            "working hours start must not be after working hours end",
        ));
    }
    if let Some(day) = preferences.working_days.iter().find(|day| **day > 6) {
        return Err(AppError::validation_with_details(
            "weekday index out of range",
            json!({"day": day}),
        ));
    }
    for block in &preferences.focus_blocks {
        if block.start_minute >= block.end_minute || block.end_minute > MINUTES_PER_DAY {
            return Err(AppError::validation_with_details(
                "focus block minutes out of range",
                json!({"startMinute": block.start_minute, "endMinute": block.end_minute}),
            ));
        }
        if let Some(day) = block.days.iter().find(|day| **day > 6) {
            return Err(AppError::validation_with_details(
                "focus block weekday index out of range",
                json!({"day": day}),
            ));
        }
    }

    let mut pending = Vec::new();
    let mut deadline_days = BTreeSet::new();
    for task in tasks {
        if task.duration_minutes <= 0 {
            return Err(AppError::validation_with_details(
                "task duration must be positive",
                json!({"taskId": task.id, "durationMinutes": task.duration_minutes}),
            ));
        }
        if task.completed {
            continue;
        }
        let due = schedule_utils::parse_optional_datetime(task.due_at.as_ref())?;
        if let Some(due) = due {
            deadline_days.insert(due.date_naive());
        }
        pending.push(PendingTask {
            task: task.clone(),
            due,
        });
    }

    if preferences.working_days.is_empty() && deadline_days.is_empty() {
        return Err(AppError::validation(
            "no working days configured and no deadline days to schedule into",
        ));
    }

    Ok(ParsedInputs {
        pending,
        busy,
        range: Interval::new(range_start, range_end),
        deadline_days,
    })
}

fn compare_due(a: Option<DateTime<FixedOffset>>, b: Option<DateTime<FixedOffset>>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Remove the consumed window from the pool and reinsert the non-empty leading
/// and trailing remainders, keeping the pool ordered by start.
fn split_consumed_window(pool: &mut Vec<Interval>, window_idx: usize, consumed: &Interval) {
    let source = pool.remove(window_idx);
    if source.start < consumed.start {
        pool.push(Interval::new(source.start, consumed.start));
    }
    if consumed.end < source.end {
        pool.push(Interval::new(consumed.end, source.end));
    }
    pool.sort_by_key(|window| window.start);
}

fn deterministic_hash(value: &str, seed: u64) -> u64 {
    let mut hash: u64 = seed; // FNV-1a like simple hash
    for byte in value.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(1_099_511_628_211u64);
    }
    hash
}
