use std::collections::BTreeSet;

use chrono::{offset::LocalResult, DateTime, Datelike, Duration, FixedOffset, NaiveDate, TimeZone};
use tracing::debug;

use crate::error::AppResult;
use crate::models::preferences::SchedulerPreferences;
use crate::services::schedule_utils;

/// A parsed, validated time span. Everything downstream of input validation
/// works on these instead of raw RFC3339 strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

impl Interval {
    pub fn new(start: DateTime<FixedOffset>, end: DateTime<FixedOffset>) -> Self {
        Self { start, end }
    }

    pub fn minutes(&self) -> i64 {
        self.end.signed_duration_since(self.start).num_minutes()
    }

    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn overlaps_or_touches(&self, other: &Interval) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

/// Coalesce raw busy intervals: sort by start, then fold any spans that overlap
/// or touch into one merged interval.
pub fn merge_busy_intervals(mut intervals: Vec<Interval>) -> Vec<Interval> {
    intervals.sort_by_key(|interval| interval.start);

    let mut merged: Vec<Interval> = Vec::with_capacity(intervals.len());
    for interval in intervals {
        match merged.last_mut() {
            Some(last) if last.overlaps_or_touches(&interval) => {
                if interval.end > last.end {
                    last.end = interval.end;
                }
            }
            _ => merged.push(interval),
        }
    }
    merged
}

/// Compute the ordered free windows inside `range`: for each scheduled day
/// (a configured working day, or a day carrying some task's deadline) take the
/// working-hour window, clamp it to the planning range, and subtract the merged
/// busy intervals.
pub fn free_windows(
    busy: &[Interval],
    range: &Interval,
    preferences: &SchedulerPreferences,
    deadline_days: &BTreeSet<NaiveDate>,
) -> AppResult<Vec<Interval>> {
    let merged = merge_busy_intervals(busy.to_vec());
    let mut windows = Vec::new();

    let mut day = range.start.date_naive();
    let last_day = range.end.date_naive();
    while day <= last_day {
        let weekday_index = weekday_index_of(day);
        if preferences.is_working_day(weekday_index) || deadline_days.contains(&day) {
            if let Some(day_window) = working_window_for_day(day, range, preferences) {
                subtract_busy(&day_window, &merged, &mut windows);
            }
        }
        day += Duration::days(1);
    }

    debug!(
        target: "planner::aggregate",
        busy = merged.len(),
        free = windows.len(),
        "computed free windows"
    );
    Ok(windows)
}

pub fn weekday_index_of(day: NaiveDate) -> u8 {
    day.weekday().num_days_from_sunday() as u8
}

/// The working-hour window for one calendar day, clamped to the planning range.
/// `None` when the hours are empty or the day falls entirely outside the range.
fn working_window_for_day(
    day: NaiveDate,
    range: &Interval,
    preferences: &SchedulerPreferences,
) -> Option<Interval> {
    let hours = &preferences.working_hours;
    if hours.start_minute >= hours.end_minute {
        return None;
    }

    let offset = *range.start.offset();
    let start = build_day_time(day, hours.start_minute, offset)?.max(range.start);
    let end = build_day_time(day, hours.end_minute, offset)?.min(range.end);
    if start < end {
        Some(Interval::new(start, end))
    } else {
        None
    }
}

fn build_day_time(
    day: NaiveDate,
    minute_of_day: u32,
    offset: FixedOffset,
) -> Option<DateTime<FixedOffset>> {
    // minute 1440 means end of day, i.e. midnight of the following day
    let (day, minute_of_day) = if minute_of_day >= 24 * 60 {
        (day.succ_opt()?, minute_of_day - 24 * 60)
    } else {
        (day, minute_of_day)
    };
    let naive = day.and_time(schedule_utils::to_naive_time(minute_of_day));
    match offset.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Some(dt),
        LocalResult::Ambiguous(first, _) => Some(first),
        LocalResult::None => None,
    }
}

/// Subtract a sorted list of merged busy intervals from one day window,
/// appending the surviving free sub-windows in chronological order.
fn subtract_busy(day_window: &Interval, merged_busy: &[Interval], out: &mut Vec<Interval>) {
    let mut cursor = day_window.start;
    for busy in merged_busy {
        if busy.end <= cursor {
            continue;
        }
        if busy.start >= day_window.end {
            break;
        }
        if busy.start > cursor {
            out.push(Interval::new(cursor, busy.start.min(day_window.end)));
        }
        cursor = cursor.max(busy.end);
        if cursor >= day_window.end {
            return;
        }
    }
    if cursor < day_window.end {
        out.push(Interval::new(cursor, day_window.end));
    }
}
