use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};

use crate::models::workload::{DayWorkload, WorkloadIntensity};
use crate::services::interval_aggregator::Interval;

/// Bucket committed assignment windows per calendar day across the whole
/// planning range. Every day in the range appears, zero-assignment days as
/// light/0h; assignments are attributed to the day they start on.
pub fn summarize(assignment_windows: &[Interval], range: &Interval) -> Vec<DayWorkload> {
    let mut per_day: BTreeMap<NaiveDate, (i64, usize)> = BTreeMap::new();

    let mut day = range.start.date_naive();
    let last_day = range.end.date_naive();
    while day <= last_day {
        per_day.insert(day, (0, 0));
        day += Duration::days(1);
    }

    for window in assignment_windows {
        let entry = per_day.entry(window.start.date_naive()).or_insert((0, 0));
        entry.0 += window.minutes();
        entry.1 += 1;
    }

    per_day
        .into_iter()
        .map(|(date, (minutes, count))| {
            let total_hours = minutes as f64 / 60.0;
            DayWorkload {
                date: date.format("%Y-%m-%d").to_string(),
                total_hours,
                task_count: count,
                intensity: WorkloadIntensity::classify(total_hours),
            }
        })
        .collect()
}
