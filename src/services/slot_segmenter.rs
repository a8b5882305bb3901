use chrono::Duration;

use crate::services::interval_aggregator::Interval;

pub const DEFAULT_GRANULARITY_MINUTES: i64 = 60;

/// Subdivide one free window into candidate slots for a task of the given
/// duration. Candidates advance in `granularity`-minute steps from the window
/// start and always keep the window's own end, so the exact boundary survives
/// as an option while intermediate starts give hourly-resolution choices for
/// time-of-day scoring. A window too short for duration + buffer is emitted
/// whole and left to the fit filter.
pub fn segment_window(
    window: &Interval,
    duration_minutes: i64,
    buffer_minutes: i64,
    granularity: i64,
) -> Vec<Interval> {
    let required = duration_minutes + buffer_minutes;
    if window.minutes() < required {
        return vec![*window];
    }

    let step = granularity.max(1);
    let mut slots = Vec::new();
    let mut start = window.start;
    while window.end.signed_duration_since(start).num_minutes() >= required {
        slots.push(Interval::new(start, window.end));
        start += Duration::minutes(step);
    }
    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};

    fn dt(hour: u32, minute: u32) -> DateTime<FixedOffset> {
        let offset = FixedOffset::east_opt(0).expect("offset");
        offset
            .from_local_datetime(
                &NaiveDate::from_ymd_opt(2024, 6, 10)
                    .expect("valid date")
                    .and_hms_opt(hour, minute, 0)
                    .expect("valid time"),
            )
            .single()
            .expect("valid datetime")
    }

    #[test]
    fn short_window_survives_as_single_candidate() {
        let window = Interval::new(dt(9, 0), dt(9, 30));
        let slots = segment_window(&window, 45, 15, DEFAULT_GRANULARITY_MINUTES);
        assert_eq!(slots, vec![window]);
    }

    #[test]
    fn long_window_yields_hourly_starts_with_capped_ends() {
        let window = Interval::new(dt(9, 0), dt(12, 0));
        let slots = segment_window(&window, 60, 0, DEFAULT_GRANULARITY_MINUTES);
        let starts: Vec<_> = slots.iter().map(|slot| slot.start).collect();
        assert_eq!(starts, vec![dt(9, 0), dt(10, 0), dt(11, 0)]);
        assert!(slots.iter().all(|slot| slot.end == dt(12, 0)));
    }

    #[test]
    fn buffer_shrinks_the_number_of_viable_starts() {
        let window = Interval::new(dt(9, 0), dt(12, 0));
        let slots = segment_window(&window, 60, 30, DEFAULT_GRANULARITY_MINUTES);
        let starts: Vec<_> = slots.iter().map(|slot| slot.start).collect();
        // 11:00 start would leave only 60 minutes, below 60 + 30
        assert_eq!(starts, vec![dt(9, 0), dt(10, 0)]);
    }
}
