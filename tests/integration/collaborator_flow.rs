use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};
use chronoplan::error::{AppError, AppResult};
use chronoplan::models::preferences::SchedulerPreferences;
use chronoplan::models::schedule::{PlanningRange, TimeWindow};
use chronoplan::models::task::{Task, TaskPriority};
use chronoplan::services::collaborators::{
    CalendarProvider, MemorySettingsStore, SettingsStore, StaticCalendarProvider,
};
use chronoplan::services::interval_aggregator::Interval;
use chronoplan::services::narrative::{NarrativeGenerator, TemplateNarrative};
use chronoplan::services::schedule_optimizer::ScheduleOptimizer;
use chronoplan::services::schedule_utils;

fn dt(day: u32, hour: u32, minute: u32) -> DateTime<FixedOffset> {
    let offset = FixedOffset::east_opt(0).expect("offset");
    offset
        .from_local_datetime(
            &NaiveDate::from_ymd_opt(2024, 6, day)
                .expect("valid date")
                .and_hms_opt(hour, minute, 0)
                .expect("valid time"),
        )
        .single()
        .expect("valid datetime")
}

fn iso(day: u32, hour: u32, minute: u32) -> String {
    schedule_utils::format_datetime(dt(day, hour, minute))
}

fn task(id: &str, duration: i64, priority: TaskPriority) -> Task {
    Task {
        id: id.into(),
        title: format!("Task {id}"),
        duration_minutes: duration,
        priority,
        due_at: None,
        category: None,
        time_hint: None,
        requires_focus: false,
        completed: false,
    }
}

struct UnreachableNarrative;

impl NarrativeGenerator for UnreachableNarrative {
    fn explain(&self, _task: &Task, _window: &Interval, _score: i64) -> AppResult<String> {
        Err(AppError::collaborator("narrative", "provider unreachable"))
    }
}

#[tokio::test]
async fn fetch_generate_apply_round_trip() {
    let provider = StaticCalendarProvider::new(vec![TimeWindow {
        start_at: iso(10, 10, 0),
        end_at: iso(10, 11, 0),
    }]);

    let busy = provider
        .get_busy_intervals(&["primary".to_string()], &iso(10, 0, 0), &iso(10, 23, 59))
        .await
        .expect("busy intervals");

    let optimizer = ScheduleOptimizer::new(None);
    let result = optimizer
        .generate(
            &[task("a", 60, TaskPriority::High), task("b", 30, TaskPriority::Low)],
            &busy,
            &SchedulerPreferences::default(),
            &PlanningRange {
                start_at: iso(10, 0, 0),
                end_at: iso(10, 23, 59),
            },
        )
        .expect("generate");
    assert_eq!(result.assignments.len(), 2);

    for assignment in &result.assignments {
        provider
            .create_event(
                "primary",
                &TimeWindow {
                    start_at: assignment.start_at.clone(),
                    end_at: assignment.end_at.clone(),
                },
                &assignment.task_id,
            )
            .await
            .expect("create event");
    }
    assert_eq!(provider.created_events().len(), 2);
}

#[test]
fn narrative_failure_degrades_to_template_reasoning() {
    let optimizer = ScheduleOptimizer::new(None).with_narrative(Arc::new(UnreachableNarrative));
    let result = optimizer
        .generate(
            &[task("t1", 45, TaskPriority::High)],
            &[],
            &SchedulerPreferences::default(),
            &PlanningRange {
                start_at: iso(10, 0, 0),
                end_at: iso(10, 23, 59),
            },
        )
        .expect("generate despite narrative failure");

    assert_eq!(result.assignments.len(), 1);
    let reasoning = &result.assignments[0].reasoning;
    assert!(!reasoning.is_empty());
    assert!(reasoning.contains("high priority"));
    assert!(reasoning.contains("45 min"));
}

#[test]
fn preferences_flow_through_the_settings_store() {
    let store = MemorySettingsStore::default();
    let mut prefs = SchedulerPreferences::default();
    prefs.working_hours.start_minute = 10 * 60;
    prefs.working_hours.end_minute = 12 * 60;
    prefs.buffer_minutes = 0;
    store.save_preferences("user-1", &prefs).expect("save");

    let loaded = store
        .load_preferences("user-1")
        .expect("load")
        .expect("present");

    let optimizer = ScheduleOptimizer::new(None).with_narrative(Arc::new(TemplateNarrative));
    let result = optimizer
        .generate(
            &[task("t1", 60, TaskPriority::Medium)],
            &[],
            &loaded,
            &PlanningRange {
                start_at: iso(10, 0, 0),
                end_at: iso(10, 23, 59),
            },
        )
        .expect("generate");

    let start = schedule_utils::parse_datetime(&result.assignments[0].start_at).unwrap();
    let end = schedule_utils::parse_datetime(&result.assignments[0].end_at).unwrap();
    assert!(start >= dt(10, 10, 0));
    assert!(end <= dt(10, 12, 0));
}

#[test]
fn logging_initializes_into_a_directory() {
    let dir = tempfile::tempdir().expect("temp dir");
    chronoplan::utils::logger::init_logging(dir.path()).expect("first init");
    // second call is a no-op
    chronoplan::utils::logger::init_logging(dir.path()).expect("repeat init");
}
