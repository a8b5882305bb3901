use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone};
use chronoplan::models::preferences::SchedulerPreferences;
use chronoplan::models::schedule::{ConflictKind, PlanningRange, TimeWindow};
use chronoplan::models::task::{Task, TaskPriority};
use chronoplan::models::workload::WorkloadIntensity;
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

fn task(id: &str, duration: i64, priority: TaskPriority, due_at: Option<String>) -> Task {
    Task {
        id: id.into(),
        title: format!("Task {id}"),
        duration_minutes: duration,
        priority,
        due_at,
        category: None,
        time_hint: None,
        requires_focus: false,
        completed: false,
    }
}

// 2024-06-10 is a Monday
fn monday_range() -> PlanningRange {
    PlanningRange {
        start_at: iso(10, 0, 0),
        end_at: iso(10, 23, 59),
    }
}

#[test]
fn two_tasks_share_the_day_without_overlap() {
    let optimizer = ScheduleOptimizer::new(None);
    let tasks = vec![
        task("a", 60, TaskPriority::Medium, None),
        task("b", 60, TaskPriority::Medium, None),
    ];
    let result = optimizer
        .generate(&tasks, &[], &SchedulerPreferences::default(), &monday_range())
        .expect("generate");

    assert_eq!(result.assignments.len(), 2);
    assert!(result.conflicts.is_empty());

    let first_start = schedule_utils::parse_datetime(&result.assignments[0].start_at).unwrap();
    let first_end = schedule_utils::parse_datetime(&result.assignments[0].end_at).unwrap();
    let second_start = schedule_utils::parse_datetime(&result.assignments[1].start_at).unwrap();
    let second_end = schedule_utils::parse_datetime(&result.assignments[1].end_at).unwrap();
    assert!(first_end <= second_start || second_end <= first_start);

    let day = result
        .workload
        .iter()
        .find(|day| day.date == "2024-06-10")
        .expect("monday bucket");
    assert_eq!(day.task_count, 2);
    assert_eq!(day.total_hours, 2.0);
    assert_eq!(day.intensity, WorkloadIntensity::Light);
}

#[test]
fn busy_intervals_are_merged_before_scheduling() {
    let optimizer = ScheduleOptimizer::new(None);
    // Overlapping events 10:00-11:00 and 10:30-12:00 must behave as one
    // 10:00-12:00 block.
    let busy = vec![
        TimeWindow {
            start_at: iso(10, 10, 0),
            end_at: iso(10, 11, 0),
        },
        TimeWindow {
            start_at: iso(10, 10, 30),
            end_at: iso(10, 12, 0),
        },
    ];
    let tasks = vec![task("deep-work", 120, TaskPriority::High, None)];
    let result = optimizer
        .generate(&tasks, &busy, &SchedulerPreferences::default(), &monday_range())
        .expect("generate");

    assert_eq!(result.assignments.len(), 1);
    let start = schedule_utils::parse_datetime(&result.assignments[0].start_at).unwrap();
    let end = schedule_utils::parse_datetime(&result.assignments[0].end_at).unwrap();
    // the merged busy block is untouchable
    assert!(end <= dt(10, 10, 0) || start >= dt(10, 12, 0));
    assert!(result.conflicts.is_empty());
}

#[test]
fn rerunning_identical_inputs_yields_identical_results() {
    let optimizer = ScheduleOptimizer::new(Some(7));
    let tasks = vec![
        task("a", 90, TaskPriority::Urgent, Some(iso(11, 16, 0))),
        task("b", 45, TaskPriority::High, Some(iso(10, 15, 0))),
        task("c", 60, TaskPriority::High, None),
        task("d", 30, TaskPriority::Low, None),
    ];
    let busy = vec![TimeWindow {
        start_at: iso(10, 11, 0),
        end_at: iso(10, 13, 0),
    }];
    let range = PlanningRange {
        start_at: iso(10, 0, 0),
        end_at: iso(12, 23, 59),
    };
    let prefs = SchedulerPreferences::default();

    let first = optimizer.generate(&tasks, &busy, &prefs, &range).expect("first run");
    let second = optimizer.generate(&tasks, &busy, &prefs, &range).expect("second run");
    assert_eq!(first, second);
}

#[test]
fn committed_assignments_never_overlap() {
    let optimizer = ScheduleOptimizer::new(None);
    let tasks: Vec<Task> = (0..6)
        .map(|idx| task(&format!("t{idx}"), 45, TaskPriority::Medium, None))
        .collect();
    let result = optimizer
        .generate(&tasks, &[], &SchedulerPreferences::default(), &monday_range())
        .expect("generate");

    let windows: Vec<(DateTime<FixedOffset>, DateTime<FixedOffset>)> = result
        .assignments
        .iter()
        .map(|assignment| {
            (
                schedule_utils::parse_datetime(&assignment.start_at).unwrap(),
                schedule_utils::parse_datetime(&assignment.end_at).unwrap(),
            )
        })
        .collect();
    for (idx, a) in windows.iter().enumerate() {
        for b in windows.iter().skip(idx + 1) {
            assert!(a.1 <= b.0 || b.1 <= a.0, "assignments overlap: {a:?} {b:?}");
        }
    }
    assert!(result
        .conflicts
        .iter()
        .all(|conflict| conflict.kind != ConflictKind::Overlap));
}

#[test]
fn a_packed_day_is_reported_overloaded() {
    let optimizer = ScheduleOptimizer::new(None);
    let mut prefs = SchedulerPreferences::default();
    prefs.buffer_minutes = 0;
    let tasks: Vec<Task> = (0..8)
        .map(|idx| task(&format!("t{idx}"), 60, TaskPriority::Medium, None))
        .collect();
    let result = optimizer
        .generate(&tasks, &[], &prefs, &monday_range())
        .expect("generate");

    assert_eq!(result.assignments.len(), 8);
    let day = result
        .workload
        .iter()
        .find(|day| day.date == "2024-06-10")
        .expect("monday bucket");
    assert_eq!(day.total_hours, 8.0);
    assert_eq!(day.intensity, WorkloadIntensity::Overloaded);
}

#[test]
fn same_day_deadline_leniency_is_flagged_by_the_detector() {
    let optimizer = ScheduleOptimizer::new(None);
    // due 09:30 on the deadline day itself: the only legal slots are same-day,
    // and a 60-minute task cannot finish by then
    let tasks = vec![task("tight", 60, TaskPriority::Urgent, Some(iso(10, 9, 30)))];
    let result = optimizer
        .generate(&tasks, &[], &SchedulerPreferences::default(), &monday_range())
        .expect("generate");

    assert_eq!(result.assignments.len(), 1);
    let overruns: Vec<_> = result
        .conflicts
        .iter()
        .filter(|conflict| conflict.kind == ConflictKind::DeadlineOverrun)
        .collect();
    assert_eq!(overruns.len(), 1);
    assert_eq!(overruns[0].task_ids, vec!["tight".to_string()]);
}
