pub mod preferences;
pub mod schedule;
pub mod task;
pub mod workload;
