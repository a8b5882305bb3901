pub mod collaborators;
pub mod conflict_detector;
pub mod interval_aggregator;
pub mod narrative;
pub mod schedule_optimizer;
pub mod schedule_utils;
pub mod slot_scorer;
pub mod slot_segmenter;
pub mod time_hint;
pub mod workload_analyzer;
