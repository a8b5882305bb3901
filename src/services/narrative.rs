use crate::error::AppResult;
use crate::models::task::Task;
use crate::services::interval_aggregator::Interval;

/// Optional collaborator that turns an assignment into a free-text explanation
/// (typically backed by an LLM outside the engine). Failures degrade to the
/// deterministic template; they never fail a `generate` call.
pub trait NarrativeGenerator: Send + Sync {
    fn explain(&self, task: &Task, window: &Interval, score: i64) -> AppResult<String>;
}

/// Deterministic fallback so `reasoning` is never empty.
pub fn template_reasoning(task: &Task, window: &Interval, score: i64) -> String {
    format!(
        "Scheduled '{}' ({} priority, {} min) for {} starting {}; slot score {}.",
        task.title,
        task.priority,
        task.duration_minutes,
        window.start.format("%A"),
        window.start.format("%H:%M"),
        score,
    )
}

/// Default generator: just the template.
#[derive(Debug, Default, Clone, Copy)]
pub struct TemplateNarrative;

impl NarrativeGenerator for TemplateNarrative {
    fn explain(&self, task: &Task, window: &Interval, score: i64) -> AppResult<String> {
        Ok(template_reasoning(task, window, score))
    }
}
