use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WorkloadIntensity {
    Light,
    Moderate,
    Heavy,
    Overloaded,
}

impl WorkloadIntensity {
    /// Bucket a day's total assigned hours.
    pub fn classify(total_hours: f64) -> Self {
        if total_hours <= 2.0 {
            WorkloadIntensity::Light
        } else if total_hours <= 4.0 {
            WorkloadIntensity::Moderate
        } else if total_hours <= 6.0 {
            WorkloadIntensity::Heavy
        } else {
            WorkloadIntensity::Overloaded
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkloadIntensity::Light => "light",
            WorkloadIntensity::Moderate => "moderate",
            WorkloadIntensity::Heavy => "heavy",
            WorkloadIntensity::Overloaded => "overloaded",
        }
    }
}

impl fmt::Display for WorkloadIntensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DayWorkload {
    /// Calendar day, `YYYY-MM-DD`.
    pub date: String,
    pub total_hours: f64,
    pub task_count: usize,
    pub intensity: WorkloadIntensity,
}
