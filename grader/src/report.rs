use crate::error::GraderError;
use serde::{Deserialize, Serialize};

/// The outcome of one evaluation run, either parsed from a script's stdout
/// or assembled by the structural fallback checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreReport {
    pub total_points: f64,
    pub max_points: i32,
    /// Points per category, e.g. `{"documentation": 10, "code_structure": 20}`.
    #[serde(default = "empty_object")]
    pub breakdown: serde_json::Value,
    #[serde(default)]
    pub feedback: Option<String>,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub improvements: Vec<String>,
}

fn empty_object() -> serde_json::Value {
    serde_json::json!({})
}

impl ScoreReport {
    /// Parses a report from evaluation script output.
    ///
    /// Scripts are expected to print a single JSON object on stdout, but
    /// many also chatter log lines around it, so when the full output does
    /// not parse we retry on the outermost `{...}` slice before giving up.
    pub fn parse(stdout: &str) -> Result<Self, GraderError> {
        let trimmed = stdout.trim();
        if let Ok(report) = serde_json::from_str::<Self>(trimmed) {
            return Ok(report);
        }

        let start = trimmed.find('{');
        let end = trimmed.rfind('}');
        if let (Some(start), Some(end)) = (start, end) {
            if start < end {
                if let Ok(report) = serde_json::from_str::<Self>(&trimmed[start..=end]) {
                    return Ok(report);
                }
            }
        }

        Err(GraderError::EvaluationCrashed(format!(
            "script output is not a score report: {}",
            crate::truncate_output(trimmed)
        )))
    }

    /// Forces the report into the module's point scale: a missing or bogus
    /// `max_points` is replaced and `total_points` is clamped into range.
    pub fn normalize(mut self, fallback_max: i32) -> Self {
        if self.max_points <= 0 {
            self.max_points = fallback_max.max(1);
        }
        self.total_points = self.total_points.clamp(0.0, self.max_points as f64);
        self
    }
}
