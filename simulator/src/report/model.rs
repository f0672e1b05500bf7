use crate::workflow::runner::WorkflowResult;
use serde::{Deserialize, Serialize};
use spectracore::calibrate::CalibrationParams;
use spectracore::telemetry::MetricsSnapshot;

/// Outcome of one calibration run as written to the JSON report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunReport {
    pub run: usize,
    pub reference: String,
    pub target: String,
    pub window_start: String,
    pub window_end: String,
    pub reference_shape: (usize, usize),
    pub target_shape: (usize, usize),
    pub files: Vec<String>,
    pub mean_factor: Option<f64>,
    pub expected_factor: Option<f64>,
    pub params: CalibrationParams,
}

impl RunReport {
    pub fn from_result(run: usize, result: &WorkflowResult) -> Self {
        Self {
            run,
            reference: result.reference.clone(),
            target: result.target.clone(),
            window_start: result.window.start.to_string(),
            window_end: result.window.end.to_string(),
            reference_shape: result.reference_shape,
            target_shape: result.target_shape,
            files: result.files.clone(),
            mean_factor: result.mean_factor(),
            expected_factor: result.expected_factor,
            params: result.params.clone(),
        }
    }

    pub fn summary(&self) -> String {
        let factor =
            |value: Option<f64>| value.map_or_else(|| "n/a".to_string(), |v| format!("{:.4}", v));
        format!(
            "run {}: {} -> {} over {} .. {}, {} pairs, mean factor {} (expected {})",
            self.run,
            self.target,
            self.reference,
            self.window_start,
            self.window_end,
            self.params.len(),
            factor(self.mean_factor),
            factor(self.expected_factor)
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct CalibrationReport {
    pub runs: Vec<RunReport>,
    pub failures: Vec<String>,
    pub jobs: usize,
    pub pairs: usize,
    pub fallbacks: usize,
    pub errors: usize,
}

impl CalibrationReport {
    pub fn new(metrics: MetricsSnapshot) -> Self {
        Self {
            runs: Vec::new(),
            failures: Vec::new(),
            jobs: metrics.jobs,
            pairs: metrics.pairs,
            fallbacks: metrics.fallbacks,
            errors: metrics.errors,
        }
    }
}
