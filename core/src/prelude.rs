use serde::{Deserialize, Serialize};

/// What the calibrator does when a slice of the second grid has no variance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZeroVariancePolicy {
    /// Keep the scale (`factor = 1`) and fit only the offset between means.
    #[default]
    OffsetOnly,
    /// Fail the whole fit with [`CoreError::DegenerateFit`].
    Reject,
}

/// Shared configuration for overlap location and calibration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Drop matched frequency pairs further apart than this. `None` keeps all.
    pub max_freq_diff: Option<f64>,
    /// Gaussian sigma (in columns) applied to both slices before fitting.
    pub smoothing_sigma: Option<f64>,
    pub zero_variance: ZeroVariancePolicy,
}

/// Common error type for the core.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),
    #[error("frequency axis is not monotonic: {0}")]
    NonMonotonicAxis(String),
    #[error("invalid timing: {0}")]
    InvalidTiming(String),
    #[error("grids share no time interval: {0}")]
    NoOverlap(String),
    #[error("degenerate fit for rows ({row_a}, {row_b}): source slice has zero variance")]
    DegenerateFit { row_a: usize, row_b: usize },
    #[error("incompatible grids: {0}")]
    IncompatibleGrids(String),
    #[error("archive failure: {0}")]
    Archive(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
