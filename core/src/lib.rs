//! Alignment and intensity-calibration core for radio spectrograms recorded
//! by independent instruments.
//!
//! Grids arrive already decoded, get matched by time window and frequency
//! channel, and are calibrated pairwise with an affine fit so they can be
//! rescaled and stacked.

pub mod align;
pub mod calibrate;
pub mod combine;
pub mod grid;
pub mod interface;
pub mod math;
pub mod prelude;
pub mod telemetry;

pub use align::{locate_overlap, minimal_pairs, MatchedPair, MinimalPairs, Overlap};
pub use calibrate::{CalibrationParams, Calibrator};
pub use grid::{Grid, GridHeader, Sample, TimeParams};
pub use prelude::{CalibrationConfig, CoreError, CoreResult};
