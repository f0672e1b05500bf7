//! Pairwise intensity calibration.

pub mod calibrator;
pub mod fit;
pub mod params;

pub use calibrator::{Calibrator, Homogenized};
pub use fit::AffineFit;
pub use params::{CalibrationParams, PairCalibration};
