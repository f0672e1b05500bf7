//! The spectrogram grid and its invariants.

pub mod axis;
pub mod model;
pub mod sample;
pub mod spectrum;

pub use axis::FreqOrder;
pub use model::{Grid, GridHeader, TimeParams};
pub use sample::Sample;
pub use spectrum::Spectrum;
