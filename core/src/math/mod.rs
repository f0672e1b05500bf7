pub mod smoothing;
pub mod stats;

pub use smoothing::gaussian_filter1d;
pub use stats::StatsHelper;
