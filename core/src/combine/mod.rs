//! Building new grids from calibrated or adjacent ones.

pub mod join;
pub mod rescale;
pub mod stack;

pub use join::join_time;
pub use rescale::rescale;
pub use stack::combine_frequencies;
