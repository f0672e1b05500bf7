//! Sequence alignment and overlap location.

pub mod overlap;
pub mod pairs;

pub use overlap::{columns_within, frequency_pairs, locate_overlap, Overlap, TimeWindow};
pub use pairs::{minimal_pairs, MatchedPair, MinimalPairs, PairWalk};
