//! Contracts with the collaborators that produce grids.
//!
//! Decoding and retrieval live outside the core; they hand over fully
//! validated [`Grid`] values or fail before one exists.

use crate::grid::{Grid, Sample};
use crate::prelude::CoreResult;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Identifies one retrievable observation file.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResourceId {
    pub instrument: String,
    pub start: NaiveDateTime,
    /// Receiver focus code; one instrument can observe several bands.
    pub focus: u8,
}

impl ResourceId {
    pub fn new(instrument: impl Into<String>, start: NaiveDateTime, focus: u8) -> Self {
        Self {
            instrument: instrument.into(),
            start,
            focus,
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}_{}_{:02}",
            self.instrument,
            self.start.format("%Y%m%d_%H%M%S"),
            self.focus
        )
    }
}

/// Listing and retrieval of observations by time range and instrument.
///
/// `query` makes no promise about ordering; callers that combine the
/// fetched grids sort them.
pub trait GridArchive {
    type Sample: Sample;

    fn query(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        instruments: &BTreeSet<String>,
    ) -> CoreResult<Vec<ResourceId>>;

    fn fetch(&self, id: &ResourceId) -> CoreResult<Grid<Self::Sample>>;
}
