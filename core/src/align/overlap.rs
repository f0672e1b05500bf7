use crate::align::pairs::{MatchedPair, MinimalPairs};
use crate::grid::{Grid, Sample};
use crate::prelude::{CoreError, CoreResult};
use chrono::NaiveDateTime;
use log::debug;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Slack applied when turning window bounds into column indices.
const COLUMN_EPSILON: f64 = 1e-9;

/// Closed absolute time interval shared by two grids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Time window, column ranges and matched frequency channels of two grids.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlap {
    pub window: TimeWindow,
    /// Columns of the first grid inside the window (half-open).
    pub columns_a: Range<usize>,
    /// Columns of the second grid inside the window (half-open).
    pub columns_b: Range<usize>,
    /// Row pairs in original row indices: `i` into the first grid, `j` into
    /// the second.
    pub pairs: Vec<MatchedPair>,
}

impl Overlap {
    pub fn row_pairs(&self) -> Vec<(usize, usize)> {
        self.pairs.iter().map(|p| (p.i, p.j)).collect()
    }
}

/// Locates the shared time window and the matched frequency channels of
/// `first` and `second`. Pairs further apart than `max_freq_diff` are
/// dropped when a tolerance is given.
pub fn locate_overlap<A: Sample, B: Sample>(
    first: &Grid<A>,
    second: &Grid<B>,
    max_freq_diff: Option<f64>,
) -> CoreResult<Overlap> {
    let window = TimeWindow {
        start: first.start().max(second.start()),
        end: first.end().min(second.end()),
    };
    if window.end < window.start {
        return Err(CoreError::NoOverlap(format!(
            "{} and {} share no interval ({} > {})",
            first.instrument(),
            second.instrument(),
            window.start,
            window.end
        )));
    }

    let columns_a = columns_within(first, &window)?;
    let columns_b = columns_within(second, &window)?;
    let pairs = frequency_pairs(first, second, max_freq_diff);

    debug!(
        "overlap {} .. {}: columns {:?} / {:?}, {} channel pairs",
        window.start,
        window.end,
        columns_a,
        columns_b,
        pairs.len()
    );

    Ok(Overlap {
        window,
        columns_a,
        columns_b,
        pairs,
    })
}

/// Columns of `grid` whose sample times fall inside `window`.
pub fn columns_within<T: Sample>(grid: &Grid<T>, window: &TimeWindow) -> CoreResult<Range<usize>> {
    let columns = grid.shape().1;
    let first = (grid.column_position(window.start) - COLUMN_EPSILON)
        .ceil()
        .max(0.0);
    let last = (grid.column_position(window.end) + COLUMN_EPSILON).floor();

    if columns == 0 || last < first || last < 0.0 || first >= columns as f64 {
        return Err(CoreError::NoOverlap(format!(
            "no column of {} falls between {} and {}",
            grid.instrument(),
            window.start,
            window.end
        )));
    }

    let first = first as usize;
    let last = (last as usize).min(columns - 1);
    Ok(first..last + 1)
}

/// Aligns both frequency axes in ascending order and maps the matches back
/// onto the original row indices.
pub fn frequency_pairs<A: Sample, B: Sample>(
    first: &Grid<A>,
    second: &Grid<B>,
    max_freq_diff: Option<f64>,
) -> Vec<MatchedPair> {
    let order_a = first.freq_order();
    let order_b = second.freq_order();
    let axis_a = order_a.ascending(first.freq_axis());
    let axis_b = order_b.ascending(second.freq_axis());

    MinimalPairs::new(&axis_a, &axis_b)
        .into_iter()
        .filter(|p| max_freq_diff.map_or(true, |limit| p.distance <= limit))
        .map(|p| {
            MatchedPair::new(
                order_a.original_index(p.i, axis_a.len()),
                order_b.original_index(p.j, axis_b.len()),
                p.distance,
            )
        })
        .collect()
}
