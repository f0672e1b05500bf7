use crate::grid::{FreqOrder, Grid, Sample, TimeParams};
use crate::prelude::{CoreError, CoreResult};
use ndarray::Array2;

const TIME_TOLERANCE: f64 = 1e-9;

/// Stacks grids that share one time sampling into a single grid with all
/// their channels, ordered by frequency in the direction of the first grid.
pub fn combine_frequencies<T: Sample>(grids: &[Grid<T>]) -> CoreResult<Grid<T>> {
    let first = grids
        .first()
        .ok_or_else(|| CoreError::IncompatibleGrids("nothing to combine".into()))?;
    let columns = first.shape().1;

    for grid in &grids[1..] {
        let same_time = grid.shape().1 == columns
            && grid.start() == first.start()
            && (grid.t_init() - first.t_init()).abs() <= TIME_TOLERANCE
            && (grid.t_delt() - first.t_delt()).abs() <= TIME_TOLERANCE;
        if !same_time {
            return Err(CoreError::IncompatibleGrids(format!(
                "time sampling of {} differs from {}",
                grid.instrument(),
                first.instrument()
            )));
        }
    }

    let mut channels: Vec<(f64, usize, usize)> = grids
        .iter()
        .enumerate()
        .flat_map(|(index, grid)| {
            grid.freq_axis()
                .iter()
                .enumerate()
                .map(move |(row, &freq)| (freq, index, row))
        })
        .collect();
    channels.sort_by(|a, b| a.0.total_cmp(&b.0));
    if first.freq_order() == FreqOrder::Descending {
        channels.reverse();
    }

    let data = Array2::from_shape_fn((channels.len(), columns), |(k, c)| {
        let (_, index, row) = channels[k];
        grids[index].data()[[row, c]]
    });
    let freq_axis = channels.iter().map(|&(freq, _, _)| freq).collect();
    let timing = TimeParams {
        end: grids.iter().map(|g| g.end()).max().unwrap_or(first.end()),
        ..first.timing()
    };
    Grid::new(data, freq_axis, timing, first.header().clone())
}
