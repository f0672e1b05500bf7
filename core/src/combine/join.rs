use crate::grid::axis::{day_start, seconds_between};
use crate::grid::{Grid, Sample, TimeParams};
use crate::prelude::{CoreError, CoreResult};
use ndarray::{s, Array2};

const AXIS_TOLERANCE: f64 = 1e-9;

/// Joins grids of one instrument along time.
///
/// Grids are ordered by the time of their first column. Each one is placed at
/// the column nearest its first sample, gaps are filled with `fill`, and
/// where two grids cover the same columns the later grid's samples win.
pub fn join_time<T: Sample>(grids: &[Grid<T>], fill: T) -> CoreResult<Grid<T>> {
    let base = grids
        .iter()
        .map(|g| day_start(g.start()))
        .min()
        .ok_or_else(|| CoreError::IncompatibleGrids("nothing to join".into()))?;

    let mut ordered: Vec<(f64, &Grid<T>)> = grids
        .iter()
        .map(|g| (seconds_between(base, day_start(g.start())) + g.t_init(), g))
        .collect();
    ordered.sort_by(|a, b| a.0.total_cmp(&b.0));

    let (origin, first) = ordered[0];
    let t_delt = first.t_delt();
    for (_, grid) in &ordered[1..] {
        check_same_channels(first, *grid)?;
        if (grid.t_delt() - t_delt).abs() > AXIS_TOLERANCE * t_delt {
            return Err(CoreError::IncompatibleGrids(format!(
                "time step {} differs from {}",
                grid.t_delt(),
                t_delt
            )));
        }
    }

    let placements: Vec<(usize, &Grid<T>)> = ordered
        .iter()
        .map(|&(seconds, grid)| (((seconds - origin) / t_delt).round() as usize, grid))
        .collect();
    let columns = placements
        .iter()
        .map(|(offset, grid)| offset + grid.shape().1)
        .max()
        .unwrap_or(0);

    let mut data = Array2::from_elem((first.shape().0, columns), fill);
    for (offset, grid) in &placements {
        let width = grid.shape().1;
        data.slice_mut(s![.., *offset..*offset + width])
            .assign(&grid.data());
    }

    let timing = TimeParams {
        t_init: first.t_init(),
        t_delt,
        start: grids.iter().map(|g| g.start()).min().unwrap_or(first.start()),
        end: grids.iter().map(|g| g.end()).max().unwrap_or(first.end()),
    };
    let mut header = first.header().clone();
    header.meta.insert("joined".into(), grids.len().to_string());
    Grid::new(data, first.freq_axis().to_vec(), timing, header)
}

fn check_same_channels<A: Sample, B: Sample>(first: &Grid<A>, other: &Grid<B>) -> CoreResult<()> {
    let same = first.freq_axis().len() == other.freq_axis().len()
        && first
            .freq_axis()
            .iter()
            .zip(other.freq_axis())
            .all(|(a, b)| (a - b).abs() <= AXIS_TOLERANCE);
    if same {
        Ok(())
    } else {
        Err(CoreError::IncompatibleGrids(format!(
            "frequency channels of {} differ from {}",
            other.instrument(),
            first.instrument()
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridHeader;
    use chrono::{NaiveDate, NaiveDateTime, TimeDelta};

    fn at(minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2011, 9, 22)
            .unwrap()
            .and_hms_opt(5, minute, 0)
            .unwrap()
    }

    fn chunk(minute: u32, columns: usize, value: u8, freqs: Vec<f64>) -> Grid<u8> {
        let start = at(minute);
        Grid::new(
            Array2::from_elem((freqs.len(), columns), value),
            freqs,
            TimeParams {
                t_init: 5.0 * 3600.0 + minute as f64 * 60.0,
                t_delt: 1.0,
                start,
                end: start + TimeDelta::seconds(columns as i64),
            },
            GridHeader::new("BIR", "test"),
        )
        .unwrap()
    }

    #[test]
    fn join_orders_chunks_and_fills_gaps() {
        let late = chunk(3, 60, 7, vec![10.0, 20.0]);
        let early = chunk(0, 60, 3, vec![10.0, 20.0]);

        let joined = join_time(&[late, early], 0).unwrap();
        assert_eq!(joined.shape(), (2, 240));
        assert_eq!(joined.t_init(), 18000.0);
        assert_eq!(joined.start(), at(0));
        assert_eq!(joined.end(), at(4));
        assert_eq!(joined.data()[[0, 0]], 3);
        assert_eq!(joined.data()[[1, 100]], 0);
        assert_eq!(joined.data()[[1, 200]], 7);
        assert_eq!(joined.header().meta["joined"], "2");
    }

    #[test]
    fn later_chunk_wins_on_overlap() {
        let early = chunk(0, 90, 3, vec![10.0]);
        let late = chunk(1, 60, 9, vec![10.0]);
        let joined = join_time(&[early, late], 0).unwrap();
        assert_eq!(joined.shape(), (1, 120));
        assert_eq!(joined.data()[[0, 59]], 3);
        assert_eq!(joined.data()[[0, 60]], 9);
        assert_eq!(joined.data()[[0, 119]], 9);
    }

    #[test]
    fn join_rejects_mismatched_channels() {
        let a = chunk(0, 10, 1, vec![10.0, 20.0]);
        let b = chunk(1, 10, 1, vec![10.0, 21.0]);
        assert!(matches!(join_time(&[a, b], 0), Err(CoreError::IncompatibleGrids(_))));
        assert!(matches!(
            join_time::<u8>(&[], 0),
            Err(CoreError::IncompatibleGrids(_))
        ));
    }
}
