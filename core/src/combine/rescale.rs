use crate::calibrate::params::CalibrationParams;
use crate::grid::{Grid, GridHeader, Sample};
use crate::prelude::{CoreError, CoreResult};
use ndarray::Array2;

/// Applies `factor * x + constant` to every matched row of `second`.
///
/// The result holds one row per calibrated pair, in pair order, with the
/// second grid's frequencies and time sampling.
pub fn rescale<T: Sample>(second: &Grid<T>, params: &CalibrationParams) -> CoreResult<Grid<f64>> {
    params.check()?;
    let (rows, columns) = second.shape();
    if let Some(&(_, row_b)) = params.pairs.iter().find(|(_, row_b)| *row_b >= rows) {
        return Err(CoreError::ShapeMismatch(format!(
            "calibration refers to row {} but {} has {} rows",
            row_b,
            second.instrument(),
            rows
        )));
    }

    let source = second.data();
    let data = Array2::from_shape_fn((params.len(), columns), |(k, c)| {
        let row_b = params.pairs[k].1;
        params.factors[k] * source[[row_b, c]].to_f64() + params.constants[k]
    });
    let freq_axis = params
        .pairs
        .iter()
        .map(|&(_, row_b)| second.freq_axis()[row_b])
        .collect();

    let mut header: GridHeader = second.header().clone();
    header
        .meta
        .insert("calibrated_pairs".into(), params.len().to_string());
    Grid::new(data, freq_axis, second.timing(), header)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibrate::fit::AffineFit;
    use crate::grid::TimeParams;
    use chrono::NaiveDate;

    fn grid() -> Grid<u8> {
        let start = NaiveDate::from_ymd_opt(2011, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        Grid::new(
            Array2::from_shape_fn((3, 4), |(r, c)| (r * 10 + c) as u8),
            vec![30.0, 20.0, 10.0],
            TimeParams {
                t_init: 0.0,
                t_delt: 1.0,
                start,
                end: start,
            },
            GridHeader::new("B", "test"),
        )
        .unwrap()
    }

    #[test]
    fn rescale_maps_selected_rows() {
        let mut params = CalibrationParams::default();
        params.push(5, 0, AffineFit { factor: 2.0, constant: 1.0 }, 0.0);
        params.push(6, 2, AffineFit { factor: 0.5, constant: 0.0 }, 0.0);

        let rescaled = rescale(&grid(), &params).unwrap();
        assert_eq!(rescaled.shape(), (2, 4));
        assert_eq!(rescaled.freq_axis(), &[30.0, 10.0]);
        assert_eq!(rescaled.data()[[0, 3]], 7.0);
        assert_eq!(rescaled.data()[[1, 2]], 11.0);
        assert_eq!(rescaled.header().meta["calibrated_pairs"], "2");
    }

    #[test]
    fn rescale_rejects_foreign_rows() {
        let mut params = CalibrationParams::default();
        params.push(0, 7, AffineFit::IDENTITY, 0.0);
        assert!(matches!(
            rescale(&grid(), &params),
            Err(CoreError::ShapeMismatch(_))
        ));
    }

    #[test]
    fn rescale_rejects_ragged_params() {
        let params: CalibrationParams = serde_json::from_str(
            r#"{"pairs":[[0,0],[1,1]],"factors":[2.0],"constants":[0.0,0.0],
                "residual_rms":[0.0,0.0],"fallback_pairs":[]}"#,
        )
        .unwrap();
        assert!(matches!(
            rescale(&grid(), &params),
            Err(CoreError::ShapeMismatch(_))
        ));
    }
}
