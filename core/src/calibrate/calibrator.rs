use crate::align::overlap::{locate_overlap, Overlap, TimeWindow};
use crate::calibrate::fit::AffineFit;
use crate::calibrate::params::CalibrationParams;
use crate::combine::rescale;
use crate::grid::axis::{day_start, seconds_between};
use crate::grid::{Grid, Sample};
use crate::math::smoothing::gaussian_filter1d;
use crate::prelude::{CalibrationConfig, CoreError, CoreResult, ZeroVariancePolicy};
use crate::telemetry::log::LogManager;

/// Result of [`Calibrator::homogenize`].
#[derive(Debug, Clone)]
pub struct Homogenized {
    pub window: TimeWindow,
    pub params: CalibrationParams,
    /// Matched rows of the second grid mapped onto the first grid's scale.
    pub rescaled: Grid<f64>,
}

/// Fits affine transforms that bring a second grid onto the intensity scale
/// of a first one.
pub struct Calibrator {
    config: CalibrationConfig,
    logger: LogManager,
}

impl Calibrator {
    pub fn new(config: CalibrationConfig) -> Self {
        Self {
            config,
            logger: LogManager::new("calibrator"),
        }
    }

    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    /// Overlap of both grids using the configured frequency tolerance.
    pub fn locate<A: Sample, B: Sample>(
        &self,
        first: &Grid<A>,
        second: &Grid<B>,
    ) -> CoreResult<Overlap> {
        locate_overlap(first, second, self.config.max_freq_diff)
    }

    /// Fits every matched pair of `overlap`. Either all pairs are fitted or
    /// the call fails.
    pub fn fit<A: Sample, B: Sample>(
        &self,
        first: &Grid<A>,
        second: &Grid<B>,
        overlap: &Overlap,
    ) -> CoreResult<CalibrationParams> {
        let columns = matching_columns(first, second, overlap);
        let second_data = second.data();
        let mut params = CalibrationParams::default();

        for pair in &overlap.pairs {
            let (row_a, row_b) = (pair.i, pair.j);
            let mut target = first.row_f64(row_a, overlap.columns_a.clone());
            let source_row = second_data.row(row_b);
            let mut source: Vec<f64> = columns.iter().map(|&c| source_row[c].to_f64()).collect();

            if let Some(sigma) = self.config.smoothing_sigma {
                target = gaussian_filter1d(&target, sigma);
                source = gaussian_filter1d(&source, sigma);
            }

            let fit = match AffineFit::least_squares(&target, &source) {
                Some(fit) => fit,
                None => match self.config.zero_variance {
                    ZeroVariancePolicy::OffsetOnly => {
                        self.logger.caution(&format!(
                            "row {} of {} is flat over the overlap; fitting offset only",
                            row_b,
                            second.instrument()
                        ));
                        params.fallback_pairs.push(params.len());
                        AffineFit::offset_only(&target, &source)
                    }
                    ZeroVariancePolicy::Reject => {
                        return Err(CoreError::DegenerateFit { row_a, row_b });
                    }
                },
            };

            let residual = fit.residual_rms(&target, &source);
            self.logger.detail(&format!(
                "rows ({}, {}) factor {:.6} constant {:.6} rms {:.4}",
                row_a, row_b, fit.factor, fit.constant, residual
            ));
            params.push(row_a, row_b, fit, residual);
        }

        self.logger.record(&format!(
            "{} -> {}: {} pairs over {} columns, {} fallbacks",
            second.instrument(),
            first.instrument(),
            params.len(),
            columns.len(),
            params.fallback_pairs.len()
        ));
        Ok(params)
    }

    /// Locates the overlap and fits it in one step.
    pub fn homogenize_params<A: Sample, B: Sample>(
        &self,
        first: &Grid<A>,
        second: &Grid<B>,
    ) -> CoreResult<CalibrationParams> {
        let overlap = self.locate(first, second)?;
        self.fit(first, second, &overlap)
    }

    /// Fits `second` onto `first` and returns its matched rows rescaled.
    pub fn homogenize<A: Sample, B: Sample>(
        &self,
        first: &Grid<A>,
        second: &Grid<B>,
    ) -> CoreResult<Homogenized> {
        let overlap = self.locate(first, second)?;
        let params = self.fit(first, second, &overlap)?;
        let rescaled = rescale(second, &params)?;
        Ok(Homogenized {
            window: overlap.window,
            params,
            rescaled,
        })
    }
}

impl Default for Calibrator {
    fn default() -> Self {
        Self::new(CalibrationConfig::default())
    }
}

/// For every overlapping column of `first`, the column of `second` nearest in
/// absolute time, clamped into the second grid's overlap range.
fn matching_columns<A: Sample, B: Sample>(
    first: &Grid<A>,
    second: &Grid<B>,
    overlap: &Overlap,
) -> Vec<usize> {
    let day_offset = seconds_between(day_start(second.start()), day_start(first.start()));
    let low = overlap.columns_b.start;
    let high = overlap.columns_b.end.saturating_sub(1).max(low);

    overlap
        .columns_a
        .clone()
        .map(|column| {
            let seconds = first.seconds_of_day(column) + day_offset;
            let position = ((seconds - second.t_init()) / second.t_delt()).round();
            (position.max(0.0) as usize).clamp(low, high)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{GridHeader, TimeParams};
    use chrono::{NaiveDate, NaiveDateTime};
    use ndarray::{Array1, Array2};
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2011, 1, 1)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn hour_grid(data: Array2<f64>, freqs: Vec<f64>, t_delt: f64) -> Grid<f64> {
        Grid::new(
            data,
            freqs,
            TimeParams {
                t_init: 0.0,
                t_delt,
                start: at(0),
                end: at(1),
            },
            GridHeader::new("Test", "Time / Frequency"),
        )
        .unwrap()
    }

    fn random_row(seed: u64) -> Array1<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        Array1::from_shape_fn(3600, |_| rng.gen_range(0..255) as f64)
    }

    fn single(row: &Array1<f64>) -> Array2<f64> {
        row.clone().insert_axis(ndarray::Axis(0))
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < 1e-2,
            "expected {}, got {}",
            expected,
            actual
        );
    }

    fn assert_restores(params: &CalibrationParams, source: &Array1<f64>, target: &Array1<f64>) {
        let fit = params.get(0).unwrap().fit;
        for (s, t) in source.iter().zip(target) {
            assert_close(fit.apply(*s), *t);
        }
    }

    #[test]
    fn scale_only_relation_gives_half_factor() {
        let a = random_row(1);
        let b = a.mapv(|v| 2.0 * v);
        let first = hour_grid(single(&a), vec![1.0], 1.0);
        let second = hour_grid(single(&b), vec![1.0], 1.0);

        let params = Calibrator::new(CalibrationConfig {
            max_freq_diff: Some(0.0),
            ..Default::default()
        })
        .homogenize_params(&first, &second)
        .unwrap();

        assert_eq!(params.pairs, vec![(0, 0)]);
        assert_close(params.factors[0], 0.5);
        assert_close(params.constants[0], 0.0);
        assert_restores(&params, &b, &a);
        assert!(params.fallback_pairs.is_empty());
    }

    #[test]
    fn offset_only_relation_gives_negative_constant() {
        let a = random_row(2);
        let b = a.mapv(|v| v + 10.0);
        let first = hour_grid(single(&a), vec![1.0], 1.0);
        let second = hour_grid(single(&b), vec![1.0], 1.0);

        let params = Calibrator::default().homogenize_params(&first, &second).unwrap();
        assert_eq!(params.pairs, vec![(0, 0)]);
        assert_close(params.factors[0], 1.0);
        assert_close(params.constants[0], -10.0);
        assert_restores(&params, &b, &a);
    }

    #[test]
    fn combined_relation_gives_scale_and_offset() {
        let a = random_row(3);
        let b = a.mapv(|v| 2.0 * v + 1.0);
        let first = hour_grid(single(&a), vec![1.0], 1.0);
        let second = hour_grid(single(&b), vec![1.0], 1.0);

        let params = Calibrator::default().homogenize_params(&first, &second).unwrap();
        assert_close(params.factors[0], 0.5);
        assert_close(params.constants[0], -0.5);
        assert_restores(&params, &b, &a);
        assert!(params.residual_rms[0] < 1e-9);
    }

    #[test]
    fn matching_channel_is_picked_from_wider_grid() {
        let a = random_row(4);
        let b = a.mapv(|v| 2.0 * v + 1.0);
        let ramp = Array1::from_shape_fn(3600, |c| c as f64);
        let stacked =
            ndarray::stack(ndarray::Axis(0), &[ramp.view(), b.view(), ramp.view()]).unwrap();

        let first = hour_grid(single(&a), vec![1.0], 1.0);
        let second = hour_grid(stacked, vec![0.0, 1.0, 2.0], 1.0);

        let params = Calibrator::new(CalibrationConfig {
            max_freq_diff: Some(0.0),
            ..Default::default()
        })
        .homogenize_params(&first, &second)
        .unwrap();
        assert_eq!(params.pairs, vec![(0, 1)]);
        assert_close(params.factors[0], 0.5);
        assert_close(params.constants[0], -0.5);
        assert_restores(&params, &b, &a);
    }

    #[test]
    fn flat_source_falls_back_to_offset() {
        let a = random_row(5);
        let b = Array1::from_elem(3600, 42.0);
        let first = hour_grid(single(&a), vec![1.0], 1.0);
        let second = hour_grid(single(&b), vec![1.0], 1.0);

        let params = Calibrator::default().homogenize_params(&first, &second).unwrap();
        assert_eq!(params.factors, vec![1.0]);
        assert_close(params.constants[0], a.mean().unwrap() - 42.0);
        assert_eq!(params.fallback_pairs, vec![0]);
    }

    #[test]
    fn small_unit_grids_are_fitted_not_flattened() {
        let a = Array1::from_shape_fn(3600, |c| ((c * 37) % 11) as f64 * 1e-9);
        let b = a.mapv(|v| 2.0 * v);
        let first = hour_grid(single(&a), vec![1.0], 1.0);
        let second = hour_grid(single(&b), vec![1.0], 1.0);

        let params = Calibrator::default().homogenize_params(&first, &second).unwrap();
        assert!(params.fallback_pairs.is_empty());
        assert!((params.factors[0] - 0.5).abs() < 1e-9);
        assert!(params.constants[0].abs() < 1e-18);
    }

    #[test]
    fn flat_source_is_rejected_when_configured() {
        let a = random_row(6);
        let b = Array1::from_elem(3600, 42.0);
        let first = hour_grid(single(&a), vec![1.0], 1.0);
        let second = hour_grid(single(&b), vec![1.0], 1.0);

        let calibrator = Calibrator::new(CalibrationConfig {
            zero_variance: ZeroVariancePolicy::Reject,
            ..Default::default()
        });
        assert_eq!(
            calibrator.homogenize_params(&first, &second),
            Err(CoreError::DegenerateFit { row_a: 0, row_b: 0 })
        );
    }

    #[test]
    fn smoothing_keeps_affine_relation() {
        let a = random_row(7);
        let b = a.mapv(|v| 3.0 * v - 4.0);
        let first = hour_grid(single(&a), vec![1.0], 1.0);
        let second = hour_grid(single(&b), vec![1.0], 1.0);

        let params = Calibrator::new(CalibrationConfig {
            smoothing_sigma: Some(15.0),
            ..Default::default()
        })
        .homogenize_params(&first, &second)
        .unwrap();
        assert_close(params.factors[0], 1.0 / 3.0);
        assert_close(params.constants[0], 4.0 / 3.0);
    }

    #[test]
    fn finer_time_sampling_is_matched_by_time() {
        let sky = |t: f64| 100.0 + 50.0 * (t / 37.0).sin();
        let a = Array1::from_shape_fn(3600, |c| sky(c as f64));
        let b = Array1::from_shape_fn(7200, |c| 2.0 * sky(c as f64 * 0.5) + 1.0);
        let first = hour_grid(single(&a), vec![1.0], 1.0);
        let second = hour_grid(single(&b), vec![1.0], 0.5);

        let overlap = Calibrator::default().locate(&first, &second).unwrap();
        let columns = matching_columns(&first, &second, &overlap);
        assert_eq!(columns[10], 20);
        assert_eq!(columns.len(), 3600);

        let params = Calibrator::default().fit(&first, &second, &overlap).unwrap();
        assert_close(params.factors[0], 0.5);
        assert_close(params.constants[0], -0.5);
    }

    #[test]
    fn homogenize_rescales_matched_rows() {
        let a = random_row(8);
        let b = a.mapv(|v| 2.0 * v + 1.0);
        let first = hour_grid(single(&a), vec![1.0], 1.0);
        let second = hour_grid(single(&b), vec![1.0], 1.0);

        let result = Calibrator::default().homogenize(&first, &second).unwrap();
        assert_eq!(result.window.start, at(0));
        assert_eq!(result.rescaled.shape(), (1, 3600));
        for (rescaled, original) in result.rescaled.data().row(0).iter().zip(a.iter()) {
            assert_close(*rescaled, *original);
        }
    }

    #[test]
    fn inputs_are_left_untouched() {
        let a = random_row(9);
        let b = a.mapv(|v| 2.0 * v);
        let first = hour_grid(single(&a), vec![1.0], 1.0);
        let second = hour_grid(single(&b), vec![1.0], 1.0);
        let before = second.clone();

        Calibrator::default().homogenize(&first, &second).unwrap();
        assert_eq!(second, before);
    }
}
