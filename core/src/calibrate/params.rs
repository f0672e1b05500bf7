use crate::calibrate::fit::AffineFit;
use crate::prelude::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};

/// Per-pair affine calibration of one grid onto another.
///
/// All vectors are parallel to `pairs`: `factors[k] * second[pairs[k].1] +
/// constants[k] ≈ first[pairs[k].0]` over the overlapping columns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalibrationParams {
    pub pairs: Vec<(usize, usize)>,
    pub factors: Vec<f64>,
    pub constants: Vec<f64>,
    pub residual_rms: Vec<f64>,
    /// Indices into `pairs` whose source slice had zero variance and used the
    /// offset-only fallback.
    pub fallback_pairs: Vec<usize>,
}

/// One entry of [`CalibrationParams`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairCalibration {
    pub row_a: usize,
    pub row_b: usize,
    pub fit: AffineFit,
    pub residual_rms: f64,
}

impl CalibrationParams {
    pub fn push(&mut self, row_a: usize, row_b: usize, fit: AffineFit, residual_rms: f64) {
        self.pairs.push((row_a, row_b));
        self.factors.push(fit.factor);
        self.constants.push(fit.constant);
        self.residual_rms.push(residual_rms);
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<PairCalibration> {
        let (row_a, row_b) = *self.pairs.get(index)?;
        Some(PairCalibration {
            row_a,
            row_b,
            fit: AffineFit {
                factor: *self.factors.get(index)?,
                constant: *self.constants.get(index)?,
            },
            residual_rms: *self.residual_rms.get(index)?,
        })
    }

    /// Checks that every vector is parallel to `pairs`, which values built
    /// by hand or deserialized are not guaranteed to be.
    pub fn check(&self) -> CoreResult<()> {
        let n = self.pairs.len();
        let lengths = [self.factors.len(), self.constants.len(), self.residual_rms.len()];
        if lengths.iter().any(|&len| len != n) {
            return Err(CoreError::ShapeMismatch(format!(
                "{} pairs but {} factors, {} constants, {} residuals",
                n, lengths[0], lengths[1], lengths[2]
            )));
        }
        if let Some(&bad) = self.fallback_pairs.iter().find(|&&k| k >= n) {
            return Err(CoreError::ShapeMismatch(format!(
                "fallback index {} outside {} pairs",
                bad, n
            )));
        }
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = PairCalibration> + '_ {
        (0..self.len()).filter_map(move |index| self.get(index))
    }

    pub fn mean_factor(&self) -> Option<f64> {
        if self.factors.is_empty() {
            return None;
        }
        Some(self.factors.iter().sum::<f64>() / self.factors.len() as f64)
    }
}
