use crate::math::stats::StatsHelper;
use serde::{Deserialize, Serialize};

/// `target ≈ factor * source + constant`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AffineFit {
    pub factor: f64,
    pub constant: f64,
}

impl AffineFit {
    pub const IDENTITY: AffineFit = AffineFit {
        factor: 1.0,
        constant: 0.0,
    };

    /// Ordinary least squares over the common prefix of both slices.
    ///
    /// Returns `None` when `source` has no variance relative to its own
    /// magnitude, where the slope is undefined.
    pub fn least_squares(target: &[f64], source: &[f64]) -> Option<AffineFit> {
        let n = target.len().min(source.len());
        let (target, source) = (&target[..n], &source[..n]);

        let mean_source = StatsHelper::mean(source);
        let variance = StatsHelper::variance(source);
        let mean_square = StatsHelper::rms(source).powi(2);
        if !(variance > f64::EPSILON * mean_square) {
            return None;
        }

        let factor = StatsHelper::covariance(source, target) / variance;
        let constant = StatsHelper::mean(target) - factor * mean_source;
        Some(AffineFit { factor, constant })
    }

    /// Unit slope, constant equal to the difference of the means.
    pub fn offset_only(target: &[f64], source: &[f64]) -> AffineFit {
        let n = target.len().min(source.len());
        AffineFit {
            factor: 1.0,
            constant: StatsHelper::mean(&target[..n]) - StatsHelper::mean(&source[..n]),
        }
    }

    pub fn apply(&self, value: f64) -> f64 {
        self.factor * value + self.constant
    }

    /// Root mean square of `apply(source) - target`.
    pub fn residual_rms(&self, target: &[f64], source: &[f64]) -> f64 {
        let residuals: Vec<f64> = source
            .iter()
            .zip(target)
            .map(|(&s, &t)| self.apply(s) - t)
            .collect();
        StatsHelper::rms(&residuals)
    }
}
