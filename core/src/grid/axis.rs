use crate::prelude::{CoreError, CoreResult};
use chrono::{NaiveDateTime, TimeDelta};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Direction of a frequency axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FreqOrder {
    Ascending,
    Descending,
}

impl FreqOrder {
    /// Detects the direction of `axis`, rejecting non-finite values and axes
    /// that change direction. Repeated values are allowed.
    pub fn detect(axis: &[f64]) -> CoreResult<Self> {
        if let Some(bad) = axis.iter().position(|v| !v.is_finite()) {
            return Err(CoreError::NonMonotonicAxis(format!(
                "non-finite frequency at row {}",
                bad
            )));
        }

        let order = match (axis.first(), axis.last()) {
            (Some(first), Some(last)) if last < first => FreqOrder::Descending,
            _ => FreqOrder::Ascending,
        };

        let broken = axis.windows(2).position(|w| match order {
            FreqOrder::Ascending => w[1] < w[0],
            FreqOrder::Descending => w[1] > w[0],
        });
        match broken {
            Some(row) => Err(CoreError::NonMonotonicAxis(format!(
                "direction changes between rows {} and {}",
                row,
                row + 1
            ))),
            None => Ok(order),
        }
    }

    /// Copy of `axis` in ascending order.
    pub fn ascending(self, axis: &[f64]) -> Vec<f64> {
        match self {
            FreqOrder::Ascending => axis.to_vec(),
            FreqOrder::Descending => axis.iter().rev().copied().collect(),
        }
    }

    /// Maps an index of the ascending copy back onto the original axis.
    pub fn original_index(self, ascending_index: usize, len: usize) -> usize {
        match self {
            FreqOrder::Ascending => ascending_index,
            FreqOrder::Descending => len - 1 - ascending_index,
        }
    }
}

/// `t_init + i * t_delt` for `i` in `0..len`, computed per element so the
/// progression never accumulates rounding drift.
pub fn linear_axis(t_init: f64, t_delt: f64, len: usize) -> Array1<f64> {
    Array1::from_shape_fn(len, |i| t_init + i as f64 * t_delt)
}

/// Midnight of the day containing `timestamp`.
pub fn day_start(timestamp: NaiveDateTime) -> NaiveDateTime {
    timestamp.date().and_hms_opt(0, 0, 0).unwrap_or(timestamp)
}

/// Signed seconds from `from` to `to`, microsecond resolution.
pub fn seconds_between(from: NaiveDateTime, to: NaiveDateTime) -> f64 {
    delta_seconds(to - from)
}

fn delta_seconds(delta: TimeDelta) -> f64 {
    match delta.num_microseconds() {
        Some(us) => us as f64 / 1e6,
        None => delta.num_milliseconds() as f64 / 1e3,
    }
}
