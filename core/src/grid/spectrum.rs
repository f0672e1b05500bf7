use crate::prelude::{CoreError, CoreResult};
use ndarray::Array1;

/// Intensity over frequency at a single instant.
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    data: Array1<f64>,
    freq_axis: Vec<f64>,
}

impl Spectrum {
    pub fn new(data: Array1<f64>, freq_axis: Vec<f64>) -> CoreResult<Self> {
        if data.len() != freq_axis.len() {
            return Err(CoreError::ShapeMismatch(format!(
                "spectrum has {} values but {} frequencies",
                data.len(),
                freq_axis.len()
            )));
        }
        Ok(Self { data, freq_axis })
    }

    pub fn data(&self) -> &Array1<f64> {
        &self.data
    }

    pub fn freq_axis(&self) -> &[f64] {
        &self.freq_axis
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// `(frequency, value)` points in axis order.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.freq_axis.iter().copied().zip(self.data.iter().copied())
    }
}
