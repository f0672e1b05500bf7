use crate::grid::axis::{day_start, linear_axis, seconds_between, FreqOrder};
use crate::grid::sample::Sample;
use crate::grid::spectrum::Spectrum;
use crate::prelude::{CoreError, CoreResult};
use chrono::NaiveDateTime;
use ndarray::{Array1, Array2, ArrayView2};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Range;

/// Time sampling of a grid. The time axis itself is always derived from
/// these values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeParams {
    /// Seconds-of-day of the first column, relative to midnight of `start`.
    pub t_init: f64,
    /// Seconds per column.
    pub t_delt: f64,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Descriptive metadata. Nothing here takes part in alignment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GridHeader {
    pub instrument: String,
    pub content: String,
    #[serde(default)]
    pub meta: BTreeMap<String, String>,
}

impl GridHeader {
    pub fn new(instrument: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            instrument: instrument.into(),
            content: content.into(),
            meta: BTreeMap::new(),
        }
    }
}

/// A frequency-by-time intensity array with its frequency axis and linear
/// time axis.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T: Sample = u8> {
    data: Array2<T>,
    freq_axis: Vec<f64>,
    freq_order: FreqOrder,
    timing: TimeParams,
    header: GridHeader,
}

impl<T: Sample> Grid<T> {
    /// Builds a grid, checking every invariant before the value exists.
    pub fn new(
        data: Array2<T>,
        freq_axis: Vec<f64>,
        timing: TimeParams,
        header: GridHeader,
    ) -> CoreResult<Self> {
        if data.nrows() != freq_axis.len() {
            return Err(CoreError::ShapeMismatch(format!(
                "{} data rows but {} frequency channels",
                data.nrows(),
                freq_axis.len()
            )));
        }
        let freq_order = FreqOrder::detect(&freq_axis)?;

        if !timing.t_init.is_finite() {
            return Err(CoreError::InvalidTiming("t_init is not finite".into()));
        }
        if !(timing.t_delt.is_finite() && timing.t_delt > 0.0) {
            return Err(CoreError::InvalidTiming(format!(
                "t_delt must be positive, got {}",
                timing.t_delt
            )));
        }
        if timing.end < timing.start {
            return Err(CoreError::InvalidTiming(format!(
                "end {} precedes start {}",
                timing.end, timing.start
            )));
        }

        Ok(Self {
            data,
            freq_axis,
            freq_order,
            timing,
            header,
        })
    }

    pub fn data(&self) -> ArrayView2<'_, T> {
        self.data.view()
    }

    pub fn freq_axis(&self) -> &[f64] {
        &self.freq_axis
    }

    pub fn freq_order(&self) -> FreqOrder {
        self.freq_order
    }

    /// `(rows, columns)`.
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    pub fn dtype(&self) -> &'static str {
        T::DTYPE
    }

    pub fn timing(&self) -> TimeParams {
        self.timing
    }

    pub fn t_init(&self) -> f64 {
        self.timing.t_init
    }

    pub fn t_delt(&self) -> f64 {
        self.timing.t_delt
    }

    pub fn start(&self) -> NaiveDateTime {
        self.timing.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.timing.end
    }

    pub fn header(&self) -> &GridHeader {
        &self.header
    }

    pub fn instrument(&self) -> &str {
        &self.header.instrument
    }

    /// `t_init + i * t_delt` for every column.
    pub fn time_axis(&self) -> Array1<f64> {
        linear_axis(self.timing.t_init, self.timing.t_delt, self.data.ncols())
    }

    /// `i * t_delt` for every column, i.e. seconds since the first column.
    pub fn relative_time_axis(&self) -> Array1<f64> {
        linear_axis(0.0, self.timing.t_delt, self.data.ncols())
    }

    pub fn seconds_of_day(&self, column: usize) -> f64 {
        self.timing.t_init + column as f64 * self.timing.t_delt
    }

    /// Fractional column at which `timestamp` falls; may lie outside the grid.
    pub fn column_position(&self, timestamp: NaiveDateTime) -> f64 {
        let seconds = seconds_between(day_start(self.timing.start), timestamp);
        (seconds - self.timing.t_init) / self.timing.t_delt
    }

    /// Nearest column to `timestamp`, if it lies inside the grid.
    pub fn column_at(&self, timestamp: NaiveDateTime) -> Option<usize> {
        let position = self.column_position(timestamp).round();
        if position >= 0.0 && position < self.data.ncols() as f64 {
            Some(position as usize)
        } else {
            None
        }
    }

    /// Floating-point copy of one row restricted to `columns`.
    pub fn row_f64(&self, row: usize, columns: Range<usize>) -> Vec<f64> {
        self.data
            .row(row)
            .iter()
            .skip(columns.start)
            .take(columns.len())
            .map(|v| v.to_f64())
            .collect()
    }

    pub fn to_f64(&self) -> Grid<f64> {
        Grid {
            data: self.data.mapv(|v| v.to_f64()),
            freq_axis: self.freq_axis.clone(),
            freq_order: self.freq_order,
            timing: self.timing,
            header: self.header.clone(),
        }
    }

    /// New grid holding only the channels with `low <= freq <= high`.
    pub fn clip_freq(&self, low: f64, high: f64) -> CoreResult<Grid<T>> {
        let rows: Vec<usize> = self
            .freq_axis
            .iter()
            .enumerate()
            .filter(|(_, f)| **f >= low && **f <= high)
            .map(|(row, _)| row)
            .collect();
        let data = Array2::from_shape_fn((rows.len(), self.data.ncols()), |(r, c)| {
            self.data[[rows[r], c]]
        });
        let freq_axis = rows.iter().map(|&row| self.freq_axis[row]).collect();
        Grid::new(data, freq_axis, self.timing, self.header.clone())
    }

    /// Intensity over frequency at one column.
    pub fn spectrum_at(&self, column: usize) -> CoreResult<Spectrum> {
        if column >= self.data.ncols() {
            return Err(CoreError::ShapeMismatch(format!(
                "column {} outside grid of {} columns",
                column,
                self.data.ncols()
            )));
        }
        let values = self.data.column(column).mapv(|v| v.to_f64());
        Spectrum::new(values, self.freq_axis.clone())
    }
}
