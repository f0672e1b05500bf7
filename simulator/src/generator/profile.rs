use crate::generator::template::SkyModel;
use chrono::{NaiveDateTime, TimeDelta, Timelike};
use ndarray::Array2;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use spectracore::grid::{Grid, GridHeader, Sample, TimeParams};
use spectracore::prelude::{CoreError, CoreResult};

/// Receiver characteristics of one simulated instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstrumentProfile {
    pub name: String,
    pub focus: u8,
    /// Frequency of the first row in MHz. Larger than `freq_end` for a
    /// descending axis.
    pub freq_start: f64,
    pub freq_end: f64,
    pub channels: usize,
    pub t_delt: f64,
    /// Length of one archived file in seconds.
    pub chunk_seconds: f64,
    /// Raw counts per unit of flux, before the 8-bit scale of 255.
    pub gain: f64,
    pub offset: f64,
    /// Half-width of uniform noise, in counts.
    pub noise: f64,
    pub seed: u64,
}

impl Default for InstrumentProfile {
    fn default() -> Self {
        Self {
            name: "BIR".into(),
            focus: 1,
            freq_start: 870.0,
            freq_end: 45.0,
            channels: 200,
            t_delt: 0.25,
            chunk_seconds: 900.0,
            gain: 0.8,
            offset: 10.0,
            noise: 1.0,
            seed: 0,
        }
    }
}

impl InstrumentProfile {
    pub fn freq_axis(&self) -> Vec<f64> {
        let channels = self.channels.max(1);
        if channels == 1 {
            return vec![self.freq_start];
        }
        let span = self.freq_end - self.freq_start;
        (0..channels)
            .map(|row| self.freq_start + span * row as f64 / (channels - 1) as f64)
            .collect()
    }

    pub fn columns_per_chunk(&self) -> usize {
        (self.chunk_seconds / self.t_delt).round().max(1.0) as usize
    }

    fn chunk_seed(&self, start: NaiveDateTime) -> u64 {
        self.seed ^ (start.and_utc().timestamp() as u64).rotate_left(17) ^ self.focus as u64
    }
}

/// Synthesizes the file `profile` would have recorded from `start` on.
pub fn build_chunk(
    profile: &InstrumentProfile,
    sky: &SkyModel,
    start: NaiveDateTime,
) -> CoreResult<Grid<u8>> {
    if !(profile.t_delt > 0.0 && profile.chunk_seconds > 0.0) {
        return Err(CoreError::Archive(format!(
            "{} has a non-positive time step or chunk length",
            profile.name
        )));
    }

    let freq_axis = profile.freq_axis();
    let columns = profile.columns_per_chunk();
    let t_init = start.num_seconds_from_midnight() as f64 + start.nanosecond() as f64 / 1e9;

    let mut rng = StdRng::seed_from_u64(profile.chunk_seed(start));
    let data = Array2::from_shape_fn((freq_axis.len(), columns), |(row, column)| {
        let seconds = t_init + column as f64 * profile.t_delt;
        let flux = sky.flux(freq_axis[row], seconds);
        let jitter = if profile.noise > 0.0 {
            rng.gen_range(-profile.noise..profile.noise)
        } else {
            0.0
        };
        u8::from_f64(profile.gain * 255.0 * flux + profile.offset + jitter)
    });

    let span = TimeDelta::milliseconds((columns as f64 * profile.t_delt * 1e3).round() as i64);
    let mut header = GridHeader::new(profile.name.clone(), "Radio flux density");
    header.meta.insert("focus".into(), format!("{:02}", profile.focus));
    Grid::new(
        data,
        freq_axis,
        TimeParams {
            t_init,
            t_delt: profile.t_delt,
            start,
            end: start + span,
        },
        header,
    )
}
