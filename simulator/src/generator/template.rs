use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Flux of the simulated sky, shared by every instrument. Values stay
/// roughly within `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkyModel {
    /// Slow intensity variation with period in seconds.
    pub ripple_period: f64,
    pub ripple_depth: f64,
    /// Seconds-of-day at which a drifting burst crosses `burst_top` MHz.
    pub burst_start: f64,
    pub burst_top: f64,
    /// Drift rate of the burst towards lower frequencies, MHz per second.
    pub burst_drift: f64,
    /// Gaussian half-width of the burst in seconds.
    pub burst_width: f64,
    pub burst_peak: f64,
}

impl Default for SkyModel {
    fn default() -> Self {
        Self {
            ripple_period: 240.0,
            ripple_depth: 0.15,
            burst_start: 5.0 * 3600.0 + 600.0,
            burst_top: 870.0,
            burst_drift: 20.0,
            burst_width: 12.0,
            burst_peak: 0.4,
        }
    }
}

impl SkyModel {
    pub fn flux(&self, freq_mhz: f64, seconds_of_day: f64) -> f64 {
        let background = 0.25 + 0.1 * (freq_mhz / 1000.0).min(1.0);
        let ripple = self.ripple_depth * (2.0 * PI * seconds_of_day / self.ripple_period).sin();
        let crossing = self.burst_start + (self.burst_top - freq_mhz) / self.burst_drift;
        let burst =
            self.burst_peak * (-((seconds_of_day - crossing) / self.burst_width).powi(2)).exp();
        background + ripple + burst
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_drifts_to_lower_frequencies() {
        let sky = SkyModel::default();
        let at_top = sky.flux(870.0, sky.burst_start);
        let lower_later = sky.flux(470.0, sky.burst_start + 20.0);
        let lower_early = sky.flux(470.0, sky.burst_start);
        assert!(at_top > 0.5);
        assert!(lower_later > lower_early);
    }

    #[test]
    fn flux_stays_in_unit_range() {
        let sky = SkyModel::default();
        for step in 0..2000 {
            let value = sky.flux(45.0 + step as f64 * 0.4, 18000.0 + step as f64);
            assert!((0.0..=1.0).contains(&value), "flux {} out of range", value);
        }
    }
}
