use crate::generator::{InstrumentProfile, SkyModel};
use anyhow::{bail, Context};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use spectracore::prelude::CalibrationConfig;
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkflowConfig {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// Instrument whose intensity scale is kept.
    pub reference: String,
    /// Instrument rescaled onto the reference.
    pub target: String,
    pub instruments: Vec<InstrumentProfile>,
    #[serde(default)]
    pub sky: SkyModel,
    #[serde(default)]
    pub calibration: CalibrationConfig,
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Two overlapping instruments observing the same half hour.
    pub fn from_args(channels: usize, max_freq_diff: Option<f64>, seed: u64) -> Self {
        let day = NaiveDate::from_ymd_opt(2011, 9, 22).unwrap_or_default();
        let reference = InstrumentProfile {
            channels,
            seed,
            ..Default::default()
        };
        let target = InstrumentProfile {
            name: "GLASGOW".into(),
            freq_start: 20.0,
            freq_end: 450.0,
            channels: (channels / 2).max(2),
            t_delt: 0.5,
            gain: 0.5,
            offset: 25.0,
            seed: seed.wrapping_add(1),
            ..Default::default()
        };

        Self {
            start: day.and_hms_opt(5, 0, 0).unwrap_or_default(),
            end: day.and_hms_opt(5, 30, 0).unwrap_or_default(),
            reference: reference.name.clone(),
            target: target.name.clone(),
            instruments: vec![reference, target],
            sky: SkyModel::default(),
            calibration: CalibrationConfig {
                max_freq_diff,
                ..Default::default()
            },
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.end <= self.start {
            bail!("workflow end {} is not after start {}", self.end, self.start);
        }
        for name in [&self.reference, &self.target] {
            if self.profile(name).is_none() {
                bail!("instrument {} has no profile", name);
            }
        }
        Ok(())
    }

    pub fn profile(&self, name: &str) -> Option<&InstrumentProfile> {
        self.instruments.iter().find(|p| p.name == name)
    }

    /// Same setup with every instrument seed shifted by `offset`.
    pub fn with_seed_offset(&self, offset: u64) -> Self {
        let mut config = self.clone();
        for profile in &mut config.instruments {
            profile.seed = profile.seed.wrapping_add(offset);
        }
        config
    }

    /// Relative gain the calibration should recover for the target.
    pub fn expected_factor(&self) -> Option<f64> {
        let reference = self.profile(&self.reference)?;
        let target = self.profile(&self.target)?;
        Some(reference.gain / target.gain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn config_from_args_builds_two_instruments() {
        let cfg = WorkflowConfig::from_args(40, Some(2.5), 7);
        assert_eq!(cfg.instruments.len(), 2);
        assert_eq!(cfg.profile("BIR").map(|p| p.channels), Some(40));
        assert_eq!(cfg.profile("GLASGOW").map(|p| p.channels), Some(20));
        assert_eq!(cfg.calibration.max_freq_diff, Some(2.5));
        assert!(cfg.validate().is_ok());
        assert!((cfg.expected_factor().unwrap() - 1.6).abs() < 1e-12);
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        let yaml = "start: 2011-09-22T05:00:00
end: 2011-09-22T05:15:00
reference: BIR
target: MRT
instruments:
  - name: BIR
    channels: 10
  - name: MRT
    freq_start: 100.0
    freq_end: 300.0
    gain: 0.4
calibration:
  max_freq_diff: 3.0
  zero_variance: reject
";
        temp.write_all(yaml.as_bytes()).unwrap();
        let path = temp.into_temp_path();
        let cfg = WorkflowConfig::load(&path).unwrap();
        assert_eq!(cfg.reference, "BIR");
        assert_eq!(cfg.profile("BIR").map(|p| p.channels), Some(10));
        assert_eq!(cfg.profile("MRT").map(|p| p.t_delt), Some(0.25));
        assert_eq!(cfg.calibration.max_freq_diff, Some(3.0));
        assert_eq!(cfg.sky, SkyModel::default());
    }

    #[test]
    fn config_without_target_profile_is_rejected() {
        let mut cfg = WorkflowConfig::from_args(10, None, 0);
        cfg.target = "MRT".into();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn seed_offset_shifts_every_instrument() {
        let cfg = WorkflowConfig::from_args(10, None, 5).with_seed_offset(3);
        let seeds: Vec<u64> = cfg.instruments.iter().map(|p| p.seed).collect();
        assert_eq!(seeds, vec![8, 9]);
    }
}
