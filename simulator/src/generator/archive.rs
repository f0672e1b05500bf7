use crate::generator::profile::{build_chunk, InstrumentProfile};
use crate::generator::template::SkyModel;
use chrono::{NaiveDateTime, TimeDelta};
use spectracore::grid::axis::{day_start, seconds_between};
use spectracore::grid::Grid;
use spectracore::interface::{GridArchive, ResourceId};
use spectracore::prelude::{CoreError, CoreResult};
use std::collections::BTreeSet;

/// Archive whose files are synthesized on demand from instrument profiles.
#[derive(Debug, Clone)]
pub struct SyntheticArchive {
    profiles: Vec<InstrumentProfile>,
    sky: SkyModel,
}

impl SyntheticArchive {
    pub fn new(profiles: Vec<InstrumentProfile>, sky: SkyModel) -> Self {
        Self { profiles, sky }
    }

    fn profile(&self, id: &ResourceId) -> Option<&InstrumentProfile> {
        self.profiles
            .iter()
            .find(|p| p.name == id.instrument && p.focus == id.focus)
    }
}

impl GridArchive for SyntheticArchive {
    type Sample = u8;

    fn query(
        &self,
        start: NaiveDateTime,
        end: NaiveDateTime,
        instruments: &BTreeSet<String>,
    ) -> CoreResult<Vec<ResourceId>> {
        let day = day_start(start);
        let mut ids = Vec::new();

        for profile in self.profiles.iter().filter(|p| instruments.contains(&p.name)) {
            if !(profile.chunk_seconds > 0.0) {
                return Err(CoreError::Archive(format!(
                    "{} has a non-positive chunk length",
                    profile.name
                )));
            }
            let chunk_ms = (profile.chunk_seconds * 1e3).round() as i64;
            let first = (seconds_between(day, start) / profile.chunk_seconds).floor() as i64;

            let mut index = first;
            loop {
                let chunk_start = day + TimeDelta::milliseconds(index * chunk_ms);
                if chunk_start >= end {
                    break;
                }
                ids.push(ResourceId::new(profile.name.clone(), chunk_start, profile.focus));
                index += 1;
            }
        }
        Ok(ids)
    }

    fn fetch(&self, id: &ResourceId) -> CoreResult<Grid<u8>> {
        let profile = self
            .profile(id)
            .ok_or_else(|| CoreError::Archive(format!("no such file: {}", id)))?;
        build_chunk(profile, &self.sky, id.start)
    }
}
