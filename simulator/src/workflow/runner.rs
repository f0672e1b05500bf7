use crate::generator::SyntheticArchive;
use crate::workflow::config::WorkflowConfig;
use anyhow::Context;
use log::info;
use spectracore::align::TimeWindow;
use spectracore::calibrate::{CalibrationParams, Calibrator};
use spectracore::combine::join_time;
use spectracore::grid::Grid;
use spectracore::interface::{GridArchive, ResourceId};
use spectracore::telemetry::MetricsRecorder;
use std::collections::BTreeSet;
use std::sync::Arc;

pub struct WorkflowResult {
    pub reference: String,
    pub target: String,
    pub window: TimeWindow,
    pub reference_shape: (usize, usize),
    pub target_shape: (usize, usize),
    pub files: Vec<String>,
    pub params: CalibrationParams,
    pub expected_factor: Option<f64>,
}

impl WorkflowResult {
    pub fn mean_factor(&self) -> Option<f64> {
        self.params.mean_factor()
    }
}

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    pub fn execute(&self) -> anyhow::Result<WorkflowResult> {
        let config = &self.config;
        config.validate()?;

        let archive = SyntheticArchive::new(config.instruments.clone(), config.sky.clone());
        let wanted: BTreeSet<String> = [config.reference.clone(), config.target.clone()]
            .into_iter()
            .collect();
        let ids = archive
            .query(config.start, config.end, &wanted)
            .context("listing archive files")?;
        info!("{} files between {} and {}", ids.len(), config.start, config.end);

        let reference = assemble(&archive, &ids, &config.reference)
            .with_context(|| format!("assembling {}", config.reference))?;
        let target = assemble(&archive, &ids, &config.target)
            .with_context(|| format!("assembling {}", config.target))?;

        let calibrator = Calibrator::new(config.calibration.clone());
        let homogenized = calibrator
            .homogenize(&reference, &target)
            .with_context(|| format!("calibrating {} onto {}", config.target, config.reference))?;

        Ok(WorkflowResult {
            reference: config.reference.clone(),
            target: config.target.clone(),
            window: homogenized.window,
            reference_shape: reference.shape(),
            target_shape: target.shape(),
            files: ids.iter().map(ResourceId::to_string).collect(),
            params: homogenized.params,
            expected_factor: config.expected_factor(),
        })
    }
}

/// Fetches every listed file of `instrument` and joins them along time.
fn assemble(
    archive: &SyntheticArchive,
    ids: &[ResourceId],
    instrument: &str,
) -> anyhow::Result<Grid<u8>> {
    let chunks = ids
        .iter()
        .filter(|id| id.instrument == instrument)
        .map(|id| archive.fetch(id).with_context(|| format!("fetching {}", id)))
        .collect::<anyhow::Result<Vec<_>>>()?;
    if chunks.is_empty() {
        anyhow::bail!("archive lists no files for {}", instrument);
    }
    Ok(join_time(&chunks, 0)?)
}

/// Runs independent workflows in parallel, one blocking task each.
pub async fn execute_many(
    configs: Vec<WorkflowConfig>,
    metrics: Arc<MetricsRecorder>,
) -> Vec<anyhow::Result<WorkflowResult>> {
    let handles: Vec<_> = configs
        .into_iter()
        .map(|config| {
            let metrics = metrics.clone();
            tokio::task::spawn_blocking(move || {
                let result = Runner::new(config).execute();
                match &result {
                    Ok(done) => {
                        metrics.record_job(done.params.len(), done.params.fallback_pairs.len())
                    }
                    Err(_) => metrics.record_error(),
                }
                result
            })
        })
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        results.push(
            handle
                .await
                .unwrap_or_else(|err| Err(anyhow::anyhow!("calibration task failed: {}", err))),
        );
    }
    results
}
