use anyhow::Context;
use clap::Parser;
use report::model::{CalibrationReport, RunReport};
use spectracore::telemetry::MetricsRecorder;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::runtime::Builder as TokioBuilder;
use workflow::config::WorkflowConfig;
use workflow::runner::execute_many;

mod generator;
mod report;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Offline spectrogram calibration driver")]
struct Args {
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    /// Channels of the reference instrument when no config is given
    #[arg(long, default_value_t = 200)]
    channels: usize,
    /// Drop channel pairs further apart than this many MHz
    #[arg(long)]
    max_freq_diff: Option<f64>,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Independent runs with shifted noise seeds
    #[arg(long, default_value_t = 1)]
    runs: usize,
    #[arg(long, default_value = "tools/data/calibration_report.json")]
    report: PathBuf,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let workflow_config = if let Some(path) = &args.workflow {
        WorkflowConfig::load(path)?
    } else {
        WorkflowConfig::from_args(args.channels, args.max_freq_diff, args.seed)
    };

    let configs: Vec<WorkflowConfig> = (0..args.runs.max(1))
        .map(|run| workflow_config.with_seed_offset(run as u64))
        .collect();

    let metrics = Arc::new(MetricsRecorder::new());
    let runtime = TokioBuilder::new_multi_thread()
        .enable_all()
        .build()
        .context("creating calibration runtime")?;
    let results = runtime.block_on(execute_many(configs, metrics.clone()));

    let mut report = CalibrationReport::new(metrics.snapshot());
    for (run, result) in results.iter().enumerate() {
        match result {
            Ok(done) => {
                let entry = RunReport::from_result(run, done);
                println!("{}", entry.summary());
                report.runs.push(entry);
            }
            Err(err) => {
                eprintln!("run {} failed: {:#}", run, err);
                report.failures.push(format!("run {}: {:#}", run, err));
            }
        }
    }

    if let Some(parent) = args.report.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating report directory {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(&report).context("serializing calibration report")?;
    fs::write(&args.report, json)
        .with_context(|| format!("writing report {}", args.report.display()))?;
    println!(
        "{} runs, {} pairs, {} fallbacks, {} errors -> {}",
        report.jobs,
        report.pairs,
        report.fallbacks,
        report.errors,
        args.report.display()
    );

    if report.runs.is_empty() {
        anyhow::bail!("every calibration run failed");
    }
    Ok(())
}
