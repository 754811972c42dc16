use crate::core::metrics::{DerivedMetrics, derive_all};
use crate::core::models::job::PredictionJob;
use crate::engine::config::RunnerConfig;
use crate::engine::error::EngineError;
use crate::engine::progress::ProgressReporter;
use crate::engine::runner::{PredictionRunner, RunResult, collect_outputs};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

pub const METRICS_FILE_NAME: &str = "metrics.json";

#[derive(Debug, Clone)]
pub struct PredictionReport {
    pub result: RunResult,
    /// Derived metrics per result file; empty when the run failed.
    pub metrics: BTreeMap<String, DerivedMetrics>,
}

#[instrument(skip_all, name = "predict_workflow", fields(job = %job.name))]
pub fn run(job: &PredictionJob, config: &RunnerConfig, reporter: &ProgressReporter) -> PredictionReport {
    let runner = PredictionRunner::new(config.clone());

    reporter.phase("Running predictor");
    let result = runner.run(job);
    reporter.finish_phase();

    let metrics = match &result {
        RunResult::Success(output) => {
            reporter.phase("Deriving metrics");
            let metrics = output.derived_metrics();
            reporter.message(format!("{} result record(s) analysed", metrics.len()));
            reporter.finish_phase();
            metrics
        }
        RunResult::Failure(failure) => {
            warn!("Prediction for '{}' failed: {:?}", job.name, failure.kind);
            BTreeMap::new()
        }
    };

    PredictionReport { result, metrics }
}

/// Re-collects an existing job output directory and derives its metrics.
pub fn analyze_existing(
    output_dir: &Path,
    results_prefix: &str,
) -> Result<BTreeMap<String, DerivedMetrics>, EngineError> {
    if !output_dir.is_dir() {
        return Err(EngineError::ResultsRootNotFound(output_dir.to_path_buf()));
    }
    let (_, results) =
        collect_outputs(output_dir, results_prefix).map_err(|e| EngineError::io(output_dir, e))?;
    info!("Loaded {} result record(s) from {:?}", results.len(), output_dir);
    Ok(derive_all(&results))
}

/// Writes the derived metrics as pretty JSON into `output_dir`.
pub fn write_metrics_summary(
    output_dir: &Path,
    metrics: &BTreeMap<String, DerivedMetrics>,
) -> Result<PathBuf, EngineError> {
    let path = output_dir.join(METRICS_FILE_NAME);
    let file = File::create(&path).map_err(|e| EngineError::io(&path, e))?;
    serde_json::to_writer_pretty(BufWriter::new(file), metrics)?;
    Ok(path)
}
