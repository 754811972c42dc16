use super::config::RunnerConfig;
use super::process::{ProcessError, run_captured};
use crate::core::io::input_spec::InputSpecification;
use crate::core::io::layout::{CollectedFiles, FileCategory, find_results_dirs, job_output_dir};
use crate::core::io::walk::FileWalker;
use crate::core::metrics::{DerivedMetrics, derive_all};
use crate::core::models::job::PredictionJob;
use crate::core::models::record::RawResultRecord;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailureKind {
    /// The job or its input specification could not be prepared.
    InputSpec,
    /// The predictor could not be started.
    Spawn,
    /// The predictor exited with a non-zero status.
    NonZeroExit,
    /// The predictor exceeded the configured time limit.
    Timeout,
    /// Reading the output tree failed.
    Io,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FailureKind::InputSpec => "invalid input",
            FailureKind::Spawn => "spawn failure",
            FailureKind::NonZeroExit => "non-zero exit",
            FailureKind::Timeout => "timeout",
            FailureKind::Io => "I/O error",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunFailure {
    pub kind: FailureKind,
    pub error: String,
    pub exit_code: Option<i32>,
}

impl RunFailure {
    fn new(kind: FailureKind, error: impl Into<String>) -> Self {
        Self {
            kind,
            error: error.into(),
            exit_code: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunOutput {
    pub output_dir: PathBuf,
    pub files: CollectedFiles,
    /// Parsed JSON outputs keyed by file name.
    pub results: BTreeMap<String, RawResultRecord>,
    /// The predictor's stdout, kept only in verbose mode.
    pub stdout: Option<String>,
}

impl RunOutput {
    pub fn derived_metrics(&self) -> BTreeMap<String, DerivedMetrics> {
        derive_all(&self.results)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RunResult {
    Success(RunOutput),
    Failure(RunFailure),
}

impl RunResult {
    pub fn is_success(&self) -> bool {
        matches!(self, RunResult::Success(_))
    }
}

impl From<Result<RunOutput, RunFailure>> for RunResult {
    fn from(result: Result<RunOutput, RunFailure>) -> Self {
        match result {
            Ok(output) => RunResult::Success(output),
            Err(failure) => RunResult::Failure(failure),
        }
    }
}

/// Collects the structure and JSON files of an existing job output directory.
///
/// JSON files that fail to read or parse are logged and left out of the
/// returned records; they still appear in the file lists.
pub fn collect_outputs(
    output_dir: &Path,
    results_prefix: &str,
) -> io::Result<(CollectedFiles, BTreeMap<String, RawResultRecord>)> {
    let mut files = CollectedFiles::default();
    for results_dir in find_results_dirs(output_dir, results_prefix)? {
        debug!("Collecting outputs from {:?}", results_dir);
        for entry in FileWalker::new(&results_dir)? {
            match entry {
                Ok(path) => {
                    if let Some(category) = FileCategory::of(&path) {
                        files.push(category, path);
                    }
                }
                Err(e) => warn!("Skipping unreadable entry {:?}: {}", e.path, e.source),
            }
        }
    }
    files.sort();

    let mut results = BTreeMap::new();
    for path in &files.json {
        let Some(name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };
        let parsed = fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|text| RawResultRecord::parse(&text).map_err(|e| e.to_string()));
        match parsed {
            Ok(record) => {
                if results.insert(name.clone(), record).is_some() {
                    debug!("Result file name '{}' seen more than once; keeping the last.", name);
                }
            }
            Err(e) => warn!("Could not read {:?}: {}", path, e),
        }
    }

    if files.is_empty() {
        warn!("No output files found under {:?}", output_dir);
    }
    Ok((files, results))
}

/// Runs the external predictor for one job at a time.
///
/// Two runs writing to the same output directory at once are not supported;
/// callers must keep at most one run per job name and output root in flight.
#[derive(Debug, Clone)]
pub struct PredictionRunner {
    config: RunnerConfig,
}

impl PredictionRunner {
    pub fn new(config: RunnerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    pub fn output_dir_for(&self, job: &PredictionJob) -> PathBuf {
        job_output_dir(&self.config.output_root, &job.name)
    }

    fn uses_msa(&self, job: &PredictionJob) -> bool {
        job.options.use_msa_server.unwrap_or(self.config.use_msa_server)
    }

    pub fn build_command(&self, job: &PredictionJob, input_path: &Path) -> Command {
        let options = &job.options;
        let mut command = Command::new(&self.config.executable);
        command
            .args(&self.config.base_args)
            .arg(input_path)
            .arg("--out_dir")
            .arg(self.output_dir_for(job))
            .arg("--recycling_steps")
            .arg(options.recycling_steps.to_string())
            .arg("--sampling_steps")
            .arg(options.sampling_steps.to_string())
            .arg("--diffusion_samples")
            .arg(options.diffusion_samples.to_string())
            .arg("--step_scale")
            .arg(options.step_scale.to_string())
            .arg("--output_format")
            .arg(options.output_format.as_str());
        if self.uses_msa(job) {
            command.arg("--use_msa_server");
        }
        command
    }

    /// Runs the predictor for `job` and collects its outputs.
    ///
    /// Never fails: every fault is folded into [`RunResult::Failure`]. The
    /// transient input file is removed before this returns, on every path.
    #[instrument(skip_all, name = "prediction_run", fields(job = %job.name))]
    pub fn run(&self, job: &PredictionJob) -> RunResult {
        if let Err(e) = job.validate() {
            return RunResult::Failure(RunFailure::new(FailureKind::InputSpec, e.to_string()));
        }

        let spec = InputSpecification::from_job(job);
        let input_file = match spec.write_temp(self.config.scratch_dir.as_deref()) {
            Ok(file) => file,
            Err(e) => {
                return RunResult::Failure(RunFailure::new(
                    FailureKind::InputSpec,
                    format!("Failed to write input specification: {}", e),
                ));
            }
        };
        debug!("Input specification written to {:?}", input_file.path());

        let outcome = self.execute(job, input_file.path());

        let input_path = input_file.path().to_path_buf();
        if let Err(e) = input_file.close() {
            warn!("Failed to remove input specification {:?}: {}", input_path, e);
        }
        outcome.into()
    }

    fn execute(&self, job: &PredictionJob, input_path: &Path) -> Result<RunOutput, RunFailure> {
        let output_dir = self.output_dir_for(job);
        fs::create_dir_all(&self.config.output_root).map_err(|e| {
            RunFailure::new(
                FailureKind::Io,
                format!("Failed to create {:?}: {}", self.config.output_root, e),
            )
        })?;

        let mut command = self.build_command(job, input_path);
        info!("Running predictor for job '{}'", job.name);

        let output = run_captured(&mut command, self.config.timeout).map_err(|e| match e {
            ProcessError::Spawn { .. } => RunFailure::new(FailureKind::Spawn, e.to_string()),
            ProcessError::Timeout {
                ref stdout,
                ref stderr,
                ..
            } => {
                let captured = if stderr.trim().is_empty() { stdout } else { stderr };
                let mut message = e.to_string();
                if !captured.trim().is_empty() {
                    message = format!("{}\n{}", message, captured);
                }
                RunFailure::new(FailureKind::Timeout, message)
            }
            ProcessError::Io(_) => RunFailure::new(FailureKind::Io, e.to_string()),
        })?;

        if !output.status.success() {
            let error = if output.stderr.trim().is_empty() {
                output.stdout
            } else {
                output.stderr
            };
            warn!("Predictor failed for job '{}' ({})", job.name, output.status);
            return Err(RunFailure {
                kind: FailureKind::NonZeroExit,
                error,
                exit_code: output.status.code(),
            });
        }

        let (files, results) = collect_outputs(&output_dir, &self.config.results_prefix)
            .map_err(|e| {
                RunFailure::new(
                    FailureKind::Io,
                    format!("Failed to collect outputs from {:?}: {}", output_dir, e),
                )
            })?;
        info!(
            "Job '{}' produced {} structure file(s) and {} result record(s).",
            job.name,
            files.structure_count(),
            results.len()
        );

        Ok(RunOutput {
            output_dir,
            files,
            results,
            stdout: self.config.verbose.then_some(output.stdout),
        })
    }
}
