use crate::core::io::layout::DEFAULT_RESULTS_PREFIX;
use crate::core::io::report::DEFAULT_SAMPLE_LIMIT;
use crate::core::models::qc::QcThresholds;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// How the external predictor is invoked and where it writes.
#[derive(Debug, Clone, PartialEq)]
pub struct RunnerConfig {
    pub executable: PathBuf,
    /// Arguments placed before the input file, e.g. `["predict"]`.
    pub base_args: Vec<String>,
    pub output_root: PathBuf,
    pub use_msa_server: bool,
    pub timeout: Option<Duration>,
    /// Where the transient input specification is written; the system
    /// temporary directory when `None`.
    pub scratch_dir: Option<PathBuf>,
    pub results_prefix: String,
    /// Keep the predictor's stdout in successful results.
    pub verbose: bool,
}

#[derive(Default)]
pub struct RunnerConfigBuilder {
    executable: Option<PathBuf>,
    base_args: Option<Vec<String>>,
    output_root: Option<PathBuf>,
    use_msa_server: Option<bool>,
    timeout: Option<Duration>,
    scratch_dir: Option<PathBuf>,
    results_prefix: Option<String>,
    verbose: bool,
}

impl RunnerConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn executable(mut self, executable: impl Into<PathBuf>) -> Self {
        self.executable = Some(executable.into());
        self
    }
    pub fn base_args(mut self, args: Vec<String>) -> Self {
        self.base_args = Some(args);
        self
    }
    pub fn output_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.output_root = Some(root.into());
        self
    }
    pub fn use_msa_server(mut self, enabled: bool) -> Self {
        self.use_msa_server = Some(enabled);
        self
    }
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
    pub fn scratch_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.scratch_dir = dir;
        self
    }
    pub fn results_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.results_prefix = Some(prefix.into());
        self
    }
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn build(self) -> Result<RunnerConfig, ConfigError> {
        let executable = self
            .executable
            .ok_or(ConfigError::MissingParameter("executable"))?;
        if executable.as_os_str().is_empty() {
            return Err(ConfigError::InvalidParameter {
                name: "executable",
                reason: "must not be empty".to_string(),
            });
        }
        if self.timeout.is_some_and(|t| t.is_zero()) {
            return Err(ConfigError::InvalidParameter {
                name: "timeout",
                reason: "must be greater than zero".to_string(),
            });
        }
        let results_prefix = self
            .results_prefix
            .unwrap_or_else(|| DEFAULT_RESULTS_PREFIX.to_string());
        if results_prefix.is_empty() {
            return Err(ConfigError::InvalidParameter {
                name: "results_prefix",
                reason: "must not be empty".to_string(),
            });
        }

        Ok(RunnerConfig {
            executable,
            base_args: self
                .base_args
                .unwrap_or_else(|| vec!["predict".to_string()]),
            output_root: self
                .output_root
                .ok_or(ConfigError::MissingParameter("output_root"))?,
            use_msa_server: self.use_msa_server.unwrap_or(true),
            timeout: self.timeout,
            scratch_dir: self.scratch_dir,
            results_prefix,
            verbose: self.verbose,
        })
    }
}

/// What to scan and how to judge it.
#[derive(Debug, Clone, PartialEq)]
pub struct QcConfig {
    pub results_root: PathBuf,
    pub job_filter: Option<String>,
    pub thresholds: QcThresholds,
    pub sample_limit: usize,
}

#[derive(Default)]
pub struct QcConfigBuilder {
    results_root: Option<PathBuf>,
    job_filter: Option<String>,
    ptm_threshold: Option<f64>,
    iptm_threshold: Option<f64>,
    min_pass: Option<usize>,
    sample_limit: Option<usize>,
}

impl QcConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn results_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.results_root = Some(root.into());
        self
    }
    pub fn job_filter(mut self, filter: Option<String>) -> Self {
        self.job_filter = filter.filter(|f| !f.is_empty());
        self
    }
    pub fn ptm_threshold(mut self, threshold: f64) -> Self {
        self.ptm_threshold = Some(threshold);
        self
    }
    pub fn iptm_threshold(mut self, threshold: f64) -> Self {
        self.iptm_threshold = Some(threshold);
        self
    }
    pub fn min_pass(mut self, n: usize) -> Self {
        self.min_pass = Some(n);
        self
    }
    pub fn sample_limit(mut self, n: usize) -> Self {
        self.sample_limit = Some(n);
        self
    }

    pub fn build(self) -> Result<QcConfig, ConfigError> {
        let defaults = QcThresholds::default();
        let ptm = finite("ptm_threshold", self.ptm_threshold.unwrap_or(defaults.ptm))?;
        let iptm = finite("iptm_threshold", self.iptm_threshold.unwrap_or(defaults.iptm))?;

        Ok(QcConfig {
            results_root: self
                .results_root
                .ok_or(ConfigError::MissingParameter("results_root"))?,
            job_filter: self.job_filter,
            thresholds: QcThresholds {
                ptm,
                iptm,
                min_pass: self.min_pass.unwrap_or(defaults.min_pass),
            },
            sample_limit: self.sample_limit.unwrap_or(DEFAULT_SAMPLE_LIMIT),
        })
    }
}

fn finite(name: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigError::InvalidParameter {
            name,
            reason: format!("must be a finite number, got {}", value),
        })
    }
}

/// Parameters for the example commands in a resubmission plan.
#[derive(Debug, Clone, PartialEq)]
pub struct AdvisorConfig {
    pub working_dir: Option<PathBuf>,
    pub job_script_extension: String,
    pub submit_command: String,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            working_dir: None,
            job_script_extension: "lsf".to_string(),
            submit_command: "bsub <".to_string(),
        }
    }
}
