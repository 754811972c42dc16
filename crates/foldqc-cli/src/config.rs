mod defaults;

pub use defaults::DefaultsConfig;

use crate::cli::{PredictArgs, QcArgs, ScanArgs};
use crate::error::{CliError, Result};
use foldqc::core::models::job::PredictionJob;
use foldqc::engine::config::{
    AdvisorConfig, QcConfig, QcConfigBuilder, RunnerConfig, RunnerConfigBuilder,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialPredictorConfig {
    executable: Option<PathBuf>,
    args: Option<Vec<String>>,
    output_root: Option<PathBuf>,
    use_msa_server: Option<bool>,
    timeout_secs: Option<u64>,
    scratch_dir: Option<PathBuf>,
    results_prefix: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialQcConfig {
    ptm_threshold: Option<f64>,
    iptm_threshold: Option<f64>,
    min_pass: Option<usize>,
    sample_limit: Option<usize>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialAdvisorConfig {
    working_dir: Option<PathBuf>,
    job_script_extension: Option<String>,
    submit_command: Option<String>,
}

/// Settings read from the optional configuration file, before command-line
/// flags and built-in defaults are applied.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialAppConfig {
    predictor: Option<PartialPredictorConfig>,
    qc: Option<PartialQcConfig>,
    advisor: Option<PartialAdvisorConfig>,
}

impl PartialAppConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Loads `path` when given; otherwise starts from an empty configuration.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn runner_config(&self, args: &PredictArgs) -> Result<RunnerConfig> {
        let defaults = DefaultsConfig::default();
        let empty = PartialPredictorConfig::default();
        let file = self.predictor.as_ref().unwrap_or(&empty);

        let timeout = args.timeout.or(file.timeout_secs).map(Duration::from_secs);

        RunnerConfigBuilder::new()
            .executable(
                file.executable
                    .clone()
                    .unwrap_or_else(|| PathBuf::from(&defaults.executable)),
            )
            .base_args(file.args.clone().unwrap_or(defaults.base_args))
            .output_root(
                args.output_root
                    .clone()
                    .or_else(|| file.output_root.clone())
                    .unwrap_or_else(|| PathBuf::from(&defaults.output_root)),
            )
            .use_msa_server(
                args.msa
                    .selection()
                    .or(file.use_msa_server)
                    .unwrap_or(defaults.use_msa_server),
            )
            .timeout(timeout)
            .scratch_dir(file.scratch_dir.clone())
            .results_prefix(self.results_prefix())
            .verbose(args.show_output)
            .build()
            .map_err(|e| CliError::Config(e.to_string()))
    }

    pub fn qc_config(&self, args: &QcArgs) -> Result<QcConfig> {
        let defaults = DefaultsConfig::default();
        let empty = PartialQcConfig::default();
        let file = self.qc.as_ref().unwrap_or(&empty);

        QcConfigBuilder::new()
            .results_root(&args.results_dir)
            .job_filter(args.job_name.clone())
            .ptm_threshold(
                args.ptm_thresh
                    .or(file.ptm_threshold)
                    .unwrap_or(defaults.ptm_threshold),
            )
            .iptm_threshold(
                args.iptm_thresh
                    .or(file.iptm_threshold)
                    .unwrap_or(defaults.iptm_threshold),
            )
            .min_pass(args.min_pass.or(file.min_pass).unwrap_or(defaults.min_pass))
            .sample_limit(file.sample_limit.unwrap_or(defaults.sample_limit))
            .build()
            .map_err(|e| CliError::Config(e.to_string()))
    }

    /// Scanning only needs the root and the job filter.
    pub fn scan_config(&self, args: &ScanArgs) -> Result<QcConfig> {
        QcConfigBuilder::new()
            .results_root(&args.results_dir)
            .job_filter(args.job_name.clone())
            .build()
            .map_err(|e| CliError::Config(e.to_string()))
    }

    pub fn advisor_config(&self) -> AdvisorConfig {
        let defaults = DefaultsConfig::default();
        let empty = PartialAdvisorConfig::default();
        let file = self.advisor.as_ref().unwrap_or(&empty);
        AdvisorConfig {
            working_dir: file.working_dir.clone(),
            job_script_extension: file
                .job_script_extension
                .clone()
                .unwrap_or(defaults.job_script_extension),
            submit_command: file
                .submit_command
                .clone()
                .unwrap_or(defaults.submit_command),
        }
    }

    pub fn results_prefix(&self) -> String {
        self.predictor
            .as_ref()
            .and_then(|p| p.results_prefix.clone())
            .unwrap_or_else(|| DefaultsConfig::default().results_prefix)
    }

    pub fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };

            match key {
                "predictor.executable" => {
                    self.predictor().executable = Some(PathBuf::from(value));
                }
                "predictor.output-root" => {
                    self.predictor().output_root = Some(PathBuf::from(value));
                }
                "predictor.use-msa-server" => {
                    self.predictor().use_msa_server = Some(parse_value(key, value)?);
                }
                "predictor.timeout-secs" => {
                    self.predictor().timeout_secs = Some(parse_value(key, value)?);
                }
                "predictor.scratch-dir" => {
                    self.predictor().scratch_dir = Some(PathBuf::from(value));
                }
                "predictor.results-prefix" => {
                    self.predictor().results_prefix = Some(value.to_string());
                }
                "qc.ptm-threshold" => {
                    self.qc().ptm_threshold = Some(parse_value(key, value)?);
                }
                "qc.iptm-threshold" => {
                    self.qc().iptm_threshold = Some(parse_value(key, value)?);
                }
                "qc.min-pass" => {
                    self.qc().min_pass = Some(parse_value(key, value)?);
                }
                "qc.sample-limit" => {
                    self.qc().sample_limit = Some(parse_value(key, value)?);
                }
                "advisor.working-dir" => {
                    self.advisor().working_dir = Some(PathBuf::from(value));
                }
                "advisor.job-script-extension" => {
                    self.advisor().job_script_extension = Some(value.to_string());
                }
                "advisor.submit-command" => {
                    self.advisor().submit_command = Some(value.to_string());
                }
                _ => {
                    return Err(CliError::Config(format!(
                        "Unsupported configuration key for --set: '{}'",
                        key
                    )));
                }
            }
        }
        Ok(())
    }

    fn predictor(&mut self) -> &mut PartialPredictorConfig {
        self.predictor.get_or_insert_with(Default::default)
    }

    fn qc(&mut self) -> &mut PartialQcConfig {
        self.qc.get_or_insert_with(Default::default)
    }

    fn advisor(&mut self) -> &mut PartialAdvisorConfig {
        self.advisor.get_or_insert_with(Default::default)
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| {
        CliError::Config(format!("Invalid value for {}: {}", key, value))
    })
}

/// Reads a TOML job description.
pub fn load_job(path: &Path) -> Result<PredictionJob> {
    debug!("Loading job from file: {:?}", path);
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|e| CliError::FileParsing {
        path: path.to_path_buf(),
        source: e.into(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use foldqc::core::models::job::MoleculeType;
    use std::fs;
    use tempfile::tempdir;

    fn qc_args(extra: &[&str]) -> QcArgs {
        let mut args = vec!["foldqc", "qc", "--results-dir", "results"];
        args.extend_from_slice(extra);
        match Cli::parse_from(args).command {
            Commands::Qc(args) => args,
            _ => panic!("Expected 'qc' subcommand"),
        }
    }

    fn predict_args(extra: &[&str]) -> PredictArgs {
        let mut args = vec!["foldqc", "predict", "--job", "job.toml"];
        args.extend_from_slice(extra);
        match Cli::parse_from(args).command {
            Commands::Predict(args) => args,
            _ => panic!("Expected 'predict' subcommand"),
        }
    }

    #[test]
    fn built_in_defaults_apply_without_a_file() {
        let config = PartialAppConfig::load(None).unwrap();

        let qc = config.qc_config(&qc_args(&[])).unwrap();
        assert_eq!(qc.thresholds.ptm, 0.5);
        assert_eq!(qc.thresholds.iptm, 0.3);
        assert_eq!(qc.thresholds.min_pass, 10);

        let runner = config.runner_config(&predict_args(&[])).unwrap();
        assert_eq!(runner.executable, PathBuf::from("boltz"));
        assert_eq!(runner.output_root, PathBuf::from("output"));
        assert!(runner.use_msa_server);
        assert_eq!(runner.timeout, None);

        let advisor = config.advisor_config();
        assert_eq!(advisor.submit_command, "bsub <");
    }

    #[test]
    fn precedence_is_flag_then_set_then_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("foldqc.toml");
        fs::write(
            &path,
            r#"
            [qc]
            min-pass = 4
            ptm-threshold = 0.7
            iptm-threshold = 0.6

            [advisor]
            submit-command = "sbatch"
            job-script-extension = "sh"
            "#,
        )
        .unwrap();
        let mut config = PartialAppConfig::from_file(&path).unwrap();
        config
            .apply_set_values(&["qc.ptm-threshold=0.65".to_string(), "qc.min-pass=6".to_string()])
            .unwrap();

        let qc = config.qc_config(&qc_args(&["--min-pass", "8"])).unwrap();

        assert_eq!(qc.thresholds.min_pass, 8);
        assert_eq!(qc.thresholds.ptm, 0.65);
        assert_eq!(qc.thresholds.iptm, 0.6);
        assert_eq!(config.advisor_config().submit_command, "sbatch");
        assert_eq!(config.advisor_config().job_script_extension, "sh");
    }

    #[test]
    fn predictor_flags_override_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("foldqc.toml");
        fs::write(
            &path,
            r#"
            [predictor]
            executable = "/opt/boltz/bin/boltz"
            output-root = "from-file"
            use-msa-server = true
            timeout-secs = 600
            "#,
        )
        .unwrap();
        let config = PartialAppConfig::from_file(&path).unwrap();

        let runner = config
            .runner_config(&predict_args(&["--no-msa", "--output-root", "cli-out", "--timeout", "30"]))
            .unwrap();

        assert_eq!(runner.executable, PathBuf::from("/opt/boltz/bin/boltz"));
        assert_eq!(runner.output_root, PathBuf::from("cli-out"));
        assert!(!runner.use_msa_server);
        assert_eq!(runner.timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn unknown_file_keys_are_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("foldqc.toml");
        fs::write(&path, "[qc]\nmin_passes = 3\n").unwrap();

        let result = PartialAppConfig::from_file(&path);

        assert!(matches!(result, Err(CliError::FileParsing { .. })));
    }

    #[test]
    fn malformed_set_values_are_config_errors() {
        let mut config = PartialAppConfig::default();
        assert!(matches!(
            config.apply_set_values(&["qc.min-pass".to_string()]),
            Err(CliError::Config(_))
        ));
        assert!(matches!(
            config.apply_set_values(&["qc.min-pass=many".to_string()]),
            Err(CliError::Config(_))
        ));
        assert!(matches!(
            config.apply_set_values(&["qc.unknown=1".to_string()]),
            Err(CliError::Config(_))
        ));
    }

    #[test]
    fn non_finite_threshold_is_a_config_error() {
        let config = PartialAppConfig::default();
        let result = config.qc_config(&qc_args(&["--ptm-thresh", "NaN"]));
        assert!(matches!(result, Err(CliError::Config(_))));
    }

    #[test]
    fn job_file_is_deserialized() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("job.toml");
        fs::write(
            &path,
            r#"
            name = "WT_trastuzumab"

            [[polymers]]
            id = "A"
            molecule_type = "protein"
            sequence = "EVQLVESGGGLVQPGG"

            [[polymers]]
            id = "B"
            molecule_type = "protein"
            sequence = "DIQMTQSPSSLSASVG"

            [options]
            diffusion_samples = 5
            use_msa_server = false
            "#,
        )
        .unwrap();

        let job = load_job(&path).unwrap();

        assert_eq!(job.name, "WT_trastuzumab");
        assert_eq!(job.polymers.len(), 2);
        assert_eq!(job.polymers[1].molecule_type, MoleculeType::Protein);
        assert_eq!(job.options.diffusion_samples, 5);
        assert_eq!(job.options.recycling_steps, 3);
        assert_eq!(job.options.use_msa_server, Some(false));
        assert!(job.validate().is_ok());
    }

    #[test]
    fn invalid_job_file_is_a_parsing_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("job.toml");
        fs::write(&path, "name = 3\n").unwrap();

        assert!(matches!(load_job(&path), Err(CliError::FileParsing { .. })));
    }
}
