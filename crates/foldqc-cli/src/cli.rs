use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

pub const DEFAULT_REPORT_FILE: &str = "qc_report.txt";
pub const DEFAULT_PLAN_FILE: &str = "resubmit_instructions.txt";

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "foldqc - run structure predictions, derive their metrics, and gate batches on confidence.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Path to a TOML configuration file with [predictor], [qc] and [advisor] tables.
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S qc.min-pass=20
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", global = true)]
    pub set_values: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the external predictor for one job and derive metrics from its output.
    Predict(PredictArgs),
    /// Check whether a results tree holds enough confident predictions.
    Qc(QcArgs),
    /// Export the pTM/ipTM scores of every confidence file as CSV.
    Scan(ScanArgs),
    /// Derive metrics from an existing job output directory and print them as JSON.
    Metrics(MetricsArgs),
}

#[derive(Args, Debug)]
pub struct PredictArgs {
    /// Path to the job description in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub job: PathBuf,

    /// Override the directory under which job outputs are written.
    #[arg(short, long, value_name = "DIR")]
    pub output_root: Option<PathBuf>,

    #[command(flatten)]
    pub msa: MsaServerFlags,

    /// Abort the predictor after this many seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Print the predictor's standard output after a successful run.
    #[arg(long)]
    pub show_output: bool,
}

/// Mutually exclusive switches for the remote MSA server.
#[derive(Args, Debug, Clone, Copy)]
#[group(required = false, multiple = false)]
pub struct MsaServerFlags {
    /// Generate alignments with the remote MSA server.
    #[arg(long)]
    pub use_msa: bool,
    /// Do not contact the MSA server.
    #[arg(long)]
    pub no_msa: bool,
}

impl MsaServerFlags {
    pub fn selection(self) -> Option<bool> {
        if self.use_msa {
            Some(true)
        } else if self.no_msa {
            Some(false)
        } else {
            None
        }
    }
}

#[derive(Args, Debug)]
pub struct QcArgs {
    /// Root directory containing prediction results.
    #[arg(short, long, required = true, value_name = "DIR")]
    pub results_dir: PathBuf,

    /// Only consider confidence files whose path contains this job name.
    #[arg(short = 'n', long, value_name = "NAME")]
    pub job_name: Option<String>,

    /// Minimum number of passing predictions required.
    #[arg(short, long, value_name = "INT")]
    pub min_pass: Option<usize>,

    /// pTM threshold; a prediction must exceed it to pass.
    #[arg(long, value_name = "FLOAT")]
    pub ptm_thresh: Option<f64>,

    /// ipTM threshold; a prediction must exceed it to pass.
    #[arg(long, value_name = "FLOAT")]
    pub iptm_thresh: Option<f64>,

    /// Where to write the QC report; `-` for standard output.
    #[arg(short, long, value_name = "PATH", default_value = DEFAULT_REPORT_FILE)]
    pub out: PathBuf,

    /// Where to write the resubmission plan when QC is insufficient; `-` for standard output.
    #[arg(short, long, value_name = "PATH", default_value = DEFAULT_PLAN_FILE)]
    pub plan: PathBuf,
}

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Root directory containing prediction results.
    #[arg(short, long, required = true, value_name = "DIR")]
    pub results_dir: PathBuf,

    /// Only consider confidence files whose path contains this job name.
    #[arg(short = 'n', long, value_name = "NAME")]
    pub job_name: Option<String>,

    /// Write the CSV here instead of standard output.
    #[arg(short, long, value_name = "PATH")]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct MetricsArgs {
    /// Output directory of a finished job.
    #[arg(required = true, value_name = "JOB_OUTPUT_DIR")]
    pub job_output_dir: PathBuf,
}
