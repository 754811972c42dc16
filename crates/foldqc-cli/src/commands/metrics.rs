use super::Outcome;
use crate::cli::MetricsArgs;
use crate::config::PartialAppConfig;
use crate::error::Result;
use anyhow::Context;
use foldqc::workflows::predict;
use std::io::{self, Write};
use tracing::warn;

pub fn run(args: MetricsArgs, config: &PartialAppConfig) -> Result<Outcome> {
    let metrics = predict::analyze_existing(&args.job_output_dir, &config.results_prefix())?;
    if metrics.is_empty() {
        warn!("No confidence or affinity results under {:?}", args.job_output_dir);
    }

    let mut out = io::stdout().lock();
    serde_json::to_writer_pretty(&mut out, &metrics).context("Failed to serialize metrics")?;
    writeln!(out)?;
    Ok(Outcome::Completed)
}
