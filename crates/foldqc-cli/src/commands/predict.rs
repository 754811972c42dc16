use super::Outcome;
use crate::cli::PredictArgs;
use crate::config::{PartialAppConfig, load_job};
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use foldqc::engine::progress::ProgressReporter;
use foldqc::engine::runner::RunResult;
use foldqc::workflows::predict;
use tracing::{error, info};

pub fn run(args: PredictArgs, config: &PartialAppConfig, progress: CliProgressHandler) -> Result<Outcome> {
    let mut job = load_job(&args.job)?;
    if let Some(use_msa) = args.msa.selection() {
        job.options.use_msa_server = Some(use_msa);
    }
    let runner_config = config.runner_config(&args)?;
    info!(
        "Running '{}' with {} chain(s) via {:?}.",
        job.name,
        job.polymers.len(),
        runner_config.executable
    );

    let reporter = ProgressReporter::with_callback(progress.get_callback());
    let report = predict::run(&job, &runner_config, &reporter);

    match &report.result {
        RunResult::Success(output) => {
            let metrics_path = predict::write_metrics_summary(&output.output_dir, &report.metrics)?;
            if args.show_output {
                if let Some(stdout) = &output.stdout {
                    print!("{}", stdout);
                }
            }
            println!(
                "Prediction '{}' finished: {} structure file(s), {} result file(s).",
                job.name,
                output.files.structure_count(),
                output.results.len()
            );
            println!("Metrics written to {}", metrics_path.display());
            Ok(Outcome::Completed)
        }
        RunResult::Failure(failure) => {
            error!("Prediction '{}' failed ({}).", job.name, failure.kind);
            eprintln!("Prediction '{}' failed ({}):", job.name, failure.kind);
            eprintln!("{}", failure.error.trim_end());
            Ok(Outcome::Failed)
        }
    }
}
