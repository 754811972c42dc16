use super::{Outcome, output_writer};
use crate::cli::QcArgs;
use crate::config::PartialAppConfig;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use foldqc::engine::advisor::ResubmissionAdvisor;
use foldqc::engine::progress::ProgressReporter;
use foldqc::workflows::qc;
use std::io::Write;
use tracing::info;

pub fn run(args: QcArgs, config: &PartialAppConfig, progress: CliProgressHandler) -> Result<Outcome> {
    let qc_config = config.qc_config(&args)?;
    let advisor = ResubmissionAdvisor::new(config.advisor_config());
    let reporter = ProgressReporter::with_callback(progress.get_callback());

    let outcome = qc::run(&qc_config, &advisor, &reporter)?;

    let mut report_out = output_writer(Some(args.out.as_path()))?;
    qc::render_report(&outcome, &qc_config, &mut report_out)?;
    report_out.flush()?;
    info!("QC report written to {:?}", args.out);
    eprintln!("Wrote report to {}", args.out.display());

    let verdict = &outcome.verdict;
    if outcome.is_sufficient() {
        eprintln!(
            "QC sufficient: {} of {} prediction(s) pass (need {}).",
            verdict.passing_count(),
            verdict.total,
            verdict.thresholds.min_pass
        );
        return Ok(Outcome::Completed);
    }

    let mut plan_out = output_writer(Some(args.plan.as_path()))?;
    qc::render_plan(&outcome, &mut plan_out)?;
    plan_out.flush()?;
    info!("Resubmission plan written to {:?}", args.plan);
    eprintln!(
        "QC insufficient: {} of {} prediction(s) pass; {} more needed.",
        verdict.passing_count(),
        verdict.total,
        verdict.shortfall()
    );
    eprintln!("Wrote resubmission suggestions to {}", args.plan.display());
    Ok(Outcome::Insufficient)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn write_record(root: &Path, index: usize, ptm: f64, iptm: f64) {
        let dir = root.join("boltz_results_WT/predictions/WT");
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join(format!("confidence_WT_model_{index}.json")),
            format!(r#"{{"ptm": {ptm}, "iptm": {iptm}}}"#),
        )
        .unwrap();
    }

    fn qc_args(root: &Path, out: &Path, plan: &Path, min_pass: &str) -> QcArgs {
        let cli = Cli::parse_from([
            "foldqc",
            "qc",
            "--results-dir",
            root.to_str().unwrap(),
            "--job-name",
            "WT",
            "--min-pass",
            min_pass,
            "--out",
            out.to_str().unwrap(),
            "--plan",
            plan.to_str().unwrap(),
        ]);
        match cli.command {
            Commands::Qc(args) => args,
            _ => panic!("Expected 'qc' subcommand"),
        }
    }

    #[test]
    fn insufficient_run_writes_report_and_plan_files() {
        let dir = tempdir().unwrap();
        let results = dir.path().join("results");
        for i in 0..8 {
            write_record(&results, i, 0.6, 0.4);
        }
        for i in 8..12 {
            write_record(&results, i, 0.4, 0.2);
        }
        let report = dir.path().join("qc_report.txt");
        let plan = dir.path().join("resubmit_instructions.txt");

        let outcome = run(
            qc_args(&results, &report, &plan, "10"),
            &PartialAppConfig::default(),
            CliProgressHandler::hidden(),
        )
        .unwrap();

        assert_eq!(outcome, Outcome::Insufficient);
        let report = fs::read_to_string(report).unwrap();
        let plan = fs::read_to_string(plan).unwrap();
        assert!(report.contains("Found 12 confidence files; passing: 8; failing: 4"));
        assert!(!report.contains("# Found"));
        assert!(plan.contains("# Found 8 passing predictions; need 2 more (10 required)."));
        assert!(plan.contains("bsub < WT.lsf"));
    }

    #[test]
    fn sufficient_run_writes_no_plan() {
        let dir = tempdir().unwrap();
        let results = dir.path().join("results");
        for i in 0..3 {
            write_record(&results, i, 0.9, 0.8);
        }
        let report = dir.path().join("qc_report.txt");
        let plan = dir.path().join("resubmit_instructions.txt");

        let outcome = run(
            qc_args(&results, &report, &plan, "3"),
            &PartialAppConfig::default(),
            CliProgressHandler::hidden(),
        )
        .unwrap();

        assert_eq!(outcome, Outcome::Completed);
        assert!(report.exists());
        assert!(!plan.exists());
    }
}
