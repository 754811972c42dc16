use crate::core::io::report::{write_qc_report, write_resubmission_plan};
use crate::core::io::table::write_scored_records_csv;
use crate::core::models::qc::{QcVerdict, ResubmissionPlan, ScoredRecord};
use crate::engine::advisor::ResubmissionAdvisor;
use crate::engine::config::QcConfig;
use crate::engine::error::EngineError;
use crate::engine::gate::QcGate;
use crate::engine::progress::ProgressReporter;
use crate::engine::scanner::ResultScanner;
use std::io::{self, Write};
use tracing::{info, instrument, warn};

/// Stages a QC run moves through. `Sufficient` and `Insufficient` are
/// terminal; an insufficient verdict always passes through `Advising`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QcStage {
    Scanning,
    Classifying,
    Advising,
    Sufficient,
    Insufficient,
}

impl QcStage {
    pub fn label(self) -> &'static str {
        match self {
            QcStage::Scanning => "Scanning results",
            QcStage::Classifying => "Classifying predictions",
            QcStage::Advising => "Preparing resubmission plan",
            QcStage::Sufficient => "Sufficient",
            QcStage::Insufficient => "Insufficient",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QcOutcome {
    pub verdict: QcVerdict,
    /// Present exactly when the verdict is insufficient.
    pub plan: Option<ResubmissionPlan>,
}

impl QcOutcome {
    pub fn is_sufficient(&self) -> bool {
        self.verdict.sufficient
    }

    pub fn final_stage(&self) -> QcStage {
        if self.verdict.sufficient {
            QcStage::Sufficient
        } else {
            QcStage::Insufficient
        }
    }
}

/// Scans, classifies and, when short of passing predictions, advises.
///
/// A results root with no confidence records is an error rather than an
/// insufficient verdict.
#[instrument(skip_all, name = "qc_workflow", fields(root = %config.results_root.display()))]
pub fn run(
    config: &QcConfig,
    advisor: &ResubmissionAdvisor,
    reporter: &ProgressReporter,
) -> Result<QcOutcome, EngineError> {
    let scanner =
        ResultScanner::new(&config.results_root).with_job_filter(config.job_filter.clone());

    reporter.phase(QcStage::Scanning.label());
    let scan = scanner.scan()?;
    let total = scan.len();
    reporter.message(format!("{} confidence file(s) found", total));
    if total == 0 {
        reporter.finish_phase();
        return Err(EngineError::NoConfidenceRecords {
            root: config.results_root.clone(),
            job_filter: config.job_filter.clone(),
        });
    }
    let records: Vec<ScoredRecord> = scan.collect();
    reporter.finish_phase();

    reporter.phase(QcStage::Classifying.label());
    let verdict = QcGate::new(config.thresholds).evaluate(records);
    reporter.finish_phase();
    info!(
        "{} of {} prediction(s) pass (need {}).",
        verdict.passing_count(),
        verdict.total,
        verdict.thresholds.min_pass
    );

    let plan = if verdict.sufficient {
        None
    } else {
        reporter.phase(QcStage::Advising.label());
        let plan = advisor.advise(&verdict, config.job_filter.as_deref());
        reporter.finish_phase();
        warn!("QC insufficient: {} more passing prediction(s) needed.", verdict.shortfall());
        plan
    };

    Ok(QcOutcome { verdict, plan })
}

/// Writes the plain-text QC summary only.
pub fn render_report(outcome: &QcOutcome, config: &QcConfig, writer: &mut impl Write) -> io::Result<()> {
    write_qc_report(
        writer,
        &config.results_root,
        config.job_filter.as_deref(),
        &outcome.verdict,
        config.sample_limit,
    )
}

/// Writes the resubmission plan, if any. Returns whether anything was written.
pub fn render_plan(outcome: &QcOutcome, writer: &mut impl Write) -> io::Result<bool> {
    match &outcome.plan {
        Some(plan) => write_resubmission_plan(writer, plan).map(|()| true),
        None => Ok(false),
    }
}

/// Scans without classifying and writes one CSV row per record.
pub fn export_scan(config: &QcConfig, writer: impl Write) -> Result<usize, EngineError> {
    let scanner =
        ResultScanner::new(&config.results_root).with_job_filter(config.job_filter.clone());
    let records: Vec<ScoredRecord> = scanner.scan()?.collect();
    Ok(write_scored_records_csv(writer, &records)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::QcConfigBuilder;
    use crate::engine::progress::Progress;
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::sync::{Arc, Mutex};
    use tempfile::{TempDir, tempdir};

    fn write_record(dir: &Path, job: &str, index: usize, ptm: f64, iptm: f64) -> PathBuf {
        let preds = dir.join(format!("boltz_results_{job}/predictions/{job}"));
        fs::create_dir_all(&preds).unwrap();
        let path = preds.join(format!("confidence_{job}_model_{index}.json"));
        fs::write(&path, format!(r#"{{"ptm": {ptm}, "iptm": {iptm}}}"#)).unwrap();
        path
    }

    /// Eight passing and four failing records for one job.
    fn mixed_results() -> TempDir {
        let dir = tempdir().unwrap();
        for i in 0..8 {
            write_record(dir.path(), "WT", i, 0.6, 0.4);
        }
        for i in 8..12 {
            write_record(dir.path(), "WT", i, 0.4, 0.2);
        }
        dir
    }

    fn config(root: &Path, min_pass: usize) -> QcConfig {
        QcConfigBuilder::new()
            .results_root(root)
            .job_filter(Some("WT".to_string()))
            .min_pass(min_pass)
            .build()
            .unwrap()
    }

    #[test]
    fn shortfall_produces_plan() {
        let dir = mixed_results();
        let outcome = run(&config(dir.path(), 10), &ResubmissionAdvisor::default(), &ProgressReporter::new())
            .unwrap();

        assert!(!outcome.is_sufficient());
        assert_eq!(outcome.final_stage(), QcStage::Insufficient);
        assert_eq!(outcome.verdict.total, 12);
        assert_eq!(outcome.verdict.passing_count(), 8);
        assert_eq!(outcome.verdict.failing_count(), 4);
        let plan = outcome.plan.unwrap();
        assert_eq!(plan.shortfall, 2);
        assert_eq!(plan.job_name.as_deref(), Some("WT"));
        assert_eq!(plan.actions.len(), 3);
    }

    #[test]
    fn enough_passing_records_need_no_plan() {
        let dir = mixed_results();
        let outcome = run(&config(dir.path(), 5), &ResubmissionAdvisor::default(), &ProgressReporter::new())
            .unwrap();

        assert!(outcome.is_sufficient());
        assert_eq!(outcome.final_stage(), QcStage::Sufficient);
        assert!(outcome.plan.is_none());
    }

    #[test]
    fn empty_results_root_is_an_error() {
        let dir = tempdir().unwrap();
        let result = run(&config(dir.path(), 10), &ResubmissionAdvisor::default(), &ProgressReporter::new());
        assert!(matches!(result, Err(EngineError::NoConfidenceRecords { .. })));
    }

    #[test]
    fn missing_results_root_is_an_error() {
        let dir = tempdir().unwrap();
        let result = run(
            &config(&dir.path().join("nope"), 10),
            &ResubmissionAdvisor::default(),
            &ProgressReporter::new(),
        );
        assert!(matches!(result, Err(EngineError::ResultsRootNotFound(_))));
    }

    #[test]
    fn insufficient_run_reports_advising_phase() {
        let dir = mixed_results();
        let phases = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&phases);
        let reporter = ProgressReporter::with_callback(Box::new(move |event| {
            if let Progress::PhaseStart { name } = event {
                sink.lock().unwrap().push(name);
            }
        }));

        run(&config(dir.path(), 10), &ResubmissionAdvisor::default(), &reporter).unwrap();

        assert_eq!(
            *phases.lock().unwrap(),
            vec![
                QcStage::Scanning.label(),
                QcStage::Classifying.label(),
                QcStage::Advising.label()
            ]
        );
    }

    #[test]
    fn report_and_plan_render_separately() {
        let dir = mixed_results();
        let cfg = config(dir.path(), 10);
        let outcome = run(&cfg, &ResubmissionAdvisor::default(), &ProgressReporter::new()).unwrap();
        let mut report = Vec::new();
        let mut plan = Vec::new();

        render_report(&outcome, &cfg, &mut report).unwrap();
        let wrote_plan = render_plan(&outcome, &mut plan).unwrap();

        let report = String::from_utf8(report).unwrap();
        let plan = String::from_utf8(plan).unwrap();
        assert!(wrote_plan);
        assert!(report.contains("Found 12 confidence files; passing: 8; failing: 4"));
        assert!(!report.contains("# Found"));
        assert!(plan.starts_with("# QC resubmission suggestions"));
        assert!(plan.contains("# Found 8 passing predictions; need 2 more (10 required)."));
    }

    #[test]
    fn sufficient_outcome_has_nothing_to_plan() {
        let dir = mixed_results();
        let cfg = config(dir.path(), 5);
        let outcome = run(&cfg, &ResubmissionAdvisor::default(), &ProgressReporter::new()).unwrap();
        let mut plan = Vec::new();

        assert!(!render_plan(&outcome, &mut plan).unwrap());
        assert!(plan.is_empty());
    }

    #[test]
    fn export_scan_writes_every_record() {
        let dir = mixed_results();
        let mut out = Vec::new();

        let rows = export_scan(&config(dir.path(), 10), &mut out).unwrap();

        assert_eq!(rows, 12);
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().count(), 13);
        assert!(text.lines().nth(1).unwrap().ends_with(",0,0.6,0.4"));
    }
}
