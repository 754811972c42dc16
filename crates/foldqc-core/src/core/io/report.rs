use crate::core::metrics::summary::ScoreSummary;
use crate::core::models::qc::{DisplayScore, QcVerdict, ResubmissionPlan, ScoredRecord};
use std::io::{self, Write};
use std::path::Path;

pub const DEFAULT_SAMPLE_LIMIT: usize = 50;

/// Writes the plain-text QC summary.
///
/// At most `sample_limit` passing and `sample_limit` failing entries are listed.
pub fn write_qc_report(
    writer: &mut impl Write,
    results_root: &Path,
    job_filter: Option<&str>,
    verdict: &QcVerdict,
    sample_limit: usize,
) -> io::Result<()> {
    writeln!(
        writer,
        "QC summary for: {} (job filter: {})",
        results_root.display(),
        job_filter.unwrap_or("None")
    )?;
    writeln!(
        writer,
        "Found {} confidence files; passing: {}; failing: {}",
        verdict.total,
        verdict.passing_count(),
        verdict.failing_count()
    )?;
    writeln!(
        writer,
        "Criteria: ptm > {}, iptm > {}; required passing: {}",
        verdict.thresholds.ptm, verdict.thresholds.iptm, verdict.thresholds.min_pass
    )?;
    writeln!(writer)?;

    write_summary_line(writer, "ptm", verdict.passing_ptm_summary())?;
    write_summary_line(writer, "iptm", verdict.passing_iptm_summary())?;

    if !verdict.passing.is_empty() {
        writeln!(writer)?;
        writeln!(writer, "Passing predictions (sample):")?;
        write_samples(writer, &verdict.passing, sample_limit)?;
    }
    if !verdict.failing.is_empty() {
        writeln!(writer)?;
        writeln!(writer, "Failing predictions (sample):")?;
        write_samples(writer, &verdict.failing, sample_limit)?;
    }
    Ok(())
}

fn write_summary_line(
    writer: &mut impl Write,
    label: &str,
    summary: Option<ScoreSummary>,
) -> io::Result<()> {
    let Some(s) = summary else {
        return Ok(());
    };
    let sd = s
        .std_dev
        .map(|v| format!("{:.4}", v))
        .unwrap_or_else(|| "n/a".to_string());
    writeln!(
        writer,
        "Passing {label}: n={} mean={:.4} median={:.4} sd={} min={:.4} max={:.4}",
        s.count, s.mean, s.median, sd, s.min, s.max
    )
}

fn write_samples(
    writer: &mut impl Write,
    records: &[ScoredRecord],
    limit: usize,
) -> io::Result<()> {
    for record in records.iter().take(limit) {
        writeln!(
            writer,
            "  {}  ptm={}  iptm={}",
            record.path.display(),
            DisplayScore(&record.ptm),
            DisplayScore(&record.iptm)
        )?;
    }
    if records.len() > limit {
        writeln!(writer, "  ... {} more not shown", records.len() - limit)?;
    }
    Ok(())
}

/// Writes the resubmission plan as comment lines, so it can never be run
/// as-is by accident.
pub fn write_resubmission_plan(writer: &mut impl Write, plan: &ResubmissionPlan) -> io::Result<()> {
    writeln!(writer, "# QC resubmission suggestions")?;
    if let Some(job) = &plan.job_name {
        writeln!(writer, "# Job: {}", job)?;
    }
    writeln!(
        writer,
        "# Found {} passing predictions; need {} more ({} required).",
        plan.passing, plan.shortfall, plan.required
    )?;
    writeln!(writer, "#")?;
    writeln!(writer, "# Suggested actions (review before running):")?;
    for (i, action) in plan.actions.iter().enumerate() {
        writeln!(writer, "# {}) {}", i + 1, action.description)?;
        for command in &action.commands {
            writeln!(writer, "#    {}", command)?;
        }
    }
    Ok(())
}
