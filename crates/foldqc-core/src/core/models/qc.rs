use crate::core::metrics::summary::ScoreSummary;
use crate::core::models::record::coerce_score;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;

const UNKNOWN_MODEL_ID: &str = "unknown";

/// One discovered confidence record with its raw pTM and ipTM values.
///
/// `None` means no synonym of the field was found, or the file could not be
/// parsed at all. Values are kept raw; numeric coercion happens at
/// classification time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredRecord {
    pub path: PathBuf,
    pub model_id: String,
    pub ptm: Option<Value>,
    pub iptm: Option<Value>,
}

impl ScoredRecord {
    pub fn new(path: PathBuf, ptm: Option<Value>, iptm: Option<Value>) -> Self {
        let model_id = model_id_from_path(&path);
        Self {
            path,
            model_id,
            ptm,
            iptm,
        }
    }

    pub fn unreadable(path: PathBuf) -> Self {
        Self::new(path, None, None)
    }

    pub fn ptm_score(&self) -> Option<f64> {
        self.ptm.as_ref().and_then(coerce_score)
    }

    pub fn iptm_score(&self) -> Option<f64> {
        self.iptm.as_ref().and_then(coerce_score)
    }
}

/// The segment after the last `_` of the file stem, e.g. `3` for
/// `confidence_job_model_3.json`.
fn model_id_from_path(path: &std::path::Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .and_then(|stem| stem.rsplit_once('_'))
        .map(|(_, id)| id)
        .filter(|id| !id.is_empty())
        .unwrap_or(UNKNOWN_MODEL_ID)
        .to_string()
}

/// Formats an optional raw score for reports.
pub struct DisplayScore<'a>(pub &'a Option<Value>);

impl fmt::Display for DisplayScore<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(Value::String(text)) => f.write_str(text),
            Some(Value::Null) | None => f.write_str("None"),
            Some(value) => write!(f, "{}", value),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QcThresholds {
    pub ptm: f64,
    pub iptm: f64,
    pub min_pass: usize,
}

impl Default for QcThresholds {
    fn default() -> Self {
        Self {
            ptm: 0.5,
            iptm: 0.3,
            min_pass: 10,
        }
    }
}

/// The outcome of classifying one collection of confidence records.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QcVerdict {
    pub thresholds: QcThresholds,
    pub total: usize,
    pub passing: Vec<ScoredRecord>,
    pub failing: Vec<ScoredRecord>,
    pub sufficient: bool,
}

impl QcVerdict {
    pub fn passing_count(&self) -> usize {
        self.passing.len()
    }

    pub fn failing_count(&self) -> usize {
        self.failing.len()
    }

    /// How many more passing records are needed; zero when sufficient.
    pub fn shortfall(&self) -> usize {
        self.thresholds.min_pass.saturating_sub(self.passing.len())
    }

    pub fn passing_ptm_summary(&self) -> Option<ScoreSummary> {
        ScoreSummary::from_values(self.passing.iter().filter_map(ScoredRecord::ptm_score))
    }

    pub fn passing_iptm_summary(&self) -> Option<ScoreSummary> {
        ScoreSummary::from_values(self.passing.iter().filter_map(ScoredRecord::iptm_score))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionKind {
    RerunWithMoreSeeds,
    WidenSamplingArray,
    AdjustMsaOrRecycling,
}

/// One suggested remediation step. Commands are for a human to review; they
/// are never executed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResubmissionAction {
    pub kind: ActionKind,
    pub description: String,
    pub commands: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResubmissionPlan {
    pub job_name: Option<String>,
    pub passing: usize,
    pub required: usize,
    pub shortfall: usize,
    pub actions: Vec<ResubmissionAction>,
}
