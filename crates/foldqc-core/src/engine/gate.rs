use crate::core::models::qc::{QcThresholds, QcVerdict, ScoredRecord};
use tracing::debug;

/// Classifies confidence records against pTM and ipTM thresholds.
///
/// A record passes only if both scores are present and numeric and strictly
/// exceed their thresholds. Anything else fails. The gate is stateless, so the
/// same records and thresholds always give the same verdict.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QcGate {
    thresholds: QcThresholds,
}

impl QcGate {
    pub fn new(thresholds: QcThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &QcThresholds {
        &self.thresholds
    }

    pub fn passes(&self, record: &ScoredRecord) -> bool {
        match (record.ptm_score(), record.iptm_score()) {
            (Some(ptm), Some(iptm)) => ptm > self.thresholds.ptm && iptm > self.thresholds.iptm,
            _ => false,
        }
    }

    pub fn evaluate<I>(&self, records: I) -> QcVerdict
    where
        I: IntoIterator<Item = ScoredRecord>,
    {
        let (passing, failing): (Vec<_>, Vec<_>) =
            records.into_iter().partition(|record| self.passes(record));
        let total = passing.len() + failing.len();
        let sufficient = passing.len() >= self.thresholds.min_pass;
        debug!(
            "QC classified {} record(s): {} passing, {} failing (need {}).",
            total,
            passing.len(),
            failing.len(),
            self.thresholds.min_pass
        );

        QcVerdict {
            thresholds: self.thresholds,
            total,
            passing,
            failing,
            sufficient,
        }
    }
}
