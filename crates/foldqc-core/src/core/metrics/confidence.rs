use crate::core::models::record::{
    CONFIDENCE_SCORE_KEYS, IPTM_KEYS, PLDDT_KEYS, PTM_KEYS, RawResultRecord,
};
use serde::Serialize;

/// Structural confidence scores for one predicted model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ConfidenceMetrics {
    pub confidence_score: f64,
    pub ptm: f64,
    pub iptm: f64,
    pub plddt: f64,
}

/// Reads the four confidence fields of a record, defaulting each to `0`.
pub fn derive_confidence_metrics(record: &RawResultRecord) -> ConfidenceMetrics {
    ConfidenceMetrics {
        confidence_score: record.score_or_zero(&CONFIDENCE_SCORE_KEYS),
        ptm: record.score_or_zero(&PTM_KEYS),
        iptm: record.score_or_zero(&IPTM_KEYS),
        plddt: record.score_or_zero(&PLDDT_KEYS),
    }
}
