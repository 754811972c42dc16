//! Pure conversions from raw predictor records into analysis-ready quantities.
//!
//! Every function here is total: absent or non-numeric fields default to `0`
//! and logarithms of non-positive concentrations yield the sentinel `0`.

pub mod affinity;
pub mod confidence;
pub mod summary;

use crate::core::models::record::{RawResultRecord, RecordKind};
use serde::Serialize;
use std::collections::BTreeMap;

pub use affinity::{AffinityMetrics, derive_affinity_metrics};
pub use confidence::{ConfidenceMetrics, derive_confidence_metrics};

/// The derived view of one raw record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DerivedMetrics {
    Confidence(ConfidenceMetrics),
    Affinity(AffinityMetrics),
}

/// Derives metrics for a record, using its file name to pick the derivation.
///
/// Returns `None` for records that are neither confidence nor affinity
/// records, and for records that are not JSON objects.
pub fn derive_metrics(file_name: &str, record: &RawResultRecord) -> Option<DerivedMetrics> {
    record.as_object()?;
    match RecordKind::from_file_name(file_name) {
        RecordKind::Confidence => Some(DerivedMetrics::Confidence(derive_confidence_metrics(
            record,
        ))),
        RecordKind::Affinity => Some(DerivedMetrics::Affinity(derive_affinity_metrics(record))),
        RecordKind::Other => None,
    }
}

/// Derives metrics for every record in a collection keyed by file name.
pub fn derive_all<'a, I>(records: I) -> BTreeMap<String, DerivedMetrics>
where
    I: IntoIterator<Item = (&'a String, &'a RawResultRecord)>,
{
    records
        .into_iter()
        .filter_map(|(name, record)| derive_metrics(name, record).map(|m| (name.clone(), m)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn derive_metrics_dispatches_on_file_name() {
        let confidence = RawResultRecord::new(json!({"ptm": 0.8, "iptm": 0.6}));
        let affinity = RawResultRecord::new(json!({"affinity_pred_value": 0.0}));

        assert!(matches!(
            derive_metrics("confidence_job_model_0.json", &confidence),
            Some(DerivedMetrics::Confidence(_))
        ));
        assert!(matches!(
            derive_metrics("affinity_job.json", &affinity),
            Some(DerivedMetrics::Affinity(_))
        ));
        assert_eq!(derive_metrics("manifest.json", &confidence), None);
    }

    #[test]
    fn non_object_records_are_skipped() {
        let record = RawResultRecord::new(json!([1, 2, 3]));
        assert_eq!(derive_metrics("confidence_job_model_0.json", &record), None);
    }

    #[test]
    fn derive_all_keeps_only_recognised_records() {
        let mut records = BTreeMap::new();
        records.insert(
            "confidence_a_model_0.json".to_string(),
            RawResultRecord::new(json!({"ptm": 0.5})),
        );
        records.insert(
            "manifest.json".to_string(),
            RawResultRecord::new(json!({"records": []})),
        );

        let derived = derive_all(&records);

        assert_eq!(derived.len(), 1);
        assert!(derived.contains_key("confidence_a_model_0.json"));
    }
}
