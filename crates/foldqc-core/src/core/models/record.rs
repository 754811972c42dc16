use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Name of the nested object some predictors use to group their scores.
const NESTED_METRICS_KEY: &str = "metrics";

/// An ordered set of key synonyms for one logical score field.
///
/// Lookup order is: `primary` keys at the top level, then `secondary` keys at
/// the top level, then `primary` keys inside a nested `metrics` object. Among
/// the primary keys the first one present decides; if its value is `null` the
/// lookup moves on. Among the secondary keys the first non-null value wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyLookup {
    pub field: &'static str,
    pub primary: &'static [&'static str],
    pub secondary: &'static [&'static str],
}

pub const PTM_KEYS: KeyLookup = KeyLookup {
    field: "ptm",
    primary: &["ptm", "pTM", "ptm_score"],
    secondary: &["complex_ptm", "complex_ptm_score"],
};

pub const IPTM_KEYS: KeyLookup = KeyLookup {
    field: "iptm",
    primary: &["iptm", "iPTM", "iptm_score"],
    secondary: &["complex_iptm", "complex_iplddt"],
};

pub const CONFIDENCE_SCORE_KEYS: KeyLookup = KeyLookup {
    field: "confidence_score",
    primary: &["confidence_score"],
    secondary: &[],
};

pub const PLDDT_KEYS: KeyLookup = KeyLookup {
    field: "plddt",
    primary: &["complex_plddt"],
    secondary: &["plddt"],
};

pub const AFFINITY_VALUE_KEYS: KeyLookup = KeyLookup {
    field: "affinity_pred_value",
    primary: &["affinity_pred_value"],
    secondary: &[],
};

pub const AFFINITY_PROBABILITY_KEYS: KeyLookup = KeyLookup {
    field: "affinity_probability_binary",
    primary: &["affinity_probability_binary"],
    secondary: &[],
};

impl KeyLookup {
    fn first_present<'a>(keys: &[&str], object: &'a Map<String, Value>) -> Option<&'a Value> {
        keys.iter()
            .find_map(|key| object.get(*key))
            .filter(|value| !value.is_null())
    }

    fn first_non_null<'a>(keys: &[&str], object: &'a Map<String, Value>) -> Option<&'a Value> {
        keys.iter()
            .filter_map(|key| object.get(*key))
            .find(|value| !value.is_null())
    }

    pub fn resolve<'a>(&self, object: &'a Map<String, Value>) -> Option<&'a Value> {
        Self::first_present(self.primary, object)
            .or_else(|| Self::first_non_null(self.secondary, object))
            .or_else(|| {
                object
                    .get(NESTED_METRICS_KEY)
                    .and_then(Value::as_object)
                    .and_then(|nested| Self::first_present(self.primary, nested))
            })
    }
}

/// The kind of a predictor output record, decided from its file name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Confidence,
    Affinity,
    Other,
}

impl RecordKind {
    pub fn from_file_name(name: &str) -> Self {
        if name.contains("confidence") {
            RecordKind::Confidence
        } else if name.contains("affinity") {
            RecordKind::Affinity
        } else {
            RecordKind::Other
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordKind::Confidence => "confidence",
            RecordKind::Affinity => "affinity",
            RecordKind::Other => "other",
        };
        f.write_str(name)
    }
}

/// Converts a JSON value to a score, the way a lenient float conversion would.
///
/// Numbers convert directly and strings are parsed after trimming. Anything
/// else (booleans, null, arrays, objects) has no numeric reading.
pub fn coerce_score(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// The raw structured output of one predicted model, as loaded from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawResultRecord(Value);

impl RawResultRecord {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text).map(Self)
    }

    pub fn value(&self) -> &Value {
        &self.0
    }

    pub fn as_object(&self) -> Option<&Map<String, Value>> {
        self.0.as_object()
    }

    /// Returns the raw value of the first matching synonym, if any.
    pub fn lookup(&self, keys: &KeyLookup) -> Option<&Value> {
        self.as_object().and_then(|object| keys.resolve(object))
    }

    /// Returns the numeric reading of a field, if present and numeric.
    pub fn score(&self, keys: &KeyLookup) -> Option<f64> {
        self.lookup(keys).and_then(coerce_score)
    }

    /// Returns the numeric reading of a field, or `0.0` when it is absent or
    /// not numeric.
    pub fn score_or_zero(&self, keys: &KeyLookup) -> f64 {
        self.score(keys).unwrap_or(0.0)
    }
}

impl From<Value> for RawResultRecord {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn primary_synonyms_are_tried_in_order() {
        let record = RawResultRecord::new(json!({"pTM": 0.7, "ptm_score": 0.1}));
        assert_eq!(record.score(&PTM_KEYS), Some(0.7));

        let record = RawResultRecord::new(json!({"ptm": 0.2, "pTM": 0.7}));
        assert_eq!(record.score(&PTM_KEYS), Some(0.2));
    }

    #[test]
    fn secondary_synonyms_are_used_when_no_primary_key_exists() {
        let record = RawResultRecord::new(json!({"complex_iplddt": 0.81}));
        assert_eq!(record.score(&IPTM_KEYS), Some(0.81));
    }

    #[test]
    fn nested_metrics_object_is_searched_last() {
        let record = RawResultRecord::new(json!({"metrics": {"iptm": 0.44, "pTM": 0.66}}));
        assert_eq!(record.score(&IPTM_KEYS), Some(0.44));
        assert_eq!(record.score(&PTM_KEYS), Some(0.66));

        let record = RawResultRecord::new(json!({"complex_ptm": 0.5, "metrics": {"ptm": 0.9}}));
        assert_eq!(record.score(&PTM_KEYS), Some(0.5));
    }

    #[test]
    fn first_present_primary_key_decides() {
        let record = RawResultRecord::new(json!({"ptm": "n/a", "pTM": 0.9}));
        assert_eq!(record.lookup(&PTM_KEYS), Some(&json!("n/a")));
        assert_eq!(record.score(&PTM_KEYS), None);

        let record = RawResultRecord::new(json!({"ptm": null, "pTM": 0.9}));
        assert_eq!(record.lookup(&PTM_KEYS), None);
    }

    #[test]
    fn null_primary_falls_back_to_secondary_keys() {
        let record = RawResultRecord::new(json!({"ptm": null, "complex_ptm": 0.7}));
        assert_eq!(record.score(&PTM_KEYS), Some(0.7));

        let record = RawResultRecord::new(json!({
            "iptm": null,
            "complex_iptm": null,
            "complex_iplddt": 0.55
        }));
        assert_eq!(record.score(&IPTM_KEYS), Some(0.55));
    }

    #[test]
    fn non_object_records_resolve_nothing() {
        let record = RawResultRecord::new(json!([0.5, 0.6]));
        assert_eq!(record.lookup(&PTM_KEYS), None);
        assert_eq!(record.score_or_zero(&PTM_KEYS), 0.0);
    }

    #[test]
    fn coerce_score_accepts_numbers_and_numeric_strings_only() {
        assert_eq!(coerce_score(&json!(0.25)), Some(0.25));
        assert_eq!(coerce_score(&json!(1)), Some(1.0));
        assert_eq!(coerce_score(&json!(" 0.5 ")), Some(0.5));
        assert_eq!(coerce_score(&json!("high")), None);
        assert_eq!(coerce_score(&json!(true)), None);
        assert_eq!(coerce_score(&json!(null)), None);
    }

    #[test]
    fn record_kind_follows_file_name() {
        assert_eq!(
            RecordKind::from_file_name("confidence_job_model_0.json"),
            RecordKind::Confidence
        );
        assert_eq!(
            RecordKind::from_file_name("affinity_job.json"),
            RecordKind::Affinity
        );
        assert_eq!(RecordKind::from_file_name("manifest.json"), RecordKind::Other);
    }
}
