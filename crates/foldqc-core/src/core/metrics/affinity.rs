//! Binding-affinity quantities derived from a predicted `log10(IC50 / µM)`.
//!
//! The conversions follow the predictor's documented conventions and are kept
//! exactly as published:
//!
//! - `ΔG = (6 - log10(IC50 / µM)) * 1.364` kcal/mol
//! - `Kd ≈ IC50 / 2` (competitive-inhibitor approximation)
//!
//! p-scale values are taken in molar units. A non-positive concentration
//! (for instance after `10^x` underflows to zero) gives a p-scale value of `0`.

use crate::core::models::record::{AFFINITY_PROBABILITY_KEYS, AFFINITY_VALUE_KEYS, RawResultRecord};
use serde::Serialize;

const NANOMOLAR_PER_MICROMOLAR: f64 = 1_000.0;
const MOLAR_PER_MICROMOLAR: f64 = 1e-6;
const DELTA_G_REFERENCE_LOG: f64 = 6.0;
const DELTA_G_KCAL_PER_LOG_UNIT: f64 = 1.364;
const KD_FROM_IC50_DIVISOR: f64 = 2.0;

/// The full affinity quantity set for one affinity record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AffinityMetrics {
    /// The raw `affinity_pred_value`, i.e. `log10(IC50 / µM)`.
    pub log_ic50_um: f64,
    pub ic50_um: f64,
    pub ic50_nm: f64,
    pub ic50_m: f64,
    pub pic50: f64,
    pub kd_um: f64,
    pub kd_nm: f64,
    pub kd_m: f64,
    pub pkd: f64,
    pub delta_g_kcal: f64,
    /// The raw `affinity_probability_binary`.
    pub binding_probability: f64,
}

fn p_scale(molar: f64) -> f64 {
    if molar > 0.0 { -molar.log10() } else { 0.0 }
}

impl AffinityMetrics {
    pub fn from_prediction(log_ic50_um: f64, binding_probability: f64) -> Self {
        let ic50_um = 10f64.powf(log_ic50_um);
        let ic50_nm = ic50_um * NANOMOLAR_PER_MICROMOLAR;
        let ic50_m = ic50_um * MOLAR_PER_MICROMOLAR;

        let kd_um = ic50_um / KD_FROM_IC50_DIVISOR;
        let kd_nm = kd_um * NANOMOLAR_PER_MICROMOLAR;
        let kd_m = kd_um * MOLAR_PER_MICROMOLAR;

        Self {
            log_ic50_um,
            ic50_um,
            ic50_nm,
            ic50_m,
            pic50: p_scale(ic50_m),
            kd_um,
            kd_nm,
            kd_m,
            pkd: p_scale(kd_m),
            delta_g_kcal: (DELTA_G_REFERENCE_LOG - log_ic50_um) * DELTA_G_KCAL_PER_LOG_UNIT,
            binding_probability,
        }
    }
}

/// Derives the affinity quantity set from an affinity record.
///
/// Missing or non-numeric `affinity_pred_value` and
/// `affinity_probability_binary` fields are read as `0`.
pub fn derive_affinity_metrics(record: &RawResultRecord) -> AffinityMetrics {
    AffinityMetrics::from_prediction(
        record.score_or_zero(&AFFINITY_VALUE_KEYS),
        record.score_or_zero(&AFFINITY_PROBABILITY_KEYS),
    )
}
