//! # Core Module
//!
//! Fundamental building blocks shared by the engine and the workflows.
//!
//! ## Architecture
//!
//! - **Job and Record Models** ([`models`]) - Prediction jobs, polymer chains and raw
//!   predictor output records
//! - **Metric Derivation** ([`metrics`]) - Pure conversions from raw records into
//!   confidence and affinity quantities, plus batch score statistics
//! - **File I/O** ([`io`]) - Predictor input specification, output tree conventions,
//!   QC reports and tabular exports
//!
//! Nothing in this layer spawns processes or holds state between calls.

pub mod io;
pub mod metrics;
pub mod models;
