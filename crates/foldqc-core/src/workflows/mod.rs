//! # Workflows Module
//!
//! Top-level entry points of foldqc. Each workflow wires the `engine`
//! components together, reports progress, and returns a complete result.
//!
//! - **Prediction Workflow** ([`predict`]) - Run one job through the predictor and derive its metrics
//! - **QC Workflow** ([`qc`]) - Scan a results tree, classify the records, and advise on shortfalls

pub mod predict;
pub mod qc;
