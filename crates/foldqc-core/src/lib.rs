//! # foldqc Core Library
//!
//! A library for orchestrating structure-prediction jobs and gating batches of
//! predictions on model confidence.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`PredictionJob`,
//!   `RawResultRecord`), the pure metric derivations (`confidence`, `affinity`)
//!   and file-format utilities (input specification, output layout, reports).
//!
//! - **[`engine`]: The Logic Core.** Configuration, error types and the
//!   components with real control flow: the `PredictionRunner` subprocess
//!   boundary, the `ResultScanner`, the `QcGate` and the `ResubmissionAdvisor`.
//!
//! - **[`workflows`]: The Public API.** End-to-end procedures that tie the
//!   `engine` and `core` together: running one prediction and deriving its
//!   metrics, and the scan/classify/advise QC pipeline.

pub mod core;
pub mod engine;
pub mod workflows;
