//! # Engine Module
//!
//! The stateful and effectful parts of foldqc: invoking the external
//! predictor, discovering confidence records on disk, and judging them.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Runner, QC and advisor settings with validating builders
//! - **Error Handling** ([`error`]) - Engine-level error type
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress events
//! - **Prediction Runner** ([`runner`]) - Subprocess boundary that always returns a structured result
//! - **Result Scanner** ([`scanner`]) - Lazy, restartable discovery of confidence records
//! - **QC Gate** ([`gate`]) - Pass/fail classification and the aggregate verdict
//! - **Resubmission Advisor** ([`advisor`]) - Remediation suggestions for insufficient batches
//!
//! Data flows `runner` → output tree → `scanner` → `gate` → `advisor`. None of
//! these components keep state across calls.

pub mod advisor;
pub mod config;
pub mod error;
pub mod gate;
pub(crate) mod process;
pub mod progress;
pub mod runner;
pub mod scanner;
