//! Data models describing prediction jobs, the raw records a predictor emits,
//! and the records and verdicts produced by quality control.

pub mod job;
pub mod qc;
pub mod record;
