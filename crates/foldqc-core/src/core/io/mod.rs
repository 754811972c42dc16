//! File-format and filesystem utilities.
//!
//! This module contains the predictor input specification writer, the
//! conventions of the predictor's output tree, a lazy recursive file walker,
//! and writers for QC reports, resubmission plans and tabular exports.

pub mod input_spec;
pub mod layout;
pub mod report;
pub mod table;
pub mod walk;
