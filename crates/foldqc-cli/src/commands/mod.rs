pub mod metrics;
pub mod predict;
pub mod qc;
pub mod scan;

use crate::error::Result;
use anyhow::Context;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// How a command that ran to completion ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    /// QC found too few passing predictions.
    Insufficient,
    /// The predictor run failed.
    Failed,
}

impl Outcome {
    pub fn exit_code(self) -> i32 {
        match self {
            Outcome::Completed => 0,
            Outcome::Insufficient | Outcome::Failed => 1,
        }
    }
}

const STDOUT_PATH: &str = "-";

/// Opens `path` for writing, or standard output when no path or `-` is given.
pub(crate) fn output_writer(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path.filter(|p| p.as_os_str() != STDOUT_PATH) {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file {}", path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(io::stdout().lock())),
    }
}
