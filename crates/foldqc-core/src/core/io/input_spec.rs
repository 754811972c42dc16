use crate::core::models::job::{OutputFormat, Polymer, PredictionJob};
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;

const TEMP_PREFIX: &str = "foldqc-input-";
const TEMP_SUFFIX: &str = ".yaml";

/// The document handed to the predictor for one job.
///
/// It is serialized as JSON, which is a subset of the YAML the predictor
/// reads.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputSpecification<'a> {
    pub polymers: &'a [Polymer],
    pub recycling_steps: u32,
    pub sampling_steps: u32,
    pub diffusion_samples: u32,
    pub step_scale: f64,
    pub output_format: OutputFormat,
}

impl<'a> InputSpecification<'a> {
    pub fn from_job(job: &'a PredictionJob) -> Self {
        Self {
            polymers: &job.polymers,
            recycling_steps: job.options.recycling_steps,
            sampling_steps: job.options.sampling_steps,
            diffusion_samples: job.options.diffusion_samples,
            step_scale: job.options.step_scale,
            output_format: job.options.output_format,
        }
    }

    pub fn write_to(&self, writer: &mut impl Write) -> io::Result<()> {
        serde_json::to_writer_pretty(&mut *writer, self).map_err(io::Error::other)?;
        writeln!(writer)
    }

    /// Writes the specification to a new temporary file.
    ///
    /// The file lives in `scratch_dir` (or the system temporary directory) and
    /// is deleted when the returned handle is dropped.
    pub fn write_temp(&self, scratch_dir: Option<&Path>) -> io::Result<NamedTempFile> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(TEMP_PREFIX).suffix(TEMP_SUFFIX);
        let mut file = match scratch_dir {
            Some(dir) => builder.tempfile_in(dir)?,
            None => builder.tempfile()?,
        };
        self.write_to(file.as_file_mut())?;
        file.as_file_mut().flush()?;
        Ok(file)
    }
}
