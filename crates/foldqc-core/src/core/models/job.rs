use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// The molecule type of one polymer chain in a prediction job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MoleculeType {
    Protein,
    Dna,
    Rna,
}

impl fmt::Display for MoleculeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MoleculeType::Protein => "protein",
            MoleculeType::Dna => "dna",
            MoleculeType::Rna => "rna",
        };
        f.write_str(name)
    }
}

/// The structure file format the predictor should write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Mmcif,
    Pdb,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Mmcif => "mmcif",
            OutputFormat::Pdb => "pdb",
        }
    }
}

/// A named polymer chain: chain identifier, molecule type and sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polymer {
    pub id: String,
    pub molecule_type: MoleculeType,
    pub sequence: String,
}

impl Polymer {
    pub fn new(id: impl Into<String>, molecule_type: MoleculeType, sequence: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            molecule_type,
            sequence: sequence.into(),
        }
    }
}

/// Sampling and recycling parameters for a single prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunOptions {
    pub recycling_steps: u32,
    pub sampling_steps: u32,
    pub diffusion_samples: u32,
    pub step_scale: f64,
    pub output_format: OutputFormat,
    /// Per-job override of the runner's MSA server setting.
    pub use_msa_server: Option<bool>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            recycling_steps: 3,
            sampling_steps: 50,
            diffusion_samples: 1,
            step_scale: 1.638,
            output_format: OutputFormat::Mmcif,
            use_msa_server: None,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum JobError {
    #[error("Job name must not be empty")]
    EmptyName,
    #[error("Job name '{0}' must be a single path segment")]
    InvalidName(String),
    #[error("Job '{0}' defines no polymer chains")]
    NoPolymers(String),
    #[error("Chain '{chain}' appears more than once in job '{job}'")]
    DuplicateChain { job: String, chain: String },
    #[error("Chain '{chain}' in job '{job}' has an empty sequence")]
    EmptySequence { job: String, chain: String },
    #[error("Job '{job}' has invalid run option: {reason}")]
    InvalidOption { job: String, reason: String },
}

/// One unit of prediction work.
///
/// The job name doubles as the name of the output subdirectory the predictor
/// writes into, so it has to be a single, non-empty path segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionJob {
    pub name: String,
    pub polymers: Vec<Polymer>,
    #[serde(default)]
    pub options: RunOptions,
}

impl PredictionJob {
    pub fn new(name: impl Into<String>, polymers: Vec<Polymer>) -> Self {
        Self {
            name: name.into(),
            polymers,
            options: RunOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    pub fn validate(&self) -> Result<(), JobError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(JobError::EmptyName);
        }
        if name != self.name || name.contains(['/', '\\']) || name == "." || name == ".." {
            return Err(JobError::InvalidName(self.name.clone()));
        }
        if self.polymers.is_empty() {
            return Err(JobError::NoPolymers(self.name.clone()));
        }

        let mut seen = HashSet::new();
        for polymer in &self.polymers {
            if !seen.insert(polymer.id.as_str()) {
                return Err(JobError::DuplicateChain {
                    job: self.name.clone(),
                    chain: polymer.id.clone(),
                });
            }
            if polymer.sequence.trim().is_empty() {
                return Err(JobError::EmptySequence {
                    job: self.name.clone(),
                    chain: polymer.id.clone(),
                });
            }
        }

        if self.options.diffusion_samples == 0 {
            return Err(JobError::InvalidOption {
                job: self.name.clone(),
                reason: "diffusion_samples must be at least 1".to_string(),
            });
        }
        if !self.options.step_scale.is_finite() || self.options.step_scale <= 0.0 {
            return Err(JobError::InvalidOption {
                job: self.name.clone(),
                reason: format!("step_scale must be positive, got {}", self.options.step_scale),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn her2_job() -> PredictionJob {
        PredictionJob::new(
            "WT_trastuzumab",
            vec![
                Polymer::new("A", MoleculeType::Protein, "MELAALCRWGLLLALLPPGAAS"),
                Polymer::new("B", MoleculeType::Protein, "EVQLVESGGGLVQPGGSLRLSC"),
            ],
        )
    }

    #[test]
    fn valid_job_passes_validation() {
        assert_eq!(her2_job().validate(), Ok(()));
    }

    #[test]
    fn empty_or_path_like_names_are_rejected() {
        let mut job = her2_job();
        job.name = "  ".to_string();
        assert_eq!(job.validate(), Err(JobError::EmptyName));

        job.name = "runs/WT".to_string();
        assert!(matches!(job.validate(), Err(JobError::InvalidName(_))));

        job.name = "..".to_string();
        assert!(matches!(job.validate(), Err(JobError::InvalidName(_))));
    }

    #[test]
    fn duplicate_chain_ids_are_rejected() {
        let mut job = her2_job();
        job.polymers[1].id = "A".to_string();
        assert_eq!(
            job.validate(),
            Err(JobError::DuplicateChain {
                job: "WT_trastuzumab".to_string(),
                chain: "A".to_string()
            })
        );
    }

    #[test]
    fn empty_sequence_and_zero_samples_are_rejected() {
        let mut job = her2_job();
        job.polymers[0].sequence = String::new();
        assert!(matches!(job.validate(), Err(JobError::EmptySequence { .. })));

        let job = her2_job().with_options(RunOptions {
            diffusion_samples: 0,
            ..RunOptions::default()
        });
        assert!(matches!(job.validate(), Err(JobError::InvalidOption { .. })));
    }

    #[test]
    fn options_default_when_absent_from_serialized_job() {
        let json = r#"{
            "name": "D16_trastuzumab",
            "polymers": [{"id": "A", "molecule_type": "protein", "sequence": "MKT"}]
        }"#;
        let job: PredictionJob = serde_json::from_str(json).unwrap();
        assert_eq!(job.options, RunOptions::default());
        assert_eq!(job.polymers[0].molecule_type, MoleculeType::Protein);
    }
}
