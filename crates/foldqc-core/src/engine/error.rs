use super::config::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Results directory does not exist: {}", .0.display())]
    ResultsRootNotFound(PathBuf),

    #[error("No confidence_*.json files found under {} (job filter: {})", root.display(), job_filter.as_deref().unwrap_or("None"))]
    NoConfidenceRecords {
        root: PathBuf,
        job_filter: Option<String>,
    },

    #[error("I/O error for '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl EngineError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        EngineError::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether the error stems from the caller's configuration or inputs
    /// rather than from a fault during processing.
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            EngineError::Config(_)
                | EngineError::ResultsRootNotFound(_)
                | EngineError::NoConfidenceRecords { .. }
        )
    }
}
