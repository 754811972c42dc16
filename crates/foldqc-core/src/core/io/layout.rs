//! Naming conventions of the predictor's output tree.
//!
//! ```text
//! <output_root>/<job_name>/<results_prefix><input_stem>/**/{*.pdb,*.cif,*.json}
//! ```
//!
//! Confidence records are JSON files whose name starts with `confidence_`.

use phf::{Map, phf_map};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const DEFAULT_RESULTS_PREFIX: &str = "boltz_results_";
pub const CONFIDENCE_FILE_PREFIX: &str = "confidence_";
pub const JSON_EXTENSION: &str = "json";

/// The output file categories collected from a results directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileCategory {
    Pdb,
    Cif,
    Json,
}

static EXTENSION_CATEGORIES: Map<&'static str, FileCategory> = phf_map! {
    "pdb" => FileCategory::Pdb,
    "cif" => FileCategory::Cif,
    "json" => FileCategory::Json,
};

impl FileCategory {
    /// Returns the category of `path` from its (case-sensitive) extension.
    pub fn of(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        EXTENSION_CATEGORIES.get(ext).copied()
    }
}

/// Output files grouped by category, each list sorted by path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CollectedFiles {
    pub pdb: Vec<PathBuf>,
    pub cif: Vec<PathBuf>,
    pub json: Vec<PathBuf>,
}

impl CollectedFiles {
    pub fn push(&mut self, category: FileCategory, path: PathBuf) {
        match category {
            FileCategory::Pdb => self.pdb.push(path),
            FileCategory::Cif => self.cif.push(path),
            FileCategory::Json => self.json.push(path),
        }
    }

    pub fn sort(&mut self) {
        self.pdb.sort();
        self.cif.sort();
        self.json.sort();
    }

    pub fn structure_count(&self) -> usize {
        self.pdb.len() + self.cif.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pdb.is_empty() && self.cif.is_empty() && self.json.is_empty()
    }
}

pub fn job_output_dir(output_root: &Path, job_name: &str) -> PathBuf {
    output_root.join(job_name)
}

pub fn is_confidence_record(path: &Path) -> bool {
    let is_json = path.extension().and_then(|e| e.to_str()) == Some(JSON_EXTENSION);
    let named = path
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.starts_with(CONFIDENCE_FILE_PREFIX));
    is_json && named
}

/// Lists the results subdirectories directly under a job output directory,
/// sorted by path. A missing job directory yields an empty list.
pub fn find_results_dirs(job_dir: &Path, prefix: &str) -> io::Result<Vec<PathBuf>> {
    if !job_dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut dirs = Vec::new();
    for entry in fs::read_dir(job_dir)? {
        let entry = entry?;
        let matches_prefix = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with(prefix));
        if matches_prefix && entry.path().is_dir() {
            dirs.push(entry.path());
        }
    }
    dirs.sort();
    Ok(dirs)
}
