use super::error::EngineError;
use crate::core::io::layout::is_confidence_record;
use crate::core::io::walk::FileWalker;
use crate::core::models::qc::ScoredRecord;
use crate::core::models::record::{IPTM_KEYS, PTM_KEYS, RawResultRecord};
use std::fs;
use std::path::{Path, PathBuf};
use std::vec;
use tracing::{debug, warn};

/// Discovers confidence records below a results root.
///
/// A scanner holds no state between calls: every [`scan`](Self::scan) walks
/// the tree again, so re-scanning an unchanged tree yields the same records in
/// the same order.
#[derive(Debug, Clone)]
pub struct ResultScanner {
    root: PathBuf,
    job_filter: Option<String>,
}

impl ResultScanner {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            job_filter: None,
        }
    }

    pub fn with_job_filter(mut self, job_name: Option<String>) -> Self {
        self.job_filter = job_name.filter(|name| !name.is_empty());
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn job_filter(&self) -> Option<&str> {
        self.job_filter.as_deref()
    }

    /// A path matches the filter if the job name is one of its segments or a
    /// substring of the whole path.
    fn matches_filter(&self, path: &Path) -> bool {
        let Some(job) = self.job_filter.as_deref() else {
            return true;
        };
        path.iter().any(|segment| segment == job) || path.to_string_lossy().contains(job)
    }

    /// Lists the matching confidence record paths, sorted.
    pub fn discover(&self) -> Result<Vec<PathBuf>, EngineError> {
        if !self.root.is_dir() {
            return Err(EngineError::ResultsRootNotFound(self.root.clone()));
        }
        let walker = FileWalker::new(&self.root).map_err(|e| EngineError::io(&self.root, e))?;

        let mut paths: Vec<PathBuf> = walker
            .filter_map(|entry| match entry {
                Ok(path) => Some(path),
                Err(e) => {
                    warn!("Skipping unreadable entry {:?}: {}", e.path, e.source);
                    None
                }
            })
            .filter(|path| is_confidence_record(path) && self.matches_filter(path))
            .collect();
        paths.sort();
        debug!("Discovered {} confidence record(s) under {:?}", paths.len(), self.root);
        Ok(paths)
    }

    /// Discovers the matching records and returns a lazy sequence that reads
    /// each one as it is consumed.
    pub fn scan(&self) -> Result<ConfidenceScan, EngineError> {
        Ok(ConfidenceScan {
            paths: self.discover()?.into_iter(),
        })
    }
}

/// Reads one confidence record. Unreadable or malformed files yield a record
/// with both scores absent.
pub fn read_scored_record(path: PathBuf) -> ScoredRecord {
    let record = match fs::read_to_string(&path) {
        Ok(text) => RawResultRecord::parse(&text),
        Err(e) => {
            warn!("Failed to read {:?}: {}", path, e);
            return ScoredRecord::unreadable(path);
        }
    };
    match record {
        Ok(record) => {
            let ptm = record.lookup(&PTM_KEYS).cloned();
            let iptm = record.lookup(&IPTM_KEYS).cloned();
            if ptm.is_none() || iptm.is_none() {
                debug!("{:?} lacks a recognised ptm or iptm key", path);
            }
            ScoredRecord::new(path, ptm, iptm)
        }
        Err(e) => {
            warn!("Failed to parse {:?}: {}", path, e);
            ScoredRecord::unreadable(path)
        }
    }
}

/// A finite, ordered sequence of scored records; each file is read on demand.
#[derive(Debug)]
pub struct ConfidenceScan {
    paths: vec::IntoIter<PathBuf>,
}

impl ConfidenceScan {
    pub fn remaining(&self) -> usize {
        self.paths.len()
    }
}

impl Iterator for ConfidenceScan {
    type Item = ScoredRecord;

    fn next(&mut self) -> Option<Self::Item> {
        self.paths.next().map(read_scored_record)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.paths.size_hint()
    }
}

impl ExactSizeIterator for ConfidenceScan {}
