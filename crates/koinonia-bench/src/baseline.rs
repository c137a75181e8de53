//! Baseline snapshots and their on-disk store.
//!
//! A baseline is a named, versioned, timestamped set of percentile summaries,
//! written once and never updated in place. Filenames embed the creation
//! instant in epoch milliseconds, so a lexicographic sort of filenames
//! sharing a name prefix yields creation order; `latest` relies on that
//! instead of a manifest file. Keeping the sort/filter logic behind this
//! store means a real index can replace it later without changing callers.

use crate::error::BenchError;
use crate::stats::PercentileSummary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Version written into baselines created without an explicit version.
pub const DEFAULT_VERSION: &str = "1.0.0";

/// Directory used when no storage path is configured.
pub const DEFAULT_BASELINE_DIR: &str = "benchmarks";

/// A named snapshot of percentile summaries, one per metric name seen during
/// the recording window that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    pub name: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
    pub metrics: BTreeMap<String, PercentileSummary>,
}

/// On-disk store for baseline files.
///
/// The directory is created lazily on first save. Reads against a directory
/// that does not yet exist behave as "no baselines" rather than failing.
#[derive(Debug, Clone)]
pub struct BaselineStore {
    dir: PathBuf,
}

impl Default for BaselineStore {
    fn default() -> Self {
        Self::new(DEFAULT_BASELINE_DIR)
    }
}

impl BaselineStore {
    /// Create a store rooted at the given directory.
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Storage directory for baseline files.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist a baseline as pretty-printed JSON and return the written path.
    ///
    /// Filename pattern: `{name}-v{version}-{epoch_millis}.json`. The embedded
    /// timestamp keeps repeated saves of the same name from overwriting each
    /// other.
    pub fn save(&self, baseline: &Baseline) -> Result<PathBuf, BenchError> {
        fs::create_dir_all(&self.dir)?;

        let filename = format!(
            "{}-v{}-{}.json",
            baseline.name,
            baseline.version,
            baseline.timestamp.timestamp_millis()
        );
        let path = self.dir.join(filename);

        let content = serde_json::to_string_pretty(baseline)?;
        fs::write(&path, content)?;

        Ok(path)
    }

    /// Load one baseline file by exact filename.
    ///
    /// Returns `Ok(None)` when the file does not exist — the normal outcome
    /// on a first run with no prior baseline. Malformed JSON propagates as an
    /// error.
    pub fn load(&self, filename: &str) -> Result<Option<Baseline>, BenchError> {
        let path = self.dir.join(filename);
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path)?;
        Ok(Some(serde_json::from_str(&content)?))
    }

    /// All baseline filenames in the store, sorted lexicographically.
    pub fn list(&self) -> Result<Vec<String>, BenchError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|s| s.to_str()) == Some("json")
                && let Some(name) = path.file_name().and_then(|s| s.to_str())
            {
                names.push(name.to_string());
            }
        }

        names.sort();
        Ok(names)
    }

    /// The most recently created baseline whose filename starts with `name`.
    ///
    /// Matching is by prefix, not exact name: a baseline named `main` also
    /// matches files for `main-extended`. Callers that need exact matching
    /// must pick distinct prefixes.
    pub fn latest(&self, name: &str) -> Result<Option<Baseline>, BenchError> {
        let matching: Vec<String> = self
            .list()?
            .into_iter()
            .filter(|f| f.starts_with(name))
            .collect();

        match matching.last() {
            Some(filename) => self.load(filename),
            None => Ok(None),
        }
    }
}
