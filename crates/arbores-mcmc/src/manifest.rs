use std::fs;
use std::path::{Path, PathBuf};

use arbores_core::errors::{ArgError, ErrorInfo};
use arbores_core::provenance::{RunProvenance, SchemaVersion};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::config::RunConfig;
use crate::metrics::MoveTally;

/// Summary returned to callers after a run completes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunSummary {
    /// Entries recorded, equal to the chain length unless the run failed.
    pub iterations: usize,
    /// Completed sweeps over all segments.
    pub full_scan_count: usize,
    /// Number of bridge segments.
    pub segment_count: usize,
    /// Proposed/accepted counts per move kind, in first-seen order.
    pub move_counts: IndexMap<String, MoveTally>,
    /// Acceptance rate per move kind.
    pub acceptance_rates: IndexMap<String, f64>,
    /// Sites promoted to segregating status at initialisation.
    pub augmented_sites: Vec<usize>,
    /// Canonical hash of the initial path.
    pub initial_path_hash: String,
    /// Canonical hash of the last recorded path.
    pub final_path_hash: String,
    /// Log posterior of the last recorded entry.
    pub final_log_posterior: f64,
    /// Iteration of the highest-posterior entry seen at a full scan.
    pub map_iteration: Option<usize>,
    /// Its log posterior.
    pub map_log_posterior: Option<f64>,
}

impl RunSummary {
    /// Writes the summary as pretty JSON.
    pub fn write(&self, path: &Path) -> Result<(), ArgError> {
        write_json(self, path, "summary")
    }
}

/// Structured manifest describing a completed run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunManifest {
    /// Schema of this manifest.
    pub schema: SchemaVersion,
    /// Configuration used for the run.
    pub config: RunConfig,
    /// Data set, seed, initial path and creation time.
    pub provenance: RunProvenance,
    /// Canonical hash of the last recorded path.
    pub final_path_hash: String,
    /// Files written by the run, relative to the run directory.
    pub files: Vec<PathBuf>,
}

impl RunManifest {
    /// Writes the manifest to a JSON file.
    pub fn write(&self, path: &Path) -> Result<(), ArgError> {
        write_json(self, path, "manifest")
    }

    /// Loads a manifest from disk.
    pub fn load(path: &Path) -> Result<Self, ArgError> {
        let contents = fs::read_to_string(path)
            .map_err(|err| ArgError::io("manifest-read", err, path.display()))?;
        serde_json::from_str(&contents).map_err(|err| {
            ArgError::Serde(
                ErrorInfo::new("manifest-parse", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })
    }
}

fn write_json<T: Serialize>(value: &T, path: &Path, what: &str) -> Result<(), ArgError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|err| ArgError::io(&format!("{what}-mkdir"), err, parent.display()))?;
    }
    let json = serde_json::to_string_pretty(value).map_err(|err| {
        ArgError::Serde(
            ErrorInfo::new(format!("{what}-serialize"), err.to_string())
                .with_context("path", path.display().to_string()),
        )
    })?;
    fs::write(path, json).map_err(|err| ArgError::io(&format!("{what}-write"), err, path.display()))
}
