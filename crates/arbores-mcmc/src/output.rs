use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use arbores_arg::{MrcaSnapshot, PathState};
use arbores_core::errors::ArgError;
use serde::Serialize;
use tracing::warn;

use crate::config::OutputConfig;

/// Write-only collaborator receiving the per-sweep logs.
///
/// Writes are fire-and-forget: implementations report their own failures
/// and never stop the chain.
pub trait ChainSink {
    /// Discards logs left over from a previous run.
    fn reset(&mut self) {}
    /// Appends a path record.
    fn write_path(&mut self, iteration: usize, path: &PathState);
    /// Appends an MRCA record for completed sweep `full_scan`.
    fn write_mrca(&mut self, iteration: usize, full_scan: usize, snapshot: &MrcaSnapshot);
    /// Replaces the stored highest-posterior path.
    fn write_map(&mut self, iteration: usize, log_posterior: f64, path: &PathState);
}

/// Sink that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ChainSink for NullSink {
    fn write_path(&mut self, _iteration: usize, _path: &PathState) {}

    fn write_mrca(&mut self, _iteration: usize, _full_scan: usize, _snapshot: &MrcaSnapshot) {}

    fn write_map(&mut self, _iteration: usize, _log_posterior: f64, _path: &PathState) {}
}

#[derive(Serialize)]
struct PathRecord<'a> {
    iteration: usize,
    path: &'a PathState,
}

#[derive(Serialize)]
struct MrcaRecord<'a> {
    iteration: usize,
    full_scan: usize,
    mean: f64,
    intervals: &'a [arbores_arg::MrcaInterval],
}

#[derive(Serialize)]
struct MapRecord<'a> {
    iteration: usize,
    log_posterior: f64,
    path: &'a PathState,
}

/// JSON-lines logs inside a run directory.
#[derive(Debug, Clone)]
pub struct RunDirectory {
    mrca_log: PathBuf,
    chain_log: PathBuf,
    map_file: PathBuf,
}

impl RunDirectory {
    /// Creates `root` if needed and resolves the log files inside it.
    pub fn create(root: &Path, layout: &OutputConfig) -> Result<Self, ArgError> {
        fs::create_dir_all(root).map_err(|err| ArgError::io("run-dir-mkdir", err, root.display()))?;
        Ok(Self {
            mrca_log: root.join(&layout.mrca_log),
            chain_log: root.join(&layout.chain_log),
            map_file: root.join(&layout.map_file),
        })
    }

    fn append<T: Serialize>(path: &Path, record: &T) {
        let result = serde_json::to_string(record)
            .map_err(io::Error::from)
            .and_then(|line| {
                let mut file = OpenOptions::new().create(true).append(true).open(path)?;
                writeln!(file, "{line}")
            });
        if let Err(err) = result {
            warn!(path = %path.display(), error = %err, "log append failed");
        }
    }
}

impl ChainSink for RunDirectory {
    fn reset(&mut self) {
        for path in [&self.mrca_log, &self.chain_log, &self.map_file] {
            match fs::remove_file(path) {
                Ok(()) => {}
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => warn!(path = %path.display(), error = %err, "stale log not removed"),
            }
        }
    }

    fn write_path(&mut self, iteration: usize, path: &PathState) {
        Self::append(&self.chain_log, &PathRecord { iteration, path });
    }

    fn write_mrca(&mut self, iteration: usize, full_scan: usize, snapshot: &MrcaSnapshot) {
        Self::append(
            &self.mrca_log,
            &MrcaRecord {
                iteration,
                full_scan,
                mean: snapshot.mean,
                intervals: &snapshot.intervals,
            },
        );
    }

    fn write_map(&mut self, iteration: usize, log_posterior: f64, path: &PathState) {
        let result = serde_json::to_string_pretty(&MapRecord {
            iteration,
            log_posterior,
            path,
        })
        .map_err(io::Error::from)
        .and_then(|json| fs::write(&self.map_file, json));
        if let Err(err) = result {
            warn!(path = %self.map_file.display(), error = %err, "MAP path not written");
        }
    }
}
