use std::fs;
use std::path::{Path, PathBuf};

use arbores_arg::Parameters;
use arbores_core::errors::{ArgError, ErrorInfo};
use serde::{Deserialize, Serialize};

/// YAML-configurable parameters governing one chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Capacity `N` of the chain, including the initial entry.
    #[serde(default = "default_chain_length")]
    pub chain_length: usize,
    /// Model parameters held fixed for the run.
    #[serde(default)]
    pub parameters: Parameters,
    /// Seed of the process-wide random source.
    #[serde(default)]
    pub seed: u64,
    /// Target number of segregating sites per bridge segment.
    #[serde(default = "default_bridge_length")]
    pub bridge_length: usize,
    /// Global jitter kernel settings.
    #[serde(default)]
    pub jitter: JitterConfig,
    /// Segment sampler settings.
    #[serde(default)]
    pub segment: SegmentConfig,
    /// When false, sweeps consist of jitter steps only.
    #[serde(default = "default_true")]
    pub segment_sampler_on: bool,
    /// Site count at which the confirmation gate is consulted.
    #[serde(default = "default_large_input_threshold")]
    pub large_input_threshold: usize,
    /// Iterations between two progress reports.
    #[serde(default = "default_progress_interval")]
    pub progress_interval: usize,
    /// Output layout.
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_chain_length() -> usize {
    1000
}

fn default_bridge_length() -> usize {
    4
}

fn default_true() -> bool {
    true
}

fn default_large_input_threshold() -> usize {
    30
}

fn default_progress_interval() -> usize {
    100
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            chain_length: default_chain_length(),
            parameters: Parameters::default(),
            seed: 0,
            bridge_length: default_bridge_length(),
            jitter: JitterConfig::default(),
            segment: SegmentConfig::default(),
            segment_sampler_on: true,
            large_input_threshold: default_large_input_threshold(),
            progress_interval: default_progress_interval(),
            output: OutputConfig::default(),
        }
    }
}

impl RunConfig {
    /// Reads a configuration from a YAML file.
    pub fn load(path: &Path) -> Result<Self, ArgError> {
        let text = fs::read_to_string(path)
            .map_err(|err| ArgError::io("config-read", err, path.display()))?;
        serde_yaml::from_str(&text).map_err(|err| {
            ArgError::Config(
                ErrorInfo::new("config-parse", err.to_string())
                    .with_context("path", path.display().to_string()),
            )
        })
    }

    /// Rejects configurations the sampler cannot run with.
    pub fn validate(&self) -> Result<(), ArgError> {
        if self.chain_length == 0 {
            return Err(invalid("chain_length", "the chain needs room for the initial entry"));
        }
        if self.bridge_length == 0 {
            return Err(invalid("bridge_length", "segments must span at least one site"));
        }
        let params = &self.parameters;
        for (field, value) in [
            ("parameters.mu", params.mu),
            ("parameters.rho", params.rho),
            ("parameters.n_eff", params.n_eff),
            ("jitter.step_size", self.jitter.step_size),
            ("segment.time_step", self.segment.time_step),
            ("segment.join_rate", self.segment.join_rate),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ArgError::Config(
                    ErrorInfo::new("invalid-config", "must be a positive finite number")
                        .with_context("field", field)
                        .with_context("value", value.to_string()),
                ));
            }
        }
        if self.jitter.steps == 0 && !self.segment_sampler_on {
            return Err(invalid(
                "jitter.steps",
                "a sweep without jitter steps or segment sampling never advances the chain",
            ));
        }
        Ok(())
    }
}

fn invalid(field: &str, message: &str) -> ArgError {
    ArgError::Config(ErrorInfo::new("invalid-config", message).with_context("field", field))
}

/// Jitter kernel settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JitterConfig {
    /// Metropolis-Hastings steps per sweep.
    #[serde(default = "default_jitter_steps")]
    pub steps: usize,
    /// Half-width of the uniform shift, in coalescent time units.
    #[serde(default = "default_step_size")]
    pub step_size: f64,
}

fn default_jitter_steps() -> usize {
    1
}

fn default_step_size() -> f64 {
    0.1
}

impl Default for JitterConfig {
    fn default() -> Self {
        Self {
            steps: default_jitter_steps(),
            step_size: default_step_size(),
        }
    }
}

/// Segment sampler settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentConfig {
    /// Half-width of the uniform shift used by retime moves.
    #[serde(default = "default_step_size")]
    pub time_step: f64,
    /// Rate of the exponential gap between cut and join times of inserted operations.
    #[serde(default = "default_join_rate")]
    pub join_rate: f64,
}

fn default_join_rate() -> f64 {
    1.0
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            time_step: default_step_size(),
            join_rate: default_join_rate(),
        }
    }
}

/// Output directory layout configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Root directory for run artefacts; nothing is written when unset.
    #[serde(default)]
    pub run_directory: Option<PathBuf>,
    /// Append-only MRCA log, one JSON record per full scan.
    #[serde(default = "default_mrca_log")]
    pub mrca_log: PathBuf,
    /// Append-only path log, one JSON record per full scan.
    #[serde(default = "default_chain_log")]
    pub chain_log: PathBuf,
    /// Highest-posterior path seen so far.
    #[serde(default = "default_map_file")]
    pub map_file: PathBuf,
    /// Per-iteration diagnostics.
    #[serde(default = "default_diagnostics_file")]
    pub diagnostics_file: PathBuf,
    /// Run summary.
    #[serde(default = "default_summary_file")]
    pub summary_file: PathBuf,
    /// Run manifest.
    #[serde(default = "default_manifest_file")]
    pub manifest_file: PathBuf,
}

fn default_mrca_log() -> PathBuf {
    PathBuf::from("mrca.jsonl")
}

fn default_chain_log() -> PathBuf {
    PathBuf::from("paths.jsonl")
}

fn default_map_file() -> PathBuf {
    PathBuf::from("map_path.json")
}

fn default_diagnostics_file() -> PathBuf {
    PathBuf::from("diagnostics.csv")
}

fn default_summary_file() -> PathBuf {
    PathBuf::from("summary.json")
}

fn default_manifest_file() -> PathBuf {
    PathBuf::from("manifest.json")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            run_directory: None,
            mrca_log: default_mrca_log(),
            chain_log: default_chain_log(),
            map_file: default_map_file(),
            diagnostics_file: default_diagnostics_file(),
            summary_file: default_summary_file(),
            manifest_file: default_manifest_file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn yaml_overlays_defaults() {
        let config: RunConfig = serde_yaml::from_str(
            "chain_length: 50\nparameters:\n  mu: 0.5\n  rho: 0.2\njitter:\n  steps: 3\n",
        )
        .unwrap();
        assert_eq!(config.chain_length, 50);
        assert_eq!(config.parameters.n_eff, 1.0);
        assert_eq!(config.jitter.steps, 3);
        assert_eq!(config.jitter.step_size, 0.1);
        assert_eq!(config.bridge_length, 4);
        assert!(config.segment_sampler_on);
        config.validate().unwrap();
    }

    #[test]
    fn zero_bridge_length_is_rejected() {
        let config = RunConfig {
            bridge_length: 0,
            ..RunConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert_eq!(err.info().context.get("field").map(String::as_str), Some("bridge_length"));
    }

    #[test]
    fn idle_sweeps_are_rejected() {
        let mut config = RunConfig::default();
        config.jitter.steps = 0;
        config.segment_sampler_on = false;
        assert!(config.validate().is_err());
    }
}
