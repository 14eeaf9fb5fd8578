use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use arbores_arg::{canonical_hash, initialise, times_to_mrca, GenomeData, PathState};
use arbores_core::errors::{ArgError, ErrorInfo};
use arbores_core::provenance::{RunProvenance, SchemaVersion};
use arbores_core::RngHandle;
use chrono::Utc;
use tracing::{debug, info, info_span, warn};

use crate::aggregate::{MapEntry, MapTracker, SweepAggregator};
use crate::bridge::BridgeSegmentation;
use crate::chain::ChainRecorder;
use crate::config::{OutputConfig, RunConfig};
use crate::diagnostics::{ChainEntry, Diagnostics};
use crate::gate::{AlwaysConfirm, ConfirmationGate, ProgressSink, TracingProgress};
use crate::jitter::JitterKernel;
use crate::kernel::{verify_committed, EvaluatedPath, Model};
use crate::manifest::{RunManifest, RunSummary};
use crate::metrics::{write_diagnostics_csv, AcceptanceTally};
use crate::output::{ChainSink, NullSink, RunDirectory};
use crate::segment::SegmentSampler;

/// Everything a run needs besides its data: configuration, the single random
/// source, and the injected collaborators.
pub struct RunContext {
    config: RunConfig,
    rng: RngHandle,
    sink: Box<dyn ChainSink>,
    gate: Box<dyn ConfirmationGate>,
    progress: Box<dyn ProgressSink>,
}

impl RunContext {
    /// Validates `config` and sets up the default collaborators: JSON-lines
    /// logs when a run directory is configured, an always-confirm gate and
    /// tracing progress.
    pub fn new(config: RunConfig) -> Result<Self, ArgError> {
        config.validate()?;
        let sink: Box<dyn ChainSink> = match &config.output.run_directory {
            Some(root) => Box::new(RunDirectory::create(root, &config.output)?),
            None => Box::new(NullSink),
        };
        Ok(Self {
            rng: RngHandle::from_seed(config.seed),
            progress: Box::new(TracingProgress::new(config.progress_interval)),
            gate: Box::new(AlwaysConfirm),
            sink,
            config,
        })
    }

    /// Replaces the log collaborator.
    pub fn with_sink(mut self, sink: impl ChainSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    /// Replaces the large-input confirmation strategy.
    pub fn with_gate(mut self, gate: impl ConfirmationGate + 'static) -> Self {
        self.gate = Box::new(gate);
        self
    }

    /// Replaces the progress reporter.
    pub fn with_progress(mut self, progress: impl ProgressSink + 'static) -> Self {
        self.progress = Box::new(progress);
        self
    }

    /// Configuration of the run.
    pub fn config(&self) -> &RunConfig {
        &self.config
    }
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Every recorded entry.
    pub chain: ChainRecorder,
    /// Data after augmentation.
    pub data: GenomeData,
    /// Segmentation used by the segment sampler.
    pub segmentation: BridgeSegmentation,
    /// Highest-posterior entry seen at a full scan.
    pub map: Option<MapEntry>,
    /// Aggregate statistics.
    pub summary: RunSummary,
}

/// Runs the chain until it holds `chain_length` entries.
///
/// With `initial` set, the given path replaces initialisation; it must be
/// complete and compatible with `data`.
pub fn run(
    ctx: &mut RunContext,
    data: GenomeData,
    initial: Option<PathState>,
) -> Result<RunOutcome, ArgError> {
    let config = ctx.config.clone();
    config.validate()?;
    let span = info_span!("chain", data = data.name(), length = config.chain_length, seed = config.seed);
    let _guard = span.enter();

    confirm_input_size(ctx, &data, config.large_input_threshold)?;

    let path = match initial {
        Some(path) => {
            path.check_complete()
                .and_then(|_| path.check_compatible(&data))
                .map_err(|violation| {
                    ArgError::Path(
                        ErrorInfo::new("initial-path-invalid", violation.to_string())
                            .with_hint("initial paths must be complete and explain every polymorphic site"),
                    )
                })?;
            path
        }
        None => initialise(&data, &config.parameters)?,
    };
    let data = data.augment_with_non_segregating_sites(&path);
    let segmentation = BridgeSegmentation::segment(&path, &data, config.bridge_length)?;
    verify_committed(&path, &data, "init")?;

    let model = Model {
        data: &data,
        params: &config.parameters,
    };
    let mut current =
        EvaluatedPath::evaluate(path, &model).map_err(|violation| violation.into_invariant("init"))?;
    let initial_path_hash = canonical_hash(&current.path);
    let mut chain = ChainRecorder::with_capacity(config.chain_length)?;

    ctx.sink.reset();
    ctx.sink.write_path(0, &current.path);
    chain.push(ChainEntry {
        path: current.path.clone(),
        diagnostics: Diagnostics::initial(&current),
        full_scan: false,
    })?;
    ctx.progress.report(chain.len(), chain.capacity());
    info!(
        segments = segmentation.segment_count(),
        augmented = data.augmented_sites().len(),
        recombinations = current.path.number_of_recombinations(),
        "chain initialised"
    );

    let jitter = JitterKernel::new(&config.jitter);
    let sampler = SegmentSampler::new(&config.segment);
    let mut tracker = MapTracker::new();
    let segment_count = segmentation.segment_count();
    let mut full_scans = 0;

    'sweeps: while !chain.is_full() {
        let before = chain.len();
        let (next, iter) = jitter.jitter(&mut chain, current, &model, &mut ctx.rng)?;
        current = next;
        for recorded in before + 1..=iter {
            ctx.progress.report(recorded, chain.capacity());
        }
        if chain.is_full() || !config.segment_sampler_on {
            continue;
        }

        for index in 0..segment_count {
            let jitter_step = chain
                .last()
                .map_or(0, |entry| entry.diagnostics.jitter_step);
            let (next, diagnostics) = sampler.sample_segment(
                current,
                index,
                &segmentation,
                &model,
                jitter_step,
                &mut ctx.rng,
            )?;
            current = next;
            let full_scan = index + 1 == segment_count;
            let iter = chain.push(ChainEntry {
                path: current.path.clone(),
                diagnostics,
                full_scan,
            })?;
            ctx.progress.report(iter, chain.capacity());

            if full_scan {
                full_scans += 1;
                let snapshot = times_to_mrca(&current.path)
                    .map_err(|violation| violation.into_invariant("mrca"))?;
                ctx.sink.write_mrca(iter - 1, full_scans, &snapshot);
                ctx.sink.write_path(iter - 1, &current.path);
                tracker.aggregate(&chain, iter, full_scans, &data, ctx.sink.as_mut());
                debug!(full_scans, iter, mean_tmrca = snapshot.mean, "sweep complete");
            }
            if chain.is_full() {
                break 'sweeps;
            }
        }
    }

    let tally = AcceptanceTally::from_entries(chain.entries());
    let map = tracker.best().cloned();
    let summary = RunSummary {
        iterations: chain.len(),
        full_scan_count: full_scans,
        segment_count,
        move_counts: tally.counts(),
        acceptance_rates: tally.rates(),
        augmented_sites: data.augmented_sites().to_vec(),
        initial_path_hash: initial_path_hash.clone(),
        final_path_hash: canonical_hash(&current.path),
        final_log_posterior: current.log_posterior(),
        map_iteration: map.as_ref().map(|entry| entry.iteration),
        map_log_posterior: map.as_ref().map(|entry| entry.log_posterior),
    };
    info!(
        iterations = summary.iterations,
        full_scans,
        final_log_posterior = summary.final_log_posterior,
        "chain finished"
    );

    if let Some(root) = &config.output.run_directory {
        write_run_artefacts(root, &config, &data, &chain, &summary, initial_path_hash)?;
    }

    Ok(RunOutcome {
        chain,
        data,
        segmentation,
        map,
        summary,
    })
}

fn confirm_input_size(
    ctx: &mut RunContext,
    data: &GenomeData,
    threshold: usize,
) -> Result<(), ArgError> {
    let n_sites = data.n_sites();
    if n_sites < threshold {
        return Ok(());
    }
    warn!(n_sites, threshold, "large input: the chain may mix slowly");
    if ctx.gate.confirm(n_sites, threshold) {
        return Ok(());
    }
    Err(ArgError::Declined(
        ErrorInfo::new("large-input-declined", "run declined at the large-input gate")
            .with_context("n_sites", n_sites.to_string())
            .with_context("threshold", threshold.to_string()),
    ))
}

fn write_run_artefacts(
    root: &Path,
    config: &RunConfig,
    data: &GenomeData,
    chain: &ChainRecorder,
    summary: &RunSummary,
    initial_path_hash: String,
) -> Result<(), ArgError> {
    let layout: &OutputConfig = &config.output;
    let diagnostics_path = root.join(&layout.diagnostics_file);
    write_diagnostics_csv(chain.entries(), &diagnostics_path)
        .map_err(|err| ArgError::io("diagnostics-write", err, diagnostics_path.display()))?;
    summary.write(&root.join(&layout.summary_file))?;

    let mut tool_versions = BTreeMap::new();
    tool_versions.insert(
        "arbores-mcmc".to_string(),
        env!("CARGO_PKG_VERSION").to_string(),
    );
    let files: Vec<PathBuf> = [
        &layout.chain_log,
        &layout.mrca_log,
        &layout.map_file,
        &layout.diagnostics_file,
        &layout.summary_file,
    ]
    .into_iter()
    .filter(|name| root.join(name).exists())
    .cloned()
    .collect();
    let manifest = RunManifest {
        schema: SchemaVersion::default(),
        config: config.clone(),
        provenance: RunProvenance {
            data_name: data.name().to_string(),
            initial_path_hash,
            seed: config.seed,
            created_at: Utc::now().to_rfc3339(),
            tool_versions,
        },
        final_path_hash: summary.final_path_hash.clone(),
        files,
    };
    manifest.write(&root.join(&layout.manifest_file))
}
