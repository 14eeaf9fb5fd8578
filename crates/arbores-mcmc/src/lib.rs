#![deny(missing_docs)]

//! Metropolis-Hastings chain over ancestral recombination graph paths: bridge
//! segmentation, the jitter and segment kernels, the fixed-capacity chain
//! recorder and the driver that orchestrates them.

/// Sweep aggregation hooks and the MAP tracker.
pub mod aggregate;
/// Bridge segmentation of the genome.
pub mod bridge;
/// Fixed-capacity chain storage.
pub mod chain;
/// YAML configuration schema and defaults.
pub mod config;
/// Per-entry diagnostics and chain entries.
pub mod diagnostics;
/// The chain driver and its run context.
pub mod driver;
/// Confirmation gate and progress reporting.
pub mod gate;
/// Global jitter kernel.
pub mod jitter;
/// Path evaluation and the shared accept/reject step.
pub mod kernel;
/// Run summary and manifest serialization.
pub mod manifest;
/// Acceptance tallies and diagnostics export.
pub mod metrics;
mod moves;
/// Fire-and-forget log collaborators.
pub mod output;
/// Local segment sampler.
pub mod segment;

pub use aggregate::{MapEntry, MapTracker, SweepAggregator};
pub use bridge::BridgeSegmentation;
pub use chain::ChainRecorder;
pub use config::{JitterConfig, OutputConfig, RunConfig, SegmentConfig};
pub use diagnostics::{ChainEntry, Diagnostics, MoveKind, SENTINEL};
pub use driver::{run, RunContext, RunOutcome};
pub use gate::{AlwaysConfirm, ConfirmationGate, ProgressSink, TracingProgress};
pub use jitter::JitterKernel;
pub use kernel::{verify_committed, EvaluatedPath, Model};
pub use manifest::{RunManifest, RunSummary};
pub use metrics::{AcceptanceTally, MoveTally};
pub use output::{ChainSink, NullSink, RunDirectory};
pub use segment::SegmentSampler;
