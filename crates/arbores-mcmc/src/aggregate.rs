use arbores_arg::{GenomeData, PathState};
use tracing::debug;

use crate::chain::ChainRecorder;
use crate::output::ChainSink;

/// Hook invoked once after every completed sweep.
pub trait SweepAggregator {
    /// `iter` entries are recorded and `full_scan_count` sweeps are complete.
    fn aggregate(
        &mut self,
        chain: &ChainRecorder,
        iter: usize,
        full_scan_count: usize,
        data: &GenomeData,
        sink: &mut dyn ChainSink,
    );
}

/// Highest-posterior entry seen so far.
#[derive(Debug, Clone, PartialEq)]
pub struct MapEntry {
    /// Iteration of the entry.
    pub iteration: usize,
    /// Its log posterior.
    pub log_posterior: f64,
    /// Its path.
    pub path: PathState,
}

/// Tracks the maximum a posteriori entry and rewrites the MAP file whenever
/// a sweep improves on it.
#[derive(Debug, Default, Clone)]
pub struct MapTracker {
    scanned: usize,
    best: Option<MapEntry>,
}

impl MapTracker {
    /// Tracker that has seen nothing yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Best entry so far.
    pub fn best(&self) -> Option<&MapEntry> {
        self.best.as_ref()
    }
}

impl SweepAggregator for MapTracker {
    fn aggregate(
        &mut self,
        chain: &ChainRecorder,
        iter: usize,
        full_scan_count: usize,
        _data: &GenomeData,
        sink: &mut dyn ChainSink,
    ) {
        let end = iter.min(chain.len());
        let start = self.scanned.min(end);
        let mut improved = false;
        for (offset, entry) in chain.entries()[start..end].iter().enumerate() {
            let log_posterior = entry.diagnostics.log_posterior;
            if self
                .best
                .as_ref()
                .map_or(true, |best| log_posterior > best.log_posterior)
            {
                self.best = Some(MapEntry {
                    iteration: start + offset,
                    log_posterior,
                    path: entry.path.clone(),
                });
                improved = true;
            }
        }
        self.scanned = end;
        if let (true, Some(best)) = (improved, &self.best) {
            sink.write_map(best.iteration, best.log_posterior, &best.path);
        }
        debug!(
            full_scan_count,
            iter,
            map_log_posterior = self.best.as_ref().map(|best| best.log_posterior),
            "sweep aggregated"
        );
    }
}
