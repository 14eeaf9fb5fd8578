use tracing::info;

/// Decides whether a run on large input may proceed.
pub trait ConfirmationGate {
    /// Called once, before sampling, when `n_sites >= threshold`.
    fn confirm(&mut self, n_sites: usize, threshold: usize) -> bool;
}

/// Gate that always lets the run proceed.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysConfirm;

impl ConfirmationGate for AlwaysConfirm {
    fn confirm(&mut self, _n_sites: usize, _threshold: usize) -> bool {
        true
    }
}

impl<F> ConfirmationGate for F
where
    F: FnMut(usize, usize) -> bool,
{
    fn confirm(&mut self, n_sites: usize, threshold: usize) -> bool {
        self(n_sites, threshold)
    }
}

/// Receives the iteration count after every recorded entry.
pub trait ProgressSink {
    /// `iteration` entries out of `total` are recorded.
    fn report(&mut self, iteration: usize, total: usize);
}

/// Emits an `info` event every `interval` iterations and at the end.
#[derive(Debug, Clone, Copy)]
pub struct TracingProgress {
    interval: usize,
}

impl TracingProgress {
    /// Reports every `interval` iterations; zero only reports completion.
    pub fn new(interval: usize) -> Self {
        Self { interval }
    }
}

impl ProgressSink for TracingProgress {
    fn report(&mut self, iteration: usize, total: usize) {
        let periodic = self.interval > 0 && iteration % self.interval == 0;
        if periodic || iteration == total {
            info!(iteration, total, "chain progress");
        }
    }
}
