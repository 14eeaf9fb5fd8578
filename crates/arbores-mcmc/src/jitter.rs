use arbores_core::errors::ArgError;
use arbores_core::RngHandle;
use tracing::trace;

use crate::chain::ChainRecorder;
use crate::config::JitterConfig;
use crate::diagnostics::{ChainEntry, MoveKind};
use crate::kernel::{resolve, verify_committed, EvaluatedPath, Model, Transition};
use crate::moves::shift_free_time;

/// Global kernel run at the start of every sweep: each step shifts one free
/// time of the whole path and is a full Metropolis-Hastings cycle recorded
/// as its own chain entry.
///
/// The shift half-width is fixed for the run, so the proposal is symmetric.
#[derive(Debug, Clone)]
pub struct JitterKernel {
    steps: usize,
    step_size: f64,
}

impl JitterKernel {
    /// Kernel with the configured number of steps and relative step size.
    pub fn new(config: &JitterConfig) -> Self {
        Self {
            steps: config.steps,
            step_size: config.step_size,
        }
    }

    /// Runs up to the configured number of steps and returns the state the
    /// chain ends in together with the new iteration count.
    ///
    /// Capacity is checked before every step, so a full chain stops the
    /// kernel without writing past its last slot.
    pub fn jitter(
        &self,
        chain: &mut ChainRecorder,
        mut current: EvaluatedPath,
        model: &Model<'_>,
        rng: &mut RngHandle,
    ) -> Result<(EvaluatedPath, usize), ArgError> {
        for _ in 0..self.steps {
            if chain.is_full() {
                break;
            }
            let jitter_step = chain
                .last()
                .map_or(0, |entry| entry.diagnostics.jitter_step)
                + 1;
            let index = rng.index(current.path.number_of_free_times());
            let delta = rng.uniform_between(-self.step_size, self.step_size);
            let candidate = shift_free_time(&current.path, index, delta);
            let proposal = EvaluatedPath::evaluate(candidate, model).ok();

            let (next, diagnostics) = resolve(
                current,
                Transition::symmetric(MoveKind::Jitter, proposal),
                jitter_step,
                rng,
            );
            if diagnostics.accept_indicator == 1 {
                verify_committed(&next.path, model.data, "jitter")?;
            }
            trace!(
                jitter_step,
                free_time = index,
                alpha = diagnostics.alpha,
                accepted = diagnostics.accept_indicator,
                "jitter step"
            );
            chain.push(ChainEntry {
                path: next.path.clone(),
                diagnostics,
                full_scan: false,
            })?;
            current = next;
        }
        Ok((current, chain.len()))
    }
}
