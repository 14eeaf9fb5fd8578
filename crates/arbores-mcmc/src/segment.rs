use arbores_core::errors::ArgError;
use arbores_core::RngHandle;
use tracing::trace;

use crate::bridge::BridgeSegmentation;
use crate::config::SegmentConfig;
use crate::diagnostics::{Diagnostics, MoveKind};
use crate::kernel::{resolve, verify_committed, EvaluatedPath, Model, Transition};
use crate::moves::{propose_delete, propose_insert, propose_retime, propose_slide};

const MOVES: [MoveKind; 4] = [
    MoveKind::Retime,
    MoveKind::Slide,
    MoveKind::Insert,
    MoveKind::Delete,
];

/// Local Metropolis-Hastings kernel scoped to one bridge segment.
///
/// Each call picks one of four moves uniformly. Retime and slide keep the
/// number of free times; insert and delete add or remove an operation and
/// carry the cardinality and proposal-density corrections.
#[derive(Debug, Clone)]
pub struct SegmentSampler {
    time_step: f64,
    join_rate: f64,
}

impl SegmentSampler {
    /// Sampler with the configured retime step and join rate.
    pub fn new(config: &SegmentConfig) -> Self {
        Self {
            time_step: config.time_step,
            join_rate: config.join_rate,
        }
    }

    /// Proposes a change inside segment `segment_index` and decides on it.
    ///
    /// Returns the state the chain moves to (the proposal when accepted, the
    /// unchanged `current` otherwise) and the diagnostics to record.
    pub fn sample_segment(
        &self,
        current: EvaluatedPath,
        segment_index: usize,
        segmentation: &BridgeSegmentation,
        model: &Model<'_>,
        jitter_step: usize,
        rng: &mut RngHandle,
    ) -> Result<(EvaluatedPath, Diagnostics), ArgError> {
        let window = segmentation.window(segment_index);
        let kind = MOVES[rng.index(MOVES.len())];
        let path = &current.path;
        let transition = match kind {
            MoveKind::Retime => propose_retime(path, window, self.time_step, rng)
                .map(|candidate| {
                    Transition::symmetric(kind, EvaluatedPath::evaluate(candidate, model).ok())
                })
                .unwrap_or_else(Transition::invalid),
            MoveKind::Slide => propose_slide(path, window, rng)
                .map(|candidate| {
                    Transition::symmetric(kind, EvaluatedPath::evaluate(candidate, model).ok())
                })
                .unwrap_or_else(Transition::invalid),
            MoveKind::Insert => propose_insert(path, window, self.join_rate, rng)
                .map_err(|violation| violation.into_invariant("segment"))?
                .map(|proposal| Transition {
                    kind,
                    proposal: EvaluatedPath::evaluate(proposal.path, model).ok(),
                    cardinality_ratio: proposal.cardinality_ratio,
                    current_free_time_density: 1.0,
                    proposed_free_time_density: proposal.free_time_density,
                    changes_dimension: true,
                })
                .unwrap_or_else(Transition::invalid),
            _ => propose_delete(path, window, self.join_rate, rng)
                .map_err(|violation| violation.into_invariant("segment"))?
                .map(|proposal| Transition {
                    kind,
                    proposal: EvaluatedPath::evaluate(proposal.path, model).ok(),
                    cardinality_ratio: proposal.cardinality_ratio,
                    current_free_time_density: proposal.free_time_density,
                    proposed_free_time_density: 1.0,
                    changes_dimension: true,
                })
                .unwrap_or_else(Transition::invalid),
        };

        let (next, diagnostics) = resolve(current, transition, jitter_step, rng);
        if diagnostics.accept_indicator == 1 {
            verify_committed(&next.path, model.data, "segment")?;
        }
        trace!(
            segment = segment_index,
            kind = diagnostics.move_kind.as_str(),
            alpha = diagnostics.alpha,
            accepted = diagnostics.accept_indicator,
            "segment move"
        );
        Ok((next, diagnostics))
    }
}
