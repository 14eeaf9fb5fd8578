use arbores_arg::{likelihood, smc_prior, GenomeData, Parameters, PathState, PathViolation};
use arbores_core::errors::ArgError;
use arbores_core::RngHandle;

use crate::diagnostics::{Diagnostics, MoveKind, SENTINEL};

/// Read-only model inputs shared by every kernel.
#[derive(Debug, Clone, Copy)]
pub struct Model<'a> {
    /// Observed (possibly augmented) data.
    pub data: &'a GenomeData,
    /// Model parameters.
    pub params: &'a Parameters,
}

/// A path together with the densities the oracles assign to it.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluatedPath {
    /// The path itself.
    pub path: PathState,
    /// Log-likelihood of the data.
    pub log_likelihood: f64,
    /// SMC log prior.
    pub log_prior: f64,
    /// Recombination part of the prior.
    pub recombination_density: f64,
}

impl EvaluatedPath {
    /// Screens `path` for completeness and compatibility, then evaluates both
    /// oracles. The oracle results are dropped once the scalars are read.
    pub fn evaluate(path: PathState, model: &Model<'_>) -> Result<Self, PathViolation> {
        path.check_complete()?;
        path.check_compatible(model.data)?;
        let log_likelihood = likelihood(&path, model.data, model.params)?.log_likelihood;
        let prior = smc_prior(&path, model.params, model.data)?;
        if !(log_likelihood + prior.density).is_finite() {
            return Err(PathViolation::BadOperation {
                index: None,
                reason: "posterior density is not finite".to_string(),
            });
        }
        Ok(Self {
            path,
            log_likelihood,
            log_prior: prior.density,
            recombination_density: prior.recombination_density,
        })
    }

    /// `log_likelihood + log_prior`.
    pub fn log_posterior(&self) -> f64 {
        self.log_likelihood + self.log_prior
    }
}

/// Fails with [`ArgError::Invariant`] unless `path` may be committed to the chain.
pub fn verify_committed(path: &PathState, data: &GenomeData, stage: &str) -> Result<(), ArgError> {
    path.check_complete()
        .and_then(|_| path.check_compatible(data))
        .map_err(|violation| {
            tracing::error!(stage, %violation, "committed path violates an invariant");
            violation.into_invariant(stage)
        })
}

/// A proposal awaiting its accept/reject decision.
#[derive(Debug)]
pub(crate) struct Transition {
    pub kind: MoveKind,
    /// `None` when the proposal failed its validity screen.
    pub proposal: Option<EvaluatedPath>,
    pub cardinality_ratio: f64,
    pub current_free_time_density: f64,
    pub proposed_free_time_density: f64,
    pub changes_dimension: bool,
}

impl Transition {
    /// Fixed-dimension proposal with a symmetric proposal density.
    pub fn symmetric(kind: MoveKind, proposal: Option<EvaluatedPath>) -> Self {
        Self {
            kind,
            proposal,
            cardinality_ratio: 1.0,
            current_free_time_density: SENTINEL,
            proposed_free_time_density: SENTINEL,
            changes_dimension: false,
        }
    }

    /// Nothing could be proposed.
    pub fn invalid() -> Self {
        Self::symmetric(MoveKind::Invalid, None)
    }
}

/// Metropolis-Hastings decision: returns the state the chain moves to and the
/// diagnostics of the step. The losing state is dropped here.
pub(crate) fn resolve(
    current: EvaluatedPath,
    transition: Transition,
    jitter_step: usize,
    rng: &mut RngHandle,
) -> (EvaluatedPath, Diagnostics) {
    let mut diagnostics = Diagnostics {
        move_kind: transition.kind,
        accept_indicator: 0,
        alpha: 0.0,
        cardinality_ratio: transition.cardinality_ratio,
        current_free_time_density: transition.current_free_time_density,
        current_log_likelihood: current.log_likelihood,
        current_log_prior: current.log_prior,
        current_number_of_free_times: current.path.number_of_free_times() as i64,
        current_recombination_density: current.recombination_density,
        irreducibility: i64::from(transition.changes_dimension),
        jitter_step,
        log_likelihood: current.log_likelihood,
        log_prior: current.log_prior,
        log_posterior: current.log_posterior(),
        proposed_free_time_density: transition.proposed_free_time_density,
        proposed_log_likelihood: SENTINEL,
        proposed_log_prior: SENTINEL,
        proposed_number_of_free_times: -1,
        proposed_number_of_recombinations: -1,
        proposed_recombination_density: SENTINEL,
    };
    let Some(proposal) = transition.proposal else {
        // the draw is still consumed so every step advances the stream equally
        rng.uniform();
        return (current, diagnostics);
    };

    diagnostics.proposed_log_likelihood = proposal.log_likelihood;
    diagnostics.proposed_log_prior = proposal.log_prior;
    diagnostics.proposed_number_of_free_times = proposal.path.number_of_free_times() as i64;
    diagnostics.proposed_number_of_recombinations =
        proposal.path.number_of_recombinations() as i64;
    diagnostics.proposed_recombination_density = proposal.recombination_density;

    let density_correction = if transition.changes_dimension {
        transition.current_free_time_density / transition.proposed_free_time_density
    } else {
        1.0
    };
    let log_ratio = proposal.log_posterior() - current.log_posterior();
    let alpha = (log_ratio.exp() * transition.cardinality_ratio * density_correction).min(f64::MAX);
    diagnostics.alpha = if alpha.is_nan() { 0.0 } else { alpha.max(0.0) };

    if rng.uniform() < diagnostics.alpha {
        diagnostics.accept_indicator = 1;
        diagnostics.log_likelihood = proposal.log_likelihood;
        diagnostics.log_prior = proposal.log_prior;
        diagnostics.log_posterior = proposal.log_posterior();
        (proposal, diagnostics)
    } else {
        (current, diagnostics)
    }
}
