use arbores_arg::PathState;
use serde::{Deserialize, Serialize};

/// Value stored in diagnostic fields that do not apply to an entry.
pub const SENTINEL: f64 = -1.0;

/// Kind of transition that produced a chain entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MoveKind {
    /// The initial entry of the chain.
    Init,
    /// Global shift of one free time.
    Jitter,
    /// Local shift of a cut or join time.
    Retime,
    /// Move of an operation to a neighbouring boundary.
    Slide,
    /// Addition of a recombination operation.
    Insert,
    /// Removal of a recombination operation.
    Delete,
    /// No proposal could be built for the segment.
    Invalid,
}

impl MoveKind {
    /// Stable label used in CSV exports and summaries.
    pub fn as_str(&self) -> &'static str {
        match self {
            MoveKind::Init => "init",
            MoveKind::Jitter => "jitter",
            MoveKind::Retime => "retime",
            MoveKind::Slide => "slide",
            MoveKind::Insert => "insert",
            MoveKind::Delete => "delete",
            MoveKind::Invalid => "invalid",
        }
    }
}

/// Acceptance diagnostics attached to every chain entry.
///
/// Every entry carries every field. Values that are undefined for the entry
/// (proposed densities of the initial entry, of a proposal that failed its
/// validity screen, ...) hold [`SENTINEL`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    /// Transition that produced the entry.
    pub move_kind: MoveKind,
    /// 1 when the proposal was accepted, 0 otherwise.
    pub accept_indicator: u8,
    /// Metropolis-Hastings acceptance ratio, non-negative.
    pub alpha: f64,
    /// Correction for proposals that change the number of operations.
    pub cardinality_ratio: f64,
    /// Proposal density of the times a dimension-changing move removes.
    pub current_free_time_density: f64,
    /// Log-likelihood of the state before the transition.
    pub current_log_likelihood: f64,
    /// Log prior of the state before the transition.
    pub current_log_prior: f64,
    /// Free times of the state before the transition.
    pub current_number_of_free_times: i64,
    /// Recombination part of the prior before the transition.
    pub current_recombination_density: f64,
    /// 1 for dimension-changing moves, 0 for fixed-dimension moves.
    pub irreducibility: i64,
    /// Number of jitter steps taken so far.
    pub jitter_step: usize,
    /// Log-likelihood of the recorded state.
    pub log_likelihood: f64,
    /// Log prior of the recorded state.
    pub log_prior: f64,
    /// Always `log_likelihood + log_prior`.
    pub log_posterior: f64,
    /// Proposal density of the times a dimension-changing move draws.
    pub proposed_free_time_density: f64,
    /// Log-likelihood of the proposal.
    pub proposed_log_likelihood: f64,
    /// Log prior of the proposal.
    pub proposed_log_prior: f64,
    /// Free times of the proposal.
    pub proposed_number_of_free_times: i64,
    /// Recombinations of the proposal.
    pub proposed_number_of_recombinations: i64,
    /// Recombination part of the prior of the proposal.
    pub proposed_recombination_density: f64,
}

impl Diagnostics {
    /// Diagnostics of the first entry: accepted, unit ratios, real current
    /// densities and sentinel proposals except the recombination count.
    pub fn initial(state: &crate::kernel::EvaluatedPath) -> Self {
        Self {
            move_kind: MoveKind::Init,
            accept_indicator: 1,
            alpha: 1.0,
            cardinality_ratio: 1.0,
            current_free_time_density: SENTINEL,
            current_log_likelihood: state.log_likelihood,
            current_log_prior: state.log_prior,
            current_number_of_free_times: state.path.number_of_free_times() as i64,
            current_recombination_density: state.recombination_density,
            irreducibility: -1,
            jitter_step: 0,
            log_likelihood: state.log_likelihood,
            log_prior: state.log_prior,
            log_posterior: state.log_posterior(),
            proposed_free_time_density: SENTINEL,
            proposed_log_likelihood: SENTINEL,
            proposed_log_prior: SENTINEL,
            proposed_number_of_free_times: -1,
            proposed_number_of_recombinations: state.path.number_of_recombinations() as i64,
            proposed_recombination_density: SENTINEL,
        }
    }
}

/// One recorded iteration: the state the chain is in and how it got there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainEntry {
    /// Committed path.
    pub path: PathState,
    /// Acceptance diagnostics.
    pub diagnostics: Diagnostics,
    /// Whether the entry closes a complete sweep over all segments.
    pub full_scan: bool,
}
