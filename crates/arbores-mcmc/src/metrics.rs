use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::diagnostics::{ChainEntry, MoveKind};

/// Proposed and accepted counts of one move kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveTally {
    /// Proposals made.
    pub proposed: usize,
    /// Proposals accepted.
    pub accepted: usize,
}

impl MoveTally {
    /// Fraction of accepted proposals, 0 when nothing was proposed.
    pub fn rate(&self) -> f64 {
        if self.proposed == 0 {
            0.0
        } else {
            self.accepted as f64 / self.proposed as f64
        }
    }
}

/// Per-move-kind acceptance counters in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct AcceptanceTally {
    counts: IndexMap<MoveKind, MoveTally>,
}

impl AcceptanceTally {
    /// Empty tally.
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one recorded entry; the initial entry is not a proposal.
    pub fn record(&mut self, kind: MoveKind, accepted: bool) {
        if kind == MoveKind::Init {
            return;
        }
        let tally = self.counts.entry(kind).or_default();
        tally.proposed += 1;
        if accepted {
            tally.accepted += 1;
        }
    }

    /// Tallies every entry of a chain.
    pub fn from_entries(entries: &[ChainEntry]) -> Self {
        let mut tally = Self::new();
        for entry in entries {
            tally.record(
                entry.diagnostics.move_kind,
                entry.diagnostics.accept_indicator == 1,
            );
        }
        tally
    }

    /// Raw counts keyed by move label.
    pub fn counts(&self) -> IndexMap<String, MoveTally> {
        self.counts
            .iter()
            .map(|(kind, tally)| (kind.as_str().to_string(), *tally))
            .collect()
    }

    /// Acceptance rates keyed by move label.
    pub fn rates(&self) -> IndexMap<String, f64> {
        self.counts
            .iter()
            .map(|(kind, tally)| (kind.as_str().to_string(), tally.rate()))
            .collect()
    }
}

/// Writes one CSV row of diagnostics per chain entry.
pub fn write_diagnostics_csv<P: AsRef<Path>>(entries: &[ChainEntry], path: P) -> std::io::Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    writeln!(
        file,
        "iteration,move_kind,full_scan,accept_indicator,alpha,cardinality_ratio,\
         current_free_time_density,current_log_likelihood,current_log_prior,\
         current_number_of_free_times,current_recombination_density,irreducibility,\
         jitter_step,log_likelihood,log_prior,log_posterior,proposed_free_time_density,\
         proposed_log_likelihood,proposed_log_prior,proposed_number_of_free_times,\
         proposed_number_of_recombinations,proposed_recombination_density"
    )?;
    for (iteration, entry) in entries.iter().enumerate() {
        let d = &entry.diagnostics;
        writeln!(
            file,
            "{},{},{},{},{:.6},{:.6},{:.6},{:.6},{:.6},{},{:.6},{},{},{:.6},{:.6},{:.6},{:.6},{:.6},{:.6},{},{},{:.6}",
            iteration,
            d.move_kind.as_str(),
            u8::from(entry.full_scan),
            d.accept_indicator,
            d.alpha,
            d.cardinality_ratio,
            d.current_free_time_density,
            d.current_log_likelihood,
            d.current_log_prior,
            d.current_number_of_free_times,
            d.current_recombination_density,
            d.irreducibility,
            d.jitter_step,
            d.log_likelihood,
            d.log_prior,
            d.log_posterior,
            d.proposed_free_time_density,
            d.proposed_log_likelihood,
            d.proposed_log_prior,
            d.proposed_number_of_free_times,
            d.proposed_number_of_recombinations,
            d.proposed_recombination_density,
        )?;
    }
    file.flush()
}
