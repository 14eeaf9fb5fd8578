use crate::data::GenomeData;
use crate::params::Parameters;
use crate::path::PathState;
use crate::spr::{PathViolation, SprOp};
use crate::tree::LocalTree;

/// Result of an SMC prior evaluation. Owned by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct SmcPriorData {
    /// Log prior density of the whole path.
    pub density: f64,
    /// Kingman coalescent log density of the first local tree.
    pub coalescent_density: f64,
    /// Log density of the recombination process along the genome.
    pub recombination_density: f64,
    /// Number of recombination operations in the path.
    pub number_of_recombinations: usize,
}

/// Log density of `path` under the sequentially Markov coalescent.
pub fn smc_prior(
    path: &PathState,
    params: &Parameters,
    _data: &GenomeData,
) -> Result<SmcPriorData, PathViolation> {
    let intervals = path.local_trees()?;
    let coalescent_density = coalescent_log_density(path.initial_tree(), params.n_eff);

    let last_boundary = path.n_sites().saturating_sub(1);
    let mut recombination_density = 0.0;
    for interval in &intervals {
        let boundaries = interval.end.min(last_boundary).saturating_sub(interval.start);
        if boundaries > 0 {
            recombination_density -= params.rho * interval.tree.total_length() * boundaries as f64;
        }
    }

    let mut current = path.initial_tree().clone();
    for op in path.ops() {
        recombination_density += recombination_log_density(&current, op, params)?;
        current = current.apply_spr(op)?;
    }

    Ok(SmcPriorData {
        density: coalescent_density + recombination_density,
        coalescent_density,
        recombination_density,
        number_of_recombinations: path.number_of_recombinations(),
    })
}

/// Kingman coalescent log density of a single tree with pair rate `1 / n_eff`.
pub fn coalescent_log_density(tree: &LocalTree, n_eff: f64) -> f64 {
    let mut times: Vec<f64> = tree.internal_nodes().map(|node| tree.time(node)).collect();
    times.sort_by(f64::total_cmp);
    let mut lineages = tree.n_leaves();
    let mut previous = 0.0;
    let mut density = 0.0;
    for time in times {
        let pairs = (lineages * (lineages - 1) / 2) as f64;
        density += -n_eff.ln() - pairs / n_eff * (time - previous);
        previous = time;
        lineages -= 1;
    }
    density
}

/// Density of one recombination: the cut point (rate `rho` per unit branch
/// length) and the re-coalescence of the floating lineage with the pruned tree.
fn recombination_log_density(
    tree: &LocalTree,
    op: &SprOp,
    params: &Parameters,
) -> Result<f64, PathViolation> {
    let view = tree.pruned(op.node)?;
    let exposure = view.lineage_integral(op.cut_time, op.join_time);
    Ok(params.rho.ln() - params.n_eff.ln() - exposure / params.n_eff)
}
