use arbores_core::errors::ArgError;
use tracing::debug;

use crate::data::GenomeData;
use crate::params::Parameters;
use crate::path::PathState;
use crate::spr::{PathViolation, SprOp};
use crate::tree::LocalTree;

/// Builds a starting path that is complete and compatible with `data`.
///
/// The first tree is a caterpillar grouping the derived samples of the first
/// polymorphic site. Moving right, each polymorphic site the current tree
/// cannot explain is resolved by merging the maximal clades of its derived
/// set (or of the complement, whichever is cheaper) one regraft at a time.
/// Those regrafts are spread over the boundaries since the previous
/// polymorphic site, so some land on monomorphic sites.
pub fn initialise(data: &GenomeData, params: &Parameters) -> Result<PathState, ArgError> {
    let n = data.n_samples();
    let polymorphic = data.polymorphic_sites();
    let order = leaf_order(n, polymorphic.first().map(|&site| data.derived_set(site)));
    let first = LocalTree::caterpillar(&order, &expected_coalescence_times(n, params.n_eff));

    let mut current = first.clone();
    let mut ops = Vec::new();
    let mut previous = polymorphic.first().copied().unwrap_or(0);
    for &site in polymorphic.iter().skip(1) {
        let (moves, resolved) = resolve_split(&current, &data.derived_set(site), params.n_eff)
            .map_err(|violation| violation.into_invariant("initialisation"))?;
        let count = moves.len();
        for (step, mut op) in moves.into_iter().enumerate() {
            op.site = (site + 1 + step).saturating_sub(count).max(previous + 1);
            ops.push(op);
        }
        current = resolved;
        previous = site;
    }

    let path = PathState::new(data.n_sites(), first, ops);
    path.check_complete()
        .map_err(|violation| violation.into_invariant("initialisation"))?;
    path.check_compatible(data)
        .map_err(|violation| violation.into_invariant("initialisation"))?;
    debug!(
        recombinations = path.number_of_recombinations(),
        intervals = path.path_len(),
        "initial path built"
    );
    Ok(path)
}

fn leaf_order(n: usize, derived: Option<Vec<bool>>) -> Vec<usize> {
    match derived {
        Some(derived) => (0..n)
            .filter(|&leaf| derived[leaf])
            .chain((0..n).filter(|&leaf| !derived[leaf]))
            .collect(),
        None => (0..n).collect(),
    }
}

/// Cumulative expected waiting times of the Kingman coalescent.
fn expected_coalescence_times(n: usize, n_eff: f64) -> Vec<f64> {
    let mut elapsed = 0.0;
    (0..n.saturating_sub(1))
        .map(|step| {
            let lineages = (n - step) as f64;
            elapsed += n_eff * 2.0 / (lineages * (lineages - 1.0));
            elapsed
        })
        .collect()
}

/// Nodes whose leaf set lies inside `set` while their parent's does not.
fn maximal_clades(tree: &LocalTree, set: &[bool]) -> Vec<usize> {
    let masks = tree.clade_masks();
    let inside = |node: usize| {
        masks[node]
            .iter()
            .zip(set)
            .all(|(below, member)| !*below || *member)
    };
    (0..tree.n_nodes())
        .filter(|&node| inside(node) && tree.parent(node).map_or(true, |p| !inside(p)))
        .collect()
}

/// Regrafts until `derived` or its complement forms a clade.
fn resolve_split(
    tree: &LocalTree,
    derived: &[bool],
    n_eff: f64,
) -> Result<(Vec<SprOp>, LocalTree), PathViolation> {
    let complement: Vec<bool> = derived.iter().map(|member| !member).collect();
    let set = if maximal_clades(tree, &complement).len() < maximal_clades(tree, derived).len() {
        complement
    } else {
        derived.to_vec()
    };

    let mut current = tree.clone();
    let mut ops = Vec::new();
    loop {
        let clades = maximal_clades(&current, &set);
        let by_time = |a: &&usize, b: &&usize| current.time(**a).total_cmp(&current.time(**b));
        let (Some(&node), true) = (clades.iter().min_by(by_time), clades.len() > 1) else {
            break;
        };
        let Some(&target) = clades.iter().filter(|&&c| c != node).max_by(by_time) else {
            break;
        };
        let view = current.pruned(node)?;
        let low = current.time(target);
        let join_time = match view.edge_top(target) {
            Some(top) => low + 0.5 * (top - low),
            None => low + 0.5 * n_eff,
        };
        let op = SprOp {
            site: 0,
            node,
            cut_time: current.time(node),
            target,
            join_time,
        };
        current = current.apply_spr(&op)?;
        ops.push(op);
    }
    Ok((ops, current))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expected_times_increase() {
        let times = expected_coalescence_times(4, 1.0);
        assert_eq!(times.len(), 3);
        assert!(times.windows(2).all(|pair| pair[0] < pair[1]));
        assert!((times[0] - 1.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn conflicting_split_is_resolved_by_regrafting() {
        // ((0,1),2),3 cannot explain {0,2}
        let tree = LocalTree::caterpillar(&[0, 1, 2, 3], &[0.5, 1.0, 2.0]);
        let derived = vec![true, false, true, false];
        let (ops, resolved) = resolve_split(&tree, &derived, 1.0).unwrap();
        assert!(!ops.is_empty());
        resolved.validate().unwrap();
        assert_eq!(maximal_clades(&resolved, &derived).len(), 1);
    }
}
