//! Proposal builders. Every builder works on a committed path and returns a
//! candidate that still has to pass the validity screen; `None` means no
//! candidate exists for the random choices made.

use std::ops::Range;

use arbores_arg::{LocalTree, PathState, PathViolation, SprOp};
use arbores_core::RngHandle;

/// Candidate of a dimension-changing move with its proposal corrections.
#[derive(Debug, Clone)]
pub(crate) struct DimensionProposal {
    pub path: PathState,
    /// `(#boundaries * #edges) / #deletable` for an insertion, its inverse for a deletion.
    pub cardinality_ratio: f64,
    /// Density of the cut time, join time and target of the added or removed operation.
    pub free_time_density: f64,
}

/// Boundaries a segment may place operations on.
pub(crate) fn window_boundaries(path: &PathState, window: (usize, usize)) -> Range<usize> {
    window.0.max(1)..window.1.min(path.n_sites())
}

/// In-window operations that are the last at their boundary.
pub(crate) fn deletable_ops(path: &PathState, window: (usize, usize)) -> Vec<usize> {
    path.ops_in_window(window.0, window.1)
        .into_iter()
        .filter(|&index| path.is_last_at_site(index))
        .collect()
}

/// Shifts free time `index` of the whole path by `delta`.
///
/// Free times are numbered as the internal node times of the first tree,
/// followed by the cut and join time of every operation.
pub(crate) fn shift_free_time(path: &PathState, index: usize, delta: f64) -> PathState {
    let tree_times = path.n_leaves().saturating_sub(1);
    if index < tree_times {
        let mut tree = path.initial_tree().clone();
        let node = path.n_leaves() + index;
        tree.set_time(node, tree.time(node) + delta);
        return path.with_initial_tree(tree);
    }
    let mut ops = path.ops().to_vec();
    let slot = index - tree_times;
    if let Some(op) = ops.get_mut(slot / 2) {
        if slot % 2 == 0 {
            op.cut_time += delta;
        } else {
            op.join_time += delta;
        }
    }
    path.with_ops(ops)
}

pub(crate) fn propose_retime(
    path: &PathState,
    window: (usize, usize),
    time_step: f64,
    rng: &mut RngHandle,
) -> Option<PathState> {
    let candidates = path.ops_in_window(window.0, window.1);
    if candidates.is_empty() {
        return None;
    }
    let index = candidates[rng.index(candidates.len())];
    let shift = rng.uniform_between(-time_step, time_step);
    let mut ops = path.ops().to_vec();
    if rng.coin() {
        ops[index].cut_time += shift;
    } else {
        ops[index].join_time += shift;
    }
    Some(path.with_ops(ops))
}

/// Moves an operation one boundary left or right. Only the first operation of
/// a boundary may move left and only the last may move right, which keeps the
/// operation order intact and makes the move its own inverse.
pub(crate) fn propose_slide(
    path: &PathState,
    window: (usize, usize),
    rng: &mut RngHandle,
) -> Option<PathState> {
    let candidates = path.ops_in_window(window.0, window.1);
    if candidates.is_empty() {
        return None;
    }
    let index = candidates[rng.index(candidates.len())];
    let site = path.ops()[index].site;
    let new_site = if rng.coin() {
        if !path.is_first_at_site(index) {
            return None;
        }
        site.checked_sub(1)?
    } else {
        if !path.is_last_at_site(index) {
            return None;
        }
        site + 1
    };
    if !window_boundaries(path, window).contains(&new_site) {
        return None;
    }
    let mut ops = path.ops().to_vec();
    ops[index].site = new_site;
    Some(path.with_ops(ops))
}

/// Adds an operation as the last one at a uniformly chosen boundary: uniform
/// edge, uniform cut on that edge, exponential gap to the join, uniform
/// target among the pruned lineages alive at the join.
pub(crate) fn propose_insert(
    path: &PathState,
    window: (usize, usize),
    join_rate: f64,
    rng: &mut RngHandle,
) -> Result<Option<DimensionProposal>, PathViolation> {
    let boundaries = window_boundaries(path, window);
    if boundaries.is_empty() {
        return Ok(None);
    }
    let site = boundaries.start + rng.index(boundaries.len());
    let position = path.insertion_index(site);
    let tree = path.tree_before_op(position)?;
    let edges = tree.edge_nodes();
    let node = edges[rng.index(edges.len())];
    let Some(parent) = tree.parent(node) else {
        return Ok(None);
    };
    let cut_time = rng.uniform_between(tree.time(node), tree.time(parent));
    let join_time = cut_time + rng.exponential(join_rate);
    let lineages = tree.pruned(node)?.lineages_at(join_time);
    if lineages.is_empty() {
        return Ok(None);
    }
    let target = lineages[rng.index(lineages.len())];
    let op = SprOp {
        site,
        node,
        cut_time,
        target,
        join_time,
    };
    let free_time_density = insertion_density(&tree, &op, join_rate)?;

    let mut ops = path.ops().to_vec();
    ops.insert(position, op);
    let proposed = path.with_ops(ops);
    let deletable = deletable_ops(&proposed, window).len();
    Ok(Some(DimensionProposal {
        path: proposed,
        cardinality_ratio: (boundaries.len() * edges.len()) as f64 / deletable as f64,
        free_time_density,
    }))
}

/// Removes a uniformly chosen in-window operation that is last at its boundary.
pub(crate) fn propose_delete(
    path: &PathState,
    window: (usize, usize),
    join_rate: f64,
    rng: &mut RngHandle,
) -> Result<Option<DimensionProposal>, PathViolation> {
    let deletable = deletable_ops(path, window);
    let boundaries = window_boundaries(path, window);
    if deletable.is_empty() || boundaries.is_empty() {
        return Ok(None);
    }
    let index = deletable[rng.index(deletable.len())];
    let op = path.ops()[index];
    let tree = path.tree_before_op(index)?;
    let free_time_density = insertion_density(&tree, &op, join_rate)?;
    let edges = tree.edge_nodes().len();

    let mut ops = path.ops().to_vec();
    ops.remove(index);
    Ok(Some(DimensionProposal {
        path: path.with_ops(ops),
        cardinality_ratio: deletable.len() as f64 / (boundaries.len() * edges) as f64,
        free_time_density,
    }))
}

/// Density with which [`propose_insert`] draws the times and target of `op`
/// on `tree`, given its boundary and node.
pub(crate) fn insertion_density(
    tree: &LocalTree,
    op: &SprOp,
    join_rate: f64,
) -> Result<f64, PathViolation> {
    let edge = tree.edge_length(op.node);
    let lineages = tree.pruned(op.node)?.lineages_at(op.join_time).len();
    if edge <= 0.0 || lineages == 0 {
        return Ok(0.0);
    }
    let gap = op.join_time - op.cut_time;
    Ok(join_rate * (-join_rate * gap).exp() / (edge * lineages as f64))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path() -> PathState {
        let tree = LocalTree::caterpillar(&[0, 1, 2, 3], &[0.5, 1.0, 2.0]);
        let op = SprOp {
            site: 2,
            node: 0,
            cut_time: 0.2,
            target: 3,
            join_time: 1.5,
        };
        PathState::new(5, tree, vec![op])
    }

    #[test]
    fn free_times_cover_tree_and_operations() {
        let path = path();
        assert_eq!(path.number_of_free_times(), 5);
        let shifted = shift_free_time(&path, 1, 0.25);
        assert_eq!(shifted.initial_tree().time(5), 1.25);
        let shifted = shift_free_time(&path, 3, 0.1);
        assert!((shifted.ops()[0].cut_time - 0.3).abs() < 1e-12);
        let shifted = shift_free_time(&path, 4, -0.5);
        assert_eq!(shifted.ops()[0].join_time, 1.0);
    }

    #[test]
    fn boundaries_exclude_the_genome_start() {
        let path = path();
        assert_eq!(window_boundaries(&path, (0, 3)), 1..3);
        assert_eq!(window_boundaries(&path, (3, 9)), 3..5);
        assert_eq!(deletable_ops(&path, (0, 3)), vec![0]);
        assert!(deletable_ops(&path, (3, 5)).is_empty());
    }

    #[test]
    fn delete_reports_the_density_insert_would_use() {
        let path = path();
        let mut rng = RngHandle::from_seed(3);
        let proposal = propose_delete(&path, (0, 3), 1.0, &mut rng)
            .unwrap()
            .unwrap();
        assert_eq!(proposal.path.number_of_recombinations(), 0);
        // 1 deletable op, 2 boundaries, 6 edges
        assert!((proposal.cardinality_ratio - 1.0 / 12.0).abs() < 1e-12);
        // edge of leaf 0 is 0.5 long, gap 1.3, two pruned lineages at 1.5
        let expected = (-1.3f64).exp() / (0.5 * 2.0);
        assert!((proposal.free_time_density - expected).abs() < 1e-12);
    }

    #[test]
    fn insert_appends_after_existing_operations() {
        let path = path();
        let mut rng = RngHandle::from_seed(11);
        for _ in 0..50 {
            if let Some(proposal) = propose_insert(&path, (0, 5), 1.0, &mut rng).unwrap() {
                assert_eq!(proposal.path.number_of_recombinations(), 2);
                let ops = proposal.path.ops();
                assert!(ops.windows(2).all(|pair| pair[0].site <= pair[1].site));
                assert!(proposal.cardinality_ratio > 0.0);
                assert!(proposal.free_time_density >= 0.0);
            }
        }
    }
}
