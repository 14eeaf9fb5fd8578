use arbores_core::errors::{ArgError, ErrorInfo};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tree::LocalTree;

/// Reason a tree or path fails structural completeness or data compatibility.
///
/// Proposals may produce violations transiently; kernels turn them into
/// rejections. Only a violation found on a committed path becomes an
/// [`ArgError::Invariant`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PathViolation {
    /// Tree does not have `2n - 1` nodes.
    #[error("tree has {found} nodes, expected {expected}")]
    NodeCount {
        /// Expected node count.
        expected: usize,
        /// Observed node count.
        found: usize,
    },
    /// A node id outside the tree was referenced.
    #[error("node {node} does not exist")]
    UnknownNode {
        /// Offending node id.
        node: usize,
    },
    /// A node carries a NaN or infinite time.
    #[error("node {node} has a non-finite time")]
    NonFiniteTime {
        /// Offending node id.
        node: usize,
    },
    /// A leaf is not at time zero.
    #[error("leaf {leaf} is not sampled at time zero")]
    LeafTime {
        /// Offending leaf.
        leaf: usize,
    },
    /// A child is not strictly younger than its parent.
    #[error("node {node} is not younger than its parent {parent}")]
    TimeOrder {
        /// Child node.
        node: usize,
        /// Parent node.
        parent: usize,
    },
    /// Tree does not have exactly one root.
    #[error("tree has {found} roots")]
    RootCount {
        /// Number of parentless nodes.
        found: usize,
    },
    /// The root is a leaf.
    #[error("leaf {node} is the root")]
    LeafRoot {
        /// Offending node.
        node: usize,
    },
    /// A node has the wrong number of children.
    #[error("node {node} has {children} children")]
    Arity {
        /// Offending node.
        node: usize,
        /// Number of children found.
        children: usize,
    },
    /// A node does not reach the root.
    #[error("node {node} is detached from the root")]
    Detached {
        /// Offending node.
        node: usize,
    },
    /// The path and the data disagree on the number of samples or sites.
    #[error("path spans {path_leaves} samples over {path_sites} sites but data has {data_samples} samples over {data_sites} sites")]
    ShapeMismatch {
        /// Leaves in the path.
        path_leaves: usize,
        /// Sites in the path.
        path_sites: usize,
        /// Samples in the data.
        data_samples: usize,
        /// Sites in the data.
        data_sites: usize,
    },
    /// An operation sits outside `1..n_sites`.
    #[error("operation {index} at site {site} is outside the genome")]
    SiteOutOfRange {
        /// Operation index.
        index: usize,
        /// Offending site.
        site: usize,
    },
    /// Operations are not sorted by site.
    #[error("operation {index} precedes the site of its predecessor")]
    Unsorted {
        /// Operation index.
        index: usize,
    },
    /// An operation cannot be applied to the tree it follows.
    #[error("operation {index:?} is inconsistent: {reason}")]
    BadOperation {
        /// Operation index, when known.
        index: Option<usize>,
        /// What went wrong.
        reason: String,
    },
    /// A polymorphic site is not explained by any edge of its local tree.
    #[error("site {site} is not explained by any edge of its local tree")]
    Incompatible {
        /// Offending site.
        site: usize,
    },
}

impl PathViolation {
    /// Converts the violation of a committed path into the fatal error family.
    pub fn into_invariant(self, stage: &str) -> ArgError {
        ArgError::Invariant(
            ErrorInfo::new("path-invariant", self.to_string())
                .with_context("stage", stage)
                .with_hint("committed paths must be complete and compatible; this is a sampler defect"),
        )
    }

    fn at_index(self, index: usize) -> Self {
        match self {
            PathViolation::BadOperation { index: None, reason } => PathViolation::BadOperation {
                index: Some(index),
                reason,
            },
            other => other,
        }
    }
}

/// Subtree-prune-and-regraft operation between two adjacent local trees.
///
/// At the boundary just before `site`, the edge above `node` is cut at
/// `cut_time`; the parent of `node` is removed and re-created at `join_time`
/// on the edge above `target` in the pruned tree.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SprOp {
    /// First site governed by the tree after the operation.
    pub site: usize,
    /// Node whose edge is cut.
    pub node: usize,
    /// Recombination time on the edge above `node`.
    pub cut_time: f64,
    /// Node whose pruned edge receives the floating lineage.
    pub target: usize,
    /// Re-coalescence time of the floating lineage.
    pub join_time: f64,
}

impl LocalTree {
    /// Applies an operation, returning the following local tree.
    pub fn apply_spr(&self, op: &SprOp) -> Result<LocalTree, PathViolation> {
        if op.target >= self.n_nodes() {
            return Err(PathViolation::UnknownNode { node: op.target });
        }
        let view = self.pruned(op.node)?;
        let removed = view.removed();
        let bad = |reason: String| PathViolation::BadOperation {
            index: None,
            reason,
        };
        if !(op.cut_time >= self.time(op.node) && op.cut_time < self.time(removed)) {
            return Err(bad(format!(
                "cut time {} outside the edge above node {}",
                op.cut_time, op.node
            )));
        }
        if !(op.join_time > op.cut_time) {
            return Err(bad(format!(
                "join time {} does not follow cut time {}",
                op.join_time, op.cut_time
            )));
        }
        if !view.contains(op.target) {
            return Err(bad(format!(
                "target {} is not part of the pruned tree",
                op.target
            )));
        }
        let on_edge = self.time(op.target) < op.join_time
            && view.edge_top(op.target).map_or(true, |top| op.join_time < top);
        if !on_edge {
            return Err(bad(format!(
                "join time {} outside the pruned edge above node {}",
                op.join_time, op.target
            )));
        }

        let mut parent: Vec<Option<usize>> = (0..self.n_nodes()).map(|x| view.parent(x)).collect();
        parent[removed] = view.parent(op.target);
        parent[op.target] = Some(removed);
        parent[op.node] = Some(removed);
        let mut time: Vec<f64> = (0..self.n_nodes()).map(|x| self.time(x)).collect();
        time[removed] = op.join_time;
        Ok(LocalTree::from_parts(self.n_leaves(), parent, time))
    }
}

/// Applies `ops` in order starting from `tree`, validating every tree produced.
pub(crate) fn apply_all<'a>(
    tree: &LocalTree,
    ops: impl IntoIterator<Item = (usize, &'a SprOp)>,
) -> Result<LocalTree, PathViolation> {
    tree.validate()?;
    let mut current = tree.clone();
    for (index, op) in ops {
        current = current
            .apply_spr(op)
            .map_err(|violation| violation.at_index(index))?;
        current.validate()?;
    }
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn four_leaf_tree() -> LocalTree {
        LocalTree::caterpillar(&[0, 1, 2, 3], &[0.5, 1.0, 2.0])
    }

    #[test]
    fn regraft_onto_outgroup_produces_valid_tree() {
        let tree = four_leaf_tree();
        let op = SprOp {
            site: 1,
            node: 0,
            cut_time: 0.2,
            target: 3,
            join_time: 1.5,
        };
        let next = tree.apply_spr(&op).unwrap();
        next.validate().unwrap();
        // leaf 1 now hangs where node 4 was
        assert_eq!(next.parent(1), Some(5));
        assert_eq!(next.parent(0), Some(4));
        assert_eq!(next.parent(3), Some(4));
        assert_eq!(next.parent(4), Some(6));
        assert_eq!(next.time(4), 1.5);
    }

    #[test]
    fn regraft_above_root_extends_the_tree() {
        let tree = four_leaf_tree();
        let op = SprOp {
            site: 1,
            node: 3,
            cut_time: 1.0,
            target: 5,
            join_time: 4.0,
        };
        let next = tree.apply_spr(&op).unwrap();
        next.validate().unwrap();
        assert_eq!(next.root(), Some(6));
        assert_eq!(next.root_time(), 4.0);
    }

    #[test]
    fn cutting_the_root_is_rejected() {
        let tree = four_leaf_tree();
        let op = SprOp {
            site: 1,
            node: 6,
            cut_time: 2.5,
            target: 0,
            join_time: 3.0,
        };
        assert!(matches!(
            tree.apply_spr(&op),
            Err(PathViolation::BadOperation { .. })
        ));
    }

    #[test]
    fn target_inside_pruned_subtree_is_rejected() {
        let tree = four_leaf_tree();
        let op = SprOp {
            site: 1,
            node: 4,
            cut_time: 0.7,
            target: 0,
            join_time: 0.8,
        };
        assert!(tree.apply_spr(&op).is_err());
    }

    #[test]
    fn join_below_target_is_rejected() {
        let tree = four_leaf_tree();
        let op = SprOp {
            site: 1,
            node: 0,
            cut_time: 0.1,
            target: 5,
            join_time: 0.3,
        };
        assert!(tree.apply_spr(&op).is_err());
    }
}
