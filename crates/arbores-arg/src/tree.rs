use serde::{Deserialize, Serialize};

use crate::spr::PathViolation;

/// Binary coalescent tree describing the genealogy of one genomic interval.
///
/// Nodes `0..n_leaves` are the sampled haplotypes at time zero; nodes
/// `n_leaves..2 * n_leaves - 1` are coalescence events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalTree {
    n_leaves: usize,
    parent: Vec<Option<usize>>,
    time: Vec<f64>,
}

impl LocalTree {
    /// Builds a tree from raw parent pointers and node times without validating it.
    pub fn from_parts(n_leaves: usize, parent: Vec<Option<usize>>, time: Vec<f64>) -> Self {
        Self {
            n_leaves,
            parent,
            time,
        }
    }

    /// Builds a caterpillar tree joining the leaves in `order`, one per coalescence.
    ///
    /// `times` holds the `n - 1` coalescence times and must be strictly increasing.
    pub fn caterpillar(order: &[usize], times: &[f64]) -> Self {
        let n_leaves = order.len();
        let n_nodes = 2 * n_leaves - 1;
        let mut parent = vec![None; n_nodes];
        let mut time = vec![0.0; n_nodes];
        let mut previous = order[0];
        for (step, &leaf) in order.iter().enumerate().skip(1) {
            let node = n_leaves + step - 1;
            parent[previous] = Some(node);
            parent[leaf] = Some(node);
            time[node] = times[step - 1];
            previous = node;
        }
        Self {
            n_leaves,
            parent,
            time,
        }
    }

    /// Number of sampled haplotypes.
    pub fn n_leaves(&self) -> usize {
        self.n_leaves
    }

    /// Number of nodes (leaves and coalescences).
    pub fn n_nodes(&self) -> usize {
        self.parent.len()
    }

    /// Parent of `node`, `None` for the root.
    pub fn parent(&self, node: usize) -> Option<usize> {
        self.parent[node]
    }

    /// Time of `node`.
    pub fn time(&self, node: usize) -> f64 {
        self.time[node]
    }

    /// Whether `node` is a sampled leaf.
    pub fn is_leaf(&self, node: usize) -> bool {
        node < self.n_leaves
    }

    /// Overwrites the time of `node`. The result may be invalid until checked.
    pub fn set_time(&mut self, node: usize, time: f64) {
        self.time[node] = time;
    }

    /// First parentless node.
    pub fn root(&self) -> Option<usize> {
        self.parent.iter().position(Option::is_none)
    }

    /// Time of the root, i.e. the time to the most recent common ancestor.
    pub fn root_time(&self) -> f64 {
        self.root().map(|root| self.time[root]).unwrap_or(0.0)
    }

    /// Children of `node` in increasing id order.
    pub fn children(&self, node: usize) -> Vec<usize> {
        self.parent
            .iter()
            .enumerate()
            .filter_map(|(child, parent)| (*parent == Some(node)).then_some(child))
            .collect()
    }

    /// Length of the edge above `node`; zero for the root.
    pub fn edge_length(&self, node: usize) -> f64 {
        self.parent[node]
            .map(|parent| self.time[parent] - self.time[node])
            .unwrap_or(0.0)
    }

    /// Sum of all edge lengths.
    pub fn total_length(&self) -> f64 {
        (0..self.n_nodes()).map(|node| self.edge_length(node)).sum()
    }

    /// Non-root nodes, i.e. the nodes that own an edge.
    pub fn edge_nodes(&self) -> Vec<usize> {
        (0..self.n_nodes())
            .filter(|&node| self.parent[node].is_some())
            .collect()
    }

    /// Internal node ids.
    pub fn internal_nodes(&self) -> std::ops::Range<usize> {
        self.n_leaves..self.n_nodes()
    }

    /// Whether `ancestor` lies on the path from `node` to the root (inclusive).
    pub fn is_ancestor(&self, ancestor: usize, node: usize) -> bool {
        let mut current = Some(node);
        let mut steps = 0;
        while let Some(x) = current {
            if x == ancestor {
                return true;
            }
            steps += 1;
            if steps > self.n_nodes() {
                return false;
            }
            current = self.parent[x];
        }
        false
    }

    /// Leaf set below every node, indexed by node then leaf.
    pub fn clade_masks(&self) -> Vec<Vec<bool>> {
        let mut masks = vec![vec![false; self.n_leaves]; self.n_nodes()];
        for leaf in 0..self.n_leaves {
            let mut current = Some(leaf);
            let mut steps = 0;
            while let Some(x) = current {
                masks[x][leaf] = true;
                steps += 1;
                if steps > self.n_nodes() {
                    break;
                }
                current = self.parent[x];
            }
        }
        masks
    }

    /// Leaves below `node`, in increasing order.
    pub fn leaves_below(&self, node: usize) -> Vec<usize> {
        (0..self.n_leaves)
            .filter(|&leaf| self.is_ancestor(node, leaf))
            .collect()
    }

    /// Number of lineages alive at time `t`.
    pub fn lineages_at(&self, t: f64) -> usize {
        (0..self.n_nodes())
            .filter(|&node| crosses(self.time[node], self.parent[node].map(|p| self.time[p]), t))
            .count()
    }

    /// Checks that the tree is a well-formed binary coalescent tree.
    pub fn validate(&self) -> Result<(), PathViolation> {
        let expected = (2 * self.n_leaves).saturating_sub(1);
        if self.n_leaves < 2 || self.parent.len() != expected || self.time.len() != expected {
            return Err(PathViolation::NodeCount {
                expected,
                found: self.parent.len().min(self.time.len()),
            });
        }
        for node in 0..expected {
            if !self.time[node].is_finite() {
                return Err(PathViolation::NonFiniteTime { node });
            }
            if let Some(parent) = self.parent[node] {
                if parent >= expected {
                    return Err(PathViolation::UnknownNode { node: parent });
                }
                if self.time[node] >= self.time[parent] {
                    return Err(PathViolation::TimeOrder { node, parent });
                }
            }
        }
        for leaf in 0..self.n_leaves {
            if self.time[leaf] != 0.0 {
                return Err(PathViolation::LeafTime { leaf });
            }
        }
        let roots: Vec<usize> = (0..expected)
            .filter(|&node| self.parent[node].is_none())
            .collect();
        if roots.len() != 1 {
            return Err(PathViolation::RootCount { found: roots.len() });
        }
        let root = roots[0];
        if self.is_leaf(root) {
            return Err(PathViolation::LeafRoot { node: root });
        }
        let mut arity = vec![0usize; expected];
        for parent in self.parent.iter().flatten() {
            arity[*parent] += 1;
        }
        for node in 0..expected {
            let required = if self.is_leaf(node) { 0 } else { 2 };
            if arity[node] != required {
                return Err(PathViolation::Arity {
                    node,
                    children: arity[node],
                });
            }
            if !self.is_ancestor(root, node) {
                return Err(PathViolation::Detached { node });
            }
        }
        Ok(())
    }

    /// View of the tree with the edge above `node` cut away.
    ///
    /// The subtree of `node` and its parent leave the tree; the sibling of
    /// `node` inherits the parent's place.
    pub fn pruned(&self, node: usize) -> Result<PrunedView<'_>, PathViolation> {
        if node >= self.n_nodes() {
            return Err(PathViolation::UnknownNode { node });
        }
        let removed = self.parent[node].ok_or_else(|| PathViolation::BadOperation {
            index: None,
            reason: format!("node {node} is the root and has no edge to cut"),
        })?;
        let siblings: Vec<usize> = self
            .children(removed)
            .into_iter()
            .filter(|&child| child != node)
            .collect();
        let &[sibling] = siblings.as_slice() else {
            return Err(PathViolation::Arity {
                node: removed,
                children: siblings.len() + 1,
            });
        };
        let mut parent = self.parent.clone();
        parent[sibling] = self.parent[removed];
        let included = (0..self.n_nodes())
            .map(|x| x != removed && !self.is_ancestor(node, x))
            .collect();
        Ok(PrunedView {
            tree: self,
            node,
            removed,
            parent,
            included,
        })
    }
}

/// The tree remaining after cutting the edge above a node, as seen by the
/// floating lineage while it re-coalesces.
#[derive(Debug, Clone)]
pub struct PrunedView<'a> {
    tree: &'a LocalTree,
    node: usize,
    removed: usize,
    parent: Vec<Option<usize>>,
    included: Vec<bool>,
}

impl<'a> PrunedView<'a> {
    /// The node whose edge was cut.
    pub fn node(&self) -> usize {
        self.node
    }

    /// The parent of the cut node, absent from the pruned tree.
    pub fn removed(&self) -> usize {
        self.removed
    }

    /// Whether `node` is part of the pruned tree.
    pub fn contains(&self, node: usize) -> bool {
        self.included.get(node).copied().unwrap_or(false)
    }

    /// Parent of `node` within the pruned tree.
    pub fn parent(&self, node: usize) -> Option<usize> {
        self.parent[node]
    }

    /// Time at which the pruned edge above `node` ends, `None` above the pruned root.
    pub fn edge_top(&self, node: usize) -> Option<f64> {
        self.parent[node].map(|parent| self.tree.time(parent))
    }

    /// Pruned-tree lineages alive at time `t`, in increasing id order.
    pub fn lineages_at(&self, t: f64) -> Vec<usize> {
        (0..self.tree.n_nodes())
            .filter(|&x| self.included[x] && crosses(self.tree.time(x), self.edge_top(x), t))
            .collect()
    }

    /// Integral of the pruned lineage count over `[from, to]`.
    pub fn lineage_integral(&self, from: f64, to: f64) -> f64 {
        if to <= from {
            return 0.0;
        }
        (0..self.tree.n_nodes())
            .filter(|&x| self.included[x])
            .map(|x| {
                let bottom = self.tree.time(x).max(from);
                let top = self.edge_top(x).unwrap_or(f64::INFINITY).min(to);
                (top - bottom).max(0.0)
            })
            .sum()
    }
}

fn crosses(bottom: f64, top: Option<f64>, t: f64) -> bool {
    bottom < t && top.map_or(true, |top| t < top)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn four_leaf_tree() -> LocalTree {
        LocalTree::caterpillar(&[0, 1, 2, 3], &[0.5, 1.0, 2.0])
    }

    #[test]
    fn caterpillar_is_valid() {
        let tree = four_leaf_tree();
        tree.validate().unwrap();
        assert_eq!(tree.root(), Some(6));
        assert_eq!(tree.children(4), vec![0, 1]);
        assert_eq!(tree.leaves_below(5), vec![0, 1, 2]);
        assert!((tree.total_length() - 5.5).abs() < 1e-12);
    }

    #[test]
    fn lineage_counts_follow_coalescences() {
        let tree = four_leaf_tree();
        assert_eq!(tree.lineages_at(0.25), 4);
        assert_eq!(tree.lineages_at(0.75), 3);
        assert_eq!(tree.lineages_at(1.5), 2);
        assert_eq!(tree.lineages_at(3.0), 1);
    }

    #[test]
    fn validate_rejects_time_inversion() {
        let mut tree = four_leaf_tree();
        tree.set_time(5, 0.25);
        assert!(matches!(
            tree.validate(),
            Err(PathViolation::TimeOrder { .. })
        ));
    }

    #[test]
    fn pruned_view_drops_subtree_and_parent() {
        let tree = four_leaf_tree();
        let view = tree.pruned(4).unwrap();
        assert_eq!(view.removed(), 5);
        assert!(!view.contains(0));
        assert!(!view.contains(4));
        assert!(!view.contains(5));
        assert_eq!(view.parent(2), Some(6));
        assert_eq!(view.lineages_at(1.5), vec![2, 3]);
        assert!((view.lineage_integral(0.0, 2.0) - 4.0).abs() < 1e-12);
    }
}
