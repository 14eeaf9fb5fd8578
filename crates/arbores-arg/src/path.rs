use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::data::GenomeData;
use crate::spr::{apply_all, PathViolation, SprOp};
use crate::tree::LocalTree;

/// One ARG trajectory: the local tree of the first site followed by the
/// recombination operations that transform it along the genome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathState {
    n_sites: usize,
    initial_tree: LocalTree,
    ops: Vec<SprOp>,
}

/// A maximal run of sites sharing one local tree.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalInterval {
    /// First site of the interval.
    pub start: usize,
    /// One past the last site of the interval.
    pub end: usize,
    /// Genealogy of the interval.
    pub tree: LocalTree,
}

impl PathState {
    /// Assembles a path. Call [`PathState::check_complete`] before trusting it.
    pub fn new(n_sites: usize, initial_tree: LocalTree, ops: Vec<SprOp>) -> Self {
        Self {
            n_sites,
            initial_tree,
            ops,
        }
    }

    /// A path without recombination.
    pub fn from_tree(n_sites: usize, tree: LocalTree) -> Self {
        Self::new(n_sites, tree, Vec::new())
    }

    /// Number of sites spanned.
    pub fn n_sites(&self) -> usize {
        self.n_sites
    }

    /// Number of sampled haplotypes.
    pub fn n_leaves(&self) -> usize {
        self.initial_tree.n_leaves()
    }

    /// Tree of the first site.
    pub fn initial_tree(&self) -> &LocalTree {
        &self.initial_tree
    }

    /// Recombination operations sorted by site.
    pub fn ops(&self) -> &[SprOp] {
        &self.ops
    }

    /// Returns a copy carrying a different first tree.
    pub fn with_initial_tree(&self, tree: LocalTree) -> Self {
        Self::new(self.n_sites, tree, self.ops.clone())
    }

    /// Returns a copy carrying a different operation list.
    pub fn with_ops(&self, ops: Vec<SprOp>) -> Self {
        Self::new(self.n_sites, self.initial_tree.clone(), ops)
    }

    /// Number of recombination operations.
    pub fn number_of_recombinations(&self) -> usize {
        self.ops.len()
    }

    /// Number of continuous time variables: coalescences of the first tree
    /// plus a cut and a join time per recombination.
    pub fn number_of_free_times(&self) -> usize {
        self.n_leaves().saturating_sub(1) + 2 * self.ops.len()
    }

    /// Distinct sites at which the local tree changes.
    pub fn recombination_sites(&self) -> BTreeSet<usize> {
        self.ops.iter().map(|op| op.site).collect()
    }

    /// Number of local-tree intervals along the genome.
    pub fn path_len(&self) -> usize {
        self.recombination_sites().len() + 1
    }

    /// Indices of operations whose site lies in `[start, end)`.
    pub fn ops_in_window(&self, start: usize, end: usize) -> Vec<usize> {
        self.ops
            .iter()
            .enumerate()
            .filter(|(_, op)| op.site >= start && op.site < end)
            .map(|(index, _)| index)
            .collect()
    }

    /// Whether operation `index` is the last one applied at its site.
    pub fn is_last_at_site(&self, index: usize) -> bool {
        self.ops
            .get(index + 1)
            .map_or(true, |next| next.site != self.ops[index].site)
    }

    /// Whether operation `index` is the first one applied at its site.
    pub fn is_first_at_site(&self, index: usize) -> bool {
        index == 0 || self.ops[index - 1].site != self.ops[index].site
    }

    /// Position at which a new operation at `site` is appended after every
    /// operation already sharing that site.
    pub fn insertion_index(&self, site: usize) -> usize {
        self.ops.partition_point(|op| op.site <= site)
    }

    /// Tree in effect before operation `index` is applied.
    pub fn tree_before_op(&self, index: usize) -> Result<LocalTree, PathViolation> {
        apply_all(
            &self.initial_tree,
            self.ops[..index.min(self.ops.len())].iter().enumerate(),
        )
    }

    /// Local tree governing `site`.
    pub fn tree_at(&self, site: usize) -> Result<LocalTree, PathViolation> {
        apply_all(
            &self.initial_tree,
            self.ops.iter().enumerate().take_while(|(_, op)| op.site <= site),
        )
    }

    /// Splits the genome into intervals sharing a local tree.
    pub fn local_trees(&self) -> Result<Vec<LocalInterval>, PathViolation> {
        self.initial_tree.validate()?;
        let mut intervals = Vec::with_capacity(self.ops.len() + 1);
        let mut current = self.initial_tree.clone();
        let mut start = 0;
        let mut index = 0;
        while index < self.ops.len() {
            let site = self.ops[index].site;
            if site == 0 || site >= self.n_sites {
                return Err(PathViolation::SiteOutOfRange { index, site });
            }
            if site < start {
                return Err(PathViolation::Unsorted { index });
            }
            intervals.push(LocalInterval {
                start,
                end: site,
                tree: current.clone(),
            });
            let group_end = index
                + self.ops[index..]
                    .iter()
                    .take_while(|op| op.site == site)
                    .count();
            current = apply_all(&current, (index..group_end).map(|i| (i, &self.ops[i])))?;
            start = site;
            index = group_end;
        }
        intervals.push(LocalInterval {
            start,
            end: self.n_sites,
            tree: current,
        });
        Ok(intervals)
    }

    /// Complete structural validity: every tree along the path is well formed
    /// and every operation is consistent with the tree it transforms.
    pub fn check_complete(&self) -> Result<(), PathViolation> {
        for (index, pair) in self.ops.windows(2).enumerate() {
            if pair[1].site < pair[0].site {
                return Err(PathViolation::Unsorted { index: index + 1 });
            }
        }
        self.local_trees().map(|_| ())
    }

    /// Data compatibility: every polymorphic site is explained by an edge of
    /// its local tree whose leaf set matches the derived alleles or their
    /// complement.
    pub fn check_compatible(&self, data: &GenomeData) -> Result<(), PathViolation> {
        if data.n_samples() != self.n_leaves() || data.n_sites() != self.n_sites {
            return Err(PathViolation::ShapeMismatch {
                path_leaves: self.n_leaves(),
                path_sites: self.n_sites,
                data_samples: data.n_samples(),
                data_sites: data.n_sites(),
            });
        }
        for interval in self.local_trees()? {
            let masks = interval.tree.clade_masks();
            for site in interval.start..interval.end {
                if data.is_polymorphic(site)
                    && explaining_edges(&interval.tree, &masks, &data.derived_set(site)).is_empty()
                {
                    return Err(PathViolation::Incompatible { site });
                }
            }
        }
        Ok(())
    }
}

/// Non-root nodes whose clade equals `derived` or its complement.
pub(crate) fn explaining_edges(tree: &LocalTree, masks: &[Vec<bool>], derived: &[bool]) -> Vec<usize> {
    tree.edge_nodes()
        .into_iter()
        .filter(|&node| {
            let mask = &masks[node];
            mask.as_slice() == derived || mask.iter().zip(derived).all(|(a, b)| a != b)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_tree() -> LocalTree {
        LocalTree::caterpillar(&[0, 1, 2, 3], &[0.5, 1.0, 2.0])
    }

    fn op(site: usize) -> SprOp {
        SprOp {
            site,
            node: 0,
            cut_time: 0.2,
            target: 3,
            join_time: 1.5,
        }
    }

    #[test]
    fn intervals_cover_the_genome() {
        let path = PathState::new(5, base_tree(), vec![op(2)]);
        let intervals = path.local_trees().unwrap();
        assert_eq!(intervals.len(), 2);
        assert_eq!((intervals[0].start, intervals[0].end), (0, 2));
        assert_eq!((intervals[1].start, intervals[1].end), (2, 5));
        assert_eq!(path.path_len(), 2);
        assert_eq!(path.number_of_free_times(), 5);
    }

    #[test]
    fn out_of_range_sites_break_completeness() {
        let path = PathState::new(3, base_tree(), vec![op(3)]);
        assert!(matches!(
            path.check_complete(),
            Err(PathViolation::SiteOutOfRange { .. })
        ));
        let path = PathState::new(3, base_tree(), vec![op(0)]);
        assert!(path.check_complete().is_err());
    }

    #[test]
    fn insertion_index_appends_after_shared_site() {
        let mut second = op(2);
        second.node = 1;
        let path = PathState::new(5, base_tree(), vec![op(1), second]);
        assert_eq!(path.insertion_index(1), 1);
        assert_eq!(path.insertion_index(2), 2);
        assert_eq!(path.insertion_index(0), 0);
        assert!(path.is_last_at_site(0));
        assert!(path.is_first_at_site(1));
    }
}
