use sha2::{Digest, Sha256};

use crate::path::PathState;

/// Canonical SHA-256 digest of a path: shape, first tree and every operation.
pub fn canonical_hash(path: &PathState) -> String {
    let mut hasher = Sha256::new();
    hasher.update((path.n_sites() as u64).to_le_bytes());
    let tree = path.initial_tree();
    hasher.update((tree.n_nodes() as u64).to_le_bytes());
    for node in 0..tree.n_nodes() {
        let parent = tree.parent(node).map_or(u64::MAX, |p| p as u64);
        hasher.update(parent.to_le_bytes());
        hasher.update(tree.time(node).to_bits().to_le_bytes());
    }
    hasher.update((path.ops().len() as u64).to_le_bytes());
    for op in path.ops() {
        hasher.update((op.site as u64).to_le_bytes());
        hasher.update((op.node as u64).to_le_bytes());
        hasher.update(op.cut_time.to_bits().to_le_bytes());
        hasher.update((op.target as u64).to_le_bytes());
        hasher.update(op.join_time.to_bits().to_le_bytes());
    }
    format!("{:x}", hasher.finalize())
}
