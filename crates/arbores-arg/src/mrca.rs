use serde::{Deserialize, Serialize};

use crate::path::PathState;
use crate::spr::PathViolation;

/// Time to the most recent common ancestor over one local-tree interval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MrcaInterval {
    /// First site of the interval.
    pub start: usize,
    /// One past the last site of the interval.
    pub end: usize,
    /// Root time of the interval's tree.
    pub tmrca: f64,
}

/// MRCA times of a complete path, emitted once per full scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MrcaSnapshot {
    /// One entry per local-tree interval.
    pub intervals: Vec<MrcaInterval>,
    /// TMRCA of every site.
    pub per_site: Vec<f64>,
    /// Site-averaged TMRCA.
    pub mean: f64,
}

/// Reads the root time of every local tree of `path`.
pub fn times_to_mrca(path: &PathState) -> Result<MrcaSnapshot, PathViolation> {
    let intervals: Vec<MrcaInterval> = path
        .local_trees()?
        .into_iter()
        .map(|interval| MrcaInterval {
            start: interval.start,
            end: interval.end,
            tmrca: interval.tree.root_time(),
        })
        .collect();
    let per_site: Vec<f64> = intervals
        .iter()
        .flat_map(|interval| (interval.start..interval.end).map(move |_| interval.tmrca))
        .collect();
    let mean = if per_site.is_empty() {
        0.0
    } else {
        per_site.iter().sum::<f64>() / per_site.len() as f64
    };
    Ok(MrcaSnapshot {
        intervals,
        per_site,
        mean,
    })
}
