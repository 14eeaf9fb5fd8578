use crate::data::GenomeData;
use crate::params::Parameters;
use crate::path::{explaining_edges, PathState};
use crate::spr::PathViolation;

/// Result of a likelihood evaluation. Owned by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct LikelihoodData {
    /// Log-likelihood of the data given the path.
    pub log_likelihood: f64,
    /// Per-site contributions, summing to `log_likelihood`.
    pub per_site: Vec<f64>,
}

/// Infinite-sites Poisson mutation likelihood of `data` given `path`.
///
/// A monomorphic site contributes `-mu * L`, where `L` is the total length of
/// its local tree. A polymorphic site contributes `ln(mu * b) - mu * L`, where
/// `b` is the summed length of the edges that split the samples exactly as the
/// site does; it is `-inf` when no edge does.
pub fn likelihood(
    path: &PathState,
    data: &GenomeData,
    params: &Parameters,
) -> Result<LikelihoodData, PathViolation> {
    let mut per_site = vec![0.0; path.n_sites()];
    for interval in path.local_trees()? {
        let tree = &interval.tree;
        let total = tree.total_length();
        let masks = tree.clade_masks();
        for site in interval.start..interval.end.min(data.n_sites()) {
            per_site[site] = if data.is_polymorphic(site) {
                let branch: f64 = explaining_edges(tree, &masks, &data.derived_set(site))
                    .into_iter()
                    .map(|node| tree.edge_length(node))
                    .sum();
                if branch > 0.0 {
                    (params.mu * branch).ln() - params.mu * total
                } else {
                    f64::NEG_INFINITY
                }
            } else {
                -params.mu * total
            };
        }
    }
    Ok(LikelihoodData {
        log_likelihood: per_site.iter().sum(),
        per_site,
    })
}
