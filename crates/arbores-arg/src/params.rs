use serde::{Deserialize, Serialize};

/// Model parameters held fixed for a whole run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    /// Mutation rate per site per unit of coalescent time.
    pub mu: f64,
    /// Recombination rate per site boundary per unit of coalescent time.
    pub rho: f64,
    /// Effective population size scaling the pairwise coalescence rate.
    #[serde(default = "default_n_eff")]
    pub n_eff: f64,
    /// Verbosity level; values above zero enable debug logging.
    #[serde(default)]
    pub verbosity: u8,
}

fn default_n_eff() -> f64 {
    1.0
}

impl Parameters {
    /// Creates parameters with unit effective population size.
    pub fn new(mu: f64, rho: f64) -> Self {
        Self {
            mu,
            rho,
            n_eff: default_n_eff(),
            verbosity: 0,
        }
    }
}

impl Default for Parameters {
    fn default() -> Self {
        Self::new(1.0, 1.0)
    }
}
