#![deny(missing_docs)]

//! Ancestral recombination graph trajectories under the sequentially Markov
//! coalescent, the observed polymorphism data they explain, and the density
//! oracles (mutation likelihood and SMC prior) evaluated on them.

mod data;
mod hash;
mod init;
mod likelihood;
mod mrca;
mod params;
mod path;
mod prior;
mod serialization;
mod spr;
mod tree;

pub use data::GenomeData;
pub use hash::canonical_hash;
pub use init::initialise;
pub use likelihood::{likelihood, LikelihoodData};
pub use mrca::{times_to_mrca, MrcaInterval, MrcaSnapshot};
pub use params::Parameters;
pub use path::{LocalInterval, PathState};
pub use prior::{coalescent_log_density, smc_prior, SmcPriorData};
pub use serialization::{path_from_json, path_to_json, path_to_json_line};
pub use spr::{PathViolation, SprOp};
pub use tree::{LocalTree, PrunedView};
