use std::collections::BTreeSet;

use arbores_core::errors::{ArgError, ErrorInfo};
use serde::{Deserialize, Serialize};

use crate::path::PathState;

/// Observed polymorphism data: one row per haplotype, one column per site.
///
/// Immutable once loaded, except for the one-time promotion of sites that
/// carry a recombination of the initial path into the segregating list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenomeData {
    name: String,
    sample_names: Vec<String>,
    matrix: Vec<Vec<u8>>,
    n_sites: usize,
    segregating_sites: Vec<usize>,
    #[serde(default)]
    augmented_sites: Vec<usize>,
}

impl GenomeData {
    /// Builds data from a 0/1 matrix, validating its shape.
    pub fn new(
        name: impl Into<String>,
        sample_names: Vec<String>,
        matrix: Vec<Vec<u8>>,
    ) -> Result<Self, ArgError> {
        let name = name.into();
        if matrix.len() < 2 {
            return Err(ArgError::Data(
                ErrorInfo::new("too-few-samples", "at least two haplotypes are required")
                    .with_context("samples", matrix.len().to_string()),
            ));
        }
        if sample_names.len() != matrix.len() {
            return Err(ArgError::Data(
                ErrorInfo::new("name-count", "one name per haplotype is required")
                    .with_context("names", sample_names.len().to_string())
                    .with_context("samples", matrix.len().to_string()),
            ));
        }
        let n_sites = matrix[0].len();
        if n_sites == 0 {
            return Err(ArgError::Data(ErrorInfo::new(
                "no-sites",
                "haplotypes must span at least one site",
            )));
        }
        for (row, haplotype) in matrix.iter().enumerate() {
            if haplotype.len() != n_sites {
                return Err(ArgError::Data(
                    ErrorInfo::new("ragged-matrix", "haplotypes differ in length")
                        .with_context("row", row.to_string())
                        .with_context("expected", n_sites.to_string())
                        .with_context("found", haplotype.len().to_string()),
                ));
            }
            if let Some(site) = haplotype.iter().position(|&allele| allele > 1) {
                return Err(ArgError::Data(
                    ErrorInfo::new("bad-allele", "alleles must be 0 or 1")
                        .with_context("row", row.to_string())
                        .with_context("site", site.to_string()),
                ));
            }
        }
        let mut data = Self {
            name,
            sample_names,
            matrix,
            n_sites,
            segregating_sites: Vec::new(),
            augmented_sites: Vec::new(),
        };
        data.segregating_sites = (0..n_sites)
            .filter(|&site| data.is_polymorphic(site))
            .collect();
        Ok(data)
    }

    /// Name of the data set (usually the file stem).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Haplotype names in row order.
    pub fn sample_names(&self) -> &[String] {
        &self.sample_names
    }

    /// Number of haplotypes.
    pub fn n_samples(&self) -> usize {
        self.matrix.len()
    }

    /// Number of sites, segregating or not.
    pub fn n_sites(&self) -> usize {
        self.n_sites
    }

    /// Allele of `sample` at `site`.
    pub fn allele(&self, sample: usize, site: usize) -> u8 {
        self.matrix[sample][site]
    }

    /// Rows of the 0/1 matrix.
    pub fn matrix(&self) -> &[Vec<u8>] {
        &self.matrix
    }

    /// Sorted segregating sites, including any promoted by augmentation.
    pub fn segregating_sites(&self) -> &[usize] {
        &self.segregating_sites
    }

    /// Sites promoted to segregating status by augmentation.
    pub fn augmented_sites(&self) -> &[usize] {
        &self.augmented_sites
    }

    /// Whether both alleles occur in the column of `site`.
    pub fn is_polymorphic(&self, site: usize) -> bool {
        let first = self.matrix[0][site];
        self.matrix.iter().any(|row| row[site] != first)
    }

    /// Sites where both alleles occur, irrespective of augmentation.
    pub fn polymorphic_sites(&self) -> Vec<usize> {
        (0..self.n_sites)
            .filter(|&site| self.is_polymorphic(site))
            .collect()
    }

    /// Samples carrying allele 1 at `site`.
    pub fn derived_set(&self, site: usize) -> Vec<bool> {
        self.matrix.iter().map(|row| row[site] == 1).collect()
    }

    /// Promotes every site at which `path` recombines to segregating status.
    ///
    /// Applying this twice with the same path yields the same data.
    pub fn augment_with_non_segregating_sites(&self, path: &PathState) -> GenomeData {
        let current: BTreeSet<usize> = self.segregating_sites.iter().copied().collect();
        let promoted: BTreeSet<usize> = path
            .recombination_sites()
            .into_iter()
            .filter(|site| *site < self.n_sites && !current.contains(site))
            .collect();
        let mut augmented = self.clone();
        if promoted.is_empty() {
            return augmented;
        }
        augmented.segregating_sites = current.union(&promoted).copied().collect();
        let mut extra: BTreeSet<usize> = self.augmented_sites.iter().copied().collect();
        extra.extend(promoted);
        augmented.augmented_sites = extra.into_iter().collect();
        augmented
    }
}
