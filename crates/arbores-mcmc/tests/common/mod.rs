#![allow(dead_code)]

use arbores_arg::GenomeData;
use arbores_mcmc::{ChainEntry, MoveKind, RunConfig};

pub fn genome(name: &str, rows: &[&str]) -> GenomeData {
    let names = (0..rows.len()).map(|i| format!("h{i}")).collect();
    let matrix = rows
        .iter()
        .map(|row| row.bytes().map(|b| b - b'0').collect())
        .collect();
    GenomeData::new(name, names, matrix).unwrap()
}

/// Four haplotypes, three polymorphic sites explained by a single tree.
pub fn four_by_three() -> GenomeData {
    genome("four-by-three", &["110", "110", "011", "001"])
}

/// Five haplotypes with conflicting splits, so the chain carries recombinations.
pub fn conflicting() -> GenomeData {
    genome(
        "conflicting",
        &["1010011", "1000010", "0110000", "0001101", "0100100"],
    )
}

pub fn config(chain_length: usize, seed: u64) -> RunConfig {
    let mut config = RunConfig::default();
    config.chain_length = chain_length;
    config.seed = seed;
    config.bridge_length = 2;
    config.parameters.mu = 0.8;
    config.parameters.rho = 0.4;
    config
}

/// Recomputes which entries close a sweep from the order of move kinds.
pub fn expected_full_scans(entries: &[ChainEntry], segment_count: usize) -> Vec<bool> {
    let mut position = 0;
    entries
        .iter()
        .map(|entry| match entry.diagnostics.move_kind {
            MoveKind::Init | MoveKind::Jitter => {
                position = 0;
                false
            }
            _ => {
                position += 1;
                position == segment_count
            }
        })
        .collect()
}
