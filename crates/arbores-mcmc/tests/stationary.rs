//! Long chains on two-sample data whose posterior is known in closed form.

mod common;

use arbores_mcmc::{run, ChainEntry, RunConfig, RunContext};

fn root_time_moments(entries: &[ChainEntry]) -> (f64, f64) {
    let kept = &entries[entries.len() / 10..];
    let times: Vec<f64> = kept
        .iter()
        .map(|entry| entry.path.initial_tree().root_time())
        .collect();
    let n = times.len() as f64;
    let mean = times.iter().sum::<f64>() / n;
    let var = times.iter().map(|t| (t - mean).powi(2)).sum::<f64>() / n;
    (mean, var)
}

fn near_neutral(chain_length: usize, seed: u64) -> RunConfig {
    let mut config = RunConfig::default();
    config.chain_length = chain_length;
    config.seed = seed;
    config.parameters.mu = 1e-9;
    config.progress_interval = 0;
    config.jitter.step_size = 0.5;
    config
}

#[test]
fn jitter_alone_recovers_the_coalescent_root_time() {
    // one site, no boundaries: the root time of two samples is Exp(1)
    let data = common::genome("pair", &["0", "0"]);
    let mut config = near_neutral(200_000, 29);
    config.parameters.rho = 1e-9;
    config.segment_sampler_on = false;

    let mut ctx = RunContext::new(config).unwrap();
    let outcome = run(&mut ctx, data, None).unwrap();
    let (mean, var) = root_time_moments(outcome.chain.entries());
    assert!((mean - 1.0).abs() < 0.08, "root-time mean {mean}");
    assert!((var - 1.0).abs() < 0.25, "root-time variance {var}");
}

#[test]
fn insert_and_delete_balance_on_a_single_boundary() {
    // Two samples over two sites. Summing the recombinations at the single
    // boundary out of the prior leaves the first root time distributed as
    // Exp(1 + 2 rho - a) with a(1 - a) = 2 rho.
    let rho: f64 = 0.1;
    let a = (1.0 - (1.0 - 8.0 * rho).sqrt()) / 2.0;
    let rate = 1.0 + 2.0 * rho - a;
    let expected_mean = 1.0 / rate;
    let recombination_free_mean = 1.0 / (1.0 + 2.0 * rho);

    let data = common::genome("pair", &["00", "00"]);
    let mut config = near_neutral(200_000, 31);
    config.parameters.rho = rho;
    config.jitter.steps = 2;

    let mut ctx = RunContext::new(config).unwrap();
    let outcome = run(&mut ctx, data, None).unwrap();
    let entries = outcome.chain.entries();
    assert!(entries
        .iter()
        .any(|entry| entry.path.number_of_recombinations() > 0));

    let (mean, var) = root_time_moments(entries);
    assert!(
        (mean - expected_mean).abs() < 0.08,
        "root-time mean {mean}, expected {expected_mean}"
    );
    assert!((mean - recombination_free_mean).abs() > 0.12);
    assert!(
        (var - expected_mean.powi(2)).abs() < 0.35,
        "root-time variance {var}"
    );
}
