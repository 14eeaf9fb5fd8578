use arbores_arg::GenomeData;
use criterion::{criterion_group, criterion_main, Criterion};

use arbores_mcmc::{run, RunConfig, RunContext};

fn sample_data() -> GenomeData {
    let rows = ["10100110", "10000101", "01100000", "00011011", "01001001", "11000000"];
    let names = (0..rows.len()).map(|i| format!("h{i}")).collect();
    let matrix = rows
        .iter()
        .map(|row| row.bytes().map(|b| b - b'0').collect())
        .collect();
    GenomeData::new("bench", names, matrix).unwrap()
}

fn bench_chain(c: &mut Criterion) {
    let data = sample_data();
    let mut config = RunConfig::default();
    config.chain_length = 200;
    config.bridge_length = 2;
    config.output.run_directory = None;
    config.progress_interval = 0;

    c.bench_function("mcmc_chain", |b| {
        b.iter(|| {
            let mut ctx = RunContext::new(config.clone()).unwrap();
            let _ = run(&mut ctx, data.clone(), None).unwrap();
        })
    });
}

criterion_group!(benches, bench_chain);
criterion_main!(benches);
