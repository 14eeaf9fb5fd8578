use std::error::Error;
use std::fs;
use std::path::PathBuf;

use arbores_arg::path_from_json;
use arbores_core::errors::ArgError;
use arbores_mcmc::{run, AlwaysConfirm, RunConfig, RunContext};
use clap::{CommandFactory, Parser};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod data_file;
mod prompt;

use data_file::read_genome;
use prompt::StdinGate;

#[derive(Parser, Debug)]
#[command(
    name = "arbores-sim",
    about = "Sample ancestral recombination graphs by Markov chain Monte Carlo"
)]
struct Cli {
    /// Haplotype file, one `name sequence` line per sample.
    data: Option<PathBuf>,
    /// Number of chain entries to record.
    chain_length: Option<usize>,
    /// Mutation rate.
    mu: Option<f64>,
    /// Recombination rate.
    rho: Option<f64>,
    /// Seed of the random source.
    seed: Option<u64>,
    /// Directory receiving logs, diagnostics and the run manifest.
    out_dir: Option<PathBuf>,
    /// JSON path to start from instead of computing one.
    init_path: Option<PathBuf>,
    /// YAML configuration; positional arguments override its values.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Target number of segregating sites per segment.
    #[arg(long)]
    bridge_length: Option<usize>,
    /// Do not ask before sampling large inputs.
    #[arg(long)]
    yes: bool,
    /// Increase log verbosity.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

struct Positionals {
    data: PathBuf,
    chain_length: usize,
    mu: f64,
    rho: f64,
    seed: u64,
    out_dir: PathBuf,
}

impl Cli {
    fn positionals(&self) -> Option<Positionals> {
        Some(Positionals {
            data: self.data.clone()?,
            chain_length: self.chain_length?,
            mu: self.mu?,
            rho: self.rho?,
            seed: self.seed?,
            out_dir: self.out_dir.clone()?,
        })
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let Some(args) = cli.positionals() else {
        // usage is not an error
        println!("{}", Cli::command().render_usage());
        return Ok(());
    };
    init_tracing(cli.verbose);

    let config = build_config(&cli, &args)?;
    let data = read_genome(&args.data)?;
    let initial = match &cli.init_path {
        Some(path) => {
            let json = fs::read_to_string(path)
                .map_err(|err| ArgError::io("init-path-read", err, path.display()))?;
            Some(path_from_json(&json)?)
        }
        None => None,
    };

    let mut ctx = RunContext::new(config)?;
    ctx = if cli.yes {
        ctx.with_gate(AlwaysConfirm)
    } else {
        ctx.with_gate(StdinGate)
    };
    let outcome = run(&mut ctx, data, initial)?;
    info!(
        out_dir = %args.out_dir.display(),
        full_scans = outcome.summary.full_scan_count,
        final_hash = %outcome.summary.final_path_hash,
        "run complete"
    );
    println!("{}", serde_json::to_string_pretty(&outcome.summary)?);
    Ok(())
}

fn init_tracing(verbose: u8) {
    let default = if verbose > 0 { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_config(cli: &Cli, args: &Positionals) -> Result<RunConfig, ArgError> {
    let mut config = match &cli.config {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    };
    config.chain_length = args.chain_length;
    config.parameters.mu = args.mu;
    config.parameters.rho = args.rho;
    config.parameters.verbosity = cli.verbose;
    config.seed = args.seed;
    config.output.run_directory = Some(args.out_dir.clone());
    if let Some(length) = cli.bridge_length {
        config.bridge_length = length;
    }
    config.validate()?;
    Ok(config)
}
