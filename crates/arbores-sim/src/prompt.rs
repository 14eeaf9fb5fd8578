use std::io::{self, BufRead, Write};

use arbores_mcmc::ConfirmationGate;

/// Asks on the terminal before sampling large inputs.
#[derive(Debug, Default)]
pub struct StdinGate;

impl ConfirmationGate for StdinGate {
    fn confirm(&mut self, n_sites: usize, threshold: usize) -> bool {
        eprint!("{n_sites} sites (threshold {threshold}); the chain may mix slowly. Continue? [y/N] ");
        let _ = io::stderr().flush();
        let mut answer = String::new();
        match io::stdin().lock().read_line(&mut answer) {
            Ok(_) => accepts(&answer),
            Err(_) => false,
        }
    }
}

fn accepts(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
