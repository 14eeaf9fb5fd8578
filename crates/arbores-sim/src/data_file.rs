use std::fs;
use std::path::Path;

use arbores_arg::GenomeData;
use arbores_core::errors::{ArgError, ErrorInfo};

/// Reads a haplotype file: one `name sequence` pair per line, the sequence
/// made of `0`/`1` characters. Blank lines and `#` comments are skipped.
///
/// The data set is named after the file stem.
pub fn read_genome(path: &Path) -> Result<GenomeData, ArgError> {
    let text =
        fs::read_to_string(path).map_err(|err| ArgError::io("data-read", err, path.display()))?;
    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "data".to_string());
    parse_genome(&name, &text)
}

pub fn parse_genome(name: &str, text: &str) -> Result<GenomeData, ArgError> {
    let mut names = Vec::new();
    let mut matrix = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut fields = line.split_whitespace();
        let (Some(sample), Some(sequence), None) = (fields.next(), fields.next(), fields.next())
        else {
            return Err(ArgError::Data(
                ErrorInfo::new("data-line", "expected `name sequence`")
                    .with_context("line", (index + 1).to_string()),
            ));
        };
        let row = sequence
            .chars()
            .map(|allele| match allele {
                '0' => Ok(0),
                '1' => Ok(1),
                other => Err(ArgError::Data(
                    ErrorInfo::new("bad-allele", format!("unexpected allele `{other}`"))
                        .with_context("line", (index + 1).to_string())
                        .with_hint("sequences are written with 0 (ancestral) and 1 (derived)"),
                )),
            })
            .collect::<Result<Vec<u8>, _>>()?;
        names.push(sample.to_string());
        matrix.push(row);
    }
    GenomeData::new(name, names, matrix)
}
