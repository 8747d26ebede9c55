pub mod balances;
pub mod events;
pub mod report;
pub mod schema;

use clap::Args;
use fifotax::import::{self, InputFormat};
use fifotax::ledger::{validate_entries, Calculator, Config, LedgerEntry, LedgerReport};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// Input files shared by every ledger command
#[derive(Args, Debug)]
pub struct LedgerArgs {
    /// JSON, custom CSV or Coinbase CSV files, merged before processing.
    /// Reads from stdin with "-".
    #[arg(default_value = "-")]
    files: Vec<PathBuf>,
}

impl LedgerArgs {
    /// Import, validate and process all input files
    pub fn run(&self, config: &Config) -> anyhow::Result<LedgerReport> {
        let mut entries = Vec::new();
        for path in &self.files {
            entries.append(&mut read_entries(path, config)?);
        }
        validate_entries(&entries, config)?;
        Ok(Calculator::new(config.clone()).run(entries))
    }
}

fn read_entries(path: &Path, config: &Config) -> anyhow::Result<Vec<LedgerEntry>> {
    if path.as_os_str() == "-" {
        read_from_stdin(config)
    } else {
        Ok(import::read_file(path, config)?)
    }
}

fn read_from_stdin(config: &Config) -> anyhow::Result<Vec<LedgerEntry>> {
    let mut buffer = String::new();
    io::stdin().lock().read_to_string(&mut buffer)?;

    let content = buffer.trim_start_matches('\u{feff}');
    if content.trim().is_empty() {
        anyhow::bail!("No input received. Provide a file or pipe data to stdin.");
    }

    let first_line = content.lines().next().unwrap_or_default();
    let Some(format) = InputFormat::detect(first_line) else {
        anyhow::bail!("Unrecognized input format on stdin");
    };
    Ok(import::read_str(content, format, config)?)
}
