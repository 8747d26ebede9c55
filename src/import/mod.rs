//! Normalizes input files into [`LedgerEntry`] records.
//!
//! The format is picked from the first line of each file, so files exported
//! from different places can be passed together.

pub mod coinbase;
pub mod custom;
pub mod json;

use crate::ledger::{Config, LedgerEntry, TransactionError};
use rust_decimal::Decimal;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("unrecognized input format: {0}")]
    UnknownFormat(PathBuf),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("invalid number: {0:?}")]
    InvalidNumber(String),
    #[error(transparent)]
    Transaction(#[from] TransactionError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Json,
    Custom,
    Coinbase,
}

impl InputFormat {
    /// Identify the format from the first line of a file
    pub fn detect(first_line: &str) -> Option<Self> {
        let line = first_line.trim_start_matches('\u{feff}').trim_start();
        if line.starts_with('{') {
            Some(InputFormat::Json)
        } else if line.starts_with(custom::HEADER_PREFIX) {
            Some(InputFormat::Custom)
        } else if line.starts_with(coinbase::HEADER_PREFIX) {
            Some(InputFormat::Coinbase)
        } else {
            None
        }
    }
}

/// Read one input file of any supported format
pub fn read_file(path: &Path, config: &Config) -> Result<Vec<LedgerEntry>, ImportError> {
    let content = fs::read_to_string(path).map_err(|source| ImportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let content = content.trim_start_matches('\u{feff}');
    let first_line = content.lines().next().unwrap_or_default();
    let format = InputFormat::detect(first_line)
        .ok_or_else(|| ImportError::UnknownFormat(path.to_path_buf()))?;

    let entries = read_str(content, format, config)?;
    log::info!(
        "Read {} entries from {} ({:?})",
        entries.len(),
        path.display(),
        format
    );
    Ok(entries)
}

/// Read and merge several input files
pub fn read_files<P: AsRef<Path>>(
    paths: &[P],
    config: &Config,
) -> Result<Vec<LedgerEntry>, ImportError> {
    let mut entries = Vec::new();
    for path in paths {
        entries.append(&mut read_file(path.as_ref(), config)?);
    }
    Ok(entries)
}

pub fn read_str(
    content: &str,
    format: InputFormat,
    config: &Config,
) -> Result<Vec<LedgerEntry>, ImportError> {
    match format {
        InputFormat::Json => json::read_json(content.as_bytes()),
        InputFormat::Custom => custom::read_csv(content.as_bytes(), config),
        InputFormat::Coinbase => coinbase::read_csv(content.as_bytes(), config),
    }
}

/// Parse an exported number, dropping unit suffixes and `,` thousands
/// separators (`"1,234.5 EUR"` -> `1234.5`).
pub fn parse_amount(value: &str) -> Result<Decimal, ImportError> {
    let cleaned: String = value
        .chars()
        .filter(|c| !c.is_ascii_alphabetic() && *c != ',')
        .collect();
    Decimal::from_str(cleaned.trim()).map_err(|_| ImportError::InvalidNumber(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn detects_formats_from_header() {
        assert_eq!(
            InputFormat::detect("Timestamp;Currency;Type;Amount_Crypto"),
            Some(InputFormat::Custom)
        );
        assert_eq!(
            InputFormat::detect("\u{feff}Timestamp;Currency;Type"),
            Some(InputFormat::Custom)
        );
        assert_eq!(
            InputFormat::detect("Timestamp,Transaction Type,Asset"),
            Some(InputFormat::Coinbase)
        );
        assert_eq!(InputFormat::detect("  {\"entries\": []}"), Some(InputFormat::Json));
        assert_eq!(InputFormat::detect("Date(UTC);Pair;Side"), None);
    }

    #[test]
    fn parses_amounts_with_units_and_separators() {
        assert_eq!(parse_amount("1,234.56 EUR").unwrap(), dec!(1234.56));
        assert_eq!(parse_amount("0.5BTC").unwrap(), dec!(0.5));
        assert_eq!(parse_amount(" 12 ").unwrap(), dec!(12));
        assert_eq!(parse_amount("-3.25").unwrap(), dec!(-3.25));
        assert!(matches!(
            parse_amount("n/a"),
            Err(ImportError::InvalidNumber(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = read_file(Path::new("does/not/exist.csv"), &Config::default()).unwrap_err();
        assert!(matches!(err, ImportError::Io { .. }));
    }
}
