//! Semicolon separated template for manually collected trades:
//!
//! ```text
//! Timestamp;Currency;Type;Amount_Crypto;Price_Fiat;Fees_Fiat;Reference
//! 2021-03-01 10:00:00;BTC;Buy;0.5;20,000.00 EUR;9.99 EUR;Kraken
//! ```

use super::{parse_amount, ImportError};
use crate::ledger::{
    parse_datetime, Config, Currency, ExternalTransaction, LedgerEntry, Transaction,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

pub const HEADER_PREFIX: &str = "Timestamp;Currency;";

pub const COLUMNS: &[(&str, &str)] = &[
    ("Timestamp", "YYYY-MM-DD hh:mm:ss (UTC)"),
    ("Currency", "Currency bought, sold or transferred (e.g. BTC)"),
    ("Type", "Buy, Sell, Deposit or Withdrawal"),
    ("Amount_Crypto", "Quantity of Currency"),
    ("Price_Fiat", "Total in the reference currency, excluding fees (empty for transfers)"),
    ("Fees_Fiat", "Fees in the reference currency"),
    ("Reference", "Free text, e.g. the exchange"),
];

#[derive(Debug, Clone, Deserialize)]
pub struct Record {
    #[serde(rename = "Timestamp")]
    timestamp: String,
    #[serde(rename = "Currency")]
    currency: String,
    #[serde(rename = "Type")]
    kind: String,
    #[serde(rename = "Amount_Crypto")]
    amount_crypto: String,
    #[serde(rename = "Price_Fiat", default)]
    price_fiat: String,
    #[serde(rename = "Fees_Fiat", default)]
    fees_fiat: String,
    #[serde(rename = "Reference", default)]
    reference: String,
}

impl Record {
    fn into_entry(self, config: &Config) -> Result<Option<LedgerEntry>, ImportError> {
        if !matches!(self.kind.trim(), "Buy" | "Sell" | "Deposit" | "Withdrawal") {
            log::debug!(
                "Skipping {} row of {} {}",
                self.kind.trim(),
                self.amount_crypto,
                self.currency
            );
            return Ok(None);
        }

        let timestamp = parse_datetime(&self.timestamp)?;
        let currency = Currency::new(&self.currency);
        let amount = parse_amount(&self.amount_crypto)?;

        let entry: LedgerEntry = match self.kind.trim() {
            "Buy" => Transaction {
                timestamp,
                source_currency: config.fiat.clone(),
                source_amount: parse_amount(&self.price_fiat)?,
                target_currency: currency,
                target_amount: amount,
                fees: parse_optional(&self.fees_fiat)?,
                reference: self.reference,
            }
            .into(),
            "Sell" => Transaction {
                timestamp,
                source_currency: currency,
                source_amount: amount,
                target_currency: config.fiat.clone(),
                target_amount: parse_amount(&self.price_fiat)?,
                fees: parse_optional(&self.fees_fiat)?,
                reference: self.reference,
            }
            .into(),
            "Deposit" => ExternalTransaction {
                timestamp,
                currency,
                change_amount: amount.abs(),
                reference: self.reference,
            }
            .into(),
            "Withdrawal" => ExternalTransaction {
                timestamp,
                currency,
                change_amount: -amount.abs(),
                reference: self.reference,
            }
            .into(),
            _ => return Ok(None),
        };
        Ok(Some(entry))
    }
}

fn parse_optional(value: &str) -> Result<Decimal, ImportError> {
    if value.trim().is_empty() {
        Ok(Decimal::ZERO)
    } else {
        parse_amount(value)
    }
}

pub fn read_csv<R: Read>(reader: R, config: &Config) -> Result<Vec<LedgerEntry>, ImportError> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b';')
        .quote(b'"')
        .from_reader(reader);
    let mut entries = Vec::new();
    for record in rdr.deserialize::<Record>() {
        if let Some(entry) = record?.into_entry(config)? {
            entries.push(entry);
        }
    }
    Ok(entries)
}
