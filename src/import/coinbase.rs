//! Coinbase transaction history export.
//!
//! Only `Buy` and `Sell` rows are trades against the reference currency;
//! every other transaction type is skipped.

use super::{parse_amount, ImportError};
use crate::ledger::{parse_datetime, Config, Currency, LedgerEntry, Transaction};
use serde::Deserialize;
use std::io::Read;

pub const HEADER_PREFIX: &str = "Timestamp,Transaction Type,";

const REFERENCE: &str = "Coinbase";

// Timestamp,Transaction Type,Asset,Quantity Transacted,Spot Price Currency,Spot Price at Transaction,Subtotal,Total (inclusive of fees),Fees,Notes
// 2021-04-14T08:01:02Z,Buy,BTC,0.01,EUR,52000.00,520.00,527.80,7.80,Bought 0.01 BTC for €527.80 EUR

#[derive(Debug, Clone, Deserialize)]
pub struct Record {
    #[serde(rename = "Timestamp")]
    timestamp: String,
    #[serde(rename = "Transaction Type")]
    transaction_type: String,
    #[serde(rename = "Asset")]
    asset: String,
    #[serde(rename = "Quantity Transacted")]
    quantity: String,
    #[serde(rename = "Total (inclusive of fees)")]
    total: String,
    #[serde(rename = "Fees")]
    fees: String,
}

impl Record {
    fn into_entry(self, config: &Config) -> Result<Option<LedgerEntry>, ImportError> {
        let is_buy = match self.transaction_type.as_str() {
            "Buy" => true,
            "Sell" => false,
            other => {
                log::debug!("Skipping Coinbase {} of {} {}", other, self.quantity, self.asset);
                return Ok(None);
            }
        };

        let timestamp = parse_datetime(&self.timestamp)?;
        let asset = Currency::new(&self.asset);
        let quantity = parse_amount(&self.quantity)?;
        let total = parse_amount(&self.total)?;
        let fees = parse_amount(&self.fees)?;

        let tx = if is_buy {
            Transaction {
                timestamp,
                source_currency: config.fiat.clone(),
                source_amount: total,
                target_currency: asset,
                target_amount: quantity,
                fees,
                reference: REFERENCE.to_string(),
            }
        } else {
            Transaction {
                timestamp,
                source_currency: asset,
                source_amount: quantity,
                target_currency: config.fiat.clone(),
                target_amount: total,
                fees,
                reference: REFERENCE.to_string(),
            }
        };
        Ok(Some(tx.into()))
    }
}

pub fn read_csv<R: Read>(reader: R, config: &Config) -> Result<Vec<LedgerEntry>, ImportError> {
    let mut rdr = csv::Reader::from_reader(reader);
    let mut entries = Vec::new();
    for record in rdr.deserialize::<Record>() {
        if let Some(entry) = record?.into_entry(config)? {
            entries.push(entry);
        }
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const CSV: &str = "\
Timestamp,Transaction Type,Asset,Quantity Transacted,Spot Price Currency,Spot Price at Transaction,Subtotal,Total (inclusive of fees),Fees,Notes
2021-04-14T08:01:02Z,Buy,BTC,0.01,EUR,52000.00,520.00,527.80,7.80,Bought BTC
2021-04-15T10:00:00Z,Send,BTC,0.002,EUR,53000.00,,,,Sent BTC
2021-05-20T16:45:00Z,Sell,BTC,0.005,EUR,36000.00,180.00,177.30,2.70,Sold BTC
";

    #[test]
    fn imports_buys_and_sells_only() {
        let entries = read_csv(CSV.as_bytes(), &Config::new("EUR")).unwrap();
        assert_eq!(entries.len(), 2);

        let LedgerEntry::Trade(buy) = &entries[0] else {
            panic!("expected trade");
        };
        assert_eq!(buy.source_currency, Currency::new("EUR"));
        assert_eq!(buy.source_amount, dec!(527.80));
        assert_eq!(buy.target_amount, dec!(0.01));
        assert_eq!(buy.fees, dec!(7.80));
        assert_eq!(buy.reference, "Coinbase");

        let LedgerEntry::Trade(sell) = &entries[1] else {
            panic!("expected trade");
        };
        assert_eq!(sell.source_currency, Currency::new("BTC"));
        assert_eq!(sell.source_amount, dec!(0.005));
        assert_eq!(sell.target_amount, dec!(177.30));
        assert_eq!(
            sell.timestamp,
            parse_datetime("2021-05-20 16:45:00").unwrap()
        );
    }
}
