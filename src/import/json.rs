use crate::import::ImportError;
use crate::ledger::{LedgerEntry, LedgerInput};
use std::io::Read;

/// Read entries from the native JSON format (see `fifotax schema`)
pub fn read_json<R: Read>(reader: R) -> Result<Vec<LedgerEntry>, ImportError> {
    let input: LedgerInput = serde_json::from_reader(reader)?;
    Ok(input.entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Currency;
    use rust_decimal_macros::dec;

    #[test]
    fn reads_trades_and_transfers() {
        let json = r#"{"entries": [
            {"type": "External", "timestamp": "2021-01-01", "currency": "btc", "change_amount": "0.5"},
            {"type": "Trade", "timestamp": "2021-02-01T12:00:00Z", "source_currency": "BTC",
             "source_amount": "0.5", "target_currency": "EUR", "target_amount": "20000", "fees": "4.5"}
        ]}"#;
        let entries = read_json(json.as_bytes()).unwrap();
        assert_eq!(entries.len(), 2);
        let LedgerEntry::Trade(tx) = &entries[1] else {
            panic!("expected trade");
        };
        assert_eq!(tx.exchange_rate(&Currency::new("EUR")), Some(dec!(40000)));
        assert_eq!(tx.reference, "");
    }

    #[test]
    fn rejects_unknown_entry_type() {
        let json = r#"{"entries": [{"type": "Airdrop", "timestamp": "2021-01-01"}]}"#;
        assert!(matches!(
            read_json(json.as_bytes()),
            Err(ImportError::Json(_))
        ));
    }
}
