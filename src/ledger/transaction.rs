use super::config::{Config, Currency};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TransactionError {
    #[error("trade has no {fiat} leg: {transaction}")]
    NoReferenceLeg { transaction: String, fiat: Currency },
    #[error("both legs of trade are {fiat}: {transaction}")]
    BothReferenceLegs { transaction: String, fiat: Currency },
    #[error("trade amounts must be positive: {0}")]
    NonPositiveAmount(String),
    #[error("invalid datetime: {0}")]
    InvalidDatetime(String),
}

/// Input root for ledger JSON
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LedgerInput {
    pub entries: Vec<LedgerEntry>,
}

/// A single normalized input record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type")]
pub enum LedgerEntry {
    /// Conversion of one currency into another
    Trade(Transaction),
    /// Deposit into or withdrawal out of the tracked accounts
    External(ExternalTransaction),
}

impl LedgerEntry {
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            LedgerEntry::Trade(tx) => tx.timestamp,
            LedgerEntry::External(ext) => ext.timestamp,
        }
    }
}

impl From<Transaction> for LedgerEntry {
    fn from(tx: Transaction) -> Self {
        LedgerEntry::Trade(tx)
    }
}

impl From<ExternalTransaction> for LedgerEntry {
    fn from(ext: ExternalTransaction) -> Self {
        LedgerEntry::External(ext)
    }
}

/// Trade of `source_amount` of one currency for `target_amount` of another.
/// Amounts exclude fees; fees are always in the reference currency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Transaction {
    /// When the trade happened (RFC3339; offset-less times and bare dates are UTC)
    #[serde(deserialize_with = "deserialize_datetime")]
    #[schemars(with = "String")]
    pub timestamp: DateTime<Utc>,
    pub source_currency: Currency,
    #[schemars(with = "String")]
    pub source_amount: Decimal,
    pub target_currency: Currency,
    #[schemars(with = "String")]
    pub target_amount: Decimal,
    #[serde(default)]
    #[schemars(with = "String")]
    pub fees: Decimal,
    #[serde(default)]
    pub reference: String,
}

impl Transaction {
    /// Price of one unit of the non-reference leg, in the reference currency.
    ///
    /// `None` unless exactly one leg is `fiat`.
    pub fn exchange_rate(&self, fiat: &Currency) -> Option<Decimal> {
        match (self.source_currency == *fiat, self.target_currency == *fiat) {
            (true, false) => self.source_amount.checked_div(self.target_amount),
            (false, true) => self.target_amount.checked_div(self.source_amount),
            _ => None,
        }
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} {} -> {} {} (fees: {}, ref: {})",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.source_amount,
            self.source_currency,
            self.target_amount,
            self.target_currency,
            self.fees,
            self.reference
        )
    }
}

/// Transfer across the boundary of the tracked accounts. Negative amounts
/// are withdrawals, positive amounts deposits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ExternalTransaction {
    #[serde(deserialize_with = "deserialize_datetime")]
    #[schemars(with = "String")]
    pub timestamp: DateTime<Utc>,
    pub currency: Currency,
    #[schemars(with = "String")]
    pub change_amount: Decimal,
    #[serde(default)]
    pub reference: String,
}

impl fmt::Display for ExternalTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} {} (ref: {})",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.change_amount,
            self.currency,
            self.reference
        )
    }
}

/// Check the input contract the calculator relies on: every trade has
/// positive amounts and exactly one leg in the reference currency.
pub fn validate_entries(entries: &[LedgerEntry], config: &Config) -> Result<(), TransactionError> {
    for entry in entries {
        let LedgerEntry::Trade(tx) = entry else {
            continue;
        };
        if tx.source_amount <= Decimal::ZERO || tx.target_amount <= Decimal::ZERO {
            return Err(TransactionError::NonPositiveAmount(tx.to_string()));
        }
        match (
            config.is_fiat(&tx.source_currency),
            config.is_fiat(&tx.target_currency),
        ) {
            (false, false) => {
                return Err(TransactionError::NoReferenceLeg {
                    transaction: tx.to_string(),
                    fiat: config.fiat.clone(),
                })
            }
            (true, true) => {
                return Err(TransactionError::BothReferenceLegs {
                    transaction: tx.to_string(),
                    fiat: config.fiat.clone(),
                })
            }
            _ => {}
        }
    }
    Ok(())
}

pub fn parse_datetime(s: &str) -> Result<DateTime<Utc>, TransactionError> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(dt.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .ok_or_else(|| TransactionError::InvalidDatetime(s.to_string()))
}

fn deserialize_datetime<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: String = Deserialize::deserialize(deserializer)?;
    parse_datetime(&s).map_err(|err| serde::de::Error::custom(err.to_string()))
}
