pub mod account;
pub mod calculator;
pub mod config;
pub mod events;
pub mod transaction;
pub mod warnings;

// Flat public surface for domain types and functions.
pub use account::{Account, AccountError, Lot, LotMatch, LotQueue};
pub use calculator::{BalanceSnapshot, Calculator, LedgerReport, YearTotals};
pub use config::{Config, Currency};
pub use events::{is_long_term, TaxEvent, TaxEventKind};
pub use transaction::{
    parse_datetime, validate_entries, ExternalTransaction, LedgerEntry, LedgerInput, Transaction,
    TransactionError,
};
pub use warnings::Warning;
