//! FIFO capital gains ledger.
//!
//! Trades between a reference (fiat) currency and other currencies are
//! replayed in time order. Every buy opens a lot, every sell consumes the
//! oldest open lots, and the realized gains and fees are totalled per
//! calendar year with long-term (held one year or more) gains exempt.

pub mod format;
pub mod import;
pub mod ledger;

pub use ledger::{Calculator, Config, Currency, LedgerEntry, LedgerReport};
