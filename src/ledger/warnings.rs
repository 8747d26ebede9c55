use super::config::Currency;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;

/// Recoverable problems found while building the ledger. None of them stop
/// the run; they only suppress tax events for the affected trade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum Warning {
    /// A withdrawal asked for more than the open lots held. The lots that
    /// did exist are gone and no sell events were recorded.
    InsufficientFunds {
        timestamp: DateTime<Utc>,
        reference: String,
        currency: Currency,
        requested: Decimal,
        available: Decimal,
    },
    /// Neither a buy nor a sell against the reference currency.
    UnclassifiableTrade {
        timestamp: DateTime<Utc>,
        reference: String,
        source_currency: Currency,
        target_currency: Currency,
    },
    /// A sold lot was not created by a recorded buy, so it has no cost basis.
    UnknownLotOrigin {
        timestamp: DateTime<Utc>,
        reference: String,
        currency: Currency,
        amount: Decimal,
    },
}

impl Warning {
    pub fn name(&self) -> &'static str {
        match self {
            Warning::InsufficientFunds { .. } => "InsufficientFunds",
            Warning::UnclassifiableTrade { .. } => "UnclassifiableTrade",
            Warning::UnknownLotOrigin { .. } => "UnknownLotOrigin",
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Warning::InsufficientFunds { timestamp, .. }
            | Warning::UnclassifiableTrade { timestamp, .. }
            | Warning::UnknownLotOrigin { timestamp, .. } => *timestamp,
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::InsufficientFunds {
                currency,
                requested,
                available,
                ..
            } => write!(
                f,
                "tried to remove {} {} with only {} {} in open lots",
                requested, currency, available, currency
            ),
            Warning::UnclassifiableTrade {
                source_currency,
                target_currency,
                ..
            } => write!(
                f,
                "{} -> {} is neither a buy nor a sell",
                source_currency, target_currency
            ),
            Warning::UnknownLotOrigin {
                currency, amount, ..
            } => write!(
                f,
                "sold {} {} from a lot without a recorded buy",
                amount, currency
            ),
        }
    }
}
