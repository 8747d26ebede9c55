use super::config::Currency;
use chrono::{DateTime, Months, Utc};
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

/// Kind of tax relevant event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TaxEventKind {
    Buy,
    Sell,
    External,
}

impl TaxEventKind {
    pub fn display(&self) -> &'static str {
        match self {
            TaxEventKind::Buy => "Buy",
            TaxEventKind::Sell => "Sell",
            TaxEventKind::External => "External",
        }
    }
}

impl fmt::Display for TaxEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// A buy, a sell (one per consumed lot) or an external transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxEvent {
    /// Sequential identifier, counted separately per kind
    pub id: usize,
    pub kind: TaxEventKind,
    pub timestamp: DateTime<Utc>,
    /// The non-reference currency bought, sold or transferred
    pub currency: Currency,
    /// Gain (or loss, when negative) realized by a sell
    pub realized_gain: Decimal,
    pub exchange_rate: Decimal,
    pub fiat_amount: Decimal,
    pub crypto_amount: Decimal,
    pub reference: String,
    pub fees: Decimal,
    /// The buy whose lot a sell consumed
    #[serde(rename = "source_id", serialize_with = "serialize_source")]
    pub source_event: Option<Arc<TaxEvent>>,
    pub long_term: bool,
}

impl TaxEvent {
    /// e.g. `Buy-0` or `Sell-12`
    pub fn display_id(&self) -> String {
        format!("{}-{}", self.kind, self.id)
    }

    pub fn source_id(&self) -> Option<String> {
        self.source_event.as_ref().map(|source| source.display_id())
    }

    /// Long-term gains are exempt, long-term losses still count.
    pub fn counts_towards_gain(&self) -> bool {
        !self.long_term || self.realized_gain < Decimal::ZERO
    }
}

/// Whether a lot acquired at `acquired` and disposed of at `disposed` was
/// held for at least one calendar year.
pub fn is_long_term(acquired: DateTime<Utc>, disposed: DateTime<Utc>) -> bool {
    disposed
        .checked_sub_months(Months::new(12))
        .is_some_and(|threshold| acquired <= threshold)
}

fn serialize_source<S>(source: &Option<Arc<TaxEvent>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match source {
        Some(event) => serializer.serialize_some(&event.display_id()),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use rust_decimal_macros::dec;

    fn day(s: &str) -> DateTime<Utc> {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            .and_utc()
    }

    fn sell(gain: Decimal, long_term: bool) -> TaxEvent {
        TaxEvent {
            id: 3,
            kind: TaxEventKind::Sell,
            timestamp: day("2021-06-01"),
            currency: Currency::new("BTC"),
            realized_gain: gain,
            exchange_rate: dec!(12000),
            fiat_amount: dec!(12000),
            crypto_amount: dec!(1),
            reference: String::new(),
            fees: dec!(12),
            source_event: None,
            long_term,
        }
    }

    #[test]
    fn one_year_threshold_is_inclusive() {
        let bought = day("2021-01-01");
        assert!(is_long_term(bought, bought + Duration::days(365)));
        assert!(!is_long_term(bought, bought + Duration::days(364)));
    }

    #[test]
    fn threshold_uses_calendar_years() {
        // 2020 is a leap year, so 365 days is not yet a full year
        let bought = day("2020-01-01");
        assert!(!is_long_term(bought, bought + Duration::days(365)));
        assert!(is_long_term(bought, bought + Duration::days(366)));
    }

    #[test]
    fn long_term_gains_are_exempt_but_losses_count() {
        assert!(sell(dec!(100), false).counts_towards_gain());
        assert!(!sell(dec!(100), true).counts_towards_gain());
        assert!(sell(dec!(-100), true).counts_towards_gain());
        assert!(!sell(dec!(0), true).counts_towards_gain());
    }

    #[test]
    fn display_ids_include_kind() {
        let mut event = sell(dec!(0), false);
        assert_eq!(event.display_id(), "Sell-3");
        event.kind = TaxEventKind::External;
        assert_eq!(event.display_id(), "External-3");
    }

    #[test]
    fn serializes_source_as_display_id() {
        let buy = TaxEvent {
            id: 0,
            kind: TaxEventKind::Buy,
            ..sell(dec!(0), false)
        };
        let event = TaxEvent {
            source_event: Some(Arc::new(buy)),
            ..sell(dec!(2000), true)
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["source_id"], "Buy-0");
        assert_eq!(json["kind"], "Sell");
        assert_eq!(json["long_term"], true);
    }
}
