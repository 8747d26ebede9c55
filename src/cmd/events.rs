//! Events command - every buy, sell and external transfer with filtering

use super::LedgerArgs;
use chrono::Datelike;
use clap::{Args, ValueEnum};
use fifotax::format::{format_fiat, format_quantity};
use fifotax::ledger::{Config, Currency, TaxEvent, TaxEventKind};
use serde::Serialize;
use std::io;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct EventsCommand {
    #[command(flatten)]
    input: LedgerArgs,

    /// Calendar year to filter
    #[arg(short, long)]
    year: Option<i32>,

    /// Filter by event kind
    #[arg(short, long, value_enum)]
    kind: Option<KindFilter>,

    /// Filter by currency (e.g., BTC, ETH)
    #[arg(short, long)]
    currency: Option<String>,

    /// Output as CSV instead of formatted table
    #[arg(long)]
    csv: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KindFilter {
    Buy,
    Sell,
    External,
}

impl From<KindFilter> for TaxEventKind {
    fn from(filter: KindFilter) -> Self {
        match filter {
            KindFilter::Buy => TaxEventKind::Buy,
            KindFilter::Sell => TaxEventKind::Sell,
            KindFilter::External => TaxEventKind::External,
        }
    }
}

/// Row for the events table output
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct EventRow {
    #[tabled(rename = "Id")]
    pub id: String,

    #[tabled(rename = "Date")]
    pub date: String,

    #[tabled(rename = "Currency")]
    pub currency: String,

    #[tabled(rename = "Amount")]
    pub crypto_amount: String,

    #[tabled(rename = "Fiat")]
    pub fiat_amount: String,

    #[tabled(rename = "Rate")]
    pub exchange_rate: String,

    #[tabled(rename = "Fees")]
    pub fees: String,

    #[tabled(rename = "Gain/Loss")]
    pub realized_gain: String,

    #[tabled(rename = "Source")]
    pub source: String,

    #[tabled(rename = "Long Term")]
    pub long_term: String,

    #[tabled(rename = "Reference")]
    pub reference: String,
}

impl EventsCommand {
    pub fn exec(&self, config: &Config) -> anyhow::Result<()> {
        let report = self.input.run(config)?;
        let kind = self.kind.map(TaxEventKind::from);
        let currency = self.currency.as_deref().map(Currency::new);

        let rows: Vec<EventRow> = report
            .events()
            .filter(|e| self.year.is_none_or(|y| e.timestamp.year() == y))
            .filter(|e| kind.is_none_or(|k| e.kind == k))
            .filter(|e| currency.as_ref().is_none_or(|c| &e.currency == c))
            .map(EventRow::from)
            .collect();

        if self.csv {
            self.write_csv(&rows)
        } else {
            self.print_table(&rows);
            Ok(())
        }
    }

    fn print_table(&self, rows: &[EventRow]) {
        if rows.is_empty() {
            println!("No events found matching filters");
            return;
        }

        let table = Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
            .to_string();
        println!("{}", table);
    }

    fn write_csv(&self, rows: &[EventRow]) -> anyhow::Result<()> {
        let mut wtr = csv::Writer::from_writer(io::stdout());
        for row in rows {
            wtr.serialize(row)?;
        }
        wtr.flush()?;
        Ok(())
    }
}

impl From<&TaxEvent> for EventRow {
    fn from(event: &TaxEvent) -> Self {
        let is_sell = event.kind == TaxEventKind::Sell;
        EventRow {
            id: event.display_id(),
            date: event.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            currency: event.currency.to_string(),
            crypto_amount: format_quantity(event.crypto_amount),
            fiat_amount: format_fiat(event.fiat_amount),
            exchange_rate: format_fiat(event.exchange_rate),
            fees: format_fiat(event.fees),
            realized_gain: if is_sell {
                format_fiat(event.realized_gain)
            } else {
                "-".to_string()
            },
            source: event.source_id().unwrap_or_default(),
            long_term: if event.long_term { "yes" } else { "" }.to_string(),
            reference: event.reference.clone(),
        }
    }
}
