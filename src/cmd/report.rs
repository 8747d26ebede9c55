//! Report command - yearly gains, fees and warnings

use super::LedgerArgs;
use clap::Args;
use fifotax::format::format_fiat;
use fifotax::ledger::{Config, LedgerReport, Warning};
use rust_decimal::Decimal;
use serde::Serialize;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct ReportCommand {
    #[command(flatten)]
    input: LedgerArgs,

    /// Calendar year to report
    #[arg(short, long)]
    year: Option<i32>,

    /// Output as JSON instead of formatted table
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Tabled)]
struct YearRow {
    #[tabled(rename = "Year")]
    year: i32,
    #[tabled(rename = "Events")]
    events: usize,
    #[tabled(rename = "Fees")]
    fees: String,
    #[tabled(rename = "Net Gain")]
    net_gain: String,
    #[tabled(rename = "Exempt Gain")]
    exempt_gain: String,
}

#[derive(Debug, Serialize)]
struct ReportData<'a> {
    fiat: &'a str,
    years: Vec<YearSummary>,
    warnings: &'a [Warning],
}

#[derive(Debug, Serialize)]
struct YearSummary {
    year: i32,
    event_count: usize,
    fees: Decimal,
    net_gain: Decimal,
    exempt_gain: Decimal,
}

impl ReportCommand {
    pub fn exec(&self, config: &Config) -> anyhow::Result<()> {
        let report = self.input.run(config)?;
        let years = self.selected_years(&report);

        if self.json {
            self.print_json(&report, &years, config)
        } else {
            self.print_table(&report, &years, config);
            Ok(())
        }
    }

    fn selected_years(&self, report: &LedgerReport) -> Vec<i32> {
        report
            .years()
            .into_iter()
            .filter(|y| self.year.is_none_or(|selected| *y == selected))
            .collect()
    }

    fn print_table(&self, report: &LedgerReport, years: &[i32], config: &Config) {
        let year_str = self.year.map_or("All Years".to_string(), |y| y.to_string());
        if years.is_empty() {
            println!("No tax events found ({})", year_str);
        } else {
            println!();
            println!("CAPITAL GAINS ({}, {})", year_str, config.fiat);
            println!();

            let rows: Vec<YearRow> = years
                .iter()
                .map(|&year| {
                    let totals = report.totals_for(year);
                    YearRow {
                        year,
                        events: report.events_in(year).len(),
                        fees: format_fiat(totals.fees),
                        net_gain: format_fiat(totals.net_gain),
                        exempt_gain: format_fiat(report.exempt_gain(year)),
                    }
                })
                .collect();

            let table = Table::new(rows)
                .with(Style::rounded())
                .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
                .to_string();
            println!("{}", table);
        }

        if !report.warnings.is_empty() {
            println!();
            println!("WARNINGS ({})", report.warnings.len());
            for warning in &report.warnings {
                println!(
                    "  {} {}: {}",
                    warning.timestamp().format("%Y-%m-%d %H:%M:%S"),
                    warning.name(),
                    warning
                );
            }
        }
        println!();
    }

    fn print_json(&self, report: &LedgerReport, years: &[i32], config: &Config) -> anyhow::Result<()> {
        let data = ReportData {
            fiat: config.fiat.code(),
            years: years
                .iter()
                .map(|&year| {
                    let totals = report.totals_for(year);
                    YearSummary {
                        year,
                        event_count: report.events_in(year).len(),
                        fees: totals.fees,
                        net_gain: totals.net_gain,
                        exempt_gain: report.exempt_gain(year),
                    }
                })
                .collect(),
            warnings: &report.warnings,
        };
        println!("{}", serde_json::to_string_pretty(&data)?);
        Ok(())
    }
}
