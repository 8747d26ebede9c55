//! Balances command - year-end balances and the lots still open

use super::LedgerArgs;
use clap::Args;
use fifotax::format::format_quantity;
use fifotax::ledger::{BalanceSnapshot, Config, LedgerReport, TaxEventKind};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct BalancesCommand {
    #[command(flatten)]
    input: LedgerArgs,

    /// Calendar year to show
    #[arg(short, long)]
    year: Option<i32>,

    /// Also list the open lots left after the last transaction
    #[arg(long)]
    lots: bool,

    /// Output as JSON instead of formatted table
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Tabled)]
struct BalanceRow {
    #[tabled(rename = "Currency")]
    currency: String,
    #[tabled(rename = "Balance")]
    balance: String,
}

#[derive(Debug, Tabled, Serialize)]
struct LotRow {
    #[tabled(rename = "Currency")]
    currency: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Bought")]
    bought: String,
    #[tabled(rename = "Reference")]
    reference: String,
}

#[derive(Debug, Serialize)]
struct BalancesData<'a> {
    snapshots: BTreeMap<i32, &'a BalanceSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    open_lots: Option<Vec<LotRow>>,
}

impl BalancesCommand {
    pub fn exec(&self, config: &Config) -> anyhow::Result<()> {
        let report = self.input.run(config)?;
        let snapshots: BTreeMap<i32, &BalanceSnapshot> = report
            .snapshots
            .iter()
            .filter(|(y, _)| self.year.is_none_or(|selected| **y == selected))
            .map(|(y, s)| (*y, s))
            .collect();
        let lots = self.lots.then(|| open_lots(&report));

        if self.json {
            let data = BalancesData {
                snapshots,
                open_lots: lots,
            };
            println!("{}", serde_json::to_string_pretty(&data)?);
            return Ok(());
        }

        self.print_snapshots(&snapshots);
        if let Some(lots) = lots {
            print_lots(lots);
        }
        Ok(())
    }

    fn print_snapshots(&self, snapshots: &BTreeMap<i32, &BalanceSnapshot>) {
        let year_str = self.year.map_or("All Years".to_string(), |y| y.to_string());
        if snapshots.is_empty() {
            println!("No balances found ({})", year_str);
            return;
        }

        println!();
        println!("YEAR-END BALANCES ({})", year_str);
        println!();

        for (year, snapshot) in snapshots {
            println!("{}", year);
            let rows: Vec<BalanceRow> = snapshot
                .iter()
                .map(|(currency, balance)| BalanceRow {
                    currency: currency.to_string(),
                    balance: format_quantity(*balance),
                })
                .collect();

            let table = Table::new(rows)
                .with(Style::rounded())
                .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
                .to_string();
            println!("{}", table);
            println!();
        }
    }
}

fn print_lots(rows: Vec<LotRow>) {
    println!("OPEN LOTS");
    if rows.is_empty() {
        println!("  (none)");
        println!();
        return;
    }

    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
        .to_string();
    println!("{}", table);
    println!();
}

/// Open lots of every currency, oldest first, with the buy that opened them
fn open_lots(report: &LedgerReport) -> Vec<LotRow> {
    let buys: HashMap<usize, _> = report
        .events()
        .filter(|e| e.kind == TaxEventKind::Buy)
        .map(|e| (e.id, e))
        .collect();

    report
        .accounts
        .values()
        .filter_map(|account| account.lots().map(|lots| (account, lots)))
        .flat_map(|(account, lots)| lots.iter().map(move |lot| (account, lot)))
        .map(|(account, lot)| {
            let buy = buys.get(&lot.origin);
            LotRow {
                currency: account.name.to_string(),
                amount: format_quantity(lot.amount),
                bought: buy
                    .map(|b| b.timestamp.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_else(|| "-".to_string()),
                reference: buy.map(|b| b.reference.clone()).unwrap_or_default(),
            }
        })
        .collect()
}
