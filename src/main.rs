mod cmd;

use clap::{Parser, Subcommand};
use fifotax::Config;

#[derive(Parser, Debug)]
#[command(name = "fifotax", version, about = "FIFO capital gains ledger")]
struct Cli {
    /// Reference (fiat) currency that gains and fees are measured in
    #[arg(long, global = true, default_value = "EUR")]
    fiat: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Yearly fees, taxable gains and exempt gains
    Report(cmd::report::ReportCommand),
    /// List tax events (buys, sells, external transfers)
    Events(cmd::events::EventsCommand),
    /// Year-end balances per currency
    Balances(cmd::balances::BalancesCommand),
    /// Print the expected input formats
    Schema(cmd::schema::SchemaCommand),
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let cli = Cli::parse();
    let config = Config::new(cli.fiat.as_str());
    match cli.command {
        Command::Report(report) => report.exec(&config),
        Command::Events(events) => events.exec(&config),
        Command::Balances(balances) => balances.exec(&config),
        Command::Schema(schema) => schema.exec(),
    }
}
