//! Schema command - print expected input formats

use clap::Args;
use fifotax::import::custom;
use fifotax::ledger::LedgerInput;
use schemars::schema_for;

#[derive(Args, Debug)]
pub struct SchemaCommand {
    /// Output format: json-schema, csv-header or csv-fields
    #[arg(value_enum, default_value = "json-schema")]
    format: SchemaFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum SchemaFormat {
    /// JSON Schema for the native input format
    JsonSchema,
    /// Header row of the semicolon separated CSV template
    CsvHeader,
    /// CSV column descriptions
    CsvFields,
}

impl SchemaCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        match self.format {
            SchemaFormat::JsonSchema => {
                let schema = schema_for!(LedgerInput);
                println!("{}", serde_json::to_string_pretty(&schema)?);
            }
            SchemaFormat::CsvHeader => {
                let header: Vec<&str> = custom::COLUMNS.iter().map(|(name, _)| *name).collect();
                println!("{}", header.join(";"));
            }
            SchemaFormat::CsvFields => {
                println!("CSV Input Format");
                println!("================");
                println!();
                for (name, description) in custom::COLUMNS {
                    println!("{:15} {}", name, description);
                }
                println!();
                println!("Amounts may carry a unit suffix and ',' thousands separators.");
            }
        }
        Ok(())
    }
}
