//! CLI commands for data export
//!
//! Provides commands for exporting data in various formats. Without
//! `--output` the export is written to stdout.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use clap::{Subcommand, ValueEnum};

use crate::config::Settings;
use crate::error::{MoneyNoteError, MoneyNoteResult};
use crate::export::{
    export_expenses_csv, export_full_json, export_full_yaml, export_incomes_csv, DateFilter,
    FullExport,
};
use crate::storage::Storage;

use super::parse_date;

/// Which records a CSV export holds
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CsvRecords {
    Expenses,
    Incomes,
}

/// Export subcommands
#[derive(Subcommand, Debug)]
pub enum ExportCommands {
    /// Export everything as JSON (restorable with `import json`)
    Json {
        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Export everything as YAML (human-readable)
    Yaml {
        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export expenses or incomes as CSV
    Csv {
        /// Output file path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Records to export
        #[arg(short, long, value_enum, default_value = "expenses")]
        records: CsvRecords,

        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<String>,

        /// End date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<String>,
    },

    /// Show export information without writing files
    Info,
}

fn open_output(output: Option<&Path>) -> MoneyNoteResult<Box<dyn Write>> {
    match output {
        Some(path) => {
            let file = File::create(path).map_err(|e| {
                MoneyNoteError::Export(format!("Failed to create file {}: {}", path.display(), e))
            })?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(io::stdout().lock())),
    }
}

fn report(output: Option<&Path>, what: String) {
    // stdout may carry the export itself
    if let Some(path) = output {
        eprintln!("{} to: {}", what, path.display());
    }
}

/// Handle export commands
pub fn handle_export_command(
    storage: &Storage,
    settings: &Settings,
    cmd: ExportCommands,
) -> MoneyNoteResult<()> {
    match cmd {
        ExportCommands::Json { output, pretty } => {
            let mut writer = open_output(output.as_deref())?;
            let counts = export_full_json(storage, settings, &mut writer, pretty)?;
            writer.flush()?;
            report(
                output.as_deref(),
                format!("Exported {} records as JSON", counts.total()),
            );
        }

        ExportCommands::Yaml { output } => {
            let mut writer = open_output(output.as_deref())?;
            let counts = export_full_yaml(storage, settings, &mut writer)?;
            writer.flush()?;
            report(
                output.as_deref(),
                format!("Exported {} records as YAML", counts.total()),
            );
        }

        ExportCommands::Csv {
            output,
            records,
            from,
            to,
        } => {
            let filter = DateFilter {
                from: from.as_deref().map(parse_date).transpose()?,
                to: to.as_deref().map(parse_date).transpose()?,
            };
            let mut writer = open_output(output.as_deref())?;
            let (count, noun) = match records {
                CsvRecords::Expenses => (export_expenses_csv(storage, &mut writer, filter)?, "expenses"),
                CsvRecords::Incomes => (export_incomes_csv(storage, &mut writer, filter)?, "incomes"),
            };
            writer.flush()?;
            report(output.as_deref(), format!("Exported {} {}", count, noun));
        }

        ExportCommands::Info => {
            let export = FullExport::from_storage(storage, settings)?;
            let meta = &export.metadata;

            println!("Export Information");
            println!("==================\n");
            println!("Schema Version: {}", meta.schema_version);
            println!("App Version:    {}", meta.app_version);
            println!();
            println!("Data Summary:");
            println!("  Expenses:      {}", meta.counts.expenses);
            println!("  Incomes:       {}", meta.counts.incomes);
            println!("  Categories:    {}", meta.counts.categories);
            println!("  Tags:          {}", meta.counts.tags);
            println!("  Budgets:       {}", meta.counts.budgets);
            println!("  Recurring:     {}", meta.counts.recurring);
            println!("  Templates:     {}", meta.counts.templates);

            if let Some(range) = &meta.date_range {
                println!();
                println!("Date Range:");
                println!("  Earliest: {}", range.earliest);
                println!("  Latest:   {}", range.latest);
            }

            println!("\nExamples:");
            println!("  moneynote export json --pretty -o moneynote.json");
            println!("  moneynote export csv --records incomes -o incomes.csv");
        }
    }

    Ok(())
}
