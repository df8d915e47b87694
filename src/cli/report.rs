//! CLI commands for reports
//!
//! Provides commands for generating and exporting the dashboard, category,
//! trend, tag and payment-method reports.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::{Args, Subcommand};

use crate::config::Settings;
use crate::error::{MoneyNoteError, MoneyNoteResult};
use crate::models::Month;
use crate::reports::{Breakdown, CategoryBreakdown, Dashboard, TrendReport};
use crate::storage::Storage;

use super::{parse_date, parse_month, today};

/// Date range shared by the range-based reports
#[derive(Args, Debug)]
pub struct RangeArgs {
    /// Month (YYYY-MM), defaults to the current month
    #[arg(short, long, conflicts_with_all = ["from", "to"])]
    month: Option<String>,
    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    from: Option<String>,
    /// End date (YYYY-MM-DD), defaults to today
    #[arg(long)]
    to: Option<String>,
}

impl RangeArgs {
    fn resolve(&self) -> MoneyNoteResult<(NaiveDate, NaiveDate)> {
        if self.from.is_none() && self.to.is_none() {
            let month = parse_month(self.month.as_deref())?;
            return Ok((month.start_date(), month.end_date()));
        }

        let end = match &self.to {
            Some(to) => parse_date(to)?,
            None => today(),
        };
        let start = match &self.from {
            Some(from) => parse_date(from)?,
            None => Month::from_date(end).start_date(),
        };
        if start > end {
            return Err(MoneyNoteError::Validation(format!(
                "Start date {} is after end date {}",
                start, end
            )));
        }
        Ok((start, end))
    }
}

/// Report subcommands
#[derive(Subcommand, Debug)]
pub enum ReportCommands {
    /// Monthly overview: totals, budget, top categories, recent and upcoming
    #[command(alias = "overview")]
    Dashboard {
        /// Month (YYYY-MM), defaults to the current month
        #[arg(short, long)]
        month: Option<String>,
    },

    /// Spending by category and subcategory
    #[command(alias = "spending")]
    Categories {
        #[command(flatten)]
        range: RangeArgs,

        /// Show top N categories only
        #[arg(long)]
        top: Option<usize>,

        /// Export to CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Income, expenses and savings per month
    Trend {
        /// Last month of the trend (YYYY-MM)
        #[arg(short, long)]
        month: Option<String>,

        /// Number of months
        #[arg(short = 'n', long, default_value = "6")]
        months: usize,

        /// Export to CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Spending by tag
    Tags {
        #[command(flatten)]
        range: RangeArgs,

        /// Export to CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Spending by payment method
    #[command(name = "payment-methods", alias = "methods")]
    PaymentMethods {
        #[command(flatten)]
        range: RangeArgs,

        /// Export to CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn create_output(path: &Path) -> MoneyNoteResult<BufWriter<File>> {
    let file = File::create(path).map_err(|e| {
        MoneyNoteError::Export(format!("Failed to create file {}: {}", path.display(), e))
    })?;
    Ok(BufWriter::new(file))
}

/// Handle report commands
pub fn handle_report_command(
    storage: &Storage,
    settings: &Settings,
    cmd: ReportCommands,
) -> MoneyNoteResult<()> {
    let symbol = settings.currency_symbol.as_str();

    match cmd {
        ReportCommands::Dashboard { month } => {
            let month = parse_month(month.as_deref())?;
            let dashboard =
                Dashboard::generate(storage, month, today(), settings.budget_alert_threshold)?;
            println!("{}", dashboard.format_terminal(symbol));
        }

        ReportCommands::Categories { range, top, output } => {
            let (start, end) = range.resolve()?;
            let report = CategoryBreakdown::generate(storage, start, end)?;

            if let Some(path) = output {
                report.export_csv(create_output(&path)?)?;
                println!("Category report exported to: {}", path.display());
            } else if let Some(n) = top {
                println!("Top {} Spending Categories: {} to {}\n", n, start, end);
                println!("{:<30} {:>12} {:>8}", "Category", "Amount", "%");
                println!("{}", "-".repeat(52));
                for cat in report.top_categories(n) {
                    println!(
                        "{:<30} {:>12} {:>7.1}%",
                        cat.name,
                        cat.total.format_with_symbol(symbol),
                        cat.percentage
                    );
                }
                println!("\nTotal Spending: {}", report.total.format_with_symbol(symbol));
            } else {
                println!("{}", report.format_terminal(symbol));
            }
        }

        ReportCommands::Trend {
            month,
            months,
            output,
        } => {
            if months == 0 {
                return Err(MoneyNoteError::Validation(
                    "--months must be at least 1".into(),
                ));
            }
            let end = parse_month(month.as_deref())?;
            let report = TrendReport::generate(storage, end, months)?;

            if let Some(path) = output {
                report.export_csv(create_output(&path)?)?;
                println!("Trend report exported to: {}", path.display());
            } else {
                println!("{}", report.format_terminal(symbol));
            }
        }

        ReportCommands::Tags { range, output } => {
            let (start, end) = range.resolve()?;
            let report = Breakdown::by_tag(storage, start, end)?;
            emit_breakdown(&report, output, symbol)?;
        }

        ReportCommands::PaymentMethods { range, output } => {
            let (start, end) = range.resolve()?;
            let report = Breakdown::by_payment_method(storage, start, end)?;
            emit_breakdown(&report, output, symbol)?;
        }
    }

    Ok(())
}

fn emit_breakdown(report: &Breakdown, output: Option<PathBuf>, symbol: &str) -> MoneyNoteResult<()> {
    if let Some(path) = output {
        report.export_csv(create_output(&path)?)?;
        println!("{} exported to: {}", report.title, path.display());
    } else {
        println!("{}", report.format_terminal(symbol));
    }
    Ok(())
}
