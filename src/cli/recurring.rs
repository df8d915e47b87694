//! Recurring transaction CLI commands
//!
//! Implements CLI commands for recurring rules: creating and editing them,
//! pausing and resuming, skipping or running an occurrence by hand, and
//! processing everything that is due.

use clap::Subcommand;

use crate::config::Settings;
use crate::display::{
    format_generated, format_process_report, format_recurring_details, format_recurring_table,
    format_upcoming, NameLookup,
};
use crate::error::{MoneyNoteError, MoneyNoteResult};
use crate::models::{
    Category, CategoryKind, Frequency, PaymentMethod, RecurringTransaction, SubcategoryId,
    TransactionKind,
};
use crate::services::{
    CategoryService, CreateRecurringInput, RecurringService, RecurringUpdate, TagService,
};
use crate::storage::Storage;

use super::{parse_date, parse_date_or_today, parse_money, split_list, today};

fn parse_kind(s: &str) -> Result<TransactionKind, String> {
    s.parse()
}

fn parse_frequency(s: &str) -> Result<Frequency, String> {
    s.parse()
}

/// Recurring subcommands
#[derive(Subcommand)]
pub enum RecurringCommands {
    /// List recurring rules
    List {
        /// Include paused and finished rules
        #[arg(short, long)]
        all: bool,
    },

    /// Show a rule's details and next occurrences
    Show {
        /// Rule ID
        rule: String,
    },

    /// Create a recurring rule
    Add {
        /// Amount per occurrence
        amount: String,
        /// daily, weekly, monthly or yearly
        #[arg(short, long, value_parser = parse_frequency, default_value = "monthly")]
        frequency: Frequency,
        /// Repeat every N periods
        #[arg(short, long, default_value = "1")]
        interval: u32,
        /// expense or income
        #[arg(short, long, value_parser = parse_kind, default_value = "expense")]
        kind: TransactionKind,
        /// Category name or ID (expenses default to "Other")
        #[arg(short, long)]
        category: Option<String>,
        /// Subcategory name within the category
        #[arg(short, long)]
        sub: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        /// Income source
        #[arg(long)]
        source: Option<String>,
        /// Payment method for expenses
        #[arg(short, long)]
        method: Option<String>,
        /// Comma-separated tag names
        #[arg(short, long)]
        tags: Option<String>,
        /// First occurrence (defaults to today)
        #[arg(long)]
        start: Option<String>,
        /// Last possible occurrence
        #[arg(long)]
        end: Option<String>,
        /// Mark generated expenses as variable rather than fixed
        #[arg(long)]
        variable: bool,
    },

    /// Edit a recurring rule
    Edit {
        /// Rule ID
        rule: String,
        #[arg(short, long)]
        amount: Option<String>,
        #[arg(short, long, value_parser = parse_frequency)]
        frequency: Option<Frequency>,
        #[arg(short, long)]
        interval: Option<u32>,
        #[arg(short, long)]
        category: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(long)]
        source: Option<String>,
        #[arg(short, long)]
        method: Option<String>,
        /// Replace tags (comma-separated; empty string clears)
        #[arg(short, long)]
        tags: Option<String>,
        #[arg(long)]
        start: Option<String>,
        #[arg(long, conflicts_with = "no_end")]
        end: Option<String>,
        /// Remove the end date
        #[arg(long)]
        no_end: bool,
    },

    /// Delete a rule (records already generated are kept)
    Delete {
        /// Rule ID
        rule: String,
    },

    /// Pause a rule
    Pause {
        rule: String,
    },

    /// Resume a paused rule
    Resume {
        rule: String,
    },

    /// Skip the next occurrence
    Skip {
        rule: String,
    },

    /// Record the next occurrence now
    Run {
        rule: String,
    },

    /// Generate every occurrence that is due
    Process,

    /// Show occurrences in the coming days
    Upcoming {
        #[arg(short, long, default_value = "30")]
        days: u64,
    },
}

fn require_rule(service: &RecurringService, identifier: &str) -> MoneyNoteResult<RecurringTransaction> {
    service
        .find(identifier)?
        .ok_or_else(|| MoneyNoteError::recurring_not_found(identifier))
}

fn resolve_subcategory(category: &Category, name: &str) -> MoneyNoteResult<SubcategoryId> {
    category
        .find_subcategory(name)
        .map(|s| s.id)
        .ok_or_else(|| MoneyNoteError::subcategory_not_found(format!("{} / {}", category.name, name)))
}

fn parse_method(s: &str) -> MoneyNoteResult<PaymentMethod> {
    s.parse().map_err(MoneyNoteError::Validation)
}

fn category_kind(kind: TransactionKind) -> CategoryKind {
    match kind {
        TransactionKind::Expense => CategoryKind::Expense,
        TransactionKind::Income => CategoryKind::Income,
    }
}

/// Handle a recurring command
pub fn handle_recurring_command(
    storage: &Storage,
    settings: &Settings,
    cmd: RecurringCommands,
) -> MoneyNoteResult<()> {
    let service = RecurringService::new(storage);
    let categories = CategoryService::new(storage);
    let symbol = settings.currency_symbol.as_str();

    match cmd {
        RecurringCommands::List { all } => {
            print!("{}", format_recurring_table(&service.list(all)?, symbol));
        }

        RecurringCommands::Show { rule } => {
            let found = require_rule(&service, &rule)?;
            let names = NameLookup::from_storage(storage)?;
            print!("{}", format_recurring_details(&found, &names, symbol));
        }

        RecurringCommands::Add {
            amount,
            frequency,
            interval,
            kind,
            category,
            sub,
            description,
            source,
            method,
            tags,
            start,
            end,
            variable,
        } => {
            let category = match (category, kind) {
                (Some(name), _) => Some(categories.require(&name, Some(category_kind(kind)))?),
                (None, TransactionKind::Expense) => {
                    Some(categories.fallback_category(CategoryKind::Expense)?)
                }
                (None, TransactionKind::Income) => None,
            };

            let mut input = CreateRecurringInput::new(
                kind,
                parse_money(&amount)?,
                frequency,
                parse_date_or_today(start.as_deref())?,
            );
            input.interval = interval;
            input.end_date = end.as_deref().map(parse_date).transpose()?;
            input.description = description.unwrap_or_default();
            input.source = source.unwrap_or_default();
            if let Some(category) = &category {
                input.category_id = Some(category.id);
                input.subcategory_id = sub.map(|s| resolve_subcategory(category, &s)).transpose()?;
            }
            input.payment_method = match method {
                Some(m) => parse_method(&m)?,
                None => settings.default_payment_method,
            };
            if let Some(tags) = tags {
                input.tags = TagService::new(storage).resolve_names(&split_list(&tags), false)?;
            }
            if variable {
                input.is_fixed = false;
            }

            let rule = service.create(input)?;
            println!(
                "Created recurring {} {}: {} {}",
                rule.kind.to_string().to_lowercase(),
                rule.id,
                rule.amount.format_with_symbol(symbol),
                rule.frequency.describe(rule.interval).to_lowercase()
            );
            println!("  Next: {}", rule.next_date);
        }

        RecurringCommands::Edit {
            rule,
            amount,
            frequency,
            interval,
            category,
            description,
            source,
            method,
            tags,
            start,
            end,
            no_end,
        } => {
            let existing = require_rule(&service, &rule)?;

            let category_id = category
                .map(|c| categories.require(&c, Some(category_kind(existing.kind))))
                .transpose()?
                .map(|c| Some(c.id));
            let end_date = match end {
                Some(end) => Some(Some(parse_date(&end)?)),
                None if no_end => Some(None),
                None => None,
            };
            let tags = tags
                .map(|t| TagService::new(storage).resolve_names(&split_list(&t), false))
                .transpose()?;

            let update = RecurringUpdate {
                amount: amount.as_deref().map(parse_money).transpose()?,
                description,
                category_id,
                payment_method: method.as_deref().map(parse_method).transpose()?,
                tags,
                source,
                frequency,
                interval,
                start_date: start.as_deref().map(parse_date).transpose()?,
                end_date,
                ..Default::default()
            };

            let updated = service
                .update(existing.id, update)?
                .ok_or_else(|| MoneyNoteError::recurring_not_found(&rule))?;
            println!("Updated recurring {}", updated.id);
            if updated.active {
                println!("  Next: {}", updated.next_date);
            }
        }

        RecurringCommands::Delete { rule } => {
            let existing = require_rule(&service, &rule)?;
            service.delete(existing.id)?;
            println!("Deleted recurring {}", existing.id);
        }

        RecurringCommands::Pause { rule } => {
            let existing = require_rule(&service, &rule)?;
            service.pause(existing.id)?;
            println!("Paused recurring {}", existing.id);
        }

        RecurringCommands::Resume { rule } => {
            let existing = require_rule(&service, &rule)?;
            let resumed = service
                .resume(existing.id, today())?
                .ok_or_else(|| MoneyNoteError::recurring_not_found(&rule))?;
            println!("Resumed recurring {}", resumed.id);
            println!("  Next: {}", resumed.next_date);
        }

        RecurringCommands::Skip { rule } => {
            let existing = require_rule(&service, &rule)?;
            let skipped = service
                .skip_next(existing.id)?
                .ok_or_else(|| MoneyNoteError::recurring_not_found(&rule))?;
            println!("Skipped one occurrence of {}", skipped.id);
            if skipped.active {
                println!("  Next: {}", skipped.next_date);
            } else {
                println!("  No further occurrences");
            }
        }

        RecurringCommands::Run { rule } => {
            let existing = require_rule(&service, &rule)?;
            let record = service
                .run_now(existing.id, today())?
                .ok_or_else(|| MoneyNoteError::recurring_not_found(&rule))?;
            print!("{}", format_generated(&record, symbol));
        }

        RecurringCommands::Process => {
            let report = service.process_due(today())?;
            print!("{}", format_process_report(&report, symbol));
        }

        RecurringCommands::Upcoming { days } => {
            let upcoming = service.upcoming(today(), days)?;
            print!("{}", format_upcoming(&upcoming, days, symbol));
        }
    }

    Ok(())
}
