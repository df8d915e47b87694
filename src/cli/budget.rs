//! Budget CLI commands
//!
//! Implements CLI commands for monthly budgets: targets, per-category
//! limits, copying between months and the progress overview.

use clap::Subcommand;

use crate::config::Settings;
use crate::display::{format_budget_list, format_budget_progress};
use crate::error::{MoneyNoteError, MoneyNoteResult};
use crate::models::{CategoryKind, Month};
use crate::services::{BudgetService, BudgetTargets, CategoryService};
use crate::storage::Storage;

use super::{parse_money, parse_month};

/// Budget subcommands
#[derive(Subcommand)]
pub enum BudgetCommands {
    /// Show budget progress for a month
    Show {
        /// Month (YYYY-MM), defaults to the current month
        #[arg(short, long)]
        month: Option<String>,
    },

    /// Set targets for a month
    Set {
        #[arg(short, long)]
        month: Option<String>,
        /// Income target
        #[arg(long)]
        income: Option<String>,
        /// Total expense target
        #[arg(long)]
        expense: Option<String>,
        /// Savings target
        #[arg(long)]
        savings: Option<String>,
        #[arg(long)]
        notes: Option<String>,
    },

    /// Set a category's limit for a month
    #[command(name = "set-category")]
    SetCategory {
        /// Expense category name or ID
        category: String,
        /// Limit (e.g. "400")
        amount: String,
        #[arg(short, long)]
        month: Option<String>,
    },

    /// Remove a category's limit for a month
    #[command(name = "remove-category")]
    RemoveCategory {
        category: String,
        #[arg(short, long)]
        month: Option<String>,
    },

    /// Copy a month's budget to another month
    Copy {
        /// Source month (YYYY-MM)
        from: String,
        /// Target month (YYYY-MM)
        to: String,
        /// Replace an existing budget in the target month
        #[arg(long)]
        overwrite: bool,
    },

    /// Delete a month's budget
    Delete {
        /// Month (YYYY-MM)
        month: String,
    },

    /// List all budgets
    List,
}

fn require_month(s: &str) -> MoneyNoteResult<Month> {
    parse_month(Some(s))
}

/// Handle a budget command
pub fn handle_budget_command(
    storage: &Storage,
    settings: &Settings,
    cmd: BudgetCommands,
) -> MoneyNoteResult<()> {
    let service = BudgetService::new(storage);
    let categories = CategoryService::new(storage);
    let symbol = settings.currency_symbol.as_str();

    match cmd {
        BudgetCommands::Show { month } => {
            let month = parse_month(month.as_deref())?;
            match service.progress(month, settings.budget_alert_threshold)? {
                Some(progress) => print!("{}", format_budget_progress(&progress, symbol)),
                None => {
                    println!("No budget for {}.", month.label());
                    println!("Create one with: moneynote budget set --month {} --expense <amount>", month);
                }
            }
        }

        BudgetCommands::Set {
            month,
            income,
            expense,
            savings,
            notes,
        } => {
            let month = parse_month(month.as_deref())?;
            let targets = BudgetTargets {
                income: income.as_deref().map(parse_money).transpose()?,
                expense: expense.as_deref().map(parse_money).transpose()?,
                savings: savings.as_deref().map(parse_money).transpose()?,
                notes,
            };
            let budget = service.set_targets(month, targets)?;
            println!("Budget for {} saved", budget.month.label());
            println!(
                "  Income {}  Expenses {}  Savings {}",
                budget.income_target.format_with_symbol(symbol),
                budget.expense_target.format_with_symbol(symbol),
                budget.savings_target.format_with_symbol(symbol)
            );
        }

        BudgetCommands::SetCategory {
            category,
            amount,
            month,
        } => {
            let month = parse_month(month.as_deref())?;
            let category = categories.require(&category, Some(CategoryKind::Expense))?;
            let amount = parse_money(&amount)?;
            service.set_category(month, category.id, amount)?;
            println!(
                "Budgeted {} for {} in {}",
                amount.format_with_symbol(symbol),
                category.name,
                month.label()
            );
        }

        BudgetCommands::RemoveCategory { category, month } => {
            let month = parse_month(month.as_deref())?;
            let category = categories.require(&category, Some(CategoryKind::Expense))?;
            match service.remove_category(month, category.id)? {
                Some(_) => println!("Removed {} from the {} budget", category.name, month.label()),
                None => println!("{} has no limit in {}", category.name, month.label()),
            }
        }

        BudgetCommands::Copy {
            from,
            to,
            overwrite,
        } => {
            let (from, to) = (require_month(&from)?, require_month(&to)?);
            let copy = service.copy(from, to, overwrite)?;
            println!(
                "Copied budget from {} to {} ({} categories)",
                from.label(),
                to.label(),
                copy.categories.len()
            );
        }

        BudgetCommands::Delete { month } => {
            let month = require_month(&month)?;
            if !service.delete(month)? {
                return Err(MoneyNoteError::budget_not_found(month.to_string()));
            }
            println!("Deleted budget for {}", month.label());
        }

        BudgetCommands::List => {
            print!("{}", format_budget_list(&service.list()?, symbol));
        }
    }

    Ok(())
}
