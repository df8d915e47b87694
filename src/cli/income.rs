//! Income CLI commands

use clap::Subcommand;

use crate::config::Settings;
use crate::display::{format_income_details, format_income_table, NameLookup};
use crate::error::{MoneyNoteError, MoneyNoteResult};
use crate::models::CategoryKind;
use crate::services::{CategoryService, IncomeFilter, IncomeService, IncomeUpdate};
use crate::storage::Storage;

use super::{parse_date, parse_date_or_today, parse_money, parse_month};

/// Income subcommands
#[derive(Subcommand)]
pub enum IncomeCommands {
    /// Record income
    Add {
        /// Amount (e.g. "2500")
        amount: String,
        /// Where the money came from
        #[arg(short, long)]
        source: String,
        #[arg(short, long)]
        description: Option<String>,
        /// Income category name or ID
        #[arg(short, long)]
        category: Option<String>,
        /// Date (YYYY-MM-DD, "today" or "yesterday")
        #[arg(long)]
        date: Option<String>,
    },

    /// List income
    List {
        /// Month (YYYY-MM)
        #[arg(long, conflicts_with = "all")]
        month: Option<String>,
        /// All months
        #[arg(long)]
        all: bool,
        /// Category name or ID
        #[arg(short, long)]
        category: Option<String>,
        /// Text in source or description
        #[arg(long)]
        search: Option<String>,
        #[arg(short, long, default_value = "50")]
        limit: usize,
    },

    /// Show income details
    Show {
        /// Income ID
        income: String,
    },

    /// Edit income
    Edit {
        /// Income ID
        income: String,
        #[arg(short, long)]
        amount: Option<String>,
        #[arg(long)]
        date: Option<String>,
        #[arg(short, long)]
        source: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        /// New category name or ID
        #[arg(short, long)]
        category: Option<String>,
        /// Remove the category
        #[arg(long, conflicts_with = "category")]
        clear_category: bool,
    },

    /// Delete income
    Delete {
        /// Income ID
        income: String,
    },
}

/// Handle an income command
pub fn handle_income_command(
    storage: &Storage,
    settings: &Settings,
    cmd: IncomeCommands,
) -> MoneyNoteResult<()> {
    let service = IncomeService::new(storage);
    let categories = CategoryService::new(storage);
    let symbol = settings.currency_symbol.as_str();

    match cmd {
        IncomeCommands::Add {
            amount,
            source,
            description,
            category,
            date,
        } => {
            let category_id = category
                .map(|c| categories.require(&c, Some(CategoryKind::Income)))
                .transpose()?
                .map(|c| c.id);
            let income = service.create(
                parse_money(&amount)?,
                parse_date_or_today(date.as_deref())?,
                &source,
                description.as_deref().unwrap_or_default(),
                category_id,
            )?;
            println!(
                "Added income {}: {} from {}",
                income.id,
                income.amount.format_with_symbol(symbol),
                income.source
            );
        }

        IncomeCommands::List {
            month,
            all,
            category,
            search,
            limit,
        } => {
            let mut filter = if all {
                IncomeFilter::default()
            } else {
                IncomeFilter::month(parse_month(month.as_deref())?)
            };
            filter.category_id = category
                .map(|c| categories.require(&c, Some(CategoryKind::Income)))
                .transpose()?
                .map(|c| c.id);
            filter.text = search;
            filter.limit = Some(limit);

            let incomes = service.list(&filter)?;
            let names = NameLookup::from_storage(storage)?;
            print!("{}", format_income_table(&incomes, &names, symbol));
        }

        IncomeCommands::Show { income } => {
            let found = service
                .find(&income)?
                .ok_or_else(|| MoneyNoteError::income_not_found(&income))?;
            let names = NameLookup::from_storage(storage)?;
            print!("{}", format_income_details(&found, &names, symbol));
        }

        IncomeCommands::Edit {
            income,
            amount,
            date,
            source,
            description,
            category,
            clear_category,
        } => {
            let existing = service
                .find(&income)?
                .ok_or_else(|| MoneyNoteError::income_not_found(&income))?;

            let category_id = match category {
                Some(c) => Some(Some(categories.require(&c, Some(CategoryKind::Income))?.id)),
                None if clear_category => Some(None),
                None => None,
            };
            let update = IncomeUpdate {
                amount: amount.as_deref().map(parse_money).transpose()?,
                date: date.as_deref().map(parse_date).transpose()?,
                source,
                description,
                category_id,
            };

            let updated = service
                .update(existing.id, update)?
                .ok_or_else(|| MoneyNoteError::income_not_found(&income))?;
            println!("Updated income {}", updated.id);
        }

        IncomeCommands::Delete { income } => {
            let existing = service
                .find(&income)?
                .ok_or_else(|| MoneyNoteError::income_not_found(&income))?;
            service.delete(existing.id)?;
            println!(
                "Deleted income {} ({} from {})",
                existing.id,
                existing.amount.format_with_symbol(symbol),
                existing.source
            );
        }
    }

    Ok(())
}
