//! Expense CLI commands

use clap::{Args, Subcommand};

use crate::config::Settings;
use crate::display::{format_expense_details, format_expense_table, NameLookup};
use crate::error::{MoneyNoteError, MoneyNoteResult};
use crate::models::{Category, CategoryKind, Month, PaymentMethod, SubcategoryId};
use crate::services::{
    CategoryService, CreateExpenseInput, ExpenseFilter, ExpenseService, ExpenseSort,
    ExpenseUpdate, TagService,
};
use crate::storage::Storage;

use super::{parse_date, parse_date_or_today, parse_money, split_list};

/// Expense subcommands
#[derive(Subcommand)]
pub enum ExpenseCommands {
    /// Record an expense
    Add {
        /// Amount (e.g. "12.50")
        amount: String,
        /// Category name or ID (defaults to "Other")
        #[arg(short, long)]
        category: Option<String>,
        /// Subcategory name within the category
        #[arg(short, long)]
        sub: Option<String>,
        /// Description
        #[arg(short, long)]
        description: Option<String>,
        /// Date (YYYY-MM-DD, "today" or "yesterday")
        #[arg(long)]
        date: Option<String>,
        /// Payment method (cash, debit, credit, transfer, wallet, other)
        #[arg(short, long)]
        method: Option<String>,
        /// Comma-separated tag names
        #[arg(short, long)]
        tags: Option<String>,
        /// Create tags that don't exist yet
        #[arg(long)]
        create_tags: bool,
        /// Mark as a fixed expense
        #[arg(long)]
        fixed: bool,
        /// Notes
        #[arg(short, long)]
        notes: Option<String>,
    },

    /// List expenses
    List(ListArgs),

    /// Show expense details
    Show {
        /// Expense ID
        expense: String,
    },

    /// Edit an expense
    Edit {
        /// Expense ID
        expense: String,
        #[arg(short, long)]
        amount: Option<String>,
        #[arg(long)]
        date: Option<String>,
        /// New category name or ID
        #[arg(short, long)]
        category: Option<String>,
        /// New subcategory name
        #[arg(short, long)]
        sub: Option<String>,
        /// Remove the subcategory
        #[arg(long, conflicts_with = "sub")]
        clear_sub: bool,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long)]
        method: Option<String>,
        /// Replace tags (comma-separated; empty string clears)
        #[arg(short, long)]
        tags: Option<String>,
        /// Set the fixed flag (true or false)
        #[arg(long)]
        fixed: Option<bool>,
        #[arg(short, long)]
        notes: Option<String>,
    },

    /// Delete an expense
    Delete {
        /// Expense ID
        expense: String,
    },

    /// Search descriptions and notes
    Search {
        /// Text to look for (case-insensitive)
        text: String,
        #[arg(short, long, default_value = "50")]
        limit: usize,
    },
}

/// Filters for `expense list`
#[derive(Args)]
pub struct ListArgs {
    /// Month (YYYY-MM)
    #[arg(long, conflicts_with_all = ["from", "to"])]
    month: Option<String>,
    /// Start date (YYYY-MM-DD)
    #[arg(long)]
    from: Option<String>,
    /// End date (YYYY-MM-DD)
    #[arg(long)]
    to: Option<String>,
    /// Category name or ID
    #[arg(short, long)]
    category: Option<String>,
    /// Subcategory name (requires --category)
    #[arg(short, long, requires = "category")]
    sub: Option<String>,
    /// Tag name
    #[arg(short, long)]
    tag: Option<String>,
    /// Payment method
    #[arg(short, long)]
    method: Option<String>,
    /// Only fixed (true) or only variable (false) expenses
    #[arg(long)]
    fixed: Option<bool>,
    /// Minimum amount
    #[arg(long)]
    min: Option<String>,
    /// Maximum amount
    #[arg(long)]
    max: Option<String>,
    /// Text in description or notes
    #[arg(long)]
    search: Option<String>,
    /// Sort: date, date-asc, amount, amount-asc, category
    #[arg(long, default_value = "date")]
    sort: String,
    /// Maximum rows
    #[arg(short, long, default_value = "50")]
    limit: usize,
}

fn parse_method(s: &str) -> MoneyNoteResult<PaymentMethod> {
    s.parse().map_err(MoneyNoteError::Validation)
}

fn resolve_subcategory(category: &Category, name: &str) -> MoneyNoteResult<SubcategoryId> {
    category
        .find_subcategory(name)
        .map(|s| s.id)
        .ok_or_else(|| MoneyNoteError::subcategory_not_found(format!("{} / {}", category.name, name)))
}

impl ListArgs {
    fn to_filter(&self, storage: &Storage) -> MoneyNoteResult<ExpenseFilter> {
        let mut filter = ExpenseFilter::new();

        if let Some(month) = &self.month {
            let month = Month::parse(month)
                .map_err(|e| MoneyNoteError::Validation(format!("month: {}", e)))?;
            filter = filter.month(month);
        }
        filter.start_date = self.from.as_deref().map(parse_date).transpose()?.or(filter.start_date);
        filter.end_date = self.to.as_deref().map(parse_date).transpose()?.or(filter.end_date);

        if let Some(category) = &self.category {
            let category = CategoryService::new(storage).require(category, Some(CategoryKind::Expense))?;
            if let Some(sub) = &self.sub {
                filter.subcategory_id = Some(resolve_subcategory(&category, sub)?);
            }
            filter = filter.category(category.id);
        }
        if let Some(tag) = &self.tag {
            let tag = TagService::new(storage)
                .find(tag)?
                .ok_or_else(|| MoneyNoteError::tag_not_found(tag))?;
            filter = filter.tag(tag.id);
        }
        filter.payment_method = self.method.as_deref().map(parse_method).transpose()?;
        filter.is_fixed = self.fixed;
        filter.min_amount = self.min.as_deref().map(parse_money).transpose()?;
        filter.max_amount = self.max.as_deref().map(parse_money).transpose()?;
        if let Some(text) = &self.search {
            filter = filter.text(text.clone());
        }
        let sort: ExpenseSort = self.sort.parse().map_err(MoneyNoteError::Validation)?;
        Ok(filter.sort(sort).limit(self.limit))
    }
}

/// Handle an expense command
pub fn handle_expense_command(
    storage: &Storage,
    settings: &Settings,
    cmd: ExpenseCommands,
) -> MoneyNoteResult<()> {
    let service = ExpenseService::new(storage);
    let categories = CategoryService::new(storage);
    let symbol = settings.currency_symbol.as_str();

    match cmd {
        ExpenseCommands::Add {
            amount,
            category,
            sub,
            description,
            date,
            method,
            tags,
            create_tags,
            fixed,
            notes,
        } => {
            let category = match category {
                Some(name) => categories.require(&name, Some(CategoryKind::Expense))?,
                None => categories.fallback_category(CategoryKind::Expense)?,
            };

            let mut input = CreateExpenseInput::new(
                parse_money(&amount)?,
                parse_date_or_today(date.as_deref())?,
                category.id,
            );
            input.subcategory_id = sub.map(|s| resolve_subcategory(&category, &s)).transpose()?;
            input.description = description.unwrap_or_default();
            input.payment_method = match method {
                Some(m) => parse_method(&m)?,
                None => settings.default_payment_method,
            };
            if let Some(tags) = tags {
                input.tags = TagService::new(storage).resolve_names(&split_list(&tags), create_tags)?;
            }
            input.is_fixed = fixed;
            input.notes = notes.unwrap_or_default();

            let expense = service.create(input)?;
            println!(
                "Added expense {}: {} in {}",
                expense.id,
                expense.amount.format_with_symbol(symbol),
                category.name
            );
        }

        ExpenseCommands::List(args) => {
            let filter = args.to_filter(storage)?;
            let expenses = service.list(&filter)?;
            let names = NameLookup::from_storage(storage)?;
            print!("{}", format_expense_table(&expenses, &names, symbol));
        }

        ExpenseCommands::Show { expense } => {
            let found = service
                .find(&expense)?
                .ok_or_else(|| MoneyNoteError::expense_not_found(&expense))?;
            let names = NameLookup::from_storage(storage)?;
            print!("{}", format_expense_details(&found, &names, symbol));
        }

        ExpenseCommands::Edit {
            expense,
            amount,
            date,
            category,
            sub,
            clear_sub,
            description,
            method,
            tags,
            fixed,
            notes,
        } => {
            let existing = service
                .find(&expense)?
                .ok_or_else(|| MoneyNoteError::expense_not_found(&expense))?;

            let mut update = ExpenseUpdate {
                amount: amount.as_deref().map(parse_money).transpose()?,
                date: date.as_deref().map(parse_date).transpose()?,
                description,
                payment_method: method.as_deref().map(parse_method).transpose()?,
                is_fixed: fixed,
                notes,
                ..Default::default()
            };

            let target = match category {
                Some(name) => {
                    let category = categories.require(&name, Some(CategoryKind::Expense))?;
                    update.category_id = Some(category.id);
                    if category.id != existing.category_id {
                        // Old subcategory can't belong to the new category
                        update.subcategory_id = Some(None);
                    }
                    category
                }
                None => categories
                    .get(existing.category_id)?
                    .ok_or_else(|| MoneyNoteError::category_not_found(existing.category_id.to_string()))?,
            };
            if let Some(sub) = sub {
                update.subcategory_id = Some(Some(resolve_subcategory(&target, &sub)?));
            } else if clear_sub {
                update.subcategory_id = Some(None);
            }
            if let Some(tags) = tags {
                update.tags = Some(TagService::new(storage).resolve_names(&split_list(&tags), false)?);
            }

            let updated = service
                .update(existing.id, update)?
                .ok_or_else(|| MoneyNoteError::expense_not_found(&expense))?;
            println!("Updated expense {}", updated.id);
        }

        ExpenseCommands::Delete { expense } => {
            let existing = service
                .find(&expense)?
                .ok_or_else(|| MoneyNoteError::expense_not_found(&expense))?;
            service.delete(existing.id)?;
            println!(
                "Deleted expense {} ({})",
                existing.id,
                existing.amount.format_with_symbol(symbol)
            );
        }

        ExpenseCommands::Search { text, limit } => {
            let mut expenses = service.search(&text)?;
            expenses.truncate(limit);
            let names = NameLookup::from_storage(storage)?;
            print!("{}", format_expense_table(&expenses, &names, symbol));
        }
    }

    Ok(())
}
