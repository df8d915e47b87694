//! Category CLI commands
//!
//! Implements CLI commands for categories and their subcategories.

use clap::Subcommand;

use crate::display::{format_category_details, format_category_tree};
use crate::error::{MoneyNoteError, MoneyNoteResult};
use crate::models::CategoryKind;
use crate::services::{CategoryService, CategoryUpdate};
use crate::storage::Storage;

fn parse_kind(s: &str) -> Result<CategoryKind, String> {
    s.parse()
}

/// Category subcommands
#[derive(Subcommand)]
pub enum CategoryCommands {
    /// List categories with their subcategories
    List {
        /// Only one kind (expense or income)
        #[arg(short, long, value_parser = parse_kind)]
        kind: Option<CategoryKind>,
    },

    /// Show category details and usage
    Show {
        /// Category name or ID
        category: String,
    },

    /// Create a new category
    Create {
        /// Category name
        name: String,
        /// expense or income
        #[arg(short, long, value_parser = parse_kind, default_value = "expense")]
        kind: CategoryKind,
        /// Color as #RRGGBB
        #[arg(long)]
        color: Option<String>,
        /// Icon (an emoji or short text)
        #[arg(long)]
        icon: Option<String>,
    },

    /// Edit a category
    Edit {
        /// Category name or ID
        category: String,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        icon: Option<String>,
        /// Position within its kind
        #[arg(long)]
        order: Option<i32>,
    },

    /// Delete a category
    Delete {
        /// Category name or ID
        category: String,
        /// Move records using it to "Other" instead of refusing
        #[arg(long)]
        force: bool,
    },

    /// Add a subcategory
    #[command(name = "add-sub")]
    AddSub {
        /// Parent category name or ID
        category: String,
        /// Subcategory name
        name: String,
        #[arg(long)]
        color: Option<String>,
        #[arg(long)]
        icon: Option<String>,
    },

    /// Remove a subcategory
    #[command(name = "remove-sub")]
    RemoveSub {
        /// Parent category name or ID
        category: String,
        /// Subcategory name or ID
        subcategory: String,
        /// Clear it from expenses using it instead of refusing
        #[arg(long)]
        force: bool,
    },
}

/// Handle a category command
pub fn handle_category_command(storage: &Storage, cmd: CategoryCommands) -> MoneyNoteResult<()> {
    let service = CategoryService::new(storage);

    match cmd {
        CategoryCommands::List { kind } => {
            let categories = match kind {
                Some(kind) => service.list_by_kind(kind)?,
                None => service.list()?,
            };
            print!("{}", format_category_tree(&categories));
        }

        CategoryCommands::Show { category } => {
            let found = service.require(&category, None)?;
            let usage = service.usage(found.id)?;
            print!("{}", format_category_details(&found, &usage));
        }

        CategoryCommands::Create {
            name,
            kind,
            color,
            icon,
        } => {
            let category = service.create(&name, kind, color.as_deref(), icon.as_deref())?;
            println!("Created {} category: {}", kind.to_string().to_lowercase(), category.label());
            println!("  ID: {}", category.id);
        }

        CategoryCommands::Edit {
            category,
            name,
            color,
            icon,
            order,
        } => {
            let found = service.require(&category, None)?;

            if name.is_none() && color.is_none() && icon.is_none() && order.is_none() {
                println!("No changes specified. Use --name, --color, --icon or --order.");
                return Ok(());
            }

            let update = CategoryUpdate {
                name,
                color,
                icon,
                sort_order: order,
            };
            let updated = service
                .update(found.id, update)?
                .ok_or_else(|| MoneyNoteError::category_not_found(&category))?;
            println!("Updated category: {}", updated.label());
        }

        CategoryCommands::Delete { category, force } => {
            let found = service.require(&category, None)?;
            let usage = service.usage(found.id)?;

            service.delete(found.id, force)?;
            println!("Deleted category: {}", found.name);
            if force && usage.blocking() > 0 {
                println!("  {} record(s) moved to 'Other'", usage.blocking());
            }
        }

        CategoryCommands::AddSub {
            category,
            name,
            color,
            icon,
        } => {
            let found = service.require(&category, None)?;
            let (parent, sub) =
                service.add_subcategory(found.id, &name, color.as_deref(), icon.as_deref())?;
            println!("Added subcategory '{}' to {}", sub.name, parent.name);
        }

        CategoryCommands::RemoveSub {
            category,
            subcategory,
            force,
        } => {
            let found = service.require(&category, None)?;
            let sub = found
                .find_subcategory(&subcategory)
                .cloned()
                .ok_or_else(|| MoneyNoteError::subcategory_not_found(&subcategory))?;
            if service.remove_subcategory(found.id, sub.id, force)? {
                println!("Removed subcategory '{}' from {}", sub.name, found.name);
            }
        }
    }

    Ok(())
}
