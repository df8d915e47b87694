//! Template CLI commands

use clap::Subcommand;

use crate::config::Settings;
use crate::display::{format_generated, format_template_details, format_template_table, NameLookup};
use crate::error::{MoneyNoteError, MoneyNoteResult};
use crate::models::{CategoryKind, PaymentMethod, Template, TransactionKind};
use crate::services::{CategoryService, CreateTemplateInput, TagService, TemplateService};
use crate::storage::Storage;

use super::{parse_date_or_today, parse_money, split_list};

fn parse_kind(s: &str) -> Result<TransactionKind, String> {
    s.parse()
}

/// Template subcommands
#[derive(Subcommand)]
pub enum TemplateCommands {
    /// List templates, most used first
    List,

    /// Show template details
    Show {
        /// Template name or ID
        template: String,
    },

    /// Create a template
    Create {
        /// Unique template name
        name: String,
        /// expense or income
        #[arg(short, long, value_parser = parse_kind, default_value = "expense")]
        kind: TransactionKind,
        /// Default amount; leave out to ask for it on every use
        #[arg(short, long)]
        amount: Option<String>,
        #[arg(short, long)]
        category: Option<String>,
        #[arg(short, long)]
        sub: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long)]
        method: Option<String>,
        /// Income source
        #[arg(long)]
        source: Option<String>,
        /// Comma-separated tag names
        #[arg(short, long)]
        tags: Option<String>,
        #[arg(long)]
        fixed: bool,
    },

    /// Delete a template
    Delete {
        /// Template name or ID
        template: String,
    },

    /// Record an expense or income from a template
    Apply {
        /// Template name or ID
        template: String,
        /// Amount (required if the template has none)
        #[arg(short, long)]
        amount: Option<String>,
        /// Date (defaults to today)
        #[arg(long)]
        date: Option<String>,
    },
}

fn require_template(service: &TemplateService, identifier: &str) -> MoneyNoteResult<Template> {
    service
        .find(identifier)?
        .ok_or_else(|| MoneyNoteError::template_not_found(identifier))
}

/// Handle a template command
pub fn handle_template_command(
    storage: &Storage,
    settings: &Settings,
    cmd: TemplateCommands,
) -> MoneyNoteResult<()> {
    let service = TemplateService::new(storage);
    let symbol = settings.currency_symbol.as_str();

    match cmd {
        TemplateCommands::List => {
            let names = NameLookup::from_storage(storage)?;
            print!("{}", format_template_table(&service.list()?, &names, symbol));
        }

        TemplateCommands::Show { template } => {
            let found = require_template(&service, &template)?;
            let names = NameLookup::from_storage(storage)?;
            print!("{}", format_template_details(&found, &names, symbol));
        }

        TemplateCommands::Create {
            name,
            kind,
            amount,
            category,
            sub,
            description,
            method,
            source,
            tags,
            fixed,
        } => {
            let category_kind = match kind {
                TransactionKind::Expense => CategoryKind::Expense,
                TransactionKind::Income => CategoryKind::Income,
            };
            let category = category
                .map(|c| CategoryService::new(storage).require(&c, Some(category_kind)))
                .transpose()?;
            let subcategory_id = match (&category, sub) {
                (Some(category), Some(sub)) => Some(
                    category
                        .find_subcategory(&sub)
                        .map(|s| s.id)
                        .ok_or_else(|| MoneyNoteError::subcategory_not_found(sub.as_str()))?,
                ),
                (None, Some(_)) => {
                    return Err(MoneyNoteError::Validation(
                        "--sub needs --category".into(),
                    ))
                }
                _ => None,
            };

            let input = CreateTemplateInput {
                name,
                kind,
                amount: amount.as_deref().map(parse_money).transpose()?,
                category_id: category.map(|c| c.id),
                subcategory_id,
                description: description.unwrap_or_default(),
                payment_method: match method {
                    Some(m) => m.parse::<PaymentMethod>().map_err(MoneyNoteError::Validation)?,
                    None => settings.default_payment_method,
                },
                source: source.unwrap_or_default(),
                tags: match tags {
                    Some(t) => TagService::new(storage).resolve_names(&split_list(&t), false)?,
                    None => Vec::new(),
                },
                is_fixed: fixed,
            };
            let template = service.create(input)?;
            println!("Created template '{}' ({})", template.name, template.id);
        }

        TemplateCommands::Delete { template } => {
            let found = require_template(&service, &template)?;
            service.delete(found.id)?;
            println!("Deleted template '{}'", found.name);
        }

        TemplateCommands::Apply {
            template,
            amount,
            date,
        } => {
            let found = require_template(&service, &template)?;
            let record = service.apply(
                found.id,
                parse_date_or_today(date.as_deref())?,
                amount.as_deref().map(parse_money).transpose()?,
            )?;
            println!("Applied template '{}':", found.name);
            print!("{}", format_generated(&record, symbol));
        }
    }

    Ok(())
}
