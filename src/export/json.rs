//! JSON Export functionality
//!
//! Exports the complete data set to JSON with a metadata header, and reads
//! it back with schema and referential-integrity checks.

use std::collections::HashSet;
use std::fmt::Display;
use std::hash::Hash;
use std::io::Write;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::error::{MoneyNoteError, MoneyNoteResult};
use crate::models::{
    Budget, Category, CategoryId, CategoryKind, Expense, Income, RecurringTransaction, Tag,
    Template, TransactionKind,
};
use crate::storage::Storage;

/// Application name written to every export
pub const EXPORT_APP_NAME: &str = "moneynote";

/// Current export schema version
pub const EXPORT_SCHEMA_VERSION: u32 = 1;

/// Record counts per collection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordCounts {
    pub expenses: usize,
    pub incomes: usize,
    pub categories: usize,
    pub tags: usize,
    pub budgets: usize,
    pub recurring: usize,
    pub templates: usize,
}

impl RecordCounts {
    pub fn total(&self) -> usize {
        self.expenses
            + self.incomes
            + self.categories
            + self.tags
            + self.budgets
            + self.recurring
            + self.templates
    }
}

/// Earliest and latest transaction dates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub earliest: NaiveDate,
    pub latest: NaiveDate,
}

/// Export header
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub app: String,
    pub schema_version: u32,
    pub exported_at: DateTime<Utc>,
    pub app_version: String,
    pub counts: RecordCounts,
    /// Span of expense and income dates; absent when there are none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
}

/// Full data export structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullExport {
    pub metadata: ExportMetadata,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub expenses: Vec<Expense>,
    #[serde(default)]
    pub incomes: Vec<Income>,
    #[serde(default)]
    pub budgets: Vec<Budget>,
    #[serde(default)]
    pub recurring: Vec<RecurringTransaction>,
    #[serde(default)]
    pub templates: Vec<Template>,
}

impl FullExport {
    /// Create a new full export from storage
    pub fn from_storage(storage: &Storage, settings: &Settings) -> MoneyNoteResult<Self> {
        let categories = storage.categories.get_all()?;
        let tags = storage.tags.get_all()?;
        let expenses = storage.expenses.get_all()?;
        let incomes = storage.incomes.get_all()?;
        let budgets = storage.budgets.get_all()?;
        let recurring = storage.recurring.get_all()?;
        let templates = storage.templates.get_all()?;

        let dates: Vec<NaiveDate> = expenses
            .iter()
            .map(|e| e.date)
            .chain(incomes.iter().map(|i| i.date))
            .collect();
        let date_range = match (dates.iter().min(), dates.iter().max()) {
            (Some(earliest), Some(latest)) => Some(DateRange {
                earliest: *earliest,
                latest: *latest,
            }),
            _ => None,
        };

        let metadata = ExportMetadata {
            app: EXPORT_APP_NAME.to_string(),
            schema_version: EXPORT_SCHEMA_VERSION,
            exported_at: Utc::now(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            counts: RecordCounts {
                expenses: expenses.len(),
                incomes: incomes.len(),
                categories: categories.len(),
                tags: tags.len(),
                budgets: budgets.len(),
                recurring: recurring.len(),
                templates: templates.len(),
            },
            date_range,
        };

        Ok(Self {
            metadata,
            settings: settings.clone(),
            categories,
            tags,
            expenses,
            incomes,
            budgets,
            recurring,
            templates,
        })
    }

    /// Check the header and referential integrity
    pub fn validate(&self) -> Result<(), String> {
        if self.metadata.app != EXPORT_APP_NAME {
            return Err(format!("Not a MoneyNote export (app '{}')", self.metadata.app));
        }
        if self.metadata.schema_version > EXPORT_SCHEMA_VERSION {
            return Err(format!(
                "Schema version {} is newer than supported version {}",
                self.metadata.schema_version, EXPORT_SCHEMA_VERSION
            ));
        }

        unique_ids("category", self.categories.iter().map(|c| c.id))?;
        unique_ids("tag", self.tags.iter().map(|t| t.id))?;
        unique_ids("expense", self.expenses.iter().map(|e| e.id))?;
        unique_ids("income", self.incomes.iter().map(|i| i.id))?;
        unique_ids("budget", self.budgets.iter().map(|b| b.id))?;
        unique_ids("budget month", self.budgets.iter().map(|b| b.month))?;
        unique_ids("recurring transaction", self.recurring.iter().map(|r| r.id))?;
        unique_ids("template", self.templates.iter().map(|t| t.id))?;
        self.validate_records()?;

        let tag_ids: HashSet<_> = self.tags.iter().map(|t| t.id).collect();
        let category = |id: CategoryId| self.categories.iter().find(|c| c.id == id);
        let check_category =
            |owner: String, id: CategoryId, kind: CategoryKind| match category(id) {
                None => Err(format!("{} references unknown category {}", owner, id)),
                Some(c) if c.kind != kind => Err(format!(
                    "{} references {} category '{}'",
                    owner,
                    c.kind.to_string().to_lowercase(),
                    c.name
                )),
                Some(_) => Ok(()),
            };

        for expense in &self.expenses {
            let owner = format!("Expense {}", expense.id);
            check_category(owner.clone(), expense.category_id, CategoryKind::Expense)?;
            if let Some(sub_id) = expense.subcategory_id {
                if category(expense.category_id).and_then(|c| c.subcategory(sub_id)).is_none() {
                    return Err(format!("{} references unknown subcategory {}", owner, sub_id));
                }
            }
            if let Some(tag) = expense.tags.iter().find(|t| !tag_ids.contains(t)) {
                return Err(format!("{} references unknown tag {}", owner, tag));
            }
        }
        for income in &self.incomes {
            if let Some(id) = income.category_id {
                check_category(format!("Income {}", income.id), id, CategoryKind::Income)?;
            }
        }
        for budget in &self.budgets {
            for entry in &budget.categories {
                check_category(
                    format!("Budget {}", budget.month),
                    entry.category_id,
                    CategoryKind::Expense,
                )?;
            }
        }
        for rule in &self.recurring {
            if let Some(id) = rule.category_id {
                check_category(format!("Recurring {}", rule.id), id, kind_of(rule.kind))?;
            }
            if let Some(tag) = rule.tags.iter().find(|t| !tag_ids.contains(t)) {
                return Err(format!("Recurring {} references unknown tag {}", rule.id, tag));
            }
        }
        for template in &self.templates {
            if let Some(id) = template.category_id {
                check_category(format!("Template '{}'", template.name), id, kind_of(template.kind))?;
            }
        }

        Ok(())
    }
}

impl FullExport {
    /// Each record must pass the same checks as one entered by hand
    fn validate_records(&self) -> Result<(), String> {
        for category in &self.categories {
            invalid_record(format!("Category '{}'", category.name), category.validate())?;
        }
        for tag in &self.tags {
            invalid_record(format!("Tag '{}'", tag.name), tag.validate())?;
        }
        for expense in &self.expenses {
            invalid_record(format!("Expense {}", expense.id), expense.validate())?;
        }
        for income in &self.incomes {
            invalid_record(format!("Income {}", income.id), income.validate())?;
        }
        for budget in &self.budgets {
            invalid_record(format!("Budget {}", budget.month), budget.validate())?;
        }
        for rule in &self.recurring {
            invalid_record(format!("Recurring {}", rule.id), rule.validate())?;
        }
        for template in &self.templates {
            invalid_record(format!("Template '{}'", template.name), template.validate())?;
        }
        Ok(())
    }
}

fn invalid_record<E: Display>(owner: String, result: Result<(), E>) -> Result<(), String> {
    result.map_err(|e| format!("{} is invalid: {}", owner, e))
}

fn kind_of(kind: TransactionKind) -> CategoryKind {
    match kind {
        TransactionKind::Expense => CategoryKind::Expense,
        TransactionKind::Income => CategoryKind::Income,
    }
}

fn unique_ids<T, I>(what: &str, ids: I) -> Result<(), String>
where
    T: Eq + Hash + Display,
    I: IntoIterator<Item = T>,
{
    let mut seen = HashSet::new();
    for id in ids {
        let label = id.to_string();
        if !seen.insert(id) {
            return Err(format!("Duplicate {} {}", what, label));
        }
    }
    Ok(())
}

/// Export the full data set to JSON
pub fn export_full_json<W: Write>(
    storage: &Storage,
    settings: &Settings,
    writer: &mut W,
    pretty: bool,
) -> MoneyNoteResult<RecordCounts> {
    let export = FullExport::from_storage(storage, settings)?;

    if pretty {
        serde_json::to_writer_pretty(writer, &export)
    } else {
        serde_json::to_writer(writer, &export)
    }
    .map_err(|e| MoneyNoteError::Export(e.to_string()))?;

    Ok(export.metadata.counts)
}

/// Parse and validate a JSON export
pub fn import_from_json(json_str: &str) -> MoneyNoteResult<FullExport> {
    let export: FullExport =
        serde_json::from_str(json_str).map_err(|e| MoneyNoteError::Import(e.to_string()))?;

    export.validate().map_err(MoneyNoteError::Import)?;

    Ok(export)
}
