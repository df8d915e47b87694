//! Display formatting for terminal output
//!
//! Formats models and service results as tables and detail blocks for the
//! command line.

pub mod budget;
pub mod category;
pub mod expense;
pub mod income;
pub mod recurring;
pub mod report;
pub mod tag;
pub mod template;

use std::collections::HashMap;

use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Style};
use tabled::{Table, Tabled};

use crate::error::MoneyNoteResult;
use crate::models::{Category, CategoryId, SubcategoryId, TagId};
use crate::storage::Storage;

pub use budget::{format_budget_list, format_budget_progress};
pub use category::{format_category_details, format_category_tree};
pub use expense::{format_expense_details, format_expense_table};
pub use income::{format_income_details, format_income_table};
pub use recurring::{
    format_generated, format_process_report, format_recurring_details, format_recurring_table,
    format_upcoming,
};
pub use tag::format_tag_table;
pub use template::{format_template_details, format_template_table};

/// Category and tag names by id, for rendering records
#[derive(Debug, Clone, Default)]
pub struct NameLookup {
    categories: HashMap<CategoryId, Category>,
    tags: HashMap<TagId, String>,
}

impl NameLookup {
    pub fn from_storage(storage: &Storage) -> MoneyNoteResult<Self> {
        Ok(Self {
            categories: storage
                .categories
                .get_all()?
                .into_iter()
                .map(|c| (c.id, c))
                .collect(),
            tags: storage
                .tags
                .get_all()?
                .into_iter()
                .map(|t| (t.id, t.name))
                .collect(),
        })
    }

    pub fn category(&self, id: CategoryId) -> String {
        self.categories
            .get(&id)
            .map(|c| c.label())
            .unwrap_or_else(|| "(unknown)".to_string())
    }

    /// "Category / Subcategory", or just the category
    pub fn category_path(&self, id: CategoryId, subcategory: Option<SubcategoryId>) -> String {
        let name = self.category(id);
        match subcategory.and_then(|sub| self.categories.get(&id)?.subcategory(sub)) {
            Some(sub) => format!("{} / {}", name, sub.name),
            None => name,
        }
    }

    pub fn optional_category(&self, id: Option<CategoryId>) -> String {
        id.map(|id| self.category(id)).unwrap_or_default()
    }

    /// Comma-separated tag names with a leading '#'
    pub fn tags(&self, ids: &[TagId]) -> String {
        ids.iter()
            .filter_map(|id| self.tags.get(id))
            .map(|name| format!("#{}", name))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Render rows as a table, right-aligning the given columns
pub(crate) fn render_table<T: Tabled>(rows: Vec<T>, right_aligned: &[usize]) -> String {
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    for column in right_aligned {
        table.modify(Columns::single(*column), Alignment::right());
    }
    table.to_string()
}
