//! CSV Export functionality
//!
//! Flat, spreadsheet-friendly exports of expenses and incomes with category,
//! subcategory and tag names resolved.

use std::collections::HashMap;
use std::io::Write;

use chrono::NaiveDate;

use crate::error::{MoneyNoteError, MoneyNoteResult};
use crate::models::{Category, CategoryId, TagId};
use crate::storage::Storage;

/// Inclusive date bounds; either end may be open
#[derive(Debug, Clone, Copy, Default)]
pub struct DateFilter {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateFilter {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.map_or(true, |from| date >= from) && self.to.map_or(true, |to| date <= to)
    }
}

fn csv_err(e: csv::Error) -> MoneyNoteError {
    MoneyNoteError::Export(e.to_string())
}

/// Export expenses to CSV, oldest first; returns the row count
pub fn export_expenses_csv<W: Write>(
    storage: &Storage,
    writer: W,
    filter: DateFilter,
) -> MoneyNoteResult<usize> {
    let categories: HashMap<CategoryId, Category> = storage
        .categories
        .get_all()?
        .into_iter()
        .map(|c| (c.id, c))
        .collect();
    let tag_names: HashMap<TagId, String> = storage
        .tags
        .get_all()?
        .into_iter()
        .map(|t| (t.id, t.name))
        .collect();

    let mut expenses = storage.expenses.filter(|e| filter.contains(e.date))?;
    expenses.sort_by(|a, b| a.date.cmp(&b.date).then(a.created_at.cmp(&b.created_at)));

    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record([
        "id",
        "date",
        "amount",
        "category",
        "subcategory",
        "description",
        "payment_method",
        "tags",
        "fixed",
        "notes",
    ])
    .map_err(csv_err)?;

    for expense in &expenses {
        let category = categories.get(&expense.category_id);
        let subcategory = expense
            .subcategory_id
            .and_then(|id| category.and_then(|c| c.subcategory(id)))
            .map(|s| s.name.clone())
            .unwrap_or_default();
        let tags: Vec<&str> = expense
            .tags
            .iter()
            .filter_map(|id| tag_names.get(id).map(String::as_str))
            .collect();

        csv.write_record([
            expense.id.to_string(),
            expense.date.to_string(),
            format!("{:.2}", expense.amount.as_f64()),
            category.map(|c| c.name.clone()).unwrap_or_else(|| "Unknown".into()),
            subcategory,
            expense.description.clone(),
            expense.payment_method.to_string(),
            tags.join(";"),
            expense.is_fixed.to_string(),
            expense.notes.clone(),
        ])
        .map_err(csv_err)?;
    }

    csv.flush()?;
    Ok(expenses.len())
}

/// Export incomes to CSV, oldest first; returns the row count
pub fn export_incomes_csv<W: Write>(
    storage: &Storage,
    writer: W,
    filter: DateFilter,
) -> MoneyNoteResult<usize> {
    let category_names: HashMap<CategoryId, String> = storage
        .categories
        .get_all()?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();

    let mut incomes = storage.incomes.filter(|i| filter.contains(i.date))?;
    incomes.sort_by(|a, b| a.date.cmp(&b.date).then(a.created_at.cmp(&b.created_at)));

    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(["id", "date", "amount", "source", "category", "description"])
        .map_err(csv_err)?;

    for income in &incomes {
        csv.write_record([
            income.id.to_string(),
            income.date.to_string(),
            format!("{:.2}", income.amount.as_f64()),
            income.source.clone(),
            income
                .category_id
                .and_then(|id| category_names.get(&id).cloned())
                .unwrap_or_default(),
            income.description.clone(),
        ])
        .map_err(csv_err)?;
    }

    csv.flush()?;
    Ok(incomes.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::MoneyNotePaths;
    use crate::models::{Expense, Income, Money, Tag};
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = MoneyNotePaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::open(paths).unwrap();
        (temp_dir, storage)
    }

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, day).unwrap()
    }

    #[test]
    fn test_expense_csv_resolves_names() {
        let (_temp_dir, storage) = create_test_storage();
        let food = Category::new("Food");
        let work = Tag::new("work");
        let lunch = Tag::new("lunch");
        storage.categories.upsert(food.clone()).unwrap();
        storage.tags.upsert(work.clone()).unwrap();
        storage.tags.upsert(lunch.clone()).unwrap();

        let mut expense = Expense::new(Money::from_cents(1850), d(2, 3), food.id);
        expense.description = "Sandwich, coffee".into();
        expense.tags = vec![work.id, lunch.id];
        storage.expenses.upsert(expense).unwrap();
        storage
            .expenses
            .upsert(Expense::new(Money::from_cents(999), d(4, 1), food.id))
            .unwrap();

        let mut output = Vec::new();
        let filter = DateFilter {
            from: Some(d(1, 1)),
            to: Some(d(3, 31)),
        };
        let rows = export_expenses_csv(&storage, &mut output, filter).unwrap();
        assert_eq!(rows, 1);

        let csv = String::from_utf8(output).unwrap();
        let mut lines = csv.lines();
        assert!(lines.next().unwrap().starts_with("id,date,amount,category"));
        let row = lines.next().unwrap();
        assert!(row.contains("2025-02-03,18.50,Food,,\"Sandwich, coffee\""));
        assert!(row.contains("work;lunch"));
    }

    #[test]
    fn test_income_csv() {
        let (_temp_dir, storage) = create_test_storage();
        storage
            .incomes
            .upsert(Income::new(Money::from_cents(320000), d(1, 31), "Acme Corp"))
            .unwrap();

        let mut output = Vec::new();
        let rows = export_incomes_csv(&storage, &mut output, DateFilter::default()).unwrap();
        assert_eq!(rows, 1);
        let csv = String::from_utf8(output).unwrap();
        assert!(csv.contains("2025-01-31,3200.00,Acme Corp,,"));
    }
}
