//! Category Breakdown Report
//!
//! Spending per category and subcategory for a date range, with transaction
//! counts and each category's share of total spending.

use std::collections::HashMap;
use std::io::Write;

use chrono::NaiveDate;

use crate::display::report::{format_bar, format_percentage, separator, truncate};
use crate::error::{MoneyNoteError, MoneyNoteResult};
use crate::models::{CategoryId, Money, SubcategoryId};
use crate::storage::Storage;

/// Spending for one subcategory; `subcategory_id` is None for expenses filed
/// directly under the category
#[derive(Debug, Clone)]
pub struct SubcategorySpending {
    pub subcategory_id: Option<SubcategoryId>,
    pub name: String,
    pub total: Money,
    pub count: usize,
    /// Share of the parent category's spending
    pub percentage: f64,
}

/// Spending for one category
#[derive(Debug, Clone)]
pub struct CategorySpending {
    pub category_id: CategoryId,
    pub name: String,
    pub icon: String,
    pub color: String,
    pub total: Money,
    pub count: usize,
    /// Share of total spending
    pub percentage: f64,
    /// Largest first
    pub subcategories: Vec<SubcategorySpending>,
}

/// Category Breakdown Report
#[derive(Debug, Clone)]
pub struct CategoryBreakdown {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Largest first; categories without spending are left out
    pub categories: Vec<CategorySpending>,
    pub total: Money,
    pub count: usize,
}

impl CategoryBreakdown {
    /// Generate the breakdown for a date range
    pub fn generate(
        storage: &Storage,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> MoneyNoteResult<Self> {
        let expenses = storage.expenses.get_by_date_range(start_date, end_date)?;
        let categories: HashMap<CategoryId, _> = storage
            .categories
            .get_all()?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        let mut by_category: HashMap<CategoryId, HashMap<Option<SubcategoryId>, (Money, usize)>> =
            HashMap::new();
        for expense in &expenses {
            let entry = by_category
                .entry(expense.category_id)
                .or_default()
                .entry(expense.subcategory_id)
                .or_insert((Money::zero(), 0));
            entry.0 += expense.amount;
            entry.1 += 1;
        }

        let total: Money = expenses.iter().map(|e| e.amount).sum();

        let mut rows: Vec<CategorySpending> = by_category
            .into_iter()
            .map(|(category_id, subs)| {
                let category = categories.get(&category_id);
                let cat_total: Money = subs.values().map(|(amount, _)| *amount).sum();
                let cat_count: usize = subs.values().map(|(_, count)| *count).sum();

                let mut subcategories: Vec<SubcategorySpending> = subs
                    .into_iter()
                    .map(|(sub_id, (amount, count))| {
                        let name = match sub_id {
                            Some(id) => category
                                .and_then(|c| c.subcategory(id))
                                .map(|s| s.name.clone())
                                .unwrap_or_else(|| "(deleted)".to_string()),
                            None => "(none)".to_string(),
                        };
                        SubcategorySpending {
                            subcategory_id: sub_id,
                            name,
                            total: amount,
                            count,
                            percentage: amount.percentage_of(cat_total),
                        }
                    })
                    .collect();
                subcategories.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.name.cmp(&b.name)));

                CategorySpending {
                    category_id,
                    name: category
                        .map(|c| c.name.clone())
                        .unwrap_or_else(|| "(unknown)".to_string()),
                    icon: category.map(|c| c.icon.clone()).unwrap_or_default(),
                    color: category.map(|c| c.color.clone()).unwrap_or_default(),
                    total: cat_total,
                    count: cat_count,
                    percentage: cat_total.percentage_of(total),
                    subcategories,
                }
            })
            .collect();
        rows.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.name.cmp(&b.name)));

        Ok(Self {
            start_date,
            end_date,
            categories: rows,
            total,
            count: expenses.len(),
        })
    }

    /// The `limit` categories with the most spending
    pub fn top_categories(&self, limit: usize) -> &[CategorySpending] {
        &self.categories[..limit.min(self.categories.len())]
    }

    /// Format the report for terminal display
    pub fn format_terminal(&self, symbol: &str) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "Spending by Category: {} to {}\n",
            self.start_date, self.end_date
        ));
        output.push_str(&separator(78));
        output.push('\n');

        if self.categories.is_empty() {
            output.push_str("No expenses in this period.\n");
            return output;
        }

        output.push_str(&format!(
            "{:<32} {:>13} {:>6} {:>7}  {}\n",
            "Category", "Amount", "Count", "%", ""
        ));
        let max = self
            .categories
            .first()
            .map(|c| c.total.as_f64())
            .unwrap_or(0.0);

        for category in &self.categories {
            let label = category_label(&category.icon, &category.name);
            output.push_str(&format!(
                "{:<32} {:>13} {:>6} {:>7}  {}\n",
                truncate(&label, 32),
                category.total.format_with_symbol(symbol),
                category.count,
                format_percentage(category.percentage),
                format_bar(category.total.as_f64(), max, 12),
            ));

            // A lone "(none)" row adds nothing
            if category.subcategories.len() > 1 || category.subcategories[0].subcategory_id.is_some() {
                for sub in &category.subcategories {
                    output.push_str(&format!(
                        "  {:<30} {:>13} {:>6} {:>7}\n",
                        truncate(&sub.name, 30),
                        sub.total.format_with_symbol(symbol),
                        sub.count,
                        format_percentage(sub.percentage),
                    ));
                }
            }
        }

        output.push_str(&separator(78));
        output.push('\n');
        output.push_str(&format!(
            "{:<32} {:>13} {:>6}\n",
            "TOTAL",
            self.total.format_with_symbol(symbol),
            self.count
        ));
        output
    }

    /// Export the report to CSV format
    pub fn export_csv<W: Write>(&self, writer: W) -> MoneyNoteResult<()> {
        let mut csv = csv::Writer::from_writer(writer);
        let export_err = |e: csv::Error| MoneyNoteError::Export(e.to_string());

        csv.write_record(["category", "subcategory", "amount", "count", "percentage"])
            .map_err(export_err)?;
        for category in &self.categories {
            csv.write_record([
                category.name.clone(),
                String::new(),
                format!("{:.2}", category.total.as_f64()),
                category.count.to_string(),
                format!("{:.2}", category.percentage),
            ])
            .map_err(export_err)?;
            for sub in category.subcategories.iter().filter(|s| s.subcategory_id.is_some()) {
                csv.write_record([
                    category.name.clone(),
                    sub.name.clone(),
                    format!("{:.2}", sub.total.as_f64()),
                    sub.count.to_string(),
                    format!("{:.2}", sub.percentage),
                ])
                .map_err(export_err)?;
            }
        }
        csv.flush()?;
        Ok(())
    }
}

fn category_label(icon: &str, name: &str) -> String {
    if icon.is_empty() {
        name.to_string()
    } else {
        format!("{} {}", icon, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::MoneyNotePaths;
    use crate::models::{Category, Expense, Subcategory};
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = MoneyNotePaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::open(paths).unwrap();
        (temp_dir, storage)
    }

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
    }

    #[test]
    fn test_breakdown_with_subcategories() {
        let (_temp, storage) = create_test_storage();
        let mut food = Category::new("Food");
        let groceries = Subcategory::new("Groceries");
        let groceries_id = groceries.id;
        food.add_subcategory(groceries).unwrap();
        let transport = Category::new("Transport");
        storage.categories.upsert(food.clone()).unwrap();
        storage.categories.upsert(transport.clone()).unwrap();

        let add = |cents: i64, day: u32, category: CategoryId, sub: Option<SubcategoryId>| {
            let mut expense = Expense::new(Money::from_cents(cents), d(day), category);
            expense.subcategory_id = sub;
            storage.expenses.upsert(expense).unwrap();
        };
        add(6000, 3, food.id, Some(groceries_id));
        add(1500, 4, food.id, None);
        add(2500, 5, transport.id, None);
        // Outside the range
        let late = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap();
        storage
            .expenses
            .upsert(Expense::new(Money::from_cents(9999), late, food.id))
            .unwrap();

        let report = CategoryBreakdown::generate(&storage, d(1), d(31)).unwrap();
        assert_eq!(report.total.cents(), 10000);
        assert_eq!(report.count, 3);
        assert_eq!(report.categories.len(), 2);

        let food_row = &report.categories[0];
        assert_eq!(food_row.name, "Food");
        assert_eq!(food_row.count, 2);
        assert!((food_row.percentage - 75.0).abs() < 1e-9);
        assert_eq!(food_row.subcategories[0].name, "Groceries");
        assert!((food_row.subcategories[0].percentage - 80.0).abs() < 1e-9);

        assert_eq!(report.top_categories(1).len(), 1);
        assert_eq!(report.top_categories(10).len(), 2);
        assert!(report.format_terminal("$").contains("Groceries"));

        let mut out = Vec::new();
        report.export_csv(&mut out).unwrap();
        let csv = String::from_utf8(out).unwrap();
        assert!(csv.contains("Food,Groceries,60.00,1,80.00"));
    }

    #[test]
    fn test_empty_range() {
        let (_temp, storage) = create_test_storage();
        let report = CategoryBreakdown::generate(&storage, d(1), d(31)).unwrap();
        assert!(report.categories.is_empty());
        assert!(report.format_terminal("$").contains("No expenses"));
    }
}
