//! Tag and Payment-Method Breakdowns
//!
//! Spending grouped by tag or by payment method over a date range. An
//! expense with several tags counts toward each of them, so tag totals can
//! add up to more than the period's spending.

use std::collections::HashMap;
use std::io::Write;

use chrono::NaiveDate;

use crate::display::report::{format_bar, format_percentage, separator, truncate};
use crate::error::{MoneyNoteError, MoneyNoteResult};
use crate::models::{Money, PaymentMethod};
use crate::storage::Storage;

/// One group in a breakdown
#[derive(Debug, Clone, PartialEq)]
pub struct BreakdownRow {
    pub label: String,
    pub total: Money,
    pub count: usize,
    /// Share of total spending in the period
    pub percentage: f64,
}

/// Spending grouped by some key
#[derive(Debug, Clone)]
pub struct Breakdown {
    pub title: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Largest first
    pub rows: Vec<BreakdownRow>,
    /// Total spending in the period
    pub total: Money,
}

impl Breakdown {
    /// Spending per tag; untagged spending is reported as "(untagged)"
    pub fn by_tag(storage: &Storage, start_date: NaiveDate, end_date: NaiveDate) -> MoneyNoteResult<Self> {
        let expenses = storage.expenses.get_by_date_range(start_date, end_date)?;
        let names: HashMap<_, _> = storage
            .tags
            .get_all()?
            .into_iter()
            .map(|t| (t.id, t.name))
            .collect();

        let mut groups: HashMap<String, (Money, usize)> = HashMap::new();
        for expense in &expenses {
            if expense.tags.is_empty() {
                add_to(&mut groups, "(untagged)".to_string(), expense.amount);
            }
            for tag_id in &expense.tags {
                let name = names
                    .get(tag_id)
                    .cloned()
                    .unwrap_or_else(|| tag_id.to_string());
                add_to(&mut groups, name, expense.amount);
            }
        }

        let total = expenses.iter().map(|e| e.amount).sum();
        Ok(Self::from_groups("Spending by Tag", start_date, end_date, groups, total))
    }

    /// Spending per payment method
    pub fn by_payment_method(
        storage: &Storage,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> MoneyNoteResult<Self> {
        let expenses = storage.expenses.get_by_date_range(start_date, end_date)?;

        let mut by_method: HashMap<PaymentMethod, (Money, usize)> = HashMap::new();
        for expense in &expenses {
            let entry = by_method
                .entry(expense.payment_method)
                .or_insert((Money::zero(), 0));
            entry.0 += expense.amount;
            entry.1 += 1;
        }
        let groups = by_method
            .into_iter()
            .map(|(method, totals)| (method.to_string(), totals))
            .collect();

        let total = expenses.iter().map(|e| e.amount).sum();
        Ok(Self::from_groups(
            "Spending by Payment Method",
            start_date,
            end_date,
            groups,
            total,
        ))
    }

    fn from_groups(
        title: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        groups: HashMap<String, (Money, usize)>,
        total: Money,
    ) -> Self {
        let mut rows: Vec<BreakdownRow> = groups
            .into_iter()
            .map(|(label, (amount, count))| BreakdownRow {
                label,
                total: amount,
                count,
                percentage: amount.percentage_of(total),
            })
            .collect();
        rows.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.label.cmp(&b.label)));

        Self {
            title: title.to_string(),
            start_date,
            end_date,
            rows,
            total,
        }
    }

    pub fn row(&self, label: &str) -> Option<&BreakdownRow> {
        self.rows.iter().find(|r| r.label.eq_ignore_ascii_case(label))
    }

    /// Format the breakdown for terminal display
    pub fn format_terminal(&self, symbol: &str) -> String {
        let mut output = String::new();
        output.push_str(&format!(
            "{}: {} to {}\n",
            self.title, self.start_date, self.end_date
        ));
        output.push_str(&separator(72));
        output.push('\n');

        if self.rows.is_empty() {
            output.push_str("No expenses in this period.\n");
            return output;
        }

        let max = self.rows.first().map(|r| r.total.as_f64()).unwrap_or(0.0);
        for row in &self.rows {
            output.push_str(&format!(
                "{:<24} {:>13} {:>6} {:>7}  {}\n",
                truncate(&row.label, 24),
                row.total.format_with_symbol(symbol),
                row.count,
                format_percentage(row.percentage),
                format_bar(row.total.as_f64(), max, 14),
            ));
        }
        output.push_str(&separator(72));
        output.push('\n');
        output.push_str(&format!(
            "{:<24} {:>13}\n",
            "TOTAL SPENDING",
            self.total.format_with_symbol(symbol)
        ));
        output
    }

    /// Export the breakdown to CSV format
    pub fn export_csv<W: Write>(&self, writer: W) -> MoneyNoteResult<()> {
        let mut csv = csv::Writer::from_writer(writer);
        let export_err = |e: csv::Error| MoneyNoteError::Export(e.to_string());

        csv.write_record(["group", "amount", "count", "percentage"])
            .map_err(export_err)?;
        for row in &self.rows {
            csv.write_record([
                row.label.clone(),
                format!("{:.2}", row.total.as_f64()),
                row.count.to_string(),
                format!("{:.2}", row.percentage),
            ])
            .map_err(export_err)?;
        }
        csv.flush()?;
        Ok(())
    }
}

fn add_to(groups: &mut HashMap<String, (Money, usize)>, key: String, amount: Money) {
    let entry = groups.entry(key).or_insert((Money::zero(), 0));
    entry.0 += amount;
    entry.1 += 1;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::MoneyNotePaths;
    use crate::models::{Category, Expense, Tag};
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

    fn seed(storage: &Storage) {
        let food = Category::new("Food").id;
        let work = Tag::new("work");
        let travel = Tag::new("travel");
        storage.tags.upsert(work.clone()).unwrap();
        storage.tags.upsert(travel.clone()).unwrap();

        let rows = [
            (4000, PaymentMethod::CreditCard, vec![work.id, travel.id]),
            (1000, PaymentMethod::Cash, vec![work.id]),
            (5000, PaymentMethod::CreditCard, vec![]),
        ];
        for (cents, method, tags) in rows {
            let mut expense = Expense::new(Money::from_cents(cents), d(10), food);
            expense.payment_method = method;
            expense.tags = tags;
            storage.expenses.upsert(expense).unwrap();
        }
    }

    #[test]
    fn test_by_tag() {
        let (_temp, storage) = create_test_storage();
        seed(&storage);

        let report = Breakdown::by_tag(&storage, d(1), d(31)).unwrap();
        assert_eq!(report.total.cents(), 10000);
        assert_eq!(report.row("work").unwrap().total.cents(), 5000);
        assert_eq!(report.row("work").unwrap().count, 2);
        assert_eq!(report.row("travel").unwrap().total.cents(), 4000);
        assert_eq!(report.row("(untagged)").unwrap().total.cents(), 5000);
    }

    #[test]
    fn test_by_payment_method() {
        let (_temp, storage) = create_test_storage();
        seed(&storage);

        let report = Breakdown::by_payment_method(&storage, d(1), d(31)).unwrap();
        assert_eq!(report.rows.len(), 2);
        let credit = &report.rows[0];
        assert_eq!(credit.label, PaymentMethod::CreditCard.to_string());
        assert_eq!(credit.total.cents(), 9000);
        assert!((credit.percentage - 90.0).abs() < 1e-9);
        assert!(report.format_terminal("$").contains("TOTAL SPENDING"));
    }
}
