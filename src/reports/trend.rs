//! Monthly Trend Report
//!
//! Income, expenses and balance for a run of consecutive months.

use std::io::Write;

use crate::display::report::{format_bar, format_percentage, separator};
use crate::error::{MoneyNoteError, MoneyNoteResult};
use crate::models::{Money, Month};
use crate::storage::Storage;

/// Totals for one month
#[derive(Debug, Clone, PartialEq)]
pub struct MonthSummary {
    pub month: Month,
    pub income: Money,
    pub expenses: Money,
    pub balance: Money,
    /// Share of income kept, 0 when there was no income
    pub savings_rate: f64,
    pub income_count: usize,
    pub expense_count: usize,
}

impl MonthSummary {
    pub fn compute(storage: &Storage, month: Month) -> MoneyNoteResult<Self> {
        let expenses = storage.expenses.get_by_month(month)?;
        let incomes = storage.incomes.get_by_month(month)?;

        let income: Money = incomes.iter().map(|i| i.amount).sum();
        let spent: Money = expenses.iter().map(|e| e.amount).sum();
        let balance = income - spent;

        Ok(Self {
            month,
            income,
            expenses: spent,
            balance,
            savings_rate: savings_rate(income, balance),
            income_count: incomes.len(),
            expense_count: expenses.len(),
        })
    }
}

/// `balance / income * 100`, 0 without income
pub fn savings_rate(income: Money, balance: Money) -> f64 {
    if income.is_positive() {
        balance.percentage_of(income)
    } else {
        0.0
    }
}

/// Monthly Trend Report
#[derive(Debug, Clone)]
pub struct TrendReport {
    /// Oldest first
    pub months: Vec<MonthSummary>,
}

impl TrendReport {
    /// Generate the trend for the `count` months ending at `end`
    pub fn generate(storage: &Storage, end: Month, count: usize) -> MoneyNoteResult<Self> {
        let months = end
            .trailing(count.max(1))
            .into_iter()
            .map(|month| MonthSummary::compute(storage, month))
            .collect::<MoneyNoteResult<Vec<_>>>()?;
        Ok(Self { months })
    }

    pub fn total_income(&self) -> Money {
        self.months.iter().map(|m| m.income).sum()
    }

    pub fn total_expenses(&self) -> Money {
        self.months.iter().map(|m| m.expenses).sum()
    }

    pub fn average_expenses(&self) -> Money {
        average(self.total_expenses(), self.months.len())
    }

    pub fn average_income(&self) -> Money {
        average(self.total_income(), self.months.len())
    }

    /// Format the report for terminal display
    pub fn format_terminal(&self, symbol: &str) -> String {
        let mut output = String::new();
        let (Some(first), Some(last)) = (self.months.first(), self.months.last()) else {
            return output;
        };

        output.push_str(&format!(
            "Monthly Trend: {} to {}\n",
            first.month.label(),
            last.month.label()
        ));
        output.push_str(&separator(78));
        output.push('\n');
        output.push_str(&format!(
            "{:<10} {:>13} {:>13} {:>13} {:>8}  {}\n",
            "Month", "Income", "Expenses", "Balance", "Saved", "Spending"
        ));

        let max = self
            .months
            .iter()
            .map(|m| m.expenses.as_f64())
            .fold(0.0, f64::max);
        for month in &self.months {
            output.push_str(&format!(
                "{:<10} {:>13} {:>13} {:>13} {:>8}  {}\n",
                month.month.to_string(),
                month.income.format_with_symbol(symbol),
                month.expenses.format_with_symbol(symbol),
                month.balance.format_with_symbol(symbol),
                format_percentage(month.savings_rate),
                format_bar(month.expenses.as_f64(), max, 14),
            ));
        }

        output.push_str(&separator(78));
        output.push('\n');
        output.push_str(&format!(
            "{:<10} {:>13} {:>13} {:>13}\n",
            "Average",
            self.average_income().format_with_symbol(symbol),
            self.average_expenses().format_with_symbol(symbol),
            (self.average_income() - self.average_expenses()).format_with_symbol(symbol),
        ));
        output
    }

    /// Export the report to CSV format
    pub fn export_csv<W: Write>(&self, writer: W) -> MoneyNoteResult<()> {
        let mut csv = csv::Writer::from_writer(writer);
        let export_err = |e: csv::Error| MoneyNoteError::Export(e.to_string());

        csv.write_record(["month", "income", "expenses", "balance", "savings_rate"])
            .map_err(export_err)?;
        for month in &self.months {
            csv.write_record([
                month.month.to_string(),
                format!("{:.2}", month.income.as_f64()),
                format!("{:.2}", month.expenses.as_f64()),
                format!("{:.2}", month.balance.as_f64()),
                format!("{:.1}", month.savings_rate),
            ])
            .map_err(export_err)?;
        }
        csv.flush()?;
        Ok(())
    }
}

fn average(total: Money, count: usize) -> Money {
    if count == 0 {
        Money::zero()
    } else {
        Money::from_cents(total.cents() / count as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::MoneyNotePaths;
    use crate::models::{Category, Expense, Income};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = MoneyNotePaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::open(paths).unwrap();
        (temp_dir, storage)
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn seed(storage: &Storage) {
        let food = Category::new("Food");
        storage.categories.upsert(food.clone()).unwrap();
        for (date, cents) in [(d(2025, 1, 5), 40000), (d(2025, 3, 2), 10000), (d(2025, 3, 20), 5000)] {
            storage
                .expenses
                .upsert(Expense::new(Money::from_cents(cents), date, food.id))
                .unwrap();
        }
        for date in [d(2025, 1, 31), d(2025, 3, 31)] {
            storage
                .incomes
                .upsert(Income::new(Money::from_cents(100000), date, "Acme"))
                .unwrap();
        }
    }

    #[test]
    fn test_month_summary() {
        let (_temp, storage) = create_test_storage();
        seed(&storage);

        let march = MonthSummary::compute(&storage, Month::new(2025, 3).unwrap()).unwrap();
        assert_eq!(march.expenses.cents(), 15000);
        assert_eq!(march.balance.cents(), 85000);
        assert!((march.savings_rate - 85.0).abs() < 1e-9);
        assert_eq!(march.expense_count, 2);

        let february = MonthSummary::compute(&storage, Month::new(2025, 2).unwrap()).unwrap();
        assert_eq!(february.savings_rate, 0.0);
    }

    #[test]
    fn test_trend_covers_empty_months() {
        let (_temp, storage) = create_test_storage();
        seed(&storage);

        let report = TrendReport::generate(&storage, Month::new(2025, 3).unwrap(), 3).unwrap();
        let months: Vec<String> = report.months.iter().map(|m| m.month.to_string()).collect();
        assert_eq!(months, vec!["2025-01", "2025-02", "2025-03"]);
        assert_eq!(report.total_expenses().cents(), 55000);
        assert_eq!(report.average_income().cents(), 66666);

        let text = report.format_terminal("$");
        assert!(text.contains("2025-02"));

        let mut out = Vec::new();
        report.export_csv(&mut out).unwrap();
        let csv = String::from_utf8(out).unwrap();
        assert!(csv.starts_with("month,income,expenses,balance,savings_rate"));
        assert!(csv.contains("2025-01,1000.00,400.00,600.00,60.0"));
    }
}
