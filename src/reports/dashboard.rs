//! Dashboard Summary
//!
//! The one-screen overview of a month: totals, comparison with the previous
//! month, top categories, budget alerts, recent activity and the recurring
//! transactions coming up in the next week.

use chrono::{DateTime, NaiveDate, Utc};

use crate::display::report::{format_change, format_percentage, separator, truncate};
use crate::error::MoneyNoteResult;
use crate::models::{CategoryId, Money, Month, TransactionKind};
use crate::services::{BudgetProgress, BudgetService, RecurringService, UpcomingOccurrence};
use crate::storage::Storage;

use super::categories::{CategoryBreakdown, CategorySpending};
use super::trend::MonthSummary;

/// Categories shown in the dashboard's top list
pub const TOP_CATEGORY_COUNT: usize = 5;
/// Entries shown in the recent activity list
pub const RECENT_COUNT: usize = 8;
/// Days of upcoming recurring transactions
pub const UPCOMING_DAYS: u64 = 7;

/// An expense or income in the recent activity list
#[derive(Debug, Clone)]
pub struct RecentEntry {
    pub date: NaiveDate,
    pub kind: TransactionKind,
    pub amount: Money,
    /// Description, or the income source
    pub label: String,
    pub category: String,
    created_at: DateTime<Utc>,
}

/// Dashboard Summary
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub month: Month,
    pub current: MonthSummary,
    pub previous: MonthSummary,
    pub top_categories: Vec<CategorySpending>,
    pub budget: Option<BudgetProgress>,
    pub recent: Vec<RecentEntry>,
    pub upcoming: Vec<UpcomingOccurrence>,
}

impl Dashboard {
    pub fn generate(
        storage: &Storage,
        month: Month,
        today: NaiveDate,
        alert_threshold: u8,
    ) -> MoneyNoteResult<Self> {
        let current = MonthSummary::compute(storage, month)?;
        let previous = MonthSummary::compute(storage, month.prev())?;

        let mut top_categories =
            CategoryBreakdown::generate(storage, month.start_date(), month.end_date())?.categories;
        top_categories.truncate(TOP_CATEGORY_COUNT);

        let budget = BudgetService::new(storage).progress(month, alert_threshold)?;
        let upcoming = RecurringService::new(storage).upcoming(today, UPCOMING_DAYS)?;

        Ok(Self {
            month,
            current,
            previous,
            top_categories,
            budget,
            recent: recent_entries(storage, RECENT_COUNT)?,
            upcoming,
        })
    }

    /// Percent change in spending from the previous month; None when the
    /// previous month had no spending
    pub fn expense_change(&self) -> Option<f64> {
        percent_change(self.previous.expenses, self.current.expenses)
    }

    pub fn income_change(&self) -> Option<f64> {
        percent_change(self.previous.income, self.current.income)
    }

    /// Format the dashboard for terminal display
    pub fn format_terminal(&self, symbol: &str) -> String {
        let money = |m: Money| m.format_with_symbol(symbol);
        let mut output = String::new();

        output.push_str(&format!("Dashboard: {}\n", self.month.label()));
        output.push_str(&separator(60));
        output.push('\n');
        output.push_str(&format!(
            "Income:    {:>14}  {}\n",
            money(self.current.income),
            format_change(self.income_change())
        ));
        output.push_str(&format!(
            "Expenses:  {:>14}  {}\n",
            money(self.current.expenses),
            format_change(self.expense_change())
        ));
        output.push_str(&format!("Balance:   {:>14}\n", money(self.current.balance)));
        output.push_str(&format!(
            "Saved:     {:>14}\n",
            format_percentage(self.current.savings_rate)
        ));

        if !self.top_categories.is_empty() {
            output.push_str("\nTop categories\n");
            for category in &self.top_categories {
                output.push_str(&format!(
                    "  {:<26} {:>12} {:>7}\n",
                    truncate(&category.name, 26),
                    money(category.total),
                    format_percentage(category.percentage)
                ));
            }
        }

        if let Some(budget) = &self.budget {
            let alerts = budget.alerts();
            if !alerts.is_empty() {
                output.push_str("\nBudget alerts\n");
                for alert in alerts {
                    output.push_str(&format!(
                        "  {:<26} {} of {} ({})\n",
                        truncate(&alert.name, 26),
                        money(alert.progress.spent),
                        money(alert.progress.budget),
                        format_percentage(alert.progress.percentage)
                    ));
                }
            }
        }

        if !self.recent.is_empty() {
            output.push_str("\nRecent\n");
            for entry in &self.recent {
                let amount = match entry.kind {
                    TransactionKind::Expense => format!("-{}", money(entry.amount)),
                    TransactionKind::Income => format!("+{}", money(entry.amount)),
                };
                output.push_str(&format!(
                    "  {}  {:<24} {:<14} {:>12}\n",
                    entry.date,
                    truncate(&entry.label, 24),
                    truncate(&entry.category, 14),
                    amount
                ));
            }
        }

        if !self.upcoming.is_empty() {
            output.push_str(&format!("\nUpcoming ({} days)\n", UPCOMING_DAYS));
            for item in &self.upcoming {
                output.push_str(&format!(
                    "  {}  {:<24} {:<8} {:>12}\n",
                    item.date,
                    truncate(&item.description, 24),
                    item.kind,
                    money(item.amount)
                ));
            }
        }

        output
    }
}

/// Newest expenses and incomes, merged
fn recent_entries(storage: &Storage, count: usize) -> MoneyNoteResult<Vec<RecentEntry>> {
    let categories = storage.categories.get_all()?;
    let category_name = |id: CategoryId| {
        categories
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.name.clone())
            .unwrap_or_default()
    };

    let mut entries: Vec<RecentEntry> = storage
        .expenses
        .get_all()?
        .into_iter()
        .map(|e| RecentEntry {
            date: e.date,
            kind: TransactionKind::Expense,
            amount: e.amount,
            label: e.description.clone(),
            category: category_name(e.category_id),
            created_at: e.created_at,
        })
        .collect();
    entries.extend(storage.incomes.get_all()?.into_iter().map(|i| RecentEntry {
        date: i.date,
        kind: TransactionKind::Income,
        amount: i.amount,
        label: i.source.clone(),
        category: i.category_id.map(category_name).unwrap_or_default(),
        created_at: i.created_at,
    }));

    entries.sort_by(|a, b| {
        b.date
            .cmp(&a.date)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });
    entries.truncate(count);
    Ok(entries)
}

fn percent_change(before: Money, after: Money) -> Option<f64> {
    if before.is_zero() {
        None
    } else {
        Some((after - before).percentage_of(before))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::MoneyNotePaths;
    use crate::models::{Category, Expense, Frequency, Income};
    use crate::services::{BudgetTargets, CreateRecurringInput};
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
    fn test_dashboard() {
        let (_temp, storage) = create_test_storage();
        let food = Category::new("Food");
        storage.categories.upsert(food.clone()).unwrap();

        for (date, cents) in [(d(1, 10), 20000), (d(2, 10), 25000), (d(2, 12), 5000)] {
            let mut expense = Expense::new(Money::from_cents(cents), date, food.id);
            expense.description = format!("groceries {}", date);
            storage.expenses.upsert(expense).unwrap();
        }
        for date in [d(1, 31), d(2, 28)] {
            storage
                .incomes
                .upsert(Income::new(Money::from_cents(100000), date, "Acme"))
                .unwrap();
        }

        let february = Month::new(2025, 2).unwrap();
        let budgets = BudgetService::new(&storage);
        budgets
            .set_targets(february, BudgetTargets::default())
            .unwrap();
        budgets
            .set_category(february, food.id, Money::from_cents(32000))
            .unwrap();

        let mut rent = CreateRecurringInput::new(
            TransactionKind::Expense,
            Money::from_cents(90000),
            Frequency::Monthly,
            d(3, 1),
        );
        rent.category_id = Some(food.id);
        rent.description = "Rent".into();
        RecurringService::new(&storage).create(rent).unwrap();

        let dashboard = Dashboard::generate(&storage, february, d(2, 25), 80).unwrap();
        assert_eq!(dashboard.current.expenses.cents(), 30000);
        assert_eq!(dashboard.current.balance.cents(), 70000);
        assert!((dashboard.expense_change().unwrap() - 50.0).abs() < 1e-9);
        assert_eq!(dashboard.income_change(), Some(0.0));
        assert_eq!(dashboard.top_categories[0].name, "Food");
        assert_eq!(dashboard.budget.as_ref().unwrap().alerts().len(), 1);
        assert_eq!(dashboard.recent[0].kind, TransactionKind::Income);
        assert_eq!(dashboard.recent.len(), 5);
        assert_eq!(dashboard.upcoming.len(), 1);
        assert_eq!(dashboard.upcoming[0].date, d(3, 1));

        let text = dashboard.format_terminal("$");
        assert!(text.contains("up 50% vs last month"));
        assert!(text.contains("Budget alerts"));
        assert!(text.contains("Rent"));
    }

    #[test]
    fn test_empty_dashboard() {
        let (_temp, storage) = create_test_storage();
        let dashboard =
            Dashboard::generate(&storage, Month::new(2025, 2).unwrap(), d(2, 1), 80).unwrap();
        assert!(dashboard.expense_change().is_none());
        assert!(dashboard.budget.is_none());
        assert!(dashboard.recent.is_empty());
        assert_eq!(dashboard.current.savings_rate, 0.0);
    }
}
