//! Budget display formatting
//!
//! The month view prints targets, then one line per budgeted category with a
//! progress bar. Bars are clamped at 100%; the printed percentage is not.

use tabled::Tabled;

use crate::models::{Budget, BudgetStatus, Money, Progress};
use crate::services::{BudgetProgress, TargetProgress};

use super::render_table;
use super::report::{format_bar, format_percentage, separator, truncate};

const BAR_WIDTH: usize = 20;

fn status_marker(status: BudgetStatus) -> &'static str {
    match status {
        BudgetStatus::Ok => " ",
        BudgetStatus::Warning => "!",
        BudgetStatus::Over => "✗",
    }
}

fn progress_line(label: &str, progress: &Progress, symbol: &str) -> String {
    format!(
        "{} {:<24} {:>12} / {:<12} {} {:>6}\n",
        status_marker(progress.status),
        truncate(label, 24),
        progress.spent.format_with_symbol(symbol),
        progress.budget.format_with_symbol(symbol),
        format_bar(progress.display_percentage(), 100.0, BAR_WIDTH),
        format_percentage(progress.percentage),
    )
}

fn target_line(label: &str, target: &TargetProgress, symbol: &str) -> String {
    if target.target.is_zero() {
        return format!("  {:<24} {:>12}\n", label, target.actual.format_with_symbol(symbol));
    }
    format!(
        "{} {:<24} {:>12} / {:<12} {} {:>6}\n",
        if target.is_met() { "✓" } else { " " },
        label,
        target.actual.format_with_symbol(symbol),
        target.target.format_with_symbol(symbol),
        format_bar(target.percentage.clamp(0.0, 100.0), 100.0, BAR_WIDTH),
        format_percentage(target.percentage),
    )
}

/// Format a month's budget progress
pub fn format_budget_progress(progress: &BudgetProgress, symbol: &str) -> String {
    let budget = &progress.budget;
    let mut output = String::new();

    output.push_str(&format!("Budget: {}\n", budget.month.label()));
    output.push_str(&separator(84));
    output.push('\n');

    output.push_str(&target_line("Income", &progress.income, symbol));
    output.push_str(&progress_line("Expenses", &progress.expenses, symbol));
    output.push_str(&target_line("Savings", &progress.savings, symbol));

    if !progress.categories.is_empty() {
        output.push('\n');
        for category in &progress.categories {
            let label = if category.icon.is_empty() {
                category.name.clone()
            } else {
                format!("{} {}", category.icon, category.name)
            };
            output.push_str(&progress_line(&label, &category.progress, symbol));
        }
    }

    if progress.unbudgeted_spent.is_positive() {
        output.push_str(&format!(
            "\n  {:<24} {:>12}\n",
            "Unbudgeted spending",
            progress.unbudgeted_spent.format_with_symbol(symbol)
        ));
    }

    let over = progress.over_budget_count();
    if over > 0 {
        output.push_str(&format!("\n{} categor{} over budget\n", over, if over == 1 { "y" } else { "ies" }));
    }
    if !budget.notes.is_empty() {
        output.push_str(&format!("\nNotes: {}\n", budget.notes));
    }

    output
}

#[derive(Tabled)]
struct BudgetRow {
    #[tabled(rename = "Month")]
    month: String,
    #[tabled(rename = "Income target")]
    income: String,
    #[tabled(rename = "Expense target")]
    expense: String,
    #[tabled(rename = "Savings target")]
    savings: String,
    #[tabled(rename = "Categories")]
    categories: usize,
    #[tabled(rename = "Category total")]
    category_total: String,
}

/// Format all budgets, one row per month
pub fn format_budget_list(budgets: &[Budget], symbol: &str) -> String {
    if budgets.is_empty() {
        return "No budgets found.\n".to_string();
    }

    let money = |m: Money| m.format_with_symbol(symbol);
    let rows = budgets
        .iter()
        .map(|b| BudgetRow {
            month: b.month.to_string(),
            income: money(b.income_target),
            expense: money(b.expense_target),
            savings: money(b.savings_target),
            categories: b.categories.len(),
            category_total: money(b.total_category_budget()),
        })
        .collect();

    format!("{}\n", render_table(rows, &[1, 2, 3, 4, 5]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Month;

    #[test]
    fn test_progress_line_clamps_bar_not_percentage() {
        let progress = Progress::compute(Money::from_cents(10000), Money::from_cents(15000), 80);
        let line = progress_line("Food", &progress, "$");
        assert!(line.starts_with('✗'));
        assert!(line.contains("150%"));
        assert_eq!(line.chars().filter(|c| *c == '█').count(), BAR_WIDTH);
    }

    #[test]
    fn test_budget_list() {
        let mut budget = Budget::new(Month::new(2025, 3).unwrap());
        budget.expense_target = Money::from_cents(200000);
        let text = format_budget_list(&[budget], "$");
        assert!(text.contains("2025-03"));
        assert!(text.contains("$2000.00"));
    }
}
