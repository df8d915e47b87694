//! Expense display formatting

use tabled::Tabled;

use crate::models::{Expense, Money};

use super::report::truncate;
use super::{render_table, NameLookup};

#[derive(Tabled)]
struct ExpenseRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Method")]
    method: String,
    #[tabled(rename = "Tags")]
    tags: String,
}

/// Format expenses as a table with a total line
pub fn format_expense_table(expenses: &[Expense], names: &NameLookup, symbol: &str) -> String {
    if expenses.is_empty() {
        return "No expenses found.\n".to_string();
    }

    let rows = expenses
        .iter()
        .map(|e| ExpenseRow {
            id: e.id.to_string(),
            date: e.date.to_string(),
            amount: e.amount.format_with_symbol(symbol),
            category: truncate(&names.category_path(e.category_id, e.subcategory_id), 28),
            description: truncate(&e.description, 32),
            method: e.payment_method.to_string(),
            tags: names.tags(&e.tags),
        })
        .collect();

    let total: Money = expenses.iter().map(|e| e.amount).sum();
    format!(
        "{}\n{} expense(s), total {}\n",
        render_table(rows, &[2]),
        expenses.len(),
        total.format_with_symbol(symbol)
    )
}

pub fn format_expense_details(expense: &Expense, names: &NameLookup, symbol: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!("Expense:     {}\n", expense.id));
    output.push_str(&format!("Date:        {}\n", expense.date));
    output.push_str(&format!(
        "Amount:      {}\n",
        expense.amount.format_with_symbol(symbol)
    ));
    output.push_str(&format!(
        "Category:    {}\n",
        names.category_path(expense.category_id, expense.subcategory_id)
    ));
    if !expense.description.is_empty() {
        output.push_str(&format!("Description: {}\n", expense.description));
    }
    output.push_str(&format!("Payment:     {}\n", expense.payment_method));
    if !expense.tags.is_empty() {
        output.push_str(&format!("Tags:        {}\n", names.tags(&expense.tags)));
    }
    if expense.is_fixed {
        output.push_str("Fixed:       yes\n");
    }
    if !expense.notes.is_empty() {
        output.push_str(&format!("Notes:       {}\n", expense.notes));
    }
    if let Some(recurring_id) = expense.recurring_id {
        output.push_str(&format!("Recurring:   {}\n", recurring_id));
    }
    output.push_str(&format!(
        "Created:     {}\n",
        expense.created_at.format("%Y-%m-%d %H:%M")
    ));

    output
}
