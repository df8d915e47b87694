//! Income display formatting

use tabled::Tabled;

use crate::models::{Income, Money};

use super::report::truncate;
use super::{render_table, NameLookup};

#[derive(Tabled)]
struct IncomeRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Description")]
    description: String,
}

pub fn format_income_table(incomes: &[Income], names: &NameLookup, symbol: &str) -> String {
    if incomes.is_empty() {
        return "No income found.\n".to_string();
    }

    let rows = incomes
        .iter()
        .map(|i| IncomeRow {
            id: i.id.to_string(),
            date: i.date.to_string(),
            amount: i.amount.format_with_symbol(symbol),
            source: truncate(&i.source, 24),
            category: names.optional_category(i.category_id),
            description: truncate(&i.description, 32),
        })
        .collect();

    let total: Money = incomes.iter().map(|i| i.amount).sum();
    format!(
        "{}\n{} income record(s), total {}\n",
        render_table(rows, &[2]),
        incomes.len(),
        total.format_with_symbol(symbol)
    )
}

pub fn format_income_details(income: &Income, names: &NameLookup, symbol: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!("Income:      {}\n", income.id));
    output.push_str(&format!("Date:        {}\n", income.date));
    output.push_str(&format!(
        "Amount:      {}\n",
        income.amount.format_with_symbol(symbol)
    ));
    output.push_str(&format!("Source:      {}\n", income.source));
    if let Some(id) = income.category_id {
        output.push_str(&format!("Category:    {}\n", names.category(id)));
    }
    if !income.description.is_empty() {
        output.push_str(&format!("Description: {}\n", income.description));
    }
    if let Some(recurring_id) = income.recurring_id {
        output.push_str(&format!("Recurring:   {}\n", recurring_id));
    }

    output
}
