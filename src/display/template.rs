//! Template display formatting

use tabled::Tabled;

use crate::models::{Template, TransactionKind};

use super::report::truncate;
use super::{render_table, NameLookup};

#[derive(Tabled)]
struct TemplateRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Used")]
    usage: u32,
}

/// Format templates, most used first
pub fn format_template_table(templates: &[Template], names: &NameLookup, symbol: &str) -> String {
    if templates.is_empty() {
        return "No templates found.\n".to_string();
    }

    let rows = templates
        .iter()
        .map(|t| TemplateRow {
            name: t.name.clone(),
            kind: t.kind.to_string(),
            amount: t
                .amount
                .map(|a| a.format_with_symbol(symbol))
                .unwrap_or_else(|| "(ask)".to_string()),
            category: names.optional_category(t.category_id),
            description: truncate(&t.description, 28),
            usage: t.usage_count,
        })
        .collect();

    format!("{}\n", render_table(rows, &[2, 5]))
}

pub fn format_template_details(template: &Template, names: &NameLookup, symbol: &str) -> String {
    let mut output = String::new();

    output.push_str(&format!("Template:    {}\n", template.name));
    output.push_str(&format!("ID:          {}\n", template.id));
    output.push_str(&format!("Kind:        {}\n", template.kind));
    match template.amount {
        Some(amount) => output.push_str(&format!("Amount:      {}\n", amount.format_with_symbol(symbol))),
        None => output.push_str("Amount:      (entered when applied)\n"),
    }
    if let Some(category_id) = template.category_id {
        output.push_str(&format!(
            "Category:    {}\n",
            names.category_path(category_id, template.subcategory_id)
        ));
    }
    if !template.description.is_empty() {
        output.push_str(&format!("Description: {}\n", template.description));
    }
    match template.kind {
        TransactionKind::Expense => {
            output.push_str(&format!("Payment:     {}\n", template.payment_method));
            if !template.tags.is_empty() {
                output.push_str(&format!("Tags:        {}\n", names.tags(&template.tags)));
            }
        }
        TransactionKind::Income => {
            output.push_str(&format!("Source:      {}\n", template.source));
        }
    }
    output.push_str(&format!("Used:        {} time(s)\n", template.usage_count));

    output
}
