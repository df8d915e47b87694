//! Category display formatting
//!
//! Formats categories as a tree (kind, category, subcategories) and as a
//! detail block with usage counts.

use crate::models::{Category, CategoryKind};
use crate::services::CategoryUsage;

/// Format categories as a tree grouped by kind
pub fn format_category_tree(categories: &[Category]) -> String {
    if categories.is_empty() {
        return "No categories found.\n\nRun 'moneynote init' to create default categories.\n"
            .to_string();
    }

    let mut output = String::new();

    for (i, kind) in [CategoryKind::Expense, CategoryKind::Income].iter().enumerate() {
        let of_kind: Vec<&Category> = categories.iter().filter(|c| c.kind == *kind).collect();
        if of_kind.is_empty() {
            continue;
        }
        if i > 0 && !output.is_empty() {
            output.push('\n');
        }
        output.push_str(&format!("{} categories\n", kind));

        for (j, category) in of_kind.iter().enumerate() {
            let is_last = j == of_kind.len() - 1;
            let prefix = if is_last { "└── " } else { "├── " };
            let default_marker = if category.is_default { "" } else { " *" };
            output.push_str(&format!(
                "  {}{}{}  [{}]\n",
                prefix,
                category.label(),
                default_marker,
                category.id
            ));

            let stem = if is_last { "    " } else { "│   " };
            for (k, sub) in category.subcategories.iter().enumerate() {
                let sub_prefix = if k == category.subcategories.len() - 1 {
                    "└── "
                } else {
                    "├── "
                };
                output.push_str(&format!("  {}{}{}\n", stem, sub_prefix, sub.name));
            }
        }
    }

    output.push_str("\n* user-created\n");
    output
}

/// Format category details with usage counts
pub fn format_category_details(category: &Category, usage: &CategoryUsage) -> String {
    let mut output = String::new();

    output.push_str(&format!("Category:  {}\n", category.label()));
    output.push_str(&format!("ID:        {}\n", category.id));
    output.push_str(&format!("Kind:      {}\n", category.kind));
    output.push_str(&format!("Color:     {}\n", category.color));
    output.push_str(&format!(
        "Default:   {}\n",
        if category.is_default { "yes" } else { "no" }
    ));

    if category.subcategories.is_empty() {
        output.push_str("Subcategories: (none)\n");
    } else {
        output.push_str("Subcategories:\n");
        for sub in &category.subcategories {
            output.push_str(&format!("  - {} [{}]\n", sub.name, sub.id));
        }
    }

    output.push_str("\nUsed by:\n");
    output.push_str(&format!("  Expenses:  {}\n", usage.expenses));
    output.push_str(&format!("  Incomes:   {}\n", usage.incomes));
    output.push_str(&format!("  Recurring: {}\n", usage.recurring));
    output.push_str(&format!("  Templates: {}\n", usage.templates));
    output.push_str(&format!("  Budgets:   {}\n", usage.budgets));

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Subcategory;

    #[test]
    fn test_category_tree() {
        let mut food = Category::new("Food");
        food.add_subcategory(Subcategory::new("Groceries")).unwrap();
        food.add_subcategory(Subcategory::new("Restaurants")).unwrap();
        let salary = Category::with_kind("Salary", CategoryKind::Income);

        let tree = format_category_tree(&[food, salary]);
        assert!(tree.contains("Expense categories"));
        assert!(tree.contains("Income categories"));
        assert!(tree.contains("├── Groceries"));
        assert!(tree.contains("└── Restaurants"));
    }

    #[test]
    fn test_empty_tree() {
        assert!(format_category_tree(&[]).contains("moneynote init"));
    }
}
