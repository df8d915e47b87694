//! First-run setup
//!
//! Seeds the default expense and income categories.

use crate::config::paths::MoneyNotePaths;
use crate::error::MoneyNoteError;
use crate::models::{Category, CategoryKind, Subcategory};

use super::file_io::write_collection;
use super::repository::Record;

/// Name of the fallback category records are moved to on forced deletes
pub const FALLBACK_CATEGORY: &str = "Other";

struct DefaultCategory {
    name: &'static str,
    color: &'static str,
    icon: &'static str,
    subcategories: &'static [&'static str],
}

const DEFAULT_EXPENSE_CATEGORIES: &[DefaultCategory] = &[
    DefaultCategory {
        name: "Food",
        color: "#FF5722",
        icon: "🍔",
        subcategories: &["Groceries", "Restaurants", "Coffee"],
    },
    DefaultCategory {
        name: "Transport",
        color: "#2196F3",
        icon: "🚗",
        subcategories: &["Fuel", "Public Transport", "Taxi", "Parking"],
    },
    DefaultCategory {
        name: "Housing",
        color: "#795548",
        icon: "🏠",
        subcategories: &["Rent", "Maintenance", "Furniture"],
    },
    DefaultCategory {
        name: "Utilities",
        color: "#FFC107",
        icon: "💡",
        subcategories: &["Electricity", "Water", "Internet", "Phone"],
    },
    DefaultCategory {
        name: "Health",
        color: "#4CAF50",
        icon: "💊",
        subcategories: &["Doctor", "Pharmacy", "Insurance"],
    },
    DefaultCategory {
        name: "Entertainment",
        color: "#9C27B0",
        icon: "🎬",
        subcategories: &["Movies", "Games", "Subscriptions"],
    },
    DefaultCategory {
        name: "Shopping",
        color: "#E91E63",
        icon: "🛍",
        subcategories: &["Clothing", "Electronics", "Gifts"],
    },
    DefaultCategory {
        name: "Education",
        color: "#3F51B5",
        icon: "📚",
        subcategories: &["Courses", "Books"],
    },
    DefaultCategory {
        name: FALLBACK_CATEGORY,
        color: "#9E9E9E",
        icon: "📦",
        subcategories: &[],
    },
];

const DEFAULT_INCOME_CATEGORIES: &[DefaultCategory] = &[
    DefaultCategory {
        name: "Salary",
        color: "#4CAF50",
        icon: "💼",
        subcategories: &[],
    },
    DefaultCategory {
        name: "Freelance",
        color: "#00BCD4",
        icon: "💻",
        subcategories: &[],
    },
    DefaultCategory {
        name: "Investments",
        color: "#8BC34A",
        icon: "📈",
        subcategories: &["Dividends", "Interest"],
    },
    DefaultCategory {
        name: FALLBACK_CATEGORY,
        color: "#9E9E9E",
        icon: "📦",
        subcategories: &[],
    },
];

fn build(defaults: &[DefaultCategory], kind: CategoryKind) -> Vec<Category> {
    defaults
        .iter()
        .enumerate()
        .map(|(i, d)| {
            let mut category = Category::with_kind(d.name, kind);
            category.color = d.color.to_string();
            category.icon = d.icon.to_string();
            category.is_default = true;
            category.sort_order = i as i32;
            category.subcategories = d.subcategories.iter().map(|s| Subcategory::new(*s)).collect();
            category
        })
        .collect()
}

/// The categories a fresh installation starts with
pub fn default_categories() -> Vec<Category> {
    let mut categories = build(DEFAULT_EXPENSE_CATEGORIES, CategoryKind::Expense);
    categories.extend(build(DEFAULT_INCOME_CATEGORIES, CategoryKind::Income));
    categories
}

/// Create directories and default data for a fresh installation.
/// Existing data is never overwritten; returns true when defaults were written.
pub fn initialize_storage(paths: &MoneyNotePaths) -> Result<bool, MoneyNoteError> {
    paths.ensure_directories()?;

    if !needs_initialization(paths) {
        return Ok(false);
    }

    write_collection(
        paths.categories_file(),
        Category::COLLECTION,
        &default_categories(),
    )?;
    Ok(true)
}

pub fn needs_initialization(paths: &MoneyNotePaths) -> bool {
    !paths.categories_file().exists()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::file_io::read_collection;
    use tempfile::TempDir;

    #[test]
    fn test_initialize_storage() {
        let temp_dir = TempDir::new().unwrap();
        let paths = MoneyNotePaths::with_base_dir(temp_dir.path().to_path_buf());

        assert!(needs_initialization(&paths));
        assert!(initialize_storage(&paths).unwrap());
        assert!(!needs_initialization(&paths));
        assert!(paths.data_dir().exists());
        assert!(paths.backup_dir().exists());
    }

    #[test]
    fn test_default_categories_created() {
        let temp_dir = TempDir::new().unwrap();
        let paths = MoneyNotePaths::with_base_dir(temp_dir.path().to_path_buf());
        initialize_storage(&paths).unwrap();

        let categories: Vec<Category> =
            read_collection(paths.categories_file(), "categories").unwrap();
        assert!(categories.iter().all(|c| c.is_default && c.validate().is_ok()));

        let fallback_kinds: Vec<_> = categories
            .iter()
            .filter(|c| c.name == FALLBACK_CATEGORY)
            .map(|c| c.kind)
            .collect();
        assert_eq!(fallback_kinds, vec![CategoryKind::Expense, CategoryKind::Income]);

        let food = categories.iter().find(|c| c.name == "Food").unwrap();
        assert!(food.find_subcategory("groceries").is_some());
    }

    #[test]
    fn test_doesnt_overwrite_existing() {
        let temp_dir = TempDir::new().unwrap();
        let paths = MoneyNotePaths::with_base_dir(temp_dir.path().to_path_buf());
        initialize_storage(&paths).unwrap();

        write_collection(paths.categories_file(), "categories", &[Category::new("Custom")])
            .unwrap();
        assert!(!initialize_storage(&paths).unwrap());

        let categories: Vec<Category> =
            read_collection(paths.categories_file(), "categories").unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].name, "Custom");
    }
}
