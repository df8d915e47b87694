//! Category and Subcategory models
//!
//! Categories form a two-level classification: each category carries a
//! nested list of subcategories. Categories are either for expenses or for
//! income.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{CategoryId, SubcategoryId};

/// Maximum length of category, subcategory and tag names
pub const MAX_NAME_LEN: usize = 50;

/// Whether a category classifies expenses or income
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    #[default]
    Expense,
    Income,
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expense => write!(f, "Expense"),
            Self::Income => write!(f, "Income"),
        }
    }
}

impl std::str::FromStr for CategoryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "expense" | "expenses" => Ok(Self::Expense),
            "income" | "incomes" => Ok(Self::Income),
            other => Err(format!("Unknown category kind '{}' (expected expense or income)", other)),
        }
    }
}

/// A second-level classification inside a category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subcategory {
    pub id: SubcategoryId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl Subcategory {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: SubcategoryId::new(),
            name: name.into(),
            color: None,
            icon: None,
        }
    }
}

/// A user-defined transaction category
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    /// Unique identifier
    pub id: CategoryId,

    /// Category name
    pub name: String,

    /// Expense or income category
    #[serde(default)]
    pub kind: CategoryKind,

    /// Display color (`#RRGGBB`)
    #[serde(default = "default_color")]
    pub color: String,

    /// Short icon text (an emoji or a glyph name)
    #[serde(default)]
    pub icon: String,

    /// Whether this category ships with a fresh installation
    #[serde(default)]
    pub is_default: bool,

    /// Sort order for display
    #[serde(default)]
    pub sort_order: i32,

    /// Nested subcategories
    #[serde(default)]
    pub subcategories: Vec<Subcategory>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn default_color() -> String {
    "#9E9E9E".to_string()
}

impl Category {
    /// Create a new expense category
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_kind(name, CategoryKind::Expense)
    }

    /// Create a new category of the given kind
    pub fn with_kind(name: impl Into<String>, kind: CategoryKind) -> Self {
        let now = Utc::now();
        Self {
            id: CategoryId::new(),
            name: name.into(),
            kind,
            color: default_color(),
            icon: String::new(),
            is_default: false,
            sort_order: 0,
            subcategories: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Find a subcategory by ID
    pub fn subcategory(&self, id: SubcategoryId) -> Option<&Subcategory> {
        self.subcategories.iter().find(|s| s.id == id)
    }

    /// Find a subcategory by name (case-insensitive) or ID string
    pub fn find_subcategory(&self, identifier: &str) -> Option<&Subcategory> {
        let identifier = identifier.trim();
        self.subcategories
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(identifier))
            .or_else(|| self.subcategories.iter().find(|s| s.id.matches(identifier)))
    }

    /// Add a subcategory, rejecting duplicate names within this category
    pub fn add_subcategory(
        &mut self,
        subcategory: Subcategory,
    ) -> Result<(), CategoryValidationError> {
        validate_name(&subcategory.name)?;
        if self
            .subcategories
            .iter()
            .any(|s| s.name.eq_ignore_ascii_case(subcategory.name.trim()))
        {
            return Err(CategoryValidationError::DuplicateSubcategory(
                subcategory.name.clone(),
            ));
        }
        self.subcategories.push(subcategory);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Remove a subcategory; returns the removed entry
    pub fn remove_subcategory(&mut self, id: SubcategoryId) -> Option<Subcategory> {
        let index = self.subcategories.iter().position(|s| s.id == id)?;
        self.updated_at = Utc::now();
        Some(self.subcategories.remove(index))
    }

    /// Label with icon, e.g. "🍔 Food"
    pub fn label(&self) -> String {
        if self.icon.is_empty() {
            self.name.clone()
        } else {
            format!("{} {}", self.icon, self.name)
        }
    }

    /// Validate the category
    pub fn validate(&self) -> Result<(), CategoryValidationError> {
        validate_name(&self.name)?;
        if !is_valid_color(&self.color) {
            return Err(CategoryValidationError::InvalidColor(self.color.clone()));
        }
        for sub in &self.subcategories {
            validate_name(&sub.name)?;
            if let Some(color) = &sub.color {
                if !is_valid_color(color) {
                    return Err(CategoryValidationError::InvalidColor(color.clone()));
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

fn validate_name(name: &str) -> Result<(), CategoryValidationError> {
    if name.trim().is_empty() {
        return Err(CategoryValidationError::EmptyName);
    }
    let len = name.chars().count();
    if len > MAX_NAME_LEN {
        return Err(CategoryValidationError::NameTooLong(len));
    }
    Ok(())
}

/// Check for a `#RRGGBB` color string
pub fn is_valid_color(color: &str) -> bool {
    color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Validation errors for categories
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryValidationError {
    EmptyName,
    NameTooLong(usize),
    InvalidColor(String),
    DuplicateSubcategory(String),
}

impl fmt::Display for CategoryValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Name cannot be empty"),
            Self::NameTooLong(len) => {
                write!(f, "Name too long ({} chars, max {})", len, MAX_NAME_LEN)
            }
            Self::InvalidColor(c) => write!(f, "Invalid color '{}' (expected #RRGGBB)", c),
            Self::DuplicateSubcategory(name) => {
                write!(f, "Subcategory '{}' already exists", name)
            }
        }
    }
}

impl std::error::Error for CategoryValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_category() {
        let category = Category::new("Food");
        assert_eq!(category.name, "Food");
        assert_eq!(category.kind, CategoryKind::Expense);
        assert!(!category.is_default);
        assert!(category.subcategories.is_empty());
        assert!(category.validate().is_ok());
    }

    #[test]
    fn test_subcategories() {
        let mut category = Category::new("Food");
        category.add_subcategory(Subcategory::new("Groceries")).unwrap();
        category.add_subcategory(Subcategory::new("Restaurants")).unwrap();

        assert_eq!(
            category.add_subcategory(Subcategory::new("groceries")),
            Err(CategoryValidationError::DuplicateSubcategory("groceries".into()))
        );

        let groceries = category.find_subcategory("GROCERIES").unwrap().clone();
        assert_eq!(category.subcategory(groceries.id).unwrap().name, "Groceries");

        let removed = category.remove_subcategory(groceries.id).unwrap();
        assert_eq!(removed.name, "Groceries");
        assert_eq!(category.subcategories.len(), 1);
        assert!(category.remove_subcategory(groceries.id).is_none());
    }

    #[test]
    fn test_validation() {
        let mut category = Category::new("Valid");

        category.name = "  ".into();
        assert_eq!(category.validate(), Err(CategoryValidationError::EmptyName));

        category.name = "a".repeat(51);
        assert!(matches!(
            category.validate(),
            Err(CategoryValidationError::NameTooLong(51))
        ));

        category.name = "Valid".into();
        category.color = "red".into();
        assert!(matches!(
            category.validate(),
            Err(CategoryValidationError::InvalidColor(_))
        ));
    }

    #[test]
    fn test_color_check() {
        assert!(is_valid_color("#FF5722"));
        assert!(is_valid_color("#00ff00"));
        assert!(!is_valid_color("FF5722"));
        assert!(!is_valid_color("#FF572"));
        assert!(!is_valid_color("#GG5722"));
    }

    #[test]
    fn test_kind_parse() {
        assert_eq!("Income".parse::<CategoryKind>().unwrap(), CategoryKind::Income);
        assert_eq!("expense".parse::<CategoryKind>().unwrap(), CategoryKind::Expense);
        assert!("transfer".parse::<CategoryKind>().is_err());
    }

    #[test]
    fn test_label() {
        let mut category = Category::new("Food");
        assert_eq!(category.label(), "Food");
        category.icon = "🍔".into();
        assert_eq!(category.label(), "🍔 Food");
    }
}
