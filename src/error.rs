//! Custom error types for MoneyNote
//!
//! This module defines the error hierarchy for the application using thiserror
//! for ergonomic error definitions.

use thiserror::Error;

/// The main error type for MoneyNote operations
#[derive(Error, Debug)]
pub enum MoneyNoteError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// Validation errors for form fields and data models
    #[error("Validation error: {0}")]
    Validation(String),

    /// Entity not found errors
    #[error("{entity_type} not found: {identifier}")]
    NotFound {
        entity_type: &'static str,
        identifier: String,
    },

    /// Duplicate entity errors
    #[error("{entity_type} already exists: {identifier}")]
    Duplicate {
        entity_type: &'static str,
        identifier: String,
    },

    /// Entity is still referenced by other records
    #[error("{entity_type} '{identifier}' is still used by {count} record(s)")]
    InUse {
        entity_type: &'static str,
        identifier: String,
        count: usize,
    },

    /// Budget-related errors
    #[error("Budget error: {0}")]
    Budget(String),

    /// Recurring transaction errors
    #[error("Recurring error: {0}")]
    Recurring(String),

    /// Import errors
    #[error("Import error: {0}")]
    Import(String),

    /// Export errors
    #[error("Export error: {0}")]
    Export(String),

    /// Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// TUI errors
    #[error("TUI error: {0}")]
    Tui(String),
}

impl MoneyNoteError {
    /// Create a "not found" error for expenses
    pub fn expense_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Expense",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for incomes
    pub fn income_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Income",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for categories
    pub fn category_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Category",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for subcategories
    pub fn subcategory_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Subcategory",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for tags
    pub fn tag_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Tag",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for budgets
    pub fn budget_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Budget",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for recurring transactions
    pub fn recurring_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Recurring transaction",
            identifier: identifier.into(),
        }
    }

    /// Create a "not found" error for templates
    pub fn template_not_found(identifier: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: "Template",
            identifier: identifier.into(),
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}

impl From<std::io::Error> for MoneyNoteError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for MoneyNoteError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Result type alias for MoneyNote operations
pub type MoneyNoteResult<T> = Result<T, MoneyNoteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MoneyNoteError::Config("test error".into());
        assert_eq!(err.to_string(), "Configuration error: test error");
    }

    #[test]
    fn test_not_found_error() {
        let err = MoneyNoteError::category_not_found("Food");
        assert_eq!(err.to_string(), "Category not found: Food");
        assert!(err.is_not_found());
        assert!(!err.is_validation());
    }

    #[test]
    fn test_in_use_error() {
        let err = MoneyNoteError::InUse {
            entity_type: "Category",
            identifier: "Food".into(),
            count: 3,
        };
        assert_eq!(err.to_string(), "Category 'Food' is still used by 3 record(s)");
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: MoneyNoteError = io_err.into();
        assert!(matches!(err, MoneyNoteError::Io(_)));
    }
}
