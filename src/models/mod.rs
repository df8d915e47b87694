//! Core data models for MoneyNote
//!
//! Plain data records for the tracker: expenses, incomes, categories, tags,
//! budgets, recurring rules and templates, plus the value types they share.

pub mod budget;
pub mod category;
pub mod expense;
pub mod ids;
pub mod income;
pub mod money;
pub mod month;
pub mod recurring;
pub mod tag;
pub mod template;

pub use budget::{Budget, BudgetStatus, BudgetValidationError, CategoryBudget, Progress};
pub use category::{Category, CategoryKind, CategoryValidationError, Subcategory};
pub use expense::{Expense, PaymentMethod, TransactionValidationError};
pub use ids::{
    BudgetId, CategoryId, ExpenseId, IncomeId, RecurringId, SubcategoryId, TagId, TemplateId,
};
pub use income::Income;
pub use money::{Money, MoneyParseError};
pub use month::{Month, MonthParseError};
pub use recurring::{Frequency, RecurringTransaction, RecurringValidationError, TransactionKind};
pub use tag::Tag;
pub use template::{Template, TemplateValidationError};
