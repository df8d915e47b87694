//! Service layer for MoneyNote
//!
//! The service layer provides business logic on top of the storage layer,
//! handling validation, timestamps, audit logging, and cross-entity
//! operations.

pub mod budget;
pub mod category;
pub mod expense;
pub mod import;
pub mod income;
pub mod recurring;
pub mod tag;
pub mod template;

pub use budget::{BudgetProgress, BudgetService, BudgetTargets, CategoryProgress, TargetProgress};
pub use category::{CategoryService, CategoryUpdate, CategoryUsage};
pub use expense::{CreateExpenseInput, ExpenseFilter, ExpenseService, ExpenseSort, ExpenseUpdate};
pub use import::{ColumnMapping, ImportOptions, ImportResult, ImportService, ImportStatus};
pub use income::{IncomeFilter, IncomeService, IncomeUpdate};
pub use recurring::{
    CreateRecurringInput, GeneratedRecord, ProcessReport, RecurringService, RecurringUpdate,
    UpcomingOccurrence,
};
pub use tag::{TagService, TagUpdate};
pub use template::{CreateTemplateInput, TemplateService};
