//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod audit;
pub mod backup;
pub mod budget;
pub mod category;
pub mod expense;
pub mod export;
pub mod import;
pub mod income;
pub mod recurring;
pub mod report;
pub mod settings;
pub mod tag;
pub mod template;

pub use audit::{handle_audit_command, AuditArgs};
pub use backup::{handle_backup_command, BackupCommands};
pub use budget::{handle_budget_command, BudgetCommands};
pub use category::{handle_category_command, CategoryCommands};
pub use expense::{handle_expense_command, ExpenseCommands};
pub use export::{handle_export_command, ExportCommands};
pub use import::{handle_import_command, ImportCommands};
pub use income::{handle_income_command, IncomeCommands};
pub use recurring::{handle_recurring_command, RecurringCommands};
pub use report::{handle_report_command, ReportCommands};
pub use settings::{handle_settings_command, SettingsCommands};
pub use tag::{handle_tag_command, TagCommands};
pub use template::{handle_template_command, TemplateCommands};

use chrono::{Days, Local, NaiveDate};

use crate::error::{MoneyNoteError, MoneyNoteResult};
use crate::models::{Money, Month};

/// Today's date in local time
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Parse a date argument: `YYYY-MM-DD`, `today` or `yesterday`
pub fn parse_date(s: &str) -> MoneyNoteResult<NaiveDate> {
    match s.trim().to_ascii_lowercase().as_str() {
        "today" => Ok(today()),
        "yesterday" => today()
            .checked_sub_days(Days::new(1))
            .ok_or_else(|| MoneyNoteError::Validation("date: out of range".into())),
        other => NaiveDate::parse_from_str(other, "%Y-%m-%d").map_err(|_| {
            MoneyNoteError::Validation(format!("date: invalid '{}' (expected YYYY-MM-DD)", s))
        }),
    }
}

/// Parse an optional date argument, defaulting to today
pub fn parse_date_or_today(s: Option<&str>) -> MoneyNoteResult<NaiveDate> {
    s.map(parse_date).unwrap_or_else(|| Ok(today()))
}

pub fn parse_money(s: &str) -> MoneyNoteResult<Money> {
    Money::parse(s).map_err(|e| MoneyNoteError::Validation(format!("amount: {}", e)))
}

/// Parse a `YYYY-MM` month, defaulting to the current month
pub fn parse_month(s: Option<&str>) -> MoneyNoteResult<Month> {
    match s {
        Some(s) => Month::parse(s).map_err(|e| MoneyNoteError::Validation(format!("month: {}", e))),
        None => Ok(Month::current()),
    }
}

/// Split a comma-separated list, dropping blanks
pub fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(|part| part.trim().to_string())
        .filter(|part| !part.is_empty())
        .collect()
}
