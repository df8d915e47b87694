//! Export module for MoneyNote
//!
//! Full data export and import in two formats, plus flat CSV exports:
//! - JSON: machine-readable full export
//! - YAML: human-readable full export
//! - CSV: expenses and incomes for spreadsheets

pub mod apply;
pub mod csv;
pub mod json;
pub mod yaml;

pub use self::apply::{apply_import, ImportMode, ImportSummary};
pub use self::csv::{export_expenses_csv, export_incomes_csv, DateFilter};
pub use self::json::{
    export_full_json, import_from_json, FullExport, RecordCounts, EXPORT_APP_NAME,
    EXPORT_SCHEMA_VERSION,
};
pub use self::yaml::{export_full_yaml, import_from_yaml};
