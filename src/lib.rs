//! MoneyNote - personal expense and budget tracker for the terminal
//!
//! This library provides the core functionality behind the `moneynote`
//! binary: recording expenses and income, organizing them with categories
//! and tags, planning monthly budgets, scheduling recurring transactions,
//! and reporting on where the money went.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Core data models (expenses, incomes, categories, budgets, etc.)
//! - `storage`: JSON file storage layer
//! - `services`: Business logic layer
//! - `audit`: Audit logging system
//! - `backup`: Periodic snapshots and restore
//! - `reports`: Dashboard, category, trend and breakdown reports
//! - `export`: JSON/YAML/CSV export and import
//! - `display`: Terminal formatting for CLI output
//! - `cli`: CLI command handlers
//! - `tui`: Interactive terminal interface
//!
//! # Example
//!
//! ```rust,ignore
//! use moneynote::config::{MoneyNotePaths, Settings};
//! use moneynote::storage::Storage;
//!
//! let paths = MoneyNotePaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let storage = Storage::open(paths)?;
//! ```

pub mod audit;
pub mod backup;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod models;
pub mod reports;
pub mod services;
pub mod storage;
pub mod tui;

pub use error::{MoneyNoteError, MoneyNoteResult};
