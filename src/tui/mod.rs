//! Interactive front end
//!
//! A ratatui application over the same services the CLI uses. A sidebar
//! picks the view, a status bar reports outcomes, and dialogs collect
//! expenses, incomes and budget limits.

pub mod app;
pub mod dialogs;
pub mod event;
pub mod handler;
pub mod layout;
pub mod terminal;
pub mod views;
pub mod widgets;

pub use app::App;
pub use terminal::run_tui;
