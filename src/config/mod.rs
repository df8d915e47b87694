//! Configuration module for MoneyNote
//!
//! This module provides configuration management including:
//! - Platform path resolution
//! - User settings persistence

pub mod paths;
pub mod settings;

pub use paths::MoneyNotePaths;
pub use settings::Settings;
