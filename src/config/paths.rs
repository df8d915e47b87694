//! Path management for MoneyNote
//!
//! ## Path Resolution Order
//!
//! 1. `MONEYNOTE_DATA_DIR` environment variable (if set)
//! 2. The platform config directory reported by `directories`
//!    (`~/.config/moneynote` on Linux, `~/Library/Application Support/moneynote`
//!    on macOS, `%APPDATA%\moneynote\config` on Windows)

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::MoneyNoteError;

/// Environment variable overriding the base directory
pub const DATA_DIR_ENV: &str = "MONEYNOTE_DATA_DIR";

/// Manages all paths used by MoneyNote
#[derive(Debug, Clone)]
pub struct MoneyNotePaths {
    /// Base directory for all MoneyNote data
    base_dir: PathBuf,
}

impl MoneyNotePaths {
    /// Create a new MoneyNotePaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if no home directory can be determined and the
    /// override variable is not set.
    pub fn new() -> Result<Self, MoneyNoteError> {
        let base_dir = match std::env::var(DATA_DIR_ENV) {
            Ok(custom) if !custom.trim().is_empty() => PathBuf::from(custom),
            _ => resolve_default_path()?,
        };

        Ok(Self { base_dir })
    }

    /// Create MoneyNotePaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    pub fn backup_dir(&self) -> PathBuf {
        self.base_dir.join("backups")
    }

    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    pub fn audit_log(&self) -> PathBuf {
        self.base_dir.join("audit.log")
    }

    pub fn expenses_file(&self) -> PathBuf {
        self.data_dir().join("expenses.json")
    }

    pub fn incomes_file(&self) -> PathBuf {
        self.data_dir().join("incomes.json")
    }

    pub fn categories_file(&self) -> PathBuf {
        self.data_dir().join("categories.json")
    }

    pub fn tags_file(&self) -> PathBuf {
        self.data_dir().join("tags.json")
    }

    pub fn budgets_file(&self) -> PathBuf {
        self.data_dir().join("budgets.json")
    }

    pub fn recurring_file(&self) -> PathBuf {
        self.data_dir().join("recurring.json")
    }

    pub fn templates_file(&self) -> PathBuf {
        self.data_dir().join("templates.json")
    }

    /// All data files, keyed by the collection name used in snapshots
    pub fn data_files(&self) -> Vec<(&'static str, PathBuf)> {
        vec![
            ("expenses", self.expenses_file()),
            ("incomes", self.incomes_file()),
            ("categories", self.categories_file()),
            ("tags", self.tags_file()),
            ("budgets", self.budgets_file()),
            ("recurring", self.recurring_file()),
            ("templates", self.templates_file()),
        ]
    }

    /// Ensure the base, data and backup directories exist
    pub fn ensure_directories(&self) -> Result<(), MoneyNoteError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| MoneyNoteError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| MoneyNoteError::Io(format!("Failed to create data directory: {}", e)))?;

        std::fs::create_dir_all(self.backup_dir()).map_err(|e| {
            MoneyNoteError::Io(format!("Failed to create backup directory: {}", e))
        })?;

        Ok(())
    }

    /// Check if MoneyNote has been initialized (config file exists)
    pub fn is_initialized(&self) -> bool {
        self.settings_file().exists()
    }
}

fn resolve_default_path() -> Result<PathBuf, MoneyNoteError> {
    ProjectDirs::from("", "", "moneynote")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| {
            MoneyNoteError::Config(format!(
                "Could not determine a home directory; set {}",
                DATA_DIR_ENV
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_custom_base_dir() {
        let temp_dir = TempDir::new().unwrap();
        let paths = MoneyNotePaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.base_dir(), temp_dir.path());
        assert_eq!(paths.data_dir(), temp_dir.path().join("data"));
        assert_eq!(paths.backup_dir(), temp_dir.path().join("backups"));
    }

    #[test]
    fn test_ensure_directories() {
        let temp_dir = TempDir::new().unwrap();
        let paths = MoneyNotePaths::with_base_dir(temp_dir.path().to_path_buf());

        paths.ensure_directories().unwrap();

        assert!(paths.data_dir().exists());
        assert!(paths.backup_dir().exists());
        assert!(!paths.is_initialized());
    }

    #[test]
    fn test_file_paths() {
        let temp_dir = TempDir::new().unwrap();
        let paths = MoneyNotePaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.settings_file(), temp_dir.path().join("config.json"));
        assert_eq!(
            paths.expenses_file(),
            temp_dir.path().join("data").join("expenses.json")
        );
        assert_eq!(paths.data_files().len(), 7);
    }
}
