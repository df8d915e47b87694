//! Storage layer for MoneyNote
//!
//! One JSON file per collection under `data/`, loaded into memory and
//! written back atomically after every mutation.

pub mod budgets;
pub mod categories;
pub mod expenses;
pub mod file_io;
pub mod incomes;
pub mod init;
pub mod recurring;
pub mod repository;
pub mod tags;
pub mod templates;

pub use budgets::BudgetRepository;
pub use categories::CategoryRepository;
pub use expenses::ExpenseRepository;
pub use file_io::{read_json, write_json_atomic};
pub use incomes::IncomeRepository;
pub use init::{initialize_storage, FALLBACK_CATEGORY};
pub use recurring::RecurringRepository;
pub use repository::{JsonRepository, Record};
pub use tags::TagRepository;
pub use templates::TemplateRepository;

use serde::Serialize;

use crate::audit::{AuditEntry, AuditLogger, EntityType};
use crate::config::paths::MoneyNotePaths;
use crate::error::MoneyNoteError;

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: MoneyNotePaths,
    audit: AuditLogger,
    pub expenses: ExpenseRepository,
    pub incomes: IncomeRepository,
    pub categories: CategoryRepository,
    pub tags: TagRepository,
    pub budgets: BudgetRepository,
    pub recurring: RecurringRepository,
    pub templates: TemplateRepository,
}

impl Storage {
    /// Create a Storage over the given paths; nothing is loaded yet
    pub fn new(paths: MoneyNotePaths) -> Result<Self, MoneyNoteError> {
        paths.ensure_directories()?;

        Ok(Self {
            audit: AuditLogger::new(paths.audit_log()),
            expenses: ExpenseRepository::new(paths.expenses_file()),
            incomes: IncomeRepository::new(paths.incomes_file()),
            categories: CategoryRepository::new(paths.categories_file()),
            tags: TagRepository::new(paths.tags_file()),
            budgets: BudgetRepository::new(paths.budgets_file()),
            recurring: RecurringRepository::new(paths.recurring_file()),
            templates: TemplateRepository::new(paths.templates_file()),
            paths,
        })
    }

    /// Create and load in one step
    pub fn open(paths: MoneyNotePaths) -> Result<Self, MoneyNoteError> {
        let storage = Self::new(paths)?;
        storage.load_all()?;
        Ok(storage)
    }

    pub fn paths(&self) -> &MoneyNotePaths {
        &self.paths
    }

    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    /// Load all collections from disk
    pub fn load_all(&self) -> Result<(), MoneyNoteError> {
        self.expenses.load()?;
        self.incomes.load()?;
        self.categories.load()?;
        self.tags.load()?;
        self.budgets.load()?;
        self.recurring.load()?;
        self.templates.load()?;
        tracing::debug!(base = %self.paths.base_dir().display(), "loaded all collections");
        Ok(())
    }

    /// Save all collections to disk
    pub fn save_all(&self) -> Result<(), MoneyNoteError> {
        self.expenses.save()?;
        self.incomes.save()?;
        self.categories.save()?;
        self.tags.save()?;
        self.budgets.save()?;
        self.recurring.save()?;
        self.templates.save()?;
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.paths.is_initialized()
    }

    pub fn log_create<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> Result<(), MoneyNoteError> {
        self.audit
            .log(&AuditEntry::create(entity_type, entity_id, entity_name, entity))
    }

    pub fn log_update<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        before: &T,
        after: &T,
    ) -> Result<(), MoneyNoteError> {
        self.audit.log(&AuditEntry::update(
            entity_type,
            entity_id,
            entity_name,
            before,
            after,
        ))
    }

    pub fn log_delete<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> Result<(), MoneyNoteError> {
        self.audit
            .log(&AuditEntry::delete(entity_type, entity_id, entity_name, entity))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Tag};
    use tempfile::TempDir;

    #[test]
    fn test_storage_creation() {
        let temp_dir = TempDir::new().unwrap();
        let paths = MoneyNotePaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();

        assert!(temp_dir.path().join("data").exists());
        assert!(temp_dir.path().join("backups").exists());
        assert!(!storage.is_initialized());
    }

    #[test]
    fn test_save_all_and_reopen() {
        let temp_dir = TempDir::new().unwrap();
        let paths = MoneyNotePaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::open(paths.clone()).unwrap();

        storage.categories.upsert(Category::new("Food")).unwrap();
        storage.tags.upsert(Tag::new("work")).unwrap();
        storage.save_all().unwrap();

        let reopened = Storage::open(paths).unwrap();
        assert_eq!(reopened.categories.count().unwrap(), 1);
        assert_eq!(reopened.tags.count().unwrap(), 1);
        assert_eq!(reopened.expenses.count().unwrap(), 0);
    }

    #[test]
    fn test_audit_helpers() {
        let temp_dir = TempDir::new().unwrap();
        let paths = MoneyNotePaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();

        let tag = Tag::new("work");
        storage
            .log_create(EntityType::Tag, tag.id.to_string(), Some(tag.name.clone()), &tag)
            .unwrap();

        let entries = storage.audit().read_all().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].entity_type, EntityType::Tag);
    }
}
