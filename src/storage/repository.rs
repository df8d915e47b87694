//! Generic JSON-file repository
//!
//! Each collection is held in memory behind an `RwLock` and written back to
//! its own data file as `{ "<collection>": [ ... ] }`.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{de::DeserializeOwned, Serialize};

use crate::error::MoneyNoteError;
use crate::models::ids::EntityId;

use super::file_io::{read_collection, write_collection};

/// A record stored in a [`JsonRepository`]
pub trait Record: Clone + Serialize + DeserializeOwned {
    type Id: EntityId;

    /// Key of the list inside the data file
    const COLLECTION: &'static str;

    fn id(&self) -> Self::Id;

    /// Listing order, also used when writing the file
    fn listing_order(&self, other: &Self) -> Ordering;
}

/// Repository for one collection
pub struct JsonRepository<T: Record> {
    path: PathBuf,
    data: RwLock<HashMap<T::Id, T>>,
}

impl<T: Record> JsonRepository<T> {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<T::Id, T>>, MoneyNoteError> {
        self.data
            .read()
            .map_err(|e| MoneyNoteError::Storage(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<T::Id, T>>, MoneyNoteError> {
        self.data
            .write()
            .map_err(|e| MoneyNoteError::Storage(format!("Failed to acquire write lock: {}", e)))
    }

    /// Load records from disk, replacing what is in memory
    pub fn load(&self) -> Result<(), MoneyNoteError> {
        let records: Vec<T> = read_collection(&self.path, T::COLLECTION)?;
        let mut data = self.write()?;
        data.clear();
        for record in records {
            data.insert(record.id(), record);
        }
        Ok(())
    }

    /// Save records to disk
    pub fn save(&self) -> Result<(), MoneyNoteError> {
        let records = self.get_all()?;
        write_collection(&self.path, T::COLLECTION, &records)
    }

    pub fn get(&self, id: T::Id) -> Result<Option<T>, MoneyNoteError> {
        Ok(self.read()?.get(&id).cloned())
    }

    pub fn contains(&self, id: T::Id) -> Result<bool, MoneyNoteError> {
        Ok(self.read()?.contains_key(&id))
    }

    /// All records in listing order
    pub fn get_all(&self) -> Result<Vec<T>, MoneyNoteError> {
        let mut records: Vec<T> = self.read()?.values().cloned().collect();
        records.sort_by(|a, b| a.listing_order(b));
        Ok(records)
    }

    /// Resolve a user-supplied identifier (full UUID, `exp-1a2b3c4d`, or a
    /// UUID prefix). More than one match is a validation error.
    pub fn resolve(&self, identifier: &str) -> Result<Option<T>, MoneyNoteError> {
        let mut matches = self.filter(|r| r.id().matches_identifier(identifier))?;
        match matches.len() {
            0 => Ok(None),
            1 => Ok(matches.pop()),
            n => Err(MoneyNoteError::Validation(format!(
                "'{}' matches {} records, use a longer id",
                identifier.trim(),
                n
            ))),
        }
    }

    /// Records matching a predicate, in listing order
    pub fn filter<F>(&self, predicate: F) -> Result<Vec<T>, MoneyNoteError>
    where
        F: Fn(&T) -> bool,
    {
        let mut records: Vec<T> = self
            .read()?
            .values()
            .filter(|r| predicate(r))
            .cloned()
            .collect();
        records.sort_by(|a, b| a.listing_order(b));
        Ok(records)
    }

    /// First record (in listing order) matching a predicate
    pub fn find<F>(&self, predicate: F) -> Result<Option<T>, MoneyNoteError>
    where
        F: Fn(&T) -> bool,
    {
        Ok(self.filter(predicate)?.into_iter().next())
    }

    pub fn count_where<F>(&self, predicate: F) -> Result<usize, MoneyNoteError>
    where
        F: Fn(&T) -> bool,
    {
        Ok(self.read()?.values().filter(|r| predicate(r)).count())
    }

    /// Insert or replace a record
    pub fn upsert(&self, record: T) -> Result<(), MoneyNoteError> {
        self.write()?.insert(record.id(), record);
        Ok(())
    }

    /// Remove a record; returns the removed record if it existed
    pub fn delete(&self, id: T::Id) -> Result<Option<T>, MoneyNoteError> {
        Ok(self.write()?.remove(&id))
    }

    /// Apply a change to every record matching a predicate; returns the
    /// number of records changed
    pub fn update_where<P, F>(&self, predicate: P, mut change: F) -> Result<usize, MoneyNoteError>
    where
        P: Fn(&T) -> bool,
        F: FnMut(&mut T),
    {
        let mut data = self.write()?;
        let mut changed = 0;
        for record in data.values_mut().filter(|r| predicate(r)) {
            change(record);
            changed += 1;
        }
        Ok(changed)
    }

    /// Replace the whole collection
    pub fn replace_all(&self, records: Vec<T>) -> Result<(), MoneyNoteError> {
        let mut data = self.write()?;
        data.clear();
        for record in records {
            data.insert(record.id(), record);
        }
        Ok(())
    }

    pub fn count(&self) -> Result<usize, MoneyNoteError> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, MoneyNoteError> {
        Ok(self.read()?.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, CategoryKind};
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, JsonRepository<Category>) {
        let temp_dir = TempDir::new().unwrap();
        let repo = JsonRepository::new(temp_dir.path().join("categories.json"));
        (temp_dir, repo)
    }

    #[test]
    fn test_empty_load() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();
        assert_eq!(repo.count().unwrap(), 0);
        assert!(repo.is_empty().unwrap());
    }

    #[test]
    fn test_upsert_get_delete() {
        let (_temp_dir, repo) = create_test_repo();
        let category = Category::new("Food");
        let id = category.id;

        repo.upsert(category).unwrap();
        assert_eq!(repo.get(id).unwrap().unwrap().name, "Food");

        let removed = repo.delete(id).unwrap();
        assert_eq!(removed.unwrap().name, "Food");
        assert!(repo.delete(id).unwrap().is_none());
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_save_and_reload() {
        let (temp_dir, repo) = create_test_repo();
        repo.upsert(Category::new("Food")).unwrap();
        repo.upsert(Category::with_kind("Salary", CategoryKind::Income))
            .unwrap();
        repo.save().unwrap();

        let raw = std::fs::read_to_string(temp_dir.path().join("categories.json")).unwrap();
        assert!(raw.contains("\"categories\""));

        let reloaded: JsonRepository<Category> =
            JsonRepository::new(temp_dir.path().join("categories.json"));
        reloaded.load().unwrap();
        assert_eq!(reloaded.count().unwrap(), 2);
    }

    #[test]
    fn test_resolve_by_short_id() {
        let (_temp_dir, repo) = create_test_repo();
        let category = Category::new("Food");
        let short = category.id.to_string();
        repo.upsert(category.clone()).unwrap();
        repo.upsert(Category::new("Transport")).unwrap();

        assert_eq!(repo.resolve(&short).unwrap().unwrap().id, category.id);
        assert_eq!(
            repo.resolve(&category.id.as_uuid().to_string()).unwrap().unwrap().id,
            category.id
        );
        assert!(repo.resolve("cat-zzzzzzzz").unwrap().is_none());
    }

    #[test]
    fn test_filter_and_update_where() {
        let (_temp_dir, repo) = create_test_repo();
        repo.upsert(Category::new("Food")).unwrap();
        repo.upsert(Category::new("Transport")).unwrap();
        repo.upsert(Category::with_kind("Salary", CategoryKind::Income))
            .unwrap();

        let expense = repo.filter(|c| c.kind == CategoryKind::Expense).unwrap();
        assert_eq!(expense.len(), 2);

        let changed = repo
            .update_where(|c| c.kind == CategoryKind::Expense, |c| c.sort_order = 9)
            .unwrap();
        assert_eq!(changed, 2);
        assert_eq!(repo.count_where(|c| c.sort_order == 9).unwrap(), 2);
    }
}
