//! Tag service
//!
//! Tags are looked up by name (case-insensitive) or id. Usage counts are
//! derived from the expense collection and recomputed after every change
//! that can move them.

use std::collections::HashMap;

use chrono::Utc;

use crate::audit::EntityType;
use crate::error::{MoneyNoteError, MoneyNoteResult};
use crate::models::{Tag, TagId};
use crate::storage::Storage;

/// Field changes for a tag
#[derive(Debug, Clone, Default)]
pub struct TagUpdate {
    pub name: Option<String>,
    pub color: Option<String>,
    /// `Some(None)` clears the icon
    pub icon: Option<Option<String>>,
}

/// Service for tag management
pub struct TagService<'a> {
    storage: &'a Storage,
}

impl<'a> TagService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub fn create(
        &self,
        name: &str,
        color: Option<&str>,
        icon: Option<&str>,
    ) -> MoneyNoteResult<Tag> {
        let name = name.trim();
        if self.storage.tags.get_by_name(name)?.is_some() {
            return Err(MoneyNoteError::Duplicate {
                entity_type: "Tag",
                identifier: name.to_string(),
            });
        }

        let mut tag = Tag::new(name);
        if let Some(color) = color {
            tag.color = color.trim().to_string();
        }
        tag.icon = icon.map(|i| i.trim().to_string()).filter(|i| !i.is_empty());
        tag.validate()
            .map_err(|e| MoneyNoteError::Validation(e.to_string()))?;

        self.storage.tags.upsert(tag.clone())?;
        self.storage.tags.save()?;
        self.storage
            .log_create(EntityType::Tag, tag.id.to_string(), Some(tag.name.clone()), &tag)?;

        Ok(tag)
    }

    pub fn get(&self, id: TagId) -> MoneyNoteResult<Option<Tag>> {
        self.storage.tags.get(id)
    }

    /// Find a tag by name or id
    pub fn find(&self, identifier: &str) -> MoneyNoteResult<Option<Tag>> {
        if let Some(tag) = self.storage.tags.get_by_name(identifier)? {
            return Ok(Some(tag));
        }
        self.storage.tags.resolve(identifier)
    }

    pub fn list(&self) -> MoneyNoteResult<Vec<Tag>> {
        self.storage.tags.get_all()
    }

    /// Resolve tag names to ids, creating tags that don't exist yet when
    /// `create_missing` is set
    pub fn resolve_names(
        &self,
        names: &[String],
        create_missing: bool,
    ) -> MoneyNoteResult<Vec<TagId>> {
        let mut ids = Vec::with_capacity(names.len());
        for name in names.iter().map(|n| n.trim()).filter(|n| !n.is_empty()) {
            let id = match self.find(name)? {
                Some(tag) => tag.id,
                None if create_missing => self.create(name, None, None)?.id,
                None => return Err(MoneyNoteError::tag_not_found(name)),
            };
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        Ok(ids)
    }

    pub fn update(&self, id: TagId, update: TagUpdate) -> MoneyNoteResult<Option<Tag>> {
        let Some(before) = self.storage.tags.get(id)? else {
            tracing::warn!(%id, "update skipped: tag not found");
            return Ok(None);
        };
        let mut tag = before.clone();

        if let Some(name) = update.name {
            let name = name.trim();
            if let Some(existing) = self.storage.tags.get_by_name(name)? {
                if existing.id != id {
                    return Err(MoneyNoteError::Duplicate {
                        entity_type: "Tag",
                        identifier: name.to_string(),
                    });
                }
            }
            tag.name = name.to_string();
        }
        if let Some(color) = update.color {
            tag.color = color.trim().to_string();
        }
        if let Some(icon) = update.icon {
            tag.icon = icon.map(|i| i.trim().to_string()).filter(|i| !i.is_empty());
        }
        tag.validate()
            .map_err(|e| MoneyNoteError::Validation(e.to_string()))?;
        tag.updated_at = Utc::now();

        self.storage.tags.upsert(tag.clone())?;
        self.storage.tags.save()?;
        self.storage.log_update(
            EntityType::Tag,
            tag.id.to_string(),
            Some(tag.name.clone()),
            &before,
            &tag,
        )?;

        Ok(Some(tag))
    }

    /// Delete a tag and strip it from every expense, recurring rule and
    /// template carrying it
    pub fn delete(&self, id: TagId) -> MoneyNoteResult<bool> {
        let Some(tag) = self.storage.tags.delete(id)? else {
            tracing::warn!(%id, "delete skipped: tag not found");
            return Ok(false);
        };

        let expenses = self
            .storage
            .expenses
            .update_where(|e| e.has_tag(id), |e| e.tags.retain(|t| *t != id))?;
        let rules = self
            .storage
            .recurring
            .update_where(|r| r.tags.contains(&id), |r| r.tags.retain(|t| *t != id))?;
        let templates = self
            .storage
            .templates
            .update_where(|t| t.tags.contains(&id), |t| t.tags.retain(|x| *x != id))?;

        self.storage.tags.save()?;
        if expenses > 0 {
            self.storage.expenses.save()?;
        }
        if rules > 0 {
            self.storage.recurring.save()?;
        }
        if templates > 0 {
            self.storage.templates.save()?;
        }

        self.storage
            .log_delete(EntityType::Tag, tag.id.to_string(), Some(tag.name.clone()), &tag)?;
        tracing::debug!(tag = %tag.name, expenses, rules, templates, "tag removed from records");

        Ok(true)
    }

    /// Recompute every tag's usage count from the expenses; saves only when
    /// a count changed
    pub fn refresh_usage_counts(&self) -> MoneyNoteResult<()> {
        let mut counts: HashMap<TagId, u32> = HashMap::new();
        for expense in self.storage.expenses.get_all()? {
            for tag_id in expense.tags {
                *counts.entry(tag_id).or_insert(0) += 1;
            }
        }

        let changed = self.storage.tags.update_where(
            |t| t.usage_count != counts.get(&t.id).copied().unwrap_or(0),
            |t| t.usage_count = counts.get(&t.id).copied().unwrap_or(0),
        )?;
        if changed > 0 {
            self.storage.tags.save()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::MoneyNotePaths;
    use crate::models::{Category, Expense, Money};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = MoneyNotePaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::open(paths).unwrap();
        (temp_dir, storage)
    }

    #[test]
    fn test_create_and_find() {
        let (_temp, storage) = create_test_storage();
        let service = TagService::new(&storage);

        let tag = service.create("Vacation", Some("#00AA00"), Some("🏖")).unwrap();
        assert_eq!(service.find("vacation").unwrap().unwrap().id, tag.id);
        assert_eq!(service.find(&tag.id.to_string()).unwrap().unwrap().id, tag.id);

        let dup = service.create("VACATION", None, None).unwrap_err();
        assert!(matches!(dup, MoneyNoteError::Duplicate { .. }));
        assert!(service.create("bad", Some("green"), None).unwrap_err().is_validation());
    }

    #[test]
    fn test_resolve_names() {
        let (_temp, storage) = create_test_storage();
        let service = TagService::new(&storage);
        let work = service.create("work", None, None).unwrap();

        let ids = service
            .resolve_names(&["Work".into(), "travel".into(), "work".into()], true)
            .unwrap();
        assert_eq!(ids.len(), 2);
        assert_eq!(ids[0], work.id);
        assert_eq!(storage.tags.count().unwrap(), 2);

        assert!(service
            .resolve_names(&["unknown".into()], false)
            .unwrap_err()
            .is_not_found());
    }

    #[test]
    fn test_delete_strips_tag_from_expenses() {
        let (_temp, storage) = create_test_storage();
        let service = TagService::new(&storage);
        let tag = service.create("work", None, None).unwrap();

        let mut expense = Expense::new(
            Money::from_cents(100),
            NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
            Category::new("Food").id,
        );
        expense.tags.push(tag.id);
        storage.expenses.upsert(expense.clone()).unwrap();

        assert!(service.delete(tag.id).unwrap());
        assert!(storage.expenses.get(expense.id).unwrap().unwrap().tags.is_empty());
        assert!(!service.delete(tag.id).unwrap());
    }

    #[test]
    fn test_usage_counts_match_expenses() {
        let (_temp, storage) = create_test_storage();
        let service = TagService::new(&storage);
        let a = service.create("a", None, None).unwrap();
        let b = service.create("b", None, None).unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let category = Category::new("Food").id;

        for tags in [vec![a.id], vec![a.id, b.id], vec![]] {
            let mut expense = Expense::new(Money::from_cents(100), date, category);
            expense.tags = tags;
            storage.expenses.upsert(expense).unwrap();
        }
        service.refresh_usage_counts().unwrap();

        assert_eq!(service.get(a.id).unwrap().unwrap().usage_count, 2);
        assert_eq!(service.get(b.id).unwrap().unwrap().usage_count, 1);
    }

    #[test]
    fn test_update_rename_conflict() {
        let (_temp, storage) = create_test_storage();
        let service = TagService::new(&storage);
        service.create("home", None, None).unwrap();
        let work = service.create("work", None, None).unwrap();

        let err = service
            .update(
                work.id,
                TagUpdate {
                    name: Some("Home".into()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, MoneyNoteError::Duplicate { .. }));

        let renamed = service
            .update(
                work.id,
                TagUpdate {
                    name: Some("office".into()),
                    icon: Some(Some("🏢".into())),
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();
        assert_eq!(renamed.name, "office");
        assert!(service.update(TagId::new(), TagUpdate::default()).unwrap().is_none());
    }
}
