//! Applying a validated export to storage
//!
//! Replace mode swaps every collection (and the settings) for the export's.
//! Merge mode keeps existing data and adds what is new: records whose id is
//! already present are skipped, and categories or tags that match an
//! existing one by name are folded into it.

use std::collections::HashMap;
use std::fmt;

use crate::config::Settings;
use crate::error::{MoneyNoteError, MoneyNoteResult};
use crate::models::{Category, CategoryId, SubcategoryId, TagId};
use crate::services::TagService;
use crate::storage::Storage;

use super::json::{FullExport, RecordCounts};

/// How an export is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImportMode {
    /// Discard current data
    Replace,
    /// Add new records to current data
    #[default]
    Merge,
}

impl fmt::Display for ImportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Replace => write!(f, "replace"),
            Self::Merge => write!(f, "merge"),
        }
    }
}

impl std::str::FromStr for ImportMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "replace" => Ok(Self::Replace),
            "merge" => Ok(Self::Merge),
            other => Err(format!("Unknown import mode '{}' (expected replace or merge)", other)),
        }
    }
}

/// Outcome of applying an export
#[derive(Debug, Clone, Default)]
pub struct ImportSummary {
    pub mode: ImportMode,
    pub added: RecordCounts,
    /// Records already present
    pub skipped: usize,
    /// Categories and tags folded into an existing one of the same name
    pub merged_by_name: usize,
}

impl ImportSummary {
    pub fn summary(&self) -> String {
        let a = &self.added;
        let mut text = format!(
            "{} expenses, {} incomes, {} categories, {} tags, {} budgets, {} recurring, {} templates",
            a.expenses, a.incomes, a.categories, a.tags, a.budgets, a.recurring, a.templates
        );
        if self.mode == ImportMode::Merge {
            text.push_str(&format!(
                "; {} skipped, {} merged by name",
                self.skipped, self.merged_by_name
            ));
        }
        text
    }
}

/// Apply `export` to storage. Replace mode also overwrites `settings` and
/// persists them.
pub fn apply_import(
    storage: &Storage,
    settings: &mut Settings,
    export: FullExport,
    mode: ImportMode,
) -> MoneyNoteResult<ImportSummary> {
    let summary = match mode {
        ImportMode::Replace => replace(storage, settings, export)?,
        ImportMode::Merge => merge(storage, export)?,
    };
    TagService::new(storage).refresh_usage_counts()?;

    tracing::info!(mode = %mode, added = summary.added.total(), skipped = summary.skipped, "applied import");
    Ok(summary)
}

fn replace(
    storage: &Storage,
    settings: &mut Settings,
    export: FullExport,
) -> MoneyNoteResult<ImportSummary> {
    let added = RecordCounts {
        expenses: export.expenses.len(),
        incomes: export.incomes.len(),
        categories: export.categories.len(),
        tags: export.tags.len(),
        budgets: export.budgets.len(),
        recurring: export.recurring.len(),
        templates: export.templates.len(),
    };

    storage.categories.replace_all(export.categories)?;
    storage.tags.replace_all(export.tags)?;
    storage.expenses.replace_all(export.expenses)?;
    storage.incomes.replace_all(export.incomes)?;
    storage.budgets.replace_all(export.budgets)?;
    storage.recurring.replace_all(export.recurring)?;
    storage.templates.replace_all(export.templates)?;
    storage.save_all()?;

    *settings = export.settings;
    settings.save(storage.paths())?;

    Ok(ImportSummary {
        mode: ImportMode::Replace,
        added,
        ..Default::default()
    })
}

/// Incoming ids mapped onto the ids they end up with
#[derive(Default)]
struct IdMap {
    categories: HashMap<CategoryId, CategoryId>,
    subcategories: HashMap<SubcategoryId, SubcategoryId>,
    tags: HashMap<TagId, TagId>,
}

impl IdMap {
    fn category(&self, id: CategoryId) -> CategoryId {
        self.categories.get(&id).copied().unwrap_or(id)
    }

    fn subcategory(&self, id: SubcategoryId) -> SubcategoryId {
        self.subcategories.get(&id).copied().unwrap_or(id)
    }

    fn tags(&self, ids: &[TagId]) -> Vec<TagId> {
        ids.iter()
            .map(|id| self.tags.get(id).copied().unwrap_or(*id))
            .collect()
    }
}

fn merge(storage: &Storage, export: FullExport) -> MoneyNoteResult<ImportSummary> {
    let mut summary = ImportSummary {
        mode: ImportMode::Merge,
        ..Default::default()
    };
    let mut ids = IdMap::default();

    for incoming in export.categories {
        let existing = match storage.categories.get(incoming.id)? {
            Some(category) => Some(category),
            None => storage.categories.get_by_name(&incoming.name, incoming.kind)?,
        };
        match existing {
            Some(mut category) => {
                if category.id != incoming.id {
                    summary.merged_by_name += 1;
                } else {
                    summary.skipped += 1;
                }
                ids.categories.insert(incoming.id, category.id);
                if merge_subcategories(&mut category, &incoming, &mut ids)? {
                    storage.categories.upsert(category)?;
                }
            }
            None => {
                storage.categories.upsert(incoming)?;
                summary.added.categories += 1;
            }
        }
    }

    for incoming in export.tags {
        if storage.tags.contains(incoming.id)? {
            summary.skipped += 1;
        } else if let Some(tag) = storage.tags.get_by_name(&incoming.name)? {
            ids.tags.insert(incoming.id, tag.id);
            summary.merged_by_name += 1;
        } else {
            storage.tags.upsert(incoming)?;
            summary.added.tags += 1;
        }
    }

    for mut expense in export.expenses {
        if storage.expenses.contains(expense.id)? {
            summary.skipped += 1;
            continue;
        }
        expense.category_id = ids.category(expense.category_id);
        expense.subcategory_id = expense.subcategory_id.map(|id| ids.subcategory(id));
        expense.tags = ids.tags(&expense.tags);
        storage.expenses.upsert(expense)?;
        summary.added.expenses += 1;
    }

    for mut income in export.incomes {
        if storage.incomes.contains(income.id)? {
            summary.skipped += 1;
            continue;
        }
        income.category_id = income.category_id.map(|id| ids.category(id));
        storage.incomes.upsert(income)?;
        summary.added.incomes += 1;
    }

    for mut budget in export.budgets {
        if storage.budgets.contains(budget.id)? || storage.budgets.get_by_month(budget.month)?.is_some() {
            summary.skipped += 1;
            continue;
        }
        for entry in &mut budget.categories {
            entry.category_id = ids.category(entry.category_id);
        }
        storage.budgets.upsert(budget)?;
        summary.added.budgets += 1;
    }

    for mut rule in export.recurring {
        if storage.recurring.contains(rule.id)? {
            summary.skipped += 1;
            continue;
        }
        rule.category_id = rule.category_id.map(|id| ids.category(id));
        rule.subcategory_id = rule.subcategory_id.map(|id| ids.subcategory(id));
        rule.tags = ids.tags(&rule.tags);
        storage.recurring.upsert(rule)?;
        summary.added.recurring += 1;
    }

    for mut template in export.templates {
        if storage.templates.contains(template.id)?
            || storage.templates.get_by_name(&template.name)?.is_some()
        {
            summary.skipped += 1;
            continue;
        }
        template.category_id = template.category_id.map(|id| ids.category(id));
        template.subcategory_id = template.subcategory_id.map(|id| ids.subcategory(id));
        template.tags = ids.tags(&template.tags);
        storage.templates.upsert(template)?;
        summary.added.templates += 1;
    }

    storage.save_all()?;
    Ok(summary)
}

/// Map each incoming subcategory onto `target`, adding the missing ones;
/// returns whether `target` changed
fn merge_subcategories(
    target: &mut Category,
    incoming: &Category,
    ids: &mut IdMap,
) -> MoneyNoteResult<bool> {
    let mut changed = false;
    for sub in &incoming.subcategories {
        if target.subcategory(sub.id).is_some() {
            continue;
        }
        if let Some(existing) = target.find_subcategory(&sub.name) {
            ids.subcategories.insert(sub.id, existing.id);
            continue;
        }
        target.add_subcategory(sub.clone()).map_err(|e| {
            MoneyNoteError::Import(format!(
                "Subcategory '{}' of '{}' cannot be merged: {}",
                sub.name, target.name, e
            ))
        })?;
        changed = true;
    }
    Ok(changed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::MoneyNotePaths;
    use crate::models::{Expense, Money, Subcategory, Tag};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = MoneyNotePaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::open(paths).unwrap();
        (temp_dir, storage)
    }

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
    }

    /// An export holding one "Food" category with a "Groceries"
    /// subcategory, one "work" tag and one tagged expense
    fn sample_export() -> FullExport {
        let (_temp, source) = create_test_storage();
        let mut food = Category::new("Food");
        let groceries = Subcategory::new("Groceries");
        let groceries_id = groceries.id;
        food.add_subcategory(groceries).unwrap();
        let work = Tag::new("work");
        source.categories.upsert(food.clone()).unwrap();
        source.tags.upsert(work.clone()).unwrap();

        let mut expense = Expense::new(Money::from_cents(1250), d(5), food.id);
        expense.subcategory_id = Some(groceries_id);
        expense.tags = vec![work.id];
        source.expenses.upsert(expense).unwrap();

        FullExport::from_storage(&source, &Settings::default()).unwrap()
    }

    #[test]
    fn test_replace_overwrites_everything() {
        let (_temp, storage) = create_test_storage();
        storage.categories.upsert(Category::new("Old")).unwrap();
        let mut settings = Settings::default();

        let mut export = sample_export();
        export.settings.currency_symbol = "€".into();
        let summary = apply_import(&storage, &mut settings, export, ImportMode::Replace).unwrap();

        assert_eq!(summary.added.expenses, 1);
        assert_eq!(storage.categories.count().unwrap(), 1);
        assert!(storage.categories.get_by_name("Old", Default::default()).unwrap().is_none());
        assert_eq!(settings.currency_symbol, "€");
        assert_eq!(storage.tags.get_all().unwrap()[0].usage_count, 1);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let (_temp, storage) = create_test_storage();
        let mut settings = Settings::default();
        let export = sample_export();

        let first = apply_import(&storage, &mut settings, export.clone(), ImportMode::Merge).unwrap();
        assert_eq!(first.added.total(), 3);

        let second = apply_import(&storage, &mut settings, export, ImportMode::Merge).unwrap();
        assert_eq!(second.added.total(), 0);
        assert_eq!(second.skipped, 3);
        assert_eq!(storage.expenses.count().unwrap(), 1);
    }

    #[test]
    fn test_merge_folds_same_named_category_and_tag() {
        let (_temp, storage) = create_test_storage();
        let local_food = Category::new("food");
        let local_work = Tag::new("Work");
        storage.categories.upsert(local_food.clone()).unwrap();
        storage.tags.upsert(local_work.clone()).unwrap();

        let mut settings = Settings::default();
        let summary =
            apply_import(&storage, &mut settings, sample_export(), ImportMode::Merge).unwrap();
        assert_eq!(summary.merged_by_name, 2);
        assert_eq!(summary.added.categories, 0);

        let expense = &storage.expenses.get_all().unwrap()[0];
        assert_eq!(expense.category_id, local_food.id);
        assert_eq!(expense.tags, vec![local_work.id]);

        // The subcategory came along with the merge
        let food = storage.categories.get(local_food.id).unwrap().unwrap();
        let sub = food.find_subcategory("Groceries").unwrap();
        assert_eq!(expense.subcategory_id, Some(sub.id));
    }

    #[test]
    fn test_merge_subcategories_maps_or_fails() {
        let mut local = Category::new("Food");
        let local_groceries = Subcategory::new("groceries");
        let local_groceries_id = local_groceries.id;
        local.add_subcategory(local_groceries).unwrap();

        let mut incoming = Category::new("Food");
        let groceries = Subcategory::new("Groceries");
        let groceries_id = groceries.id;
        incoming.subcategories.push(groceries);

        let mut ids = IdMap::default();
        assert!(!merge_subcategories(&mut local, &incoming, &mut ids).unwrap());
        assert_eq!(ids.subcategory(groceries_id), local_groceries_id);

        incoming.subcategories.push(Subcategory::new("   "));
        let err = merge_subcategories(&mut local, &incoming, &mut ids).unwrap_err();
        assert!(err.to_string().contains("cannot be merged"));
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("Replace".parse::<ImportMode>().unwrap(), ImportMode::Replace);
        assert_eq!("merge".parse::<ImportMode>().unwrap(), ImportMode::Merge);
        assert!("append".parse::<ImportMode>().is_err());
    }
}
