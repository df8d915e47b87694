//! Category service
//!
//! Provides business logic for categories and their nested subcategories:
//! CRUD, name lookups, usage counts and deletion with reassignment.

use chrono::Utc;

use crate::audit::EntityType;
use crate::error::{MoneyNoteError, MoneyNoteResult};
use crate::models::{Category, CategoryId, CategoryKind, Subcategory, SubcategoryId};
use crate::storage::{Storage, FALLBACK_CATEGORY};

/// Field changes for a category
#[derive(Debug, Clone, Default)]
pub struct CategoryUpdate {
    pub name: Option<String>,
    pub color: Option<String>,
    pub icon: Option<String>,
    pub sort_order: Option<i32>,
}

/// How many records point at a category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CategoryUsage {
    pub expenses: usize,
    pub incomes: usize,
    pub recurring: usize,
    pub templates: usize,
    pub budgets: usize,
}

impl CategoryUsage {
    /// Records that block a plain delete (budget entries are just dropped)
    pub fn blocking(&self) -> usize {
        self.expenses + self.incomes + self.recurring
    }
}

/// Service for category management
pub struct CategoryService<'a> {
    storage: &'a Storage,
}

impl<'a> CategoryService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Create a new category at the end of its kind's sort order
    pub fn create(
        &self,
        name: &str,
        kind: CategoryKind,
        color: Option<&str>,
        icon: Option<&str>,
    ) -> MoneyNoteResult<Category> {
        let name = name.trim();
        if self.storage.categories.get_by_name(name, kind)?.is_some() {
            return Err(MoneyNoteError::Duplicate {
                entity_type: "Category",
                identifier: name.to_string(),
            });
        }

        let mut category = Category::with_kind(name, kind);
        category.sort_order = self.storage.categories.max_sort_order(kind)? + 1;
        if let Some(color) = color {
            category.color = color.trim().to_string();
        }
        if let Some(icon) = icon {
            category.icon = icon.trim().to_string();
        }
        category
            .validate()
            .map_err(|e| MoneyNoteError::Validation(e.to_string()))?;

        self.storage.categories.upsert(category.clone())?;
        self.storage.categories.save()?;
        self.storage.log_create(
            EntityType::Category,
            category.id.to_string(),
            Some(category.name.clone()),
            &category,
        )?;

        Ok(category)
    }

    pub fn get(&self, id: CategoryId) -> MoneyNoteResult<Option<Category>> {
        self.storage.categories.get(id)
    }

    /// Find a category by name or id. With no kind, expense categories win
    /// over income categories of the same name.
    pub fn find(
        &self,
        identifier: &str,
        kind: Option<CategoryKind>,
    ) -> MoneyNoteResult<Option<Category>> {
        let kinds: &[CategoryKind] = match kind {
            Some(CategoryKind::Expense) => &[CategoryKind::Expense],
            Some(CategoryKind::Income) => &[CategoryKind::Income],
            None => &[CategoryKind::Expense, CategoryKind::Income],
        };
        for kind in kinds {
            if let Some(category) = self.storage.categories.get_by_name(identifier, *kind)? {
                return Ok(Some(category));
            }
        }

        Ok(self
            .storage
            .categories
            .resolve(identifier)?
            .filter(|c| kinds.contains(&c.kind)))
    }

    /// Find a category or fail with a not-found error
    pub fn require(&self, identifier: &str, kind: Option<CategoryKind>) -> MoneyNoteResult<Category> {
        self.find(identifier, kind)?
            .ok_or_else(|| MoneyNoteError::category_not_found(identifier))
    }

    pub fn list(&self) -> MoneyNoteResult<Vec<Category>> {
        self.storage.categories.get_all()
    }

    pub fn list_by_kind(&self, kind: CategoryKind) -> MoneyNoteResult<Vec<Category>> {
        self.storage.categories.get_by_kind(kind)
    }

    pub fn usage(&self, id: CategoryId) -> MoneyNoteResult<CategoryUsage> {
        Ok(CategoryUsage {
            expenses: self.storage.expenses.count_by_category(id)?,
            incomes: self.storage.incomes.count_by_category(id)?,
            recurring: self.storage.recurring.count_by_category(id)?,
            templates: self
                .storage
                .templates
                .count_where(|t| t.category_id == Some(id))?,
            budgets: self.storage.budgets.count_by_category(id)?,
        })
    }

    pub fn update(
        &self,
        id: CategoryId,
        update: CategoryUpdate,
    ) -> MoneyNoteResult<Option<Category>> {
        let Some(before) = self.storage.categories.get(id)? else {
            tracing::warn!(%id, "update skipped: category not found");
            return Ok(None);
        };
        let mut category = before.clone();

        if let Some(name) = update.name {
            let name = name.trim();
            if let Some(existing) = self.storage.categories.get_by_name(name, category.kind)? {
                if existing.id != id {
                    return Err(MoneyNoteError::Duplicate {
                        entity_type: "Category",
                        identifier: name.to_string(),
                    });
                }
            }
            category.name = name.to_string();
        }
        if let Some(color) = update.color {
            category.color = color.trim().to_string();
        }
        if let Some(icon) = update.icon {
            category.icon = icon.trim().to_string();
        }
        if let Some(order) = update.sort_order {
            category.sort_order = order;
        }

        category.updated_at = Utc::now();
        category
            .validate()
            .map_err(|e| MoneyNoteError::Validation(e.to_string()))?;

        self.save_updated(&before, &category)?;
        Ok(Some(category))
    }

    /// Delete a category.
    ///
    /// Refused while expenses, incomes or recurring rules use it, unless
    /// `force` is set: then those records move to the "Other" category of
    /// the same kind. Budget entries for the category are dropped, and
    /// templates lose their category.
    pub fn delete(&self, id: CategoryId, force: bool) -> MoneyNoteResult<bool> {
        let Some(category) = self.storage.categories.get(id)? else {
            tracing::warn!(%id, "delete skipped: category not found");
            return Ok(false);
        };

        let usage = self.usage(id)?;
        if usage.blocking() > 0 {
            if !force {
                return Err(MoneyNoteError::InUse {
                    entity_type: "Category",
                    identifier: category.name.clone(),
                    count: usage.blocking(),
                });
            }
            if category.name.eq_ignore_ascii_case(FALLBACK_CATEGORY) {
                return Err(MoneyNoteError::Validation(format!(
                    "'{}' receives reassigned records and cannot be force-deleted while in use",
                    FALLBACK_CATEGORY
                )));
            }
            let fallback = self.fallback_category(category.kind)?;
            self.reassign(id, fallback.id)?;
        }

        if usage.budgets > 0 {
            self.storage
                .budgets
                .update_where(|b| b.category_amount(id).is_some(), |b| {
                    b.remove_category(id);
                })?;
            self.storage.budgets.save()?;
        }
        if usage.templates > 0 {
            self.storage
                .templates
                .update_where(|t| t.category_id == Some(id), |t| {
                    t.category_id = None;
                    t.subcategory_id = None;
                })?;
            self.storage.templates.save()?;
        }

        self.storage.categories.delete(id)?;
        self.storage.categories.save()?;
        self.storage.log_delete(
            EntityType::Category,
            category.id.to_string(),
            Some(category.name.clone()),
            &category,
        )?;

        Ok(true)
    }

    /// The "Other" category of a kind, created when it doesn't exist
    pub fn fallback_category(&self, kind: CategoryKind) -> MoneyNoteResult<Category> {
        match self.storage.categories.get_by_name(FALLBACK_CATEGORY, kind)? {
            Some(category) => Ok(category),
            None => self.create(FALLBACK_CATEGORY, kind, None, Some("📦")),
        }
    }

    /// Move every record from one category to another; subcategories are
    /// cleared since they belong to the old category
    fn reassign(&self, from: CategoryId, to: CategoryId) -> MoneyNoteResult<()> {
        let expenses = self
            .storage
            .expenses
            .update_where(|e| e.category_id == from, |e| {
                e.category_id = to;
                e.subcategory_id = None;
                e.updated_at = Utc::now();
            })?;
        let incomes = self
            .storage
            .incomes
            .update_where(|i| i.category_id == Some(from), |i| {
                i.category_id = Some(to);
                i.updated_at = Utc::now();
            })?;
        let rules = self
            .storage
            .recurring
            .update_where(|r| r.category_id == Some(from), |r| {
                r.category_id = Some(to);
                r.subcategory_id = None;
                r.updated_at = Utc::now();
            })?;

        self.storage.expenses.save()?;
        self.storage.incomes.save()?;
        self.storage.recurring.save()?;

        tracing::info!(%from, %to, expenses, incomes, rules, "records reassigned");
        Ok(())
    }

    // === Subcategories ===

    pub fn add_subcategory(
        &self,
        category_id: CategoryId,
        name: &str,
        color: Option<&str>,
        icon: Option<&str>,
    ) -> MoneyNoteResult<(Category, Subcategory)> {
        let before = self
            .storage
            .categories
            .get(category_id)?
            .ok_or_else(|| MoneyNoteError::category_not_found(category_id.to_string()))?;
        let mut category = before.clone();

        let mut subcategory = Subcategory::new(name.trim());
        subcategory.color = color.map(|c| c.trim().to_string());
        subcategory.icon = icon.map(|i| i.trim().to_string()).filter(|i| !i.is_empty());
        category
            .add_subcategory(subcategory.clone())
            .map_err(|e| MoneyNoteError::Validation(e.to_string()))?;
        category
            .validate()
            .map_err(|e| MoneyNoteError::Validation(e.to_string()))?;

        self.save_updated(&before, &category)?;
        Ok((category, subcategory))
    }

    /// Remove a subcategory. Refused while expenses use it unless `force`
    /// is set, which clears the subcategory on those records.
    pub fn remove_subcategory(
        &self,
        category_id: CategoryId,
        subcategory_id: SubcategoryId,
        force: bool,
    ) -> MoneyNoteResult<bool> {
        let Some(before) = self.storage.categories.get(category_id)? else {
            tracing::warn!(%category_id, "subcategory removal skipped: category not found");
            return Ok(false);
        };
        let mut category = before.clone();
        let Some(subcategory) = category.remove_subcategory(subcategory_id) else {
            tracing::warn!(%subcategory_id, "subcategory removal skipped: not found");
            return Ok(false);
        };

        let in_use = self.storage.expenses.count_by_subcategory(subcategory_id)?
            + self
                .storage
                .recurring
                .count_where(|r| r.subcategory_id == Some(subcategory_id))?;
        if in_use > 0 {
            if !force {
                return Err(MoneyNoteError::InUse {
                    entity_type: "Subcategory",
                    identifier: subcategory.name,
                    count: in_use,
                });
            }
            self.storage
                .expenses
                .update_where(|e| e.subcategory_id == Some(subcategory_id), |e| {
                    e.subcategory_id = None;
                })?;
            self.storage
                .recurring
                .update_where(|r| r.subcategory_id == Some(subcategory_id), |r| {
                    r.subcategory_id = None;
                })?;
            self.storage.expenses.save()?;
            self.storage.recurring.save()?;
        }
        self.storage
            .templates
            .update_where(|t| t.subcategory_id == Some(subcategory_id), |t| {
                t.subcategory_id = None;
            })?;
        self.storage.templates.save()?;

        self.save_updated(&before, &category)?;
        Ok(true)
    }

    fn save_updated(&self, before: &Category, after: &Category) -> MoneyNoteResult<()> {
        self.storage.categories.upsert(after.clone())?;
        self.storage.categories.save()?;
        self.storage.log_update(
            EntityType::Category,
            after.id.to_string(),
            Some(after.name.clone()),
            before,
            after,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::MoneyNotePaths;
    use crate::models::{Budget, Expense, Income, Money, Month};
    use crate::storage::initialize_storage;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = MoneyNotePaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::open(paths).unwrap();
        (temp_dir, storage)
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 10).unwrap()
    }

    #[test]
    fn test_create_category() {
        let (_temp, storage) = create_test_storage();
        let service = CategoryService::new(&storage);

        let food = service
            .create("Food", CategoryKind::Expense, Some("#FF5722"), Some("🍔"))
            .unwrap();
        let transport = service.create("Transport", CategoryKind::Expense, None, None).unwrap();
        assert_eq!(food.sort_order, 0);
        assert_eq!(transport.sort_order, 1);

        let dup = service.create("food", CategoryKind::Expense, None, None);
        assert!(matches!(dup, Err(MoneyNoteError::Duplicate { .. })));

        // Same name is fine for the other kind
        assert!(service.create("Food", CategoryKind::Income, None, None).is_ok());
        assert!(service
            .create("Bad", CategoryKind::Expense, Some("blue"), None)
            .unwrap_err()
            .is_validation());
    }

    #[test]
    fn test_find_prefers_expense_kind() {
        let (_temp, storage) = create_test_storage();
        let service = CategoryService::new(&storage);
        let expense = service.create("Other", CategoryKind::Expense, None, None).unwrap();
        let income = service.create("Other", CategoryKind::Income, None, None).unwrap();

        assert_eq!(service.find("other", None).unwrap().unwrap().id, expense.id);
        assert_eq!(
            service.find("other", Some(CategoryKind::Income)).unwrap().unwrap().id,
            income.id
        );
        assert_eq!(
            service.find(&income.id.to_string(), None).unwrap().unwrap().id,
            income.id
        );
        assert!(service
            .find(&income.id.to_string(), Some(CategoryKind::Expense))
            .unwrap()
            .is_none());
        assert!(service.require("nothing", None).unwrap_err().is_not_found());
    }

    #[test]
    fn test_delete_in_use_requires_force() {
        let (temp, storage) = create_test_storage();
        initialize_storage(&MoneyNotePaths::with_base_dir(temp.path().to_path_buf())).unwrap();
        storage.categories.load().unwrap();
        let service = CategoryService::new(&storage);

        let coffee = service.create("Coffee", CategoryKind::Expense, None, None).unwrap();
        let expense = Expense::new(Money::from_cents(350), date(), coffee.id);
        storage.expenses.upsert(expense.clone()).unwrap();

        let mut budget = Budget::new(Month::new(2025, 1).unwrap());
        budget.set_category(coffee.id, Money::from_cents(5000));
        storage.budgets.upsert(budget.clone()).unwrap();

        let err = service.delete(coffee.id, false).unwrap_err();
        assert!(matches!(err, MoneyNoteError::InUse { count: 1, .. }));
        assert!(storage.categories.contains(coffee.id).unwrap());

        assert!(service.delete(coffee.id, true).unwrap());
        let other = service
            .find(FALLBACK_CATEGORY, Some(CategoryKind::Expense))
            .unwrap()
            .unwrap();
        let moved = storage.expenses.get(expense.id).unwrap().unwrap();
        assert_eq!(moved.category_id, other.id);
        assert!(storage
            .budgets
            .get(budget.id)
            .unwrap()
            .unwrap()
            .categories
            .is_empty());
    }

    #[test]
    fn test_force_delete_creates_missing_fallback() {
        let (_temp, storage) = create_test_storage();
        let service = CategoryService::new(&storage);
        let bonus = service.create("Bonus", CategoryKind::Income, None, None).unwrap();

        let mut income = Income::new(Money::from_cents(1000), date(), "Acme");
        income.category_id = Some(bonus.id);
        storage.incomes.upsert(income.clone()).unwrap();

        assert!(service.delete(bonus.id, true).unwrap());
        let fallback = service.fallback_category(CategoryKind::Income).unwrap();
        assert_eq!(
            storage.incomes.get(income.id).unwrap().unwrap().category_id,
            Some(fallback.id)
        );
    }

    #[test]
    fn test_delete_missing_is_noop() {
        let (_temp, storage) = create_test_storage();
        let service = CategoryService::new(&storage);
        service.create("Food", CategoryKind::Expense, None, None).unwrap();

        assert!(!service.delete(CategoryId::new(), false).unwrap());
        assert_eq!(storage.categories.count().unwrap(), 1);
    }

    #[test]
    fn test_subcategory_lifecycle() {
        let (_temp, storage) = create_test_storage();
        let service = CategoryService::new(&storage);
        let food = service.create("Food", CategoryKind::Expense, None, None).unwrap();

        let (_, groceries) = service
            .add_subcategory(food.id, "Groceries", None, Some("🛒"))
            .unwrap();
        assert!(service
            .add_subcategory(food.id, "groceries", None, None)
            .unwrap_err()
            .is_validation());

        let mut expense = Expense::new(Money::from_cents(100), date(), food.id);
        expense.subcategory_id = Some(groceries.id);
        storage.expenses.upsert(expense.clone()).unwrap();

        assert!(matches!(
            service.remove_subcategory(food.id, groceries.id, false),
            Err(MoneyNoteError::InUse { .. })
        ));
        assert!(service.remove_subcategory(food.id, groceries.id, true).unwrap());
        assert!(storage
            .expenses
            .get(expense.id)
            .unwrap()
            .unwrap()
            .subcategory_id
            .is_none());
        assert!(service.get(food.id).unwrap().unwrap().subcategories.is_empty());
        assert!(!service.remove_subcategory(food.id, groceries.id, false).unwrap());
    }

    #[test]
    fn test_update_category() {
        let (_temp, storage) = create_test_storage();
        let service = CategoryService::new(&storage);
        service.create("Food", CategoryKind::Expense, None, None).unwrap();
        let fun = service.create("Fun", CategoryKind::Expense, None, None).unwrap();

        assert!(matches!(
            service.update(
                fun.id,
                CategoryUpdate {
                    name: Some("FOOD".into()),
                    ..Default::default()
                }
            ),
            Err(MoneyNoteError::Duplicate { .. })
        ));

        let updated = service
            .update(
                fun.id,
                CategoryUpdate {
                    name: Some("Entertainment".into()),
                    color: Some("#9C27B0".into()),
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();
        assert_eq!(updated.name, "Entertainment");
        assert_eq!(updated.color, "#9C27B0");
        assert!(service
            .update(CategoryId::new(), CategoryUpdate::default())
            .unwrap()
            .is_none());
    }
}
