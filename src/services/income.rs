//! Income service
//!
//! CRUD and filtering for incomes. The category is optional but must be an
//! income category when given.

use chrono::{NaiveDate, Utc};

use crate::audit::EntityType;
use crate::error::{MoneyNoteError, MoneyNoteResult};
use crate::models::{CategoryId, CategoryKind, Income, IncomeId, Money, Month};
use crate::storage::Storage;

/// Options for filtering incomes
#[derive(Debug, Clone, Default)]
pub struct IncomeFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub category_id: Option<CategoryId>,
    /// Case-insensitive match against source and description
    pub text: Option<String>,
    pub limit: Option<usize>,
}

impl IncomeFilter {
    pub fn month(month: Month) -> Self {
        Self {
            start_date: Some(month.start_date()),
            end_date: Some(month.end_date()),
            ..Default::default()
        }
    }

    pub fn matches(&self, income: &Income) -> bool {
        if self.start_date.is_some_and(|start| income.date < start)
            || self.end_date.is_some_and(|end| income.date > end)
            || self
                .category_id
                .is_some_and(|id| income.category_id != Some(id))
        {
            return false;
        }
        match self.text.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => {
                let needle = text.to_lowercase();
                income.source.to_lowercase().contains(&needle)
                    || income.description.to_lowercase().contains(&needle)
            }
            _ => true,
        }
    }
}

/// Field changes for an income
#[derive(Debug, Clone, Default)]
pub struct IncomeUpdate {
    pub amount: Option<Money>,
    pub date: Option<NaiveDate>,
    pub source: Option<String>,
    pub description: Option<String>,
    /// `Some(None)` clears the category
    pub category_id: Option<Option<CategoryId>>,
}

/// Service for income management
pub struct IncomeService<'a> {
    storage: &'a Storage,
}

impl<'a> IncomeService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub fn create(
        &self,
        amount: Money,
        date: NaiveDate,
        source: &str,
        description: &str,
        category_id: Option<CategoryId>,
    ) -> MoneyNoteResult<Income> {
        let mut income = Income::new(amount, date, source.trim());
        income.description = description.trim().to_string();
        income.category_id = category_id;
        self.insert(income)
    }

    /// Validate and store a fully built income (recurring runs, templates)
    pub fn insert(&self, income: Income) -> MoneyNoteResult<Income> {
        self.check(&income)?;
        self.storage.incomes.upsert(income.clone())?;
        self.storage.incomes.save()?;
        self.storage.log_create(
            EntityType::Income,
            income.id.to_string(),
            Some(income.source.clone()),
            &income,
        )?;
        Ok(income)
    }

    pub fn get(&self, id: IncomeId) -> MoneyNoteResult<Option<Income>> {
        self.storage.incomes.get(id)
    }

    pub fn find(&self, identifier: &str) -> MoneyNoteResult<Option<Income>> {
        self.storage.incomes.resolve(identifier)
    }

    /// Incomes matching a filter, newest first
    pub fn list(&self, filter: &IncomeFilter) -> MoneyNoteResult<Vec<Income>> {
        let mut incomes = self.storage.incomes.filter(|i| filter.matches(i))?;
        if let Some(limit) = filter.limit {
            incomes.truncate(limit);
        }
        Ok(incomes)
    }

    pub fn update(&self, id: IncomeId, update: IncomeUpdate) -> MoneyNoteResult<Option<Income>> {
        let Some(before) = self.storage.incomes.get(id)? else {
            tracing::warn!(%id, "update skipped: income not found");
            return Ok(None);
        };
        let mut income = before.clone();

        if let Some(amount) = update.amount {
            income.amount = amount;
        }
        if let Some(date) = update.date {
            income.date = date;
        }
        if let Some(source) = update.source {
            income.source = source.trim().to_string();
        }
        if let Some(description) = update.description {
            income.description = description.trim().to_string();
        }
        if let Some(category_id) = update.category_id {
            income.category_id = category_id;
        }
        income.updated_at = Utc::now();

        self.check(&income)?;
        self.storage.incomes.upsert(income.clone())?;
        self.storage.incomes.save()?;
        self.storage.log_update(
            EntityType::Income,
            income.id.to_string(),
            Some(income.source.clone()),
            &before,
            &income,
        )?;

        Ok(Some(income))
    }

    pub fn delete(&self, id: IncomeId) -> MoneyNoteResult<bool> {
        let Some(income) = self.storage.incomes.delete(id)? else {
            tracing::warn!(%id, "delete skipped: income not found");
            return Ok(false);
        };
        self.storage.incomes.save()?;
        self.storage.log_delete(
            EntityType::Income,
            income.id.to_string(),
            Some(income.source.clone()),
            &income,
        )?;
        Ok(true)
    }

    pub fn total_between(&self, start: NaiveDate, end: NaiveDate) -> MoneyNoteResult<Money> {
        Ok(self
            .storage
            .incomes
            .get_by_date_range(start, end)?
            .iter()
            .map(|i| i.amount)
            .sum())
    }

    fn check(&self, income: &Income) -> MoneyNoteResult<()> {
        income
            .validate()
            .map_err(|e| MoneyNoteError::Validation(e.to_string()))?;

        if let Some(category_id) = income.category_id {
            let category = self
                .storage
                .categories
                .get(category_id)?
                .ok_or_else(|| MoneyNoteError::category_not_found(category_id.to_string()))?;
            if category.kind != CategoryKind::Income {
                return Err(MoneyNoteError::Validation(format!(
                    "category: '{}' is an expense category",
                    category.name
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::MoneyNotePaths;
    use crate::models::Category;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = MoneyNotePaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::open(paths).unwrap();
        (temp_dir, storage)
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_create_and_list() {
        let (_temp, storage) = create_test_storage();
        let salary = Category::with_kind("Salary", CategoryKind::Income);
        storage.categories.upsert(salary.clone()).unwrap();
        let service = IncomeService::new(&storage);

        service
            .create(Money::from_cents(300000), d(2025, 1, 31), " Acme ", "January", Some(salary.id))
            .unwrap();
        service
            .create(Money::from_cents(50000), d(2025, 2, 3), "Client", "Logo design", None)
            .unwrap();

        let january = service.list(&IncomeFilter::month(Month::new(2025, 1).unwrap())).unwrap();
        assert_eq!(january.len(), 1);
        assert_eq!(january[0].source, "Acme");

        let searched = service
            .list(&IncomeFilter {
                text: Some("logo".into()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(searched[0].source, "Client");
        assert_eq!(
            service.total_between(d(2025, 1, 1), d(2025, 12, 31)).unwrap().cents(),
            350000
        );
    }

    #[test]
    fn test_rejects_expense_category() {
        let (_temp, storage) = create_test_storage();
        let food = Category::new("Food");
        storage.categories.upsert(food.clone()).unwrap();
        let service = IncomeService::new(&storage);

        let err = service
            .create(Money::from_cents(100), d(2025, 1, 1), "Acme", "", Some(food.id))
            .unwrap_err();
        assert!(err.is_validation());
        assert!(service
            .create(Money::from_cents(100), d(2025, 1, 1), "", "", None)
            .unwrap_err()
            .is_validation());
    }

    #[test]
    fn test_update_and_delete() {
        let (_temp, storage) = create_test_storage();
        let service = IncomeService::new(&storage);
        let income = service
            .create(Money::from_cents(1000), d(2025, 1, 1), "Acme", "", None)
            .unwrap();

        let updated = service
            .update(
                income.id,
                IncomeUpdate {
                    amount: Some(Money::from_cents(1500)),
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();
        assert_eq!(updated.amount.cents(), 1500);

        assert!(service.update(IncomeId::new(), IncomeUpdate::default()).unwrap().is_none());
        assert!(!service.delete(IncomeId::new()).unwrap());
        assert_eq!(storage.incomes.count().unwrap(), 1);
        assert!(service.delete(income.id).unwrap());
        assert_eq!(storage.incomes.count().unwrap(), 0);
    }
}
