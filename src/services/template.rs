//! Template service
//!
//! Templates are saved partial records for quick entry. Applying one creates
//! an expense or income and bumps the template's usage count.

use chrono::{NaiveDate, Utc};

use crate::audit::EntityType;
use crate::error::{MoneyNoteError, MoneyNoteResult};
use crate::models::{
    CategoryId, CategoryKind, Money, PaymentMethod, SubcategoryId, TagId, Template, TemplateId,
    TransactionKind,
};
use crate::storage::Storage;

use super::expense::ExpenseService;
use super::income::IncomeService;
use super::recurring::GeneratedRecord;

/// Input for creating a template
#[derive(Debug, Clone, Default)]
pub struct CreateTemplateInput {
    pub name: String,
    pub kind: TransactionKind,
    pub amount: Option<Money>,
    pub category_id: Option<CategoryId>,
    pub subcategory_id: Option<SubcategoryId>,
    pub description: String,
    pub payment_method: PaymentMethod,
    pub source: String,
    pub tags: Vec<TagId>,
    pub is_fixed: bool,
}

/// Service for quick-entry templates
pub struct TemplateService<'a> {
    storage: &'a Storage,
}

impl<'a> TemplateService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub fn create(&self, input: CreateTemplateInput) -> MoneyNoteResult<Template> {
        let name = input.name.trim();
        if self.storage.templates.get_by_name(name)?.is_some() {
            return Err(MoneyNoteError::Duplicate {
                entity_type: "Template",
                identifier: name.to_string(),
            });
        }

        let mut template = Template::new(name, input.kind);
        template.amount = input.amount;
        template.category_id = input.category_id;
        template.subcategory_id = input.subcategory_id;
        template.description = input.description.trim().to_string();
        template.payment_method = input.payment_method;
        template.source = input.source.trim().to_string();
        template.tags = input.tags;
        template.is_fixed = input.is_fixed;

        self.check(&template)?;
        self.storage.templates.upsert(template.clone())?;
        self.storage.templates.save()?;
        self.storage.log_create(
            EntityType::Template,
            template.id.to_string(),
            Some(template.name.clone()),
            &template,
        )?;

        Ok(template)
    }

    pub fn get(&self, id: TemplateId) -> MoneyNoteResult<Option<Template>> {
        self.storage.templates.get(id)
    }

    /// Find a template by name or id
    pub fn find(&self, identifier: &str) -> MoneyNoteResult<Option<Template>> {
        if let Some(template) = self.storage.templates.get_by_name(identifier)? {
            return Ok(Some(template));
        }
        self.storage.templates.resolve(identifier)
    }

    /// Templates, most used first
    pub fn list(&self) -> MoneyNoteResult<Vec<Template>> {
        self.storage.templates.get_all()
    }

    pub fn delete(&self, id: TemplateId) -> MoneyNoteResult<bool> {
        let Some(template) = self.storage.templates.delete(id)? else {
            tracing::warn!(%id, "delete skipped: template not found");
            return Ok(false);
        };
        self.storage.templates.save()?;
        self.storage.log_delete(
            EntityType::Template,
            template.id.to_string(),
            Some(template.name.clone()),
            &template,
        )?;
        Ok(true)
    }

    /// Create a record from a template. `amount` overrides the template's
    /// amount and is required when the template has none.
    pub fn apply(
        &self,
        id: TemplateId,
        date: NaiveDate,
        amount: Option<Money>,
    ) -> MoneyNoteResult<GeneratedRecord> {
        let before = self
            .storage
            .templates
            .get(id)?
            .ok_or_else(|| MoneyNoteError::template_not_found(id.to_string()))?;

        let record = match before.kind {
            TransactionKind::Expense => {
                let expense = before
                    .to_expense(date, amount)
                    .map_err(|e| MoneyNoteError::Validation(e.to_string()))?;
                GeneratedRecord::Expense(ExpenseService::new(self.storage).insert(expense)?)
            }
            TransactionKind::Income => {
                let income = before
                    .to_income(date, amount)
                    .map_err(|e| MoneyNoteError::Validation(e.to_string()))?;
                GeneratedRecord::Income(IncomeService::new(self.storage).insert(income)?)
            }
        };

        let mut template = before.clone();
        template.usage_count = template.usage_count.saturating_add(1);
        template.updated_at = Utc::now();
        self.storage.templates.upsert(template.clone())?;
        self.storage.templates.save()?;
        self.storage.log_update(
            EntityType::Template,
            template.id.to_string(),
            Some(template.name.clone()),
            &before,
            &template,
        )?;

        Ok(record)
    }

    fn check(&self, template: &Template) -> MoneyNoteResult<()> {
        template
            .validate()
            .map_err(|e| MoneyNoteError::Validation(e.to_string()))?;

        let expected = match template.kind {
            TransactionKind::Expense => CategoryKind::Expense,
            TransactionKind::Income => CategoryKind::Income,
        };
        if let Some(category_id) = template.category_id {
            let category = self
                .storage
                .categories
                .get(category_id)?
                .ok_or_else(|| MoneyNoteError::category_not_found(category_id.to_string()))?;
            if category.kind != expected {
                return Err(MoneyNoteError::Validation(format!(
                    "category: '{}' is not an {} category",
                    category.name,
                    expected.to_string().to_lowercase()
                )));
            }
            if let Some(sub_id) = template.subcategory_id {
                if category.subcategory(sub_id).is_none() {
                    return Err(MoneyNoteError::subcategory_not_found(sub_id.to_string()));
                }
            }
        }
        for tag_id in &template.tags {
            if !self.storage.tags.contains(*tag_id)? {
                return Err(MoneyNoteError::tag_not_found(tag_id.to_string()));
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

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 3).unwrap()
    }

    fn coffee(storage: &Storage) -> Template {
        let food = Category::new("Food");
        storage.categories.upsert(food.clone()).unwrap();
        TemplateService::new(storage)
            .create(CreateTemplateInput {
                name: "Coffee".into(),
                kind: TransactionKind::Expense,
                amount: Some(Money::from_cents(450)),
                category_id: Some(food.id),
                description: "Morning coffee".into(),
                payment_method: PaymentMethod::Cash,
                ..Default::default()
            })
            .unwrap()
    }

    #[test]
    fn test_create_rejects_duplicates() {
        let (_temp, storage) = create_test_storage();
        coffee(&storage);
        let err = TemplateService::new(&storage)
            .create(CreateTemplateInput {
                name: "coffee".into(),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, MoneyNoteError::Duplicate { .. }));
    }

    #[test]
    fn test_apply_creates_expense_and_counts_usage() {
        let (_temp, storage) = create_test_storage();
        let template = coffee(&storage);
        let service = TemplateService::new(&storage);

        let record = service.apply(template.id, date(), None).unwrap();
        assert_eq!(record.amount().cents(), 450);
        assert_eq!(record.kind(), TransactionKind::Expense);

        let record = service
            .apply(template.id, date(), Some(Money::from_cents(600)))
            .unwrap();
        assert_eq!(record.amount().cents(), 600);

        assert_eq!(storage.expenses.count().unwrap(), 2);
        assert_eq!(service.get(template.id).unwrap().unwrap().usage_count, 2);
        assert_eq!(service.find("COFFEE").unwrap().unwrap().id, template.id);
    }

    #[test]
    fn test_apply_income_needs_amount() {
        let (_temp, storage) = create_test_storage();
        let service = TemplateService::new(&storage);
        let template = service
            .create(CreateTemplateInput {
                name: "Freelance".into(),
                kind: TransactionKind::Income,
                source: "Client".into(),
                ..Default::default()
            })
            .unwrap();

        assert!(service.apply(template.id, date(), None).unwrap_err().is_validation());
        let record = service
            .apply(template.id, date(), Some(Money::from_cents(80000)))
            .unwrap();
        assert!(matches!(record, GeneratedRecord::Income(ref i) if i.source == "Client"));
        assert_eq!(service.get(template.id).unwrap().unwrap().usage_count, 1);
    }

    #[test]
    fn test_list_orders_by_usage() {
        let (_temp, storage) = create_test_storage();
        let coffee = coffee(&storage);
        let service = TemplateService::new(&storage);
        service
            .create(CreateTemplateInput {
                name: "Bus".into(),
                kind: TransactionKind::Expense,
                category_id: coffee.category_id,
                ..Default::default()
            })
            .unwrap();
        service.apply(coffee.id, date(), None).unwrap();

        let names: Vec<_> = service.list().unwrap().into_iter().map(|t| t.name).collect();
        assert_eq!(names, vec!["Coffee", "Bus"]);
        assert!(service.delete(coffee.id).unwrap());
        assert!(!service.delete(coffee.id).unwrap());
    }
}
