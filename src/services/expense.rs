//! Expense service
//!
//! CRUD, filtering and sorting for expenses. References to categories,
//! subcategories and tags are checked on every write, and tag usage counts
//! are refreshed afterwards.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{NaiveDate, Utc};

use crate::audit::EntityType;
use crate::error::{MoneyNoteError, MoneyNoteResult};
use crate::models::{
    CategoryId, CategoryKind, Expense, ExpenseId, Money, Month, PaymentMethod, SubcategoryId,
    TagId,
};
use crate::storage::Storage;

use super::tag::TagService;

/// Sort order for expense listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpenseSort {
    #[default]
    DateDesc,
    DateAsc,
    AmountDesc,
    AmountAsc,
    Category,
}

impl std::str::FromStr for ExpenseSort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "date" | "date-desc" | "newest" => Ok(Self::DateDesc),
            "date-asc" | "oldest" => Ok(Self::DateAsc),
            "amount" | "amount-desc" => Ok(Self::AmountDesc),
            "amount-asc" => Ok(Self::AmountAsc),
            "category" => Ok(Self::Category),
            other => Err(format!(
                "Unknown sort '{}' (expected date, date-asc, amount, amount-asc or category)",
                other
            )),
        }
    }
}

/// Options for filtering expenses
#[derive(Debug, Clone, Default)]
pub struct ExpenseFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub category_id: Option<CategoryId>,
    pub subcategory_id: Option<SubcategoryId>,
    pub tag_id: Option<TagId>,
    pub payment_method: Option<PaymentMethod>,
    pub is_fixed: Option<bool>,
    pub min_amount: Option<Money>,
    pub max_amount: Option<Money>,
    /// Case-insensitive match against description and notes
    pub text: Option<String>,
    pub sort: ExpenseSort,
    pub limit: Option<usize>,
}

impl ExpenseFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn date_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    pub fn month(self, month: Month) -> Self {
        self.date_range(month.start_date(), month.end_date())
    }

    pub fn category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn tag(mut self, tag_id: TagId) -> Self {
        self.tag_id = Some(tag_id);
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn sort(mut self, sort: ExpenseSort) -> Self {
        self.sort = sort;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Whether an expense passes every criterion (sort and limit aside)
    pub fn matches(&self, expense: &Expense) -> bool {
        if self.start_date.is_some_and(|start| expense.date < start)
            || self.end_date.is_some_and(|end| expense.date > end)
        {
            return false;
        }
        if self.category_id.is_some_and(|id| expense.category_id != id)
            || self
                .subcategory_id
                .is_some_and(|id| expense.subcategory_id != Some(id))
            || self.tag_id.is_some_and(|id| !expense.has_tag(id))
            || self
                .payment_method
                .is_some_and(|method| expense.payment_method != method)
            || self.is_fixed.is_some_and(|fixed| expense.is_fixed != fixed)
        {
            return false;
        }
        if self.min_amount.is_some_and(|min| expense.amount < min)
            || self.max_amount.is_some_and(|max| expense.amount > max)
        {
            return false;
        }
        match self.text.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => {
                let needle = text.to_lowercase();
                expense.description.to_lowercase().contains(&needle)
                    || expense.notes.to_lowercase().contains(&needle)
            }
            _ => true,
        }
    }
}

/// Input for creating an expense
#[derive(Debug, Clone)]
pub struct CreateExpenseInput {
    pub amount: Money,
    pub date: NaiveDate,
    pub category_id: CategoryId,
    pub subcategory_id: Option<SubcategoryId>,
    pub description: String,
    pub payment_method: PaymentMethod,
    pub tags: Vec<TagId>,
    pub is_fixed: bool,
    pub notes: String,
}

impl CreateExpenseInput {
    pub fn new(amount: Money, date: NaiveDate, category_id: CategoryId) -> Self {
        Self {
            amount,
            date,
            category_id,
            subcategory_id: None,
            description: String::new(),
            payment_method: PaymentMethod::default(),
            tags: Vec::new(),
            is_fixed: false,
            notes: String::new(),
        }
    }
}

/// Field changes for an expense; `None` leaves a field as is
#[derive(Debug, Clone, Default)]
pub struct ExpenseUpdate {
    pub amount: Option<Money>,
    pub date: Option<NaiveDate>,
    pub category_id: Option<CategoryId>,
    /// `Some(None)` clears the subcategory
    pub subcategory_id: Option<Option<SubcategoryId>>,
    pub description: Option<String>,
    pub payment_method: Option<PaymentMethod>,
    pub tags: Option<Vec<TagId>>,
    pub is_fixed: Option<bool>,
    pub notes: Option<String>,
}

/// Service for expense management
pub struct ExpenseService<'a> {
    storage: &'a Storage,
}

impl<'a> ExpenseService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub fn create(&self, input: CreateExpenseInput) -> MoneyNoteResult<Expense> {
        let mut expense = Expense::new(input.amount, input.date, input.category_id);
        expense.subcategory_id = input.subcategory_id;
        expense.description = input.description.trim().to_string();
        expense.payment_method = input.payment_method;
        expense.tags = input.tags;
        expense.is_fixed = input.is_fixed;
        expense.notes = input.notes;
        self.insert(expense)
    }

    /// Validate and store a fully built expense (recurring runs, templates)
    pub fn insert(&self, expense: Expense) -> MoneyNoteResult<Expense> {
        let inserted = self.insert_many(vec![expense])?;
        inserted
            .into_iter()
            .next()
            .ok_or_else(|| MoneyNoteError::Storage("Expense insert returned nothing".into()))
    }

    /// Validate and store several expenses with a single save
    pub fn insert_many(&self, expenses: Vec<Expense>) -> MoneyNoteResult<Vec<Expense>> {
        for expense in &expenses {
            self.check(expense)?;
        }
        for expense in &expenses {
            self.storage.expenses.upsert(expense.clone())?;
        }
        self.storage.expenses.save()?;

        for expense in &expenses {
            self.storage.log_create(
                EntityType::Expense,
                expense.id.to_string(),
                Some(audit_label(expense)),
                expense,
            )?;
        }
        TagService::new(self.storage).refresh_usage_counts()?;

        tracing::debug!(count = expenses.len(), "expenses created");
        Ok(expenses)
    }

    pub fn get(&self, id: ExpenseId) -> MoneyNoteResult<Option<Expense>> {
        self.storage.expenses.get(id)
    }

    /// Find an expense by full or short ID
    pub fn find(&self, identifier: &str) -> MoneyNoteResult<Option<Expense>> {
        self.storage.expenses.resolve(identifier)
    }

    pub fn list(&self, filter: &ExpenseFilter) -> MoneyNoteResult<Vec<Expense>> {
        let mut expenses = self.storage.expenses.filter(|e| filter.matches(e))?;
        self.sort(&mut expenses, filter.sort)?;
        if let Some(limit) = filter.limit {
            expenses.truncate(limit);
        }
        Ok(expenses)
    }

    /// Text search across description and notes, newest first
    pub fn search(&self, text: &str) -> MoneyNoteResult<Vec<Expense>> {
        self.list(&ExpenseFilter::new().text(text))
    }

    fn sort(&self, expenses: &mut [Expense], sort: ExpenseSort) -> MoneyNoteResult<()> {
        let newest = |a: &Expense, b: &Expense| {
            b.date
                .cmp(&a.date)
                .then_with(|| b.created_at.cmp(&a.created_at))
        };
        match sort {
            ExpenseSort::DateDesc => expenses.sort_by(newest),
            ExpenseSort::DateAsc => expenses.sort_by(|a, b| newest(b, a)),
            ExpenseSort::AmountDesc => {
                expenses.sort_by(|a, b| b.amount.cmp(&a.amount).then_with(|| newest(a, b)))
            }
            ExpenseSort::AmountAsc => {
                expenses.sort_by(|a, b| a.amount.cmp(&b.amount).then_with(|| newest(a, b)))
            }
            ExpenseSort::Category => {
                let names: HashMap<CategoryId, String> = self
                    .storage
                    .categories
                    .get_all()?
                    .into_iter()
                    .map(|c| (c.id, c.name.to_lowercase()))
                    .collect();
                let name_of = |e: &Expense| names.get(&e.category_id).cloned().unwrap_or_default();
                expenses.sort_by(|a, b| match name_of(a).cmp(&name_of(b)) {
                    Ordering::Equal => newest(a, b),
                    other => other,
                });
            }
        }
        Ok(())
    }

    /// Apply changes to an expense. A missing id is logged and yields
    /// `Ok(None)` with nothing changed.
    pub fn update(&self, id: ExpenseId, update: ExpenseUpdate) -> MoneyNoteResult<Option<Expense>> {
        let Some(before) = self.storage.expenses.get(id)? else {
            tracing::warn!(%id, "update skipped: expense not found");
            return Ok(None);
        };
        let mut expense = before.clone();

        if let Some(amount) = update.amount {
            expense.amount = amount;
        }
        if let Some(date) = update.date {
            expense.date = date;
        }
        if let Some(category_id) = update.category_id {
            if category_id != expense.category_id {
                expense.category_id = category_id;
                if update.subcategory_id.is_none() {
                    expense.subcategory_id = None;
                }
            }
        }
        if let Some(subcategory_id) = update.subcategory_id {
            expense.subcategory_id = subcategory_id;
        }
        if let Some(description) = update.description {
            expense.description = description.trim().to_string();
        }
        if let Some(method) = update.payment_method {
            expense.payment_method = method;
        }
        if let Some(tags) = update.tags {
            expense.tags = tags;
        }
        if let Some(is_fixed) = update.is_fixed {
            expense.is_fixed = is_fixed;
        }
        if let Some(notes) = update.notes {
            expense.notes = notes;
        }
        expense.updated_at = Utc::now();

        self.check(&expense)?;
        self.storage.expenses.upsert(expense.clone())?;
        self.storage.expenses.save()?;

        self.storage.log_update(
            EntityType::Expense,
            expense.id.to_string(),
            Some(audit_label(&expense)),
            &before,
            &expense,
        )?;
        if before.tags != expense.tags {
            TagService::new(self.storage).refresh_usage_counts()?;
        }

        Ok(Some(expense))
    }

    /// Delete an expense; returns false (with a warning) when it doesn't exist
    pub fn delete(&self, id: ExpenseId) -> MoneyNoteResult<bool> {
        let Some(expense) = self.storage.expenses.delete(id)? else {
            tracing::warn!(%id, "delete skipped: expense not found");
            return Ok(false);
        };
        self.storage.expenses.save()?;

        self.storage.log_delete(
            EntityType::Expense,
            expense.id.to_string(),
            Some(audit_label(&expense)),
            &expense,
        )?;
        if !expense.tags.is_empty() {
            TagService::new(self.storage).refresh_usage_counts()?;
        }

        Ok(true)
    }

    /// Sum of expenses in a date range
    pub fn total_between(&self, start: NaiveDate, end: NaiveDate) -> MoneyNoteResult<Money> {
        Ok(self
            .storage
            .expenses
            .get_by_date_range(start, end)?
            .iter()
            .map(|e| e.amount)
            .sum())
    }

    /// Field validation plus reference checks
    fn check(&self, expense: &Expense) -> MoneyNoteResult<()> {
        expense
            .validate()
            .map_err(|e| MoneyNoteError::Validation(e.to_string()))?;

        let category = self
            .storage
            .categories
            .get(expense.category_id)?
            .ok_or_else(|| MoneyNoteError::category_not_found(expense.category_id.to_string()))?;
        if category.kind != CategoryKind::Expense {
            return Err(MoneyNoteError::Validation(format!(
                "category: '{}' is an income category",
                category.name
            )));
        }
        if let Some(sub_id) = expense.subcategory_id {
            if category.subcategory(sub_id).is_none() {
                return Err(MoneyNoteError::Validation(format!(
                    "subcategory: {} does not belong to '{}'",
                    sub_id, category.name
                )));
            }
        }
        for tag_id in &expense.tags {
            if !self.storage.tags.contains(*tag_id)? {
                return Err(MoneyNoteError::tag_not_found(tag_id.to_string()));
            }
        }
        Ok(())
    }
}

fn audit_label(expense: &Expense) -> String {
    if expense.description.is_empty() {
        format!("{} {}", expense.date, expense.amount)
    } else {
        format!("{} {}", expense.date, expense.description)
    }
}
