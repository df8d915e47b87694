//! Expense collection (`data/expenses.json`)

use std::cmp::Ordering;

use chrono::NaiveDate;

use crate::error::MoneyNoteError;
use crate::models::{CategoryId, Expense, ExpenseId, Month, RecurringId, SubcategoryId, TagId};

use super::repository::{JsonRepository, Record};

impl Record for Expense {
    type Id = ExpenseId;
    const COLLECTION: &'static str = "expenses";

    fn id(&self) -> ExpenseId {
        self.id
    }

    /// Newest first
    fn listing_order(&self, other: &Self) -> Ordering {
        other
            .date
            .cmp(&self.date)
            .then_with(|| other.created_at.cmp(&self.created_at))
    }
}

pub type ExpenseRepository = JsonRepository<Expense>;

impl JsonRepository<Expense> {
    /// Expenses dated within `start..=end`
    pub fn get_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Expense>, MoneyNoteError> {
        self.filter(|e| e.date >= start && e.date <= end)
    }

    pub fn get_by_month(&self, month: Month) -> Result<Vec<Expense>, MoneyNoteError> {
        self.filter(|e| month.contains(e.date))
    }

    pub fn get_by_category(&self, category_id: CategoryId) -> Result<Vec<Expense>, MoneyNoteError> {
        self.filter(|e| e.category_id == category_id)
    }

    pub fn count_by_category(&self, category_id: CategoryId) -> Result<usize, MoneyNoteError> {
        self.count_where(|e| e.category_id == category_id)
    }

    pub fn count_by_subcategory(
        &self,
        subcategory_id: SubcategoryId,
    ) -> Result<usize, MoneyNoteError> {
        self.count_where(|e| e.subcategory_id == Some(subcategory_id))
    }

    pub fn count_by_tag(&self, tag_id: TagId) -> Result<usize, MoneyNoteError> {
        self.count_where(|e| e.has_tag(tag_id))
    }

    /// Whether a recurring rule already generated an expense on `date`
    pub fn exists_for_recurring(
        &self,
        recurring_id: RecurringId,
        date: NaiveDate,
    ) -> Result<bool, MoneyNoteError> {
        Ok(self.count_where(|e| e.recurring_id == Some(recurring_id) && e.date == date)? > 0)
    }
}
