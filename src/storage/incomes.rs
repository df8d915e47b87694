//! Income collection (`data/incomes.json`)

use std::cmp::Ordering;

use chrono::NaiveDate;

use crate::error::MoneyNoteError;
use crate::models::{CategoryId, Income, IncomeId, Month, RecurringId};

use super::repository::{JsonRepository, Record};

impl Record for Income {
    type Id = IncomeId;
    const COLLECTION: &'static str = "incomes";

    fn id(&self) -> IncomeId {
        self.id
    }

    fn listing_order(&self, other: &Self) -> Ordering {
        other
            .date
            .cmp(&self.date)
            .then_with(|| other.created_at.cmp(&self.created_at))
    }
}

pub type IncomeRepository = JsonRepository<Income>;

impl JsonRepository<Income> {
    pub fn get_by_date_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Income>, MoneyNoteError> {
        self.filter(|i| i.date >= start && i.date <= end)
    }

    pub fn get_by_month(&self, month: Month) -> Result<Vec<Income>, MoneyNoteError> {
        self.filter(|i| month.contains(i.date))
    }

    pub fn count_by_category(&self, category_id: CategoryId) -> Result<usize, MoneyNoteError> {
        self.count_where(|i| i.category_id == Some(category_id))
    }

    pub fn exists_for_recurring(
        &self,
        recurring_id: RecurringId,
        date: NaiveDate,
    ) -> Result<bool, MoneyNoteError> {
        Ok(self.count_where(|i| i.recurring_id == Some(recurring_id) && i.date == date)? > 0)
    }
}
