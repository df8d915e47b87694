//! Budget collection (`data/budgets.json`)

use std::cmp::Ordering;

use crate::error::MoneyNoteError;
use crate::models::{Budget, BudgetId, CategoryId, Month};

use super::repository::{JsonRepository, Record};

impl Record for Budget {
    type Id = BudgetId;
    const COLLECTION: &'static str = "budgets";

    fn id(&self) -> BudgetId {
        self.id
    }

    /// Newest month first
    fn listing_order(&self, other: &Self) -> Ordering {
        other.month.cmp(&self.month)
    }
}

pub type BudgetRepository = JsonRepository<Budget>;

impl JsonRepository<Budget> {
    pub fn get_by_month(&self, month: Month) -> Result<Option<Budget>, MoneyNoteError> {
        self.find(|b| b.month == month)
    }

    /// Number of budgets with an entry for a category
    pub fn count_by_category(&self, category_id: CategoryId) -> Result<usize, MoneyNoteError> {
        self.count_where(|b| b.category_amount(category_id).is_some())
    }
}
