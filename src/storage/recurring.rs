//! Recurring transaction collection (`data/recurring.json`)

use std::cmp::Ordering;

use crate::error::MoneyNoteError;
use crate::models::{CategoryId, RecurringId, RecurringTransaction};

use super::repository::{JsonRepository, Record};

impl Record for RecurringTransaction {
    type Id = RecurringId;
    const COLLECTION: &'static str = "recurring";

    fn id(&self) -> RecurringId {
        self.id
    }

    /// Active rules first, soonest next date first
    fn listing_order(&self, other: &Self) -> Ordering {
        other
            .active
            .cmp(&self.active)
            .then(self.next_date.cmp(&other.next_date))
            .then_with(|| self.description.cmp(&other.description))
    }
}

pub type RecurringRepository = JsonRepository<RecurringTransaction>;

impl JsonRepository<RecurringTransaction> {
    pub fn get_active(&self) -> Result<Vec<RecurringTransaction>, MoneyNoteError> {
        self.filter(|r| r.active)
    }

    pub fn count_by_category(&self, category_id: CategoryId) -> Result<usize, MoneyNoteError> {
        self.count_where(|r| r.category_id == Some(category_id))
    }
}
