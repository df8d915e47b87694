//! Tag collection (`data/tags.json`)

use std::cmp::Ordering;

use crate::error::MoneyNoteError;
use crate::models::{Tag, TagId};

use super::repository::{JsonRepository, Record};

impl Record for Tag {
    type Id = TagId;
    const COLLECTION: &'static str = "tags";

    fn id(&self) -> TagId {
        self.id
    }

    fn listing_order(&self, other: &Self) -> Ordering {
        self.name.to_lowercase().cmp(&other.name.to_lowercase())
    }
}

pub type TagRepository = JsonRepository<Tag>;

impl JsonRepository<Tag> {
    pub fn get_by_name(&self, name: &str) -> Result<Option<Tag>, MoneyNoteError> {
        self.find(|t| t.is_named(name))
    }
}
