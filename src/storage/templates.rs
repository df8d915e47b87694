//! Template collection (`data/templates.json`)

use std::cmp::Ordering;

use crate::error::MoneyNoteError;
use crate::models::{Template, TemplateId};

use super::repository::{JsonRepository, Record};

impl Record for Template {
    type Id = TemplateId;
    const COLLECTION: &'static str = "templates";

    fn id(&self) -> TemplateId {
        self.id
    }

    /// Most used first
    fn listing_order(&self, other: &Self) -> Ordering {
        other
            .usage_count
            .cmp(&self.usage_count)
            .then_with(|| self.name.to_lowercase().cmp(&other.name.to_lowercase()))
    }
}

pub type TemplateRepository = JsonRepository<Template>;

impl JsonRepository<Template> {
    pub fn get_by_name(&self, name: &str) -> Result<Option<Template>, MoneyNoteError> {
        let name = name.trim();
        self.find(|t| t.name.eq_ignore_ascii_case(name))
    }
}
