//! Category collection (`data/categories.json`)

use std::cmp::Ordering;

use crate::error::MoneyNoteError;
use crate::models::{Category, CategoryId, CategoryKind};

use super::repository::{JsonRepository, Record};

fn kind_rank(kind: CategoryKind) -> u8 {
    match kind {
        CategoryKind::Expense => 0,
        CategoryKind::Income => 1,
    }
}

impl Record for Category {
    type Id = CategoryId;
    const COLLECTION: &'static str = "categories";

    fn id(&self) -> CategoryId {
        self.id
    }

    /// Expense categories first, then by sort order and name
    fn listing_order(&self, other: &Self) -> Ordering {
        kind_rank(self.kind)
            .cmp(&kind_rank(other.kind))
            .then(self.sort_order.cmp(&other.sort_order))
            .then_with(|| self.name.to_lowercase().cmp(&other.name.to_lowercase()))
    }
}

pub type CategoryRepository = JsonRepository<Category>;

impl JsonRepository<Category> {
    /// Find a category by name within a kind (case-insensitive)
    pub fn get_by_name(
        &self,
        name: &str,
        kind: CategoryKind,
    ) -> Result<Option<Category>, MoneyNoteError> {
        let name = name.trim();
        self.find(|c| c.kind == kind && c.name.eq_ignore_ascii_case(name))
    }

    pub fn get_by_kind(&self, kind: CategoryKind) -> Result<Vec<Category>, MoneyNoteError> {
        self.filter(|c| c.kind == kind)
    }

    /// Highest sort order in use for a kind, or -1 when there are none
    pub fn max_sort_order(&self, kind: CategoryKind) -> Result<i32, MoneyNoteError> {
        Ok(self
            .get_by_kind(kind)?
            .iter()
            .map(|c| c.sort_order)
            .max()
            .unwrap_or(-1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_get_by_name_is_scoped_to_kind() {
        let temp_dir = TempDir::new().unwrap();
        let repo = CategoryRepository::new(temp_dir.path().join("categories.json"));
        repo.upsert(Category::new("Other")).unwrap();
        repo.upsert(Category::with_kind("Other", CategoryKind::Income))
            .unwrap();

        let expense = repo.get_by_name("other", CategoryKind::Expense).unwrap().unwrap();
        assert_eq!(expense.kind, CategoryKind::Expense);
        let income = repo.get_by_name("OTHER", CategoryKind::Income).unwrap().unwrap();
        assert_eq!(income.kind, CategoryKind::Income);
        assert!(repo.get_by_name("Food", CategoryKind::Expense).unwrap().is_none());
    }

    #[test]
    fn test_listing_order() {
        let temp_dir = TempDir::new().unwrap();
        let repo = CategoryRepository::new(temp_dir.path().join("categories.json"));

        let mut salary = Category::with_kind("Salary", CategoryKind::Income);
        salary.sort_order = 0;
        let mut transport = Category::new("Transport");
        transport.sort_order = 1;
        let mut food = Category::new("Food");
        food.sort_order = 0;

        repo.upsert(salary).unwrap();
        repo.upsert(transport).unwrap();
        repo.upsert(food).unwrap();

        let names: Vec<_> = repo.get_all().unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Food", "Transport", "Salary"]);
        assert_eq!(repo.max_sort_order(CategoryKind::Expense).unwrap(), 1);
    }
}
