//! Monthly budget model
//!
//! A budget is keyed by month and holds income/expense/savings targets plus
//! per-category spending limits. Spent, remaining and percentage values are
//! computed from expenses on demand and never stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{BudgetId, CategoryId};
use super::money::Money;
use super::month::Month;

/// Spending limit for one category within a budget
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryBudget {
    pub category_id: CategoryId,
    pub amount: Money,
}

/// Budget for a single month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub id: BudgetId,
    pub month: Month,
    #[serde(default)]
    pub income_target: Money,
    #[serde(default)]
    pub expense_target: Money,
    #[serde(default)]
    pub savings_target: Money,
    #[serde(default)]
    pub categories: Vec<CategoryBudget>,
    #[serde(default)]
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Budget {
    pub fn new(month: Month) -> Self {
        let now = Utc::now();
        Self {
            id: BudgetId::new(),
            month,
            income_target: Money::zero(),
            expense_target: Money::zero(),
            savings_target: Money::zero(),
            categories: Vec::new(),
            notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Budgeted amount for a category, if one is set
    pub fn category_amount(&self, category_id: CategoryId) -> Option<Money> {
        self.categories
            .iter()
            .find(|c| c.category_id == category_id)
            .map(|c| c.amount)
    }

    /// Set (or replace) a category entry
    pub fn set_category(&mut self, category_id: CategoryId, amount: Money) {
        match self
            .categories
            .iter_mut()
            .find(|c| c.category_id == category_id)
        {
            Some(entry) => entry.amount = amount,
            None => self.categories.push(CategoryBudget {
                category_id,
                amount,
            }),
        }
        self.updated_at = Utc::now();
    }

    /// Remove a category entry; returns true when one was removed
    pub fn remove_category(&mut self, category_id: CategoryId) -> bool {
        let before = self.categories.len();
        self.categories.retain(|c| c.category_id != category_id);
        let removed = self.categories.len() != before;
        if removed {
            self.updated_at = Utc::now();
        }
        removed
    }

    /// Sum of all category limits
    pub fn total_category_budget(&self) -> Money {
        self.categories.iter().map(|c| c.amount).sum()
    }

    /// Copy targets and category limits into a new budget for another month
    pub fn copy_to(&self, month: Month) -> Self {
        let mut copy = Budget::new(month);
        copy.income_target = self.income_target;
        copy.expense_target = self.expense_target;
        copy.savings_target = self.savings_target;
        copy.categories = self.categories.clone();
        copy.notes = self.notes.clone();
        copy
    }

    pub fn validate(&self) -> Result<(), BudgetValidationError> {
        if self.income_target.is_negative()
            || self.expense_target.is_negative()
            || self.savings_target.is_negative()
        {
            return Err(BudgetValidationError::NegativeTarget);
        }
        let targets = [self.income_target, self.expense_target, self.savings_target];
        if targets
            .iter()
            .chain(self.categories.iter().map(|entry| &entry.amount))
            .any(|amount| !amount.is_within_limit())
        {
            return Err(BudgetValidationError::AmountTooLarge);
        }

        let mut seen = std::collections::HashSet::new();
        for entry in &self.categories {
            if entry.amount.is_negative() {
                return Err(BudgetValidationError::NegativeCategoryAmount);
            }
            if !seen.insert(entry.category_id) {
                return Err(BudgetValidationError::DuplicateCategory);
            }
        }

        Ok(())
    }
}

/// Progress classification for a budget line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetStatus {
    Ok,
    /// At or above the alert threshold, not over
    Warning,
    /// Spent more than budgeted
    Over,
}

impl fmt::Display for BudgetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "OK"),
            Self::Warning => write!(f, "Warning"),
            Self::Over => write!(f, "Over"),
        }
    }
}

/// Spent-versus-budget computation for one line
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Progress {
    pub budget: Money,
    pub spent: Money,
    pub remaining: Money,
    /// `spent / budget * 100`, unclamped
    pub percentage: f64,
    pub status: BudgetStatus,
}

impl Progress {
    /// Compute progress; `alert_threshold` is a percentage (e.g. 80)
    pub fn compute(budget: Money, spent: Money, alert_threshold: u8) -> Self {
        let percentage = spent.percentage_of(budget);
        let status = if spent > budget {
            BudgetStatus::Over
        } else if !budget.is_zero() && percentage >= f64::from(alert_threshold) {
            BudgetStatus::Warning
        } else {
            BudgetStatus::Ok
        };

        Self {
            budget,
            spent,
            remaining: budget - spent,
            percentage,
            status,
        }
    }

    /// Percentage clamped to 0..=100 for progress bars
    pub fn display_percentage(&self) -> f64 {
        self.percentage.clamp(0.0, 100.0)
    }

    pub fn is_over(&self) -> bool {
        self.status == BudgetStatus::Over
    }
}

/// Validation errors for budgets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BudgetValidationError {
    NegativeTarget,
    NegativeCategoryAmount,
    AmountTooLarge,
    DuplicateCategory,
}

impl fmt::Display for BudgetValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NegativeTarget => write!(f, "Budget targets cannot be negative"),
            Self::NegativeCategoryAmount => write!(f, "Category budget cannot be negative"),
            Self::AmountTooLarge => write!(f, "Budget amounts cannot exceed {}", Money::MAX),
            Self::DuplicateCategory => write!(f, "Category is budgeted twice"),
        }
    }
}

impl std::error::Error for BudgetValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn jan() -> Month {
        Month::new(2025, 1).unwrap()
    }

    #[test]
    fn test_set_and_remove_category() {
        let mut budget = Budget::new(jan());
        let food = CategoryId::new();

        budget.set_category(food, Money::from_cents(40000));
        budget.set_category(food, Money::from_cents(50000));
        assert_eq!(budget.categories.len(), 1);
        assert_eq!(budget.category_amount(food), Some(Money::from_cents(50000)));

        assert!(budget.remove_category(food));
        assert!(!budget.remove_category(food));
        assert!(budget.category_amount(food).is_none());
    }

    #[test]
    fn test_validation() {
        let mut budget = Budget::new(jan());
        assert!(budget.validate().is_ok());

        budget.savings_target = Money::from_cents(-1);
        assert_eq!(budget.validate(), Err(BudgetValidationError::NegativeTarget));

        budget.savings_target = Money::from_cents(i64::MAX);
        assert_eq!(budget.validate(), Err(BudgetValidationError::AmountTooLarge));

        budget.savings_target = Money::zero();
        let food = CategoryId::new();
        budget.categories = vec![
            CategoryBudget {
                category_id: food,
                amount: Money::from_cents(100),
            },
            CategoryBudget {
                category_id: food,
                amount: Money::from_cents(200),
            },
        ];
        assert_eq!(budget.validate(), Err(BudgetValidationError::DuplicateCategory));
    }

    #[test]
    fn test_copy_to() {
        let mut budget = Budget::new(jan());
        budget.expense_target = Money::from_cents(200000);
        budget.set_category(CategoryId::new(), Money::from_cents(30000));

        let feb = budget.copy_to(jan().next());
        assert_ne!(feb.id, budget.id);
        assert_eq!(feb.month, jan().next());
        assert_eq!(feb.expense_target, budget.expense_target);
        assert_eq!(feb.categories, budget.categories);
    }

    #[test]
    fn test_progress_percentage_unclamped() {
        let progress = Progress::compute(Money::from_cents(10000), Money::from_cents(15000), 80);
        assert!((progress.percentage - 150.0).abs() < 1e-9);
        assert!((progress.display_percentage() - 100.0).abs() < 1e-9);
        assert_eq!(progress.remaining.cents(), -5000);
        assert_eq!(progress.status, BudgetStatus::Over);
    }

    #[test]
    fn test_progress_status() {
        let budget = Money::from_cents(10000);
        assert_eq!(
            Progress::compute(budget, Money::from_cents(5000), 80).status,
            BudgetStatus::Ok
        );
        assert_eq!(
            Progress::compute(budget, Money::from_cents(8000), 80).status,
            BudgetStatus::Warning
        );
        assert_eq!(
            Progress::compute(budget, Money::from_cents(10000), 80).status,
            BudgetStatus::Warning
        );
        assert_eq!(
            Progress::compute(budget, Money::from_cents(10001), 80).status,
            BudgetStatus::Over
        );
    }

    #[test]
    fn test_progress_zero_budget() {
        let progress = Progress::compute(Money::zero(), Money::zero(), 80);
        assert_eq!(progress.percentage, 0.0);
        assert_eq!(progress.status, BudgetStatus::Ok);

        let spent = Progress::compute(Money::zero(), Money::from_cents(1), 80);
        assert_eq!(spent.status, BudgetStatus::Over);
    }
}
