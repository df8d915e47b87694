//! Budget service
//!
//! Monthly budgets: targets, per-category limits, copying between months
//! and the spent-versus-budget progress computation.

use std::collections::HashMap;

use chrono::Utc;

use crate::audit::EntityType;
use crate::error::{MoneyNoteError, MoneyNoteResult};
use crate::models::{
    Budget, BudgetStatus, Category, CategoryId, CategoryKind, Money, Month, Progress,
};
use crate::storage::Storage;

/// New values for a budget's targets; `None` keeps the current value
#[derive(Debug, Clone, Default)]
pub struct BudgetTargets {
    pub income: Option<Money>,
    pub expense: Option<Money>,
    pub savings: Option<Money>,
    pub notes: Option<String>,
}

/// Actual amount against a target (income and savings lines)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TargetProgress {
    pub target: Money,
    pub actual: Money,
    /// `actual / target * 100`, unclamped
    pub percentage: f64,
}

impl TargetProgress {
    pub fn new(target: Money, actual: Money) -> Self {
        Self {
            target,
            actual,
            percentage: actual.percentage_of(target),
        }
    }

    pub fn is_met(&self) -> bool {
        self.actual >= self.target
    }
}

/// Progress for one budgeted category
#[derive(Debug, Clone)]
pub struct CategoryProgress {
    pub category_id: CategoryId,
    pub name: String,
    pub icon: String,
    pub color: String,
    pub progress: Progress,
}

/// Everything the budget view shows for a month
#[derive(Debug, Clone)]
pub struct BudgetProgress {
    pub budget: Budget,
    pub categories: Vec<CategoryProgress>,
    pub income: TargetProgress,
    pub expenses: Progress,
    /// Actual savings is `income - expenses`
    pub savings: TargetProgress,
    /// Spending in categories without a budget entry
    pub unbudgeted_spent: Money,
}

impl BudgetProgress {
    /// Categories at or past the alert threshold, worst first
    pub fn alerts(&self) -> Vec<&CategoryProgress> {
        let mut alerts: Vec<_> = self
            .categories
            .iter()
            .filter(|c| c.progress.status != BudgetStatus::Ok)
            .collect();
        alerts.sort_by(|a, b| {
            b.progress
                .percentage
                .partial_cmp(&a.progress.percentage)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        alerts
    }

    pub fn over_budget_count(&self) -> usize {
        self.categories.iter().filter(|c| c.progress.is_over()).count()
    }
}

/// Service for budget management
pub struct BudgetService<'a> {
    storage: &'a Storage,
}

impl<'a> BudgetService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub fn get(&self, month: Month) -> MoneyNoteResult<Option<Budget>> {
        self.storage.budgets.get_by_month(month)
    }

    /// All budgets, newest month first
    pub fn list(&self) -> MoneyNoteResult<Vec<Budget>> {
        self.storage.budgets.get_all()
    }

    /// Set targets for a month, creating the budget if needed
    pub fn set_targets(&self, month: Month, targets: BudgetTargets) -> MoneyNoteResult<Budget> {
        self.modify(month, |budget| {
            if let Some(income) = targets.income {
                budget.income_target = income;
            }
            if let Some(expense) = targets.expense {
                budget.expense_target = expense;
            }
            if let Some(savings) = targets.savings {
                budget.savings_target = savings;
            }
            if let Some(notes) = targets.notes {
                budget.notes = notes.trim().to_string();
            }
            Ok(())
        })
    }

    /// Set a category limit for a month, creating the budget if needed
    pub fn set_category(
        &self,
        month: Month,
        category_id: CategoryId,
        amount: Money,
    ) -> MoneyNoteResult<Budget> {
        let category = self
            .storage
            .categories
            .get(category_id)?
            .ok_or_else(|| MoneyNoteError::category_not_found(category_id.to_string()))?;
        if category.kind != CategoryKind::Expense {
            return Err(MoneyNoteError::Validation(format!(
                "category: '{}' is an income category and cannot be budgeted",
                category.name
            )));
        }

        self.modify(month, |budget| {
            budget.set_category(category_id, amount);
            Ok(())
        })
    }

    /// Remove a category limit; `Ok(None)` when there is no budget for the
    /// month or no entry for the category
    pub fn remove_category(
        &self,
        month: Month,
        category_id: CategoryId,
    ) -> MoneyNoteResult<Option<Budget>> {
        let Some(before) = self.get(month)? else {
            tracing::warn!(%month, "category removal skipped: no budget for month");
            return Ok(None);
        };
        let mut budget = before.clone();
        if !budget.remove_category(category_id) {
            tracing::warn!(%month, %category_id, "category removal skipped: not budgeted");
            return Ok(None);
        }

        self.save_updated(&before, &budget)?;
        Ok(Some(budget))
    }

    /// Copy a month's budget to another month. An existing target budget is
    /// only replaced when `overwrite` is set.
    pub fn copy(&self, from: Month, to: Month, overwrite: bool) -> MoneyNoteResult<Budget> {
        if from == to {
            return Err(MoneyNoteError::Budget(
                "Source and target month are the same".into(),
            ));
        }
        let source = self
            .get(from)?
            .ok_or_else(|| MoneyNoteError::budget_not_found(from.to_string()))?;

        if let Some(existing) = self.get(to)? {
            if !overwrite {
                return Err(MoneyNoteError::Duplicate {
                    entity_type: "Budget",
                    identifier: to.to_string(),
                });
            }
            self.storage.budgets.delete(existing.id)?;
            self.storage.log_delete(
                EntityType::Budget,
                existing.id.to_string(),
                Some(existing.month.to_string()),
                &existing,
            )?;
        }

        let copy = source.copy_to(to);
        self.storage.budgets.upsert(copy.clone())?;
        self.storage.budgets.save()?;
        self.storage.log_create(
            EntityType::Budget,
            copy.id.to_string(),
            Some(copy.month.to_string()),
            &copy,
        )?;

        Ok(copy)
    }

    pub fn delete(&self, month: Month) -> MoneyNoteResult<bool> {
        let Some(budget) = self.get(month)? else {
            tracing::warn!(%month, "delete skipped: no budget for month");
            return Ok(false);
        };
        self.storage.budgets.delete(budget.id)?;
        self.storage.budgets.save()?;
        self.storage.log_delete(
            EntityType::Budget,
            budget.id.to_string(),
            Some(budget.month.to_string()),
            &budget,
        )?;
        Ok(true)
    }

    /// Spent-versus-budget for a month; `None` when no budget exists
    pub fn progress(
        &self,
        month: Month,
        alert_threshold: u8,
    ) -> MoneyNoteResult<Option<BudgetProgress>> {
        let Some(budget) = self.get(month)? else {
            return Ok(None);
        };

        let expenses = self.storage.expenses.get_by_month(month)?;
        let mut spent_by_category: HashMap<CategoryId, Money> = HashMap::new();
        for expense in &expenses {
            *spent_by_category.entry(expense.category_id).or_default() += expense.amount;
        }
        let total_expenses: Money = expenses.iter().map(|e| e.amount).sum();
        let total_income: Money = self
            .storage
            .incomes
            .get_by_month(month)?
            .iter()
            .map(|i| i.amount)
            .sum();

        let categories: HashMap<CategoryId, Category> = self
            .storage
            .categories
            .get_all()?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        let mut lines: Vec<(i32, CategoryProgress)> = budget
            .categories
            .iter()
            .map(|entry| {
                let spent = spent_by_category
                    .get(&entry.category_id)
                    .copied()
                    .unwrap_or_default();
                let category = categories.get(&entry.category_id);
                let line = CategoryProgress {
                    category_id: entry.category_id,
                    name: category
                        .map(|c| c.name.clone())
                        .unwrap_or_else(|| format!("(deleted {})", entry.category_id)),
                    icon: category.map(|c| c.icon.clone()).unwrap_or_default(),
                    color: category.map(|c| c.color.clone()).unwrap_or_default(),
                    progress: Progress::compute(entry.amount, spent, alert_threshold),
                };
                (category.map_or(i32::MAX, |c| c.sort_order), line)
            })
            .collect();
        lines.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.name.cmp(&b.1.name)));

        let unbudgeted_spent = spent_by_category
            .iter()
            .filter(|(id, _)| budget.category_amount(**id).is_none())
            .map(|(_, amount)| *amount)
            .sum();

        Ok(Some(BudgetProgress {
            categories: lines.into_iter().map(|(_, line)| line).collect(),
            income: TargetProgress::new(budget.income_target, total_income),
            expenses: Progress::compute(budget.expense_target, total_expenses, alert_threshold),
            savings: TargetProgress::new(budget.savings_target, total_income - total_expenses),
            unbudgeted_spent,
            budget,
        }))
    }

    /// Load or create the month's budget, apply a change, validate and save
    fn modify<F>(&self, month: Month, change: F) -> MoneyNoteResult<Budget>
    where
        F: FnOnce(&mut Budget) -> MoneyNoteResult<()>,
    {
        let existing = self.get(month)?;
        let mut budget = existing.clone().unwrap_or_else(|| Budget::new(month));

        change(&mut budget)?;
        budget.updated_at = Utc::now();
        budget
            .validate()
            .map_err(|e| MoneyNoteError::Validation(e.to_string()))?;

        match existing {
            Some(before) => self.save_updated(&before, &budget)?,
            None => {
                self.storage.budgets.upsert(budget.clone())?;
                self.storage.budgets.save()?;
                self.storage.log_create(
                    EntityType::Budget,
                    budget.id.to_string(),
                    Some(budget.month.to_string()),
                    &budget,
                )?;
            }
        }
        Ok(budget)
    }

    fn save_updated(&self, before: &Budget, after: &Budget) -> MoneyNoteResult<()> {
        self.storage.budgets.upsert(after.clone())?;
        self.storage.budgets.save()?;
        self.storage.log_update(
            EntityType::Budget,
            after.id.to_string(),
            Some(after.month.to_string()),
            before,
            after,
        )
    }
}
