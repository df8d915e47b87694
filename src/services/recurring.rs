//! Recurring transaction service
//!
//! Manages recurring rules and turns due occurrences into expenses and
//! incomes. Processing catches up on every occurrence missed since the last
//! run and is idempotent for a fixed `today`.

use chrono::{Days, NaiveDate, Utc};

use crate::audit::EntityType;
use crate::error::{MoneyNoteError, MoneyNoteResult};
use crate::models::{
    CategoryId, CategoryKind, Expense, Frequency, Income, Money, PaymentMethod, RecurringId,
    RecurringTransaction, SubcategoryId, TagId, TransactionKind,
};
use crate::storage::Storage;

use super::expense::ExpenseService;
use super::income::IncomeService;

/// Input for creating a recurring rule
#[derive(Debug, Clone)]
pub struct CreateRecurringInput {
    pub kind: TransactionKind,
    pub amount: Money,
    pub description: String,
    pub category_id: Option<CategoryId>,
    pub subcategory_id: Option<SubcategoryId>,
    pub payment_method: PaymentMethod,
    pub tags: Vec<TagId>,
    pub is_fixed: bool,
    pub source: String,
    pub frequency: Frequency,
    pub interval: u32,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

impl CreateRecurringInput {
    pub fn new(
        kind: TransactionKind,
        amount: Money,
        frequency: Frequency,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            kind,
            amount,
            description: String::new(),
            category_id: None,
            subcategory_id: None,
            payment_method: PaymentMethod::default(),
            tags: Vec::new(),
            is_fixed: kind == TransactionKind::Expense,
            source: String::new(),
            frequency,
            interval: 1,
            start_date,
            end_date: None,
        }
    }
}

/// Field changes for a recurring rule
#[derive(Debug, Clone, Default)]
pub struct RecurringUpdate {
    pub amount: Option<Money>,
    pub description: Option<String>,
    pub category_id: Option<Option<CategoryId>>,
    pub subcategory_id: Option<Option<SubcategoryId>>,
    pub payment_method: Option<PaymentMethod>,
    pub tags: Option<Vec<TagId>>,
    pub is_fixed: Option<bool>,
    pub source: Option<String>,
    pub frequency: Option<Frequency>,
    pub interval: Option<u32>,
    pub start_date: Option<NaiveDate>,
    /// `Some(None)` removes the end date
    pub end_date: Option<Option<NaiveDate>>,
}

/// A record created from a recurring rule
#[derive(Debug, Clone)]
pub enum GeneratedRecord {
    Expense(Expense),
    Income(Income),
}

impl GeneratedRecord {
    pub fn date(&self) -> NaiveDate {
        match self {
            Self::Expense(e) => e.date,
            Self::Income(i) => i.date,
        }
    }

    pub fn amount(&self) -> Money {
        match self {
            Self::Expense(e) => e.amount,
            Self::Income(i) => i.amount,
        }
    }

    pub fn kind(&self) -> TransactionKind {
        match self {
            Self::Expense(_) => TransactionKind::Expense,
            Self::Income(_) => TransactionKind::Income,
        }
    }
}

/// Outcome of [`RecurringService::process_due`]
#[derive(Debug, Default)]
pub struct ProcessReport {
    /// Records created, with the rule that produced them
    pub generated: Vec<(RecurringId, GeneratedRecord)>,
    /// Rules that ran past their end date during this pass
    pub finished: Vec<RecurringId>,
    /// Rules that could not be processed (e.g. their category is gone)
    pub failed: Vec<(RecurringId, String)>,
}

impl ProcessReport {
    pub fn is_empty(&self) -> bool {
        self.generated.is_empty() && self.finished.is_empty() && self.failed.is_empty()
    }

    pub fn expense_total(&self) -> Money {
        self.generated
            .iter()
            .filter(|(_, r)| r.kind() == TransactionKind::Expense)
            .map(|(_, r)| r.amount())
            .sum()
    }

    pub fn income_total(&self) -> Money {
        self.generated
            .iter()
            .filter(|(_, r)| r.kind() == TransactionKind::Income)
            .map(|(_, r)| r.amount())
            .sum()
    }
}

/// A projected occurrence that has not been generated yet
#[derive(Debug, Clone)]
pub struct UpcomingOccurrence {
    pub recurring_id: RecurringId,
    pub date: NaiveDate,
    pub kind: TransactionKind,
    pub amount: Money,
    pub description: String,
}

/// Service for recurring transactions
pub struct RecurringService<'a> {
    storage: &'a Storage,
}

impl<'a> RecurringService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub fn create(&self, input: CreateRecurringInput) -> MoneyNoteResult<RecurringTransaction> {
        let mut rule =
            RecurringTransaction::new(input.kind, input.amount, input.frequency, input.start_date);
        rule.description = input.description.trim().to_string();
        rule.category_id = input.category_id;
        rule.subcategory_id = input.subcategory_id;
        rule.payment_method = input.payment_method;
        rule.tags = input.tags;
        rule.is_fixed = input.is_fixed;
        rule.source = input.source.trim().to_string();
        rule.interval = input.interval;
        rule.end_date = input.end_date;

        self.check(&rule)?;
        self.storage.recurring.upsert(rule.clone())?;
        self.storage.recurring.save()?;
        self.storage.log_create(
            EntityType::Recurring,
            rule.id.to_string(),
            Some(label(&rule)),
            &rule,
        )?;

        Ok(rule)
    }

    pub fn get(&self, id: RecurringId) -> MoneyNoteResult<Option<RecurringTransaction>> {
        self.storage.recurring.get(id)
    }

    pub fn find(&self, identifier: &str) -> MoneyNoteResult<Option<RecurringTransaction>> {
        self.storage.recurring.resolve(identifier)
    }

    /// Rules in listing order (active first, soonest first)
    pub fn list(&self, include_inactive: bool) -> MoneyNoteResult<Vec<RecurringTransaction>> {
        if include_inactive {
            self.storage.recurring.get_all()
        } else {
            self.storage.recurring.get_active()
        }
    }

    pub fn update(
        &self,
        id: RecurringId,
        update: RecurringUpdate,
    ) -> MoneyNoteResult<Option<RecurringTransaction>> {
        let Some(before) = self.storage.recurring.get(id)? else {
            tracing::warn!(%id, "update skipped: recurring transaction not found");
            return Ok(None);
        };
        let mut rule = before.clone();

        if let Some(amount) = update.amount {
            rule.amount = amount;
        }
        if let Some(description) = update.description {
            rule.description = description.trim().to_string();
        }
        if let Some(category_id) = update.category_id {
            if category_id != rule.category_id && update.subcategory_id.is_none() {
                rule.subcategory_id = None;
            }
            rule.category_id = category_id;
        }
        if let Some(subcategory_id) = update.subcategory_id {
            rule.subcategory_id = subcategory_id;
        }
        if let Some(method) = update.payment_method {
            rule.payment_method = method;
        }
        if let Some(tags) = update.tags {
            rule.tags = tags;
        }
        if let Some(is_fixed) = update.is_fixed {
            rule.is_fixed = is_fixed;
        }
        if let Some(source) = update.source {
            rule.source = source.trim().to_string();
        }
        if let Some(frequency) = update.frequency {
            rule.frequency = frequency;
        }
        if let Some(interval) = update.interval {
            rule.interval = interval;
        }
        if let Some(start_date) = update.start_date {
            rule.start_date = start_date;
        }
        if let Some(end_date) = update.end_date {
            rule.end_date = end_date;
        }

        self.check(&rule)?;
        let schedule_changed = rule.frequency != before.frequency
            || rule.interval != before.interval
            || rule.start_date != before.start_date;
        if schedule_changed {
            rule.active = true;
            rule.reschedule();
            rule.active = rule.active && before.active;
        } else if rule.end_date != before.end_date {
            rule.apply_end_date();
        }
        rule.updated_at = Utc::now();

        self.save_updated(&before, &rule)?;
        Ok(Some(rule))
    }

    /// Delete a rule. Records it already generated are kept.
    pub fn delete(&self, id: RecurringId) -> MoneyNoteResult<bool> {
        let Some(rule) = self.storage.recurring.delete(id)? else {
            tracing::warn!(%id, "delete skipped: recurring transaction not found");
            return Ok(false);
        };
        self.storage.recurring.save()?;
        self.storage.log_delete(
            EntityType::Recurring,
            rule.id.to_string(),
            Some(label(&rule)),
            &rule,
        )?;
        Ok(true)
    }

    pub fn pause(&self, id: RecurringId) -> MoneyNoteResult<Option<RecurringTransaction>> {
        self.change_state(id, "pause", |rule| {
            rule.pause();
            Ok(())
        })
    }

    /// Resume a paused rule; occurrences that fell before `today` while it
    /// was paused are skipped
    pub fn resume(
        &self,
        id: RecurringId,
        today: NaiveDate,
    ) -> MoneyNoteResult<Option<RecurringTransaction>> {
        self.change_state(id, "resume", |rule| {
            if rule.is_finished() {
                return Err(MoneyNoteError::Recurring(format!(
                    "'{}' has passed its end date",
                    label(rule)
                )));
            }
            rule.resume(today);
            Ok(())
        })
    }

    /// Advance past the next occurrence without generating it
    pub fn skip_next(&self, id: RecurringId) -> MoneyNoteResult<Option<RecurringTransaction>> {
        self.change_state(id, "skip", |rule| {
            if !rule.active {
                return Err(MoneyNoteError::Recurring(format!(
                    "'{}' is not active",
                    label(rule)
                )));
            }
            rule.skip();
            Ok(())
        })
    }

    /// Generate the next occurrence now, dated `today`, and advance the
    /// schedule past it
    pub fn run_now(
        &self,
        id: RecurringId,
        today: NaiveDate,
    ) -> MoneyNoteResult<Option<GeneratedRecord>> {
        let Some(before) = self.storage.recurring.get(id)? else {
            tracing::warn!(%id, "run skipped: recurring transaction not found");
            return Ok(None);
        };
        if !before.active {
            return Err(MoneyNoteError::Recurring(format!(
                "'{}' is not active",
                label(&before)
            )));
        }

        let mut rule = before.clone();
        let record = self.generate(&rule, today)?;
        rule.mark_executed();
        self.save_updated(&before, &rule)?;

        Ok(Some(record))
    }

    /// Generate every due occurrence of every active rule up to `today`
    pub fn process_due(&self, today: NaiveDate) -> MoneyNoteResult<ProcessReport> {
        let mut report = ProcessReport::default();

        for before in self.storage.recurring.get_active()? {
            let due = before.due_dates(today);
            if due.is_empty() {
                continue;
            }

            let mut rule = before.clone();
            for date in due {
                match self.generate_once(&rule, date) {
                    Ok(Some(record)) => report.generated.push((rule.id, record)),
                    Ok(None) => {
                        tracing::debug!(id = %rule.id, %date, "occurrence already recorded");
                    }
                    Err(e) => {
                        tracing::warn!(id = %rule.id, %date, error = %e, "recurring occurrence failed");
                        report.failed.push((rule.id, e.to_string()));
                        break;
                    }
                }
                rule.mark_executed();
            }

            if rule != before {
                if !rule.active {
                    report.finished.push(rule.id);
                }
                self.save_updated(&before, &rule)?;
            }
        }

        if !report.generated.is_empty() {
            tracing::info!(
                generated = report.generated.len(),
                failed = report.failed.len(),
                "recurring transactions processed"
            );
        }
        Ok(report)
    }

    /// Occurrences of active rules within `from..=from + days`, soonest first
    pub fn upcoming(&self, from: NaiveDate, days: u64) -> MoneyNoteResult<Vec<UpcomingOccurrence>> {
        let to = from.checked_add_days(Days::new(days)).unwrap_or(NaiveDate::MAX);

        let mut upcoming: Vec<UpcomingOccurrence> = self
            .storage
            .recurring
            .get_active()?
            .into_iter()
            .flat_map(|rule| {
                rule.occurrences_between(from, to)
                    .into_iter()
                    .map(|date| UpcomingOccurrence {
                        recurring_id: rule.id,
                        date,
                        kind: rule.kind,
                        amount: rule.amount,
                        description: label(&rule),
                    })
                    .collect::<Vec<_>>()
            })
            .collect();
        upcoming.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.description.cmp(&b.description)));
        Ok(upcoming)
    }

    /// Generate the occurrence on `date` unless a record for it exists
    fn generate_once(
        &self,
        rule: &RecurringTransaction,
        date: NaiveDate,
    ) -> MoneyNoteResult<Option<GeneratedRecord>> {
        let exists = match rule.kind {
            TransactionKind::Expense => self.storage.expenses.exists_for_recurring(rule.id, date)?,
            TransactionKind::Income => self.storage.incomes.exists_for_recurring(rule.id, date)?,
        };
        if exists {
            return Ok(None);
        }
        self.generate(rule, date).map(Some)
    }

    fn generate(
        &self,
        rule: &RecurringTransaction,
        date: NaiveDate,
    ) -> MoneyNoteResult<GeneratedRecord> {
        match rule.kind {
            TransactionKind::Expense => {
                let category_id = rule.category_id.ok_or_else(|| {
                    MoneyNoteError::Recurring(format!("'{}' has no category", label(rule)))
                })?;
                let mut expense = Expense::new(rule.amount, date, category_id);
                expense.subcategory_id = rule.subcategory_id;
                expense.description = rule.description.clone();
                expense.payment_method = rule.payment_method;
                expense.tags = rule.tags.clone();
                expense.is_fixed = rule.is_fixed;
                expense.recurring_id = Some(rule.id);
                ExpenseService::new(self.storage)
                    .insert(expense)
                    .map(GeneratedRecord::Expense)
            }
            TransactionKind::Income => {
                let mut income = Income::new(rule.amount, date, rule.source.clone());
                income.description = rule.description.clone();
                income.category_id = rule.category_id;
                income.recurring_id = Some(rule.id);
                IncomeService::new(self.storage)
                    .insert(income)
                    .map(GeneratedRecord::Income)
            }
        }
    }

    fn change_state<F>(
        &self,
        id: RecurringId,
        action: &str,
        change: F,
    ) -> MoneyNoteResult<Option<RecurringTransaction>>
    where
        F: FnOnce(&mut RecurringTransaction) -> MoneyNoteResult<()>,
    {
        let Some(before) = self.storage.recurring.get(id)? else {
            tracing::warn!(%id, action, "skipped: recurring transaction not found");
            return Ok(None);
        };
        let mut rule = before.clone();
        change(&mut rule)?;
        self.save_updated(&before, &rule)?;
        Ok(Some(rule))
    }

    fn save_updated(
        &self,
        before: &RecurringTransaction,
        after: &RecurringTransaction,
    ) -> MoneyNoteResult<()> {
        self.storage.recurring.upsert(after.clone())?;
        self.storage.recurring.save()?;
        self.storage.log_update(
            EntityType::Recurring,
            after.id.to_string(),
            Some(label(after)),
            before,
            after,
        )
    }

    fn check(&self, rule: &RecurringTransaction) -> MoneyNoteResult<()> {
        rule.validate()
            .map_err(|e| MoneyNoteError::Validation(e.to_string()))?;

        let expected = match rule.kind {
            TransactionKind::Expense => CategoryKind::Expense,
            TransactionKind::Income => CategoryKind::Income,
        };
        if let Some(category_id) = rule.category_id {
            let category = self
                .storage
                .categories
                .get(category_id)?
                .ok_or_else(|| MoneyNoteError::category_not_found(category_id.to_string()))?;
            if category.kind != expected {
                return Err(MoneyNoteError::Validation(format!(
                    "category: '{}' is not an {} category",
                    category.name,
                    expected.to_string().to_lowercase()
                )));
            }
            if let Some(sub_id) = rule.subcategory_id {
                if category.subcategory(sub_id).is_none() {
                    return Err(MoneyNoteError::Validation(format!(
                        "subcategory: {} does not belong to '{}'",
                        sub_id, category.name
                    )));
                }
            }
        }
        for tag_id in &rule.tags {
            if !self.storage.tags.contains(*tag_id)? {
                return Err(MoneyNoteError::tag_not_found(tag_id.to_string()));
            }
        }
        Ok(())
    }
}

/// Display label: the description, falling back to source or frequency
pub fn label(rule: &RecurringTransaction) -> String {
    if !rule.description.is_empty() {
        rule.description.clone()
    } else if !rule.source.is_empty() {
        rule.source.clone()
    } else {
        format!("{} {}", rule.frequency, rule.kind).to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::MoneyNotePaths;
    use crate::models::Category;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = MoneyNotePaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::open(paths).unwrap();
        (temp_dir, storage)
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn rent_rule(storage: &Storage, start: NaiveDate) -> RecurringTransaction {
        let housing = Category::new("Housing");
        storage.categories.upsert(housing.clone()).unwrap();
        let mut input = CreateRecurringInput::new(
            TransactionKind::Expense,
            Money::from_cents(120000),
            Frequency::Monthly,
            start,
        );
        input.category_id = Some(housing.id);
        input.description = "Rent".into();
        RecurringService::new(storage).create(input).unwrap()
    }

    #[test]
    fn test_create_validates_references() {
        let (_temp, storage) = create_test_storage();
        let service = RecurringService::new(&storage);

        let no_category = CreateRecurringInput::new(
            TransactionKind::Expense,
            Money::from_cents(100),
            Frequency::Monthly,
            d(2025, 1, 1),
        );
        assert!(service.create(no_category.clone()).unwrap_err().is_validation());

        let mut missing = no_category;
        missing.category_id = Some(CategoryId::new());
        assert!(service.create(missing).unwrap_err().is_not_found());

        let mut salary = CreateRecurringInput::new(
            TransactionKind::Income,
            Money::from_cents(300000),
            Frequency::Monthly,
            d(2025, 1, 31),
        );
        salary.source = "Acme".into();
        let rule = service.create(salary).unwrap();
        assert_eq!(rule.next_date, d(2025, 1, 31));
    }

    #[test]
    fn test_process_due_catches_up_and_is_idempotent() {
        let (_temp, storage) = create_test_storage();
        let rule = rent_rule(&storage, d(2025, 1, 31));
        let service = RecurringService::new(&storage);

        let report = service.process_due(d(2025, 4, 15)).unwrap();
        let dates: Vec<_> = report.generated.iter().map(|(_, r)| r.date()).collect();
        assert_eq!(dates, vec![d(2025, 1, 31), d(2025, 2, 28), d(2025, 3, 31)]);
        assert_eq!(report.expense_total().cents(), 360000);

        let updated = service.get(rule.id).unwrap().unwrap();
        assert_eq!(updated.execution_count, 3);
        assert_eq!(updated.next_date, d(2025, 4, 30));
        assert_eq!(updated.last_executed, Some(d(2025, 3, 31)));

        let again = service.process_due(d(2025, 4, 15)).unwrap();
        assert!(again.is_empty());
        assert_eq!(storage.expenses.count().unwrap(), 3);
        assert!(storage
            .expenses
            .get_all()
            .unwrap()
            .iter()
            .all(|e| e.recurring_id == Some(rule.id) && e.is_fixed));
    }

    #[test]
    fn test_process_due_stops_at_end_date() {
        let (_temp, storage) = create_test_storage();
        let rule = rent_rule(&storage, d(2025, 1, 1));
        let service = RecurringService::new(&storage);
        service
            .update(
                rule.id,
                RecurringUpdate {
                    end_date: Some(Some(d(2025, 2, 15))),
                    ..Default::default()
                },
            )
            .unwrap();

        let report = service.process_due(d(2025, 12, 31)).unwrap();
        assert_eq!(report.generated.len(), 2);
        assert_eq!(report.finished, vec![rule.id]);
        assert!(!service.get(rule.id).unwrap().unwrap().active);
    }

    #[test]
    fn test_process_due_reports_broken_rule() {
        let (_temp, storage) = create_test_storage();
        let rule = rent_rule(&storage, d(2025, 1, 1));
        storage.categories.delete(rule.category_id.unwrap()).unwrap();
        let service = RecurringService::new(&storage);

        let report = service.process_due(d(2025, 3, 1)).unwrap();
        assert!(report.generated.is_empty());
        assert_eq!(report.failed.len(), 1);
        let unchanged = service.get(rule.id).unwrap().unwrap();
        assert_eq!(unchanged.execution_count, 0);
        assert_eq!(unchanged.next_date, d(2025, 1, 1));
    }

    #[test]
    fn test_income_rule_generates_income() {
        let (_temp, storage) = create_test_storage();
        let service = RecurringService::new(&storage);
        let mut input = CreateRecurringInput::new(
            TransactionKind::Income,
            Money::from_cents(250000),
            Frequency::Weekly,
            d(2025, 1, 3),
        );
        input.source = "Acme".into();
        input.interval = 2;
        service.create(input).unwrap();

        let report = service.process_due(d(2025, 2, 1)).unwrap();
        let dates: Vec<_> = report.generated.iter().map(|(_, r)| r.date()).collect();
        assert_eq!(dates, vec![d(2025, 1, 3), d(2025, 1, 17), d(2025, 1, 31)]);
        assert_eq!(storage.incomes.count().unwrap(), 3);
        assert_eq!(report.income_total().cents(), 750000);
    }

    #[test]
    fn test_skip_pause_resume() {
        let (_temp, storage) = create_test_storage();
        let rule = rent_rule(&storage, d(2025, 1, 10));
        let service = RecurringService::new(&storage);

        let skipped = service.skip_next(rule.id).unwrap().unwrap();
        assert_eq!(skipped.next_date, d(2025, 2, 10));
        assert_eq!(skipped.execution_count, 0);

        service.pause(rule.id).unwrap();
        assert!(service.skip_next(rule.id).is_err());
        assert!(service.process_due(d(2025, 6, 1)).unwrap().is_empty());

        let resumed = service.resume(rule.id, d(2025, 5, 1)).unwrap().unwrap();
        assert!(resumed.active);
        assert_eq!(resumed.next_date, d(2025, 5, 10));
        assert!(service.pause(RecurringId::new()).unwrap().is_none());
    }

    #[test]
    fn test_run_now() {
        let (_temp, storage) = create_test_storage();
        let rule = rent_rule(&storage, d(2025, 3, 1));
        let service = RecurringService::new(&storage);

        let record = service.run_now(rule.id, d(2025, 2, 20)).unwrap().unwrap();
        assert_eq!(record.date(), d(2025, 2, 20));
        let updated = service.get(rule.id).unwrap().unwrap();
        assert_eq!(updated.execution_count, 1);
        assert_eq!(updated.next_date, d(2025, 4, 1));
    }

    #[test]
    fn test_update_reschedules() {
        let (_temp, storage) = create_test_storage();
        let rule = rent_rule(&storage, d(2025, 1, 10));
        let service = RecurringService::new(&storage);
        service.process_due(d(2025, 2, 15)).unwrap();

        let updated = service
            .update(
                rule.id,
                RecurringUpdate {
                    frequency: Some(Frequency::Weekly),
                    amount: Some(Money::from_cents(30000)),
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();
        assert_eq!(updated.next_date, d(2025, 2, 14));
        assert_eq!(updated.amount.cents(), 30000);
        assert!(updated.active);
    }

    #[test]
    fn test_end_date_edit_keeps_resumed_schedule() {
        let (_temp, storage) = create_test_storage();
        let rule = rent_rule(&storage, d(2025, 1, 10));
        let service = RecurringService::new(&storage);
        service.process_due(d(2025, 1, 15)).unwrap();
        service.pause(rule.id).unwrap();
        let resumed = service.resume(rule.id, d(2025, 6, 1)).unwrap().unwrap();
        assert_eq!(resumed.next_date, d(2025, 6, 10));

        let edited = service
            .update(
                rule.id,
                RecurringUpdate {
                    end_date: Some(Some(d(2026, 12, 31))),
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();
        assert_eq!(edited.next_date, d(2025, 6, 10));
        assert!(service.process_due(d(2025, 6, 1)).unwrap().is_empty());
    }

    #[test]
    fn test_end_date_edit_keeps_skip() {
        let (_temp, storage) = create_test_storage();
        let rule = rent_rule(&storage, d(2025, 1, 10));
        let service = RecurringService::new(&storage);
        service.skip_next(rule.id).unwrap();

        let edited = service
            .update(
                rule.id,
                RecurringUpdate {
                    end_date: Some(Some(d(2025, 12, 31))),
                    // Same value as before; not a schedule change
                    frequency: Some(Frequency::Monthly),
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();
        assert_eq!(edited.next_date, d(2025, 2, 10));

        let report = service.process_due(d(2025, 2, 20)).unwrap();
        let dates: Vec<_> = report.generated.iter().map(|(_, r)| r.date()).collect();
        assert_eq!(dates, vec![d(2025, 2, 10)]);
    }

    #[test]
    fn test_upcoming() {
        let (_temp, storage) = create_test_storage();
        rent_rule(&storage, d(2025, 1, 5));
        let service = RecurringService::new(&storage);

        let upcoming = service.upcoming(d(2025, 1, 1), 60).unwrap();
        let dates: Vec<_> = upcoming.iter().map(|u| u.date).collect();
        assert_eq!(dates, vec![d(2025, 1, 5), d(2025, 2, 5)]);
        assert_eq!(upcoming[0].description, "Rent");
        // Projection doesn't generate anything
        assert_eq!(storage.expenses.count().unwrap(), 0);
    }

    #[test]
    fn test_delete_missing() {
        let (_temp, storage) = create_test_storage();
        rent_rule(&storage, d(2025, 1, 5));
        let service = RecurringService::new(&storage);
        assert!(!service.delete(RecurringId::new()).unwrap());
        assert_eq!(storage.recurring.count().unwrap(), 1);
    }
}
