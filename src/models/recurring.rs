//! Recurring transaction model
//!
//! A recurring transaction is a rule that generates dated expenses or
//! incomes on a schedule. Occurrence dates are always projected from the
//! start date (`start + n * interval periods`), so a rule starting on the
//! 31st lands on the last day of shorter months without drifting.

use chrono::{DateTime, Days, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::expense::{validate_amount, validate_description, PaymentMethod, TransactionValidationError};
use super::ids::{CategoryId, RecurringId, SubcategoryId, TagId};
use super::money::Money;

/// Upper bound on occurrences generated or projected in one pass
pub const MAX_OCCURRENCES_PER_RUN: usize = 1000;

/// Whether the rule produces expenses or incomes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    #[default]
    Expense,
    Income,
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Expense => write!(f, "Expense"),
            Self::Income => write!(f, "Income"),
        }
    }
}

impl std::str::FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "expense" => Ok(Self::Expense),
            "income" => Ok(Self::Income),
            other => Err(format!("Unknown kind '{}' (expected expense or income)", other)),
        }
    }
}

/// How often a rule repeats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Daily,
    Weekly,
    #[default]
    Monthly,
    Yearly,
}

impl Frequency {
    /// The `n`th occurrence of a schedule starting at `start` that repeats
    /// every `interval` periods. Returns None on calendar overflow.
    pub fn occurrence(&self, start: NaiveDate, interval: u32, n: u32) -> Option<NaiveDate> {
        let steps = n.checked_mul(interval)?;
        match self {
            Self::Daily => start.checked_add_days(Days::new(u64::from(steps))),
            Self::Weekly => start.checked_add_days(Days::new(u64::from(steps) * 7)),
            Self::Monthly => start.checked_add_months(Months::new(steps)),
            Self::Yearly => start.checked_add_months(Months::new(steps.checked_mul(12)?)),
        }
    }

    /// Approximate number of occurrences per year, for normalizing amounts
    pub fn per_year(&self) -> f64 {
        match self {
            Self::Daily => 365.0,
            Self::Weekly => 52.0,
            Self::Monthly => 12.0,
            Self::Yearly => 1.0,
        }
    }

    pub fn describe(&self, interval: u32) -> String {
        let unit = match self {
            Self::Daily => "day",
            Self::Weekly => "week",
            Self::Monthly => "month",
            Self::Yearly => "year",
        };
        if interval <= 1 {
            format!("Every {}", unit)
        } else {
            format!("Every {} {}s", interval, unit)
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Daily => write!(f, "Daily"),
            Self::Weekly => write!(f, "Weekly"),
            Self::Monthly => write!(f, "Monthly"),
            Self::Yearly => write!(f, "Yearly"),
        }
    }
}

impl std::str::FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" | "day" => Ok(Self::Daily),
            "weekly" | "week" => Ok(Self::Weekly),
            "monthly" | "month" => Ok(Self::Monthly),
            "yearly" | "year" | "annual" | "annually" => Ok(Self::Yearly),
            other => Err(format!(
                "Unknown frequency '{}' (expected daily, weekly, monthly or yearly)",
                other
            )),
        }
    }
}

fn default_interval() -> u32 {
    1
}

fn default_active() -> bool {
    true
}

/// A scheduled income or expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringTransaction {
    pub id: RecurringId,
    pub kind: TransactionKind,
    pub amount: Money,
    #[serde(default)]
    pub description: String,

    /// Required for expenses, optional for income
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory_id: Option<SubcategoryId>,

    /// Expense only
    #[serde(default)]
    pub payment_method: PaymentMethod,
    /// Expense only
    #[serde(default)]
    pub tags: Vec<TagId>,
    /// Expense only
    #[serde(default)]
    pub is_fixed: bool,

    /// Income only
    #[serde(default)]
    pub source: String,

    pub frequency: Frequency,
    #[serde(default = "default_interval")]
    pub interval: u32,
    pub start_date: NaiveDate,
    pub next_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,

    #[serde(default = "default_active")]
    pub active: bool,

    /// Number of records generated so far
    #[serde(default)]
    pub execution_count: u32,

    /// Occurrences consumed so far, executed or skipped; `next_date` is
    /// always the occurrence at this index
    #[serde(default)]
    pub occurrence_index: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_executed: Option<NaiveDate>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RecurringTransaction {
    pub fn new(
        kind: TransactionKind,
        amount: Money,
        frequency: Frequency,
        start_date: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: RecurringId::new(),
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
            next_date: start_date,
            end_date: None,
            active: true,
            execution_count: 0,
            occurrence_index: 0,
            last_executed: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// The `n`th occurrence date of this schedule
    pub fn occurrence(&self, n: u32) -> Option<NaiveDate> {
        self.frequency
            .occurrence(self.start_date, self.interval.max(1), n)
    }

    fn within_end(&self, date: NaiveDate) -> bool {
        self.end_date.map_or(true, |end| date <= end)
    }

    /// Whether an occurrence is due on or before `today`
    pub fn is_due(&self, today: NaiveDate) -> bool {
        self.active && self.next_date <= today && self.within_end(self.next_date)
    }

    /// Whether the schedule has run past its end date
    pub fn is_finished(&self) -> bool {
        !self.within_end(self.next_date)
    }

    /// Move to the next occurrence. Deactivates the rule once the end date
    /// has passed or the calendar overflows.
    fn step(&mut self) {
        self.occurrence_index = self.occurrence_index.saturating_add(1);
        match self.occurrence(self.occurrence_index) {
            Some(next) => {
                self.next_date = next;
                if self.is_finished() {
                    self.active = false;
                }
            }
            None => self.active = false,
        }
        self.updated_at = Utc::now();
    }

    /// Record that the occurrence at `next_date` was generated
    pub fn mark_executed(&mut self) {
        self.last_executed = Some(self.next_date);
        self.execution_count = self.execution_count.saturating_add(1);
        self.step();
    }

    /// Skip the occurrence at `next_date` without generating anything
    pub fn skip(&mut self) {
        self.step();
    }

    /// Dates that are due on or before `today`, oldest first, without
    /// mutating the rule
    pub fn due_dates(&self, today: NaiveDate) -> Vec<NaiveDate> {
        let mut probe = self.clone();
        let mut dates = Vec::new();
        while probe.is_due(today) && dates.len() < MAX_OCCURRENCES_PER_RUN {
            dates.push(probe.next_date);
            probe.step();
        }
        dates
    }

    /// Projected occurrences within `from..=to`
    pub fn occurrences_between(&self, from: NaiveDate, to: NaiveDate) -> Vec<NaiveDate> {
        let mut dates = Vec::new();
        if !self.active {
            return dates;
        }

        let mut index = self.occurrence_index;
        while dates.len() < MAX_OCCURRENCES_PER_RUN {
            let Some(date) = self.occurrence(index) else {
                break;
            };
            if date > to || !self.within_end(date) {
                break;
            }
            if date >= from {
                dates.push(date);
            }
            index = index.saturating_add(1);
        }
        dates
    }

    /// Pause the rule
    pub fn pause(&mut self) {
        self.active = false;
        self.updated_at = Utc::now();
    }

    /// Resume the rule; occurrences missed while paused before `today` are
    /// skipped rather than back-filled
    pub fn resume(&mut self, today: NaiveDate) {
        self.active = true;
        let mut guard = 0;
        while self.active && self.next_date < today && guard < MAX_OCCURRENCES_PER_RUN {
            self.step();
            guard += 1;
        }
        if self.is_finished() {
            self.active = false;
        }
        self.updated_at = Utc::now();
    }

    /// Recompute `next_date` after the schedule (start, frequency, interval)
    /// changed: the next occurrence is the first one after the last executed
    /// date, or the start date when nothing ran yet. When occurrences were
    /// skipped, the new date never falls before the pending one.
    pub fn reschedule(&mut self) {
        let floor = (self.occurrence_index > self.execution_count).then_some(self.next_date);
        let consumed = |date: NaiveDate| {
            self.last_executed.is_some_and(|last| date <= last)
                || floor.is_some_and(|floor| date < floor)
        };

        let mut index = 0;
        while let Some(date) = self.occurrence(index) {
            if !consumed(date) || index as usize >= MAX_OCCURRENCES_PER_RUN * 100 {
                break;
            }
            index += 1;
        }
        self.occurrence_index = index;
        self.next_date = self.occurrence(index).unwrap_or(self.start_date);
        if self.is_finished() {
            self.active = false;
        }
        self.updated_at = Utc::now();
    }

    /// Re-check the end date after it was edited. Only `active` can change.
    pub fn apply_end_date(&mut self) {
        if self.is_finished() {
            self.active = false;
        }
        self.updated_at = Utc::now();
    }

    /// Amount normalized to a monthly figure
    pub fn monthly_equivalent(&self) -> Money {
        let per_year = self.frequency.per_year() / f64::from(self.interval.max(1));
        Money::from_cents((self.amount.cents() as f64 * per_year / 12.0).round() as i64)
    }

    pub fn validate(&self) -> Result<(), RecurringValidationError> {
        validate_amount(self.amount).map_err(RecurringValidationError::Field)?;
        validate_description(&self.description).map_err(RecurringValidationError::Field)?;

        if self.interval == 0 {
            return Err(RecurringValidationError::ZeroInterval);
        }
        if let Some(end) = self.end_date {
            if end < self.start_date {
                return Err(RecurringValidationError::EndBeforeStart);
            }
        }
        match self.kind {
            TransactionKind::Expense if self.category_id.is_none() => {
                Err(RecurringValidationError::MissingCategory)
            }
            TransactionKind::Income if self.source.trim().is_empty() => {
                Err(RecurringValidationError::Field(TransactionValidationError::EmptySource))
            }
            _ => Ok(()),
        }
    }
}

/// Validation errors for recurring transactions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecurringValidationError {
    Field(TransactionValidationError),
    ZeroInterval,
    EndBeforeStart,
    MissingCategory,
}

impl fmt::Display for RecurringValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(e) => write!(f, "{}", e),
            Self::ZeroInterval => write!(f, "interval: must be at least 1"),
            Self::EndBeforeStart => write!(f, "end date: must not be before the start date"),
            Self::MissingCategory => write!(f, "category: required for recurring expenses"),
        }
    }
}

impl std::error::Error for RecurringValidationError {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn monthly_rent(start: NaiveDate) -> RecurringTransaction {
        let mut rule = RecurringTransaction::new(
            TransactionKind::Expense,
            Money::from_cents(120000),
            Frequency::Monthly,
            start,
        );
        rule.category_id = Some(CategoryId::new());
        rule
    }

    #[test]
    fn test_monthly_occurrence_clamps_short_months() {
        let start = d(2025, 1, 31);
        let f = Frequency::Monthly;
        assert_eq!(f.occurrence(start, 1, 0), Some(d(2025, 1, 31)));
        assert_eq!(f.occurrence(start, 1, 1), Some(d(2025, 2, 28)));
        assert_eq!(f.occurrence(start, 1, 2), Some(d(2025, 3, 31)));
        assert_eq!(f.occurrence(start, 1, 3), Some(d(2025, 4, 30)));
        assert_eq!(f.occurrence(d(2024, 1, 31), 1, 1), Some(d(2024, 2, 29)));
    }

    #[test]
    fn test_nth_monthly_occurrence_is_n_months_later() {
        let start = d(2025, 3, 15);
        for n in 0..24 {
            let date = Frequency::Monthly.occurrence(start, 1, n).unwrap();
            let months = (date.year() - 2025) * 12 + date.month0() as i32 - 2;
            assert_eq!(months, n as i32);
            assert_eq!(date.day(), 15);
        }
    }

    #[test]
    fn test_other_frequencies() {
        let start = d(2024, 2, 29);
        assert_eq!(Frequency::Daily.occurrence(start, 1, 1), Some(d(2024, 3, 1)));
        assert_eq!(Frequency::Weekly.occurrence(start, 2, 1), Some(d(2024, 3, 14)));
        assert_eq!(Frequency::Yearly.occurrence(start, 1, 1), Some(d(2025, 2, 28)));
        assert_eq!(Frequency::Yearly.occurrence(start, 1, 4), Some(d(2028, 2, 29)));
        assert_eq!(Frequency::Monthly.occurrence(start, 3, 1), Some(d(2024, 5, 29)));
    }

    #[test]
    fn test_due_dates_catch_up() {
        let rule = monthly_rent(d(2025, 1, 31));
        let due = rule.due_dates(d(2025, 4, 15));
        assert_eq!(due, vec![d(2025, 1, 31), d(2025, 2, 28), d(2025, 3, 31)]);
        assert!(rule.due_dates(d(2025, 1, 30)).is_empty());
    }

    #[test]
    fn test_mark_executed_advances() {
        let mut rule = monthly_rent(d(2025, 1, 31));
        rule.mark_executed();
        assert_eq!(rule.execution_count, 1);
        assert_eq!(rule.last_executed, Some(d(2025, 1, 31)));
        assert_eq!(rule.next_date, d(2025, 2, 28));
        rule.mark_executed();
        assert_eq!(rule.next_date, d(2025, 3, 31));
    }

    #[test]
    fn test_end_date_deactivates() {
        let mut rule = monthly_rent(d(2025, 1, 1));
        rule.end_date = Some(d(2025, 2, 15));

        assert_eq!(rule.due_dates(d(2025, 12, 31)), vec![d(2025, 1, 1), d(2025, 2, 1)]);

        rule.mark_executed();
        assert!(rule.active);
        rule.mark_executed();
        assert!(!rule.active);
        assert!(!rule.is_due(d(2025, 12, 31)));
    }

    #[test]
    fn test_skip_does_not_count_execution() {
        let mut rule = monthly_rent(d(2025, 1, 10));
        rule.skip();
        assert_eq!(rule.execution_count, 0);
        assert_eq!(rule.next_date, d(2025, 2, 10));
        assert!(rule.last_executed.is_none());
    }

    #[test]
    fn test_resume_skips_missed_occurrences() {
        let mut rule = monthly_rent(d(2025, 1, 10));
        rule.pause();
        assert!(!rule.is_due(d(2025, 6, 1)));

        rule.resume(d(2025, 4, 20));
        assert!(rule.active);
        assert_eq!(rule.next_date, d(2025, 5, 10));
        assert_eq!(rule.execution_count, 0);
    }

    #[test]
    fn test_occurrences_between() {
        let mut rule = monthly_rent(d(2025, 1, 5));
        rule.mark_executed();
        let dates = rule.occurrences_between(d(2025, 1, 1), d(2025, 4, 30));
        assert_eq!(dates, vec![d(2025, 2, 5), d(2025, 3, 5), d(2025, 4, 5)]);

        rule.pause();
        assert!(rule.occurrences_between(d(2025, 1, 1), d(2025, 4, 30)).is_empty());
    }

    #[test]
    fn test_reschedule_after_change() {
        let mut rule = monthly_rent(d(2025, 1, 10));
        rule.mark_executed();
        rule.mark_executed();
        assert_eq!(rule.last_executed, Some(d(2025, 2, 10)));

        rule.frequency = Frequency::Weekly;
        rule.reschedule();
        assert_eq!(rule.next_date, d(2025, 2, 14));
    }

    #[test]
    fn test_reschedule_keeps_skipped_occurrences() {
        let mut rule = monthly_rent(d(2025, 1, 10));
        rule.mark_executed();
        rule.pause();
        rule.resume(d(2025, 6, 1));
        assert_eq!(rule.next_date, d(2025, 6, 10));

        rule.frequency = Frequency::Weekly;
        rule.reschedule();
        assert_eq!(rule.next_date, d(2025, 6, 13));
        assert!(rule.due_dates(d(2025, 6, 1)).is_empty());
    }

    #[test]
    fn test_end_date_edit_only_touches_active() {
        let mut rule = monthly_rent(d(2025, 1, 10));
        rule.skip();
        rule.end_date = Some(d(2026, 12, 31));
        rule.apply_end_date();
        assert_eq!(rule.next_date, d(2025, 2, 10));
        assert!(rule.active);

        rule.end_date = Some(d(2025, 1, 31));
        rule.apply_end_date();
        assert!(rule.is_finished());
        assert!(!rule.active);
    }

    #[test]
    fn test_monthly_equivalent() {
        let mut rule = monthly_rent(d(2025, 1, 1));
        rule.amount = Money::from_cents(120000);
        rule.frequency = Frequency::Yearly;
        assert_eq!(rule.monthly_equivalent().cents(), 10000);
    }

    #[test]
    fn test_validation() {
        let mut rule = monthly_rent(d(2025, 1, 1));
        assert!(rule.validate().is_ok());

        rule.interval = 0;
        assert_eq!(rule.validate(), Err(RecurringValidationError::ZeroInterval));

        rule.interval = 1;
        rule.end_date = Some(d(2024, 12, 31));
        assert_eq!(rule.validate(), Err(RecurringValidationError::EndBeforeStart));

        rule.end_date = None;
        rule.category_id = None;
        assert_eq!(rule.validate(), Err(RecurringValidationError::MissingCategory));

        let income = RecurringTransaction::new(
            TransactionKind::Income,
            Money::from_cents(100),
            Frequency::Monthly,
            d(2025, 1, 1),
        );
        assert!(matches!(
            income.validate(),
            Err(RecurringValidationError::Field(TransactionValidationError::EmptySource))
        ));
    }
}
