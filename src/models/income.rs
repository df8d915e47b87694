//! Income model
//!
//! Records money received: salary, freelance payments, refunds and so on.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::expense::{validate_amount, validate_description, TransactionValidationError};
use super::ids::{CategoryId, IncomeId, RecurringId};
use super::money::Money;

/// A recorded income
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Income {
    pub id: IncomeId,
    pub amount: Money,
    pub date: NaiveDate,
    /// Who paid (employer, client, ...)
    pub source: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring_id: Option<RecurringId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Income {
    pub fn new(amount: Money, date: NaiveDate, source: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: IncomeId::new(),
            amount,
            date,
            source: source.into(),
            description: String::new(),
            category_id: None,
            recurring_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn validate(&self) -> Result<(), TransactionValidationError> {
        validate_amount(self.amount)?;
        if self.source.trim().is_empty() {
            return Err(TransactionValidationError::EmptySource);
        }
        validate_description(&self.description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_income() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        let income = Income::new(Money::from_cents(350000), date, "Acme Corp");

        assert_eq!(income.source, "Acme Corp");
        assert!(income.category_id.is_none());
        assert!(income.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 31).unwrap();
        let mut income = Income::new(Money::from_cents(-1), date, "Acme");
        assert_eq!(
            income.validate(),
            Err(TransactionValidationError::NonPositiveAmount)
        );

        income.amount = Money::from_cents(100);
        income.source = "   ".into();
        assert_eq!(income.validate(), Err(TransactionValidationError::EmptySource));
    }
}
