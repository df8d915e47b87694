//! Quick-entry templates
//!
//! A template is a saved partial expense or income. Applying it fills in a
//! new record; anything the template leaves open (amount, date) comes from
//! the caller.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::category::MAX_NAME_LEN;
use super::expense::{
    validate_amount, validate_description, Expense, PaymentMethod, TransactionValidationError,
};
use super::ids::{CategoryId, SubcategoryId, TagId, TemplateId};
use super::income::Income;
use super::money::Money;
use super::recurring::TransactionKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Template {
    pub id: TemplateId,
    pub name: String,
    pub kind: TransactionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory_id: Option<SubcategoryId>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub tags: Vec<TagId>,
    #[serde(default)]
    pub is_fixed: bool,
    #[serde(default)]
    pub usage_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Template {
    pub fn new(name: impl Into<String>, kind: TransactionKind) -> Self {
        let now = Utc::now();
        Self {
            id: TemplateId::new(),
            name: name.into(),
            kind,
            amount: None,
            category_id: None,
            subcategory_id: None,
            description: String::new(),
            payment_method: PaymentMethod::default(),
            source: String::new(),
            tags: Vec::new(),
            is_fixed: false,
            usage_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    fn resolve_amount(&self, amount: Option<Money>) -> Result<Money, TemplateValidationError> {
        let amount = amount
            .or(self.amount)
            .ok_or(TemplateValidationError::MissingAmount)?;
        validate_amount(amount).map_err(TemplateValidationError::Field)?;
        Ok(amount)
    }

    /// Build an expense from this template
    pub fn to_expense(
        &self,
        date: NaiveDate,
        amount: Option<Money>,
    ) -> Result<Expense, TemplateValidationError> {
        if self.kind != TransactionKind::Expense {
            return Err(TemplateValidationError::WrongKind(self.kind));
        }
        let category_id = self
            .category_id
            .ok_or(TemplateValidationError::MissingCategory)?;

        let mut expense = Expense::new(self.resolve_amount(amount)?, date, category_id);
        expense.subcategory_id = self.subcategory_id;
        expense.description = self.description.clone();
        expense.payment_method = self.payment_method;
        expense.tags = self.tags.clone();
        expense.is_fixed = self.is_fixed;
        Ok(expense)
    }

    /// Build an income from this template
    pub fn to_income(
        &self,
        date: NaiveDate,
        amount: Option<Money>,
    ) -> Result<Income, TemplateValidationError> {
        if self.kind != TransactionKind::Income {
            return Err(TemplateValidationError::WrongKind(self.kind));
        }
        let mut income = Income::new(self.resolve_amount(amount)?, date, self.source.clone());
        income.description = self.description.clone();
        income.category_id = self.category_id;
        income
            .validate()
            .map_err(TemplateValidationError::Field)?;
        Ok(income)
    }

    pub fn validate(&self) -> Result<(), TemplateValidationError> {
        if self.name.trim().is_empty() {
            return Err(TemplateValidationError::EmptyName);
        }
        let len = self.name.chars().count();
        if len > MAX_NAME_LEN {
            return Err(TemplateValidationError::NameTooLong(len));
        }
        if let Some(amount) = self.amount {
            validate_amount(amount).map_err(TemplateValidationError::Field)?;
        }
        validate_description(&self.description).map_err(TemplateValidationError::Field)
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateValidationError {
    EmptyName,
    NameTooLong(usize),
    MissingAmount,
    MissingCategory,
    WrongKind(TransactionKind),
    Field(TransactionValidationError),
}

impl fmt::Display for TemplateValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "name: cannot be empty"),
            Self::NameTooLong(len) => {
                write!(f, "name: too long ({} chars, max {})", len, MAX_NAME_LEN)
            }
            Self::MissingAmount => write!(f, "amount: template has no amount, pass one"),
            Self::MissingCategory => write!(f, "category: template has no category"),
            Self::WrongKind(kind) => write!(f, "template is for {} records", kind),
            Self::Field(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for TemplateValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 3).unwrap()
    }

    #[test]
    fn test_expense_template() {
        let mut template = Template::new("Coffee", TransactionKind::Expense);
        template.amount = Some(Money::from_cents(450));
        template.category_id = Some(CategoryId::new());
        template.payment_method = PaymentMethod::Cash;
        template.description = "Flat white".into();

        let expense = template.to_expense(date(), None).unwrap();
        assert_eq!(expense.amount.cents(), 450);
        assert_eq!(expense.payment_method, PaymentMethod::Cash);
        assert_eq!(expense.description, "Flat white");

        let bigger = template
            .to_expense(date(), Some(Money::from_cents(600)))
            .unwrap();
        assert_eq!(bigger.amount.cents(), 600);
    }

    #[test]
    fn test_missing_pieces() {
        let mut template = Template::new("Groceries", TransactionKind::Expense);
        assert_eq!(
            template.to_expense(date(), Some(Money::from_cents(100))),
            Err(TemplateValidationError::MissingCategory)
        );

        template.category_id = Some(CategoryId::new());
        assert_eq!(
            template.to_expense(date(), None),
            Err(TemplateValidationError::MissingAmount)
        );
        assert!(matches!(
            template.to_income(date(), None),
            Err(TemplateValidationError::WrongKind(TransactionKind::Expense))
        ));
    }

    #[test]
    fn test_income_template() {
        let mut template = Template::new("Paycheck", TransactionKind::Income);
        template.amount = Some(Money::from_cents(300000));
        template.source = "Acme".into();

        let income = template.to_income(date(), None).unwrap();
        assert_eq!(income.source, "Acme");
        assert_eq!(income.amount.cents(), 300000);
    }
}
