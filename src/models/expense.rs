//! Expense model
//!
//! An expense is money spent on a date, classified by category and optional
//! subcategory, paid with a payment method and optionally tagged.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::{CategoryId, ExpenseId, RecurringId, SubcategoryId, TagId};
use super::money::Money;

/// Maximum length of a description
pub const MAX_DESCRIPTION_LEN: usize = 200;

/// How an expense was paid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    #[default]
    DebitCard,
    CreditCard,
    BankTransfer,
    DigitalWallet,
    Other,
}

impl PaymentMethod {
    pub fn all() -> &'static [Self] {
        &[
            Self::Cash,
            Self::DebitCard,
            Self::CreditCard,
            Self::BankTransfer,
            Self::DigitalWallet,
            Self::Other,
        ]
    }

    /// Stable machine name, matching the serialized form
    pub fn key(&self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::DebitCard => "debit_card",
            Self::CreditCard => "credit_card",
            Self::BankTransfer => "bank_transfer",
            Self::DigitalWallet => "digital_wallet",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Cash => "Cash",
            Self::DebitCard => "Debit Card",
            Self::CreditCard => "Credit Card",
            Self::BankTransfer => "Bank Transfer",
            Self::DigitalWallet => "Digital Wallet",
            Self::Other => "Other",
        };
        write!(f, "{}", label)
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_ascii_lowercase()
            .chars()
            .map(|c| if c == '-' || c == ' ' { '_' } else { c })
            .collect();

        match normalized.as_str() {
            "cash" => Ok(Self::Cash),
            "debit" | "debit_card" => Ok(Self::DebitCard),
            "credit" | "credit_card" => Ok(Self::CreditCard),
            "transfer" | "bank_transfer" | "bank" => Ok(Self::BankTransfer),
            "wallet" | "digital_wallet" => Ok(Self::DigitalWallet),
            "other" => Ok(Self::Other),
            _ => Err(format!(
                "Unknown payment method '{}' (expected one of: {})",
                s.trim(),
                Self::all()
                    .iter()
                    .map(|m| m.key())
                    .collect::<Vec<_>>()
                    .join(", ")
            )),
        }
    }
}

/// A recorded expense
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,

    /// Amount spent (always positive)
    pub amount: Money,

    pub date: NaiveDate,

    pub category_id: CategoryId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory_id: Option<SubcategoryId>,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub payment_method: PaymentMethod,

    #[serde(default)]
    pub tags: Vec<TagId>,

    /// Non-discretionary expense (rent, insurance, ...)
    #[serde(default)]
    pub is_fixed: bool,

    #[serde(default)]
    pub notes: String,

    /// Recurring rule that generated this expense
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurring_id: Option<RecurringId>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Expense {
    pub fn new(amount: Money, date: NaiveDate, category_id: CategoryId) -> Self {
        let now = Utc::now();
        Self {
            id: ExpenseId::new(),
            amount,
            date,
            category_id,
            subcategory_id: None,
            description: String::new(),
            payment_method: PaymentMethod::default(),
            tags: Vec::new(),
            is_fixed: false,
            notes: String::new(),
            recurring_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn has_tag(&self, tag_id: TagId) -> bool {
        self.tags.contains(&tag_id)
    }

    /// Validate the expense fields
    pub fn validate(&self) -> Result<(), TransactionValidationError> {
        validate_amount(self.amount)?;
        validate_description(&self.description)?;

        let mut seen = std::collections::HashSet::new();
        if !self.tags.iter().all(|t| seen.insert(*t)) {
            return Err(TransactionValidationError::DuplicateTag);
        }

        Ok(())
    }
}

impl fmt::Display for Expense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.date.format("%Y-%m-%d"),
            self.description,
            self.amount
        )
    }
}

pub(crate) fn validate_amount(amount: Money) -> Result<(), TransactionValidationError> {
    if !amount.is_positive() {
        return Err(TransactionValidationError::NonPositiveAmount);
    }
    if !amount.is_within_limit() {
        return Err(TransactionValidationError::AmountTooLarge);
    }
    Ok(())
}

pub(crate) fn validate_description(description: &str) -> Result<(), TransactionValidationError> {
    let len = description.chars().count();
    if len > MAX_DESCRIPTION_LEN {
        return Err(TransactionValidationError::DescriptionTooLong(len));
    }
    Ok(())
}

/// Field validation errors shared by expenses, incomes and templates
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionValidationError {
    NonPositiveAmount,
    AmountTooLarge,
    DescriptionTooLong(usize),
    EmptySource,
    DuplicateTag,
}

impl fmt::Display for TransactionValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveAmount => write!(f, "amount: must be greater than zero"),
            Self::AmountTooLarge => write!(f, "amount: cannot exceed {}", Money::MAX),
            Self::DescriptionTooLong(len) => write!(
                f,
                "description: too long ({} chars, max {})",
                len, MAX_DESCRIPTION_LEN
            ),
            Self::EmptySource => write!(f, "source: cannot be empty"),
            Self::DuplicateTag => write!(f, "tags: the same tag is listed twice"),
        }
    }
}

impl std::error::Error for TransactionValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
    }

    #[test]
    fn test_new_expense() {
        let category = CategoryId::new();
        let expense = Expense::new(Money::from_cents(4250), date(), category);

        assert_eq!(expense.amount.cents(), 4250);
        assert_eq!(expense.category_id, category);
        assert_eq!(expense.payment_method, PaymentMethod::DebitCard);
        assert!(!expense.is_fixed);
        assert!(expense.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        let mut expense = Expense::new(Money::zero(), date(), CategoryId::new());
        assert_eq!(
            expense.validate(),
            Err(TransactionValidationError::NonPositiveAmount)
        );

        expense.amount = Money::from_cents(9_000_000_000_000_000);
        assert_eq!(
            expense.validate(),
            Err(TransactionValidationError::AmountTooLarge)
        );

        expense.amount = Money::from_cents(100);
        expense.description = "x".repeat(201);
        assert!(matches!(
            expense.validate(),
            Err(TransactionValidationError::DescriptionTooLong(201))
        ));

        expense.description.clear();
        let tag = TagId::new();
        expense.tags = vec![tag, tag];
        assert_eq!(expense.validate(), Err(TransactionValidationError::DuplicateTag));
    }

    #[test]
    fn test_payment_method_parse() {
        assert_eq!("cash".parse::<PaymentMethod>().unwrap(), PaymentMethod::Cash);
        assert_eq!(
            "Credit Card".parse::<PaymentMethod>().unwrap(),
            PaymentMethod::CreditCard
        );
        assert_eq!(
            "bank-transfer".parse::<PaymentMethod>().unwrap(),
            PaymentMethod::BankTransfer
        );
        assert!("cheque".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn test_payment_method_serde_matches_key() {
        for method in PaymentMethod::all() {
            let json = serde_json::to_string(method).unwrap();
            assert_eq!(json, format!("\"{}\"", method.key()));
        }
    }
}
