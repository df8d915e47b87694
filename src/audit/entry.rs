//! Audit entry data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of change recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Create => write!(f, "CREATE"),
            Operation::Update => write!(f, "UPDATE"),
            Operation::Delete => write!(f, "DELETE"),
        }
    }
}

/// Collections that are audited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Expense,
    Income,
    Category,
    Tag,
    Budget,
    Recurring,
    Template,
    Settings,
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntityType::Expense => "Expense",
            EntityType::Income => "Income",
            EntityType::Category => "Category",
            EntityType::Tag => "Tag",
            EntityType::Budget => "Budget",
            EntityType::Recurring => "Recurring",
            EntityType::Template => "Template",
            EntityType::Settings => "Settings",
        };
        write!(f, "{}", label)
    }
}

impl std::str::FromStr for EntityType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "expense" | "expenses" => Ok(Self::Expense),
            "income" | "incomes" => Ok(Self::Income),
            "category" | "categories" => Ok(Self::Category),
            "tag" | "tags" => Ok(Self::Tag),
            "budget" | "budgets" => Ok(Self::Budget),
            "recurring" => Ok(Self::Recurring),
            "template" | "templates" => Ok(Self::Template),
            "settings" => Ok(Self::Settings),
            other => Err(format!("Unknown entity type '{}'", other)),
        }
    }
}

/// One line of the audit log
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub operation: Operation,
    pub entity_type: EntityType,
    /// Short display id (`exp-1a2b3c4d`)
    pub entity_id: String,
    /// Human-readable label (description, name, month)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff_summary: Option<String>,
}

impl AuditEntry {
    fn base(
        operation: Operation,
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            operation,
            entity_type,
            entity_id: entity_id.into(),
            entity_name,
            before: None,
            after: None,
            diff_summary: None,
        }
    }

    pub fn create<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> Self {
        Self {
            after: serde_json::to_value(entity).ok(),
            ..Self::base(Operation::Create, entity_type, entity_id, entity_name)
        }
    }

    /// Update entry; the diff summary is computed from the two states
    pub fn update<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        before: &T,
        after: &T,
    ) -> Self {
        let before = serde_json::to_value(before).ok();
        let after = serde_json::to_value(after).ok();
        let diff_summary = match (&before, &after) {
            (Some(b), Some(a)) => super::diff::generate_diff(b, a),
            _ => None,
        };
        Self {
            before,
            after,
            diff_summary,
            ..Self::base(Operation::Update, entity_type, entity_id, entity_name)
        }
    }

    pub fn delete<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> Self {
        Self {
            before: serde_json::to_value(entity).ok(),
            ..Self::base(Operation::Delete, entity_type, entity_id, entity_name)
        }
    }

    /// One-line summary, with the changes on a second line for updates
    pub fn format_human_readable(&self) -> String {
        let mut output = format!(
            "[{}] {} {} {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            self.operation,
            self.entity_type,
            self.entity_id
        );
        if let Some(name) = &self.entity_name {
            output.push_str(&format!(" ({})", name));
        }
        if let Some(diff) = &self.diff_summary {
            output.push_str(&format!("\n  Changes: {}", diff));
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_update_computes_diff() {
        let before = json!({"description": "Lunch", "amount": 1200});
        let after = json!({"description": "Lunch", "amount": 1500});
        let entry = AuditEntry::update(
            EntityType::Expense,
            "exp-12345678",
            Some("Lunch".into()),
            &before,
            &after,
        );

        assert_eq!(entry.operation, Operation::Update);
        assert_eq!(entry.diff_summary.as_deref(), Some("amount: 1200 -> 1500"));
    }

    #[test]
    fn test_create_and_delete_states() {
        let data = json!({"name": "Food"});
        let created = AuditEntry::create(EntityType::Category, "cat-1", None, &data);
        assert!(created.before.is_none());
        assert!(created.after.is_some());

        let deleted = AuditEntry::delete(EntityType::Category, "cat-1", None, &data);
        assert!(deleted.before.is_some());
        assert!(deleted.after.is_none());
    }

    #[test]
    fn test_human_readable_format() {
        let entry = AuditEntry::create(
            EntityType::Budget,
            "bud-12345678",
            Some("2025-01".to_string()),
            &json!({}),
        );
        let formatted = entry.format_human_readable();
        assert!(formatted.contains("CREATE Budget bud-12345678 (2025-01)"));
    }

    #[test]
    fn test_entity_type_parse() {
        assert_eq!("expenses".parse::<EntityType>().unwrap(), EntityType::Expense);
        assert_eq!("Recurring".parse::<EntityType>().unwrap(), EntityType::Recurring);
        assert!("account".parse::<EntityType>().is_err());
    }
}
