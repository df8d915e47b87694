//! Strongly-typed ID wrappers for all entity types
//!
//! Using newtype wrappers prevents accidentally mixing up IDs from different
//! entity types at compile time.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Behavior shared by every entity ID
pub trait EntityId: Copy + Eq + std::hash::Hash + fmt::Display {
    /// Whether a user-supplied identifier refers to this ID
    fn matches_identifier(&self, identifier: &str) -> bool;
}

/// Macro to generate ID newtype wrappers
macro_rules! define_id {
    ($name:ident, $display_prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Display prefix used for short identifiers
            pub const PREFIX: &'static str = $display_prefix;

            /// Create a new random ID
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Get the underlying UUID
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// Parse an ID from a full UUID string
            pub fn parse(s: &str) -> Result<Self, uuid::Error> {
                Ok(Self(Uuid::parse_str(s)?))
            }

            /// Check whether a user-supplied identifier refers to this ID
            ///
            /// Accepts the full UUID, the short display form (`exp-1a2b3c4d`)
            /// or a bare UUID prefix of at least 4 characters.
            pub fn matches(&self, identifier: &str) -> bool {
                let identifier = identifier.trim().to_ascii_lowercase();
                let full = self.0.to_string();
                let bare = identifier.strip_prefix($display_prefix).unwrap_or(&identifier);
                bare.len() >= 4 && full.starts_with(bare)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $display_prefix, &self.0.to_string()[..8])
            }
        }

        impl EntityId for $name {
            fn matches_identifier(&self, identifier: &str) -> bool {
                self.matches(identifier)
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.strip_prefix($display_prefix).unwrap_or(s);
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

define_id!(ExpenseId, "exp-");
define_id!(IncomeId, "inc-");
define_id!(CategoryId, "cat-");
define_id!(SubcategoryId, "sub-");
define_id!(TagId, "tag-");
define_id!(BudgetId, "bud-");
define_id!(RecurringId, "rec-");
define_id!(TemplateId, "tpl-");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display() {
        let id = ExpenseId::new();
        let display = format!("{}", id);
        assert!(display.starts_with("exp-"));
        assert_eq!(display.len(), 12); // "exp-" + 8 chars
    }

    #[test]
    fn test_id_equality() {
        let id1 = CategoryId::new();
        let id2 = id1;
        assert_eq!(id1, id2);
        assert_ne!(id1, CategoryId::new());
    }

    #[test]
    fn test_id_serialization() {
        let id = TagId::new();
        let json = serde_json::to_string(&id).unwrap();
        let deserialized: TagId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, deserialized);
    }

    #[test]
    fn test_id_parse() {
        let uuid_str = "550e8400-e29b-41d4-a716-446655440000";
        let id = IncomeId::parse(uuid_str).unwrap();
        assert_eq!(id.as_uuid().to_string(), uuid_str);

        let prefixed: IncomeId = format!("inc-{}", uuid_str).parse().unwrap();
        assert_eq!(prefixed, id);
    }

    #[test]
    fn test_matches_short_forms() {
        let id = RecurringId::parse("550e8400-e29b-41d4-a716-446655440000").unwrap();
        assert!(id.matches("rec-550e8400"));
        assert!(id.matches("550e8400"));
        assert!(id.matches("550E"));
        assert!(id.matches("550e8400-e29b-41d4-a716-446655440000"));
        assert!(!id.matches("55"));
        assert!(!id.matches("rec-deadbeef"));
    }
}
