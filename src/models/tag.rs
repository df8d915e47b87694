//! Tag model
//!
//! Tags are free-form labels attached to expenses. The usage count is
//! derived from the expense collection and refreshed by the tag service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::category::{is_valid_color, CategoryValidationError, MAX_NAME_LEN};
use super::ids::TagId;

fn default_tag_color() -> String {
    "#607D8B".to_string()
}

/// A label for expenses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
    #[serde(default = "default_tag_color")]
    pub color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    /// Number of expenses carrying this tag
    #[serde(default)]
    pub usage_count: u32,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: TagId::new(),
            name: name.into(),
            color: default_tag_color(),
            icon: None,
            usage_count: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Case-insensitive name comparison
    pub fn is_named(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name.trim())
    }

    pub fn validate(&self) -> Result<(), CategoryValidationError> {
        if self.name.trim().is_empty() {
            return Err(CategoryValidationError::EmptyName);
        }
        let len = self.name.chars().count();
        if len > MAX_NAME_LEN {
            return Err(CategoryValidationError::NameTooLong(len));
        }
        if !is_valid_color(&self.color) {
            return Err(CategoryValidationError::InvalidColor(self.color.clone()));
        }
        Ok(())
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_tag() {
        let tag = Tag::new("vacation");
        assert_eq!(tag.usage_count, 0);
        assert!(tag.is_named("Vacation "));
        assert_eq!(tag.to_string(), "#vacation");
        assert!(tag.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        let mut tag = Tag::new("");
        assert_eq!(tag.validate(), Err(CategoryValidationError::EmptyName));

        tag.name = "work".into();
        tag.color = "#12345".into();
        assert!(matches!(
            tag.validate(),
            Err(CategoryValidationError::InvalidColor(_))
        ));
    }

    #[test]
    fn test_missing_color_defaults() {
        let json = r#"{
            "id": "6f1c1c7e-5d1a-4c39-9f57-0d3b1b6b2a10",
            "name": "gift",
            "created_at": "2025-01-01T00:00:00Z",
            "updated_at": "2025-01-01T00:00:00Z"
        }"#;
        let tag: Tag = serde_json::from_str(json).unwrap();
        assert_eq!(tag.color, "#607D8B");
        assert!(tag.icon.is_none());
    }
}
