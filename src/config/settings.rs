//! User settings for MoneyNote
//!
//! Manages user preferences including currency, date format, budget alerts,
//! recurring processing and snapshot/backup retention policies.

use serde::{Deserialize, Serialize};

use super::paths::MoneyNotePaths;
use crate::error::MoneyNoteError;
use crate::models::PaymentMethod;

/// Backup retention settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupRetention {
    /// Number of regular snapshots to keep
    pub daily_count: u32,
    /// Number of monthly snapshots to keep
    pub monthly_count: u32,
}

impl Default for BackupRetention {
    fn default() -> Self {
        Self {
            daily_count: 30,
            monthly_count: 12,
        }
    }
}

/// User settings for MoneyNote
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Currency symbol used when formatting amounts
    #[serde(default = "default_currency")]
    pub currency_symbol: String,

    /// ISO currency code, informational
    #[serde(default = "default_currency_code")]
    pub currency_code: String,

    /// Date format preference (strftime format)
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// First day of week (0 = Sunday, 1 = Monday)
    #[serde(default = "default_first_day_of_week")]
    pub first_day_of_week: u8,

    /// Payment method preselected for new expenses
    #[serde(default)]
    pub default_payment_method: PaymentMethod,

    /// Budget usage percentage at which a category is flagged as a warning
    #[serde(default = "default_alert_threshold")]
    pub budget_alert_threshold: u8,

    /// Generate due recurring transactions when the application starts
    #[serde(default = "default_true")]
    pub auto_process_recurring: bool,

    /// Minutes between automatic snapshots while the TUI is open (0 disables)
    #[serde(default = "default_snapshot_interval")]
    pub snapshot_interval_minutes: u32,

    /// Backup retention policy
    #[serde(default)]
    pub backup_retention: BackupRetention,
}

fn default_schema_version() -> u32 {
    1
}

fn default_currency() -> String {
    "$".to_string()
}

fn default_currency_code() -> String {
    "USD".to_string()
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

fn default_first_day_of_week() -> u8 {
    1 // Monday
}

fn default_alert_threshold() -> u8 {
    80
}

fn default_true() -> bool {
    true
}

fn default_snapshot_interval() -> u32 {
    5
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            currency_symbol: default_currency(),
            currency_code: default_currency_code(),
            date_format: default_date_format(),
            first_day_of_week: default_first_day_of_week(),
            default_payment_method: PaymentMethod::default(),
            budget_alert_threshold: default_alert_threshold(),
            auto_process_recurring: true,
            snapshot_interval_minutes: default_snapshot_interval(),
            backup_retention: BackupRetention::default(),
        }
    }
}

/// Keys accepted by [`Settings::set_value`]
pub const SETTING_KEYS: &[&str] = &[
    "currency_symbol",
    "currency_code",
    "date_format",
    "first_day_of_week",
    "default_payment_method",
    "budget_alert_threshold",
    "auto_process_recurring",
    "snapshot_interval_minutes",
    "backup_retention.daily_count",
    "backup_retention.monthly_count",
];

impl Settings {
    /// Load settings from disk, or create default settings if file doesn't exist
    pub fn load_or_create(paths: &MoneyNotePaths) -> Result<Self, MoneyNoteError> {
        let settings_path = paths.settings_file();

        if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path).map_err(|e| {
                MoneyNoteError::Io(format!("Failed to read settings file: {}", e))
            })?;

            let settings: Settings = serde_json::from_str(&contents).map_err(|e| {
                MoneyNoteError::Config(format!("Failed to parse settings file: {}", e))
            })?;

            Ok(settings)
        } else {
            // Don't save yet - let caller decide when to persist
            Ok(Settings::default())
        }
    }

    /// Save settings to disk
    pub fn save(&self, paths: &MoneyNotePaths) -> Result<(), MoneyNoteError> {
        paths.ensure_directories()?;

        let contents = serde_json::to_string_pretty(self).map_err(|e| {
            MoneyNoteError::Config(format!("Failed to serialize settings: {}", e))
        })?;

        std::fs::write(paths.settings_file(), contents).map_err(|e| {
            MoneyNoteError::Io(format!("Failed to write settings file: {}", e))
        })?;

        Ok(())
    }

    /// Set a single setting from its string form
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), MoneyNoteError> {
        let value = value.trim();
        let invalid = |what: &str| {
            MoneyNoteError::Validation(format!("Invalid value '{}' for {}: {}", value, key, what))
        };

        match key {
            "currency_symbol" => {
                if value.is_empty() || value.chars().count() > 4 {
                    return Err(invalid("expected 1-4 characters"));
                }
                self.currency_symbol = value.to_string();
            }
            "currency_code" => {
                if value.len() != 3 || !value.chars().all(|c| c.is_ascii_alphabetic()) {
                    return Err(invalid("expected a 3-letter code"));
                }
                self.currency_code = value.to_ascii_uppercase();
            }
            "date_format" => {
                let sample = chrono::NaiveDate::from_ymd_opt(2025, 1, 31)
                    .ok_or_else(|| invalid("internal date error"))?;
                let mut rendered = String::new();
                use std::fmt::Write;
                if write!(rendered, "{}", sample.format(value)).is_err() || rendered.is_empty() {
                    return Err(invalid("not a valid strftime format"));
                }
                self.date_format = value.to_string();
            }
            "first_day_of_week" => {
                let day: u8 = value.parse().map_err(|_| invalid("expected 0 or 1"))?;
                if day > 1 {
                    return Err(invalid("expected 0 (Sunday) or 1 (Monday)"));
                }
                self.first_day_of_week = day;
            }
            "default_payment_method" => {
                self.default_payment_method = value
                    .parse()
                    .map_err(|e: String| MoneyNoteError::Validation(e))?;
            }
            "budget_alert_threshold" => {
                let pct: u8 = value.parse().map_err(|_| invalid("expected 1-100"))?;
                if !(1..=100).contains(&pct) {
                    return Err(invalid("expected 1-100"));
                }
                self.budget_alert_threshold = pct;
            }
            "auto_process_recurring" => {
                self.auto_process_recurring = parse_bool(value).ok_or_else(|| invalid("expected true/false"))?;
            }
            "snapshot_interval_minutes" => {
                self.snapshot_interval_minutes =
                    value.parse().map_err(|_| invalid("expected minutes"))?;
            }
            "backup_retention.daily_count" => {
                self.backup_retention.daily_count =
                    value.parse().map_err(|_| invalid("expected a count"))?;
            }
            "backup_retention.monthly_count" => {
                self.backup_retention.monthly_count =
                    value.parse().map_err(|_| invalid("expected a count"))?;
            }
            _ => {
                return Err(MoneyNoteError::Config(format!(
                    "Unknown setting '{}'. Known settings: {}",
                    key,
                    SETTING_KEYS.join(", ")
                )))
            }
        }

        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}
