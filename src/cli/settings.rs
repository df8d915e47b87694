//! Settings CLI commands

use clap::Subcommand;

use crate::config::{MoneyNotePaths, Settings};
use crate::error::MoneyNoteResult;

/// Settings subcommands
#[derive(Subcommand)]
pub enum SettingsCommands {
    /// Show current settings
    Show,

    /// Change a setting
    Set {
        /// Setting key (e.g. currency_symbol, budget_alert_threshold)
        key: String,
        value: String,
    },
}

/// Handle a settings command
pub fn handle_settings_command(
    paths: &MoneyNotePaths,
    settings: &mut Settings,
    cmd: SettingsCommands,
) -> MoneyNoteResult<()> {
    match cmd {
        SettingsCommands::Show => {
            println!("Settings ({})", paths.settings_file().display());
            println!("{}", "=".repeat(40));
            println!("  currency_symbol:                {}", settings.currency_symbol);
            println!("  currency_code:                  {}", settings.currency_code);
            println!("  date_format:                    {}", settings.date_format);
            println!("  first_day_of_week:              {}", settings.first_day_of_week);
            println!("  default_payment_method:         {}", settings.default_payment_method);
            println!("  budget_alert_threshold:         {}", settings.budget_alert_threshold);
            println!("  auto_process_recurring:         {}", settings.auto_process_recurring);
            println!("  snapshot_interval_minutes:      {}", settings.snapshot_interval_minutes);
            println!(
                "  backup_retention.daily_count:   {}",
                settings.backup_retention.daily_count
            );
            println!(
                "  backup_retention.monthly_count: {}",
                settings.backup_retention.monthly_count
            );
        }

        SettingsCommands::Set { key, value } => {
            settings.set_value(&key, &value)?;
            settings.save(paths)?;
            tracing::info!(%key, %value, "setting changed");
            println!("Set {} = {}", key, value.trim());
        }
    }

    Ok(())
}
