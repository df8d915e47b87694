//! Backup CLI commands
//!
//! Implements CLI commands for snapshot management.

use clap::Subcommand;
use std::path::PathBuf;

use crate::backup::{RestoreManager, SnapshotManager};
use crate::config::paths::MoneyNotePaths;
use crate::config::settings::Settings;
use crate::error::{MoneyNoteError, MoneyNoteResult};

/// Backup subcommands
#[derive(Subcommand)]
pub enum BackupCommands {
    /// Take a snapshot of all data now
    Create,

    /// List all available snapshots
    List {
        /// Show detailed information
        #[arg(short, long)]
        verbose: bool,
    },

    /// Restore from a snapshot
    Restore {
        /// Snapshot filename or path (use 'latest' for most recent)
        backup: String,

        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Show information about a specific snapshot
    Info {
        /// Snapshot filename or path
        backup: String,
    },

    /// Delete old snapshots according to retention policy
    Prune {
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },
}

/// Handle a backup command
pub fn handle_backup_command(
    paths: &MoneyNotePaths,
    settings: &Settings,
    cmd: BackupCommands,
) -> MoneyNoteResult<()> {
    let retention = settings.backup_retention.clone();
    let manager = SnapshotManager::new(paths.clone(), retention.clone());

    match cmd {
        BackupCommands::Create => {
            let (path, pruned) = manager.create_with_retention()?;
            println!("Snapshot created: {}", file_name(&path));
            println!("Location: {}", path.display());
            if !pruned.is_empty() {
                println!("Pruned {} old snapshot(s)", pruned.len());
            }
        }

        BackupCommands::List { verbose } => {
            let snapshots = manager.list_snapshots()?;

            if snapshots.is_empty() {
                println!("No snapshots found.");
                println!("Create one with: moneynote backup create");
                return Ok(());
            }

            println!("Available Snapshots");
            println!("===================");
            println!();

            for (i, snapshot) in snapshots.iter().enumerate() {
                let age = chrono::Utc::now().signed_duration_since(snapshot.created_at);
                let monthly_marker = if snapshot.is_monthly { " [monthly]" } else { "" };

                if verbose {
                    println!(
                        "{}. {}{}\n   Created: {}\n   Size: {}\n   Age: {}\n",
                        i + 1,
                        snapshot.filename,
                        monthly_marker,
                        snapshot.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
                        format_size(snapshot.size_bytes),
                        format_duration(age),
                    );
                } else {
                    println!(
                        "  {}. {} ({} ago, {}){}",
                        i + 1,
                        snapshot.filename,
                        format_duration(age),
                        format_size(snapshot.size_bytes),
                        monthly_marker,
                    );
                }
            }

            println!();
            println!("Total: {} snapshot(s)", snapshots.len());
        }

        BackupCommands::Restore { backup, force } => {
            let path = resolve_snapshot_path(&manager, paths, &backup)?;
            let restore_manager = RestoreManager::new(paths.clone());
            let archive = restore_manager.read_archive(&path)?;

            println!("Snapshot Information");
            println!("====================");
            println!("File: {}", path.display());
            println!("Created: {}", archive.created_at.format("%Y-%m-%d %H:%M:%S UTC"));
            println!("Schema version: {}", archive.schema_version);
            println!();

            if !force {
                println!("WARNING: This will overwrite ALL current data!");
                println!("To proceed, run again with --force flag:");
                println!("  moneynote backup restore {} --force", backup);
                return Ok(());
            }

            let pre_restore = manager.create_snapshot()?;
            println!("Pre-restore snapshot saved: {}", file_name(&pre_restore));

            let report = restore_manager.restore_archive(&archive)?;
            tracing::info!(snapshot = %path.display(), "data restored from snapshot");
            println!("Restore complete!");
            println!("{}", report.summary());
        }

        BackupCommands::Info { backup } => {
            let path = resolve_snapshot_path(&manager, paths, &backup)?;
            let archive = RestoreManager::new(paths.clone()).read_archive(&path)?;
            let metadata = std::fs::metadata(&path)?;

            println!("Snapshot Details");
            println!("================");
            println!("File: {}", path.display());
            println!("Size: {}", format_size(metadata.len()));
            println!("Created: {}", archive.created_at.format("%Y-%m-%d %H:%M:%S UTC"));
            println!("Schema version: {}", archive.schema_version);
            if !archive.app_version.is_empty() {
                println!("App version: {}", archive.app_version);
            }
            println!();
            println!("Contents:");
            for (name, count) in archive.record_counts() {
                println!("  {:<12} {}", format!("{}:", name), count);
            }
            println!(
                "  {:<12} {}",
                "settings:",
                if archive.settings.is_some() { "yes" } else { "no" }
            );
        }

        BackupCommands::Prune { force } => {
            let snapshots = manager.list_snapshots()?;
            let (monthly, daily): (Vec<_>, Vec<_>) = snapshots.iter().partition(|s| s.is_monthly);

            let daily_to_delete = daily.len().saturating_sub(retention.daily_count as usize);
            let monthly_to_delete = monthly
                .len()
                .saturating_sub(retention.monthly_count as usize);
            let total_to_delete = daily_to_delete + monthly_to_delete;

            println!(
                "Retention policy: {} daily, {} monthly",
                retention.daily_count, retention.monthly_count
            );
            if total_to_delete == 0 {
                println!("No snapshots to prune.");
                return Ok(());
            }

            println!(
                "To be deleted: {} daily, {} monthly ({} total)",
                daily_to_delete, monthly_to_delete, total_to_delete
            );

            if !force {
                println!("To delete old snapshots, run again with --force flag:");
                println!("  moneynote backup prune --force");
                return Ok(());
            }

            let deleted = manager.enforce_retention()?;
            println!("Deleted {} snapshot(s).", deleted.len());
        }
    }

    Ok(())
}

fn file_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Resolve a snapshot identifier to a full path
fn resolve_snapshot_path(
    manager: &SnapshotManager,
    paths: &MoneyNotePaths,
    backup: &str,
) -> MoneyNoteResult<PathBuf> {
    if backup.eq_ignore_ascii_case("latest") {
        return manager.latest()?.map(|s| s.path).ok_or_else(|| MoneyNoteError::NotFound {
            entity_type: "Snapshot",
            identifier: "latest".to_string(),
        });
    }

    let path = PathBuf::from(backup);
    if path.is_file() {
        return Ok(path);
    }

    if let Some(snapshot) = manager.get_snapshot(backup)? {
        return Ok(snapshot.path);
    }
    let with_ext = paths.backup_dir().join(format!("{}.json", backup));
    if with_ext.is_file() {
        return Ok(with_ext);
    }

    Err(MoneyNoteError::NotFound {
        entity_type: "Snapshot",
        identifier: backup.to_string(),
    })
}

/// Format a duration in human-readable form
fn format_duration(duration: chrono::Duration) -> String {
    let total_seconds = duration.num_seconds().max(0);

    if total_seconds < 60 {
        return format!("{}s", total_seconds);
    }
    let minutes = total_seconds / 60;
    if minutes < 60 {
        return format!("{}m", minutes);
    }
    let hours = minutes / 60;
    if hours < 24 {
        return format!("{}h", hours);
    }
    let days = hours / 24;
    if days < 30 {
        return format!("{}d", days);
    }
    format!("{}mo", days / 30)
}

/// Format a file size in human-readable form
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}
